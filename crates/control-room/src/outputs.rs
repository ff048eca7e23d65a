use common::ids;
use common::outputs::{VideoOutput, VideoOutputConfig, VideoOutputStatus, VideoOutputType};
use common::validation::epoch_ms;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

/// Video output session bookkeeping. CRUD-only: the media transport itself
/// lives outside this server.
#[derive(Default)]
pub struct VideoOutputStore {
    outputs: RwLock<HashMap<String, VideoOutput>>,
}

impl VideoOutputStore {
    pub fn new() -> Self {
        Self {
            outputs: RwLock::new(HashMap::new()),
        }
    }

    pub async fn configure(&self, mut config: VideoOutputConfig) -> VideoOutput {
        let mut outputs = self.outputs.write().await;

        if config.id.is_empty() {
            config.id = ids::next_id("output");
        }
        let output = VideoOutput {
            config: config.clone(),
            status: VideoOutputStatus::Idle,
            current_source_camera_id: String::new(),
            streaming_started_at_ms: 0,
            bytes_sent: 0,
            error_message: String::new(),
        };
        outputs.insert(config.id.clone(), output.clone());

        info!(output_id = %config.id, output_name = %config.name, "video output configured");
        output
    }

    pub async fn get(&self, output_id: &str) -> Option<VideoOutput> {
        let outputs = self.outputs.read().await;
        outputs.get(output_id).cloned()
    }

    pub async fn list(
        &self,
        type_filter: &[VideoOutputType],
        status_filter: &[VideoOutputStatus],
    ) -> Vec<VideoOutput> {
        let outputs = self.outputs.read().await;
        outputs
            .values()
            .filter(|output| {
                if !type_filter.is_empty() && !type_filter.contains(&output.config.output_type) {
                    return false;
                }
                if !status_filter.is_empty() && !status_filter.contains(&output.status) {
                    return false;
                }
                true
            })
            .cloned()
            .collect()
    }

    pub async fn start_streaming(&self, output_id: &str, source_camera_id: &str) -> bool {
        let mut outputs = self.outputs.write().await;
        match outputs.get_mut(output_id) {
            Some(output) => {
                output.status = VideoOutputStatus::Streaming;
                output.current_source_camera_id = source_camera_id.to_string();
                output.streaming_started_at_ms = epoch_ms();
                output.error_message = String::new();
                true
            }
            None => false,
        }
    }

    pub async fn stop_streaming(&self, output_id: &str) -> bool {
        let mut outputs = self.outputs.write().await;
        match outputs.get_mut(output_id) {
            Some(output) => {
                output.status = VideoOutputStatus::Idle;
                output.current_source_camera_id = String::new();
                output.streaming_started_at_ms = 0;
                true
            }
            None => false,
        }
    }

    pub async fn switch_source(&self, output_id: &str, source_camera_id: &str) -> bool {
        let mut outputs = self.outputs.write().await;
        match outputs.get_mut(output_id) {
            Some(output) => {
                output.current_source_camera_id = source_camera_id.to_string();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: &str, output_type: VideoOutputType) -> VideoOutputConfig {
        VideoOutputConfig {
            id: String::new(),
            name: name.to_string(),
            output_type,
            destination: "rtmp://ingest.example/live".to_string(),
            parameters: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn configure_assigns_id_and_starts_idle() {
        let store = VideoOutputStore::new();
        let output = store.configure(config("main", VideoOutputType::Rtmp)).await;

        assert!(!output.config.id.is_empty());
        assert_eq!(output.status, VideoOutputStatus::Idle);
        assert!(store.get(&output.config.id).await.is_some());
    }

    #[tokio::test]
    async fn streaming_lifecycle() {
        let store = VideoOutputStore::new();
        let output = store.configure(config("main", VideoOutputType::Rtmp)).await;
        let id = output.config.id;

        assert!(store.start_streaming(&id, "cam-1").await);
        let streaming = store.get(&id).await.unwrap();
        assert_eq!(streaming.status, VideoOutputStatus::Streaming);
        assert_eq!(streaming.current_source_camera_id, "cam-1");
        assert!(streaming.streaming_started_at_ms > 0);

        assert!(store.switch_source(&id, "cam-2").await);
        assert_eq!(store.get(&id).await.unwrap().current_source_camera_id, "cam-2");

        assert!(store.stop_streaming(&id).await);
        let stopped = store.get(&id).await.unwrap();
        assert_eq!(stopped.status, VideoOutputStatus::Idle);
        assert!(stopped.current_source_camera_id.is_empty());

        assert!(!store.start_streaming("missing", "cam-1").await);
    }

    #[tokio::test]
    async fn list_filters_by_type_and_status() {
        let store = VideoOutputStore::new();
        let rtmp = store.configure(config("a", VideoOutputType::Rtmp)).await;
        store.configure(config("b", VideoOutputType::Ndi)).await;
        store.start_streaming(&rtmp.config.id, "cam-1").await;

        let all = store.list(&[], &[]).await;
        assert_eq!(all.len(), 2);

        let rtmp_only = store.list(&[VideoOutputType::Rtmp], &[]).await;
        assert_eq!(rtmp_only.len(), 1);

        let streaming = store.list(&[], &[VideoOutputStatus::Streaming]).await;
        assert_eq!(streaming.len(), 1);
        assert_eq!(streaming[0].config.id, rtmp.config.id);
    }
}
