use common::cameras::{
    Camera, CameraCapabilities, CameraConnection, CameraMode, CameraStatus, RegisterCameraRequest,
    UpdateCameraRequest,
};
use common::ids;
use common::ptz::PtzParameters;
use common::validation::epoch_ms;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// A camera with no heartbeat for this long is considered disconnected.
pub const HEARTBEAT_TIMEOUT_MS: i64 = 30_000;

/// A camera together with its companion records. Companions are created and
/// removed with the camera, never on their own.
struct CameraRecord {
    camera: Camera,
    connection: Option<CameraConnection>,
    capabilities: Option<CameraCapabilities>,
}

/// In-memory camera registry. One lock over all cameras; every operation
/// completes under it without suspending.
#[derive(Default)]
pub struct CameraRegistry {
    inner: RwLock<HashMap<String, CameraRecord>>,
}

impl CameraRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new camera. Assigns a fresh id, stamps the heartbeat and
    /// starts the camera as online.
    pub async fn register(&self, req: RegisterCameraRequest) -> Camera {
        let mut inner = self.inner.write().await;

        let camera_id = ids::next_id("cam");
        let camera = Camera {
            id: camera_id.clone(),
            name: req.name,
            mode: req.mode,
            master_mf_id: req.master_mf_id,
            status: CameraStatus::Online,
            current_ptz: None,
            last_seen_at_ms: epoch_ms(),
            metadata: req.metadata,
        };

        inner.insert(
            camera_id.clone(),
            CameraRecord {
                camera: camera.clone(),
                connection: req.connection,
                capabilities: req.capabilities,
            },
        );
        telemetry::metrics::REGISTRY_CAMERAS.set(inner.len() as i64);

        info!(camera_id = %camera_id, camera_name = %camera.name, "camera registered");
        camera
    }

    /// Remove a camera and its companion records. Returns false if unknown.
    pub async fn unregister(&self, camera_id: &str) -> bool {
        let mut inner = self.inner.write().await;
        let removed = inner.remove(camera_id).is_some();
        if removed {
            telemetry::metrics::REGISTRY_CAMERAS.set(inner.len() as i64);
            info!(camera_id = %camera_id, "camera unregistered");
        }
        removed
    }

    /// Apply a patch. Present fields replace, absent fields are untouched.
    pub async fn update(&self, camera_id: &str, patch: UpdateCameraRequest) -> Option<Camera> {
        let mut inner = self.inner.write().await;
        let record = inner.get_mut(camera_id)?;

        if let Some(name) = patch.name {
            record.camera.name = name;
        }
        if let Some(connection) = patch.connection {
            record.connection = Some(connection);
        }
        if let Some(metadata) = patch.metadata {
            record.camera.metadata = metadata;
        }

        Some(record.camera.clone())
    }

    /// Snapshot read of a camera and its companion records.
    pub async fn get(
        &self,
        camera_id: &str,
    ) -> Option<(Camera, Option<CameraConnection>, Option<CameraCapabilities>)> {
        let inner = self.inner.read().await;
        let record = inner.get(camera_id)?;
        Some((
            record.camera.clone(),
            record.connection.clone(),
            record.capabilities.clone(),
        ))
    }

    /// List cameras matching all supplied filters. An empty filter matches
    /// any value. Order is unspecified.
    pub async fn list(
        &self,
        master_mf_id: Option<&str>,
        mode_filter: &[CameraMode],
        status_filter: &[CameraStatus],
    ) -> Vec<Camera> {
        let inner = self.inner.read().await;

        inner
            .values()
            .filter(|record| {
                if let Some(mf) = master_mf_id {
                    if !mf.is_empty() && record.camera.master_mf_id != mf {
                        return false;
                    }
                }
                if !mode_filter.is_empty() && !mode_filter.contains(&record.camera.mode) {
                    return false;
                }
                if !status_filter.is_empty() && !status_filter.contains(&record.camera.status) {
                    return false;
                }
                true
            })
            .map(|record| record.camera.clone())
            .collect()
    }

    /// Replace the camera's mode. Returns false if unknown.
    pub async fn switch_mode(&self, camera_id: &str, mode: CameraMode) -> bool {
        let mut inner = self.inner.write().await;
        match inner.get_mut(camera_id) {
            Some(record) => {
                record.camera.mode = mode;
                true
            }
            None => false,
        }
    }

    /// Apply a heartbeat or state report. Always advances `last_seen_at_ms`;
    /// an `Unspecified` status leaves the stored status alone.
    pub async fn update_state(
        &self,
        camera_id: &str,
        ptz: Option<PtzParameters>,
        status: CameraStatus,
    ) -> bool {
        let mut inner = self.inner.write().await;
        let Some(record) = inner.get_mut(camera_id) else {
            return false;
        };

        record.camera.last_seen_at_ms = epoch_ms();
        if status != CameraStatus::Unspecified {
            record.camera.status = status;
        }
        if let Some(ptz) = ptz {
            record.camera.current_ptz = Some(ptz);
        }

        debug!(camera_id = %camera_id, status = ?record.camera.status, "camera state updated");
        true
    }

    /// Mark cameras offline after the heartbeat timeout. Returns the ids
    /// that transitioned.
    pub async fn reap_disconnected(&self) -> Vec<String> {
        self.reap_disconnected_at(epoch_ms()).await
    }

    /// Reap with an explicit clock reading, for deterministic callers.
    pub async fn reap_disconnected_at(&self, now_ms: i64) -> Vec<String> {
        let mut inner = self.inner.write().await;
        let mut reaped = Vec::new();

        for record in inner.values_mut() {
            let last_seen = record.camera.last_seen_at_ms;
            if last_seen > 0
                && now_ms - last_seen >= HEARTBEAT_TIMEOUT_MS
                && record.camera.status != CameraStatus::Offline
            {
                record.camera.status = CameraStatus::Offline;
                reaped.push(record.camera.id.clone());
            }
        }

        reaped
    }

    /// Current status per camera. An empty id list means all cameras.
    pub async fn connection_statuses(&self, camera_ids: &[String]) -> HashMap<String, CameraStatus> {
        let inner = self.inner.read().await;

        if camera_ids.is_empty() {
            return inner
                .values()
                .map(|record| (record.camera.id.clone(), record.camera.status))
                .collect();
        }

        camera_ids
            .iter()
            .filter_map(|id| {
                inner
                    .get(id)
                    .map(|record| (id.clone(), record.camera.status))
            })
            .collect()
    }

    #[cfg(test)]
    async fn force_last_seen(&self, camera_id: &str, last_seen_at_ms: i64) {
        let mut inner = self.inner.write().await;
        if let Some(record) = inner.get_mut(camera_id) {
            record.camera.last_seen_at_ms = last_seen_at_ms;
        }
    }
}
