use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoOutputType {
    Rtmp,
    Srt,
    Ndi,
    Webrtc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoOutputStatus {
    Idle,
    Streaming,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoOutputConfig {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub output_type: VideoOutputType,
    pub destination: String,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

/// Runtime state of a configured output. Session bookkeeping only; media
/// transport is handled elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoOutput {
    pub config: VideoOutputConfig,
    pub status: VideoOutputStatus,
    #[serde(default)]
    pub current_source_camera_id: String,
    #[serde(default)]
    pub streaming_started_at_ms: i64,
    #[serde(default)]
    pub bytes_sent: u64,
    #[serde(default)]
    pub error_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartStreamingRequest {
    pub source_camera_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchSourceRequest {
    pub source_camera_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputListQuery {
    #[serde(rename = "type")]
    pub output_type: Option<VideoOutputType>,
    pub status: Option<VideoOutputStatus>,
}
