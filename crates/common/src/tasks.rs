use serde::{Deserialize, Serialize};

use crate::cameras::CameraStatus;
use crate::ptz::{CinematicInstruction, DeviceStatus, PtzCommand, PtzParameters};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskLayer {
    Ptz,
    Cinematic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Executing,
    Completed,
    Cancelled,
}

/// Exactly one payload per task, made structural with a tagged variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TaskPayload {
    Ptz { command: PtzCommand },
    Cinematic { instruction: CinematicInstruction },
}

impl TaskPayload {
    pub fn layer(&self) -> TaskLayer {
        match self {
            Self::Ptz { .. } => TaskLayer::Ptz,
            Self::Cinematic { .. } => TaskLayer::Cinematic,
        }
    }
}

/// A unit of work owned by one camera's queue. Task ids are opaque to
/// clients; they only echo them back on completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub layer: TaskLayer,
    pub status: TaskStatus,
    pub payload: TaskPayload,
    pub created_at_ms: i64,
    #[serde(default)]
    pub interrupted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraQueueStatus {
    pub camera_id: String,
    pub ptz_queue_size: u32,
    pub cinematic_queue_size: u32,
    pub executing_task: Option<Task>,
    pub last_polling_at_ms: i64,
}

/// Field-device poll. `completed_task_id` reports the task finished (or
/// aborted) since the previous poll; the PTZ and status fields double as a
/// heartbeat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingRequest {
    pub camera_id: String,
    #[serde(default)]
    pub completed_task_id: String,
    #[serde(default)]
    pub executing_task_id: String,
    pub current_ptz: Option<PtzParameters>,
    #[serde(default)]
    pub device_status: DeviceStatus,
    #[serde(default)]
    pub camera_status: CameraStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingResponse {
    pub current_command: Option<Task>,
    pub next_command: Option<Task>,
    pub interrupt: bool,
    pub timestamp_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendPtzCommandRequest {
    pub camera_id: String,
    pub command: PtzCommand,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendCinematicCommandRequest {
    pub camera_id: String,
    pub instruction: CinematicInstruction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueResponse {
    pub accepted: bool,
    pub task_id: String,
    #[serde(default)]
    pub error_message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueStatusQuery {
    pub camera_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStatusResponse {
    pub camera_queues: Vec<CameraQueueStatus>,
}
