use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ptz::PtzParameters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    Autonomous,
    Lightweight,
    Unspecified,
}

impl Default for CameraMode {
    fn default() -> Self {
        Self::Unspecified
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraStatus {
    Online,
    Offline,
    Degraded,
    Unspecified,
}

impl Default for CameraStatus {
    fn default() -> Self {
        Self::Unspecified
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionProtocol {
    Onvif,
    Ndi,
    Rtsp,
    Webrtc,
}

/// Transport endpoint for reaching the physical camera. One per camera,
/// removed together with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConnection {
    pub protocol: ConnectionProtocol,
    pub address: String,
    pub port: u16,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraCapabilities {
    pub supports_ptz: bool,
    pub pan_min: f64,
    pub pan_max: f64,
    pub tilt_min: f64,
    pub tilt_max: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    #[serde(default)]
    pub supported_framerates: Vec<u32>,
    #[serde(default)]
    pub preset_count: u32,
    #[serde(default)]
    pub autofocus: bool,
    #[serde(default)]
    pub arm: bool,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub id: String,
    pub name: String,
    pub mode: CameraMode,
    #[serde(default)]
    pub master_mf_id: String,
    pub status: CameraStatus,
    pub current_ptz: Option<PtzParameters>,
    pub last_seen_at_ms: i64,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterCameraRequest {
    pub name: String,
    #[serde(default)]
    pub mode: CameraMode,
    #[serde(default)]
    pub master_mf_id: String,
    pub connection: Option<CameraConnection>,
    pub capabilities: Option<CameraCapabilities>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Patch semantics: present fields replace, absent fields are untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCameraRequest {
    pub name: Option<String>,
    pub connection: Option<CameraConnection>,
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraListQuery {
    pub master_mf_id: Option<String>,
    pub mode: Option<CameraMode>,
    pub status: Option<CameraStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchCameraModeRequest {
    pub target_mode: CameraMode,
}

/// One frame on the connection-status stream, emitted when a camera's
/// status changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionStatusChange {
    pub camera_id: String,
    pub previous_status: Option<CameraStatus>,
    pub current_status: CameraStatus,
    pub timestamp_ms: i64,
}
