use serde::{Deserialize, Serialize};

use crate::cameras::CameraStatus;
use crate::detection::Subject;

/// The three motion axes plus per-axis speeds. Speeds are normalised 0.0-1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtzParameters {
    pub pan: f64,
    pub tilt: f64,
    pub zoom: f64,
    #[serde(default)]
    pub pan_speed: f64,
    #[serde(default)]
    pub tilt_speed: f64,
    #[serde(default)]
    pub zoom_speed: f64,
}

impl Default for PtzParameters {
    fn default() -> Self {
        Self {
            pan: 0.0,
            tilt: 0.0,
            zoom: 1.0,
            pan_speed: 0.0,
            tilt_speed: 0.0,
            zoom_speed: 0.0,
        }
    }
}

/// Health of the field device itself, as distinct from the camera it drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Healthy,
    Degraded,
    Error,
    Unspecified,
}

impl Default for DeviceStatus {
    fn default() -> Self {
        Self::Unspecified
    }
}

/// Direct camera motion request on the legacy synchronous path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlCommand {
    #[serde(default)]
    pub command_id: String,
    pub camera_id: String,
    pub ptz_parameters: Option<PtzParameters>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlCommandResult {
    pub command_id: String,
    pub success: bool,
    #[serde(default)]
    pub error_message: String,
    pub resulting_ptz: PtzParameters,
    pub execution_time_ms: u32,
}

/// Periodic state report from a field device; doubles as a heartbeat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraState {
    pub camera_id: String,
    pub current_ptz: Option<PtzParameters>,
    #[serde(default)]
    pub status: CameraStatus,
    #[serde(default)]
    pub device_status: DeviceStatus,
    #[serde(default)]
    pub reported_at_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotType {
    CloseUp,
    Medium,
    Wide,
    Unspecified,
}

impl Default for ShotType {
    fn default() -> Self {
        Self::Unspecified
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraAngle {
    Low,
    Eye,
    High,
    Unspecified,
}

impl Default for CameraAngle {
    fn default() -> Self {
        Self::Unspecified
    }
}

/// Higher-level shot description scheduled on the cinematic layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CinematicInstruction {
    #[serde(default)]
    pub instruction_id: String,
    pub camera_id: String,
    #[serde(default)]
    pub shot_type: ShotType,
    #[serde(default)]
    pub target_angle: CameraAngle,
    #[serde(default)]
    pub target_subjects: Vec<Subject>,
    pub ptz_parameters: Option<PtzParameters>,
    #[serde(default)]
    pub duration_ms: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CinematographyResult {
    pub instruction_id: String,
    pub camera_id: String,
    pub success: bool,
    #[serde(default)]
    pub error_message: String,
    pub applied_ptz: PtzParameters,
    pub completed_at_ms: i64,
}

/// Queued payload for the high-priority PTZ layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PtzCommand {
    pub ptz_parameters: PtzParameters,
    #[serde(default)]
    pub duration_ms: u32,
}

/// Fan-out unit on the PTZ event bus. Carries the command, its result, or
/// both; never retained by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PtzCommandEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<ControlCommand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ControlCommandResult>,
    pub timestamp_ms: i64,
}
