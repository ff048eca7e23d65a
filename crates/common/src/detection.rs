use serde::{Deserialize, Serialize};

use crate::ptz::{CameraAngle, PtzParameters, ShotType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub subject_id: String,
    #[serde(default)]
    pub name: String,
}

/// Normalised image coordinates, 0.0-1.0 on both axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedSubject {
    pub subject: Subject,
    pub confidence: f64,
    pub detected_box: BoundingBox,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageData {
    #[serde(default)]
    pub camera_id: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Base64-encoded frame bytes.
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessImageRequest {
    pub image: ImageData,
    #[serde(default)]
    pub target_subjects: Vec<Subject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessImageResponse {
    pub detected_subjects: Vec<DetectedSubject>,
    pub processing_time_ms: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartPatternMatchingRequest {
    pub camera_id: String,
    #[serde(default)]
    pub target_subjects: Vec<Subject>,
    pub interval_ms: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartPatternMatchingResponse {
    pub success: bool,
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopPatternMatchingResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternSession {
    pub session_id: String,
    pub camera_id: String,
    pub target_subjects: Vec<Subject>,
    pub interval_ms: u32,
    pub created_at_ms: i64,
}

/// One frame on the pattern-match result stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternMatchResult {
    pub session_id: String,
    pub camera_id: String,
    pub detected_subjects: Vec<DetectedSubject>,
    pub timestamp_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateFramingRequest {
    pub camera_id: String,
    pub current_ptz: Option<PtzParameters>,
    #[serde(default)]
    pub target_shot_type: ShotType,
    #[serde(default)]
    pub target_subjects: Vec<DetectedSubject>,
    #[serde(default)]
    pub target_angle: CameraAngle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateFramingResponse {
    pub calculated_ptz: PtzParameters,
    pub estimated_move_time_ms: u32,
    pub success: bool,
    #[serde(default)]
    pub error_message: String,
}
