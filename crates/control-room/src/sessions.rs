use common::detection::{BoundingBox, DetectedSubject, ImageData, PatternSession, Subject};
use common::ids;
use common::ptz::PtzParameters;
use common::validation::epoch_ms;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

const DETECTION_CONFIDENCE: f64 = 0.85;
const BOUNDING_BOX_X: f64 = 0.2;
const BOUNDING_BOX_Y: f64 = 0.2;
const BOUNDING_BOX_W: f64 = 0.3;
const BOUNDING_BOX_H: f64 = 0.3;
const PROCESSING_TIME_MS: u32 = 50;

const PAN_ADJUSTMENT: f64 = 10.0;
const TILT_ADJUSTMENT: f64 = 5.0;
const ZOOM_ADJUSTMENT: f64 = 0.5;
const PTZ_SPEED: f64 = 0.5;
const ESTIMATED_MOVE_TIME_MS: u32 = 1000;

/// Pattern-matching sessions plus the synthetic detection pipeline stubs.
/// Detections are placeholders with fixed confidence until a real matcher
/// lands behind this interface.
#[derive(Default)]
pub struct PatternSessionStore {
    sessions: RwLock<HashMap<String, PatternSession>>,
}

impl PatternSessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn start(
        &self,
        camera_id: &str,
        target_subjects: Vec<Subject>,
        interval_ms: u32,
    ) -> PatternSession {
        let mut sessions = self.sessions.write().await;

        let session = PatternSession {
            session_id: ids::next_id("session"),
            camera_id: camera_id.to_string(),
            target_subjects,
            interval_ms,
            created_at_ms: epoch_ms(),
        };
        sessions.insert(session.session_id.clone(), session.clone());
        telemetry::metrics::PATTERN_SESSIONS_ACTIVE.set(sessions.len() as i64);

        info!(
            session_id = %session.session_id,
            camera_id = %camera_id,
            interval_ms,
            "pattern matching session started"
        );
        session
    }

    pub async fn stop(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(session_id).is_some();
        if removed {
            telemetry::metrics::PATTERN_SESSIONS_ACTIVE.set(sessions.len() as i64);
            info!(session_id = %session_id, "pattern matching session stopped");
        }
        removed
    }

    pub async fn get(&self, session_id: &str) -> Option<PatternSession> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).cloned()
    }

    pub async fn list(&self) -> Vec<PatternSession> {
        let sessions = self.sessions.read().await;
        sessions.values().cloned().collect()
    }

    /// One synthetic detection per target, fixed confidence and box.
    pub fn synthesize_detections(target_subjects: &[Subject]) -> Vec<DetectedSubject> {
        target_subjects
            .iter()
            .map(|subject| DetectedSubject {
                subject: subject.clone(),
                confidence: DETECTION_CONFIDENCE,
                detected_box: BoundingBox {
                    x: BOUNDING_BOX_X,
                    y: BOUNDING_BOX_Y,
                    width: BOUNDING_BOX_W,
                    height: BOUNDING_BOX_H,
                },
            })
            .collect()
    }

    /// Single-shot detection over a supplied frame.
    pub fn process_image(
        _image: &ImageData,
        target_subjects: &[Subject],
    ) -> (Vec<DetectedSubject>, u32) {
        (Self::synthesize_detections(target_subjects), PROCESSING_TIME_MS)
    }

    /// Deterministic framing adjustment from the current position.
    pub fn calculate_framing(current_ptz: Option<PtzParameters>) -> (PtzParameters, u32) {
        let current = current_ptz.unwrap_or_default();
        let calculated = PtzParameters {
            pan: current.pan + PAN_ADJUSTMENT,
            tilt: current.tilt + TILT_ADJUSTMENT,
            zoom: current.zoom + ZOOM_ADJUSTMENT,
            pan_speed: PTZ_SPEED,
            tilt_speed: PTZ_SPEED,
            zoom_speed: PTZ_SPEED,
        };
        (calculated, ESTIMATED_MOVE_TIME_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subjects() -> Vec<Subject> {
        vec![
            Subject {
                subject_id: "s1".to_string(),
                name: "presenter".to_string(),
            },
            Subject {
                subject_id: "s2".to_string(),
                name: "guest".to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn start_stop_lifecycle() {
        let store = PatternSessionStore::new();
        let session = store.start("cam-1", subjects(), 200).await;

        assert!(!session.session_id.is_empty());
        assert_eq!(session.camera_id, "cam-1");
        assert_eq!(session.interval_ms, 200);

        let fetched = store.get(&session.session_id).await.expect("exists");
        assert_eq!(fetched.target_subjects.len(), 2);

        assert!(store.stop(&session.session_id).await);
        assert!(store.get(&session.session_id).await.is_none());
        assert!(!store.stop(&session.session_id).await);
    }

    #[tokio::test]
    async fn stop_unknown_session_returns_false() {
        let store = PatternSessionStore::new();
        assert!(!store.stop("session-404").await);
    }

    #[test]
    fn synthetic_detections_match_targets() {
        let detections = PatternSessionStore::synthesize_detections(&subjects());
        assert_eq!(detections.len(), 2);
        for detection in &detections {
            assert!((detection.confidence - 0.85).abs() < f64::EPSILON);
            assert!((detection.detected_box.x - 0.2).abs() < f64::EPSILON);
            assert!((detection.detected_box.width - 0.3).abs() < f64::EPSILON);
        }
        assert_eq!(detections[0].subject.subject_id, "s1");
    }

    #[test]
    fn process_image_reports_fixed_processing_time() {
        let image = ImageData {
            camera_id: "cam-1".to_string(),
            format: "jpeg".to_string(),
            width: 1920,
            height: 1080,
            data: String::new(),
        };
        let (detections, time_ms) = PatternSessionStore::process_image(&image, &subjects());
        assert_eq!(detections.len(), 2);
        assert_eq!(time_ms, 50);
    }

    #[test]
    fn framing_adjusts_from_current_position() {
        let current = PtzParameters {
            pan: 1.0,
            tilt: 2.0,
            zoom: 3.0,
            ..Default::default()
        };
        let (calculated, move_time) = PatternSessionStore::calculate_framing(Some(current));
        assert!((calculated.pan - 11.0).abs() < f64::EPSILON);
        assert!((calculated.tilt - 7.0).abs() < f64::EPSILON);
        assert!((calculated.zoom - 3.5).abs() < f64::EPSILON);
        assert!((calculated.pan_speed - 0.5).abs() < f64::EPSILON);
        assert_eq!(move_time, 1000);
    }

    #[test]
    fn framing_without_position_starts_from_neutral() {
        let (calculated, _) = PatternSessionStore::calculate_framing(None);
        assert!((calculated.pan - 10.0).abs() < f64::EPSILON);
        assert!((calculated.zoom - 1.5).abs() < f64::EPSILON);
    }
}
