use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use common::ptz::CameraState;
use common::validation::{validate_id, validate_timeout_ms};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// HTTP bridge for field devices that cannot hold a bidirectional stream.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/fallback/control-commands",
            get(poll_control_commands).post(super::fd::send_control_command),
        )
        .route("/v1/fallback/camera-state", post(report_camera_state))
}

#[derive(Debug, Deserialize)]
struct PollQuery {
    camera_id: Option<String>,
    timeout_ms: Option<i64>,
}

/// Wait for one PTZ event, up to the requested timeout. No event within the
/// window is a normal outcome, reported as No-Content.
async fn poll_control_commands(
    State(state): State<AppState>,
    Query(query): Query<PollQuery>,
) -> impl IntoResponse {
    let camera_id = query.camera_id.unwrap_or_default();
    if let Err(e) = validate_id(&camera_id, "camera_id") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": e.to_string()})),
        )
            .into_response();
    }

    let timeout_ms = match query.timeout_ms {
        Some(raw) => match validate_timeout_ms(raw, "timeout_ms") {
            Ok(value) => value,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": e.to_string()})),
                )
                    .into_response();
            }
        },
        None => state.config.long_poll_timeout_ms,
    };

    let mut subscription = state.bus.subscribe(&camera_id).await;
    let outcome = tokio::select! {
        _ = state.shutdown.cancelled() => None,
        result = tokio::time::timeout(Duration::from_millis(timeout_ms), subscription.recv()) => {
            Some(result)
        }
    };
    state.bus.unsubscribe(&subscription).await;

    match outcome {
        // Cancellation is distinct from an empty window: the caller should
        // reissue, not treat it as "no event".
        None => (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({"error": "request cancelled"})),
        )
            .into_response(),
        Some(Ok(Some(event))) if event.command.is_some() || event.result.is_some() => {
            (StatusCode::OK, Json(event)).into_response()
        }
        // Empty event, closed subscription, or timeout: nothing to deliver.
        Some(_) => StatusCode::NO_CONTENT.into_response(),
    }
}

/// State report from a field device; doubles as its heartbeat.
async fn report_camera_state(
    State(state): State<AppState>,
    Json(report): Json<CameraState>,
) -> impl IntoResponse {
    if let Err(e) = validate_id(&report.camera_id, "camera_id") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": e.to_string()})),
        )
            .into_response();
    }

    if state
        .registry
        .update_state(&report.camera_id, report.current_ptz.clone(), report.status)
        .await
    {
        StatusCode::NO_CONTENT.into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "camera not found"})),
        )
            .into_response()
    }
}
