use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use common::tasks::{
    EnqueueResponse, PollingRequest, PollingResponse, QueueStatusQuery, QueueStatusResponse,
    SendCinematicCommandRequest, SendPtzCommandRequest,
};
use common::validation::{epoch_ms, validate_id};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/ptz/commands", post(send_ptz_command))
        .route("/v1/ptz/cinematic", post(send_cinematic_command))
        .route("/v1/ptz/polling", post(poll))
        .route("/v1/ptz/queues", get(get_queue_status))
}

/// Operator-issued PTZ command. Arrival preempts the camera's cinematic
/// layer before the task is queued.
async fn send_ptz_command(
    State(state): State<AppState>,
    Json(req): Json<SendPtzCommandRequest>,
) -> impl IntoResponse {
    if validate_id(&req.camera_id, "camera_id").is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(EnqueueResponse {
                accepted: false,
                task_id: String::new(),
                error_message: "camera_id is required".to_string(),
            }),
        )
            .into_response();
    }

    let task_id = state.scheduler.enqueue_ptz(&req.camera_id, req.command).await;
    (
        StatusCode::OK,
        Json(EnqueueResponse {
            accepted: true,
            task_id,
            error_message: String::new(),
        }),
    )
        .into_response()
}

async fn send_cinematic_command(
    State(state): State<AppState>,
    Json(req): Json<SendCinematicCommandRequest>,
) -> impl IntoResponse {
    if validate_id(&req.camera_id, "camera_id").is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(EnqueueResponse {
                accepted: false,
                task_id: String::new(),
                error_message: "camera_id is required".to_string(),
            }),
        )
            .into_response();
    }

    let task_id = state
        .scheduler
        .enqueue_cinematic(&req.camera_id, req.instruction)
        .await;
    (
        StatusCode::OK,
        Json(EnqueueResponse {
            accepted: true,
            task_id,
            error_message: String::new(),
        }),
    )
        .into_response()
}

/// Field-device poll: completion report in, next work out. The poll also
/// counts as a heartbeat for the camera registry.
async fn poll(
    State(state): State<AppState>,
    Json(req): Json<PollingRequest>,
) -> impl IntoResponse {
    if let Err(e) = validate_id(&req.camera_id, "camera_id") {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response();
    }

    // Cameras may poll before they are registered; the heartbeat is simply
    // dropped in that case.
    let _ = state
        .registry
        .update_state(&req.camera_id, req.current_ptz.clone(), req.camera_status)
        .await;

    let (current_command, next_command, interrupt) = state.scheduler.poll(&req).await;
    (
        StatusCode::OK,
        Json(PollingResponse {
            current_command,
            next_command,
            interrupt,
            timestamp_ms: epoch_ms(),
        }),
    )
        .into_response()
}

async fn get_queue_status(
    State(state): State<AppState>,
    Query(query): Query<QueueStatusQuery>,
) -> impl IntoResponse {
    let camera_queues = match query.camera_id.as_deref() {
        Some(camera_id) if !camera_id.is_empty() => {
            vec![state.scheduler.queue_status(camera_id).await]
        }
        _ => state.scheduler.all_queue_statuses().await,
    };

    (StatusCode::OK, Json(QueueStatusResponse { camera_queues })).into_response()
}
