use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use common::cameras::{
    CameraListQuery, CameraStatus, ConnectionStatusChange, RegisterCameraRequest,
    SwitchCameraModeRequest, UpdateCameraRequest,
};
use common::validation::{epoch_ms, validate_id};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time;
use tracing::info;

/// Cadence of the connection-status diff loop.
const STATUS_POLL_INTERVAL_MS: u64 = 500;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/cameras", post(register_camera).get(list_cameras))
        .route(
            "/v1/cameras/:camera_id",
            get(get_camera).put(update_camera).delete(unregister_camera),
        )
        .route("/v1/cameras/:camera_id/mode", post(switch_camera_mode))
        .route("/v1/cameras/status/stream", get(stream_connection_status))
}

async fn register_camera(
    State(state): State<AppState>,
    Json(req): Json<RegisterCameraRequest>,
) -> impl IntoResponse {
    let camera = state.registry.register(req).await;
    (StatusCode::CREATED, Json(camera)).into_response()
}

async fn list_cameras(
    State(state): State<AppState>,
    Query(query): Query<CameraListQuery>,
) -> impl IntoResponse {
    let mode_filter: Vec<_> = query.mode.into_iter().collect();
    let status_filter: Vec<_> = query.status.into_iter().collect();

    let cameras = state
        .registry
        .list(query.master_mf_id.as_deref(), &mode_filter, &status_filter)
        .await;

    let total_count = cameras.len();
    (
        StatusCode::OK,
        Json(json!({
            "cameras": cameras,
            "total_count": total_count,
        })),
    )
        .into_response()
}

async fn get_camera(
    State(state): State<AppState>,
    Path(camera_id): Path<String>,
) -> impl IntoResponse {
    if let Err(e) = validate_id(&camera_id, "camera_id") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": e.to_string()})),
        )
            .into_response();
    }

    match state.registry.get(&camera_id).await {
        Some((camera, connection, capabilities)) => (
            StatusCode::OK,
            Json(json!({
                "camera": camera,
                "connection": connection,
                "capabilities": capabilities,
            })),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "camera not found"})),
        )
            .into_response(),
    }
}

async fn update_camera(
    State(state): State<AppState>,
    Path(camera_id): Path<String>,
    Json(req): Json<UpdateCameraRequest>,
) -> impl IntoResponse {
    if let Err(e) = validate_id(&camera_id, "camera_id") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": e.to_string()})),
        )
            .into_response();
    }

    match state.registry.update(&camera_id, req).await {
        Some(camera) => {
            info!(camera_id = %camera.id, camera_name = %camera.name, "camera updated");
            (StatusCode::OK, Json(camera)).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "camera not found"})),
        )
            .into_response(),
    }
}

async fn unregister_camera(
    State(state): State<AppState>,
    Path(camera_id): Path<String>,
) -> impl IntoResponse {
    if let Err(e) = validate_id(&camera_id, "camera_id") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": e.to_string()})),
        )
            .into_response();
    }

    if state.registry.unregister(&camera_id).await {
        (StatusCode::NO_CONTENT, Json(json!({}))).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "camera not found"})),
        )
            .into_response()
    }
}

async fn switch_camera_mode(
    State(state): State<AppState>,
    Path(camera_id): Path<String>,
    Json(req): Json<SwitchCameraModeRequest>,
) -> impl IntoResponse {
    if let Err(e) = validate_id(&camera_id, "camera_id") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": e.to_string()})),
        )
            .into_response();
    }

    if !state.registry.switch_mode(&camera_id, req.target_mode).await {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "camera not found"})),
        )
            .into_response();
    }

    match state.registry.get(&camera_id).await {
        Some((camera, _, _)) => {
            info!(camera_id = %camera_id, mode = ?req.target_mode, "camera mode switched");
            (StatusCode::OK, Json(json!({"success": true, "camera": camera}))).into_response()
        }
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "camera disappeared during mode switch"})),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct StatusStreamQuery {
    /// Comma-separated camera ids; empty means all cameras.
    camera_ids: Option<String>,
}

async fn stream_connection_status(
    State(state): State<AppState>,
    Query(query): Query<StatusStreamQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let camera_ids: Vec<String> = query
        .camera_ids
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    ws.on_upgrade(move |socket| handle_status_stream(socket, state, camera_ids))
}

/// Push a frame whenever a watched camera's status changes, until the client
/// disconnects.
async fn handle_status_stream(socket: WebSocket, state: AppState, camera_ids: Vec<String>) {
    let (mut sender, mut receiver) = socket.split();
    let mut previous: HashMap<String, CameraStatus> = HashMap::new();
    let mut ticker = time::interval(Duration::from_millis(STATUS_POLL_INTERVAL_MS));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let statuses = state.registry.connection_statuses(&camera_ids).await;
                for (camera_id, current) in statuses {
                    if previous.get(&camera_id) == Some(&current) {
                        continue;
                    }

                    let change = ConnectionStatusChange {
                        camera_id: camera_id.clone(),
                        previous_status: previous.get(&camera_id).copied(),
                        current_status: current,
                        timestamp_ms: epoch_ms(),
                    };

                    let Ok(frame) = serde_json::to_string(&change) else {
                        continue;
                    };
                    if sender.send(Message::Text(frame)).await.is_err() {
                        return;
                    }
                    previous.insert(camera_id, current);
                }
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}
