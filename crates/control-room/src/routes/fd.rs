use crate::sessions::PatternSessionStore;
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
use common::detection::{
    CalculateFramingRequest, CalculateFramingResponse, PatternMatchResult, PatternSession,
    ProcessImageRequest, ProcessImageResponse, StartPatternMatchingRequest,
    StartPatternMatchingResponse, StopPatternMatchingResponse,
};
use common::ptz::{
    CameraState, CinematicInstruction, ControlCommand, ControlCommandResult,
};
use common::validation::{epoch_ms, validate_id};
use futures::stream::{SplitSink, StreamExt};
use futures::SinkExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tokio::time;
use tracing::debug;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/fd/pattern-matching", post(start_pattern_matching))
        .route(
            "/v1/fd/pattern-matching/:session_id",
            get(get_pattern_session).delete(stop_pattern_matching),
        )
        .route(
            "/v1/fd/pattern-matching/:session_id/results",
            get(stream_pattern_results),
        )
        .route("/v1/fd/process-image", post(process_image))
        .route("/v1/fd/framing", post(calculate_framing))
        .route("/v1/fd/cinematography", post(execute_cinematography))
        .route("/v1/fd/control-commands", post(send_control_command))
        .route("/v1/fd/control-commands/stream", get(stream_control_commands))
}

async fn start_pattern_matching(
    State(state): State<AppState>,
    Json(req): Json<StartPatternMatchingRequest>,
) -> impl IntoResponse {
    if let Err(e) = validate_id(&req.camera_id, "camera_id") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": e.to_string()})),
        )
            .into_response();
    }

    let session = state
        .sessions
        .start(&req.camera_id, req.target_subjects, req.interval_ms)
        .await;
    (
        StatusCode::CREATED,
        Json(StartPatternMatchingResponse {
            success: true,
            session_id: session.session_id,
        }),
    )
        .into_response()
}

async fn stop_pattern_matching(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    if state.sessions.stop(&session_id).await {
        (StatusCode::OK, Json(StopPatternMatchingResponse { success: true })).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "pattern matching session not found"})),
        )
            .into_response()
    }
}

async fn get_pattern_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.sessions.get(&session_id).await {
        Some(session) => (StatusCode::OK, Json(session)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "pattern matching session not found"})),
        )
            .into_response(),
    }
}

async fn stream_pattern_results(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(session) = state.sessions.get(&session_id).await else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "pattern matching session not found"})),
        )
            .into_response();
    };

    ws.on_upgrade(move |socket| handle_pattern_stream(socket, state, session))
}

/// Emit synthetic detections at the session cadence until the client
/// disconnects or the session is stopped.
async fn handle_pattern_stream(socket: WebSocket, state: AppState, session: PatternSession) {
    let (mut sender, mut receiver) = socket.split();
    let interval = Duration::from_millis(session.interval_ms.max(1) as u64);
    let mut ticker = time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Stopping the session ends every live result stream.
                if state.sessions.get(&session.session_id).await.is_none() {
                    return;
                }

                let result = PatternMatchResult {
                    session_id: session.session_id.clone(),
                    camera_id: session.camera_id.clone(),
                    detected_subjects: PatternSessionStore::synthesize_detections(
                        &session.target_subjects,
                    ),
                    timestamp_ms: epoch_ms(),
                };

                let Ok(frame) = serde_json::to_string(&result) else {
                    continue;
                };
                if sender.send(Message::Text(frame)).await.is_err() {
                    return;
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

async fn process_image(
    State(_state): State<AppState>,
    Json(req): Json<ProcessImageRequest>,
) -> impl IntoResponse {
    let (detected_subjects, processing_time_ms) =
        PatternSessionStore::process_image(&req.image, &req.target_subjects);
    (
        StatusCode::OK,
        Json(ProcessImageResponse {
            detected_subjects,
            processing_time_ms,
        }),
    )
        .into_response()
}

async fn calculate_framing(
    State(_state): State<AppState>,
    Json(req): Json<CalculateFramingRequest>,
) -> impl IntoResponse {
    let (calculated_ptz, estimated_move_time_ms) =
        PatternSessionStore::calculate_framing(req.current_ptz);
    (
        StatusCode::OK,
        Json(CalculateFramingResponse {
            calculated_ptz,
            estimated_move_time_ms,
            success: true,
            error_message: String::new(),
        }),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct ExecuteCinematographyRequest {
    instruction: CinematicInstruction,
}

async fn execute_cinematography(
    State(state): State<AppState>,
    Json(req): Json<ExecuteCinematographyRequest>,
) -> impl IntoResponse {
    let result = state.dispatcher.execute_cinematography(req.instruction).await;
    (StatusCode::OK, Json(json!({"result": result}))).into_response()
}

/// Legacy synchronous command path, shared with the fallback bridge.
pub(crate) async fn send_control_command(
    State(state): State<AppState>,
    Json(command): Json<ControlCommand>,
) -> Response {
    if validate_id(&command.camera_id, "camera_id").is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "camera_id is required"})),
        )
            .into_response();
    }

    let result = state.dispatcher.send_control_command(command).await;
    (StatusCode::OK, Json(result)).into_response()
}

#[derive(Debug, Deserialize)]
struct ControlStreamQuery {
    camera_id: Option<String>,
}

/// Messages a field device may push up the control stream.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum FdStreamInbound {
    Command { command: ControlCommand },
    State { state: CameraState },
    Result { result: ControlCommandResult },
}

/// Frames the server pushes down the control stream.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum FdStreamOutbound {
    Status {
        connected: bool,
        message: String,
        timestamp_ms: i64,
    },
    Command {
        command: ControlCommand,
        timestamp_ms: i64,
    },
    Result {
        result: ControlCommandResult,
        timestamp_ms: i64,
    },
}

async fn stream_control_commands(
    State(state): State<AppState>,
    Query(query): Query<ControlStreamQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let camera_id = query.camera_id.unwrap_or_default();
    if validate_id(&camera_id, "camera_id").is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "camera_id is required"})),
        )
            .into_response();
    }

    ws.on_upgrade(move |socket| handle_control_stream(socket, state, camera_id))
}

/// Push bus events to the field device and absorb its inline commands and
/// state reports, until either side closes.
async fn handle_control_stream(socket: WebSocket, state: AppState, camera_id: String) {
    let mut subscription = state.bus.subscribe(&camera_id).await;
    let (mut sender, mut receiver) = socket.split();

    let connected = FdStreamOutbound::Status {
        connected: true,
        message: format!("subscribed to control commands for camera {camera_id}"),
        timestamp_ms: epoch_ms(),
    };
    if send_frame(&mut sender, &connected).await.is_err() {
        state.bus.unsubscribe(&subscription).await;
        return;
    }

    loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else { break };
                if let Some(command) = event.command {
                    let frame = FdStreamOutbound::Command {
                        command,
                        timestamp_ms: event.timestamp_ms,
                    };
                    if send_frame(&mut sender, &frame).await.is_err() {
                        break;
                    }
                }
                if let Some(result) = event.result {
                    let frame = FdStreamOutbound::Result {
                        result,
                        timestamp_ms: event.timestamp_ms,
                    };
                    if send_frame(&mut sender, &frame).await.is_err() {
                        break;
                    }
                }
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<FdStreamInbound>(&text) {
                            Ok(FdStreamInbound::Command { command }) => {
                                let result = state.dispatcher.send_control_command(command).await;
                                let frame = FdStreamOutbound::Result {
                                    result,
                                    timestamp_ms: epoch_ms(),
                                };
                                if send_frame(&mut sender, &frame).await.is_err() {
                                    break;
                                }
                            }
                            Ok(FdStreamInbound::State { state: report }) => {
                                state
                                    .registry
                                    .update_state(
                                        &report.camera_id,
                                        report.current_ptz.clone(),
                                        report.status,
                                    )
                                    .await;
                            }
                            Ok(FdStreamInbound::Result { .. }) => {}
                            Err(e) => {
                                debug!(error = %e, "ignoring malformed control stream message");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.bus.unsubscribe(&subscription).await;
}

async fn send_frame<T: Serialize>(
    sender: &mut SplitSink<WebSocket, Message>,
    frame: &T,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(frame).map_err(axum::Error::new)?;
    sender.send(Message::Text(json)).await
}
