use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use common::outputs::{
    OutputListQuery, StartStreamingRequest, SwitchSourceRequest, VideoOutputConfig,
};
use common::validation::validate_id;
use serde_json::json;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/outputs", post(configure_output).get(list_outputs))
        .route("/v1/outputs/:output_id", get(get_output))
        .route("/v1/outputs/:output_id/start", post(start_streaming))
        .route("/v1/outputs/:output_id/stop", post(stop_streaming))
        .route("/v1/outputs/:output_id/source", post(switch_source))
}

async fn configure_output(
    State(state): State<AppState>,
    Json(config): Json<VideoOutputConfig>,
) -> impl IntoResponse {
    let output = state.outputs.configure(config).await;
    (StatusCode::CREATED, Json(output)).into_response()
}

async fn list_outputs(
    State(state): State<AppState>,
    Query(query): Query<OutputListQuery>,
) -> impl IntoResponse {
    let type_filter: Vec<_> = query.output_type.into_iter().collect();
    let status_filter: Vec<_> = query.status.into_iter().collect();
    let outputs = state.outputs.list(&type_filter, &status_filter).await;
    (StatusCode::OK, Json(json!({"outputs": outputs}))).into_response()
}

async fn get_output(
    State(state): State<AppState>,
    Path(output_id): Path<String>,
) -> impl IntoResponse {
    match state.outputs.get(&output_id).await {
        Some(output) => (StatusCode::OK, Json(output)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "video output not found"})),
        )
            .into_response(),
    }
}

async fn start_streaming(
    State(state): State<AppState>,
    Path(output_id): Path<String>,
    Json(req): Json<StartStreamingRequest>,
) -> impl IntoResponse {
    if let Err(e) = validate_id(&req.source_camera_id, "source_camera_id") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": e.to_string()})),
        )
            .into_response();
    }

    if state
        .outputs
        .start_streaming(&output_id, &req.source_camera_id)
        .await
    {
        (StatusCode::OK, Json(json!({"success": true}))).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "video output not found"})),
        )
            .into_response()
    }
}

async fn stop_streaming(
    State(state): State<AppState>,
    Path(output_id): Path<String>,
) -> impl IntoResponse {
    if state.outputs.stop_streaming(&output_id).await {
        (StatusCode::OK, Json(json!({"success": true}))).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "video output not found"})),
        )
            .into_response()
    }
}

async fn switch_source(
    State(state): State<AppState>,
    Path(output_id): Path<String>,
    Json(req): Json<SwitchSourceRequest>,
) -> impl IntoResponse {
    if let Err(e) = validate_id(&req.source_camera_id, "source_camera_id") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": e.to_string()})),
        )
            .into_response();
    }

    if state
        .outputs
        .switch_source(&output_id, &req.source_camera_id)
        .await
    {
        (StatusCode::OK, Json(json!({"success": true}))).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "video output not found"})),
        )
            .into_response()
    }
}
