use anyhow::Result;
use axum_test::TestServer;
use control_room::{AppState, ServerConfig};
use serde_json::{json, Value};

fn setup_test_server() -> Result<TestServer> {
    let state = AppState::new(ServerConfig::default());
    let app = control_room::routes::router(state);
    Ok(TestServer::new(app)?)
}

async fn enqueue_cinematic(server: &TestServer, camera_id: &str) -> String {
    let response = server
        .post("/v1/ptz/cinematic")
        .json(&json!({
            "camera_id": camera_id,
            "instruction": {
                "camera_id": camera_id,
                "shot_type": "wide",
                "duration_ms": 2000
            }
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["accepted"], true);
    body["task_id"].as_str().expect("task id").to_string()
}

async fn enqueue_ptz(server: &TestServer, camera_id: &str, pan: f64) -> String {
    let response = server
        .post("/v1/ptz/commands")
        .json(&json!({
            "camera_id": camera_id,
            "command": {
                "ptz_parameters": {"pan": pan, "tilt": 0.0, "zoom": 1.0}
            }
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["accepted"], true);
    body["task_id"].as_str().expect("task id").to_string()
}

async fn poll(server: &TestServer, camera_id: &str, completed_task_id: &str) -> Value {
    let response = server
        .post("/v1/ptz/polling")
        .json(&json!({
            "camera_id": camera_id,
            "completed_task_id": completed_task_id
        }))
        .await;
    response.assert_status_ok();
    response.json()
}

async fn queue_status(server: &TestServer, camera_id: &str) -> Value {
    let response = server
        .get("/v1/ptz/queues")
        .add_query_param("camera_id", camera_id)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["camera_queues"][0].clone()
}

#[tokio::test]
async fn ptz_command_preempts_executing_cinematic() -> Result<()> {
    let server = setup_test_server()?;
    let camera = "cam-a";

    // Cinematic task starts executing.
    let cine_id = enqueue_cinematic(&server, camera).await;
    let body = poll(&server, camera, "").await;
    assert_eq!(body["current_command"]["task_id"], cine_id.as_str());
    assert_eq!(body["interrupt"], false);

    // A direct PTZ command arrives: cinematic queue drains immediately.
    let ptz_id = enqueue_ptz(&server, camera, 15.0).await;
    let status = queue_status(&server, camera).await;
    assert_eq!(status["cinematic_queue_size"], 0);
    assert_eq!(status["ptz_queue_size"], 1);

    // The FD learns about the interruption on its next poll.
    let body = poll(&server, camera, "").await;
    assert_eq!(body["current_command"]["task_id"], ptz_id.as_str());
    assert!(body["next_command"].is_null());
    assert_eq!(body["interrupt"], true);

    Ok(())
}

#[tokio::test]
async fn completion_is_idempotent() -> Result<()> {
    let server = setup_test_server()?;
    let camera = "cam-a";

    let cine_id = enqueue_cinematic(&server, camera).await;
    poll(&server, camera, "").await;
    let ptz_id = enqueue_ptz(&server, camera, 5.0).await;
    poll(&server, camera, "").await;

    // Completing the PTZ task empties the camera's queues.
    let body = poll(&server, camera, &ptz_id).await;
    assert!(body["current_command"].is_null());
    assert!(body["next_command"].is_null());
    assert_eq!(body["interrupt"], false);

    let status = queue_status(&server, camera).await;
    assert_eq!(status["ptz_queue_size"], 0);
    assert!(status["executing_task"].is_null());

    // Re-reporting the same completion changes nothing, and a completion
    // for the long-cancelled cinematic task is a no-op too.
    let body = poll(&server, camera, &ptz_id).await;
    assert!(body["current_command"].is_null());
    let body = poll(&server, camera, &cine_id).await;
    assert!(body["current_command"].is_null());

    Ok(())
}

#[tokio::test]
async fn cinematic_tasks_execute_in_enqueue_order() -> Result<()> {
    let server = setup_test_server()?;
    let camera = "cam-d";

    let first = enqueue_cinematic(&server, camera).await;
    let second = enqueue_cinematic(&server, camera).await;
    let third = enqueue_cinematic(&server, camera).await;

    let body = poll(&server, camera, "").await;
    assert_eq!(body["current_command"]["task_id"], first.as_str());
    assert_eq!(body["next_command"]["task_id"], second.as_str());

    let body = poll(&server, camera, &first).await;
    assert_eq!(body["current_command"]["task_id"], second.as_str());
    assert_eq!(body["next_command"]["task_id"], third.as_str());

    let body = poll(&server, camera, &second).await;
    assert_eq!(body["current_command"]["task_id"], third.as_str());
    assert!(body["next_command"].is_null());

    let body = poll(&server, camera, &third).await;
    assert!(body["current_command"].is_null());

    Ok(())
}

#[tokio::test]
async fn empty_camera_id_is_rejected() -> Result<()> {
    let server = setup_test_server()?;

    let response = server
        .post("/v1/ptz/commands")
        .json(&json!({
            "camera_id": "",
            "command": {"ptz_parameters": {"pan": 0.0, "tilt": 0.0, "zoom": 1.0}}
        }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["accepted"], false);

    let response = server
        .post("/v1/ptz/cinematic")
        .json(&json!({
            "camera_id": "",
            "instruction": {"camera_id": "cam-a"}
        }))
        .await;
    assert_eq!(response.status_code(), 400);

    Ok(())
}

#[tokio::test]
async fn polling_acts_as_heartbeat_for_registered_cameras() -> Result<()> {
    let server = setup_test_server()?;

    let camera: Value = server
        .post("/v1/cameras")
        .json(&json!({
            "name": "polling-camera",
            "mode": "autonomous",
            "master_mf_id": "mf-1"
        }))
        .await
        .json();
    let camera_id = camera["id"].as_str().expect("camera id").to_string();

    let response = server
        .post("/v1/ptz/polling")
        .json(&json!({
            "camera_id": camera_id,
            "current_ptz": {"pan": 1.0, "tilt": 2.0, "zoom": 3.0},
            "camera_status": "online"
        }))
        .await;
    response.assert_status_ok();

    let body: Value = server.get(&format!("/v1/cameras/{camera_id}")).await.json();
    assert_eq!(body["camera"]["current_ptz"]["zoom"], 3.0);

    Ok(())
}

#[tokio::test]
async fn queue_status_lists_all_cameras_without_filter() -> Result<()> {
    let server = setup_test_server()?;

    enqueue_ptz(&server, "cam-x", 1.0).await;
    enqueue_cinematic(&server, "cam-y").await;

    let response = server.get("/v1/ptz/queues").await;
    response.assert_status_ok();
    let body: Value = response.json();
    let queues = body["camera_queues"].as_array().expect("queue list");
    assert_eq!(queues.len(), 2);

    Ok(())
}
