mod common;

use axum::http::{Method, StatusCode};

use common::app::spawn_test_app;
use common::http::{assert_json_error, call, request, response_json};

#[tokio::test]
async fn it_health_live_and_ready() {
    let app = spawn_test_app().await;

    let live = request(&app.app, Method::GET, "/health/live", None).await;
    assert_eq!(live.status(), StatusCode::OK);

    let ready = request(&app.app, Method::GET, "/health/ready", None).await;
    assert_eq!(ready.status(), StatusCode::OK);

    let (status, body) = call(&app.app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"]["healthy"], true);
    assert_eq!(body["generator"]["mock"], true);
}

#[tokio::test]
async fn it_health_database_reports_schema_and_size() {
    let app = spawn_test_app().await;
    call(&app.app, Method::GET, "/api/daily/session?count=3", None).await;

    let (status, body) = call(&app.app, Method::GET, "/health/database", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["healthy"], true);
    assert_eq!(body["schemaVersion"], body["latestSchemaVersion"]);
    assert_eq!(body["vocabularySize"], 3);
}

#[tokio::test]
async fn it_unknown_routes_get_json_404_with_trace_id() {
    let app = spawn_test_app().await;

    let (status, headers, body) =
        response_json(request(&app.app, Method::GET, "/api/nope", None).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_json_error(&body, "NOT_FOUND");
    let header_id = headers["x-request-id"].to_str().unwrap();
    assert_eq!(body["traceId"], header_id);
}
