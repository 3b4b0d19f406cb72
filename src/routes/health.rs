use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;
use crate::store::migrate;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .route("/database", get(database_health))
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSecs": state.uptime_secs(),
        "store": {
            "healthy": state.store().ping().is_ok(),
        },
        "generator": {
            "enabled": state.config().llm.enabled,
            "mock": state.config().llm.mock,
        }
    }))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping() {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub async fn database_health(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let healthy = state.store().ping().is_ok();
    let latency_us = start.elapsed().as_micros() as u64;
    let schema_version = migrate::get_current_version(state.store()).ok();

    Json(serde_json::json!({
        "healthy": healthy,
        "latencyUs": latency_us,
        "schemaVersion": schema_version,
        "latestSchemaVersion": migrate::latest_version(),
        "vocabularySize": state.store().count_vocabulary(),
    }))
}
