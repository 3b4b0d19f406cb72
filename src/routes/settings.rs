use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::extractors::JsonBody;
use crate::models::Category;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_settings).put(update_settings))
}

async fn get_settings(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store().get_settings()?))
}

/// Partial update; omitted fields keep their stored value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateSettingsRequest {
    word_count: Option<usize>,
    goal: Option<String>,
}

async fn update_settings(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut settings = state.store().get_settings()?;

    if let Some(word_count) = req.word_count {
        let max = state.config().reservoir.max_daily_words;
        if word_count == 0 || word_count > max {
            return Err(AppError::bad_request(
                "INVALID_WORD_COUNT",
                &format!("wordCount must be between 1 and {max}"),
            ));
        }
        settings.word_count = word_count;
    }
    if let Some(goal) = req.goal {
        settings.goal = goal
            .parse::<Category>()
            .map_err(|e| AppError::bad_request("INVALID_CATEGORY", &e.to_string()))?;
    }

    state.store().save_settings(&settings)?;
    tracing::info!(word_count = settings.word_count, goal = %settings.goal, "Settings updated");
    Ok(ok(settings))
}
