use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::extractors::QueryParams;
use crate::models::Category;
use crate::response::{ok, AppError};
use crate::services::daily_session::DailySession;
use crate::srs::stats::DayStatus;
use crate::state::AppState;
use crate::validation::clamp_daily_count;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/session", get(get_session).delete(clear_session))
        .route("/skip", post(skip_day))
        .route("/reservoirs", get(reservoir_status))
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    category: Option<String>,
    count: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DailySessionResponse {
    #[serde(flatten)]
    session: DailySession,
    /// Words from this session that were new to the vocabulary.
    added_to_vocabulary: usize,
}

fn parse_category(raw: Option<&str>) -> Result<Option<Category>, AppError> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.parse::<Category>()
                .map_err(|e| AppError::bad_request("INVALID_CATEGORY", &e.to_string()))
        })
        .transpose()
}

async fn get_session(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SessionQuery>,
) -> Result<impl IntoResponse, AppError> {
    let settings = state.store().get_settings()?;
    let category = parse_category(query.category.as_deref())?.unwrap_or(settings.goal);
    let count = clamp_daily_count(
        query.count.unwrap_or(settings.word_count),
        state.config().reservoir.max_daily_words,
    );

    let session = state.daily().get_daily_session(category, count).await?;

    let added = state
        .store()
        .add_words_to_vocabulary(&session.words, session.date)?;
    state.store().mark_day(session.date, DayStatus::Learned)?;
    if !added.is_empty() {
        tracing::info!(%category, added = added.len(), "Daily words added to vocabulary");
    }

    Ok(ok(DailySessionResponse {
        session,
        added_to_vocabulary: added.len(),
    }))
}

#[derive(Debug, Deserialize)]
struct ClearQuery {
    category: Option<String>,
}

async fn clear_session(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ClearQuery>,
) -> Result<impl IntoResponse, AppError> {
    let category = parse_category(query.category.as_deref())?;
    let cleared = state.daily().clear_session(category)?;
    Ok(ok(serde_json::json!({ "cleared": cleared })))
}

async fn skip_day(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let today = state.today();
    let status = state.store().mark_day(today, DayStatus::Declined)?;
    Ok(ok(serde_json::json!({ "date": today, "status": status })))
}

async fn reservoir_status(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.daily().reservoir_status()?))
}
