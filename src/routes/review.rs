use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::routes::vocabulary::{parse_rating, RateRequest};
use crate::srs::review::{ChoiceOutcome, RatedCard, ReviewCard};
use crate::srs::ReviewSession;
use crate::state::AppState;
use crate::store::StoreError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session))
        .route("/sessions/:id/start", post(start_session))
        .route("/sessions/:id/choose", post(choose_option))
        .route("/sessions/:id/reveal", post(reveal_card))
        .route("/sessions/:id/rate", post(rate_card))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView<'a> {
    id: &'a str,
    status: &'static str,
    total: usize,
    remaining: usize,
    rated: &'a [RatedCard],
    card: Option<ReviewCard<'a>>,
}

impl<'a> From<&'a ReviewSession> for SessionView<'a> {
    fn from(session: &'a ReviewSession) -> Self {
        Self {
            id: &session.id,
            status: session.state.name(),
            total: session.total(),
            remaining: session.remaining(),
            rated: &session.rated,
            card: session.current(),
        }
    }
}

async fn create_session(State(state): State<AppState>) -> Result<Response, AppError> {
    let store = state.store();
    let vocabulary = store.list_vocabulary()?;
    let mut pool = store.vocabulary_meanings()?;
    pool.extend(store.reservoir_meanings()?);

    let id = uuid::Uuid::new_v4().to_string();
    let today = state.today();
    let session =
        state.with_review_rng(|rng| ReviewSession::new(id, &vocabulary, &pool, today, rng));
    store.put_review_session(&session)?;

    tracing::info!(session_id = %session.id, due = session.total(), "Review session created");
    Ok(created(SessionView::from(&session)).into_response())
}

fn load(state: &AppState, id: &str) -> Result<ReviewSession, AppError> {
    state.store().get_review_session(id).map_err(|e| match e {
        StoreError::NotFound { .. } => AppError::not_found("Review session not found"),
        other => other.into(),
    })
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let session = load(&state, &id)?;
    Ok(ok(SessionView::from(&session)).into_response())
}

async fn start_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let mut session = load(&state, &id)?;
    session.start()?;
    state.store().put_review_session(&session)?;
    Ok(ok(SessionView::from(&session)).into_response())
}

#[derive(Debug, Deserialize)]
struct ChooseRequest {
    option: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChooseResponse<'a> {
    choice: ChoiceOutcome,
    session: SessionView<'a>,
}

async fn choose_option(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<ChooseRequest>,
) -> Result<Response, AppError> {
    let mut session = load(&state, &id)?;
    let choice = session.choose(&req.option)?;
    state.store().put_review_session(&session)?;
    Ok(ok(ChooseResponse {
        choice,
        session: SessionView::from(&session),
    })
    .into_response())
}

async fn reveal_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let mut session = load(&state, &id)?;
    session.reveal()?;
    state.store().put_review_session(&session)?;
    Ok(ok(SessionView::from(&session)).into_response())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RateResponse<'a> {
    result: RatedCard,
    session: SessionView<'a>,
}

async fn rate_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<RateRequest>,
) -> Result<Response, AppError> {
    let rating = parse_rating(&req.rating)?;
    let mut session = load(&state, &id)?;
    let result = session.rate(rating, state.today())?;

    let updated = state
        .store()
        .commit_review_rating(&session, &result.headword, &result.update)?;
    // Deleted mid-session: the queue is a snapshot, so keep going.
    if updated.is_none() {
        tracing::warn!(headword = %result.headword, "Rated word no longer in vocabulary");
    }

    if session.is_finished() {
        tracing::info!(session_id = %session.id, rated = session.rated.len(), "Review session completed");
    }
    Ok(ok(RateResponse {
        result,
        session: SessionView::from(&session),
    })
    .into_response())
}
