use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::extractors::{JsonBody, QueryParams};
use crate::models::{LearnedWord, Rating, Word};
use crate::response::{created, ok, AppError};
use crate::srs::calculate_next_review;
use crate::srs::stats::{progress_stats, DayStatus};
use crate::srs::SrsUpdate;
use crate::state::AppState;
use crate::store::StoreError;
use crate::validation::{validate_headword, validate_word};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vocabulary).post(add_word))
        .route("/grouped", get(grouped_vocabulary))
        .route("/due", get(due_vocabulary))
        .route("/stats", get(vocabulary_stats))
        .route("/lookup", post(lookup_word))
        .route("/:word", get(get_word).delete(delete_word))
        .route("/:word/review", post(review_word))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    search: Option<String>,
}

async fn list_vocabulary(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let words = match query.search.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => state.store().search_vocabulary(term)?,
        _ => state.store().list_vocabulary()?,
    };
    Ok(ok(words))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DateGroup {
    date: NaiveDate,
    /// Absent for days with words but no logged session.
    status: Option<DayStatus>,
    words: Vec<LearnedWord>,
}

/// Every day with learned words or a logged status, newest first. Declined
/// days appear even when nothing was learned.
async fn grouped_vocabulary(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut by_date = state.store().vocabulary_by_learned_date()?;
    let mut log = state.store().learning_log()?;
    for date in log.keys() {
        by_date.entry(*date).or_default();
    }

    let groups: Vec<DateGroup> = by_date
        .into_iter()
        .rev()
        .map(|(date, words)| DateGroup {
            date,
            status: log.remove(&date),
            words,
        })
        .collect();
    Ok(ok(groups))
}

async fn due_vocabulary(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store().due_vocabulary(state.today())?))
}

async fn vocabulary_stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let vocabulary = state.store().list_vocabulary()?;
    let log = state.store().learning_log()?;
    Ok(ok(progress_stats(&vocabulary, &log, state.today())))
}

fn word_exists(headword: &str) -> AppError {
    AppError::conflict(
        "WORD_EXISTS",
        &format!("'{}' is already in your vocabulary", headword.trim()),
    )
}

async fn add_word(
    State(state): State<AppState>,
    JsonBody(word): JsonBody<Word>,
) -> Result<impl IntoResponse, AppError> {
    validate_word(&word).map_err(|msg| AppError::bad_request("INVALID_WORD", msg))?;
    let learned = LearnedWord::new(
        Word {
            word: word.word.trim().to_string(),
            ..word
        },
        state.today(),
    );

    match state.store().add_learned_word(&learned) {
        Ok(()) => {
            tracing::info!(headword = %learned.word.word, "Word added to vocabulary");
            Ok(created(learned))
        }
        Err(StoreError::Conflict { .. }) => Err(word_exists(&learned.word.word)),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Deserialize)]
struct LookupRequest {
    word: String,
}

/// Fetch full details for a headword so the learner can confirm before adding.
async fn lookup_word(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LookupRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_headword(&req.word).map_err(|msg| AppError::bad_request("INVALID_WORD", msg))?;
    if state.store().get_learned_word(&req.word)?.is_some() {
        return Err(word_exists(&req.word));
    }
    let word = state.generator().lookup_word(req.word.trim()).await?;
    Ok(ok(word))
}

async fn get_word(
    State(state): State<AppState>,
    Path(headword): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let word = state
        .store()
        .get_learned_word(&headword)?
        .ok_or_else(|| AppError::not_found("Word not found"))?;
    Ok(ok(word))
}

async fn delete_word(
    State(state): State<AppState>,
    Path(headword): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store().delete_learned_word(&headword)? {
        return Err(AppError::not_found("Word not found"));
    }
    Ok(ok(serde_json::json!({ "deleted": true, "word": headword })))
}

#[derive(Debug, Deserialize)]
pub(crate) struct RateRequest {
    pub rating: String,
}

pub(crate) fn parse_rating(raw: &str) -> Result<Rating, AppError> {
    raw.parse::<Rating>()
        .map_err(|e| AppError::bad_request("INVALID_RATING", &e.to_string()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReviewResult {
    word: LearnedWord,
    update: SrsUpdate,
}

/// Rate a single word outside a review session.
async fn review_word(
    State(state): State<AppState>,
    Path(headword): Path<String>,
    JsonBody(req): JsonBody<RateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let rating = parse_rating(&req.rating)?;
    let current = state
        .store()
        .get_learned_word(&headword)?
        .ok_or_else(|| AppError::not_found("Word not found"))?;

    let update = calculate_next_review(&current, rating, state.today());
    let word = state.store().update_word_srs(&headword, &update)?;
    tracing::debug!(headword = %word.word.word, ?rating, level = update.srs_level, "Word reviewed");
    Ok(ok(ReviewResult { word, update }))
}
