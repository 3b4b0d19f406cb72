mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::Value;

use common::app::{spawn_test_app, spawn_test_app_with, start_date, TEST_MAX_DAILY_WORDS};
use common::fixtures::{word, UnavailableGenerator};
use common::http::{assert_json_error, assert_status_ok_json, call};
use vocaby_backend::models::Category;
use vocaby_backend::srs::stats::DayStatus;

fn headwords(data: &Value) -> Vec<String> {
    data["words"]
        .as_array()
        .expect("words array")
        .iter()
        .map(|w| w["word"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn it_first_session_selects_and_locks_for_the_day() {
    let app = spawn_test_app().await;

    let (status, body) = call(&app.app, Method::GET, "/api/daily/session", None).await;
    assert_status_ok_json(status, &body);
    let data = &body["data"];
    assert_eq!(data["isNew"], true);
    assert_eq!(data["category"], "general");
    assert_eq!(data["date"], start_date().to_string());
    assert_eq!(data["addedToVocabulary"], 5);
    assert_eq!(
        headwords(data),
        ["Ubiquitous", "Ephemeral", "Meticulous", "Cacophony", "Lethargic"]
    );
    assert!(data["story"].as_str().unwrap().contains("Ubiquitous"));
    // min batch of 8 generated, 5 taken.
    assert_eq!(app.store.reservoir_len(Category::General).unwrap(), 3);

    let (status, again) = call(&app.app, Method::GET, "/api/daily/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["data"]["isNew"], false);
    assert_eq!(again["data"]["addedToVocabulary"], 0);
    assert_eq!(headwords(&again["data"]), headwords(data));
    assert_eq!(again["data"]["story"], data["story"]);
    assert_eq!(app.store.reservoir_len(Category::General).unwrap(), 3);

    assert_eq!(app.store.count_vocabulary(), 5);
    assert_eq!(
        app.store.day_status(start_date()).unwrap(),
        Some(DayStatus::Learned)
    );
}

#[tokio::test]
async fn it_new_day_or_new_count_selects_fresh_words() {
    let app = spawn_test_app().await;

    let (_, first) = call(&app.app, Method::GET, "/api/daily/session?count=4", None).await;
    let first_words = headwords(&first["data"]);

    // Same day, different count: the lock no longer matches.
    let (status, recount) = call(&app.app, Method::GET, "/api/daily/session?count=3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recount["data"]["isNew"], true);
    assert_eq!(
        headwords(&recount["data"]),
        ["Lethargic", "Precipitate", "Ambiguous"]
    );

    app.clock.advance_days(1);
    let (_, tomorrow) = call(&app.app, Method::GET, "/api/daily/session?count=3", None).await;
    assert_eq!(tomorrow["data"]["isNew"], true);
    let tomorrow_words = headwords(&tomorrow["data"]);
    assert_eq!(tomorrow_words.len(), 3);
    for w in &tomorrow_words {
        assert!(!first_words.contains(w), "{w} was served twice");
    }
}

#[tokio::test]
async fn it_categories_have_independent_sessions() {
    let app = spawn_test_app().await;

    let (_, general) = call(&app.app, Method::GET, "/api/daily/session?category=general&count=2", None).await;
    let (status, ielts) = call(&app.app, Method::GET, "/api/daily/session?category=IELTS&count=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ielts["data"]["category"], "ielts");
    assert_ne!(headwords(&general["data"]), headwords(&ielts["data"]));

    assert!(app.store.get_daily_lock(Category::General).unwrap().is_some());
    assert!(app.store.get_daily_lock(Category::Ielts).unwrap().is_some());
    assert!(app.store.get_daily_lock(Category::Competitive).unwrap().is_none());
}

#[tokio::test]
async fn it_count_is_clamped_and_validated() {
    let app = spawn_test_app().await;

    let (status, body) = call(&app.app, Method::GET, "/api/daily/session?count=50", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headwords(&body["data"]).len(), TEST_MAX_DAILY_WORDS);

    let (status, body) = call(&app.app, Method::GET, "/api/daily/session?count=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_COUNT");

    let (status, body) = call(&app.app, Method::GET, "/api/daily/session?count=many", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_QUERY");

    let (status, body) = call(&app.app, Method::GET, "/api/daily/session?category=toefl", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_CATEGORY");
}

#[tokio::test]
async fn it_generation_failure_leaves_no_trace() {
    let generator = Arc::new(UnavailableGenerator::default());
    let app = spawn_test_app_with(generator.clone()).await;

    let (status, body) = call(&app.app, Method::GET, "/api/daily/session", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_json_error(&body, "GENERATION_FAILED");
    assert!(body["traceId"].is_string());

    assert_eq!(generator.word_calls.load(Ordering::SeqCst), 1);
    assert!(app.store.get_daily_lock(Category::General).unwrap().is_none());
    assert_eq!(app.store.count_vocabulary(), 0);
    assert_eq!(app.store.day_status(start_date()).unwrap(), None);
}

#[tokio::test]
async fn it_stocked_reservoir_is_served_without_generation() {
    let generator = Arc::new(UnavailableGenerator::default());
    let app = spawn_test_app_with(generator.clone()).await;
    let stock: Vec<_> = ["Alpha", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot"]
        .iter()
        .map(|h| word(h, "অর্থ"))
        .collect();
    app.store
        .append_to_reservoir(Category::Competitive, &stock)
        .unwrap();

    let (status, body) = call(
        &app.app,
        Method::GET,
        "/api/daily/session?category=competitive&count=3",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headwords(&body["data"]), ["Alpha", "Bravo", "Charlie"]);
    assert_eq!(generator.word_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        app.store
            .reservoir(Category::Competitive)
            .unwrap()
            .iter()
            .map(|w| w.word.as_str())
            .collect::<Vec<_>>(),
        ["Delta", "Echo", "Foxtrot"]
    );
}

#[tokio::test]
async fn it_clearing_a_session_forces_reselection() {
    let app = spawn_test_app().await;

    let (_, first) = call(&app.app, Method::GET, "/api/daily/session?count=2", None).await;

    let (status, cleared) = call(
        &app.app,
        Method::DELETE,
        "/api/daily/session?category=general",
        None,
    )
    .await;
    assert_status_ok_json(status, &cleared);
    assert_eq!(cleared["data"]["cleared"], 1);

    let (_, second) = call(&app.app, Method::GET, "/api/daily/session?count=2", None).await;
    assert_eq!(second["data"]["isNew"], true);
    assert_ne!(headwords(&second["data"]), headwords(&first["data"]));

    let (_, cleared_all) = call(&app.app, Method::DELETE, "/api/daily/session", None).await;
    assert_eq!(cleared_all["data"]["cleared"], 1);
}

#[tokio::test]
async fn it_skip_marks_declined_but_learning_wins() {
    let app = spawn_test_app().await;

    let (status, body) = call(&app.app, Method::POST, "/api/daily/skip", None).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["status"], "declined");

    call(&app.app, Method::GET, "/api/daily/session?count=1", None).await;
    let (_, body) = call(&app.app, Method::POST, "/api/daily/skip", None).await;
    assert_eq!(body["data"]["status"], "learned");
}

#[tokio::test]
async fn it_reports_reservoir_status_for_every_category() {
    let app = spawn_test_app().await;
    call(&app.app, Method::GET, "/api/daily/session?count=5", None).await;

    let (status, body) = call(&app.app, Method::GET, "/api/daily/reservoirs", None).await;
    assert_status_ok_json(status, &body);
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["category"], "general");
    assert_eq!(entries[0]["size"], 3);
    assert_eq!(entries[0]["lowWaterMark"], 2);
    assert_eq!(entries[1]["size"], 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn it_concurrent_requests_never_double_consume() {
    let app = spawn_test_app().await;
    let stock: Vec<_> = (0..20)
        .map(|i| word(&format!("stock{}", char::from(b'a' + i)), "অর্থ"))
        .collect();
    app.store
        .append_to_reservoir(Category::General, &stock)
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let router = app.app.clone();
        handles.push(tokio::spawn(async move {
            call(&router, Method::GET, "/api/daily/session?count=3", None).await
        }));
    }

    // Late requests find the winner's lock and serve it instead of failing.
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(headwords(&body["data"]), ["stocka", "stockb", "stockc"]);
    }
    assert_eq!(app.store.reservoir_len(Category::General).unwrap(), 17);
    assert_eq!(app.store.count_vocabulary(), 3);
}
