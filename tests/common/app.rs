use std::sync::Arc;

use axum::Router;
use chrono::NaiveDate;
use tempfile::TempDir;
use tokio::sync::broadcast;

use vocaby_backend::clock::FixedClock;
use vocaby_backend::config::{Config, LLMConfig, ReservoirConfig, ReviewConfig, WorkerConfig};
use vocaby_backend::routes::build_router;
use vocaby_backend::services::generator::WordGenerator;
use vocaby_backend::services::llm_provider::LlmProvider;
use vocaby_backend::state::AppState;
use vocaby_backend::store::Store;

pub const TEST_MIN_BATCH: usize = 8;
pub const TEST_LOW_WATER_MARK: usize = 2;
pub const TEST_MAX_DAILY_WORDS: usize = 10;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub store: Arc<Store>,
    pub clock: Arc<FixedClock>,
    pub config: Config,
    _temp_dir: TempDir,
}

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 2).expect("valid date")
}

fn test_config(sled_path: String) -> Config {
    // Built directly so parallel tests never race on process env vars.
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path,
        cors_origin: "http://localhost:5173".to_string(),
        worker: WorkerConfig {
            is_leader: false,
            enable_reservoir_refill: false,
        },
        reservoir: ReservoirConfig {
            min_batch_size: TEST_MIN_BATCH,
            low_water_mark: TEST_LOW_WATER_MARK,
            max_daily_words: TEST_MAX_DAILY_WORDS,
        },
        review: ReviewConfig {
            shuffle_seed: Some(7),
        },
        llm: LLMConfig {
            enabled: true,
            mock: true,
            api_url: String::new(),
            api_key: String::new(),
            model: "test-model".to_string(),
            timeout_secs: 5,
        },
    }
}

pub async fn spawn_test_app_with(generator: Arc<dyn WordGenerator>) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("vocaby-test.sled");
    let config = test_config(sled_path.to_string_lossy().to_string());

    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    store.run_migrations().expect("run migrations");

    let clock = Arc::new(FixedClock::new(start_date()));
    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let state = AppState::new(
        store.clone(),
        generator,
        clock.clone(),
        &config,
        shutdown_tx,
    );

    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        store,
        clock,
        config,
        _temp_dir: temp_dir,
    }
}

/// App backed by the deterministic mock generator.
pub async fn spawn_test_app() -> TestApp {
    let llm = test_config(String::new()).llm;
    spawn_test_app_with(Arc::new(LlmProvider::new(&llm))).await
}
