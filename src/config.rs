use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use std::fmt;

use crate::constants::{
    DEFAULT_LOW_WATER_MARK, DEFAULT_MAX_DAILY_WORDS, DEFAULT_MIN_BATCH_SIZE,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub cors_origin: String,
    pub worker: WorkerConfig,
    pub reservoir: ReservoirConfig,
    pub review: ReviewConfig,
    pub llm: LLMConfig,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub is_leader: bool,
    pub enable_reservoir_refill: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservoirConfig {
    /// Smallest batch requested from the generator when topping up a reservoir.
    pub min_batch_size: usize,
    /// Below this size a background refill is started after a selection.
    pub low_water_mark: usize,
    /// Upper bound for the words requested in one daily session.
    pub max_daily_words: usize,
}

impl Default for ReservoirConfig {
    fn default() -> Self {
        Self {
            min_batch_size: DEFAULT_MIN_BATCH_SIZE,
            low_water_mark: DEFAULT_LOW_WATER_MARK,
            max_daily_words: DEFAULT_MAX_DAILY_WORDS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReviewConfig {
    /// Fixed seed for queue shuffling and distractor selection.
    pub shuffle_seed: Option<u64>,
}

#[derive(Clone)]
pub struct LLMConfig {
    pub enabled: bool,
    pub mock: bool,
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LLMConfig")
            .field("enabled", &self.enabled)
            .field("mock", &self.mock)
            .field("api_url", &self.api_url)
            .field("api_key", &"***REDACTED***")
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mock: true,
            api_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: String::new(),
            model: "gemini-2.5-flash".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let llm_defaults = LLMConfig::default();
        let reservoir_defaults = ReservoirConfig::default();
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/vocaby.sled"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            worker: WorkerConfig {
                is_leader: env_or_bool("WORKER_LEADER", true),
                enable_reservoir_refill: env_or_bool("ENABLE_RESERVOIR_REFILL_WORKER", true),
            },
            reservoir: ReservoirConfig {
                min_batch_size: env_or_parse(
                    "RESERVOIR_MIN_BATCH",
                    reservoir_defaults.min_batch_size,
                )
                .max(1),
                low_water_mark: env_or_parse(
                    "RESERVOIR_LOW_WATER_MARK",
                    reservoir_defaults.low_water_mark,
                ),
                max_daily_words: env_or_parse(
                    "MAX_DAILY_WORDS",
                    reservoir_defaults.max_daily_words,
                )
                .max(1),
            },
            review: ReviewConfig {
                shuffle_seed: env_opt_parse("REVIEW_SHUFFLE_SEED"),
            },
            llm: LLMConfig {
                enabled: env_or_bool("LLM_ENABLED", llm_defaults.enabled),
                mock: env_or_bool("LLM_MOCK", llm_defaults.mock),
                api_url: env_or("LLM_API_URL", &llm_defaults.api_url),
                api_key: env_or("LLM_API_KEY", ""),
                model: env_or("LLM_MODEL", &llm_defaults.model),
                timeout_secs: env_or_parse("LLM_TIMEOUT_SECS", llm_defaults.timeout_secs),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    env_opt_parse(key).unwrap_or(default)
}

pub fn env_opt_parse<T: FromStr>(key: &str) -> Option<T> {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                None
            }
        },
        Err(_) => None,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
