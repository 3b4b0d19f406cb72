pub const VOCABULARY: &str = "vocabulary";
pub const RESERVOIRS: &str = "reservoirs";
pub const DAILY_LOCKS: &str = "daily_locks";
pub const REVIEW_SESSIONS: &str = "review_sessions";
pub const LEARNING_LOG: &str = "learning_log";
pub const SETTINGS: &str = "settings";
pub const META: &str = "meta";
