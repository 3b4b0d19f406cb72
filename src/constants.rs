/// Minimum number of words requested from the generator per reservoir top-up
pub const DEFAULT_MIN_BATCH_SIZE: usize = 30;

/// Reservoir size below which a background refill is triggered
pub const DEFAULT_LOW_WATER_MARK: usize = 15;

/// Upper bound on words per daily session
pub const DEFAULT_MAX_DAILY_WORDS: usize = 10;

/// Default daily word count for a fresh install
pub const DEFAULT_DAILY_WORDS: usize = 5;

/// Shown in place of a story when story generation fails
pub const STORY_PLACEHOLDER: &str =
    "Sorry, we couldn't create a story for you right now. Please check your connection and try again.";

/// Largest accepted headword length for manual lookups
pub const MAX_HEADWORD_LEN: usize = 64;

/// Review sessions older than this many days are purged by the cleanup worker
pub const REVIEW_SESSION_RETENTION_DAYS: i64 = 7;
