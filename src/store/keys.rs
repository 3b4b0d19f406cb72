use chrono::NaiveDate;

use crate::models::{normalize_headword, Category};

pub fn vocabulary_key(headword: &str) -> String {
    normalize_headword(headword)
}

pub fn reservoir_key(category: Category) -> String {
    category.as_str().to_string()
}

pub fn daily_lock_key(category: Category) -> String {
    category.as_str().to_string()
}

pub fn review_session_key(session_id: &str) -> String {
    session_id.to_string()
}

/// ISO dates sort chronologically as bytes.
pub fn learning_log_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_learning_log_key(key: &[u8]) -> Option<NaiveDate> {
    let text = std::str::from_utf8(key).ok()?;
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

pub const SETTINGS_KEY: &str = "current";

pub const SCHEMA_VERSION_KEY: &str = "_meta:version";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_key_is_case_insensitive() {
        assert_eq!(vocabulary_key("Ephemeral"), vocabulary_key(" ephemeral "));
    }

    #[test]
    fn learning_log_keys_sort_by_date() {
        let earlier = learning_log_key(NaiveDate::from_ymd_opt(2024, 9, 30).unwrap());
        let later = learning_log_key(NaiveDate::from_ymd_opt(2024, 10, 1).unwrap());
        assert!(earlier < later);
        assert_eq!(
            parse_learning_log_key(later.as_bytes()),
            NaiveDate::from_ymd_opt(2024, 10, 1)
        );
    }
}
