//! Input checks shared by the vocabulary and daily-session routes.

use crate::constants::MAX_HEADWORD_LEN;
use crate::models::Word;

/// A headword is 1-64 characters of letters, spaces, hyphens and apostrophes,
/// e.g. `well-being` or `o'clock`.
pub fn validate_headword(headword: &str) -> Result<(), &'static str> {
    let trimmed = headword.trim();
    if trimmed.is_empty() {
        return Err("headword must not be empty");
    }
    if trimmed.chars().count() > MAX_HEADWORD_LEN {
        return Err("headword must be at most 64 characters");
    }
    if !trimmed
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '-' || c == '\'')
    {
        return Err("headword may only contain letters, spaces, hyphens and apostrophes");
    }
    Ok(())
}

/// A manually submitted entry needs a valid headword and a meaning.
pub fn validate_word(word: &Word) -> Result<(), &'static str> {
    validate_headword(&word.word)?;
    if word.meaning_bangla.trim().is_empty() {
        return Err("meaning_bangla must not be empty");
    }
    Ok(())
}

/// Daily word counts outside `1..=max` are clamped to the cap; zero stays
/// zero so the session layer can reject it.
pub fn clamp_daily_count(requested: usize, max: usize) -> usize {
    requested.min(max)
}
