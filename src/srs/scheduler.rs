//! Fixed-table spaced-repetition scheduler.
//!
//! A word's mastery level moves one step per review: down on `hard`, up on
//! `good`/`easy`. The next interval is the base interval of the *new* level,
//! with a 30% bonus (rounded up) for `easy`.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{LearnedWord, Rating};

/// Base interval in days, indexed by mastery level.
pub const SRS_INTERVAL_DAYS: [u32; 7] = [1, 3, 7, 14, 30, 90, 180];

pub const MAX_SRS_LEVEL: u8 = (SRS_INTERVAL_DAYS.len() - 1) as u8;

const EASY_BONUS_RATIO: f64 = 0.3;

/// Anything the scheduler can read a mastery level from.
pub trait SrsProgress {
    fn srs_level(&self) -> Option<u8>;
}

impl SrsProgress for LearnedWord {
    fn srs_level(&self) -> Option<u8> {
        Some(self.srs_level)
    }
}

impl SrsProgress for u8 {
    fn srs_level(&self) -> Option<u8> {
        Some(*self)
    }
}

impl SrsProgress for Option<u8> {
    fn srs_level(&self) -> Option<u8> {
        *self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrsUpdate {
    pub srs_level: u8,
    pub next_review: NaiveDate,
    pub interval_days: u32,
}

impl SrsUpdate {
    pub fn apply_to(&self, word: &mut LearnedWord) {
        word.srs_level = self.srs_level;
        word.next_review = self.next_review;
    }
}

pub fn base_interval_days(level: u8) -> u32 {
    SRS_INTERVAL_DAYS[usize::from(level.min(MAX_SRS_LEVEL))]
}

pub fn next_level(current: u8, rating: Rating) -> u8 {
    let current = current.min(MAX_SRS_LEVEL);
    match rating {
        Rating::Hard => current.saturating_sub(1),
        Rating::Good | Rating::Easy => (current + 1).min(MAX_SRS_LEVEL),
    }
}

pub fn interval_days(level: u8, rating: Rating) -> u32 {
    let base = base_interval_days(level);
    let bonus = match rating {
        Rating::Easy => (f64::from(base) * EASY_BONUS_RATIO).ceil() as u32,
        Rating::Hard | Rating::Good => 0,
    };
    base + bonus
}

/// Compute the level and due date a word moves to after `rating`.
/// Pure: the caller persists the result onto the word.
pub fn calculate_next_review<W: SrsProgress + ?Sized>(
    word: &W,
    rating: Rating,
    today: NaiveDate,
) -> SrsUpdate {
    let srs_level = next_level(word.srs_level().unwrap_or(0), rating);
    let interval = interval_days(srs_level, rating);
    let next_review = today
        .checked_add_days(Days::new(u64::from(interval)))
        .unwrap_or(NaiveDate::MAX);

    SrsUpdate {
        srs_level,
        next_review,
        interval_days: interval,
    }
}
