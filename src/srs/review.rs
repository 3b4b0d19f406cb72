//! Review session state machine.
//!
//! `NotStarted -> InProgress { index, revealed } -> Completed`, with
//! `NothingDue` as the terminal state of a session built from an empty queue.
//! The queue and every card's multiple-choice options are fixed when the
//! session is built, so later vocabulary edits never reshuffle a running session.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::{LearnedWord, Rating};
use crate::srs::scheduler::{calculate_next_review, SrsUpdate};

pub const MCQ_OPTION_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ReviewState {
    NothingDue,
    NotStarted,
    InProgress { index: usize, revealed: bool },
    Completed,
}

impl ReviewState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NothingDue => "nothingDue",
            Self::NotStarted => "notStarted",
            Self::InProgress { revealed: false, .. } => "inProgress",
            Self::InProgress { revealed: true, .. } => "revealed",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOutcome {
    pub selected: String,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatedCard {
    pub headword: String,
    pub rating: Rating,
    pub update: SrsUpdate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedCard {
    pub word: LearnedWord,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSession {
    pub id: String,
    pub created_on: NaiveDate,
    pub state: ReviewState,
    pub cards: Vec<QueuedCard>,
    pub choice: Option<ChoiceOutcome>,
    pub rated: Vec<RatedCard>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What the client sees of the current card. The meaning and the full word
/// are only exposed once the card is revealed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCard<'a> {
    pub index: usize,
    pub total: usize,
    pub headword: &'a str,
    pub options: &'a [String],
    pub revealed: bool,
    pub choice: Option<&'a ChoiceOutcome>,
    pub word: Option<&'a LearnedWord>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    #[error("cannot {action} while session is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
    #[error("a meaning was already chosen for this card")]
    AlreadyChosen,
    #[error("'{0}' is not one of the offered meanings")]
    UnknownOption(String),
    /// The stored state points past the end of the queue.
    #[error("session has no card at position {index}")]
    MissingCard { index: usize },
}

/// Vocabulary entries due on or before `today`, in vocabulary order.
pub fn due_words(vocabulary: &[LearnedWord], today: NaiveDate) -> Vec<LearnedWord> {
    vocabulary
        .iter()
        .filter(|w| w.is_due(today))
        .cloned()
        .collect()
}

/// Due entries in a random order drawn from `rng`.
pub fn due_queue<R: Rng + ?Sized>(
    vocabulary: &[LearnedWord],
    today: NaiveDate,
    rng: &mut R,
) -> Vec<LearnedWord> {
    let mut queue = due_words(vocabulary, today);
    queue.shuffle(rng);
    queue
}

/// The correct meaning plus three distinct distractors from `pool`, shuffled.
/// Missing distractors are padded with `Option N` fillers.
pub fn build_options<R: Rng + ?Sized>(correct: &str, pool: &[String], rng: &mut R) -> Vec<String> {
    let mut seen = HashSet::new();
    let candidates: Vec<&String> = pool
        .iter()
        .filter(|m| m.as_str() != correct && !m.trim().is_empty())
        .filter(|m| seen.insert(m.as_str()))
        .collect();

    let mut options: Vec<String> = candidates
        .choose_multiple(rng, MCQ_OPTION_COUNT - 1)
        .map(|m| (*m).clone())
        .collect();

    while options.len() < MCQ_OPTION_COUNT - 1 {
        options.push(format!("Option {}", options.len() + 1));
    }

    options.push(correct.to_string());
    options.shuffle(rng);
    options
}

impl ReviewSession {
    /// Snapshot today's due words into a new session.
    ///
    /// `distractor_pool` holds known meanings (vocabulary and reservoirs) to
    /// draw wrong answers from.
    pub fn new<R: Rng + ?Sized>(
        id: String,
        vocabulary: &[LearnedWord],
        distractor_pool: &[String],
        today: NaiveDate,
        rng: &mut R,
    ) -> Self {
        let cards: Vec<QueuedCard> = due_queue(vocabulary, today, rng)
            .into_iter()
            .map(|word| {
                let options = build_options(&word.word.meaning_bangla, distractor_pool, rng);
                QueuedCard { word, options }
            })
            .collect();

        let state = if cards.is_empty() {
            ReviewState::NothingDue
        } else {
            ReviewState::NotStarted
        };
        let now = Utc::now();

        Self {
            id,
            created_on: today,
            state,
            cards,
            choice: None,
            rated: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn total(&self) -> usize {
        self.cards.len()
    }

    pub fn remaining(&self) -> usize {
        match self.state {
            ReviewState::NotStarted => self.cards.len(),
            ReviewState::InProgress { index, .. } => self.cards.len().saturating_sub(index),
            ReviewState::NothingDue | ReviewState::Completed => 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, ReviewState::NothingDue | ReviewState::Completed)
    }

    pub fn current(&self) -> Option<ReviewCard<'_>> {
        let ReviewState::InProgress { index, revealed } = self.state else {
            return None;
        };
        let card = self.cards.get(index)?;
        Some(ReviewCard {
            index,
            total: self.cards.len(),
            headword: &card.word.word.word,
            options: &card.options,
            revealed,
            choice: self.choice.as_ref(),
            word: revealed.then_some(&card.word),
        })
    }

    pub fn start(&mut self) -> Result<(), ReviewError> {
        match self.state {
            ReviewState::NotStarted => {
                self.state = ReviewState::InProgress {
                    index: 0,
                    revealed: false,
                };
                self.touch();
                Ok(())
            }
            _ => Err(self.invalid("start")),
        }
    }

    /// Record a multiple-choice guess. Feedback only: it neither reveals the
    /// card nor influences scheduling.
    pub fn choose(&mut self, option: &str) -> Result<ChoiceOutcome, ReviewError> {
        let ReviewState::InProgress {
            index,
            revealed: false,
        } = self.state
        else {
            return Err(self.invalid("choose"));
        };
        if self.choice.is_some() {
            return Err(ReviewError::AlreadyChosen);
        }

        let card = self
            .cards
            .get(index)
            .ok_or(ReviewError::MissingCard { index })?;
        if !card.options.iter().any(|o| o == option) {
            return Err(ReviewError::UnknownOption(option.to_string()));
        }

        let outcome = ChoiceOutcome {
            selected: option.to_string(),
            correct: option == card.word.word.meaning_bangla,
        };
        self.choice = Some(outcome.clone());
        self.touch();
        Ok(outcome)
    }

    pub fn reveal(&mut self) -> Result<(), ReviewError> {
        match self.state {
            ReviewState::InProgress {
                index,
                revealed: false,
            } => {
                self.state = ReviewState::InProgress {
                    index,
                    revealed: true,
                };
                self.touch();
                Ok(())
            }
            _ => Err(self.invalid("reveal")),
        }
    }

    /// Schedule the revealed card and advance. The returned update must be
    /// written back to the vocabulary by the caller.
    pub fn rate(&mut self, rating: Rating, today: NaiveDate) -> Result<RatedCard, ReviewError> {
        let ReviewState::InProgress {
            index,
            revealed: true,
        } = self.state
        else {
            return Err(self.invalid("rate"));
        };

        let word = &self
            .cards
            .get(index)
            .ok_or(ReviewError::MissingCard { index })?
            .word;
        let rated = RatedCard {
            headword: word.word.word.clone(),
            rating,
            update: calculate_next_review(word, rating, today),
        };

        let next = index + 1;
        self.state = if next >= self.cards.len() {
            ReviewState::Completed
        } else {
            ReviewState::InProgress {
                index: next,
                revealed: false,
            }
        };
        self.choice = None;
        self.rated.push(rated.clone());
        self.touch();
        Ok(rated)
    }

    fn invalid(&self, action: &'static str) -> ReviewError {
        ReviewError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
