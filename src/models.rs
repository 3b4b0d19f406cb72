//! Vocabulary domain types shared by the store, the scheduler and the HTTP layer.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymAntonym {
    pub word: String,
    pub meaning: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamplePair {
    pub english: String,
    pub bangla: String,
}

/// A generated vocabulary entry. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub word: String,
    pub meaning_bangla: String,
    #[serde(default)]
    pub synonyms: Vec<SynonymAntonym>,
    #[serde(default)]
    pub antonyms: Vec<SynonymAntonym>,
    #[serde(default)]
    pub examples: Vec<ExamplePair>,
    /// Exam provenance, e.g. `BCS-43`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(
        rename = "isAiGenerated",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_ai_generated: Option<bool>,
}

impl Word {
    /// Case-insensitive identity used for deduplication and store keys.
    pub fn headword_key(&self) -> String {
        normalize_headword(&self.word)
    }
}

pub fn normalize_headword(headword: &str) -> String {
    headword.trim().to_lowercase()
}

/// A word in the user's vocabulary with its spaced-repetition progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnedWord {
    #[serde(flatten)]
    pub word: Word,
    pub learned_on: NaiveDate,
    #[serde(default)]
    pub srs_level: u8,
    pub next_review: NaiveDate,
}

impl LearnedWord {
    /// New vocabulary entries start at level 0 and are due the day they are learned.
    pub fn new(word: Word, today: NaiveDate) -> Self {
        Self {
            word,
            learned_on: today,
            srs_level: 0,
            next_review: today,
        }
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review <= today
    }
}

/// The learner's goal; every category owns a separate reservoir and daily lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    General,
    Competitive,
    Ielts,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::General, Category::Competitive, Category::Ielts];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Competitive => "competitive",
            Self::Ielts => "ielts",
        }
    }

    /// Audience description used in generation prompts.
    pub fn audience(self) -> &'static str {
        match self {
            Self::General => "general English learners in Bangladesh",
            Self::Competitive => "Bangladeshi students preparing for BCS, bank and university admission exams",
            Self::Ielts => "Bangladeshi students preparing for the IELTS exam",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(Self::General),
            "competitive" => Ok(Self::Competitive),
            "ielts" => Ok(Self::Ielts),
            other => Err(ParseEnumError {
                kind: "category",
                value: other.to_string(),
            }),
        }
    }
}

/// Self-assessed recall quality submitted after a card is revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Hard,
    Good,
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 3] = [Rating::Hard, Rating::Good, Rating::Easy];
}

impl FromStr for Rating {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hard" => Ok(Self::Hard),
            "good" => Ok(Self::Good),
            "easy" => Ok(Self::Easy),
            other => Err(ParseEnumError {
                kind: "rating",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}
