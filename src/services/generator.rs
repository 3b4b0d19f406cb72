use async_trait::async_trait;

use crate::models::{Category, Word};

/// Source of new vocabulary content.
///
/// Implementations may be slow or fail; callers decide whether a failure is
/// fatal (word batches) or replaced by a fallback (stories).
#[async_trait]
pub trait WordGenerator: Send + Sync {
    /// Up to `count` fresh words for `category`. May return fewer.
    async fn generate_words(
        &self,
        count: usize,
        category: Category,
    ) -> Result<Vec<Word>, GenerationError>;

    /// A short reading passage that uses every headword.
    async fn generate_story(&self, headwords: &[String]) -> Result<String, GenerationError>;

    /// Full details for one headword typed in by the learner.
    async fn lookup_word(&self, headword: &str) -> Result<Word, GenerationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("word generation is disabled")]
    Disabled,
    #[error("invalid generator configuration: {0}")]
    Config(String),
    #[error("generation request timed out")]
    Timeout,
    #[error("generation network error: {0}")]
    Network(String),
    #[error("generation api error: status={status}, message={message}")]
    ApiError { status: u16, message: String },
    #[error("generation service returned an invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(error.to_string())
        }
    }
}
