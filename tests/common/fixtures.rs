use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

use vocaby_backend::models::{Category, LearnedWord, Word};
use vocaby_backend::services::generator::{GenerationError, WordGenerator};
use vocaby_backend::store::Store;

pub fn word(headword: &str, meaning: &str) -> Word {
    Word {
        word: headword.to_string(),
        meaning_bangla: meaning.to_string(),
        synonyms: vec![],
        antonyms: vec![],
        examples: vec![],
        reference: None,
        is_ai_generated: None,
    }
}

pub fn word_json(headword: &str, meaning: &str) -> Value {
    json!({
        "word": headword,
        "meaning_bangla": meaning,
        "synonyms": [],
        "antonyms": [],
        "examples": [{ "english": format!("A {headword} example."), "bangla": "উদাহরণ" }],
    })
}

/// Seed vocabulary entries already due on `learned_on`.
pub fn seed_vocabulary(store: &Store, entries: &[(&str, &str)], learned_on: NaiveDate) {
    for (headword, meaning) in entries {
        store
            .add_learned_word(&LearnedWord::new(word(headword, meaning), learned_on))
            .expect("seed learned word");
    }
}

/// Generator whose word calls always fail; stories still work.
#[derive(Default)]
pub struct UnavailableGenerator {
    pub word_calls: AtomicUsize,
}

#[async_trait]
impl WordGenerator for UnavailableGenerator {
    async fn generate_words(
        &self,
        _count: usize,
        _category: Category,
    ) -> Result<Vec<Word>, GenerationError> {
        self.word_calls.fetch_add(1, Ordering::SeqCst);
        Err(GenerationError::Network("connection refused".to_string()))
    }

    async fn generate_story(&self, headwords: &[String]) -> Result<String, GenerationError> {
        Ok(headwords.join(" "))
    }

    async fn lookup_word(&self, _headword: &str) -> Result<Word, GenerationError> {
        Err(GenerationError::Timeout)
    }
}
