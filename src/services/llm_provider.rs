use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::LLMConfig;
use crate::models::{normalize_headword, Category, Word};
use crate::services::generator::{GenerationError, WordGenerator};

const STARTER_WORDS_JSON: &str = include_str!("../../data/starter_words.json");

/// Curated entries served first in mock mode.
pub fn starter_words() -> &'static [Word] {
    static WORDS: OnceLock<Vec<Word>> = OnceLock::new();
    WORDS.get_or_init(|| match serde_json::from_str(STARTER_WORDS_JSON) {
        Ok(words) => words,
        Err(e) => {
            tracing::error!(error = %e, "Bundled starter words are unreadable");
            Vec::new()
        }
    })
}

/// Gemini-backed word generator. In mock mode it serves the bundled starter
/// words and then synthetic entries, without touching the network.
#[derive(Debug)]
pub struct LlmProvider {
    config: LLMConfig,
    client: reqwest::Client,
    mock_cursor: AtomicUsize,
}

impl LlmProvider {
    pub fn new(config: &LLMConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            config: config.clone(),
            client,
            mock_cursor: AtomicUsize::new(0),
        }
    }

    /// Validate LLM configuration at startup.
    pub fn validate_config(config: &LLMConfig) -> Result<(), GenerationError> {
        if config.enabled && !config.mock && config.api_key.trim().is_empty() {
            return Err(GenerationError::Config(
                "LLM_API_KEY is required when LLM_ENABLED=true and LLM_MOCK=false".to_string(),
            ));
        }
        Ok(())
    }

    fn ensure_enabled(&self) -> Result<(), GenerationError> {
        if self.config.enabled {
            Ok(())
        } else {
            Err(GenerationError::Disabled)
        }
    }

    async fn generate_content(
        &self,
        prompt: String,
        schema: Option<Value>,
    ) -> Result<String, GenerationError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            self.config.model
        );

        let mut body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });
        if let Some(schema) = schema {
            body["generationConfig"] = json!({
                "responseMimeType": "application/json",
                "responseSchema": schema,
            });
        }

        let response = self
            .client
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::ApiError {
                status: status.as_u16(),
                message: message.chars().take(300).collect(),
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        parsed
            .first_text()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GenerationError::InvalidResponse("no candidate text".to_string()))
    }

    fn next_mock_words(&self, count: usize, category: Category) -> Vec<Word> {
        let starters = starter_words();
        let start = self.mock_cursor.fetch_add(count, Ordering::Relaxed);
        (start..start + count)
            .map(|n| match starters.get(n) {
                Some(word) => Word {
                    is_ai_generated: Some(true),
                    ..word.clone()
                },
                None => synthetic_word(&format!("{}-word-{}", category.as_str(), n + 1)),
            })
            .collect()
    }
}

#[async_trait]
impl WordGenerator for LlmProvider {
    async fn generate_words(
        &self,
        count: usize,
        category: Category,
    ) -> Result<Vec<Word>, GenerationError> {
        self.ensure_enabled()?;
        if self.config.mock {
            return Ok(self.next_mock_words(count, category));
        }

        let text = self
            .generate_content(
                words_prompt(count, category),
                Some(json!({ "type": "ARRAY", "items": word_schema() })),
            )
            .await?;
        let words: Vec<Word> = serde_json::from_str(&text)
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        if words.is_empty() {
            return Err(GenerationError::InvalidResponse("empty word list".to_string()));
        }

        tracing::debug!(count, received = words.len(), %category, "Generated words");
        Ok(words
            .into_iter()
            .map(|w| Word {
                is_ai_generated: Some(true),
                ..w
            })
            .collect())
    }

    async fn generate_story(&self, headwords: &[String]) -> Result<String, GenerationError> {
        self.ensure_enabled()?;
        if self.config.mock {
            return Ok(format!(
                "Rina opened her notebook and practised a few new words: {}. \
                 By evening she could use each of them in a sentence.",
                headwords.join(", ")
            ));
        }
        self.generate_content(story_prompt(headwords), None).await
    }

    async fn lookup_word(&self, headword: &str) -> Result<Word, GenerationError> {
        self.ensure_enabled()?;
        let wanted = normalize_headword(headword);
        if self.config.mock {
            let word = starter_words()
                .iter()
                .find(|w| w.headword_key() == wanted)
                .cloned()
                .unwrap_or_else(|| synthetic_word(headword.trim()));
            return Ok(word);
        }

        let text = self
            .generate_content(lookup_prompt(headword.trim()), Some(word_schema()))
            .await?;
        let word: Word = serde_json::from_str(&text)
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        if word.word.trim().is_empty() {
            return Err(GenerationError::InvalidResponse("missing headword".to_string()));
        }
        Ok(Word {
            is_ai_generated: Some(true),
            ..word
        })
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| p.text.as_deref())
    }
}

fn synthetic_word(headword: &str) -> Word {
    Word {
        word: headword.to_string(),
        meaning_bangla: format!("{headword} (অর্থ)"),
        synonyms: vec![],
        antonyms: vec![],
        examples: vec![],
        reference: None,
        is_ai_generated: Some(true),
    }
}

fn words_prompt(count: usize, category: Category) -> String {
    let reference_hint = match category {
        Category::Competitive => {
            " Where a word appeared in a past exam, set reference to the exam, e.g. \"BCS-43\"."
        }
        _ => "",
    };
    format!(
        "You are an English teacher creating vocabulary flashcards for {}. \
         Generate {count} vocabulary words of intermediate to advanced difficulty. \
         For each word give its primary Bangla meaning, synonyms and antonyms with \
         their Bangla meanings, and 3 example sentences in English with Bangla translations.{reference_hint}",
        category.audience()
    )
}

fn lookup_prompt(headword: &str) -> String {
    format!(
        "You are an English teacher creating a vocabulary flashcard for a Bangladeshi student. \
         Give the details for the word \"{headword}\": its primary Bangla meaning, synonyms and \
         antonyms with their Bangla meanings, and 3 example sentences in English with Bangla translations."
    )
}

fn story_prompt(headwords: &[String]) -> String {
    format!(
        "You are an English teacher for Bangladeshi students. Write a short, simple and engaging \
         paragraph (around 50-70 words) that uses the following vocabulary words: {}. \
         The story should be easy to understand for an English learner.",
        headwords.join(", ")
    )
}

fn word_schema() -> Value {
    let pair = json!({
        "type": "OBJECT",
        "properties": {
            "word": { "type": "STRING" },
            "meaning": { "type": "STRING" }
        },
        "required": ["word", "meaning"]
    });
    json!({
        "type": "OBJECT",
        "properties": {
            "word": { "type": "STRING" },
            "meaning_bangla": { "type": "STRING" },
            "synonyms": { "type": "ARRAY", "items": pair },
            "antonyms": { "type": "ARRAY", "items": pair },
            "examples": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "english": { "type": "STRING" },
                        "bangla": { "type": "STRING" }
                    },
                    "required": ["english", "bangla"]
                }
            },
            "reference": { "type": "STRING" }
        },
        "required": ["word", "meaning_bangla", "synonyms", "antonyms", "examples"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(enabled: bool, mock: bool) -> LLMConfig {
        LLMConfig {
            enabled,
            mock,
            timeout_secs: 1,
            ..LLMConfig::default()
        }
    }

    #[tokio::test]
    async fn disabled_mode_returns_error() {
        let provider = LlmProvider::new(&cfg(false, true));
        let result = provider.generate_words(3, Category::General).await;
        assert!(matches!(result, Err(GenerationError::Disabled)));
        let result = provider.generate_story(&["Lucid".to_string()]).await;
        assert!(matches!(result, Err(GenerationError::Disabled)));
    }

    #[tokio::test]
    async fn mock_serves_starters_then_unique_synthetic_words() {
        let provider = LlmProvider::new(&cfg(true, true));
        let starters = starter_words().len();
        assert!(starters >= 20);

        let first = provider.generate_words(3, Category::Ielts).await.unwrap();
        assert_eq!(first[0].word, starter_words()[0].word);

        let rest = provider
            .generate_words(starters + 5, Category::Ielts)
            .await
            .unwrap();
        let mut keys: Vec<String> = first.iter().chain(&rest).map(Word::headword_key).collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
        assert!(rest.iter().all(|w| w.is_ai_generated == Some(true)));
    }

    #[tokio::test]
    async fn mock_lookup_prefers_starter_entries() {
        let provider = LlmProvider::new(&cfg(true, true));
        let known = provider.lookup_word("  ephemeral ").await.unwrap();
        assert_eq!(known.word, "Ephemeral");
        assert_eq!(known.meaning_bangla, "ক্ষণস্থায়ী");

        let unknown = provider.lookup_word("Serendipity").await.unwrap();
        assert_eq!(unknown.word, "Serendipity");
    }

    #[tokio::test]
    async fn mock_story_mentions_every_headword() {
        let provider = LlmProvider::new(&cfg(true, true));
        let words = vec!["Lucid".to_string(), "Terse".to_string()];
        let story = provider.generate_story(&words).await.unwrap();
        assert!(words.iter().all(|w| story.contains(w.as_str())));
    }

    #[test]
    fn real_mode_requires_api_key() {
        assert!(LlmProvider::validate_config(&cfg(true, false)).is_err());
        assert!(LlmProvider::validate_config(&cfg(true, true)).is_ok());
        assert!(LlmProvider::validate_config(&cfg(false, false)).is_ok());
    }

    #[test]
    fn response_text_is_extracted_from_first_candidate() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"[]"}]}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.first_text(), Some("[]"));

        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.first_text(), None);
    }
}
