use std::collections::BTreeMap;

use chrono::NaiveDate;
use sled::transaction::ConflictableTransactionError;

use crate::models::{normalize_headword, LearnedWord, Word};
use crate::srs::SrsUpdate;
use crate::store::keys;
use crate::store::{map_tx_error, tx_bytes, tx_json, Store, StoreError};

const ENTITY: &str = "vocabulary";

impl Store {
    /// Insert a new entry. Fails with `Conflict` when the headword (any case) exists.
    pub fn add_learned_word(&self, word: &LearnedWord) -> Result<(), StoreError> {
        let key = keys::vocabulary_key(&word.word.word);
        if key.is_empty() {
            return Err(StoreError::Validation("headword must not be empty".into()));
        }
        let value = Self::serialize(word)?;
        self.vocabulary
            .compare_and_swap(key.as_bytes(), None as Option<&[u8]>, Some(value))?
            .map_err(|_| StoreError::conflict(ENTITY, &key))
    }

    /// Add freshly selected words at level 0, skipping headwords already known.
    /// Returns the entries that were actually inserted.
    pub fn add_words_to_vocabulary(
        &self,
        words: &[Word],
        today: NaiveDate,
    ) -> Result<Vec<LearnedWord>, StoreError> {
        let mut added = Vec::new();
        for word in words {
            let learned = LearnedWord::new(word.clone(), today);
            match self.add_learned_word(&learned) {
                Ok(()) => added.push(learned),
                Err(StoreError::Conflict { .. }) | Err(StoreError::Validation(_)) => {
                    tracing::debug!(headword = %word.word, "Skipping known or blank headword");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(added)
    }

    pub fn get_learned_word(&self, headword: &str) -> Result<Option<LearnedWord>, StoreError> {
        Self::get_json(&self.vocabulary, &keys::vocabulary_key(headword))
    }

    /// Every entry, most recently learned first, then alphabetically.
    pub fn list_vocabulary(&self) -> Result<Vec<LearnedWord>, StoreError> {
        let mut words = Vec::with_capacity(self.vocabulary.len());
        for item in self.vocabulary.iter() {
            let (_, v) = item?;
            words.push(Self::deserialize::<LearnedWord>(&v)?);
        }
        words.sort_by(|a, b| {
            b.learned_on
                .cmp(&a.learned_on)
                .then_with(|| a.word.headword_key().cmp(&b.word.headword_key()))
        });
        Ok(words)
    }

    /// Case-insensitive substring match on headword or meaning.
    pub fn search_vocabulary(&self, term: &str) -> Result<Vec<LearnedWord>, StoreError> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .list_vocabulary()?
            .into_iter()
            .filter(|w| {
                w.word.word.to_lowercase().contains(&needle)
                    || w.word.meaning_bangla.to_lowercase().contains(&needle)
            })
            .collect())
    }

    pub fn vocabulary_by_learned_date(
        &self,
    ) -> Result<BTreeMap<NaiveDate, Vec<LearnedWord>>, StoreError> {
        let mut groups: BTreeMap<NaiveDate, Vec<LearnedWord>> = BTreeMap::new();
        for word in self.list_vocabulary()? {
            groups.entry(word.learned_on).or_default().push(word);
        }
        Ok(groups)
    }

    pub fn due_vocabulary(&self, today: NaiveDate) -> Result<Vec<LearnedWord>, StoreError> {
        Ok(self
            .list_vocabulary()?
            .into_iter()
            .filter(|w| w.is_due(today))
            .collect())
    }

    /// Distinct meanings known to the vocabulary, used as quiz distractors.
    pub fn vocabulary_meanings(&self) -> Result<Vec<String>, StoreError> {
        let mut meanings = Vec::new();
        for item in self.vocabulary.iter() {
            let (_, v) = item?;
            let word: LearnedWord = Self::deserialize(&v)?;
            meanings.push(word.word.meaning_bangla);
        }
        Ok(meanings)
    }

    /// Write a scheduler result onto the stored entry.
    pub fn update_word_srs(
        &self,
        headword: &str,
        update: &SrsUpdate,
    ) -> Result<LearnedWord, StoreError> {
        let key = keys::vocabulary_key(headword);
        self.vocabulary
            .transaction(|tx| {
                let raw = tx.get(key.as_bytes())?.ok_or_else(|| {
                    ConflictableTransactionError::Abort(StoreError::not_found(
                        ENTITY,
                        &normalize_headword(headword),
                    ))
                })?;
                let mut word: LearnedWord = tx_json(&raw)?;
                update.apply_to(&mut word);
                tx.insert(key.as_bytes(), tx_bytes(&word)?)?;
                Ok(word)
            })
            .map_err(map_tx_error)
    }

    pub fn delete_learned_word(&self, headword: &str) -> Result<bool, StoreError> {
        let key = keys::vocabulary_key(headword);
        Ok(self.vocabulary.remove(key.as_bytes())?.is_some())
    }

    pub fn count_vocabulary(&self) -> u64 {
        self.vocabulary.len() as u64
    }
}
