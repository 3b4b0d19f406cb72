use std::collections::HashSet;

use crate::models::{Category, Word};
use crate::store::keys;
use crate::store::{map_tx_error, tx_bytes, tx_json, Store, StoreError};

/// Append `fresh` to the back of `reservoir`, dropping headwords already
/// queued (case-insensitive) and duplicates within the batch.
/// Returns how many words were appended.
pub fn merge_unique(reservoir: &mut Vec<Word>, fresh: &[Word]) -> usize {
    let mut seen: HashSet<String> = reservoir.iter().map(Word::headword_key).collect();
    let before = reservoir.len();
    for word in fresh {
        let key = word.headword_key();
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        reservoir.push(word.clone());
    }
    reservoir.len() - before
}

impl Store {
    /// Queued words for a category, front first.
    pub fn reservoir(&self, category: Category) -> Result<Vec<Word>, StoreError> {
        Ok(Self::get_json(&self.reservoirs, &keys::reservoir_key(category))?.unwrap_or_default())
    }

    pub fn reservoir_len(&self, category: Category) -> Result<usize, StoreError> {
        Ok(self.reservoir(category)?.len())
    }

    pub fn reservoir_sizes(&self) -> Result<Vec<(Category, usize)>, StoreError> {
        Category::ALL
            .iter()
            .map(|&category| Ok((category, self.reservoir_len(category)?)))
            .collect()
    }

    pub fn append_to_reservoir(
        &self,
        category: Category,
        fresh: &[Word],
    ) -> Result<usize, StoreError> {
        let key = keys::reservoir_key(category);
        self.reservoirs
            .transaction(|tx| {
                let mut queued: Vec<Word> = match tx.get(key.as_bytes())? {
                    Some(raw) => tx_json(&raw)?,
                    None => Vec::new(),
                };
                let appended = merge_unique(&mut queued, fresh);
                if appended > 0 {
                    tx.insert(key.as_bytes(), tx_bytes(&queued)?)?;
                }
                Ok(appended)
            })
            .map_err(map_tx_error)
    }

    /// Meanings of every queued word across all categories.
    pub fn reservoir_meanings(&self) -> Result<Vec<String>, StoreError> {
        let mut meanings = Vec::new();
        for item in self.reservoirs.iter() {
            let (_, raw) = item?;
            let words: Vec<Word> = Self::deserialize(&raw)?;
            meanings.extend(words.into_iter().map(|w| w.meaning_bangla));
        }
        Ok(meanings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(headword: &str) -> Word {
        Word {
            word: headword.to_string(),
            meaning_bangla: format!("{headword}-অর্থ"),
            synonyms: vec![],
            antonyms: vec![],
            examples: vec![],
            reference: None,
            is_ai_generated: Some(true),
        }
    }

    #[test]
    fn merge_skips_known_and_repeated_headwords() {
        let mut queued = vec![word("Abate")];
        let appended = merge_unique(
            &mut queued,
            &[word("abate"), word("Benign"), word("BENIGN"), word("  "), word("Cogent")],
        );
        assert_eq!(appended, 2);
        let headwords: Vec<&str> = queued.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(headwords, vec!["Abate", "Benign", "Cogent"]);
    }

    #[test]
    fn categories_have_separate_reservoirs() {
        let store = Store::temporary().unwrap();
        store
            .append_to_reservoir(Category::Ielts, &[word("Abate"), word("Benign")])
            .unwrap();
        store
            .append_to_reservoir(Category::General, &[word("Abate")])
            .unwrap();

        assert_eq!(store.reservoir_len(Category::Ielts).unwrap(), 2);
        assert_eq!(store.reservoir_len(Category::General).unwrap(), 1);
        assert_eq!(store.reservoir_len(Category::Competitive).unwrap(), 0);

        let sizes = store.reservoir_sizes().unwrap();
        assert_eq!(
            sizes,
            vec![
                (Category::General, 1),
                (Category::Competitive, 0),
                (Category::Ielts, 2)
            ]
        );
        assert_eq!(store.reservoir_meanings().unwrap().len(), 3);
    }

    #[test]
    fn append_preserves_fifo_order() {
        let store = Store::temporary().unwrap();
        store
            .append_to_reservoir(Category::General, &[word("One"), word("Two")])
            .unwrap();
        let appended = store
            .append_to_reservoir(Category::General, &[word("two"), word("Three")])
            .unwrap();
        assert_eq!(appended, 1);
        let queued: Vec<String> = store
            .reservoir(Category::General)
            .unwrap()
            .into_iter()
            .map(|w| w.word)
            .collect();
        assert_eq!(queued, vec!["One", "Two", "Three"]);
    }
}
