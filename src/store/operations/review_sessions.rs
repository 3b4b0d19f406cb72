use chrono::{DateTime, Utc};
use sled::Transactional;

use crate::models::LearnedWord;
use crate::srs::{ReviewSession, SrsUpdate};
use crate::store::keys;
use crate::store::{map_tx_error, tx_bytes, tx_json, Store, StoreError};

impl Store {
    pub fn put_review_session(&self, session: &ReviewSession) -> Result<(), StoreError> {
        Self::put_json(
            &self.review_sessions,
            &keys::review_session_key(&session.id),
            session,
        )
    }

    pub fn get_review_session(&self, id: &str) -> Result<ReviewSession, StoreError> {
        Self::get_json(&self.review_sessions, &keys::review_session_key(id))?
            .ok_or_else(|| StoreError::not_found("review_session", id))
    }

    /// Persist a rated session and write the card's scheduler result in one
    /// transaction, so a failed write never leaves one applied without the
    /// other. Returns `None` when the word left the vocabulary mid-session;
    /// the session is still saved.
    pub fn commit_review_rating(
        &self,
        session: &ReviewSession,
        headword: &str,
        update: &SrsUpdate,
    ) -> Result<Option<LearnedWord>, StoreError> {
        let session_key = keys::review_session_key(&session.id);
        let word_key = keys::vocabulary_key(headword);

        (&self.review_sessions, &self.vocabulary)
            .transaction(|(sessions, vocabulary)| {
                sessions.insert(session_key.as_bytes(), tx_bytes(session)?)?;
                let Some(raw) = vocabulary.get(word_key.as_bytes())? else {
                    return Ok(None);
                };
                let mut word: LearnedWord = tx_json(&raw)?;
                update.apply_to(&mut word);
                vocabulary.insert(word_key.as_bytes(), tx_bytes(&word)?)?;
                Ok(Some(word))
            })
            .map_err(map_tx_error)
    }

    /// Remove sessions last touched before `cutoff`, returning how many went.
    pub fn purge_review_sessions_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut expired = Vec::new();
        for item in self.review_sessions.iter() {
            let (key, raw) = item?;
            match Self::deserialize::<ReviewSession>(&raw) {
                Ok(session) if session.updated_at < cutoff => expired.push(key),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Removing unreadable review session");
                    expired.push(key);
                }
            }
        }

        let count = expired.len();
        for key in expired {
            self.review_sessions.remove(key)?;
        }
        Ok(count)
    }

    pub fn count_review_sessions(&self) -> usize {
        self.review_sessions.len()
    }
}
