use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sled::transaction::ConflictableTransactionError;
use sled::Transactional;

use crate::models::{Category, Word};
use crate::store::keys;
use crate::store::operations::reservoirs::merge_unique;
use crate::store::{map_tx_error, tx_bytes, tx_json, Store, StoreError};

/// The words and story frozen for one category on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySessionLock {
    pub date: NaiveDate,
    pub category: Category,
    pub count: usize,
    pub words: Vec<Word>,
    pub story: String,
    pub created_at: DateTime<Utc>,
}

impl DailySessionLock {
    /// A lock from another day, or for a different word count, counts as absent.
    pub fn matches(&self, date: NaiveDate, category: Category, count: usize) -> bool {
        self.date == date && self.category == category && self.count == count
    }
}

/// Outcome of [`Store::commit_daily_selection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DailyCommit {
    Committed { remaining: usize },
    /// Another request locked the same date, category and count first.
    AlreadyLocked(DailySessionLock),
}

impl Store {
    pub fn get_daily_lock(&self, category: Category) -> Result<Option<DailySessionLock>, StoreError> {
        Self::get_json(&self.daily_locks, &keys::daily_lock_key(category))
    }

    pub fn list_daily_locks(&self) -> Result<Vec<DailySessionLock>, StoreError> {
        let mut locks = Vec::new();
        for item in self.daily_locks.iter() {
            let (_, raw) = item?;
            locks.push(Self::deserialize(&raw)?);
        }
        Ok(locks)
    }

    /// Atomically append `fresh` to the category's reservoir, take the lock's
    /// words out of it and persist the lock.
    ///
    /// `previous` is the lock the caller saw before selecting. When the stored
    /// lock changed since and now matches this lock's date, category and
    /// count, that lock is returned untouched. Any other change, or a selected
    /// word that is no longer queued, aborts with `Conflict`.
    pub fn commit_daily_selection(
        &self,
        lock: &DailySessionLock,
        fresh: &[Word],
        previous: Option<&DailySessionLock>,
    ) -> Result<DailyCommit, StoreError> {
        let reservoir_key = keys::reservoir_key(lock.category);
        let lock_key = keys::daily_lock_key(lock.category);
        let selected: HashSet<String> = lock.words.iter().map(Word::headword_key).collect();

        (&self.reservoirs, &self.daily_locks)
            .transaction(|(reservoirs, locks)| {
                let current: Option<DailySessionLock> = match locks.get(lock_key.as_bytes())? {
                    Some(raw) => Some(tx_json(&raw)?),
                    None => None,
                };
                if current.as_ref() != previous {
                    return match current {
                        Some(existing) if existing.matches(lock.date, lock.category, lock.count) => {
                            Ok(DailyCommit::AlreadyLocked(existing))
                        }
                        _ => Err(ConflictableTransactionError::Abort(StoreError::conflict(
                            "daily_lock",
                            &lock_key,
                        ))),
                    };
                }

                let mut queued: Vec<Word> = match reservoirs.get(reservoir_key.as_bytes())? {
                    Some(raw) => tx_json(&raw)?,
                    None => Vec::new(),
                };
                merge_unique(&mut queued, fresh);

                let before = queued.len();
                queued.retain(|w| !selected.contains(&w.headword_key()));
                if before - queued.len() != selected.len() {
                    return Err(ConflictableTransactionError::Abort(StoreError::conflict(
                        "reservoir",
                        &reservoir_key,
                    )));
                }

                reservoirs.insert(reservoir_key.as_bytes(), tx_bytes(&queued)?)?;
                locks.insert(lock_key.as_bytes(), tx_bytes(lock)?)?;
                Ok(DailyCommit::Committed {
                    remaining: queued.len(),
                })
            })
            .map_err(map_tx_error)
    }

    pub fn clear_daily_lock(&self, category: Category) -> Result<bool, StoreError> {
        let key = keys::daily_lock_key(category);
        Ok(self.daily_locks.remove(key.as_bytes())?.is_some())
    }

    pub fn clear_all_daily_locks(&self) -> Result<usize, StoreError> {
        let mut removed = 0;
        for category in Category::ALL {
            if self.clear_daily_lock(category)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Delete locks dated before `today`. Returns how many were removed.
    pub fn purge_stale_daily_locks(&self, today: NaiveDate) -> Result<usize, StoreError> {
        let mut stale = Vec::new();
        for item in self.daily_locks.iter() {
            let (key, raw) = item?;
            match Self::deserialize::<DailySessionLock>(&raw) {
                Ok(lock) if lock.date < today => stale.push(key),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Removing unreadable daily lock");
                    stale.push(key);
                }
            }
        }

        let count = stale.len();
        for key in stale {
            self.daily_locks.remove(key)?;
        }
        Ok(count)
    }
}
