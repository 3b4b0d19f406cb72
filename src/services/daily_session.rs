//! Per-category word reservoirs and the once-a-day session lock.
//!
//! A daily session is selected from the front of the category's reservoir
//! and frozen in a lock keyed by category. Until the date or the requested
//! count changes, every call returns the locked words and story verbatim.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::clock::Clock;
use crate::config::ReservoirConfig;
use crate::constants::STORY_PLACEHOLDER;
use crate::models::{Category, Word};
use crate::services::generator::{GenerationError, WordGenerator};
use crate::store::operations::daily_locks::{DailyCommit, DailySessionLock};
use crate::store::operations::reservoirs::merge_unique;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySession {
    pub date: NaiveDate,
    pub category: Category,
    pub words: Vec<Word>,
    pub story: String,
    /// False when the session came from an existing lock.
    pub is_new: bool,
}

impl DailySession {
    fn from_lock(lock: DailySessionLock, is_new: bool) -> Self {
        Self {
            date: lock.date,
            category: lock.category,
            words: lock.words,
            story: lock.story,
            is_new,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservoirStatus {
    pub category: Category,
    pub size: usize,
    pub low_water_mark: usize,
    pub refilling: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum DailySessionError {
    #[error("word count must be at least 1")]
    InvalidCount,
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("generator supplied {available} of {requested} words")]
    InsufficientWords { requested: usize, available: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct DailySessionService {
    store: Arc<Store>,
    generator: Arc<dyn WordGenerator>,
    clock: Arc<dyn Clock>,
    config: ReservoirConfig,
    refilling: Arc<Mutex<HashSet<Category>>>,
}

/// Releases a category's refill slot when dropped.
struct RefillSlot {
    category: Category,
    refilling: Arc<Mutex<HashSet<Category>>>,
}

impl Drop for RefillSlot {
    fn drop(&mut self) {
        let mut active = self.refilling.lock().unwrap_or_else(|e| e.into_inner());
        active.remove(&self.category);
    }
}

impl DailySessionService {
    pub fn new(
        store: Arc<Store>,
        generator: Arc<dyn WordGenerator>,
        clock: Arc<dyn Clock>,
        config: ReservoirConfig,
    ) -> Self {
        Self {
            store,
            generator,
            clock,
            config,
            refilling: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn config(&self) -> ReservoirConfig {
        self.config
    }

    /// Today's words and story for `category`, selecting them on first use.
    ///
    /// On failure nothing is written: no lock, no reservoir change.
    pub async fn get_daily_session(
        &self,
        category: Category,
        count: usize,
    ) -> Result<DailySession, DailySessionError> {
        if count == 0 {
            return Err(DailySessionError::InvalidCount);
        }
        let today = self.clock.today();

        let previous = self.store.get_daily_lock(category)?;
        if let Some(lock) = previous.as_ref() {
            if lock.matches(today, category, count) {
                tracing::debug!(%category, count, "Serving locked daily session");
                return Ok(DailySession::from_lock(lock.clone(), false));
            }
        }

        let mut queued = self.store.reservoir(category)?;
        let mut fresh = Vec::new();
        if queued.len() < count {
            let requested = self.config.min_batch_size.max(count - queued.len());
            tracing::info!(%category, queued = queued.len(), requested, "Reservoir short, generating words");
            fresh = self.generator.generate_words(requested, category).await?;
            merge_unique(&mut queued, &fresh);
            if queued.len() < count {
                return Err(DailySessionError::InsufficientWords {
                    requested: count,
                    available: queued.len(),
                });
            }
        }

        let words: Vec<Word> = queued[..count].to_vec();
        let headwords: Vec<String> = words.iter().map(|w| w.word.clone()).collect();
        let story = match self.generator.generate_story(&headwords).await {
            Ok(story) => story,
            Err(e) => {
                tracing::warn!(error = %e, %category, "Story generation failed, using placeholder");
                STORY_PLACEHOLDER.to_string()
            }
        };

        let lock = DailySessionLock {
            date: today,
            category,
            count,
            words,
            story,
            created_at: Utc::now(),
        };
        let remaining = match self
            .store
            .commit_daily_selection(&lock, &fresh, previous.as_ref())?
        {
            DailyCommit::Committed { remaining } => remaining,
            DailyCommit::AlreadyLocked(existing) => {
                tracing::debug!(%category, count, "Another request locked the session first");
                return Ok(DailySession::from_lock(existing, false));
            }
        };
        tracing::info!(%category, count, remaining, "Daily session selected");
        if remaining < self.config.low_water_mark {
            self.spawn_refill(category);
        }

        Ok(DailySession::from_lock(lock, true))
    }

    /// Drop the lock of one category, or of every category.
    pub fn clear_session(&self, category: Option<Category>) -> Result<usize, StoreError> {
        let cleared = match category {
            Some(category) => usize::from(self.store.clear_daily_lock(category)?),
            None => self.store.clear_all_daily_locks()?,
        };
        tracing::info!(?category, cleared, "Cleared daily session lock");
        Ok(cleared)
    }

    /// Generate one batch into the category's reservoir. Returns the number
    /// of new words appended after deduplication.
    pub async fn refill_reservoir(&self, category: Category) -> Result<usize, DailySessionError> {
        let batch = self
            .generator
            .generate_words(self.config.min_batch_size, category)
            .await?;
        let appended = self.store.append_to_reservoir(category, &batch)?;
        tracing::info!(%category, generated = batch.len(), appended, "Reservoir refilled");
        Ok(appended)
    }

    /// Refill unless another refill of the same category is running.
    /// `Ok(None)` means the refill was skipped.
    pub async fn refill_if_idle(
        &self,
        category: Category,
    ) -> Result<Option<usize>, DailySessionError> {
        let Some(_slot) = self.try_claim_refill(category) else {
            return Ok(None);
        };
        self.refill_reservoir(category).await.map(Some)
    }

    /// Refill every category below the low-water mark. Failures are logged
    /// per category and do not stop the others.
    pub async fn refill_low_reservoirs(&self) -> Result<usize, StoreError> {
        let mut appended = 0;
        for category in Category::ALL {
            if self.store.reservoir_len(category)? >= self.config.low_water_mark {
                continue;
            }
            match self.refill_if_idle(category).await {
                Ok(Some(n)) => appended += n,
                Ok(None) => tracing::debug!(%category, "Refill already running, skipping"),
                Err(e) => tracing::warn!(error = %e, %category, "Reservoir refill failed"),
            }
        }
        Ok(appended)
    }

    pub fn reservoir_status(&self) -> Result<Vec<ReservoirStatus>, StoreError> {
        Ok(self
            .store
            .reservoir_sizes()?
            .into_iter()
            .map(|(category, size)| ReservoirStatus {
                category,
                size,
                low_water_mark: self.config.low_water_mark,
                refilling: self.is_refilling(category),
            })
            .collect())
    }

    pub fn is_refilling(&self, category: Category) -> bool {
        self.refilling
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&category)
    }

    fn try_claim_refill(&self, category: Category) -> Option<RefillSlot> {
        let mut active = self.refilling.lock().unwrap_or_else(|e| e.into_inner());
        if !active.insert(category) {
            return None;
        }
        Some(RefillSlot {
            category,
            refilling: Arc::clone(&self.refilling),
        })
    }

    /// Detached top-up; its failure is logged and otherwise ignored.
    fn spawn_refill(&self, category: Category) {
        let Some(slot) = self.try_claim_refill(category) else {
            tracing::debug!(%category, "Background refill already in flight");
            return;
        };
        let service = self.clone();
        tokio::spawn(async move {
            let _slot = slot;
            match service.refill_reservoir(category).await {
                Ok(appended) => {
                    tracing::debug!(%category, appended, "Background refill finished")
                }
                Err(e) => tracing::warn!(error = %e, %category, "Background refill failed"),
            }
        });
    }
}
