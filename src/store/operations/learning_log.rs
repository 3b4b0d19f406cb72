use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::srs::stats::DayStatus;
use crate::store::keys;
use crate::store::{Store, StoreError};

impl Store {
    /// Record the outcome of a day. `Learned` is never downgraded to `Declined`.
    pub fn mark_day(&self, date: NaiveDate, status: DayStatus) -> Result<DayStatus, StoreError> {
        let key = keys::learning_log_key(date);
        let existing: Option<DayStatus> = Self::get_json(&self.learning_log, &key)?;
        let next = match (existing, status) {
            (Some(DayStatus::Learned), _) => DayStatus::Learned,
            (_, status) => status,
        };
        if existing != Some(next) {
            Self::put_json(&self.learning_log, &key, &next)?;
        }
        Ok(next)
    }

    pub fn day_status(&self, date: NaiveDate) -> Result<Option<DayStatus>, StoreError> {
        Self::get_json(&self.learning_log, &keys::learning_log_key(date))
    }

    pub fn learning_log(&self) -> Result<BTreeMap<NaiveDate, DayStatus>, StoreError> {
        let mut log = BTreeMap::new();
        for item in self.learning_log.iter() {
            let (key, raw) = item?;
            let Some(date) = keys::parse_learning_log_key(&key) else {
                tracing::warn!("Skipping learning log entry with malformed date key");
                continue;
            };
            log.insert(date, Self::deserialize(&raw)?);
        }
        Ok(log)
    }
}
