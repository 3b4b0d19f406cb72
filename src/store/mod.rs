pub mod keys;
pub mod migrate;
pub mod operations;
pub mod trees;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::Db;
use thiserror::Error;

/// All persisted state of a single learner, one sled tree per concern.
#[derive(Debug)]
pub struct Store {
    db: Db,
    pub vocabulary: sled::Tree,
    pub reservoirs: sled::Tree,
    pub daily_locks: sled::Tree,
    pub review_sessions: sled::Tree,
    pub learning_log: sled::Tree,
    pub settings: sled::Tree,
    pub meta: sled::Tree,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not found: entity={entity}, key={key}")]
    NotFound { entity: String, key: String },
    #[error("conflict: entity={entity}, key={key}")]
    Conflict { entity: String, key: String },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("migration error at version {version}: {message}")]
    Migration { version: u32, message: String },
}

impl StoreError {
    pub fn not_found(entity: &str, key: &str) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            key: key.to_string(),
        }
    }

    pub fn conflict(entity: &str, key: &str) -> Self {
        Self::Conflict {
            entity: entity.to_string(),
            key: key.to_string(),
        }
    }
}

impl Store {
    pub fn open(sled_path: &str) -> Result<Self, StoreError> {
        let db = sled::open(sled_path)?;
        Self::from_db(db)
    }

    /// In-memory store that disappears on drop.
    pub fn temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> Result<Self, StoreError> {
        Ok(Self {
            vocabulary: db.open_tree(trees::VOCABULARY)?,
            reservoirs: db.open_tree(trees::RESERVOIRS)?,
            daily_locks: db.open_tree(trees::DAILY_LOCKS)?,
            review_sessions: db.open_tree(trees::REVIEW_SESSIONS)?,
            learning_log: db.open_tree(trees::LEARNING_LOG)?,
            settings: db.open_tree(trees::SETTINGS)?,
            meta: db.open_tree(trees::META)?,
            db,
        })
    }

    pub fn run_migrations(&self) -> Result<(), StoreError> {
        migrate::run(self)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    /// Cheap read used by the readiness check.
    pub fn ping(&self) -> Result<(), StoreError> {
        self.meta.get(keys::SCHEMA_VERSION_KEY.as_bytes())?;
        Ok(())
    }

    pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub(crate) fn get_json<T: DeserializeOwned>(
        tree: &sled::Tree,
        key: &str,
    ) -> Result<Option<T>, StoreError> {
        match tree.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn put_json<T: Serialize>(
        tree: &sled::Tree,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        tree.insert(key.as_bytes(), Self::serialize(value)?)?;
        Ok(())
    }
}

/// Serde failures inside a transaction closure abort the transaction.
pub(crate) fn tx_json<T: DeserializeOwned>(
    bytes: &[u8],
) -> Result<T, ConflictableTransactionError<StoreError>> {
    serde_json::from_slice(bytes)
        .map_err(|e| ConflictableTransactionError::Abort(StoreError::Serialization(e)))
}

pub(crate) fn tx_bytes<T: Serialize>(
    value: &T,
) -> Result<Vec<u8>, ConflictableTransactionError<StoreError>> {
    serde_json::to_vec(value)
        .map_err(|e| ConflictableTransactionError::Abort(StoreError::Serialization(e)))
}

pub(crate) fn map_tx_error(error: TransactionError<StoreError>) -> StoreError {
    match error {
        TransactionError::Abort(store_error) => store_error,
        TransactionError::Storage(storage_error) => StoreError::Sled(storage_error),
    }
}
