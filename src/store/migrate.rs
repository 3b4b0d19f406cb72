use crate::models::LearnedWord;
use crate::store::keys;
use crate::store::{Store, StoreError};

type MigrationFn = fn(&Store) -> Result<(), StoreError>;

fn migrations() -> Vec<(&'static str, MigrationFn)> {
    vec![
        ("001_initial", m001_initial),
        ("002_normalize_vocabulary_keys", m002_normalize_vocabulary_keys),
    ]
}

/// Apply every migration newer than the stored schema version.
///
/// Each migration must be idempotent: a crash between running it and
/// recording its version means it runs again on the next start. Versions
/// only move forward.
pub fn run(store: &Store) -> Result<(), StoreError> {
    let current = get_current_version(store)?;

    for (index, (name, func)) in migrations().iter().enumerate() {
        let version = (index + 1) as u32;
        if version > current {
            tracing::info!(version, name, "Running migration");
            func(store)?;
            set_version(store, version)?;
            tracing::info!(version, name, "Migration complete");
        } else {
            tracing::debug!(version, name, "Migration already applied, skipping");
        }
    }

    Ok(())
}

pub fn latest_version() -> u32 {
    migrations().len() as u32
}

pub fn get_current_version(store: &Store) -> Result<u32, StoreError> {
    match store.meta.get(keys::SCHEMA_VERSION_KEY.as_bytes())? {
        Some(raw) => {
            let bytes: [u8; 4] = raw.as_ref().try_into().map_err(|_| StoreError::Migration {
                version: 0,
                message: format!("corrupt schema version ({} bytes)", raw.len()),
            })?;
            Ok(u32::from_be_bytes(bytes))
        }
        None => Ok(0),
    }
}

pub fn set_version(store: &Store, version: u32) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if version < current {
        return Err(StoreError::Migration {
            version,
            message: format!("Refuse to downgrade from {} to {}", current, version),
        });
    }

    store
        .meta
        .insert(keys::SCHEMA_VERSION_KEY.as_bytes(), &version.to_be_bytes())?;
    Ok(())
}

fn m001_initial(_store: &Store) -> Result<(), StoreError> {
    Ok(())
}

/// Early imports keyed vocabulary by the headword as typed; re-key by the
/// normalized headword so lookups and duplicate checks are case-insensitive.
fn m002_normalize_vocabulary_keys(store: &Store) -> Result<(), StoreError> {
    let mut moved = 0usize;
    for item in store.vocabulary.iter() {
        let (key, value) = item?;
        let word: LearnedWord = Store::deserialize(&value)?;
        let normalized = keys::vocabulary_key(&word.word.word);
        if key.as_ref() == normalized.as_bytes() {
            continue;
        }

        // Keep whichever entry already sits at the normalized key.
        let _ = store.vocabulary.compare_and_swap(
            normalized.as_bytes(),
            None as Option<&[u8]>,
            Some(value),
        )?;
        store.vocabulary.remove(key)?;
        moved += 1;
    }

    if moved > 0 {
        tracing::info!(moved, "Re-keyed vocabulary entries");
    }
    Ok(())
}
