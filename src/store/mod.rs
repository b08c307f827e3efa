pub mod json_store;
pub mod memory;

use std::collections::HashMap;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Durable string-keyed storage for JSON payloads. Implementations are
/// injected into the mergers and the resetter so they stay testable with
/// an in-memory fake.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize value for {key}: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },
    #[error("failed to write {key}: {source}")]
    Write {
        key: String,
        source: std::io::Error,
    },
    #[error("failed to remove {key}: {source}")]
    Remove {
        key: String,
        source: std::io::Error,
    },
}

/// Per-drill storage keys. Existing installs already store data under these
/// names, so the suffixes must not change.
pub fn history_key(drill: &str) -> String {
    format!("{drill}_history")
}

pub fn cumulative_key(drill: &str) -> String {
    format!("{drill}_cumulativeStats")
}

/// Load a stored mapping. Missing keys and unparsable payloads both read as
/// an empty map; callers never see a storage-shape error.
pub fn load_map<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> HashMap<String, T> {
    store
        .get(key)
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

pub fn save_map<T: Serialize>(
    store: &mut dyn KeyValueStore,
    key: &str,
    map: &HashMap<String, T>,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(map).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json)
}
