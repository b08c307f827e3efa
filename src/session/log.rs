use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{KeyValueStore, StoreError};

/// One entry in a drill's session log. Entries are appended at session end;
/// beyond the timestamp, the fields are whatever the drill screen chose to
/// record and pass through uninterpreted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionLogEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl SessionLogEntry {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            details: serde_json::Map::new(),
        }
    }
}

/// Read a drill's session log. Missing or unparsable history reads as empty.
pub fn entries(store: &dyn KeyValueStore, history_key: &str) -> Vec<SessionLogEntry> {
    store
        .get(history_key)
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

/// Append one entry to a drill's session log (full read-modify-write of the
/// stored list).
pub fn append_entry(
    store: &mut dyn KeyValueStore,
    history_key: &str,
    entry: SessionLogEntry,
) -> Result<(), StoreError> {
    let mut log = entries(store, history_key);
    log.push(entry);
    let json = serde_json::to_string(&log).map_err(|source| StoreError::Serialize {
        key: history_key.to_string(),
        source,
    })?;
    store.set(history_key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use chrono::TimeZone;

    fn entry_at(secs: i64) -> SessionLogEntry {
        SessionLogEntry::new(Utc.timestamp_opt(secs, 0).unwrap())
    }

    #[test]
    fn test_missing_history_reads_empty() {
        let store = MemoryStore::new();
        assert!(entries(&store, "triads_history").is_empty());
    }

    #[test]
    fn test_append_accumulates_in_order() {
        let mut store = MemoryStore::new();
        append_entry(&mut store, "triads_history", entry_at(100)).unwrap();
        append_entry(&mut store, "triads_history", entry_at(200)).unwrap();

        let log = entries(&store, "triads_history");
        assert_eq!(log.len(), 2);
        assert!(log[0].timestamp < log[1].timestamp);
    }

    #[test]
    fn test_drill_specific_fields_round_trip() {
        let mut store = MemoryStore::new();
        let mut entry = entry_at(300);
        entry
            .details
            .insert("itemsPracticed".to_string(), serde_json::json!(12));
        append_entry(&mut store, "k", entry).unwrap();

        let log = entries(&store, "k");
        assert_eq!(log[0].details.get("itemsPracticed"), Some(&serde_json::json!(12)));
    }

    #[test]
    fn test_corrupt_history_reads_empty() {
        let mut store = MemoryStore::new();
        store.set("k", "{not a list").unwrap();
        assert!(entries(&store, "k").is_empty());
    }
}
