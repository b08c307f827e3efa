use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::store::{KeyValueStore, StoreError, save_map};

pub const DEFAULT_MIN_ATTEMPTS: u32 = 3;
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// An item must be missed on more than 30% of attempts to qualify as a
/// problem area on mistake rate alone. The boundary is strict.
const MISTAKE_RATE_FLOOR: f64 = 0.3;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Cumulative per-item record for drills that only count right/wrong.
///
/// `times` is not maintained by the session merge: it holds whatever the
/// drill screen last attached directly, so it can go stale relative to
/// `attempts`. Rankers read it as-is.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MistakeTrackedRecord {
    pub attempts: u32,
    pub mistakes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times: Option<Vec<f64>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MistakeSessionRecord {
    pub attempts: u32,
    pub mistakes: u32,
}

/// Derived view, recomputed on every query. `mistake_rate` is a fraction in
/// 0-1, not a percentage.
#[derive(Clone, Debug, PartialEq)]
pub struct MistakeArea {
    pub key: String,
    pub mistake_rate: f64,
    pub avg_time: f64,
    pub attempts: u32,
}

#[derive(Clone, Debug)]
pub struct MistakeRankOptions {
    pub max_results: usize,
    /// When set, items whose average response time exceeds this many seconds
    /// qualify even if their mistake rate does not.
    pub avg_time_threshold: Option<f64>,
}

impl Default for MistakeRankOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            avg_time_threshold: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

fn avg_time(record: &MistakeTrackedRecord) -> f64 {
    match &record.times {
        Some(times) if !times.is_empty() => times.iter().sum::<f64>() / times.len() as f64,
        _ => 0.0,
    }
}

/// Rank items by raw mistake rate, worst first, truncated to
/// `options.max_results`. Items below `min_attempts` are excluded regardless
/// of rate. Absent input yields an empty list.
pub fn mistake_areas(
    stats: Option<&HashMap<String, MistakeTrackedRecord>>,
    min_attempts: u32,
    options: &MistakeRankOptions,
) -> Vec<MistakeArea> {
    let Some(stats) = stats else {
        return Vec::new();
    };
    let min_attempts = min_attempts.max(1);

    let mut areas: Vec<MistakeArea> = stats
        .iter()
        .filter(|(_, record)| record.attempts >= min_attempts)
        .filter_map(|(key, record)| {
            let mistake_rate = record.mistakes as f64 / record.attempts as f64;
            let avg_time = avg_time(record);
            let slow_enough = options
                .avg_time_threshold
                .is_some_and(|threshold| avg_time > threshold);
            if mistake_rate > MISTAKE_RATE_FLOOR || slow_enough {
                Some(MistakeArea {
                    key: key.clone(),
                    mistake_rate,
                    avg_time,
                    attempts: record.attempts,
                })
            } else {
                None
            }
        })
        .collect();

    areas.sort_by(|a, b| {
        b.mistake_rate
            .partial_cmp(&a.mistake_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    areas.truncate(options.max_results);
    areas
}

// ---------------------------------------------------------------------------
// Session merge
// ---------------------------------------------------------------------------

/// Fold one session's counts into the cumulative mapping, then persist the
/// full mapping under `storage_key`. Only `attempts` and `mistakes` are
/// combined; `times` is passed over entirely.
pub fn merge_session(
    store: &mut dyn KeyValueStore,
    storage_key: &str,
    session: &HashMap<String, MistakeSessionRecord>,
    cumulative: &mut HashMap<String, MistakeTrackedRecord>,
) -> Result<(), StoreError> {
    for (key, result) in session {
        let record = cumulative.entry(key.clone()).or_default();
        record.attempts += result.attempts;
        record.mistakes += result.mistakes;
    }
    save_map(store, storage_key, cumulative)
}
