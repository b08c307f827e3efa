use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::store::{KeyValueStore, StoreError, save_map};

pub const DEFAULT_MIN_ATTEMPTS: u32 = 5;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Cumulative per-item record for drills that track response time. Fields
/// only ever grow; the history reset is the sole way back to zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeTrackedRecord {
    pub attempts: u32,
    pub first_try: u32,
    pub total_time: f64,
    #[serde(default)]
    pub slow: u32,
}

/// One item's results from a single practice session. `times` holds the
/// per-attempt elapsed seconds for this session only.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSessionRecord {
    pub total: u32,
    pub first_try: u32,
    pub times: Vec<f64>,
    #[serde(default)]
    pub slow: u32,
}

/// Derived view over one item's cumulative record. Recomputed on every
/// query, never persisted. Percentages are on a 0-100 scale.
#[derive(Clone, Debug, PartialEq)]
pub struct ProblemArea {
    pub name: String,
    pub success_rate: f64,
    pub slow_rate: f64,
    pub avg_time: f64,
    pub attempts: u32,
    pub first_try: u32,
    pub slow: u32,
    pub problem_score: f64,
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Rank items by severity, worst first. An item's score combines how often
/// the first attempt fails with how often responses are slow:
/// `(100 - success_rate) + slow_rate`, range 0-200.
///
/// Items with fewer than `min_attempts` attempts are excluded; there is no
/// result limit. Absent input yields an empty list.
pub fn problem_areas(
    stats: Option<&HashMap<String, TimeTrackedRecord>>,
    min_attempts: u32,
) -> Vec<ProblemArea> {
    let Some(stats) = stats else {
        return Vec::new();
    };
    // A zero threshold would let attempts == 0 reach the rate divisions.
    let min_attempts = min_attempts.max(1);

    let mut areas: Vec<ProblemArea> = stats
        .iter()
        .filter(|(_, record)| record.attempts >= min_attempts)
        .map(|(name, record)| {
            let attempts = record.attempts as f64;
            let success_rate = record.first_try as f64 / attempts * 100.0;
            let slow_rate = record.slow as f64 / attempts * 100.0;
            ProblemArea {
                name: name.clone(),
                success_rate,
                slow_rate,
                avg_time: record.total_time / attempts,
                attempts: record.attempts,
                first_try: record.first_try,
                slow: record.slow,
                problem_score: (100.0 - success_rate) + slow_rate,
            }
        })
        .collect();

    areas.sort_by(|a, b| {
        b.problem_score
            .partial_cmp(&a.problem_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    areas
}

// ---------------------------------------------------------------------------
// Session merge
// ---------------------------------------------------------------------------

/// Fold one session's results into the cumulative mapping, then persist the
/// full mapping under `storage_key`. The in-place mutation and the write are
/// both part of the contract: the caller keeps using the updated mapping
/// without re-reading the store.
///
/// Items absent from the session are left untouched. An empty session is a
/// no-op aside from the persistence write.
pub fn merge_session(
    store: &mut dyn KeyValueStore,
    storage_key: &str,
    session: &HashMap<String, TimeSessionRecord>,
    cumulative: &mut HashMap<String, TimeTrackedRecord>,
) -> Result<(), StoreError> {
    for (name, result) in session {
        let record = cumulative.entry(name.clone()).or_default();
        record.attempts += result.total;
        record.first_try += result.first_try;
        record.total_time += result.times.iter().sum::<f64>();
        record.slow += result.slow;
    }
    save_map(store, storage_key, cumulative)
}
