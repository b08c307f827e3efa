use std::collections::HashMap;
use std::fs;

use tempfile::TempDir;

use chordr::engine::mistake_stats::{
    self, MistakeRankOptions, MistakeSessionRecord, MistakeTrackedRecord,
};
use chordr::engine::time_stats::{self, TimeSessionRecord, TimeTrackedRecord};
use chordr::prompt::ConfirmationPrompt;
use chordr::session::{log, reset};
use chordr::store::json_store::JsonFileStore;
use chordr::store::{KeyValueStore, cumulative_key, history_key, load_map};

fn make_test_store() -> (TempDir, JsonFileStore) {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    (dir, store)
}

/// Prompt fake that records how often it was asked.
struct CountingPrompt {
    answer: bool,
    asked: usize,
}

impl CountingPrompt {
    fn new(answer: bool) -> Self {
        Self { answer, asked: 0 }
    }
}

impl ConfirmationPrompt for CountingPrompt {
    fn confirm(&mut self, _message: &str) -> bool {
        self.asked += 1;
        self.answer
    }
}

fn time_session(total: u32, first_try: u32, times: &[f64], slow: u32) -> TimeSessionRecord {
    TimeSessionRecord {
        total,
        first_try,
        times: times.to_vec(),
        slow,
    }
}

#[test]
fn time_tracked_stats_survive_across_store_instances() {
    let (dir, mut store) = make_test_store();
    let key = cumulative_key("intervals");
    let mut cumulative: HashMap<String, TimeTrackedRecord> = load_map(&store, &key);

    let mut session = HashMap::new();
    session.insert("F Tritone".to_string(), time_session(4, 1, &[2.0, 3.0, 2.5, 2.5], 3));
    session.insert("C Fifth".to_string(), time_session(4, 4, &[1.0, 1.0, 1.2, 0.8], 0));
    time_stats::merge_session(&mut store, &key, &session, &mut cumulative).unwrap();

    let mut session = HashMap::new();
    session.insert("F Tritone".to_string(), time_session(2, 1, &[5.0], 1));
    time_stats::merge_session(&mut store, &key, &session, &mut cumulative).unwrap();

    // Re-open over the same directory, as a fresh launch would.
    let reopened = JsonFileStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let stats: HashMap<String, TimeTrackedRecord> = load_map(&reopened, &key);

    let tritone = &stats["F Tritone"];
    assert_eq!(tritone.attempts, 6);
    assert_eq!(tritone.first_try, 2);
    assert!((tritone.total_time - 15.0).abs() < 0.001);
    assert_eq!(tritone.slow, 4);

    let areas = time_stats::problem_areas(Some(&stats), 5);
    assert_eq!(areas.len(), 1, "C Fifth has too few attempts to rank");
    assert_eq!(areas[0].name, "F Tritone");
    assert!((areas[0].problem_score - 133.333).abs() < 0.01);

    let areas = time_stats::problem_areas(Some(&stats), 4);
    assert_eq!(areas.len(), 2);
    assert_eq!(areas[0].name, "F Tritone");
    assert_eq!(areas[1].name, "C Fifth");
    assert!((areas[1].problem_score - 0.0).abs() < 1e-9);
}

#[test]
fn mistake_tracked_flow_ranks_merged_sessions() {
    let (_dir, mut store) = make_test_store();
    let key = cumulative_key("voicings");
    let mut cumulative: HashMap<String, MistakeTrackedRecord> = load_map(&store, &key);

    for _ in 0..2 {
        let mut session = HashMap::new();
        session.insert(
            "G7b9".to_string(),
            MistakeSessionRecord {
                attempts: 5,
                mistakes: 3,
            },
        );
        session.insert(
            "Cmaj7".to_string(),
            MistakeSessionRecord {
                attempts: 5,
                mistakes: 0,
            },
        );
        mistake_stats::merge_session(&mut store, &key, &session, &mut cumulative).unwrap();
    }

    let stats: HashMap<String, MistakeTrackedRecord> = load_map(&store, &key);
    assert_eq!(stats["G7b9"].attempts, 10);
    assert_eq!(stats["G7b9"].mistakes, 6);

    let areas = mistake_stats::mistake_areas(Some(&stats), 3, &MistakeRankOptions::default());
    assert_eq!(areas.len(), 1);
    assert_eq!(areas[0].key, "G7b9");
    assert!((areas[0].mistake_rate - 0.6).abs() < 1e-9);
}

#[test]
fn stored_json_keeps_legacy_field_names() {
    let (dir, mut store) = make_test_store();
    let key = cumulative_key("intervals");
    let mut cumulative = HashMap::new();

    let mut session = HashMap::new();
    session.insert("D Sixth".to_string(), time_session(2, 1, &[1.5, 2.5], 1));
    time_stats::merge_session(&mut store, &key, &session, &mut cumulative).unwrap();

    let raw = fs::read_to_string(dir.path().join(format!("{key}.json"))).unwrap();
    assert!(raw.contains("\"firstTry\""));
    assert!(raw.contains("\"totalTime\""));
    assert!(!raw.contains("first_try"));
}

#[test]
fn legacy_payload_loads_without_migration() {
    let (_dir, mut store) = make_test_store();
    let key = cumulative_key("voicings");
    // Shape written by earlier versions: no times field on most records.
    store
        .set(
            &key,
            r#"{"Bad":{"attempts":10,"mistakes":5},"Slow":{"attempts":8,"mistakes":1,"times":[6.0,7.0]}}"#,
        )
        .unwrap();

    let stats: HashMap<String, MistakeTrackedRecord> = load_map(&store, &key);
    assert_eq!(stats["Bad"].times, None);
    assert_eq!(stats["Slow"].times, Some(vec![6.0, 7.0]));

    let options = MistakeRankOptions {
        avg_time_threshold: Some(5.0),
        ..Default::default()
    };
    let areas = mistake_stats::mistake_areas(Some(&stats), 3, &options);
    assert_eq!(areas.len(), 2);
    assert_eq!(areas[0].key, "Bad");
    assert_eq!(areas[1].key, "Slow");
}

#[test]
fn reset_decline_then_confirm_over_real_files() {
    let (dir, mut store) = make_test_store();
    let history = history_key("scales");
    let cumulative = cumulative_key("scales");

    log::append_entry(
        &mut store,
        &history,
        log::SessionLogEntry::new(chrono::Utc::now()),
    )
    .unwrap();
    store.set(&cumulative, r#"{"A Major":{"attempts":4,"firstTry":2,"totalTime":6.0}}"#)
        .unwrap();

    let mut prompt = CountingPrompt::new(false);
    let mut callbacks = 0;
    let cleared = reset::reset_history(
        &mut store,
        &mut prompt,
        &history,
        Some(&cumulative),
        || callbacks += 1,
    )
    .unwrap();

    assert!(!cleared);
    assert_eq!(prompt.asked, 1);
    assert_eq!(callbacks, 0);
    assert!(dir.path().join(format!("{history}.json")).exists());
    assert!(dir.path().join(format!("{cumulative}.json")).exists());

    let mut prompt = CountingPrompt::new(true);
    let cleared = reset::reset_history(
        &mut store,
        &mut prompt,
        &history,
        Some(&cumulative),
        || callbacks += 1,
    )
    .unwrap();

    assert!(cleared);
    assert_eq!(callbacks, 1);
    assert_eq!(store.get(&history), None);
    assert_eq!(store.get(&cumulative), None);
    assert!(!dir.path().join(format!("{history}.json")).exists());
    assert!(!dir.path().join(format!("{cumulative}.json")).exists());
}

#[test]
fn session_log_round_trips_drill_fields() {
    let (_dir, mut store) = make_test_store();
    let history = history_key("triads");

    let mut entry = log::SessionLogEntry::new(chrono::Utc::now());
    entry
        .details
        .insert("itemsPracticed".to_string(), serde_json::json!(9));
    entry
        .details
        .insert("mode".to_string(), serde_json::json!("spellings"));
    log::append_entry(&mut store, &history, entry).unwrap();

    let entries = log::entries(&store, &history);
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].details.get("itemsPracticed"),
        Some(&serde_json::json!(9))
    );
    assert_eq!(
        entries[0].details.get("mode"),
        Some(&serde_json::json!("spellings"))
    );
}
