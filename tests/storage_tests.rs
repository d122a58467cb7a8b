use chrono::NaiveDate;
use taskpulse::ledger::StatsLedger;
use taskpulse::models::{Priority, Task};
use taskpulse::storage::*;

#[test]
fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut port = FileStore::new(dir.path().join("nested"));

    assert_eq!(port.get("tasks").unwrap(), None);
    port.set("tasks", "[]").unwrap();
    assert_eq!(port.get("tasks").unwrap().as_deref(), Some("[]"));
    assert!(dir.path().join("nested").join("tasks.json").exists());

    port.remove("tasks").unwrap();
    port.remove("tasks").unwrap();
    assert_eq!(port.get("tasks").unwrap(), None);
}

#[test]
fn test_tasks_and_stats_round_trip() {
    let mut port = MemoryStore::new();
    let tasks = vec![
        Task::new("a", Priority::High, NaiveDate::from_ymd_opt(2025, 3, 1), "2025-01-01T00:00:00.000Z"),
        Task::new("b", Priority::Low, None, "2025-01-02T00:00:00.000Z"),
    ];
    save_tasks(&mut port, &tasks).unwrap();
    let loaded = decode_tasks(load_raw_tasks(&port).unwrap());
    assert_eq!(loaded, tasks);

    let mut ledger = StatsLedger::new();
    ledger.record_completion("2025-03-01");
    save_stats(&mut port, &ledger).unwrap();
    assert_eq!(load_stats(&port).unwrap(), ledger);
}

#[test]
fn test_corrupt_values_load_as_empty() {
    let port = MemoryStore::new();
    port.insert_raw(TASKS_KEY, "{not json");
    port.insert_raw(STATS_KEY, "[1, 2]");
    assert!(load_raw_tasks(&port).unwrap().is_empty());
    assert!(load_stats(&port).unwrap().is_empty());
}

#[test]
fn test_stats_drop_bad_counts() {
    let port = MemoryStore::new();
    port.insert_raw(STATS_KEY, r#"{"2025-03-01": 2, "2025-03-02": -1, "2025-03-03": "x"}"#);
    let ledger = load_stats(&port).unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.count("2025-03-01"), 2);
}

#[test]
fn test_unreadable_task_records_are_skipped() {
    let port = MemoryStore::new();
    port.insert_raw(
        TASKS_KEY,
        r#"[{"text":"ok","priority":"low","dueDate":null,"createdAt":"2025-01-01T00:00:00.000Z"}, 42]"#,
    );
    let tasks = decode_tasks(load_raw_tasks(&port).unwrap());
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].text, "ok");
}

#[test]
fn test_theme_defaults_to_light() {
    let mut port = MemoryStore::new();
    assert_eq!(load_theme(&port).unwrap(), taskpulse::models::Theme::Light);
    save_theme(&mut port, taskpulse::models::Theme::Dark).unwrap();
    assert_eq!(load_theme(&port).unwrap(), taskpulse::models::Theme::Dark);
}

#[test]
fn test_data_dir_prefers_explicit_path() {
    let explicit = std::path::PathBuf::from("/tmp/taskpulse-explicit");
    assert_eq!(data_dir(Some(explicit.clone())), explicit);
    assert!(data_dir(None).ends_with("taskpulse"));
}
