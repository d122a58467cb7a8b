use chrono::NaiveDate;
use taskpulse::clock::FixedClock;
use taskpulse::commands::*;
use taskpulse::models::{Priority, Theme};
use taskpulse::storage::{self, FileStore, PersistencePort};
use taskpulse::store::{EditRequest, TaskStore};
use tempfile::TempDir;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

fn open(dir: &TempDir) -> TaskStore<FileStore> {
    TaskStore::open_with_clock(FileStore::new(dir.path()), Box::new(FixedClock::new(today()))).unwrap()
}

fn with_test_db<F>(f: F)
where
    F: FnOnce(&TempDir),
{
    let dir = tempfile::tempdir().unwrap();
    f(&dir);
}

#[test]
fn test_add_and_list() {
    with_test_db(|dir| {
        let mut store = open(dir);
        cmd_add(&mut store, "Test Task", Priority::High, Some("2025-12-01")).unwrap();
        cmd_list(&store, false).unwrap();

        let reopened = open(dir);
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.tasks()[0].text, "Test Task");
        assert_eq!(reopened.tasks()[0].due_date, NaiveDate::from_ymd_opt(2025, 12, 1));
    });
}

#[test]
fn test_add_rejects_bad_due_date() {
    with_test_db(|dir| {
        let mut store = open(dir);
        let err = cmd_add(&mut store, "Task", Priority::Low, Some("12/01/2025")).unwrap_err();
        assert!(err.to_string().contains("Use YYYY-MM-DD"));
        assert!(store.is_empty());
    });
}

#[test]
fn test_toggle_task() {
    with_test_db(|dir| {
        let mut store = open(dir);
        cmd_add(&mut store, "Task to complete", Priority::Medium, None).unwrap();
        cmd_toggle(&mut store, 0).unwrap();
        cmd_stats(&store).unwrap();

        let reopened = open(dir);
        assert!(reopened.tasks()[0].completed);
        assert_eq!(reopened.ledger().count_on(today()), 1);
    });
}

#[test]
fn test_edit_and_remove() {
    with_test_db(|dir| {
        let mut store = open(dir);
        cmd_add(&mut store, "first", Priority::Low, None).unwrap();
        cmd_add(&mut store, "second", Priority::Low, None).unwrap();
        cmd_edit(
            &mut store,
            1,
            EditRequest {
                priority: Some("high".into()),
                ..Default::default()
            },
        )
        .unwrap();
        cmd_remove(&mut store, 0, true).unwrap();

        let reopened = open(dir);
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.tasks()[0].text, "second");
        assert_eq!(reopened.tasks()[0].priority, Priority::High);
    });
}

#[test]
fn test_edit_with_unknown_priority_keeps_the_old_one() {
    with_test_db(|dir| {
        let mut store = open(dir);
        cmd_add(&mut store, "draft", Priority::Low, None).unwrap();
        cmd_edit(
            &mut store,
            0,
            EditRequest {
                text: Some("final".into()),
                priority: Some("urgent".into()),
                ..Default::default()
            },
        )
        .unwrap();

        let reopened = open(dir);
        assert_eq!(reopened.tasks()[0].text, "final");
        assert_eq!(reopened.tasks()[0].priority, Priority::Low);
    });
}

#[test]
fn test_remove_missing_index_fails() {
    with_test_db(|dir| {
        let mut store = open(dir);
        assert!(cmd_remove(&mut store, 3, true).is_err());
        assert!(cmd_toggle(&mut store, 0).is_err());
    });
}

#[test]
fn test_theme_command() {
    with_test_db(|dir| {
        let mut store = open(dir);
        cmd_theme(&mut store, Some("toggle")).unwrap();
        assert_eq!(store.theme().unwrap(), Theme::Dark);
        cmd_theme(&mut store, Some("light")).unwrap();
        assert_eq!(store.theme().unwrap(), Theme::Light);
        assert!(cmd_theme(&mut store, Some("sepia")).is_err());
    });
}

#[test]
fn test_reset_keeps_theme() {
    with_test_db(|dir| {
        let mut store = open(dir);
        cmd_add(&mut store, "doomed", Priority::Medium, None).unwrap();
        cmd_toggle(&mut store, 0).unwrap();
        cmd_theme(&mut store, Some("dark")).unwrap();
        cmd_reset(&mut store, true).unwrap();

        assert!(store.is_empty());
        let port = FileStore::new(dir.path());
        assert_eq!(port.get(storage::TASKS_KEY).unwrap(), None);
        assert_eq!(port.get(storage::STATS_KEY).unwrap(), None);
        assert_eq!(storage::load_theme(&port).unwrap(), Theme::Dark);
    });
}
