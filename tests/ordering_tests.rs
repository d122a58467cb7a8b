use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use taskpulse::models::{Priority, Task};
use taskpulse::ordering::{is_overdue, progress, sort_tasks, sorted_indices};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn task(text: &str, priority: Priority, due: Option<NaiveDate>) -> Task {
    Task::new(text, priority, due, "2025-01-01T00:00:00.000Z")
}

#[test]
fn test_priority_then_due_date() {
    let mut tasks = vec![
        task("medium undated", Priority::Medium, None),
        task("low early", Priority::Low, Some(day(2025, 1, 1))),
        task("high undated", Priority::High, None),
        task("medium late", Priority::Medium, Some(day(2025, 6, 1))),
        task("high dated", Priority::High, Some(day(2025, 9, 1))),
        task("medium early", Priority::Medium, Some(day(2025, 2, 1))),
    ];
    sort_tasks(&mut tasks);
    let order: Vec<&str> = tasks.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(
        order,
        vec!["high dated", "high undated", "medium early", "medium late", "medium undated", "low early"]
    );
}

#[test]
fn test_undated_ties_keep_insertion_order() {
    let tasks = vec![
        task("first", Priority::Low, None),
        task("second", Priority::Low, None),
        task("third", Priority::High, None),
    ];
    assert_eq!(sorted_indices(&tasks), vec![2, 0, 1]);
}

#[test]
fn test_overdue_only_when_open_and_past_due() {
    let today = day(2025, 3, 10);
    let mut t = task("x", Priority::Medium, Some(day(2025, 3, 9)));
    assert!(is_overdue(&t, today));

    t.due_date = Some(today);
    assert!(!is_overdue(&t, today));

    t.due_date = Some(day(2025, 3, 1));
    t.completed = true;
    assert!(!is_overdue(&t, today));

    t.completed = false;
    t.due_date = None;
    assert!(!is_overdue(&t, today));
}

#[test]
fn test_progress_rounds_to_nearest() {
    let mut tasks: Vec<Task> = (0..3).map(|i| task(&i.to_string(), Priority::Medium, None)).collect();
    assert_eq!(progress(&tasks), 0);
    tasks[0].completed = true;
    assert_eq!(progress(&tasks), 33);
    tasks[1].completed = true;
    assert_eq!(progress(&tasks), 67);
    tasks[2].completed = true;
    assert_eq!(progress(&tasks), 100);
    assert_eq!(progress(&[]), 0);
}

fn arb_task() -> impl Strategy<Value = Task> {
    (
        prop::sample::select(Priority::ALL.to_vec()),
        prop::option::of(0i64..60),
        any::<bool>(),
        "[a-z]{1,8}",
    )
        .prop_map(|(priority, due, completed, text)| {
            let mut t = task(&text, priority, due.map(|d| day(2025, 1, 1) + Duration::days(d)));
            t.completed = completed;
            t
        })
}

proptest! {
    #[test]
    fn sorting_twice_changes_nothing(tasks in prop::collection::vec(arb_task(), 0..30)) {
        let mut once = tasks.clone();
        sort_tasks(&mut once);
        let mut twice = once.clone();
        sort_tasks(&mut twice);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn undated_high_beats_any_medium(
        tasks in prop::collection::vec(arb_task(), 0..30),
        due in prop::option::of(0i64..60),
    ) {
        let mut tasks = tasks;
        tasks.push(task("ANCHOR", Priority::High, None));
        tasks.push(task("RIVAL", Priority::Medium, due.map(|d| day(2025, 1, 1) + Duration::days(d))));
        sort_tasks(&mut tasks);
        let anchor = tasks.iter().position(|t| t.text == "ANCHOR").unwrap();
        let rival = tasks.iter().position(|t| t.text == "RIVAL").unwrap();
        prop_assert!(anchor < rival);
        prop_assert!(tasks[..anchor].iter().all(|t| t.priority == Priority::High));
    }

    #[test]
    fn progress_stays_in_bounds(tasks in prop::collection::vec(arb_task(), 0..50)) {
        let p = progress(&tasks);
        prop_assert!(p <= 100);
        if tasks.iter().all(|t| t.completed) && !tasks.is_empty() {
            prop_assert_eq!(p, 100);
        }
    }
}
