use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::models::Task;

/// Display order: higher priority first, then earlier due date, dated tasks
/// ahead of undated ones. Two undated tasks of equal priority compare equal.
pub fn display_order(a: &Task, b: &Task) -> Ordering {
    b.priority
        .rank()
        .cmp(&a.priority.rank())
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Sorts tasks in place for display. The sort is stable.
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(display_order);
}

/// Positions of `tasks` in display order.
pub fn sorted_indices(tasks: &[Task]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..tasks.len()).collect();
    indices.sort_by(|&a, &b| display_order(&tasks[a], &tasks[b]));
    indices
}

/// A task is overdue when it is still open and its due date is before `today`.
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    !task.completed && task.due_date.is_some_and(|due| due < today)
}

/// Percentage of completed tasks, rounded half up. An empty list is 0%.
pub fn progress(tasks: &[Task]) -> u8 {
    let total = tasks.len();
    if total == 0 {
        return 0;
    }
    let completed = tasks.iter().filter(|t| t.completed).count();
    ((200 * completed + total) / (2 * total)) as u8
}
