//! Read-only state handed to whatever draws the task list.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use chrono::NaiveDate;

use crate::ledger::{DayCount, StatsLedger};
use crate::models::Task;
use crate::ordering::{is_overdue, progress, sorted_indices};

/// A task as shown on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskView {
    /// Position in the store; pass this back to toggle, edit or delete.
    pub index: usize,
    pub task: Task,
    pub overdue: bool,
}

/// Everything the presentation layer needs for one redraw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Tasks in display order.
    pub tasks: Vec<TaskView>,
    pub completed: usize,
    pub total: usize,
    /// Rounded completion percentage.
    pub progress: u8,
    pub week: Vec<DayCount>,
    pub today: Option<NaiveDate>,
}

impl Snapshot {
    pub fn build(tasks: &[Task], ledger: &StatsLedger, today: NaiveDate) -> Snapshot {
        let views = sorted_indices(tasks)
            .into_iter()
            .map(|index| TaskView {
                index,
                task: tasks[index].clone(),
                overdue: is_overdue(&tasks[index], today),
            })
            .collect();
        Snapshot {
            tasks: views,
            completed: tasks.iter().filter(|t| t.completed).count(),
            total: tasks.len(),
            progress: progress(tasks),
            week: ledger.last_7_days(today).collect(),
            today: Some(today),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Colour band of the progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBand {
    /// Below 50%.
    Behind,
    /// 50% up to 79%.
    Halfway,
    /// 80% and above.
    OnTrack,
}

impl ProgressBand {
    pub fn of(progress: u8) -> ProgressBand {
        if progress >= 80 {
            ProgressBand::OnTrack
        } else if progress >= 50 {
            ProgressBand::Halfway
        } else {
            ProgressBand::Behind
        }
    }
}

/// Receives a fresh snapshot after every successful mutation.
pub trait RenderPort {
    fn render(&mut self, snapshot: &Snapshot);
}

/// Keeps the latest snapshot for a draw loop that reads it on its own schedule.
#[derive(Debug, Clone, Default)]
pub struct SharedSnapshot {
    latest: Rc<RefCell<Snapshot>>,
}

impl SharedSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Ref<'_, Snapshot> {
        self.latest.borrow()
    }
}

impl RenderPort for SharedSnapshot {
    fn render(&mut self, snapshot: &Snapshot) {
        *self.latest.borrow_mut() = snapshot.clone();
    }
}
