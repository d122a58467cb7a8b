//! The task list and its completion ledger, written through to storage after
//! every change.

use chrono::{NaiveDate, SecondsFormat};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, TaskError, ValidationError};
use crate::ledger::{StatsLedger, RETENTION_DAYS};
use crate::migrate::migrate_tasks;
use crate::models::{date_key, parse_due_date, Priority, Task, Theme};
use crate::render::{RenderPort, Snapshot};
use crate::storage::{self, PersistencePort};

/// Changes requested for one task. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditRequest {
    /// Replaces the text when non-blank after trimming.
    pub text: Option<String>,
    /// `low`, `medium` or `high` in any case; other tokens are ignored.
    pub priority: Option<String>,
    /// `YYYY-MM-DD`, or an empty string to clear the due date.
    pub due_date: Option<String>,
}

pub struct TaskStore<P: PersistencePort> {
    tasks: Vec<Task>,
    ledger: StatsLedger,
    port: P,
    clock: Box<dyn Clock>,
    renderer: Option<Box<dyn RenderPort>>,
}

impl<P: PersistencePort> TaskStore<P> {
    pub fn open(port: P) -> Result<Self> {
        Self::open_with_clock(port, Box::new(SystemClock))
    }

    /// Loads tasks and stats, migrating old task records and dropping stats
    /// older than the retention window. Both fixes are written back at once.
    pub fn open_with_clock(mut port: P, clock: Box<dyn Clock>) -> Result<Self> {
        let mut records = storage::load_raw_tasks(&port)?;
        if migrate_tasks(&mut records, clock.now()) {
            storage::save_raw_tasks(&mut port, &records)?;
        }
        let tasks = storage::decode_tasks(records);

        let mut ledger = storage::load_stats(&port)?;
        let purged = ledger.purge_older_than(RETENTION_DAYS, clock.today());
        if purged > 0 {
            storage::save_stats(&mut port, &ledger)?;
        }

        info!(tasks = tasks.len(), stat_days = ledger.len(), purged, "opened task store");
        Ok(Self {
            tasks,
            ledger,
            port,
            clock,
            renderer: None,
        })
    }

    /// Attaches the presentation layer and sends it the current state.
    pub fn set_renderer(&mut self, renderer: Box<dyn RenderPort>) {
        self.renderer = Some(renderer);
        self.notify();
    }

    /// Appends a new open task and returns its index.
    pub fn create(&mut self, text: &str, priority: Priority, due_date: Option<NaiveDate>) -> Result<usize> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::BlankText.into());
        }
        let created_at = self.clock.now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.tasks.push(Task::new(text, priority, due_date, created_at));
        let index = self.tasks.len() - 1;
        debug!(index, %priority, ?due_date, "created task");
        self.commit(false)?;
        Ok(index)
    }

    /// Flips completion and returns the new state.
    ///
    /// Completing credits today's ledger bucket. Reopening debits the day the
    /// task was completed, or today for tasks saved without that date.
    pub fn toggle(&mut self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        let today = self.clock.today();
        let task = &mut self.tasks[index];
        task.completed = !task.completed;
        if task.completed {
            task.completed_on = Some(today);
            self.ledger.record_completion(&date_key(today));
        } else {
            let day = task.completed_on.take().unwrap_or(today);
            self.ledger.record_uncompletion(&date_key(day));
        }
        let completed = task.completed;
        debug!(index, completed, "toggled task");
        self.commit(true)?;
        Ok(completed)
    }

    /// Validates every requested change, then applies them together.
    ///
    /// An unparseable due date rejects the whole request.
    pub fn edit(&mut self, index: usize, request: EditRequest) -> Result<()> {
        self.check_index(index)?;
        let text = request.text.as_deref().map(str::trim).filter(|t| !t.is_empty());
        let priority = request.priority.as_deref().and_then(|token| {
            let parsed = Priority::parse(token);
            if parsed.is_none() && !token.trim().is_empty() {
                debug!(token, "ignoring unknown priority");
            }
            parsed
        });
        let due_date = request.due_date.as_deref().map(parse_due_date).transpose()?;

        let task = &mut self.tasks[index];
        if let Some(text) = text {
            task.text = text.to_string();
        }
        if let Some(priority) = priority {
            task.priority = priority;
        }
        if let Some(due_date) = due_date {
            task.due_date = due_date;
        }
        debug!(index, "edited task");
        self.commit(false)
    }

    /// Removes a task, debiting its completion day if it was completed.
    pub fn delete(&mut self, index: usize) -> Result<Task> {
        self.check_index(index)?;
        let stats_changed = self.tasks[index].completed;
        if stats_changed {
            let day = self.tasks[index].completed_on.unwrap_or_else(|| self.clock.today());
            self.ledger.record_uncompletion(&date_key(day));
        }
        let removed = self.tasks.remove(index);
        debug!(index, text = %removed.text, "deleted task");
        self.commit(stats_changed)?;
        Ok(removed)
    }

    /// Drops every task and all completion history.
    pub fn reset(&mut self) -> Result<()> {
        self.tasks.clear();
        self.ledger = StatsLedger::new();
        let cleared = storage::clear_data(&mut self.port);
        self.notify();
        info!("reset task data");
        cleared.map_err(TaskError::from)
    }

    pub fn theme(&self) -> Result<Theme> {
        Ok(storage::load_theme(&self.port)?)
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        storage::save_theme(&mut self.port, theme)?;
        debug!(theme = theme.as_str(), "saved theme");
        Ok(())
    }

    /// Tasks in creation order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn ledger(&self) -> &StatsLedger {
        &self.ledger
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::build(&self.tasks, &self.ledger, self.clock.today())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.tasks.len() {
            return Err(TaskError::Index {
                index,
                len: self.tasks.len(),
            });
        }
        Ok(())
    }

    /// Writes tasks (and stats when they changed) and pushes a snapshot.
    ///
    /// The in-memory state keeps the change even if a write fails.
    fn commit(&mut self, stats_changed: bool) -> Result<()> {
        let tasks_saved = storage::save_tasks(&mut self.port, &self.tasks);
        let stats_saved = if stats_changed {
            storage::save_stats(&mut self.port, &self.ledger)
        } else {
            Ok(())
        };
        self.notify();
        tasks_saved.and(stats_saved).map_err(|e| {
            warn!(error = %e, "could not persist changes");
            TaskError::from(e)
        })
    }

    fn notify(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            let snapshot = Snapshot::build(&self.tasks, &self.ledger, self.clock.today());
            renderer.render(&snapshot);
        }
    }
}
