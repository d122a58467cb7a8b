use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::PersistenceError;
use crate::ledger::StatsLedger;
use crate::models::{Task, Theme};

pub const TASKS_KEY: &str = "tasks";
pub const STATS_KEY: &str = "stats";
pub const THEME_KEY: &str = "theme";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "TASKPULSE_DATA";

/// Durable key-value storage scoped to one user.
///
/// Every value is read and written in full; there are no partial updates and
/// no transactions across keys.
pub trait PersistencePort {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Removing a key that does not exist is not an error.
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

/// Returns the directory holding the data files.
///
/// The path is determined in the following order:
/// 1. An explicit override (the `--data-dir` flag or `TASKPULSE_DATA`).
/// 2. `~/.local/share/taskpulse` (on Linux).
/// 3. `./taskpulse` (fallback).
pub fn data_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| {
        let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("taskpulse");
        p
    })
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl PersistencePort for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let mut f = OpenOptions::new().read(true).open(&path)?;
        let mut s = String::new();
        f.read_to_string(&mut s)?;
        Ok(Some(s))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        let path = self.path(key);
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        f.write_all(value.as_bytes())?;
        debug!(key, path = %path.display(), bytes = value.len(), "wrote value");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        let path = self.path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and throwaway sessions.
///
/// Clones share the same map, so a test can keep a handle after moving one
/// into a [`TaskStore`](crate::store::TaskStore).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Rc<RefCell<HashMap<String, String>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `set` fail, as a full disk or quota would.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    pub fn insert_raw(&self, key: &str, value: &str) {
        self.values.borrow_mut().insert(key.to_string(), value.to_string());
    }
}

impl PersistencePort for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.raw(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        if self.fail_writes.get() {
            return Err(PersistenceError::Io(std::io::Error::other("storage quota exceeded")));
        }
        self.insert_raw(key, value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// Loads the task list as raw JSON records, before migration.
///
/// Returns an empty list if nothing is stored or the stored value cannot be parsed.
pub fn load_raw_tasks(port: &dyn PersistencePort) -> Result<Vec<Value>, PersistenceError> {
    let Some(s) = port.get(TASKS_KEY)? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str::<Vec<Value>>(&s) {
        Ok(records) => Ok(records),
        Err(e) => {
            warn!(error = %e, "stored task list is not a JSON array; starting empty");
            Ok(Vec::new())
        }
    }
}

/// Decodes migrated records, skipping any that are not tasks.
pub fn decode_tasks(records: Vec<Value>) -> Vec<Task> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(i, record)| match serde_json::from_value::<Task>(record) {
            Ok(task) => Some(task),
            Err(e) => {
                warn!(index = i, error = %e, "skipping unreadable task record");
                None
            }
        })
        .collect()
}

pub fn save_raw_tasks(port: &mut dyn PersistencePort, records: &[Value]) -> Result<(), PersistenceError> {
    write_json(port, TASKS_KEY, &records)
}

/// Saves the given list of tasks, overwriting the stored list.
pub fn save_tasks(port: &mut dyn PersistencePort, tasks: &[Task]) -> Result<(), PersistenceError> {
    write_json(port, TASKS_KEY, &tasks)
}

/// Loads the completion ledger. Negative or non-integer counts are dropped to keep counts non-negative.
pub fn load_stats(port: &dyn PersistencePort) -> Result<StatsLedger, PersistenceError> {
    let Some(s) = port.get(STATS_KEY)? else {
        return Ok(StatsLedger::new());
    };
    match serde_json::from_str::<HashMap<String, Value>>(&s) {
        Ok(map) => Ok(map
            .into_iter()
            .filter_map(|(key, count)| count.as_i64().map(|c| (key, c)))
            .collect()),
        Err(e) => {
            warn!(error = %e, "stored stats are not a JSON object; starting empty");
            Ok(StatsLedger::new())
        }
    }
}

pub fn save_stats(port: &mut dyn PersistencePort, ledger: &StatsLedger) -> Result<(), PersistenceError> {
    write_json(port, STATS_KEY, ledger)
}

pub fn load_theme(port: &dyn PersistencePort) -> Result<Theme, PersistenceError> {
    Ok(port
        .get(THEME_KEY)?
        .map(|s| Theme::from_stored(s.trim().trim_matches('"')))
        .unwrap_or_default())
}

pub fn save_theme(port: &mut dyn PersistencePort, theme: Theme) -> Result<(), PersistenceError> {
    port.set(THEME_KEY, theme.as_str())
}

/// Deletes the stored tasks and stats. The theme is kept.
pub fn clear_data(port: &mut dyn PersistencePort) -> Result<(), PersistenceError> {
    port.remove(TASKS_KEY)?;
    port.remove(STATS_KEY)?;
    Ok(())
}

fn write_json<T: serde::Serialize + ?Sized>(
    port: &mut dyn PersistencePort,
    key: &str,
    value: &T,
) -> Result<(), PersistenceError> {
    let s = serde_json::to_string_pretty(value).map_err(|source| PersistenceError::Json {
        key: key.to_string(),
        source,
    })?;
    port.set(key, &s)
}
