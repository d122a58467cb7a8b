//! Error types returned by the task store and the persistence layer.

use thiserror::Error;

/// A request was rejected because one of its inputs is unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Task text was empty after trimming.
    #[error("The task text is blank. Enter a task name and try again.")]
    BlankText,

    /// Due date was not a `YYYY-MM-DD` calendar date.
    #[error("Invalid due date '{0}'. Use YYYY-MM-DD.")]
    InvalidDueDate(String),
}

/// Reading or writing a stored value failed.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not encode '{key}': {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Main error type for task store operations.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The operation addressed a task index outside the current list.
    #[error("No task at index {index} (the list has {len} tasks).")]
    Index { index: usize, len: usize },

    /// The mutation was applied in memory but could not be written back.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl TaskError {
    pub fn is_validation(&self) -> bool {
        matches!(self, TaskError::Validation(_))
    }

    pub fn is_index(&self) -> bool {
        matches!(self, TaskError::Index { .. })
    }
}

pub type Result<T> = std::result::Result<T, TaskError>;
