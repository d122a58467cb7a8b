use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// Format used for due dates and for stats ledger keys.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Ordinal importance of a task.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Sort weight: high = 3, medium = 2, low = 1.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    /// Parses a user token, ignoring case and surrounding whitespace.
    ///
    /// Returns `None` for anything that is not `low`, `medium` or `high`.
    pub fn parse(token: &str) -> Option<Priority> {
        match token.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Marker shown next to a task in list output.
    pub fn symbol(self) -> &'static str {
        match self {
            Priority::Low => "🟢",
            Priority::Medium => "🟠",
            Priority::High => "🔴",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::parse(s).ok_or_else(|| format!("unknown priority '{}': use low, medium or high", s))
    }
}

// Stored records may carry null or a token from an older build; both read as medium.
impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = Option::<String>::deserialize(deserializer)?;
        Ok(token.as_deref().and_then(Priority::parse).unwrap_or_default())
    }
}

/// Represents a single task in the task list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// What the task is about.
    pub text: String,
    /// Whether the task has been completed. Null reads as false.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    /// Optional due date, stored as `YYYY-MM-DD` or null.
    #[serde(default, deserialize_with = "lenient_date")]
    pub due_date: Option<NaiveDate>,
    /// Timestamp when the task was created (RFC 3339).
    pub created_at: String,
    /// Local date the task was last marked completed.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_date")]
    pub completed_on: Option<NaiveDate>,
}

impl Task {
    pub fn new(text: impl Into<String>, priority: Priority, due_date: Option<NaiveDate>, created_at: impl Into<String>) -> Task {
        Task {
            text: text.into(),
            completed: false,
            priority,
            due_date,
            created_at: created_at.into(),
            completed_on: None,
        }
    }
}

/// Light or dark colour scheme, persisted next to the task data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Anything other than `"dark"` means light.
    pub fn from_stored(value: &str) -> Theme {
        if value == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Formats a date as a zero-padded ledger key (`YYYY-MM-DD`).
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses a due date entered by the user.
///
/// A blank input means "no due date".
pub fn parse_due_date(input: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(Some)
        .map_err(|_| ValidationError::InvalidDueDate(trimmed.to_string()))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Accepts null, a `YYYY-MM-DD` string or a full timestamp; anything unreadable becomes `None`.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(|s| {
        let s = s.trim();
        let day = s.get(..10).unwrap_or(s);
        NaiveDate::parse_from_str(day, DATE_FORMAT).ok()
    }))
}
