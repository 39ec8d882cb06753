//! Task model shared by the task source, the filtering engine, and the bot.
//!
//! Field names and the numeric priority encoding follow the Todoist REST API
//! so these types deserialize straight from its JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Task priority. Wire values are inverted relative to the display name:
/// P1 (most urgent) is `4`, P4 (the unset default) is `1`.
///
/// Values outside 1..=4 coming from the task source decode as `Unknown`
/// so a single odd task does not fail the whole listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "i64")]
pub enum Priority {
    Unknown(i64),
    #[default]
    P4,
    P3,
    P2,
    P1,
}

/// A numeric priority outside 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid priority value: {0}")]
pub struct InvalidPriority(pub u8);

impl Priority {
    /// All priorities, most urgent first.
    pub const ALL: [Priority; 4] = [Priority::P1, Priority::P2, Priority::P3, Priority::P4];

    /// Numeric wire value (higher = more urgent).
    pub fn value(self) -> i64 {
        match self {
            Priority::P1 => 4,
            Priority::P2 => 3,
            Priority::P3 => 2,
            Priority::P4 => 1,
            Priority::Unknown(v) => v,
        }
    }

    /// Lenient decode used for task source payloads.
    pub fn from_wire(value: i64) -> Self {
        match value {
            4 => Priority::P1,
            3 => Priority::P2,
            2 => Priority::P3,
            1 => Priority::P4,
            other => Priority::Unknown(other),
        }
    }

    /// Colored circle used when rendering tasks.
    pub fn glyph(self) -> &'static str {
        match self {
            Priority::P1 => "🔴",
            Priority::P2 => "🟠",
            Priority::P3 => "🔵",
            Priority::P4 | Priority::Unknown(_) => "⚪",
        }
    }

    /// Display name ("P1".."P4").
    pub fn label(self) -> &'static str {
        match self {
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
            Priority::P4 => "P4",
            Priority::Unknown(_) => "P?",
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = InvalidPriority;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Priority::P1),
            3 => Ok(Priority::P2),
            2 => Ok(Priority::P3),
            1 => Ok(Priority::P4),
            other => Err(InvalidPriority(other)),
        }
    }
}

impl From<Priority> for i64 {
    fn from(p: Priority) -> Self {
        p.value()
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Priority::from_wire)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Reserved labels that hold a task back until a given hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeMarker {
    Noon,
    Afternoon,
    Evening,
    Night,
}

impl TimeMarker {
    /// Markers in the order visibility checks evaluate them.
    pub const ALL: [TimeMarker; 4] = [
        TimeMarker::Noon,
        TimeMarker::Afternoon,
        TimeMarker::Evening,
        TimeMarker::Night,
    ];

    /// Parse a label; anything that is not a reserved marker yields `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "12pm" => Some(TimeMarker::Noon),
            "3pm" => Some(TimeMarker::Afternoon),
            "6pm" => Some(TimeMarker::Evening),
            "9pm" => Some(TimeMarker::Night),
            _ => None,
        }
    }

    /// The label string as stored on the task.
    pub fn as_str(self) -> &'static str {
        match self {
            TimeMarker::Noon => "12pm",
            TimeMarker::Afternoon => "3pm",
            TimeMarker::Evening => "6pm",
            TimeMarker::Night => "9pm",
        }
    }

    /// First hour (0-23) at which a task carrying this marker may be shown.
    pub fn threshold_hour(self) -> u32 {
        match self {
            TimeMarker::Noon => 12,
            TimeMarker::Afternoon => 15,
            TimeMarker::Evening => 18,
            TimeMarker::Night => 21,
        }
    }
}

impl std::fmt::Display for TimeMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Due information. Only the calendar date is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDue {
    pub date: String,
}

/// A to-do item as returned by the task source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due: Option<TaskDue>,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Task {
    /// Due date, or `None` when the task has no due date or it is not a
    /// plain `YYYY-MM-DD` value.
    pub fn due_date(&self) -> Option<NaiveDate> {
        let due = self.due.as_ref()?;
        NaiveDate::parse_from_str(&due.date, "%Y-%m-%d").ok()
    }

    /// Time markers on this task, in check order.
    pub fn time_markers(&self) -> Vec<TimeMarker> {
        TimeMarker::ALL
            .into_iter()
            .filter(|m| self.labels.iter().any(|l| l == m.as_str()))
            .collect()
    }

    pub fn has_time_marker(&self) -> bool {
        self.labels.iter().any(|l| TimeMarker::parse(l).is_some())
    }
}

/// A project a task can belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_inbox_project: bool,
}

/// Fields written back to the task source when a dialog finalizes.
/// An empty `labels` is left out of the body so the task keeps its labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskUpdate {
    pub priority: Priority,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}
