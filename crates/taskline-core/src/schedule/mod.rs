//! Schedule data model.
//!
//! A [`Schedule`] is the sole contract between the generator and the timer:
//! a flat JSON document holding an optional date and an ordered task list.
//!
//! ```json
//! {
//!   "schedule_date": "2024-09-24",
//!   "tasks": [
//!     { "task_name": "Write report", "start_time": "09:00", "end_time": "10:00", "duration_minutes": 60 }
//!   ]
//! }
//! ```
//!
//! Loading is lenient about what a model (or a human) tends to write: a bare
//! array of tasks is accepted, `name`/`start`/`end` work as field aliases, and
//! a missing `duration_minutes` is derived from the time window.

mod validate;

pub use validate::ScheduleIssue;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ParseError, Result, ScheduleLoadError};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Display status of a task. Derived, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Upcoming,
    Active,
    Completed,
}

impl TaskStatus {
    /// Status of the task at `index` while the task at `current` is running.
    pub fn for_position(index: usize, current: usize) -> Self {
        match index.cmp(&current) {
            std::cmp::Ordering::Less => TaskStatus::Completed,
            std::cmp::Ordering::Equal => TaskStatus::Active,
            std::cmp::Ordering::Greater => TaskStatus::Upcoming,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Upcoming => "Upcoming",
            TaskStatus::Active => "Active Now",
            TaskStatus::Completed => "Completed",
        }
    }
}

/// One block of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord")]
pub struct Task {
    pub task_name: String,
    #[serde(serialize_with = "hhmm::serialize")]
    pub start_time: NaiveTime,
    #[serde(serialize_with = "hhmm::serialize")]
    pub end_time: NaiveTime,
    pub duration_minutes: u32,
}

impl Task {
    pub fn new(name: impl Into<String>, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        let duration_minutes = window_minutes(start_time, end_time) as u32;
        Self {
            task_name: name.into(),
            start_time,
            end_time,
            duration_minutes,
        }
    }

    /// Declared duration.
    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Minutes between start and end, wrapping past midnight.
    pub fn window_minutes(&self) -> i64 {
        window_minutes(self.start_time, self.end_time)
    }

    pub fn start_on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.start_time)
    }

    /// End instant; a window ending before it starts finishes the next day.
    pub fn end_on(&self, date: NaiveDate) -> NaiveDateTime {
        self.start_on(date) + Duration::minutes(self.window_minutes())
    }

    /// Wall-clock status relative to `now` for a schedule on `date`.
    pub fn status_at(&self, date: NaiveDate, now: NaiveDateTime) -> TaskStatus {
        if now >= self.end_on(date) {
            TaskStatus::Completed
        } else if now >= self.start_on(date) {
            TaskStatus::Active
        } else {
            TaskStatus::Upcoming
        }
    }

    /// `'Name' (N min)`, used for "next up" lines.
    pub fn summary(&self) -> String {
        format!("'{}' ({} min)", self.task_name, self.duration_minutes)
    }
}

fn window_minutes(start: NaiveTime, end: NaiveTime) -> i64 {
    let diff = (end - start).num_minutes();
    if diff < 0 {
        diff + MINUTES_PER_DAY
    } else {
        diff
    }
}

/// Wire shape of a task before normalisation.
#[derive(Deserialize)]
struct TaskRecord {
    #[serde(alias = "name")]
    task_name: String,
    #[serde(alias = "start")]
    start_time: String,
    #[serde(alias = "end")]
    end_time: String,
    #[serde(default)]
    duration_minutes: Option<i64>,
}

impl TryFrom<TaskRecord> for Task {
    type Error = String;

    fn try_from(record: TaskRecord) -> std::result::Result<Self, Self::Error> {
        let start_time = hhmm::parse(&record.start_time)
            .ok_or_else(|| format!("invalid start_time '{}'", record.start_time))?;
        let end_time = hhmm::parse(&record.end_time)
            .ok_or_else(|| format!("invalid end_time '{}'", record.end_time))?;
        let duration_minutes = match record.duration_minutes {
            Some(d) if d < 0 => {
                return Err(format!(
                    "duration_minutes for '{}' is negative ({d})",
                    record.task_name
                ))
            }
            Some(d) => u32::try_from(d).map_err(|_| format!("duration_minutes {d} is too large"))?,
            None => window_minutes(start_time, end_time) as u32,
        };
        Ok(Task {
            task_name: record.task_name,
            start_time,
            end_time,
            duration_minutes,
        })
    }
}

/// Ordered list of tasks covering one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_date: Option<NaiveDate>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Schedule {
    pub fn new(schedule_date: Option<NaiveDate>, tasks: Vec<Task>) -> Self {
        Self {
            schedule_date,
            tasks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn total_minutes(&self) -> u64 {
        self.tasks.iter().map(|t| u64::from(t.duration_minutes)).sum()
    }

    /// Human description of whatever follows `index`.
    pub fn next_up(&self, index: usize) -> String {
        self.tasks
            .get(index + 1)
            .map(Task::summary)
            .unwrap_or_else(|| "End of schedule!".to_string())
    }

    /// Date label for console output.
    pub fn date_label(&self) -> String {
        self.schedule_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "today".to_string())
    }

    /// Parse a schedule from JSON text.
    ///
    /// Accepts either `{"schedule_date": .., "tasks": [..]}` or a bare
    /// array of task records.
    pub fn from_json_str(text: &str) -> std::result::Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if value.is_array() {
            let tasks: Vec<Task> = serde_json::from_value(value)?;
            Ok(Schedule::new(None, tasks))
        } else {
            serde_json::from_value(value)
        }
    }

    /// Parse a model response, tolerating a surrounding Markdown code fence.
    pub fn from_llm_response(text: &str) -> std::result::Result<Self, ParseError> {
        let body = strip_code_fence(text);
        if body.is_empty() {
            return Err(ParseError::Empty);
        }
        Self::from_json_str(body).map_err(|source| ParseError::InvalidJson { source })
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load the schedule artifact.
    pub fn load(path: &Path) -> std::result::Result<Self, ScheduleLoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ScheduleLoadError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ScheduleLoadError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_json_str(&text).map_err(|source| ScheduleLoadError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Persist as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = self.to_json_pretty()?;
        content.push('\n');
        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), tasks = self.tasks.len(), "schedule saved");
        Ok(())
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line, e.g. ```json
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// `HH:MM` times; seconds are kept as `HH:MM:SS` when present.
mod hhmm {
    use chrono::{NaiveTime, Timelike};
    use serde::Serializer;

    pub fn parse(s: &str) -> Option<NaiveTime> {
        let s = s.trim();
        NaiveTime::parse_from_str(s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .ok()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        if time.second() == 0 {
            serializer.collect_str(&time.format("%H:%M"))
        } else {
            serializer.collect_str(&time.format("%H:%M:%S"))
        }
    }
}
