use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Why a task ended without an alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The user pressed the skip key.
    User,
    /// `duration_minutes` was zero.
    InvalidDuration,
    /// The deadline had already passed when the task came up.
    Elapsed,
}

/// Every transition of the timer loop produces an Event.
/// The CLI renders them; tests record them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    RunStarted {
        tasks: usize,
        at: NaiveDateTime,
    },
    TaskStarted {
        index: usize,
        name: String,
        duration_minutes: u32,
        next_up: String,
        at: NaiveDateTime,
    },
    Tick {
        index: usize,
        remaining_secs: u64,
        at: NaiveDateTime,
    },
    TaskSkipped {
        index: usize,
        reason: SkipReason,
        at: NaiveDateTime,
    },
    AlarmRaised {
        index: usize,
        at: NaiveDateTime,
    },
    TaskCompleted {
        index: usize,
        at: NaiveDateTime,
    },
    /// Interrupt received; the run ends at the next task boundary.
    StopRequested {
        index: usize,
        at: NaiveDateTime,
    },
    /// The run stopped before task `index`.
    RunInterrupted {
        index: usize,
        at: NaiveDateTime,
    },
    ScheduleFinished {
        completed: usize,
        skipped: usize,
        at: NaiveDateTime,
    },
}
