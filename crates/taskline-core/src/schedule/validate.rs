//! Consistency checks for generated schedules.
//!
//! The model is asked for chronological, non-overlapping blocks ending by the
//! day boundary, but nothing forces it to comply. These checks report what it
//! got wrong; callers decide whether an issue is a warning or a rejection.

use chrono::{NaiveTime, Timelike};
use std::fmt;

use super::{Schedule, Task};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleIssue {
    EmptyName { index: usize },
    ZeroDuration { index: usize },
    DurationMismatch { index: usize, declared: u32, window: i64 },
    OutOfOrder { index: usize },
    Overlap { index: usize, previous: usize },
    PastDayEnd { index: usize, day_end: NaiveTime },
}

impl fmt::Display for ScheduleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleIssue::EmptyName { index } => write!(f, "task #{} has no name", index + 1),
            ScheduleIssue::ZeroDuration { index } => {
                write!(f, "task #{} has zero duration", index + 1)
            }
            ScheduleIssue::DurationMismatch {
                index,
                declared,
                window,
            } => write!(
                f,
                "task #{} declares {declared} min but its window is {window} min",
                index + 1
            ),
            ScheduleIssue::OutOfOrder { index } => {
                write!(f, "task #{} starts before the previous task", index + 1)
            }
            ScheduleIssue::Overlap { index, previous } => write!(
                f,
                "task #{} overlaps task #{}",
                index + 1,
                previous + 1
            ),
            ScheduleIssue::PastDayEnd { index, day_end } => write!(
                f,
                "task #{} runs past the {} day end",
                index + 1,
                day_end.format("%H:%M")
            ),
        }
    }
}

fn minute_of_day(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

/// Start and end as minutes from the schedule's midnight; end may exceed 1440.
fn span(task: &Task) -> (i64, i64) {
    let start = minute_of_day(task.start_time);
    (start, start + task.window_minutes())
}

impl Schedule {
    /// Report every consistency issue, in task order.
    pub fn validate(&self, day_end: NaiveTime) -> Vec<ScheduleIssue> {
        let day_end_min = minute_of_day(day_end);
        let mut issues = Vec::new();

        for (index, task) in self.tasks.iter().enumerate() {
            if task.task_name.trim().is_empty() {
                issues.push(ScheduleIssue::EmptyName { index });
            }
            if task.duration_minutes == 0 {
                issues.push(ScheduleIssue::ZeroDuration { index });
            } else if i64::from(task.duration_minutes) != task.window_minutes() {
                issues.push(ScheduleIssue::DurationMismatch {
                    index,
                    declared: task.duration_minutes,
                    window: task.window_minutes(),
                });
            }

            let (start, end) = span(task);
            if index > 0 {
                let (prev_start, prev_end) = span(&self.tasks[index - 1]);
                if start < prev_start {
                    issues.push(ScheduleIssue::OutOfOrder { index });
                } else if start < prev_end {
                    issues.push(ScheduleIssue::Overlap {
                        index,
                        previous: index - 1,
                    });
                }
            }
            if end > day_end_min {
                issues.push(ScheduleIssue::PastDayEnd { index, day_end });
            }
        }

        issues
    }
}
