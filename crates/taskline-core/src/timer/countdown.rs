//! Wall-clock countdown.
//!
//! A countdown fixes its deadline once, when the task comes up, and derives
//! the remaining time from the clock on every query. Nothing is decremented,
//! so a late or skipped tick cannot make the display drift.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::schedule::Task;

/// Where a task's deadline comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownAnchor {
    /// Countdown start + `duration_minutes`.
    #[default]
    Duration,
    /// The task's scheduled `end_time` on the schedule date.
    Schedule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    started_at: NaiveDateTime,
    deadline: NaiveDateTime,
}

impl Countdown {
    pub fn start(task: &Task, anchor: CountdownAnchor, date: NaiveDate, now: NaiveDateTime) -> Self {
        let deadline = match anchor {
            CountdownAnchor::Duration => now + task.duration(),
            CountdownAnchor::Schedule => task.end_on(date),
        };
        Self {
            started_at: now,
            deadline,
        }
    }

    pub fn deadline(&self) -> NaiveDateTime {
        self.deadline
    }

    /// `max(0, deadline - now)`.
    pub fn remaining(&self, now: NaiveDateTime) -> Duration {
        (self.deadline - now).max(Duration::zero())
    }

    pub fn is_elapsed(&self, now: NaiveDateTime) -> bool {
        self.remaining(now).is_zero()
    }

    /// 0.0 .. 1.0 progress since the countdown started.
    pub fn progress(&self, now: NaiveDateTime) -> f64 {
        let total = (self.deadline - self.started_at).num_milliseconds();
        if total <= 0 {
            return 1.0;
        }
        let left = self.remaining(now).num_milliseconds();
        (1.0 - left as f64 / total as f64).clamp(0.0, 1.0)
    }
}

/// `MM:SS`, minutes not wrapped at the hour.
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.num_seconds().max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use proptest::prelude::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 24).unwrap()
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        date().and_hms_opt(h, m, s).unwrap()
    }

    fn task(start: (u32, u32), end: (u32, u32)) -> Task {
        Task::new(
            "Write report",
            NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        )
    }

    #[test]
    fn duration_anchor_counts_from_start() {
        let cd = Countdown::start(&task((9, 0), (10, 0)), CountdownAnchor::Duration, date(), at(9, 30, 0));
        assert_eq!(cd.deadline(), at(10, 30, 0));
        assert_eq!(cd.remaining(at(10, 0, 0)), Duration::minutes(30));
    }

    #[test]
    fn schedule_anchor_uses_end_time() {
        let cd = Countdown::start(&task((9, 0), (10, 0)), CountdownAnchor::Schedule, date(), at(9, 30, 0));
        assert_eq!(cd.deadline(), at(10, 0, 0));
        assert_eq!(cd.remaining(at(9, 45, 0)), Duration::minutes(15));
        assert!(cd.is_elapsed(at(10, 0, 0)));
        assert!(cd.is_elapsed(at(11, 0, 0)));
        assert_eq!(cd.remaining(at(11, 0, 0)), Duration::zero());
    }

    #[test]
    fn progress_moves_from_zero_to_one() {
        let cd = Countdown::start(&task((9, 0), (10, 0)), CountdownAnchor::Duration, date(), at(9, 0, 0));
        assert_eq!(cd.progress(at(9, 0, 0)), 0.0);
        assert!((cd.progress(at(9, 30, 0)) - 0.5).abs() < 1e-9);
        assert_eq!(cd.progress(at(12, 0, 0)), 1.0);
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_remaining(Duration::seconds(0)), "00:00");
        assert_eq!(format_remaining(Duration::seconds(59)), "00:59");
        assert_eq!(format_remaining(Duration::seconds(90 * 60)), "90:00");
        assert_eq!(format_remaining(Duration::milliseconds(61_900)), "01:01");
    }

    proptest! {
        #[test]
        fn remaining_matches_closed_form_and_never_increases(
            minutes in 0u32..240,
            mut offsets in proptest::collection::vec(0i64..20_000, 1..40),
        ) {
            let mut t = task((9, 0), (9, 0));
            t.duration_minutes = minutes;
            let t0 = at(9, 0, 0);
            let cd = Countdown::start(&t, CountdownAnchor::Duration, date(), t0);

            offsets.sort_unstable();
            let mut previous = None;
            for offset in offsets {
                let now = t0 + Duration::seconds(offset);
                let remaining = cd.remaining(now).num_seconds();
                let expected = (i64::from(minutes) * 60 - offset).max(0);
                prop_assert_eq!(remaining, expected);
                if let Some(prev) = previous {
                    prop_assert!(remaining <= prev);
                }
                previous = Some(remaining);
            }
        }
    }
}
