//! Notification content for each loop state.

use chrono::Duration;

use super::countdown::format_remaining;
use crate::desktop::{Expiry, NotificationKey, NotificationSpec, Urgency};
use crate::schedule::{Task, TaskStatus};

/// Persistent timeline entry for task `index`.
pub fn timeline_entry(index: usize, task: &Task, status: TaskStatus) -> NotificationSpec {
    let (marker, icon, urgency) = match status {
        TaskStatus::Completed => ("✅", "emblem-ok", Urgency::Low),
        TaskStatus::Active => ("⏳", "dialog-information", Urgency::Critical),
        TaskStatus::Upcoming => ("📅", "appointment-soon", Urgency::Normal),
    };
    NotificationSpec::new(
        NotificationKey::Timeline(index),
        format!("{marker} {}: {}", status.label(), task.task_name),
        format!(
            "Time: {} | Duration: {} min",
            task.start_time.format("%H:%M"),
            task.duration_minutes
        ),
    )
    .icon(icon)
    .urgency(urgency)
    .expiry(Expiry::Never)
}

/// First render of the active-timer notification.
pub fn starting(task: &Task, remaining: Duration, next_up: &str) -> NotificationSpec {
    NotificationSpec::new(
        NotificationKey::ActiveTimer,
        format!("Starting Task: {}", task.task_name),
        format!(
            "Time remaining: {}\nNext: {next_up}",
            format_remaining(remaining)
        ),
    )
    .urgency(Urgency::Critical)
    .expiry(Expiry::Never)
}

/// Per-tick render of the active-timer notification.
pub fn countdown(task: &Task, remaining: Duration, next_up: &str) -> NotificationSpec {
    NotificationSpec::new(
        NotificationKey::ActiveTimer,
        format!("Current Task: {}", task.task_name),
        format!(
            "<b>{} remaining</b>\nNext: {next_up}",
            format_remaining(remaining)
        ),
    )
    .urgency(Urgency::Critical)
    .expiry(Expiry::Never)
}

pub fn alarm(task: &Task, next_up: &str, expiry: Expiry) -> NotificationSpec {
    NotificationSpec::new(
        NotificationKey::Alarm,
        format!("Finished: {}", task.task_name),
        format!("Take a break!\nNext up is: {next_up}"),
    )
    .icon("dialog-warning")
    .urgency(Urgency::Critical)
    .expiry(expiry)
}

pub fn finished(expiry: Expiry) -> NotificationSpec {
    NotificationSpec::new(
        NotificationKey::Finished,
        "Schedule Finished!",
        "All tasks for today are complete.",
    )
    .icon("emblem-ok")
    .urgency(Urgency::Critical)
    .expiry(expiry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn task() -> Task {
        Task::new(
            "Write report",
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn timeline_entry_reflects_status() {
        let upcoming = timeline_entry(1, &task(), TaskStatus::Upcoming);
        assert_eq!(upcoming.key, NotificationKey::Timeline(1));
        assert_eq!(upcoming.title, "📅 Upcoming: Write report");
        assert_eq!(upcoming.body, "Time: 09:00 | Duration: 60 min");
        assert_eq!(upcoming.urgency, Urgency::Normal);

        let done = timeline_entry(1, &task(), TaskStatus::Completed);
        assert_eq!(done.key, upcoming.key);
        assert_eq!(done.stack_tag, upcoming.stack_tag);
        assert!(done.title.contains("Completed"));
        assert_eq!(done.urgency, Urgency::Low);
    }

    #[test]
    fn countdown_renders_remaining_and_next() {
        let spec = countdown(&task(), Duration::seconds(125), "'Break' (15 min)");
        assert_eq!(spec.key, NotificationKey::ActiveTimer);
        assert_eq!(spec.title, "Current Task: Write report");
        assert_eq!(spec.body, "<b>02:05 remaining</b>\nNext: 'Break' (15 min)");
    }

    #[test]
    fn starting_and_countdown_share_a_key() {
        let first = starting(&task(), Duration::minutes(60), "End of schedule!");
        let tick = countdown(&task(), Duration::minutes(59), "End of schedule!");
        assert_eq!(first.key, tick.key);
        assert!(first.body.starts_with("Time remaining: 60:00"));
    }
}
