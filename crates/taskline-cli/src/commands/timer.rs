use std::io::Write;
use std::path::Path;

use taskline_core::desktop::{Capabilities, CommandSound, LogNotifier, Notifier};
use taskline_core::timer::{format_remaining, SystemClock, TimerRunner};
use taskline_core::{Config, Event, RunReport, Schedule, SkipReason};

use super::common::load_config;
use crate::terminal::TerminalControls;

pub fn run(schedule_path: &Path, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let schedule = Schedule::load(schedule_path)?;
    if schedule.is_empty() {
        println!("No tasks found in {}", schedule_path.display());
        return Ok(());
    }

    let config = load_config(config_path)?;
    let caps = Capabilities::detect();

    println!(
        "Schedule for {}: {} tasks, {} min",
        schedule.date_label(),
        schedule.len(),
        schedule.total_minutes()
    );
    println!("Enter/s: skip task or dismiss alarm | q/Ctrl+C: stop after this task");

    let report = match desktop_notifier(&config, &caps) {
        Some(notifier) => drive(notifier, &schedule, &config, &caps),
        None => {
            if config.notifications.enabled {
                tracing::warn!("no notification server found, logging notifications instead");
            }
            drive(LogNotifier, &schedule, &config, &caps)
        }
    };

    tracing::debug!(?report, "timer run finished");
    Ok(())
}

#[cfg(all(unix, not(target_os = "macos")))]
fn desktop_notifier(
    config: &Config,
    caps: &Capabilities,
) -> Option<taskline_core::desktop::DesktopNotifier> {
    (config.notifications.enabled && caps.can_notify()).then(|| {
        taskline_core::desktop::DesktopNotifier::new(
            config.notifications.app_name.clone(),
            caps.dunstctl.clone(),
        )
    })
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn desktop_notifier(_config: &Config, _caps: &Capabilities) -> Option<LogNotifier> {
    None
}

fn drive<N: Notifier>(
    notifier: N,
    schedule: &Schedule,
    config: &Config,
    caps: &Capabilities,
) -> RunReport {
    let mut runner = TimerRunner::new(
        notifier,
        CommandSound::new(caps.audio_player.clone()),
        TerminalControls::detect(),
        SystemClock,
        config.runner_settings(),
    );
    let mut out = std::io::stdout();
    runner.run(schedule, &mut |event| print_event(&mut out, schedule, event))
}

fn print_event(out: &mut impl Write, schedule: &Schedule, event: &Event) {
    let name = |index: usize| {
        schedule
            .tasks
            .get(index)
            .map(|t| t.task_name.as_str())
            .unwrap_or("?")
    };
    let line = match event {
        Event::RunStarted { .. } => return,
        Event::TaskStarted {
            index,
            name,
            duration_minutes,
            next_up,
            at,
        } => format!(
            "\n[{}] {}/{} {name} ({duration_minutes} min), next: {next_up}\n",
            at.format("%H:%M"),
            index + 1,
            schedule.len()
        ),
        Event::Tick {
            index,
            remaining_secs,
            ..
        } => {
            let remaining = chrono::Duration::seconds(*remaining_secs as i64);
            // Rewrites the same line every tick.
            let _ = write!(out, "\r  {} {} remaining ", name(*index), format_remaining(remaining));
            let _ = out.flush();
            return;
        }
        Event::TaskSkipped { reason, .. } => {
            let why = match reason {
                SkipReason::User => "skipped",
                SkipReason::InvalidDuration => "skipped: no duration",
                SkipReason::Elapsed => "skipped: already over",
            };
            format!("\n  {why}\n")
        }
        Event::AlarmRaised { index, .. } => {
            format!("\n  time is up for {}, press Enter to continue\n", name(*index))
        }
        Event::TaskCompleted { .. } => "  done\n".to_string(),
        Event::StopRequested { .. } => "\n  stopping after this task\n".to_string(),
        Event::RunInterrupted { index, .. } => {
            format!("\nStopped before task {} ({})\n", index + 1, name(*index))
        }
        Event::ScheduleFinished {
            completed, skipped, ..
        } => format!("\nSchedule finished: {completed} completed, {skipped} skipped\n"),
    };
    let _ = out.write_all(line.as_bytes());
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use taskline_core::Task;

    fn schedule() -> Schedule {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        Schedule::new(
            None,
            vec![
                Task::new("Write report", t(9, 0), t(10, 0)),
                Task::new("Break", t(10, 0), t(10, 15)),
            ],
        )
    }

    fn render(event: Event) -> String {
        let mut buf = Vec::new();
        print_event(&mut buf, &schedule(), &event);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn tick_rewrites_line_with_task_name() {
        let at = NaiveDate::from_ymd_opt(2024, 9, 24)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let out = render(Event::Tick {
            index: 0,
            remaining_secs: 3599,
            at,
        });
        assert!(out.starts_with('\r'));
        assert!(out.contains("Write report 59:59 remaining"));
    }

    #[test]
    fn interrupted_names_the_task_not_run() {
        let at = NaiveDate::from_ymd_opt(2024, 9, 24)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let out = render(Event::RunInterrupted { index: 1, at });
        assert!(out.contains("Stopped before task 2 (Break)"));
    }
}
