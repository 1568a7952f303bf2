//! The countdown loop.
//!
//! Single-threaded: one foreground loop alternates between a bounded input
//! poll (which doubles as the tick sleep) and notification updates. Every
//! notifier and sound call goes through `TimerRunner::show` and friends,
//! which log failures and carry on; a dead notification daemon costs the
//! user a popup, never the countdown.
//!
//! An interrupt is only honoured at a task boundary. Pressed mid-countdown
//! it is remembered, the task runs to its end (or a skip), and the run stops
//! before the next task starts. A stop requested during the last task has
//! nothing left to cancel: the run finishes normally.
//!
//! ## Per-task cycle
//!
//! ```text
//! timeline[i] -> active
//! Countdown --(skip)---------------------> timeline[i] -> completed
//!     |------(interrupt)--> stop pending, keep counting
//!     '------(remaining == 0)--> Alarm --(ack | interrupt)--> timeline[i] -> completed
//! boundary: stop pending? -> RunInterrupted
//! ```

use std::path::PathBuf;
use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveDate};

use super::controls::{Clock, Controls, Signal};
use super::countdown::{Countdown, CountdownAnchor};
use super::render;
use crate::desktop::{AlarmSound, Expiry, NotificationKey, NotificationSpec, Notifier};
use crate::events::{Event, SkipReason};
use crate::schedule::{Schedule, Task, TaskStatus};

/// Loop tuning.
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    pub tick: StdDuration,
    pub anchor: CountdownAnchor,
    pub alarm_sound: PathBuf,
    pub alarm_expiry: Expiry,
    pub finished_expiry: Expiry,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            tick: StdDuration::from_secs(1),
            anchor: CountdownAnchor::Duration,
            alarm_sound: PathBuf::from(
                "/usr/share/sounds/freedesktop/stereo/alarm-clock-elapsed.oga",
            ),
            alarm_expiry: Expiry::Millis(10_000),
            finished_expiry: Expiry::Millis(5_000),
        }
    }
}

/// How one task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Countdown reached zero and the alarm fired.
    Completed,
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// One entry per task reached, in order.
    pub outcomes: Vec<TaskOutcome>,
    /// The user stopped the run before the last task.
    pub interrupted: bool,
}

impl RunReport {
    pub fn completed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| **o == TaskOutcome::Completed)
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, TaskOutcome::Skipped(_)))
            .count()
    }
}

enum CountdownEnd {
    Elapsed,
    Skipped,
}

pub struct TimerRunner<N, S, I, C> {
    notifier: N,
    sound: S,
    controls: I,
    clock: C,
    settings: RunnerSettings,
}

impl<N, S, I, C> TimerRunner<N, S, I, C>
where
    N: Notifier,
    S: AlarmSound,
    I: Controls,
    C: Clock,
{
    pub fn new(notifier: N, sound: S, controls: I, clock: C, settings: RunnerSettings) -> Self {
        Self {
            notifier,
            sound,
            controls,
            clock,
            settings,
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn sound(&self) -> &S {
        &self.sound
    }

    pub fn controls(&self) -> &I {
        &self.controls
    }

    /// Drive the whole schedule, reporting every transition to `sink`.
    pub fn run(&mut self, schedule: &Schedule, sink: &mut dyn FnMut(&Event)) -> RunReport {
        let date = schedule
            .schedule_date
            .unwrap_or_else(|| self.clock.now().date());
        let mut report = RunReport::default();

        sink(&Event::RunStarted {
            tasks: schedule.len(),
            at: self.clock.now(),
        });

        self.startup(schedule);

        let mut stop = false;
        for (index, task) in schedule.tasks.iter().enumerate() {
            if stop {
                report.interrupted = true;
                tracing::info!(next = index, "run interrupted by user");
                sink(&Event::RunInterrupted {
                    index,
                    at: self.clock.now(),
                });
                return report;
            }

            self.show(&render::timeline_entry(index, task, TaskStatus::Active));
            let outcome = self.run_task(index, task, schedule, date, &mut stop, sink);
            self.show(&render::timeline_entry(index, task, TaskStatus::Completed));
            report.outcomes.push(outcome);
        }

        self.show(&render::finished(self.settings.finished_expiry));
        sink(&Event::ScheduleFinished {
            completed: report.completed(),
            skipped: report.skipped(),
            at: self.clock.now(),
        });
        report
    }

    /// Clear leftovers, then lay out one timeline entry per task.
    fn startup(&mut self, schedule: &Schedule) {
        if let Err(e) = self.notifier.close_all() {
            tracing::warn!(error = %e, "could not clear previous notifications");
        }
        for (index, task) in schedule.tasks.iter().enumerate() {
            self.show(&render::timeline_entry(
                index,
                task,
                TaskStatus::for_position(index, 0),
            ));
        }
    }

    /// Sets `stop` when the user asked to end the run after this task.
    fn run_task(
        &mut self,
        index: usize,
        task: &Task,
        schedule: &Schedule,
        date: NaiveDate,
        stop: &mut bool,
        sink: &mut dyn FnMut(&Event),
    ) -> TaskOutcome {
        let next_up = schedule.next_up(index);
        let started = self.clock.now();
        sink(&Event::TaskStarted {
            index,
            name: task.task_name.clone(),
            duration_minutes: task.duration_minutes,
            next_up: next_up.clone(),
            at: started,
        });

        if task.duration_minutes == 0 {
            tracing::warn!(task = %task.task_name, "skipping task with invalid duration");
            return self.skip(index, SkipReason::InvalidDuration, sink);
        }

        let countdown = Countdown::start(task, self.settings.anchor, date, started);
        if countdown.is_elapsed(started) {
            tracing::info!(task = %task.task_name, "task window already over");
            return self.skip(index, SkipReason::Elapsed, sink);
        }

        self.show(&render::starting(task, countdown.remaining(started), &next_up));
        let end = self.count_down(index, task, &countdown, &next_up, stop, sink);
        self.close(NotificationKey::ActiveTimer);

        match end {
            CountdownEnd::Skipped => self.skip(index, SkipReason::User, sink),
            CountdownEnd::Elapsed => {
                self.show(&render::alarm(task, &next_up, self.settings.alarm_expiry));
                self.play_alarm();
                sink(&Event::AlarmRaised {
                    index,
                    at: self.clock.now(),
                });

                if self.controls.wait_for_ack() == Signal::Interrupt {
                    self.request_stop(index, stop, sink);
                }
                self.close(NotificationKey::Alarm);
                sink(&Event::TaskCompleted {
                    index,
                    at: self.clock.now(),
                });
                TaskOutcome::Completed
            }
        }
    }

    fn count_down(
        &mut self,
        index: usize,
        task: &Task,
        countdown: &Countdown,
        next_up: &str,
        stop: &mut bool,
        sink: &mut dyn FnMut(&Event),
    ) -> CountdownEnd {
        loop {
            let remaining = countdown.remaining(self.clock.now());
            if remaining <= Duration::zero() {
                return CountdownEnd::Elapsed;
            }

            let wait = remaining
                .to_std()
                .map(|r| r.min(self.settings.tick))
                .unwrap_or(self.settings.tick);
            match self.controls.poll(wait) {
                Signal::Skip => return CountdownEnd::Skipped,
                Signal::Interrupt => self.request_stop(index, stop, sink),
                Signal::Idle | Signal::Acknowledge => {}
            }

            let now = self.clock.now();
            let remaining = countdown.remaining(now);
            self.show(&render::countdown(task, remaining, next_up));
            sink(&Event::Tick {
                index,
                remaining_secs: remaining.num_seconds().max(0) as u64,
                at: now,
            });
        }
    }

    fn request_stop(&mut self, index: usize, stop: &mut bool, sink: &mut dyn FnMut(&Event)) {
        if *stop {
            return;
        }
        *stop = true;
        tracing::info!(index, "stop requested, finishing current task first");
        sink(&Event::StopRequested {
            index,
            at: self.clock.now(),
        });
    }

    fn skip(&mut self, index: usize, reason: SkipReason, sink: &mut dyn FnMut(&Event)) -> TaskOutcome {
        sink(&Event::TaskSkipped {
            index,
            reason,
            at: self.clock.now(),
        });
        TaskOutcome::Skipped(reason)
    }

    fn show(&mut self, spec: &NotificationSpec) {
        if let Err(e) = self.notifier.show(spec) {
            tracing::warn!(key = ?spec.key, error = %e, "notification failed");
        }
    }

    fn close(&mut self, key: NotificationKey) {
        if let Err(e) = self.notifier.close(key) {
            tracing::warn!(?key, error = %e, "closing notification failed");
        }
    }

    fn play_alarm(&mut self) {
        if let Err(e) = self.sound.play(&self.settings.alarm_sound) {
            tracing::warn!(error = %e, "alarm sound failed");
        }
    }
}
