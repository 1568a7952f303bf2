//! Fakes for driving the timer loop without a desktop or a terminal.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use taskline_core::desktop::{AlarmSound, NotificationKey, NotificationSpec, Notifier};
use taskline_core::timer::{Clock, Controls, Signal};
use taskline_core::{AudioError, NotificationError, Schedule, Task};

pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 24).unwrap()
}

pub fn at(h: u32, m: u32) -> NaiveDateTime {
    date().and_hms_opt(h, m, 0).unwrap()
}

pub fn task(name: &str, start: (u32, u32), end: (u32, u32)) -> Task {
    Task::new(
        name,
        NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
    )
}

/// The two-task day used across the loop tests.
pub fn report_then_break() -> Schedule {
    Schedule::new(
        Some(date()),
        vec![
            task("Write report", (9, 0), (10, 0)),
            task("Break", (10, 0), (10, 15)),
        ],
    )
}

/// Settable clock shared between the runner and the scripted controls.
#[derive(Clone)]
pub struct FakeClock(Rc<Cell<NaiveDateTime>>);

impl FakeClock {
    pub fn at(start: NaiveDateTime) -> Self {
        Self(Rc::new(Cell::new(start)))
    }

    pub fn set(&self, t: NaiveDateTime) {
        self.0.set(t);
    }

    pub fn advance(&self, d: Duration) {
        let step = chrono::Duration::from_std(d).unwrap();
        self.0.set(self.0.get() + step);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> NaiveDateTime {
        self.0.get()
    }
}

/// Controls that advance the fake clock instead of sleeping.
///
/// `at` signals fire from `poll` once the clock would pass their time;
/// `acks` answers `wait_for_ack` in order, defaulting to `Acknowledge`.
pub struct ScriptedControls {
    clock: FakeClock,
    at: VecDeque<(NaiveDateTime, Signal)>,
    acks: VecDeque<Signal>,
    ack_delay: Duration,
    pub polls: Vec<Duration>,
    pub ack_times: Vec<NaiveDateTime>,
}

impl ScriptedControls {
    pub fn new(clock: FakeClock) -> Self {
        Self {
            clock,
            at: VecDeque::new(),
            acks: VecDeque::new(),
            ack_delay: Duration::from_secs(5),
            polls: Vec::new(),
            ack_times: Vec::new(),
        }
    }

    pub fn signal_at(mut self, when: NaiveDateTime, signal: Signal) -> Self {
        self.at.push_back((when, signal));
        self
    }

    pub fn ack_with(mut self, signal: Signal) -> Self {
        self.acks.push_back(signal);
        self
    }
}

impl Controls for ScriptedControls {
    fn poll(&mut self, timeout: Duration) -> Signal {
        self.polls.push(timeout);
        let target = self.clock.now() + chrono::Duration::from_std(timeout).unwrap();
        if let Some((when, _)) = self.at.front() {
            if *when <= target {
                let (when, signal) = self.at.pop_front().unwrap();
                self.clock.set(when.max(self.clock.now()));
                return signal;
            }
        }
        self.clock.set(target);
        Signal::Idle
    }

    fn wait_for_ack(&mut self) -> Signal {
        self.ack_times.push(self.clock.now());
        self.clock.advance(self.ack_delay);
        self.acks.pop_front().unwrap_or(Signal::Acknowledge)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Show(NotificationSpec),
    Close(NotificationKey),
    CloseAll,
}

/// Records every call; optionally fails all of them.
#[derive(Default)]
pub struct RecordingNotifier {
    pub calls: Rc<RefCell<Vec<Call>>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn shows(&self) -> Vec<NotificationSpec> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Show(spec) => Some(spec.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls.borrow().iter().position(pred)
    }

    fn record(&self, call: Call) -> Result<(), NotificationError> {
        self.calls.borrow_mut().push(call);
        if self.fail {
            Err(NotificationError::Unavailable("no daemon".into()))
        } else {
            Ok(())
        }
    }
}

impl Notifier for RecordingNotifier {
    fn show(&mut self, spec: &NotificationSpec) -> Result<(), NotificationError> {
        self.record(Call::Show(spec.clone()))
    }

    fn close(&mut self, key: NotificationKey) -> Result<(), NotificationError> {
        self.record(Call::Close(key))
    }

    fn close_all(&mut self) -> Result<(), NotificationError> {
        self.record(Call::CloseAll)
    }
}

#[derive(Default)]
pub struct RecordingSound {
    pub plays: Vec<PathBuf>,
    pub fail: bool,
}

impl AlarmSound for RecordingSound {
    fn play(&mut self, path: &Path) -> Result<(), AudioError> {
        self.plays.push(path.to_path_buf());
        if self.fail {
            Err(AudioError::NoPlayer)
        } else {
            Ok(())
        }
    }
}
