//! User input and time sources for the loop.

use chrono::NaiveDateTime;
use std::time::Duration;

/// Input observed while waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Timeout passed without input.
    Idle,
    /// Finish the current task early, without an alarm.
    Skip,
    /// Stop the run at the next task boundary.
    Interrupt,
    /// Continue after an alarm.
    Acknowledge,
}

/// Keyboard (or scripted) control of the loop.
pub trait Controls {
    /// Wait at most `timeout` for input. Non-blocking beyond that.
    fn poll(&mut self, timeout: Duration) -> Signal;

    /// Block until the user acknowledges the alarm or interrupts.
    fn wait_for_ack(&mut self) -> Signal;
}

pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}
