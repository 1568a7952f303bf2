mod controls;
mod countdown;
mod render;
mod runner;

pub use controls::{Clock, Controls, Signal, SystemClock};
pub use countdown::{format_remaining, Countdown, CountdownAnchor};
pub use runner::{RunReport, RunnerSettings, TaskOutcome, TimerRunner};
