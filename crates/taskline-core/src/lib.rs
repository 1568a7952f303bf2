//! # Taskline Core Library
//!
//! Core logic for Taskline, a two-stage day planner: a language model turns
//! a free-text task list into a timed schedule, and a countdown loop walks
//! through that schedule with desktop notifications and an alarm.
//!
//! ## Architecture
//!
//! - **Schedule**: the JSON interchange format shared by both stages
//! - **Generator**: prompt construction and the LLM request/response boundary
//! - **Timer**: a wall-clock countdown loop over injectable notifier, sound,
//!   input and clock capabilities
//! - **Desktop**: freedesktop notifications, alarm playback, capability probe
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Schedule`]: ordered task list, load/save/validate
//! - [`ScheduleGenerator`]: one-shot LLM planning
//! - [`TimerRunner`]: the per-task countdown state machine
//! - [`Config`]: application configuration management

pub mod desktop;
pub mod error;
pub mod events;
pub mod generator;
pub mod schedule;
pub mod storage;
pub mod timer;

pub use desktop::{AlarmSound, Capabilities, NotificationKey, NotificationSpec, Notifier};
pub use error::{
    AudioError, ConfigError, CoreError, NotificationError, ParseError, ScheduleLoadError,
    TransportError, ValidationError,
};
pub use events::{Event, SkipReason};
pub use generator::{LlmBackend, OpenAiBackend, PromptPolicy, ScheduleGenerator};
pub use schedule::{Schedule, ScheduleIssue, Task, TaskStatus};
pub use storage::Config;
pub use timer::{Clock, Controls, CountdownAnchor, RunReport, RunnerSettings, Signal, TimerRunner};
