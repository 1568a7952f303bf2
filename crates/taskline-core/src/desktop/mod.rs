//! Desktop side effects: notifications, alarm sound, capability probe.
//!
//! Both boundaries return errors, but nothing in the timer treats them as
//! fatal; see [`crate::timer::TimerRunner`].

mod capabilities;
mod notify;
mod sound;

pub use capabilities::Capabilities;
pub use notify::{Expiry, LogNotifier, NotificationKey, NotificationSpec, Notifier, Urgency};
#[cfg(all(unix, not(target_os = "macos")))]
pub use notify::DesktopNotifier;
pub use sound::{AlarmSound, CommandSound};
