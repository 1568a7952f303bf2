//! Notification boundary.
//!
//! Notifications are addressed by [`NotificationKey`]. Showing a key that is
//! already on screen replaces it in place; it never stacks a second copy.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::error::NotificationError;

/// Replacement identifier.
///
/// `Timeline(i)` is stable for task `i` for the whole run; `ActiveTimer` is
/// the single countdown notification reused every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKey {
    Timeline(usize),
    ActiveTimer,
    Alarm,
    Finished,
}

impl NotificationKey {
    /// Value for the `x-dunst-stack-tag` hint.
    pub fn stack_tag(&self) -> String {
        match self {
            NotificationKey::Timeline(i) => format!("timeline-{i}"),
            NotificationKey::ActiveTimer => "task-timer".to_string(),
            NotificationKey::Alarm => "task-alarm".to_string(),
            NotificationKey::Finished => "schedule-finished".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Low,
    Normal,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Daemon default.
    Default,
    /// Stays until closed.
    Never,
    Millis(u32),
}

/// Everything needed to create or update one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSpec {
    pub key: NotificationKey,
    pub urgency: Urgency,
    pub stack_tag: String,
    pub title: String,
    pub body: String,
    pub icon: String,
    pub expiry: Expiry,
}

impl NotificationSpec {
    pub fn new(key: NotificationKey, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            key,
            urgency: Urgency::Normal,
            stack_tag: key.stack_tag(),
            title: title.into(),
            body: body.into(),
            icon: "dialog-information".to_string(),
            expiry: Expiry::Default,
        }
    }

    pub fn urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn expiry(mut self, expiry: Expiry) -> Self {
        self.expiry = expiry;
        self
    }
}

/// Create/update/close operations on the desktop notification service.
pub trait Notifier {
    /// Show `spec`, replacing any notification already shown under its key.
    fn show(&mut self, spec: &NotificationSpec) -> Result<(), NotificationError>;

    /// Close the notification shown under `key`, if any.
    fn close(&mut self, key: NotificationKey) -> Result<(), NotificationError>;

    /// Remove every notification this tool may have left behind.
    fn close_all(&mut self) -> Result<(), NotificationError>;
}

/// Notifier that only logs. Used when notifications are disabled or the
/// platform has no freedesktop notification service.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&mut self, spec: &NotificationSpec) -> Result<(), NotificationError> {
        tracing::debug!(key = ?spec.key, title = %spec.title, body = %spec.body, "notification");
        Ok(())
    }

    fn close(&mut self, key: NotificationKey) -> Result<(), NotificationError> {
        tracing::debug!(?key, "notification closed");
        Ok(())
    }

    fn close_all(&mut self) -> Result<(), NotificationError> {
        Ok(())
    }
}

/// How long a hung dunst may hold up startup.
const DUNSTCTL_TIMEOUT: Duration = Duration::from_secs(1);

/// Run `dunstctl close-all`.
fn dunst_close_all(dunstctl: &PathBuf) -> Result<(), NotificationError> {
    let child = Command::new(dunstctl)
        .arg("close-all")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| NotificationError::Close(format!("{}: {e}", dunstctl.display())))?;
    let status = wait_bounded(child, DUNSTCTL_TIMEOUT, "dunstctl close-all")?;
    if status.success() {
        Ok(())
    } else {
        Err(NotificationError::Close(format!(
            "dunstctl close-all exited with {status}"
        )))
    }
}

/// Wait for `child` at most `timeout`, killing it past that.
fn wait_bounded(
    mut child: Child,
    timeout: Duration,
    what: &str,
) -> Result<ExitStatus, NotificationError> {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if start.elapsed() > timeout => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(NotificationError::Close(format!(
                    "{what} timed out after {}ms",
                    timeout.as_millis()
                )));
            }
            Ok(None) => std::thread::sleep(Duration::from_millis(20)),
            Err(e) => return Err(NotificationError::Close(format!("{what}: {e}"))),
        }
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
pub use xdg::DesktopNotifier;

#[cfg(all(unix, not(target_os = "macos")))]
mod xdg {
    use super::*;
    use notify_rust::{Hint, Notification, NotificationHandle, Timeout};

    /// freedesktop notifications over D-Bus.
    pub struct DesktopNotifier {
        app_name: String,
        dunstctl: Option<PathBuf>,
        handles: HashMap<NotificationKey, NotificationHandle>,
    }

    impl DesktopNotifier {
        pub fn new(app_name: impl Into<String>, dunstctl: Option<PathBuf>) -> Self {
            Self {
                app_name: app_name.into(),
                dunstctl,
                handles: HashMap::new(),
            }
        }
    }

    fn apply(notification: &mut Notification, app_name: &str, spec: &NotificationSpec) {
        let urgency = match spec.urgency {
            Urgency::Low => notify_rust::Urgency::Low,
            Urgency::Normal => notify_rust::Urgency::Normal,
            Urgency::Critical => notify_rust::Urgency::Critical,
        };
        let timeout = match spec.expiry {
            Expiry::Default => Timeout::Default,
            Expiry::Never => Timeout::Never,
            Expiry::Millis(ms) => Timeout::Milliseconds(ms),
        };
        notification
            .appname(app_name)
            .summary(&spec.title)
            .body(&spec.body)
            .icon(&spec.icon)
            .urgency(urgency)
            .timeout(timeout)
            .hint(Hint::Custom(
                "x-dunst-stack-tag".to_string(),
                spec.stack_tag.clone(),
            ));
    }

    impl Notifier for DesktopNotifier {
        fn show(&mut self, spec: &NotificationSpec) -> Result<(), NotificationError> {
            if let Some(handle) = self.handles.get_mut(&spec.key) {
                apply(handle, &self.app_name, spec);
                handle.update();
                return Ok(());
            }

            let mut notification = Notification::new();
            apply(&mut notification, &self.app_name, spec);
            let handle = notification.show().map_err(|e| NotificationError::Show {
                title: spec.title.clone(),
                message: e.to_string(),
            })?;
            tracing::trace!(key = ?spec.key, id = handle.id(), "notification shown");
            self.handles.insert(spec.key, handle);
            Ok(())
        }

        fn close(&mut self, key: NotificationKey) -> Result<(), NotificationError> {
            if let Some(handle) = self.handles.remove(&key) {
                handle.close();
            }
            Ok(())
        }

        fn close_all(&mut self) -> Result<(), NotificationError> {
            for (_, handle) in self.handles.drain() {
                handle.close();
            }
            match &self.dunstctl {
                Some(dunstctl) => dunst_close_all(dunstctl),
                None => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_tags_are_distinct_per_key() {
        assert_eq!(NotificationKey::Timeline(3).stack_tag(), "timeline-3");
        assert_eq!(NotificationKey::ActiveTimer.stack_tag(), "task-timer");
        assert_ne!(
            NotificationKey::Timeline(0).stack_tag(),
            NotificationKey::Timeline(1).stack_tag()
        );
    }

    #[test]
    fn spec_builder_sets_fields() {
        let spec = NotificationSpec::new(NotificationKey::Alarm, "Finished: A", "Take a break!")
            .urgency(Urgency::Critical)
            .icon("dialog-warning")
            .expiry(Expiry::Millis(10_000));
        assert_eq!(spec.stack_tag, "task-alarm");
        assert_eq!(spec.urgency, Urgency::Critical);
        assert_eq!(spec.icon, "dialog-warning");
        assert_eq!(spec.expiry, Expiry::Millis(10_000));
    }

    #[test]
    fn hung_command_is_killed_after_timeout() {
        let Ok(child) = Command::new("sleep").arg("30").spawn() else {
            return;
        };
        let started = Instant::now();
        let err = wait_bounded(child, Duration::from_millis(100), "sleep").unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn quick_command_reports_its_status() {
        let Ok(child) = Command::new("true").spawn() else {
            return;
        };
        let status = wait_bounded(child, Duration::from_secs(5), "true").unwrap();
        assert!(status.success());
    }

    #[test]
    fn log_notifier_never_fails() {
        let mut notifier = LogNotifier;
        let spec = NotificationSpec::new(NotificationKey::ActiveTimer, "t", "b");
        assert!(notifier.show(&spec).is_ok());
        assert!(notifier.close(NotificationKey::ActiveTimer).is_ok());
        assert!(notifier.close_all().is_ok());
    }
}
