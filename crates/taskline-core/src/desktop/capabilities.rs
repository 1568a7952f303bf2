//! Startup probe of the desktop services the timer can use.

use std::path::PathBuf;

/// Audio players tried in order.
const PLAYERS: [&str; 3] = ["paplay", "pw-play", "aplay"];

/// What the current session offers. Detected once, then passed to whoever
/// needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Name of the running notification server, if one answered.
    pub notification_server: Option<String>,
    /// `dunstctl`, for clearing leftovers at startup.
    pub dunstctl: Option<PathBuf>,
    pub audio_player: Option<PathBuf>,
}

impl Capabilities {
    pub fn detect() -> Self {
        let caps = Self {
            notification_server: notification_server(),
            dunstctl: which::which("dunstctl").ok(),
            audio_player: PLAYERS.iter().find_map(|p| which::which(p).ok()),
        };
        tracing::info!(
            server = caps.notification_server.as_deref().unwrap_or("none"),
            dunstctl = caps.dunstctl.is_some(),
            player = ?caps.audio_player,
            "desktop capabilities"
        );
        caps
    }

    pub fn can_notify(&self) -> bool {
        self.notification_server.is_some()
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn notification_server() -> Option<String> {
    match notify_rust::get_server_information() {
        Ok(info) => Some(info.name),
        Err(e) => {
            tracing::debug!(error = %e, "no notification server");
            None
        }
    }
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn notification_server() -> Option<String> {
    None
}
