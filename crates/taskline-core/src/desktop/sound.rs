//! Alarm sound boundary.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use crate::error::AudioError;

/// Fire-and-forget "play file at path".
pub trait AlarmSound {
    fn play(&mut self, path: &Path) -> Result<(), AudioError>;
}

/// Spawns an external player (`paplay`, `aplay`, ...) and does not wait
/// for it. Finished players are reaped on the next `play`.
#[derive(Debug)]
pub struct CommandSound {
    player: Option<PathBuf>,
    playing: Vec<Child>,
}

impl CommandSound {
    pub fn new(player: Option<PathBuf>) -> Self {
        Self {
            player,
            playing: Vec::new(),
        }
    }

    /// Players spawned but not yet seen to exit.
    pub fn playing(&self) -> usize {
        self.playing.len()
    }

    fn reap(&mut self) {
        self.playing.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                tracing::trace!(pid = child.id(), %status, "alarm player exited");
                false
            }
            Ok(None) => true,
            Err(e) => {
                tracing::warn!(pid = child.id(), error = %e, "cannot wait on alarm player");
                false
            }
        });
    }
}

impl AlarmSound for CommandSound {
    fn play(&mut self, path: &Path) -> Result<(), AudioError> {
        self.reap();
        let player = self.player.as_ref().ok_or(AudioError::NoPlayer)?;
        if !path.exists() {
            return Err(AudioError::MissingSound {
                path: path.to_path_buf(),
            });
        }
        let child = Command::new(player)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| AudioError::Spawn {
                player: player.display().to_string(),
                source,
            })?;
        tracing::debug!(pid = child.id(), sound = %path.display(), "alarm playing");
        self.playing.push(child);
        Ok(())
    }
}
