//! TOML-based application configuration.
//!
//! Stores:
//! - LLM endpoint, model and credential settings
//! - Planning policy fed into the generator prompt
//! - Countdown behaviour and alarm sound
//! - Notification preferences
//!
//! Configuration is stored at `~/.config/taskline/config.toml`. The file may
//! carry the API key, so it must stay out of version control.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::desktop::Expiry;
use crate::generator::PromptPolicy;
use crate::timer::{CountdownAnchor, RunnerSettings};

/// LLM endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable consulted first for the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Fallback API key when the environment variable is unset.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Planning policy constants embedded in the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Workday end, `HH:MM`.
    #[serde(default = "default_day_end")]
    pub day_end: String,
    #[serde(default = "default_min_work_block")]
    pub min_work_block: u32,
    #[serde(default = "default_max_work_block")]
    pub max_work_block: u32,
    #[serde(default = "default_short_break")]
    pub short_break: u32,
    #[serde(default = "default_true")]
    pub meal_break: bool,
    /// Reject generated schedules that fail validation.
    #[serde(default)]
    pub strict: bool,
}

/// Countdown configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default)]
    pub anchor: CountdownAnchor,
    #[serde(default = "default_alarm_sound")]
    pub alarm_sound: String,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Alarm notification lifetime; 0 keeps it until closed.
    #[serde(default = "default_alarm_timeout_ms")]
    pub alarm_timeout_ms: u32,
    #[serde(default = "default_finished_timeout_ms")]
    pub finished_timeout_ms: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/taskline/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub planning: PlanningConfig,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

// Default functions
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_day_end() -> String {
    "23:00".into()
}
fn default_min_work_block() -> u32 {
    60
}
fn default_max_work_block() -> u32 {
    90
}
fn default_short_break() -> u32 {
    15
}
fn default_true() -> bool {
    true
}
fn default_tick_ms() -> u64 {
    1000
}
fn default_alarm_sound() -> String {
    "/usr/share/sounds/freedesktop/stereo/alarm-clock-elapsed.oga".into()
}
fn default_app_name() -> String {
    "Task Countdown Timer".into()
}
fn default_alarm_timeout_ms() -> u32 {
    10_000
}
fn default_finished_timeout_ms() -> u32 {
    5_000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            day_end: default_day_end(),
            min_work_block: default_min_work_block(),
            max_work_block: default_max_work_block(),
            short_break: default_short_break(),
            meal_break: true,
            strict: false,
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            anchor: CountdownAnchor::default(),
            alarm_sound: default_alarm_sound(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            app_name: default_app_name(),
            alarm_timeout_ms: default_alarm_timeout_ms(),
            finished_timeout_ms: default_finished_timeout_ms(),
        }
    }
}

impl LlmConfig {
    /// Resolve the API key: environment first, then the config file.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    fn resolve_api_key_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<String, ConfigError> {
        lookup(&self.api_key_env)
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| ConfigError::MissingKey(format!("{} (or llm.api_key)", self.api_key_env)))
    }
}

impl PlanningConfig {
    pub fn day_end_time(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(self.day_end.trim(), "%H:%M").map_err(|e| {
            ConfigError::InvalidValue {
                key: "planning.day_end".into(),
                message: format!("'{}' is not HH:MM ({e})", self.day_end),
            }
        })
    }

    pub fn prompt_policy(&self) -> Result<PromptPolicy, ConfigError> {
        if self.min_work_block == 0 || self.min_work_block > self.max_work_block {
            return Err(ConfigError::InvalidValue {
                key: "planning.min_work_block".into(),
                message: format!(
                    "must be between 1 and max_work_block ({})",
                    self.max_work_block
                ),
            });
        }
        Ok(PromptPolicy {
            day_end: self.day_end_time()?,
            min_work_block: self.min_work_block,
            max_work_block: self.max_work_block,
            short_break: self.short_break,
            meal_break: self.meal_break,
        })
    }
}

fn expiry(ms: u32) -> Expiry {
    if ms == 0 {
        Expiry::Never
    } else {
        Expiry::Millis(ms)
    }
}

impl Config {
    /// Loop settings for the countdown runner.
    pub fn runner_settings(&self) -> RunnerSettings {
        RunnerSettings {
            tick: std::time::Duration::from_millis(self.timer.tick_ms.max(1)),
            anchor: self.timer.anchor,
            alarm_sound: PathBuf::from(&self.timer.alarm_sound),
            alarm_expiry: expiry(self.notifications.alarm_timeout_ms),
            finished_expiry: expiry(self.notifications.finished_timeout_ms),
        }
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parents) = parents {
            for part in parents.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            serde_json::Value::Number(_) => value
                .parse::<u64>()
                .map(|n| serde_json::Value::Number(n.into()))
                .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    /// Default location under the data directory.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/taskline"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults if absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path`, writing defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed,
    /// or if the default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                tracing::info!(path = %path.display(), "wrote default configuration");
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key in memory. Returns error if key is unknown
    /// or the value does not fit the field.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}
