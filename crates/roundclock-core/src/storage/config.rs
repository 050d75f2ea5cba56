//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - The interval sequence being edited
//! - Looping (round count or infinite)
//! - Tick driver cadence
//! - The product limit on sequence length
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::{ConfigError, Result, ValidationError};
use crate::timer::{
    Interval, IntervalSequence, LoopPolicy, DEFAULT_TICK_INTERVAL, MAX_TICK_INTERVAL,
    MIN_TICK_INTERVAL,
};

/// Tick driver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Looping configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutConfig {
    /// Rounds to run when not infinite. 0 behaves as 1.
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    #[serde(default)]
    pub infinite: bool,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Most intervals a sequence may hold; enforced when adding.
    #[serde(default = "default_max_intervals")]
    pub max_intervals: usize,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub workout: WorkoutConfig,
    #[serde(default = "IntervalSequence::default_tabata")]
    pub intervals: IntervalSequence,
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL.as_millis() as u64
}
fn default_rounds() -> u32 {
    1
}
fn default_max_intervals() -> usize {
    10
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            infinite: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_intervals: default_max_intervals(),
            timer: TimerConfig::default(),
            workout: WorkoutConfig::default(),
            intervals: IntervalSequence::default_tabata(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = match current {
                serde_json::Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                other => other.get(part)?,
            };
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

        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        for part in key.split('.') {
            current = match current {
                serde_json::Value::Array(items) => part
                    .parse::<usize>()
                    .ok()
                    .and_then(move |index| items.get_mut(index)),
                other => other.get_mut(part),
            }
            .ok_or_else(unknown)?;
        }

        let new_value = match &*current {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => serde_json::Value::Number(
                value
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                    .into(),
            ),
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(value.into()),
        };
        *current = new_value;
        Ok(())
    }

    /// Default location, `<data_dir>/config.toml`.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
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

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails validation. `self` is unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_intervals == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_intervals".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.intervals.len() > self.max_intervals {
            return Err(ConfigError::InvalidValue {
                key: "intervals".into(),
                message: format!(
                    "{} intervals exceed max_intervals ({})",
                    self.intervals.len(),
                    self.max_intervals
                ),
            });
        }
        Ok(())
    }

    pub fn sequence(&self) -> IntervalSequence {
        self.intervals.clone()
    }

    pub fn policy(&self) -> LoopPolicy {
        if self.workout.infinite {
            LoopPolicy::Infinite
        } else {
            LoopPolicy::rounds(self.workout.rounds)
        }
    }

    /// Tick period for the driver, clamped to the supported range.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.timer.tick_interval_ms)
            .clamp(MIN_TICK_INTERVAL, MAX_TICK_INTERVAL)
    }

    /// Add an interval at `position` (or at the end), enforcing
    /// `max_intervals`.
    pub fn add_interval(
        &mut self,
        interval: Interval,
        position: Option<usize>,
    ) -> Result<(), ValidationError> {
        self.intervals.ensure_capacity(self.max_intervals)?;
        match position {
            Some(index) => self.intervals.insert(index, interval),
            None => {
                self.intervals.push(interval);
                Ok(())
            }
        }
    }
}
