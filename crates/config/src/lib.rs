use std::time::Duration;

use derive_more::derive::From;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};

#[derive(Debug, From)]
pub enum ConfigError {
    #[from(ignore)]
    IOError(std::io::Error),

    #[from(ignore)]
    DeserializationFailed(toml::de::Error),

    InvalidPath(std::path::PathBuf),
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::DeserializationFailed(value)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::IOError(value)
    }
}

impl std::error::Error for ConfigError {}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IOError(err) => write!(f, "failed to read concurrency config: {err}"),
            Self::DeserializationFailed(err) => {
                write!(f, "concurrency config is not valid TOML for its sections: {err}")
            }
            Self::InvalidPath(path) => {
                write!(f, "{} is a directory, not a config file", path.display())
            }
        }
    }
}

impl ConfigError {
    /// True when the config file simply does not exist.
    #[must_use]
    pub fn is_missing_file(&self) -> bool {
        matches!(self, Self::IOError(err) if err.kind() == std::io::ErrorKind::NotFound)
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

pub const DEFAULT_GENERATOR_CAPACITY: usize = 10;
pub const DEFAULT_PARTITIONS: usize = 2;
pub const DEFAULT_IDLE_POLL: Duration = Duration::from_millis(10);

/// Defaults for every primitive of the toolkit, each section
/// falls back to its own defaults when missing from the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    pub generator: GeneratorConfig,
    pub aggregator: AggregatorConfig,
    pub multiplexer: MultiplexerConfig,
}

impl ConcurrencyConfig {
    pub fn load<V: Into<std::path::PathBuf>>(target: V) -> ConfigResult<Self> {
        from_path(target)
    }

    /// Like [`ConcurrencyConfig::load`] but a missing file yields the
    /// defaults. Unreadable or malformed files are still errors.
    pub fn load_or_default<V: Into<std::path::PathBuf>>(target: V) -> ConfigResult<Self> {
        match Self::load(target) {
            Err(err) if err.is_missing_file() => {
                tracing::debug!("no concurrency config found, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Builds the config from an already parsed TOML document, as
    /// returned by [`value_from_path`].
    pub fn from_value(value: toml::Value) -> ConfigResult<Self> {
        Ok(value.try_into::<Self>()?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of values a producer may run ahead of its consumer,
    /// zero makes every send a rendezvous.
    pub capacity: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_GENERATOR_CAPACITY,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    pub partitions: usize,

    /// Upper bound on the time spent waiting for partial results.
    #[serde(rename = "budget_ms")]
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    pub budget: Option<Duration>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            partitions: DEFAULT_PARTITIONS,
            budget: None,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiplexerConfig {
    /// Longest time an idle multiplexer without a default branch
    /// parks before polling its sources again.
    #[serde(rename = "idle_poll_ms")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub idle_poll: Duration,
}

impl Default for MultiplexerConfig {
    fn default() -> Self {
        Self {
            idle_poll: DEFAULT_IDLE_POLL,
        }
    }
}

/// value_from_path returns the regular `toml::Value` object which implements the
/// `serde::DeserializeOwned` trait which allows you to directly manipulate the value object
/// instead of a defined type.
pub fn value_from_path<V: Into<std::path::PathBuf>>(target: V) -> ConfigResult<toml::Value> {
    from_path(target)
}

pub fn from_path<T, V>(target: V) -> ConfigResult<T>
where
    T: DeserializeOwned,
    V: Into<std::path::PathBuf>,
{
    let target_path = target.into();
    if target_path.is_dir() {
        return Err(ConfigError::InvalidPath(target_path));
    }

    let config_content = std::fs::read_to_string(target_path)?;
    from_str(&config_content)
}

pub fn from_str<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let config_obj: T = toml::from_str(content)?;
    Ok(config_obj)
}
