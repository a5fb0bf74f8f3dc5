//! TOML Configuration File Support
//!
//! This module provides centralized configuration loading for the pet
//! simulation, supporting a TOML configuration file at
//! `~/.config/sekitoritchi/pet.toml`.
//!
//! The result is one immutable [`PetConfig`], built once at startup and
//! handed to the controller by value. Nothing reads tunables from globals.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (when applicable)
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [decay]
//! overweight_threshold = 350
//! elder_age = 120
//! base_decrease_min = 1
//! base_decrease_max = 5
//!
//! [care]
//! delta_min = 3
//! delta_max = 5
//!
//! [timing]
//! decay_interval_secs = 15
//! sleep_ms = 6000
//!
//! [game]
//! save_path = "/home/me/.local/share/sekitoritchi/save.json"
//! seed = 42
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// Tunables
// =============================================================================

/// Rules for the periodic decay tick
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecayTuning {
    /// Weight above which decay accelerates
    pub overweight_threshold: i32,
    /// Age (in ticks) above which the pet counts as an elder
    pub elder_age: u32,
    /// Smallest base decrease rolled per tick
    pub base_decrease_min: i32,
    /// Largest base decrease rolled per tick
    pub base_decrease_max: i32,
    /// Poop added per tick
    pub poop_increment: i32,
    /// Poop level at which a poop event fires
    pub poop_threshold: i32,
    /// Health lost per tick while poop is visible, and once when it appears
    pub poop_penalty: i32,
}

impl Default for DecayTuning {
    fn default() -> Self {
        Self {
            overweight_threshold: 325,
            elder_age: 100,
            base_decrease_min: 1,
            base_decrease_max: 2,
            poop_increment: 5,
            poop_threshold: 75,
            poop_penalty: 3,
        }
    }
}

/// Stat changes rolled by feed, dance and sleep
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CareTuning {
    /// Smallest delta
    pub delta_min: i32,
    /// Largest delta
    pub delta_max: i32,
}

impl Default for CareTuning {
    fn default() -> Self {
        Self {
            delta_min: 3,
            delta_max: 5,
        }
    }
}

/// Timer windows
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    /// Interval between decay ticks
    pub decay_interval: Duration,
    /// Feed animation window
    pub feed: Duration,
    /// Dance animation window
    pub dance: Duration,
    /// Sleep animation window
    pub sleep: Duration,
    /// Random event animation window
    pub random_event: Duration,
    /// Random event window when the outcome is frustrated
    pub frustrated: Duration,
    /// Poop animation window
    pub pooping: Duration,
    /// Delay before a blocked poop event tries again
    pub poop_retry: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            decay_interval: Duration::from_secs(15),
            feed: Duration::from_secs(4),
            dance: Duration::from_secs(4),
            sleep: Duration::from_secs(6),
            random_event: Duration::from_secs(3),
            frustrated: Duration::from_secs(5),
            pooping: Duration::from_secs(3),
            poop_retry: Duration::from_secs(1),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Decay section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayToml {
    /// Overweight threshold
    pub overweight_threshold: Option<i32>,
    /// Elder age in ticks
    pub elder_age: Option<u32>,
    /// Minimum base decrease
    pub base_decrease_min: Option<i32>,
    /// Maximum base decrease
    pub base_decrease_max: Option<i32>,
    /// Poop increment per tick
    pub poop_increment: Option<i32>,
    /// Poop event threshold
    pub poop_threshold: Option<i32>,
    /// Poop health penalty
    pub poop_penalty: Option<i32>,
}

/// Care section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CareToml {
    /// Minimum action delta
    pub delta_min: Option<i32>,
    /// Maximum action delta
    pub delta_max: Option<i32>,
}

/// Timing section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingToml {
    /// Decay interval in seconds
    pub decay_interval_secs: Option<u64>,
    /// Feed window in milliseconds
    pub feed_ms: Option<u64>,
    /// Dance window in milliseconds
    pub dance_ms: Option<u64>,
    /// Sleep window in milliseconds
    pub sleep_ms: Option<u64>,
    /// Random event window in milliseconds
    pub random_event_ms: Option<u64>,
    /// Frustrated window in milliseconds
    pub frustrated_ms: Option<u64>,
    /// Pooping window in milliseconds
    pub pooping_ms: Option<u64>,
    /// Poop retry delay in milliseconds
    pub poop_retry_ms: Option<u64>,
}

/// Game section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameToml {
    /// Save file location
    pub save_path: Option<PathBuf>,
    /// Fixed RNG seed
    pub seed: Option<u64>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PetToml {
    /// Decay section
    pub decay: DecayToml,
    /// Care section
    pub care: CareToml,
    /// Timing section
    pub timing: TimingToml,
    /// Game section
    pub game: GameToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Centralized configuration for the pet simulation
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug)]
pub struct PetConfig {
    /// Decay rules
    pub decay: DecayTuning,

    /// Action deltas
    pub care: CareTuning,

    /// Timer windows
    pub timing: TimingConfig,

    /// Save file location (`None` uses [`default_save_path`])
    pub save_path: Option<PathBuf>,

    /// Fixed RNG seed (`None` seeds from entropy)
    pub seed: Option<u64>,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for PetConfig {
    fn default() -> Self {
        Self {
            decay: DecayTuning::default(),
            care: CareTuning::default(),
            timing: TimingConfig::default(),
            save_path: None,
            seed: None,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl PetConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Use a fixed RNG seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Use a different decay interval
    #[must_use]
    pub fn with_decay_interval(mut self, interval: Duration) -> Self {
        self.timing.decay_interval = interval;
        self
    }

    /// Resolved save file location
    #[must_use]
    pub fn resolved_save_path(&self) -> PathBuf {
        self.save_path
            .clone()
            .or_else(default_save_path)
            .unwrap_or_else(|| PathBuf::from("sekitoritchi.json"))
    }

    /// Check ranges and intervals
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for inverted or empty ranges,
    /// a poop threshold outside 1..=100 and a zero decay interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.decay;
        if d.base_decrease_min < 0 || d.base_decrease_min > d.base_decrease_max {
            return Err(ConfigError::ValidationError(format!(
                "base decrease range {}..={} is empty or negative",
                d.base_decrease_min, d.base_decrease_max
            )));
        }
        if !(1..=100).contains(&d.poop_threshold) {
            return Err(ConfigError::ValidationError(format!(
                "poop threshold {} must be within 1..=100",
                d.poop_threshold
            )));
        }
        if d.poop_increment < 0 || d.poop_penalty < 0 {
            return Err(ConfigError::ValidationError(
                "poop increment and penalty must not be negative".to_string(),
            ));
        }
        let c = &self.care;
        if c.delta_min < 0 || c.delta_min > c.delta_max {
            return Err(ConfigError::ValidationError(format!(
                "care delta range {}..={} is empty or negative",
                c.delta_min, c.delta_max
            )));
        }
        if self.timing.decay_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "decay interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/sekitoritchi/pet.toml` or
/// `~/.config/sekitoritchi/pet.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sekitoritchi").join("pet.toml"))
}

/// Get the default save file path (`$XDG_DATA_HOME/sekitoritchi/save.json`)
#[must_use]
pub fn default_save_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("sekitoritchi").join("save.json"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the merged values fail validation. A missing config file is not an error.
pub fn load_config() -> Result<PetConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Arguments
///
/// * `path` - Optional path to the configuration file. If `None`, only defaults
///   and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<PetConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration with an injectable environment lookup
///
/// # Errors
///
/// Same as [`load_config_from_path`].
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<PetConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = PetConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: PetToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut PetConfig, toml: &PetToml) {
    let decay = &mut config.decay;
    if let Some(v) = toml.decay.overweight_threshold {
        decay.overweight_threshold = v;
    }
    if let Some(v) = toml.decay.elder_age {
        decay.elder_age = v;
    }
    if let Some(v) = toml.decay.base_decrease_min {
        decay.base_decrease_min = v;
    }
    if let Some(v) = toml.decay.base_decrease_max {
        decay.base_decrease_max = v;
    }
    if let Some(v) = toml.decay.poop_increment {
        decay.poop_increment = v;
    }
    if let Some(v) = toml.decay.poop_threshold {
        decay.poop_threshold = v;
    }
    if let Some(v) = toml.decay.poop_penalty {
        decay.poop_penalty = v;
    }

    if let Some(v) = toml.care.delta_min {
        config.care.delta_min = v;
    }
    if let Some(v) = toml.care.delta_max {
        config.care.delta_max = v;
    }

    let timing = &mut config.timing;
    if let Some(secs) = toml.timing.decay_interval_secs {
        timing.decay_interval = Duration::from_secs(secs);
    }
    let windows = [
        (toml.timing.feed_ms, &mut timing.feed),
        (toml.timing.dance_ms, &mut timing.dance),
        (toml.timing.sleep_ms, &mut timing.sleep),
        (toml.timing.random_event_ms, &mut timing.random_event),
        (toml.timing.frustrated_ms, &mut timing.frustrated),
        (toml.timing.pooping_ms, &mut timing.pooping),
        (toml.timing.poop_retry_ms, &mut timing.poop_retry),
    ];
    for (value, slot) in windows {
        if let Some(ms) = value {
            *slot = Duration::from_millis(ms);
        }
    }

    if toml.game.save_path.is_some() {
        config.save_path = toml.game.save_path.clone();
    }
    if toml.game.seed.is_some() {
        config.seed = toml.game.seed;
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut PetConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = env("SEKITORITCHI_SAVE_PATH") {
        config.save_path = Some(PathBuf::from(path));
        config.source = ConfigSource::Env;
    }
    if let Some(interval) = env("SEKITORITCHI_DECAY_INTERVAL") {
        if let Ok(secs) = interval.parse::<u64>() {
            config.timing.decay_interval = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(seed) = env("SEKITORITCHI_SEED") {
        if let Ok(s) = seed.parse::<u64>() {
            config.seed = Some(s);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(threshold) = env("SEKITORITCHI_OVERWEIGHT") {
        if let Ok(t) = threshold.parse::<i32>() {
            config.decay.overweight_threshold = t;
            config.source = ConfigSource::Env;
        }
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Save path override
    pub save_path: Option<PathBuf>,

    /// Decay interval override (seconds)
    pub decay_interval_secs: Option<u64>,

    /// Seed override
    pub seed: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set save path override
    #[must_use]
    pub fn with_save_path(mut self, path: PathBuf) -> Self {
        self.save_path = Some(path);
        self
    }

    /// Set decay interval override
    #[must_use]
    pub fn with_decay_interval_secs(mut self, secs: u64) -> Self {
        self.decay_interval_secs = Some(secs);
        self
    }

    /// Set seed override
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Apply overrides to a configuration and re-validate it
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] when an override produces an
    /// invalid configuration (for example a zero interval).
    pub fn apply(&self, config: &mut PetConfig) -> Result<(), ConfigError> {
        if self.save_path.is_some() || self.decay_interval_secs.is_some() || self.seed.is_some() {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref path) = self.save_path {
            config.save_path = Some(path.clone());
        }
        if let Some(secs) = self.decay_interval_secs {
            config.timing.decay_interval = Duration::from_secs(secs);
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }

        config.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
