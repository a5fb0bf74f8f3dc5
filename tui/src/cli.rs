//! Command-line Arguments
//!
//! Flags sit on top of the configuration layers: anything given here wins
//! over the environment, the config file and the defaults.

use std::path::PathBuf;

use clap::Parser;

use sekitoritchi_core::{
    default_config_path, load_config_from_path, ConfigError, ConfigOverrides, PetConfig,
};

/// A tiny sumo wrestler who lives in your terminal
#[derive(Debug, Parser)]
#[command(name = "sekitoritchi", version, about)]
pub struct Cli {
    /// Config file (default: ~/.config/sekitoritchi/pet.toml)
    #[arg(long, env = "SEKITORITCHI_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Save file (default: ~/.local/share/sekitoritchi/save.json)
    #[arg(long, value_name = "PATH")]
    pub save_file: Option<PathBuf>,

    /// Seconds between decay ticks
    #[arg(long, value_name = "SECS")]
    pub interval_secs: Option<u64>,

    /// Fixed random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Run without a terminal UI, logging every change
    #[arg(long, conflicts_with = "status")]
    pub headless: bool,

    /// Print the saved pet as JSON and exit
    #[arg(long)]
    pub status: bool,
}

impl Cli {
    /// Flag values as config overrides
    pub fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(path) = &self.save_file {
            overrides = overrides.with_save_path(path.clone());
        }
        if let Some(secs) = self.interval_secs {
            overrides = overrides.with_decay_interval_secs(secs);
        }
        if let Some(seed) = self.seed {
            overrides = overrides.with_seed(seed);
        }
        overrides
    }

    /// Load every configuration layer and apply the flags last
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an unreadable or malformed config file,
    /// or for values that fail validation.
    pub fn load_config(&self) -> Result<PetConfig, ConfigError> {
        let path = self.config.clone().or_else(default_config_path);
        let mut config = load_config_from_path(path)?;
        self.overrides().apply(&mut config)?;
        Ok(config)
    }
}
