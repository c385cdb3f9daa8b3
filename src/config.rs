use crate::error::Result;

use serde_derive::Deserialize;
use std::str::FromStr;

/// Database configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Config {
    /// Maximum log level: off, error, warn, info, debug or trace.
    pub log_level: String,
    /// Whether the planner may answer equality predicates through hash indexes.
    pub index_lookups: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { log_level: "info".into(), index_lookups: true }
    }
}

impl Config {
    /// Loads the configuration from the given file, if it exists, with
    /// MINIDB_ environment variables taking precedence.
    pub fn load(file: &str) -> Result<Self> {
        let defaults = Self::default();
        Ok(config::Config::builder()
            .set_default("log_level", defaults.log_level)?
            .set_default("index_lookups", defaults.index_lookups)?
            .add_source(config::File::with_name(file).required(false))
            .add_source(config::Environment::with_prefix("MINIDB"))
            .build()?
            .try_deserialize()?)
    }

    /// Parses the configured log level.
    pub fn log_filter(&self) -> Result<log::LevelFilter> {
        Ok(log::LevelFilter::from_str(&self.log_level)?)
    }
}
