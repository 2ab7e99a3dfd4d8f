//! Serializable run configuration.
//!
//! A run file names the fact input, where artifacts go, and carries the
//! screen rules in a `[screen]` table:
//!
//! ```toml
//! input = "data/stock_data_raw.csv"
//! output_dir = "output"
//! parallel = true
//!
//! [screen]
//! per_max = 8.0
//! pbr_max = 0.8
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use valuescreen_core::ScreenConfig;

/// Unique identifier for a run configuration (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid screen rules: {0}")]
    Screen(#[from] valuescreen_core::ConfigError),
    #[error("invalid run config: {0}")]
    Invalid(String),
}

/// Everything needed to reproduce a screen run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Long-format fact file (CSV or Parquet).
    pub input: PathBuf,

    /// Directory that receives the artifact bundle.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Screen companies on the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    #[serde(default)]
    pub screen: ScreenConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_parallel() -> bool {
    true
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("stock_data_raw.csv"),
            output_dir: default_output_dir(),
            parallel: default_parallel(),
            screen: ScreenConfig::default(),
        }
    }
}

impl RunConfig {
    /// Run config over `input` with default rules.
    pub fn for_input(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("input path is empty".into()));
        }
        self.screen.validate()?;
        Ok(())
    }

    /// Deterministic hash over the whole run config.
    ///
    /// Two runs with identical configs share a RunId; the screen rules
    /// alone are fingerprinted separately by `ScreenConfig::config_hash`.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_takes_defaults() {
        let config = RunConfig::from_toml(r#"input = "facts.csv""#).unwrap();
        assert_eq!(config.input, PathBuf::from("facts.csv"));
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert!(config.parallel);
        assert_eq!(config.screen, ScreenConfig::default());
    }

    #[test]
    fn screen_table_overrides_rules() {
        let toml = r#"
            input = "facts.parquet"
            parallel = false

            [screen]
            per_max = 10.0
            large_cap_min = 1e12

            [screen.labels]
            undervalued = "cheap"
        "#;
        let config = RunConfig::from_toml(toml).unwrap();
        assert!(!config.parallel);
        assert_eq!(config.screen.per_max, 10.0);
        assert_eq!(config.screen.pbr_max, 0.8);
        assert_eq!(config.screen.large_cap_min, 1e12);
        assert_eq!(config.screen.labels.undervalued, "cheap");
        assert_eq!(config.screen.labels.high_growth, "고성장");
    }

    #[test]
    fn invalid_screen_rules_are_rejected() {
        let toml = r#"
            input = "facts.csv"
            [screen]
            first_year = 2026
            last_year = 2020
        "#;
        assert!(matches!(
            RunConfig::from_toml(toml),
            Err(ConfigError::Screen(_))
        ));
    }

    #[test]
    fn missing_input_is_a_parse_error() {
        assert!(matches!(
            RunConfig::from_toml("parallel = true"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn run_id_deterministic_and_param_sensitive() {
        let a = RunConfig::for_input("facts.csv");
        assert_eq!(a.run_id(), a.clone().run_id());

        let mut b = a.clone();
        b.screen.pbr_max = 1.0;
        assert_ne!(a.run_id(), b.run_id());
    }

    #[test]
    fn toml_round_trip() {
        let config = RunConfig::for_input("facts.csv");
        let text = config.to_toml().unwrap();
        assert_eq!(RunConfig::from_toml(&text).unwrap(), config);
    }
}
