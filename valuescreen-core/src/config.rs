//! Screen configuration — classification thresholds, fiscal year range and
//! output marker labels.
//!
//! Loaded from TOML; any field left out takes its default.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::domain::{ConfigHash, FiscalYears};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Marker strings rendered in the output table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub large: String,
    pub small_mid: String,
    pub undervalued: String,
    pub high_growth: String,
    /// Rendered for a false flag and for an undefined/zero growth rate.
    pub placeholder: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            large: "대기업".into(),
            small_mid: "중소형".into(),
            undervalued: "저평가".into(),
            high_growth: "고성장".into(),
            placeholder: "-".into(),
        }
    }
}

/// Everything the engine needs besides the facts themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// First fiscal year of the panel (inclusive).
    pub first_year: u16,
    /// Final fiscal year: valuation basis and CAGR end point.
    pub last_year: u16,
    /// CAGR start point.
    pub cagr_base_year: u16,
    /// EPS CAGR strictly above this is high growth (0.12 = 12%).
    pub growth_threshold: f64,
    /// Undervalued requires PER strictly below this.
    pub per_max: f64,
    /// Undervalued requires PBR strictly below this.
    pub pbr_max: f64,
    /// Market cap at or above this is a large company.
    pub large_cap_min: f64,
    pub labels: Labels,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            first_year: 2020,
            last_year: 2026,
            cagr_base_year: 2021,
            growth_threshold: 0.12,
            per_max: 8.0,
            pbr_max: 0.8,
            large_cap_min: 5e12,
            labels: Labels::default(),
        }
    }
}

impl ScreenConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The year axis every panel row is indexed by.
    pub fn fiscal_years(&self) -> FiscalYears {
        FiscalYears::new(self.first_year, self.last_year).unwrap_or_default()
    }

    /// Number of compounding periods between the CAGR base and final year.
    pub fn cagr_periods(&self) -> u16 {
        self.last_year.saturating_sub(self.cagr_base_year)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.first_year > self.last_year {
            return Err(ConfigError::Invalid(format!(
                "first_year {} is after last_year {}",
                self.first_year, self.last_year
            )));
        }
        if self.cagr_base_year < self.first_year || self.cagr_base_year >= self.last_year {
            return Err(ConfigError::Invalid(format!(
                "cagr_base_year {} must lie in [{}, {})",
                self.cagr_base_year, self.first_year, self.last_year
            )));
        }
        for (name, v) in [
            ("growth_threshold", self.growth_threshold),
            ("per_max", self.per_max),
            ("pbr_max", self.pbr_max),
            ("large_cap_min", self.large_cap_min),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be finite and non-negative, got {v}"
                )));
            }
        }
        Ok(())
    }

    /// Deterministic hash of every parameter, for run manifests.
    pub fn config_hash(&self) -> ConfigHash {
        // Field order is fixed by the struct, so the JSON is canonical.
        let json = serde_json::to_string(self).unwrap_or_default();
        ConfigHash::from_bytes(json.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_screen_rules() {
        let c = ScreenConfig::default();
        assert_eq!(c.fiscal_years().len(), 7);
        assert_eq!(c.cagr_periods(), 5);
        assert_eq!(c.growth_threshold, 0.12);
        assert_eq!(c.per_max, 8.0);
        assert_eq!(c.pbr_max, 0.8);
        assert_eq!(c.large_cap_min, 5e12);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let c = ScreenConfig::from_toml("growth_threshold = 0.15\n[labels]\nlarge = \"L\"\n").unwrap();
        assert_eq!(c.growth_threshold, 0.15);
        assert_eq!(c.per_max, 8.0);
        assert_eq!(c.labels.large, "L");
        assert_eq!(c.labels.small_mid, "중소형");
    }

    #[test]
    fn toml_roundtrip() {
        let c = ScreenConfig::default();
        let parsed = ScreenConfig::from_toml(&c.to_toml().unwrap()).unwrap();
        assert_eq!(c, parsed);
    }

    #[test]
    fn rejects_bad_year_ranges() {
        assert!(ScreenConfig::from_toml("first_year = 2027").is_err());
        assert!(ScreenConfig::from_toml("cagr_base_year = 2026").is_err());
        assert!(ScreenConfig::from_toml("cagr_base_year = 2019").is_err());
    }

    #[test]
    fn rejects_negative_thresholds() {
        assert!(ScreenConfig::from_toml("per_max = -1.0").is_err());
    }

    #[test]
    fn config_hash_changes_with_params() {
        let a = ScreenConfig::default();
        let mut b = a.clone();
        b.per_max = 10.0;
        assert_eq!(a.config_hash(), ScreenConfig::default().config_hash());
        assert_ne!(a.config_hash(), b.config_hash());
    }
}
