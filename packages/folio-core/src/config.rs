//! Settings loaded from a TOML file.

use crate::portfolio::{DEFAULT_CONFIDENCE_LEVEL, DEFAULT_RISK_FREE_RATE};
use crate::types::MacroIndicators;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the settings file location.
pub const CONFIG_FILE_ENV: &str = "FOLIO_CONFIG_FILE";

/// Analytics and CLI settings.
///
/// Every field has a default, so a partial or missing file is fine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Annual risk-free rate for the Sharpe ratio
    pub risk_free_rate: f64,
    /// Tail probability for value-at-risk
    pub confidence_level: f64,
    /// First date of price history fetched for returns
    pub history_start: NaiveDate,
    /// JSON price file used by the CLI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_file: Option<PathBuf>,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Figures for the macro panel
    pub macro_indicators: MacroIndicators,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            history_start: default_history_start(),
            price_file: None,
            log_level: "warn".to_string(),
            macro_indicators: MacroIndicators::default(),
        }
    }
}

fn default_history_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2014, 1, 1).unwrap_or_default()
}

impl Settings {
    /// Get the default settings file path.
    ///
    /// Default path: `~/.folio/config.toml`
    /// Can be overridden with `FOLIO_CONFIG_FILE` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_FILE_ENV) {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".folio/config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Load settings from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load settings from a specific path. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings = Self::from_toml(&content)?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the analytics cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_level) {
            return Err(Error::InvalidOperation(format!(
                "confidence_level must be between 0 and 1, got {}",
                self.confidence_level
            )));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(Error::InvalidOperation(
                "risk_free_rate must be a finite number".to_string(),
            ));
        }
        Ok(())
    }
}
