//! Serializable run configuration.
//!
//! A run file names the instruments to analyze, where their price CSVs
//! live, the calendar to use and the analysis parameters:
//!
//! ```toml
//! calendar = "pairs.toml"        # optional, builtin table otherwise
//! reference_date = "2025-10-01"  # optional, defaults to today
//!
//! [analysis]
//! live_grace_window_days = 30
//!
//! [[instrument]]
//! symbol = "IDBI.NS"
//! prices = "data/IDBI.csv"
//! ```
//!
//! Relative paths resolve against the directory holding the run file.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uniclock_core::{AnalysisConfig, CalendarError, ConfigError, PairCalendar};

/// Errors from loading a [`RunConfig`].
#[derive(Debug, Error)]
pub enum RunConfigError {
    #[error("failed to read run file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse run TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("analysis settings: {0}")]
    Analysis(#[from] ConfigError),
    #[error("calendar: {0}")]
    Calendar(#[from] CalendarError),
    #[error("run file lists no instruments")]
    NoInstruments,
    #[error("duplicate instrument symbol '{0}'")]
    DuplicateSymbol(String),
}

/// One instrument to analyze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub symbol: String,
    /// Path to the price CSV.
    pub prices: PathBuf,
    /// Live quote; the last close of the series is used when absent.
    #[serde(default)]
    pub current_price: Option<Decimal>,
}

/// Complete description of a multi-instrument analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Calendar TOML; the builtin table when absent.
    #[serde(default)]
    pub calendar: Option<PathBuf>,
    /// Date to analyze; today when absent.
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
    #[serde(rename = "instrument", default)]
    pub instruments: Vec<InstrumentConfig>,
}

impl RunConfig {
    /// Load a run file, resolving relative paths against its directory.
    pub fn from_file(path: &Path) -> Result<Self, RunConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| RunConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Parse and validate a run file from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, RunConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RunConfigError> {
        self.analysis.validate()?;
        if self.instruments.is_empty() {
            return Err(RunConfigError::NoInstruments);
        }
        let mut seen = std::collections::HashSet::new();
        for inst in &self.instruments {
            if !seen.insert(inst.symbol.as_str()) {
                return Err(RunConfigError::DuplicateSymbol(inst.symbol.clone()));
            }
        }
        Ok(())
    }

    /// The configured calendar, or the builtin table.
    pub fn load_calendar(&self) -> Result<PairCalendar, RunConfigError> {
        match &self.calendar {
            Some(path) => Ok(PairCalendar::from_file(path)?),
            None => Ok(PairCalendar::builtin()),
        }
    }

    fn resolve_paths(&mut self, base: &Path) {
        if let Some(calendar) = &self.calendar {
            if calendar.is_relative() {
                self.calendar = Some(base.join(calendar));
            }
        }
        for inst in &mut self.instruments {
            if inst.prices.is_relative() {
                inst.prices = base.join(&inst.prices);
            }
        }
    }
}
