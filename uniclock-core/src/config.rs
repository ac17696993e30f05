//! Analysis configuration.
//!
//! Grace window, historical slack, fallback width and the per-horizon
//! threshold buffers. Loaded from TOML; missing keys take defaults.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Mode, Range};

/// Errors from loading or validating an [`AnalysisConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How far past a range boundary price must travel before a horizon fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BufferRule {
    /// Threshold is `high + span * k` / `low - span * k`.
    SpanMultiple { k: Decimal },
    /// Threshold is `high * (1 + pct/100)` / `low * (1 - pct/100)`.
    BoundaryPercent { pct: Decimal },
}

impl BufferRule {
    /// Price above which the horizon signals Sell.
    pub fn sell_threshold(&self, range: &Range) -> Decimal {
        match *self {
            BufferRule::SpanMultiple { k } => range.high + range.span() * k,
            BufferRule::BoundaryPercent { pct } => {
                range.high * (Decimal::ONE + pct / Decimal::ONE_HUNDRED)
            }
        }
    }

    /// Price below which the horizon signals Buy.
    pub fn buy_threshold(&self, range: &Range) -> Decimal {
        match *self {
            BufferRule::SpanMultiple { k } => range.low - range.span() * k,
            BufferRule::BoundaryPercent { pct } => {
                range.low * (Decimal::ONE - pct / Decimal::ONE_HUNDRED)
            }
        }
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        match *self {
            BufferRule::SpanMultiple { k } if k < Decimal::ZERO => Err(
                ConfigError::Invalid(format!("{name}: span multiple must be >= 0, got {k}")),
            ),
            BufferRule::BoundaryPercent { pct }
                if pct < Decimal::ZERO || pct >= Decimal::ONE_HUNDRED =>
            {
                Err(ConfigError::Invalid(format!(
                    "{name}: boundary percent must be in [0, 100), got {pct}"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Parameters for one analysis call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Days after a pair's inferior date during which it still governs in Live mode.
    pub live_grace_window_days: u32,
    /// Date-matching slack past the inferior date in Historical mode.
    pub historical_tolerance_days: u32,
    /// Half-width of the range extractor's fallback window, in days.
    pub range_fallback_days: u32,
    /// Buffer for the short-term horizon (k1).
    pub short_term: BufferRule,
    /// Buffer for the long-term horizon (k2).
    pub long_term: BufferRule,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            live_grace_window_days: 30,
            historical_tolerance_days: 0,
            range_fallback_days: 1,
            short_term: BufferRule::SpanMultiple {
                k: Decimal::new(2, 1),
            },
            long_term: BufferRule::SpanMultiple {
                k: Decimal::new(3, 1),
            },
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string. Missing keys take defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.historical_tolerance_days > self.live_grace_window_days {
            return Err(ConfigError::Invalid(format!(
                "historical_tolerance_days ({}) must not exceed live_grace_window_days ({})",
                self.historical_tolerance_days, self.live_grace_window_days
            )));
        }
        self.short_term.validate("short_term")?;
        self.long_term.validate("long_term")?;
        Ok(())
    }

    /// Tolerance applied past the inferior date for the given mode.
    pub fn slack_days(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Live => self.live_grace_window_days,
            Mode::Historical => self.historical_tolerance_days,
        }
    }
}
