//! Event-pair calendar — the ordered list of pairs the selector scans.
//!
//! The calendar is stored as a TOML file with one `[[pair]]` table per
//! cycle. How the dates were produced (ephemeris, published table) is not
//! this crate's concern; it only checks ordering.
//!
//! ```toml
//! [[pair]]
//! superior = "2025-09-13"
//! inferior = "2025-11-20"
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{EventPair, PairError};

/// Errors from building or loading a calendar.
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("failed to read calendar file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse calendar TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize calendar: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid pair: {0}")]
    Pair(#[from] PairError),
    #[error("duplicate superior date {0}")]
    DuplicateSuperior(NaiveDate),
}

/// Ascending-by-superior sequence of event pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CalendarFile", into = "CalendarFile")]
pub struct PairCalendar {
    pairs: Vec<EventPair>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CalendarFile {
    #[serde(default, rename = "pair")]
    pairs: Vec<EventPair>,
}

impl TryFrom<CalendarFile> for PairCalendar {
    type Error = CalendarError;

    fn try_from(file: CalendarFile) -> Result<Self, Self::Error> {
        PairCalendar::new(file.pairs)
    }
}

impl From<PairCalendar> for CalendarFile {
    fn from(calendar: PairCalendar) -> Self {
        Self {
            pairs: calendar.pairs,
        }
    }
}

impl PairCalendar {
    /// Sort pairs by superior date and reject duplicate superior dates.
    pub fn new(mut pairs: Vec<EventPair>) -> Result<Self, CalendarError> {
        pairs.sort_by_key(|p| p.superior());
        if let Some(w) = pairs.windows(2).find(|w| w[0].superior() == w[1].superior()) {
            return Err(CalendarError::DuplicateSuperior(w[0].superior()));
        }
        Ok(Self { pairs })
    }

    /// Load a calendar from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, CalendarError> {
        let content = std::fs::read_to_string(path).map_err(|source| CalendarError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a calendar from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, CalendarError> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize the calendar to TOML.
    pub fn to_toml(&self) -> Result<String, CalendarError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn pairs(&self) -> &[EventPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Up to `n` pairs whose superior date is after `today`, soonest first.
    pub fn upcoming(&self, today: NaiveDate, n: usize) -> Vec<EventPair> {
        self.pairs
            .iter()
            .filter(|p| p.superior() > today)
            .take(n)
            .copied()
            .collect()
    }

    /// Pairs whose inferior date is on or before `date` (fully elapsed cycles).
    pub fn completed_by(&self, date: NaiveDate) -> Vec<EventPair> {
        self.pairs
            .iter()
            .filter(|p| p.inferior() <= date)
            .copied()
            .collect()
    }

    /// The published Mercury/Sun geocentric table for 2024-2026.
    pub fn builtin() -> Self {
        const TABLE: [((i32, u32, u32), (i32, u32, u32)); 5] = [
            ((2024, 6, 14), (2024, 8, 5)),
            ((2024, 8, 28), (2024, 10, 29)),
            ((2025, 5, 30), (2025, 7, 29)),
            ((2025, 9, 13), (2025, 11, 20)),
            ((2025, 12, 30), (2026, 2, 6)),
        ];

        let pairs = TABLE
            .iter()
            .filter_map(|&((sy, sm, sd), (iy, im, id))| {
                let superior = NaiveDate::from_ymd_opt(sy, sm, sd)?;
                let inferior = NaiveDate::from_ymd_opt(iy, im, id)?;
                EventPair::new(superior, inferior).ok()
            })
            .collect();

        Self { pairs }
    }
}
