//! Event pairs: one forecasting cycle from a superior date to an inferior date.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from constructing an [`EventPair`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairError {
    #[error("superior date {superior} must be before inferior date {inferior}")]
    NotOrdered {
        superior: NaiveDate,
        inferior: NaiveDate,
    },
}

/// A (superior, inferior) date couple.
///
/// The superior date sets the range; the inferior date is when price is
/// expected to revisit it. Always `superior < inferior`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawEventPair", into = "RawEventPair")]
pub struct EventPair {
    superior: NaiveDate,
    inferior: NaiveDate,
}

impl EventPair {
    pub fn new(superior: NaiveDate, inferior: NaiveDate) -> Result<Self, PairError> {
        if superior >= inferior {
            return Err(PairError::NotOrdered { superior, inferior });
        }
        Ok(Self { superior, inferior })
    }

    pub fn superior(&self) -> NaiveDate {
        self.superior
    }

    pub fn inferior(&self) -> NaiveDate {
        self.inferior
    }

    /// Length of the cycle in calendar days.
    pub fn interval_days(&self) -> i64 {
        (self.inferior - self.superior).num_days()
    }

    /// True if `superior <= date <= inferior + slack_days`.
    ///
    /// An end past the last representable date leaves the window open.
    pub fn contains(&self, date: NaiveDate, slack_days: u32) -> bool {
        let within_end = self
            .inferior
            .checked_add_days(Days::new(u64::from(slack_days)))
            .map_or(true, |end| date <= end);
        self.superior <= date && within_end
    }
}

impl std::fmt::Display for EventPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.superior, self.inferior)
    }
}

/// Serde shape of an [`EventPair`]; validated on the way in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawEventPair {
    superior: NaiveDate,
    inferior: NaiveDate,
}

impl TryFrom<RawEventPair> for EventPair {
    type Error = PairError;

    fn try_from(raw: RawEventPair) -> Result<Self, Self::Error> {
        EventPair::new(raw.superior, raw.inferior)
    }
}

impl From<EventPair> for RawEventPair {
    fn from(pair: EventPair) -> Self {
        Self {
            superior: pair.superior,
            inferior: pair.inferior,
        }
    }
}

/// Whether an analysis targets the present or a past date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Live,
    Historical,
}

impl Mode {
    /// `Live` iff the reference date is today.
    pub fn for_reference(reference_date: NaiveDate, today: NaiveDate) -> Self {
        if reference_date == today {
            Mode::Live
        } else {
            Mode::Historical
        }
    }
}
