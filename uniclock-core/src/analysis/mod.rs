//! Pair analysis — selection, range extraction, overlap scoring, signals.
//!
//! [`analyze`] selects the governing pair, then [`analyze_pair`] extracts
//! the superior and inferior ranges, scores their overlap and derives the
//! three horizon signals from the superior range.
//!
//! Missing price data is not an error. A pair whose dates are past the end
//! of the series yields a result with `range1`/`range2` and the overlap
//! fields set to `None`, distinct from a computed `false` or zero.

pub mod extract;
pub mod overlap;
pub mod select;
pub mod signal;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AnalysisConfig;
use crate::domain::{EventPair, Mode, PriceSeries, Range};

pub use extract::{extract_range, extract_range_within};
pub use overlap::{analyze_overlap, Overlap};
pub use select::select_pair;
pub use signal::{derive_signals, HorizonSignal, SignalAction, TradeSignals};

/// Errors from [`analyze`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("no event pair covers {reference_date} (tolerance {tolerance_days} days)")]
    NoMatchingPair {
        reference_date: NaiveDate,
        tolerance_days: u32,
    },
    #[error("event-pair calendar is empty")]
    EmptyCalendar,
}

/// How a pair's prediction turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairOutcome {
    /// One or both ranges have no price data yet.
    Pending,
    /// The inferior range revisited the superior range.
    Confirmed,
    /// The inferior range missed the superior range.
    Missed,
}

impl std::fmt::Display for PairOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PairOutcome::Pending => write!(f, "pending"),
            PairOutcome::Confirmed => write!(f, "confirmed"),
            PairOutcome::Missed => write!(f, "missed"),
        }
    }
}

/// Output of one analysis call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub pair: EventPair,
    pub mode: Mode,
    pub current_price: Decimal,
    /// Range around the superior date (the predicted range).
    pub range1: Option<Range>,
    /// Range around the inferior date (the observed revisit).
    pub range2: Option<Range>,
    pub overlap: Option<bool>,
    pub overlap_pct: Option<Decimal>,
    /// Present whenever `range1` is.
    pub signals: Option<TradeSignals>,
}

impl AnalysisResult {
    pub fn outcome(&self) -> PairOutcome {
        match self.overlap {
            None => PairOutcome::Pending,
            Some(true) => PairOutcome::Confirmed,
            Some(false) => PairOutcome::Missed,
        }
    }

    pub fn is_live(&self) -> bool {
        self.mode == Mode::Live
    }
}

/// Select the pair governing `reference_date` and analyze it.
///
/// Live mode only fails on an empty calendar. Historical mode fails with
/// [`AnalysisError::NoMatchingPair`] when no pair covers the date.
pub fn analyze(
    pairs: &[EventPair],
    mode: Mode,
    reference_date: NaiveDate,
    series: &PriceSeries,
    current_price: Decimal,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let pair = select_pair(pairs, mode, reference_date, config)?;
    Ok(analyze_pair(pair, mode, series, current_price, config))
}

/// Analyze a known pair. Never fails; missing data shows up as `None` fields.
pub fn analyze_pair(
    pair: EventPair,
    mode: Mode,
    series: &PriceSeries,
    current_price: Decimal,
    config: &AnalysisConfig,
) -> AnalysisResult {
    let range1 = extract_range_within(series, pair.superior(), config.range_fallback_days);
    let range2 = extract_range_within(series, pair.inferior(), config.range_fallback_days);

    let overlap = match (&range1, &range2) {
        (Some(r1), Some(r2)) => Some(analyze_overlap(r1, r2)),
        _ => None,
    };
    let signals = range1
        .as_ref()
        .map(|r1| derive_signals(current_price, r1, config));

    AnalysisResult {
        pair,
        mode,
        current_price,
        range1,
        range2,
        overlap: overlap.map(|o| o.overlap),
        overlap_pct: overlap.and_then(|o| o.overlap_pct),
        signals,
    }
}
