//! Analysis runner — wires price loading, the calendar and the core engine.
//!
//! Two entry points:
//! - `analyze_instrument()`: pre-loaded series, one instrument, no I/O.
//! - `run_analysis()`: every instrument of a `RunConfig`, loaded from CSV
//!   and analyzed in parallel. A failing instrument does not stop the rest.

use chrono::NaiveDate;
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use uniclock_core::analysis::extract_range_within;
use uniclock_core::{
    analyze, AnalysisConfig, AnalysisError, AnalysisResult, EventPair, Mode, PairCalendar,
    PriceSeries, Range,
};

use crate::config::{InstrumentConfig, RunConfig};
use crate::data_loader::{load_prices, LoadError};

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Number of upcoming cycles listed for the long-term horizon.
pub const UPCOMING_PAIRS: usize = 3;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("data error: {0}")]
    Load(#[from] LoadError),
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("no price available for '{0}' (empty series and no quote)")]
    NoPrice(String),
}

/// What to analyze and as of when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub today: NaiveDate,
    /// Defaults to `today`, which selects Live mode.
    pub reference_date: Option<NaiveDate>,
    /// Defaults to the last close of the series.
    pub current_price: Option<Decimal>,
}

impl AnalysisRequest {
    pub fn live(today: NaiveDate) -> Self {
        Self {
            today,
            reference_date: None,
            current_price: None,
        }
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date.unwrap_or(self.today)
    }

    pub fn mode(&self) -> Mode {
        Mode::for_reference(self.reference_date(), self.today)
    }
}

/// A cycle that has not started yet, with its range if bars already exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingPair {
    pub pair: EventPair,
    pub interval_days: i64,
    pub range1: Option<Range>,
}

/// Full result for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub symbol: String,
    pub today: NaiveDate,
    pub reference_date: NaiveDate,
    pub bar_count: usize,
    pub last_bar_date: Option<NaiveDate>,
    pub analysis: AnalysisResult,
    pub upcoming: Vec<UpcomingPair>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// An instrument that could not be analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentFailure {
    pub symbol: String,
    pub error: String,
}

/// Outcome of a multi-instrument run, in config order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub reports: Vec<InstrumentReport>,
    pub failures: Vec<InstrumentFailure>,
}

impl RunSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Analyze one instrument from an already-loaded series. No I/O.
pub fn analyze_instrument(
    symbol: &str,
    series: &PriceSeries,
    calendar: &PairCalendar,
    request: &AnalysisRequest,
    config: &AnalysisConfig,
) -> Result<InstrumentReport, RunError> {
    let current_price = request
        .current_price
        .or_else(|| series.last_close())
        .ok_or_else(|| RunError::NoPrice(symbol.to_string()))?;

    let reference_date = request.reference_date();
    let analysis = analyze(
        calendar.pairs(),
        request.mode(),
        reference_date,
        series,
        current_price,
        config,
    )?;

    let upcoming = calendar
        .upcoming(request.today, UPCOMING_PAIRS)
        .into_iter()
        .map(|pair| UpcomingPair {
            pair,
            interval_days: pair.interval_days(),
            range1: extract_range_within(series, pair.superior(), config.range_fallback_days),
        })
        .collect();

    Ok(InstrumentReport {
        schema_version: SCHEMA_VERSION,
        symbol: symbol.to_string(),
        today: request.today,
        reference_date,
        bar_count: series.len(),
        last_bar_date: series.last_date(),
        analysis,
        upcoming,
    })
}

/// Load and analyze every instrument in `config` in parallel.
pub fn run_analysis(config: &RunConfig, calendar: &PairCalendar, today: NaiveDate) -> RunSummary {
    info!(
        instruments = config.instruments.len(),
        pairs = calendar.len(),
        %today,
        "starting analysis run"
    );

    let outcomes: Vec<(String, Result<InstrumentReport, RunError>)> = config
        .instruments
        .par_iter()
        .map(|inst| {
            let result = run_instrument(inst, config, calendar, today);
            (inst.symbol.clone(), result)
        })
        .collect();

    let mut summary = RunSummary::default();
    for (symbol, result) in outcomes {
        match result {
            Ok(report) => summary.reports.push(report),
            Err(e) => {
                warn!(%symbol, error = %e, "instrument analysis failed");
                summary.failures.push(InstrumentFailure {
                    symbol,
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        succeeded = summary.reports.len(),
        failed = summary.failures.len(),
        "analysis run complete"
    );
    summary
}

fn run_instrument(
    inst: &InstrumentConfig,
    config: &RunConfig,
    calendar: &PairCalendar,
    today: NaiveDate,
) -> Result<InstrumentReport, RunError> {
    let series = load_prices(&inst.prices)?;
    let request = AnalysisRequest {
        today,
        reference_date: config.reference_date,
        current_price: inst.current_price,
    };
    analyze_instrument(&inst.symbol, &series, calendar, &request, &config.analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uniclock_core::{PairOutcome, PriceBar};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series() -> PriceSeries {
        let bar = |date: &str, low, high, close| PriceBar {
            date: d(date),
            open: close,
            high,
            low,
            close,
        };
        PriceSeries::new(vec![
            bar("2025-09-12", dec!(75), dec!(85), dec!(80)),
            bar("2025-11-20", dec!(78), dec!(88), dec!(82)),
            bar("2025-12-01", dec!(90), dec!(95), dec!(93)),
        ])
    }

    #[test]
    fn request_defaults_to_live_today() {
        let req = AnalysisRequest::live(d("2025-12-01"));
        assert_eq!(req.reference_date(), d("2025-12-01"));
        assert_eq!(req.mode(), Mode::Live);

        let hist = AnalysisRequest {
            reference_date: Some(d("2025-10-01")),
            ..req
        };
        assert_eq!(hist.mode(), Mode::Historical);
    }

    #[test]
    fn live_report_uses_last_close() {
        let report = analyze_instrument(
            "IDBI.NS",
            &series(),
            &PairCalendar::builtin(),
            &AnalysisRequest::live(d("2025-12-01")),
            &AnalysisConfig::default(),
        )
        .unwrap();

        assert_eq!(report.analysis.current_price, dec!(93));
        assert_eq!(report.analysis.pair.superior(), d("2025-09-13"));
        assert_eq!(report.analysis.outcome(), PairOutcome::Confirmed);
        assert_eq!(report.bar_count, 3);
        assert_eq!(report.last_bar_date, Some(d("2025-12-01")));
        // Only the 2025-12-30 cycle is still ahead.
        assert_eq!(report.upcoming.len(), 1);
        assert!(report.upcoming[0].range1.is_none());
        assert_eq!(report.upcoming[0].interval_days, 38);
    }

    #[test]
    fn explicit_quote_overrides_last_close() {
        let request = AnalysisRequest {
            current_price: Some(dec!(70)),
            ..AnalysisRequest::live(d("2025-12-01"))
        };
        let report = analyze_instrument(
            "IDBI.NS",
            &series(),
            &PairCalendar::builtin(),
            &request,
            &AnalysisConfig::default(),
        )
        .unwrap();
        let signals = report.analysis.signals.unwrap();
        assert_eq!(signals.intraday.target, Some(dec!(75)));
    }

    #[test]
    fn empty_series_without_quote_fails() {
        let err = analyze_instrument(
            "EMPTY",
            &PriceSeries::default(),
            &PairCalendar::builtin(),
            &AnalysisRequest::live(d("2025-12-01")),
            &AnalysisConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RunError::NoPrice(s) if s == "EMPTY"));
    }

    #[test]
    fn historical_gap_surfaces_analysis_error() {
        let request = AnalysisRequest {
            reference_date: Some(d("2025-02-01")),
            ..AnalysisRequest::live(d("2025-12-01"))
        };
        let err = analyze_instrument(
            "IDBI.NS",
            &series(),
            &PairCalendar::builtin(),
            &request,
            &AnalysisConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RunError::Analysis(AnalysisError::NoMatchingPair { .. })
        ));
    }
}
