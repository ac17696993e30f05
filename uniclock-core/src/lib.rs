//! uniclock core — event-pair range forecasting engine.
//!
//! This crate contains the decision logic of the method:
//! - Domain types (price bars and series, event pairs, ranges, mode)
//! - The event-pair calendar
//! - Range extraction with a holiday/weekend fallback window
//! - Pair selection for Live and Historical analysis
//! - Overlap scoring between the superior and inferior ranges
//! - Intraday / short-term / long-term trade signals
//!
//! Everything here is synchronous and pure: inputs are borrowed read-only,
//! results are freshly allocated, and nothing is cached between calls.

pub mod analysis;
pub mod calendar;
pub mod config;
pub mod domain;

pub use analysis::{
    analyze, analyze_pair, AnalysisError, AnalysisResult, HorizonSignal, PairOutcome,
    SignalAction, TradeSignals,
};
pub use calendar::{CalendarError, PairCalendar};
pub use config::{AnalysisConfig, BufferRule, ConfigError};
pub use domain::{EventPair, Mode, PairError, PriceBar, PriceSeries, Range};
