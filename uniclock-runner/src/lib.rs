//! uniclock runner: price loading, multi-instrument runs, backtests, reports.
//!
//! This crate builds on `uniclock-core` to provide:
//! - CSV price-series loading with validation
//! - TOML run configuration (instruments, calendar, analysis settings)
//! - Single- and multi-instrument analysis with parallel execution
//! - Calendar backtests (overlap hit rate across elapsed pairs)
//! - JSON, CSV and Markdown export

pub mod backtest;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;

pub use backtest::{backtest_calendar, BacktestRow, BacktestSummary};
pub use config::{InstrumentConfig, RunConfig, RunConfigError};
pub use data_loader::{load_prices, read_prices, LoadError};
pub use export::{
    export_backtest_csv, export_backtest_json, export_json, export_markdown, export_run_json,
    import_json,
};
pub use runner::{
    analyze_instrument, run_analysis, AnalysisRequest, InstrumentFailure, InstrumentReport,
    RunError, RunSummary, UpcomingPair, SCHEMA_VERSION,
};
