//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: one row per backtested pair for spreadsheet analysis
//! - **Markdown**: human-readable single-instrument report
//!
//! Persisted reports carry a `schema_version`; newer versions are rejected on load.

use anyhow::{bail, Context, Result};
use uniclock_core::{HorizonSignal, PairOutcome, Range, SignalAction};

use crate::backtest::BacktestSummary;
use crate::runner::{InstrumentReport, RunSummary, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an `InstrumentReport` to pretty JSON.
pub fn export_json(report: &InstrumentReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize InstrumentReport to JSON")
}

/// Deserialize an `InstrumentReport`, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<InstrumentReport> {
    let report: InstrumentReport =
        serde_json::from_str(json).context("failed to deserialize InstrumentReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

/// Serialize a multi-instrument run to pretty JSON.
pub fn export_run_json(summary: &RunSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("failed to serialize RunSummary to JSON")
}

/// Serialize a backtest summary to pretty JSON.
pub fn export_backtest_json(summary: &BacktestSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("failed to serialize BacktestSummary to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export backtest rows as CSV.
///
/// Columns: superior, inferior, interval_days, range1_low, range1_high,
/// range2_low, range2_high, overlap, overlap_pct, outcome.
/// Absent values are empty cells.
pub fn export_backtest_csv(summary: &BacktestSummary) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "superior",
        "inferior",
        "interval_days",
        "range1_low",
        "range1_high",
        "range2_low",
        "range2_high",
        "overlap",
        "overlap_pct",
        "outcome",
    ])?;

    for row in &summary.rows {
        let a = &row.analysis;
        let (r1_low, r1_high) = range_cells(a.range1.as_ref());
        let (r2_low, r2_high) = range_cells(a.range2.as_ref());
        wtr.write_record([
            a.pair.superior().to_string(),
            a.pair.inferior().to_string(),
            a.pair.interval_days().to_string(),
            r1_low,
            r1_high,
            r2_low,
            r2_high,
            a.overlap.map(|o| o.to_string()).unwrap_or_default(),
            a.overlap_pct
                .map(|p| format!("{:.2}", p))
                .unwrap_or_default(),
            row.outcome.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

fn range_cells(range: Option<&Range>) -> (String, String) {
    match range {
        Some(r) => (r.low.to_string(), r.high.to_string()),
        None => (String::new(), String::new()),
    }
}

// ─── Markdown export ────────────────────────────────────────────────

/// Human-readable report for one instrument.
pub fn export_markdown(report: &InstrumentReport) -> String {
    let a = &report.analysis;
    let mut md = String::with_capacity(2048);

    let mode = if a.is_live() { "Live" } else { "Historical" };
    md.push_str(&format!(
        "# {} — {} analysis as of {}\n\n",
        report.symbol, mode, report.reference_date
    ));
    md.push_str(&format!("Current price: {:.2}\n\n", a.current_price));

    // Pair
    md.push_str("## Pair\n\n");
    md.push_str("| | Date | Low | High |\n");
    md.push_str("|---|---|---|---|\n");
    md.push_str(&format!(
        "| Superior #1 | {} | {} |\n",
        a.pair.superior(),
        range_md(a.range1.as_ref())
    ));
    md.push_str(&format!(
        "| Inferior #2 | {} | {} |\n",
        a.pair.inferior(),
        range_md(a.range2.as_ref())
    ));
    md.push('\n');
    md.push_str(&format!("Interval: {} days\n\n", a.pair.interval_days()));

    // Outcome
    md.push_str("## Outcome\n\n");
    match (a.outcome(), a.overlap_pct) {
        (PairOutcome::Confirmed, Some(pct)) => {
            md.push_str(&format!("Overlap: {:.1}% of the superior range\n", pct));
        }
        (PairOutcome::Confirmed, None) => {
            md.push_str("Overlap: yes (superior range has zero width)\n");
        }
        (PairOutcome::Missed, _) => md.push_str("No overlap\n"),
        (PairOutcome::Pending, _) => {
            md.push_str(&format!(
                "Pending: price is expected to return to the superior range by {}\n",
                a.pair.inferior()
            ));
        }
    }
    md.push('\n');

    // Trade plans
    md.push_str("## Trade plans\n\n");
    match &a.signals {
        Some(s) => {
            md.push_str("| Horizon | Action | Target | Move | Sell above | Buy below |\n");
            md.push_str("|---|---|---|---|---|---|\n");
            for (name, sig) in [
                ("Intraday", &s.intraday),
                ("Short-term", &s.short_term),
                ("Long-term", &s.long_term),
            ] {
                md.push_str(&signal_row(name, sig));
                md.push('\n');
            }
        }
        None => md.push_str("Superior date not in price history yet.\n"),
    }

    if !report.upcoming.is_empty() {
        md.push_str("\n## Upcoming pairs\n\n");
        for up in &report.upcoming {
            md.push_str(&format!(
                "- {} → {} ({} days)\n",
                up.pair.superior(),
                up.pair.inferior(),
                up.interval_days
            ));
        }
    }

    md
}

fn range_md(range: Option<&Range>) -> String {
    match range {
        Some(r) => format!("{:.2} | {:.2}", r.low, r.high),
        None => "— | —".to_string(),
    }
}

fn signal_row(name: &str, sig: &HorizonSignal) -> String {
    let target = sig.target.map(|t| format!("{:.2}", t)).unwrap_or_else(|| "—".into());
    let movement = sig
        .move_to_target_pct
        .map(|p| format!("{:.1}%", p))
        .unwrap_or_else(|| "—".into());
    format!(
        "| {} | {} | {} | {} | {:.2} | {:.2} |",
        name,
        action_label(sig.action),
        target,
        movement,
        sig.sell_above,
        sig.buy_below
    )
}

fn action_label(action: SignalAction) -> &'static str {
    match action {
        SignalAction::Sell => "SELL",
        SignalAction::Buy => "BUY",
        SignalAction::HoldInside => "HOLD (inside range)",
    }
}
