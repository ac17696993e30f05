//! Calendar backtest — how often did the inferior range revisit the
//! superior range?
//!
//! Every pair whose inferior date is on or before the last bar of the
//! series is analyzed. Pairs with missing bars around either date count
//! as pending and are left out of the hit rate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use uniclock_core::{
    analyze_pair, AnalysisConfig, AnalysisResult, Mode, PairCalendar, PairOutcome, PriceSeries,
};

/// Per-pair row of a backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRow {
    pub outcome: PairOutcome,
    pub analysis: AnalysisResult,
}

/// Aggregate backtest statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub rows: Vec<BacktestRow>,
    pub confirmed: usize,
    pub missed: usize,
    pub pending: usize,
    /// `confirmed / (confirmed + missed) * 100`; `None` when nothing was verifiable.
    pub hit_rate_pct: Option<Decimal>,
    /// Mean overlap percentage over confirmed pairs with a defined percentage.
    pub mean_overlap_pct: Option<Decimal>,
}

impl BacktestSummary {
    pub fn evaluated(&self) -> usize {
        self.confirmed + self.missed
    }
}

/// Backtest every pair of `calendar` completed by the end of `series`.
///
/// Each pair is analyzed in Historical mode with the series' last close
/// as the reference price.
pub fn backtest_calendar(
    calendar: &PairCalendar,
    series: &PriceSeries,
    config: &AnalysisConfig,
) -> BacktestSummary {
    let (Some(last_date), Some(last_close)) = (series.last_date(), series.last_close()) else {
        return summarize(Vec::new());
    };

    let rows: Vec<BacktestRow> = calendar
        .completed_by(last_date)
        .into_iter()
        .map(|pair| {
            let analysis = analyze_pair(pair, Mode::Historical, series, last_close, config);
            BacktestRow {
                outcome: analysis.outcome(),
                analysis,
            }
        })
        .collect();

    let summary = summarize(rows);
    info!(
        confirmed = summary.confirmed,
        missed = summary.missed,
        pending = summary.pending,
        hit_rate_pct = ?summary.hit_rate_pct,
        "calendar backtest complete"
    );
    summary
}

fn summarize(rows: Vec<BacktestRow>) -> BacktestSummary {
    let count = |outcome| rows.iter().filter(|r| r.outcome == outcome).count();
    let confirmed = count(PairOutcome::Confirmed);
    let missed = count(PairOutcome::Missed);
    let pending = count(PairOutcome::Pending);

    let hit_rate_pct = match confirmed + missed {
        0 => None,
        n => Some(Decimal::from(confirmed) / Decimal::from(n) * Decimal::ONE_HUNDRED),
    };

    let pcts: Vec<Decimal> = rows
        .iter()
        .filter_map(|r| r.analysis.overlap_pct)
        .collect();
    let mean_overlap_pct = if pcts.is_empty() {
        None
    } else {
        Some(pcts.iter().copied().sum::<Decimal>() / Decimal::from(pcts.len()))
    };

    BacktestSummary {
        rows,
        confirmed,
        missed,
        pending,
        hit_rate_pct,
        mean_overlap_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uniclock_core::{EventPair, PriceBar};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn bar(date: &str, low: Decimal, high: Decimal) -> PriceBar {
        PriceBar {
            date: d(date),
            open: low,
            high,
            low,
            close: high,
        }
    }

    fn calendar() -> PairCalendar {
        PairCalendar::new(vec![
            EventPair::new(d("2025-01-02"), d("2025-02-03")).unwrap(),
            EventPair::new(d("2025-03-03"), d("2025-04-01")).unwrap(),
            EventPair::new(d("2025-05-01"), d("2025-06-02")).unwrap(),
            EventPair::new(d("2025-07-01"), d("2025-08-01")).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn counts_outcomes_and_hit_rate() {
        let series = PriceSeries::new(vec![
            bar("2025-01-02", dec!(10), dec!(20)),
            bar("2025-02-03", dec!(15), dec!(25)), // 50% overlap
            bar("2025-03-03", dec!(10), dec!(20)),
            bar("2025-04-01", dec!(30), dec!(40)), // miss
            // 2025-05-01 missing entirely -> pending
            bar("2025-06-02", dec!(10), dec!(20)),
            bar("2025-06-30", dec!(10), dec!(20)),
        ]);

        let summary = backtest_calendar(&calendar(), &series, &AnalysisConfig::default());

        // The 2025-07-01 pair ends after the last bar and is skipped.
        assert_eq!(summary.rows.len(), 3);
        assert_eq!(summary.confirmed, 1);
        assert_eq!(summary.missed, 1);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.evaluated(), 2);
        assert_eq!(summary.hit_rate_pct, Some(dec!(50)));
        assert_eq!(summary.mean_overlap_pct, Some(dec!(50)));
    }

    #[test]
    fn pair_ending_on_last_bar_is_included() {
        let series = PriceSeries::new(vec![
            bar("2025-01-02", dec!(10), dec!(20)),
            bar("2025-02-03", dec!(30), dec!(40)),
        ]);
        let summary = backtest_calendar(&calendar(), &series, &AnalysisConfig::default());
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.rows[0].analysis.pair.inferior(), d("2025-02-03"));
        assert_eq!(summary.missed, 1);
    }

    #[test]
    fn empty_series_yields_empty_summary() {
        let summary = backtest_calendar(
            &calendar(),
            &PriceSeries::default(),
            &AnalysisConfig::default(),
        );
        assert!(summary.rows.is_empty());
        assert_eq!(summary.hit_rate_pct, None);
        assert_eq!(summary.mean_overlap_pct, None);
    }

    #[test]
    fn all_pending_has_no_hit_rate() {
        let series = PriceSeries::new(vec![bar("2025-12-31", dec!(1), dec!(2))]);
        let summary = backtest_calendar(&calendar(), &series, &AnalysisConfig::default());
        assert_eq!(summary.pending, 4);
        assert_eq!(summary.hit_rate_pct, None);
    }
}
