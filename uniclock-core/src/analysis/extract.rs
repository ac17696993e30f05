//! Range extractor: the high/low/close observed on or near a target date.
//!
//! Lookup order: the exact date first, then `date - 1`, `date + 1`,
//! `date - 2`, `date + 2`, ... out to the configured half-width. The first
//! date with any bar wins. Market holidays and weekends next to a pair
//! date are covered by the default half-width of one day.

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::domain::{PriceSeries, Range};

/// Default fallback half-width in days.
pub const DEFAULT_FALLBACK_DAYS: u32 = 1;

/// Range for `date` with the default ±1 day fallback window.
pub fn extract_range(series: &PriceSeries, date: NaiveDate) -> Option<Range> {
    extract_range_within(series, date, DEFAULT_FALLBACK_DAYS)
}

/// Range for `date`, searching up to `fallback_days` either side.
///
/// Returns `None` when no bar exists in the window, which is the normal
/// outcome for a date past the end of the series.
pub fn extract_range_within(
    series: &PriceSeries,
    date: NaiveDate,
    fallback_days: u32,
) -> Option<Range> {
    if let Some(range) = range_on(series, date) {
        return Some(range);
    }

    for offset in 1..=u64::from(fallback_days) {
        let days = Days::new(offset);
        // Candidates outside the representable calendar are skipped.
        for candidate in [date.checked_sub_days(days), date.checked_add_days(days)]
            .into_iter()
            .flatten()
        {
            if let Some(range) = range_on(series, candidate) {
                debug!(target_date = %date, source_date = %candidate, "range fallback hit");
                return Some(range);
            }
        }
    }

    debug!(target_date = %date, fallback_days, "no bars in range window");
    None
}

/// Aggregate every bar dated exactly `date`.
///
/// High/low are the extremes across the matching bars and close is the last
/// matching bar's close. Both high and low fields of each bar feed both
/// extremes, so `low <= high` holds even for an inverted bar.
fn range_on(series: &PriceSeries, date: NaiveDate) -> Option<Range> {
    series.bars_on(date).fold(None, |acc: Option<Range>, bar| {
        let bar_high = bar.high.max(bar.low);
        let bar_low = bar.low.min(bar.high);
        Some(match acc {
            None => Range {
                high: bar_high,
                low: bar_low,
                close: bar.close,
                source_date: date,
            },
            Some(r) => Range {
                high: r.high.max(bar_high),
                low: r.low.min(bar_low),
                close: bar.close,
                source_date: date,
            },
        })
    })
}
