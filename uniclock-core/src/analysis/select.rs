//! Pair selector: which event pair governs a reference date.
//!
//! - **Live**: newest to oldest, first pair with
//!   `superior <= date <= inferior + live_grace_window_days`. When nothing
//!   matches, the last pair in the sequence is returned, so Live mode never
//!   fails on a non-empty calendar.
//! - **Historical**: oldest to newest, first pair with
//!   `superior <= date <= inferior + historical_tolerance_days`. When
//!   nothing matches the call fails with [`AnalysisError::NoMatchingPair`].
//!
//! Containment is the only criterion; scan order breaks ties.

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::AnalysisError;
use crate::config::AnalysisConfig;
use crate::domain::{EventPair, Mode};

/// Pick the governing pair. `pairs` must be ascending by superior date.
pub fn select_pair(
    pairs: &[EventPair],
    mode: Mode,
    reference_date: NaiveDate,
    config: &AnalysisConfig,
) -> Result<EventPair, AnalysisError> {
    let slack = config.slack_days(mode);
    match mode {
        Mode::Live => select_live(pairs, reference_date, slack),
        Mode::Historical => select_historical(pairs, reference_date, slack),
    }
}

fn select_live(
    pairs: &[EventPair],
    reference_date: NaiveDate,
    grace_days: u32,
) -> Result<EventPair, AnalysisError> {
    if let Some(pair) = pairs
        .iter()
        .rev()
        .find(|p| p.contains(reference_date, grace_days))
    {
        debug!(%pair, %reference_date, grace_days, "live pair selected");
        return Ok(*pair);
    }

    let last = pairs.last().ok_or(AnalysisError::EmptyCalendar)?;
    warn!(
        pair = %last,
        %reference_date,
        grace_days,
        "no pair covers reference date, falling back to latest pair"
    );
    Ok(*last)
}

fn select_historical(
    pairs: &[EventPair],
    reference_date: NaiveDate,
    tolerance_days: u32,
) -> Result<EventPair, AnalysisError> {
    if pairs.is_empty() {
        return Err(AnalysisError::EmptyCalendar);
    }
    let pair = pairs
        .iter()
        .find(|p| p.contains(reference_date, tolerance_days))
        .copied()
        .ok_or(AnalysisError::NoMatchingPair {
            reference_date,
            tolerance_days,
        })?;
    debug!(%pair, %reference_date, tolerance_days, "historical pair selected");
    Ok(pair)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn pair(s: &str, i: &str) -> EventPair {
        EventPair::new(d(s), d(i)).unwrap()
    }

    fn calendar() -> Vec<EventPair> {
        vec![
            pair("2024-06-14", "2024-08-05"),
            pair("2024-08-28", "2024-10-29"),
            pair("2025-05-30", "2025-07-29"),
            pair("2025-09-13", "2025-11-20"),
            pair("2025-12-30", "2026-02-06"),
        ]
    }

    #[test]
    fn live_picks_pair_inside_window() {
        let config = AnalysisConfig::default();
        let p = select_pair(&calendar(), Mode::Live, d("2025-10-01"), &config).unwrap();
        assert_eq!(p, pair("2025-09-13", "2025-11-20"));
    }

    #[test]
    fn live_grace_window_extends_past_inferior() {
        let config = AnalysisConfig::default(); // 30 days grace
        let p = select_pair(&calendar(), Mode::Live, d("2025-12-10"), &config).unwrap();
        assert_eq!(p, pair("2025-09-13", "2025-11-20"));
    }

    #[test]
    fn live_prefers_most_recent_when_windows_overlap() {
        // 2024-09-01 is inside the first pair's grace window and the second pair.
        let config = AnalysisConfig::default();
        let p = select_pair(&calendar(), Mode::Live, d("2024-09-01"), &config).unwrap();
        assert_eq!(p, pair("2024-08-28", "2024-10-29"));
    }

    #[test]
    fn live_falls_back_to_last_pair() {
        let config = AnalysisConfig::default();
        let p = select_pair(&calendar(), Mode::Live, d("2030-01-01"), &config).unwrap();
        assert_eq!(p, pair("2025-12-30", "2026-02-06"));

        let p = select_pair(&calendar(), Mode::Live, d("2020-01-01"), &config).unwrap();
        assert_eq!(p, pair("2025-12-30", "2026-02-06"));
    }

    #[test]
    fn live_handles_pair_ending_at_max_date() {
        let last = EventPair::new(NaiveDate::MAX - chrono::Days::new(10), NaiveDate::MAX).unwrap();
        let config = AnalysisConfig::default();

        let p = select_pair(&[last], Mode::Live, d("2025-01-01"), &config).unwrap();
        assert_eq!(p, last);
        let p = select_pair(&[last], Mode::Live, NaiveDate::MAX, &config).unwrap();
        assert_eq!(p, last);
    }

    #[test]
    fn historical_picks_earliest_eligible() {
        let config = AnalysisConfig {
            historical_tolerance_days: 25,
            ..AnalysisConfig::default()
        };
        // Inside the first pair's tolerance and the second pair proper.
        let p = select_pair(&calendar(), Mode::Historical, d("2024-08-29"), &config).unwrap();
        assert_eq!(p, pair("2024-06-14", "2024-08-05"));
    }

    #[test]
    fn historical_without_match_fails() {
        let config = AnalysisConfig::default();
        let err = select_pair(&calendar(), Mode::Historical, d("2025-01-15"), &config).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::NoMatchingPair { reference_date, tolerance_days: 0 }
                if reference_date == d("2025-01-15")
        ));
    }

    #[test]
    fn historical_tolerance_is_inclusive() {
        let config = AnalysisConfig {
            historical_tolerance_days: 3,
            ..AnalysisConfig::default()
        };
        assert!(select_pair(&calendar(), Mode::Historical, d("2024-08-08"), &config).is_ok());
        assert!(select_pair(&calendar(), Mode::Historical, d("2024-08-09"), &config).is_err());
    }

    #[test]
    fn empty_calendar_is_an_error_in_both_modes() {
        let config = AnalysisConfig::default();
        for mode in [Mode::Live, Mode::Historical] {
            let err = select_pair(&[], mode, d("2025-01-01"), &config).unwrap_err();
            assert!(matches!(err, AnalysisError::EmptyCalendar));
        }
    }
}
