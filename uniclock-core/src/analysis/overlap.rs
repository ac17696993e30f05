//! Overlap analyzer: does the inferior range revisit the superior range?

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::Range;

/// Overlap between a predicted range and an observed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlap {
    /// True iff the two high/low intervals intersect (touching counts).
    pub overlap: bool,
    /// Intersection width as a percentage of the predicted range's span.
    ///
    /// `None` when the ranges do not intersect or the predicted range has
    /// zero width. The intersection never exceeds the predicted range, so
    /// the value lies in `[0, 100]`; an observed range that contains the
    /// predicted one scores exactly 100.
    pub overlap_pct: Option<Decimal>,
}

/// Compare `predicted` (range1) against `observed` (range2).
///
/// The percentage is measured against `predicted`; swapping the arguments
/// keeps the boolean and changes the base.
pub fn analyze_overlap(predicted: &Range, observed: &Range) -> Overlap {
    let overlap = !(predicted.high < observed.low || observed.high < predicted.low);
    if !overlap {
        return Overlap {
            overlap,
            overlap_pct: None,
        };
    }

    if predicted.is_degenerate() {
        warn!(
            source_date = %predicted.source_date,
            price = %predicted.high,
            "zero-width predicted range, overlap percentage undefined"
        );
        return Overlap {
            overlap,
            overlap_pct: None,
        };
    }

    let width = predicted.high.min(observed.high) - predicted.low.max(observed.low);
    Overlap {
        overlap,
        overlap_pct: Some(width / predicted.span() * Decimal::ONE_HUNDRED),
    }
}
