//! Range — the high/low/close observed around one date.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price range observed on `source_date`. Always `low <= high`.
///
/// Only the range extractor builds these, and only from existing bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// The date whose bars produced the range (may differ from the
    /// requested date when the fallback window was used).
    pub source_date: NaiveDate,
}

impl Range {
    /// `high - low`.
    pub fn span(&self) -> Decimal {
        self.high - self.low
    }

    /// Zero-width range; overlap percentages against it are undefined.
    pub fn is_degenerate(&self) -> bool {
        self.high == self.low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn range(low: Decimal, high: Decimal) -> Range {
        Range {
            high,
            low,
            close: low,
            source_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        }
    }

    #[test]
    fn span_of_regular_range() {
        let r = range(dec!(10), dec!(20));
        assert_eq!(r.span(), dec!(10));
        assert!(!r.is_degenerate());
    }

    #[test]
    fn zero_width_is_degenerate() {
        assert!(range(dec!(10), dec!(10)).is_degenerate());
    }
}
