//! Price bars and the per-instrument price series.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Daily OHLC bar for one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl PriceBar {
    /// `low <= high`. Open and close are not checked.
    pub fn is_sane(&self) -> bool {
        self.low <= self.high
    }
}

/// Ascending-by-date sequence of bars for a single instrument.
///
/// The series is supplied by a market-data collaborator and treated as
/// read-only by every analysis. A missing date means no trading occurred;
/// it is never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Wrap bars that are already in ascending date order.
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self { bars }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// All bars dated exactly `date`, in series order.
    pub fn bars_on(&self, date: NaiveDate) -> impl Iterator<Item = &PriceBar> {
        self.bars.iter().filter(move |b| b.date == date)
    }

    /// The most recent bar.
    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Close of the most recent bar, used as the current price when the
    /// caller has no live quote.
    pub fn last_close(&self) -> Option<Decimal> {
        self.latest().map(|b| b.close)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}
