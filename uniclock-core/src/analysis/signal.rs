//! Signal deriver: trade recommendations from price vs. the governing range.
//!
//! | Horizon    | Sell when                 | Buy when                  |
//! |------------|---------------------------|---------------------------|
//! | Intraday   | `price > high`            | `price < low`             |
//! | Short-term | `price > sell_threshold`  | `price < buy_threshold`   |
//! | Long-term  | same, with its own buffer | same, with its own buffer |
//!
//! Anything else is `HoldInside`. Targets are always the range boundary on
//! the far side of the move: Sell targets `high`, Buy targets `low`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, BufferRule};
use crate::domain::Range;

/// Categorical recommendation for one horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalAction {
    Sell,
    Buy,
    HoldInside,
}

impl std::fmt::Display for SignalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalAction::Sell => write!(f, "SELL"),
            SignalAction::Buy => write!(f, "BUY"),
            SignalAction::HoldInside => write!(f, "HOLD"),
        }
    }
}

/// Recommendation plus the numbers behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizonSignal {
    pub action: SignalAction,
    /// Range boundary to trade toward; `None` for `HoldInside`.
    pub target: Option<Decimal>,
    /// Sell and buy trigger levels for this horizon.
    pub sell_above: Decimal,
    pub buy_below: Decimal,
    /// Percentage move from the current price to `target`, relative to the
    /// current price. `None` for `HoldInside` or a zero price.
    pub move_to_target_pct: Option<Decimal>,
}

/// Signals for all three horizons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSignals {
    pub intraday: HorizonSignal,
    pub short_term: HorizonSignal,
    pub long_term: HorizonSignal,
}

/// Derive all three horizons from `price` and the governing range.
pub fn derive_signals(price: Decimal, range: &Range, config: &AnalysisConfig) -> TradeSignals {
    TradeSignals {
        intraday: horizon_signal(price, range, range.high, range.low),
        short_term: buffered_signal(price, range, &config.short_term),
        long_term: buffered_signal(price, range, &config.long_term),
    }
}

fn buffered_signal(price: Decimal, range: &Range, rule: &BufferRule) -> HorizonSignal {
    horizon_signal(
        price,
        range,
        rule.sell_threshold(range),
        rule.buy_threshold(range),
    )
}

fn horizon_signal(
    price: Decimal,
    range: &Range,
    sell_above: Decimal,
    buy_below: Decimal,
) -> HorizonSignal {
    let (action, target) = if price > sell_above {
        (SignalAction::Sell, Some(range.high))
    } else if price < buy_below {
        (SignalAction::Buy, Some(range.low))
    } else {
        (SignalAction::HoldInside, None)
    };

    let move_to_target_pct = target
        .filter(|_| !price.is_zero())
        .map(|t| (t - price).abs() / price.abs() * Decimal::ONE_HUNDRED);

    HorizonSignal {
        action,
        target,
        sell_above,
        buy_below,
        move_to_target_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn range() -> Range {
        Range {
            high: dec!(20),
            low: dec!(10),
            close: dec!(15),
            source_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        }
    }

    fn config(k1: Decimal, k2: Decimal) -> AnalysisConfig {
        AnalysisConfig {
            short_term: BufferRule::SpanMultiple { k: k1 },
            long_term: BufferRule::SpanMultiple { k: k2 },
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn short_term_sell_beyond_buffer() {
        let s = derive_signals(dec!(23), &range(), &config(dec!(0.2), dec!(0.2)));
        assert_eq!(s.short_term.action, SignalAction::Sell);
        assert_eq!(s.short_term.target, Some(dec!(20)));
        assert_eq!(s.short_term.sell_above, dec!(22));
    }

    #[test]
    fn short_term_holds_inside_buffer() {
        let s = derive_signals(dec!(21), &range(), &config(dec!(0.2), dec!(0.2)));
        assert_eq!(s.short_term.action, SignalAction::HoldInside);
        assert_eq!(s.short_term.target, None);
        assert_eq!(s.short_term.move_to_target_pct, None);
    }

    #[test]
    fn intraday_has_no_buffer() {
        let cfg = config(dec!(0.2), dec!(0.2));
        let inside = derive_signals(dec!(19), &range(), &cfg);
        assert_eq!(inside.intraday.action, SignalAction::HoldInside);

        let above = derive_signals(dec!(21), &range(), &cfg);
        assert_eq!(above.intraday.action, SignalAction::Sell);
        assert_eq!(above.intraday.target, Some(dec!(20)));
    }

    #[test]
    fn boundaries_are_not_signals() {
        let cfg = config(dec!(0.2), dec!(0.2));
        assert_eq!(derive_signals(dec!(20), &range(), &cfg).intraday.action, SignalAction::HoldInside);
        assert_eq!(derive_signals(dec!(10), &range(), &cfg).intraday.action, SignalAction::HoldInside);
        assert_eq!(derive_signals(dec!(22), &range(), &cfg).short_term.action, SignalAction::HoldInside);
        assert_eq!(derive_signals(dec!(8), &range(), &cfg).short_term.action, SignalAction::HoldInside);
    }

    #[test]
    fn buy_below_range() {
        let s = derive_signals(dec!(5), &range(), &config(dec!(0.2), dec!(0.3)));
        assert_eq!(s.intraday.action, SignalAction::Buy);
        assert_eq!(s.short_term.action, SignalAction::Buy);
        assert_eq!(s.long_term.action, SignalAction::Buy);
        assert_eq!(s.long_term.target, Some(dec!(10)));
        assert_eq!(s.long_term.move_to_target_pct, Some(dec!(100)));
    }

    #[test]
    fn long_term_uses_its_own_multiplier() {
        // Short-term fires above 22, long-term only above 23.
        let s = derive_signals(dec!(22.5), &range(), &config(dec!(0.2), dec!(0.3)));
        assert_eq!(s.short_term.action, SignalAction::Sell);
        assert_eq!(s.long_term.action, SignalAction::HoldInside);
    }

    #[test]
    fn percent_buffer_variant() {
        let cfg = AnalysisConfig {
            short_term: BufferRule::BoundaryPercent { pct: dec!(3) },
            ..AnalysisConfig::default()
        };
        assert_eq!(derive_signals(dec!(20.5), &range(), &cfg).short_term.action, SignalAction::HoldInside);
        assert_eq!(derive_signals(dec!(20.7), &range(), &cfg).short_term.action, SignalAction::Sell);
        assert_eq!(derive_signals(dec!(9.6), &range(), &cfg).short_term.action, SignalAction::Buy);
    }

    #[test]
    fn move_to_target_relative_to_price() {
        let s = derive_signals(dec!(25), &range(), &AnalysisConfig::default());
        assert_eq!(s.intraday.move_to_target_pct, Some(dec!(20)));
    }

    #[test]
    fn zero_price_has_no_move_pct() {
        let s = derive_signals(Decimal::ZERO, &range(), &AnalysisConfig::default());
        assert_eq!(s.intraday.action, SignalAction::Buy);
        assert_eq!(s.intraday.move_to_target_pct, None);
    }
}
