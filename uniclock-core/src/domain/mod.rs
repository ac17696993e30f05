//! Domain types for uniclock

pub mod bar;
pub mod pair;
pub mod range;

pub use bar::{PriceBar, PriceSeries};
pub use pair::{EventPair, Mode, PairError};
pub use range::Range;
