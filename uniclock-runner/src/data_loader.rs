//! Price-series loading from CSV.
//!
//! Expected columns (header row required, case of the first letter free):
//! `date, open, high, low, close`. Extra columns such as `Adj Close` or
//! `Volume` are ignored, so a Yahoo Finance daily export loads as is.
//!
//! Rows are sorted by date after reading. Duplicate dates and bars with
//! `high < low` are rejected with the offending line number.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use uniclock_core::{PriceBar, PriceSeries};

/// Errors from the price loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open price file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {source}")]
    Csv {
        line: usize,
        #[source]
        source: csv::Error,
    },

    #[error("line {line}: bar on {date} has high below low")]
    InvalidBar { line: usize, date: NaiveDate },

    #[error("duplicate bar for {0}")]
    DuplicateDate(NaiveDate),

    #[error("price file contains no bars")]
    Empty,
}

/// One CSV row before validation.
#[derive(Debug, Deserialize)]
struct CsvBar {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Open", with = "rust_decimal::serde::str")]
    open: Decimal,
    #[serde(alias = "High", with = "rust_decimal::serde::str")]
    high: Decimal,
    #[serde(alias = "Low", with = "rust_decimal::serde::str")]
    low: Decimal,
    #[serde(alias = "Close", with = "rust_decimal::serde::str")]
    close: Decimal,
}

/// Load a price series from a CSV file.
pub fn load_prices(path: &Path) -> Result<PriceSeries, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let series = read_prices(file)?;
    debug!(path = %path.display(), bars = series.len(), "loaded price series");
    Ok(series)
}

/// Read a price series from any CSV source.
pub fn read_prices<R: Read>(reader: R) -> Result<PriceSeries, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (i, row) in rdr.deserialize::<CsvBar>().enumerate() {
        // Header is line 1.
        let line = i + 2;
        let row = row.map_err(|source| LoadError::Csv { line, source })?;
        let bar = PriceBar {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
        };
        if !bar.is_sane() {
            return Err(LoadError::InvalidBar {
                line,
                date: bar.date,
            });
        }
        bars.push(bar);
    }

    if bars.is_empty() {
        return Err(LoadError::Empty);
    }

    bars.sort_by_key(|b| b.date);
    if let Some(w) = bars.windows(2).find(|w| w[0].date == w[1].date) {
        return Err(LoadError::DuplicateDate(w[0].date));
    }

    Ok(PriceSeries::new(bars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn reads_lowercase_columns() {
        let csv = "date,open,high,low,close\n\
                   2025-01-02,15,20,10,18.5\n\
                   2025-01-03,18,19,17,17.25\n";
        let series = read_prices(csv.as_bytes()).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].high, dec!(20));
        assert_eq!(series.last_close(), Some(dec!(17.25)));
    }

    #[test]
    fn reads_yahoo_export_and_ignores_extra_columns() {
        let csv = "Date,Open,High,Low,Close,Adj Close,Volume\n\
                   2025-01-03,101.5,103.0,100.25,102.0,101.9,1200000\n\
                   2025-01-02,100.0,102.0,99.5,101.0,100.9,1100000\n";
        let series = read_prices(csv.as_bytes()).unwrap();
        // Sorted ascending on load
        assert_eq!(series.first_date(), Some(d("2025-01-02")));
        assert_eq!(series.bars()[1].low, dec!(100.25));
    }

    #[test]
    fn rejects_inverted_bar_with_line_number() {
        let csv = "date,open,high,low,close\n\
                   2025-01-02,15,20,10,18\n\
                   2025-01-03,15,9,10,9.5\n";
        let err = read_prices(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidBar { line: 3, .. }));
    }

    #[test]
    fn accepts_close_outside_extremes() {
        let csv = "date,open,high,low,close\n\
                   2025-01-02,15,20,10,20.5\n";
        let series = read_prices(csv.as_bytes()).unwrap();
        assert_eq!(series.last_close(), Some(dec!(20.5)));
    }

    #[test]
    fn rejects_duplicate_dates() {
        let csv = "date,open,high,low,close\n\
                   2025-01-02,15,20,10,18\n\
                   2025-01-02,15,20,10,18\n";
        let err = read_prices(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateDate(date) if date == d("2025-01-02")));
    }

    #[test]
    fn reports_unparseable_value() {
        let csv = "Date,Open,High,Low,Close\n\
                   2025-01-02,null,null,null,null\n";
        let err = read_prices(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Csv { line: 2, .. }));
    }

    #[test]
    fn empty_file_is_an_error() {
        let err = read_prices("date,open,high,low,close\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Empty));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_prices(Path::new("/nonexistent/prices.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/prices.csv"));
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IDBI.csv");
        std::fs::write(&path, "date,open,high,low,close\n2025-01-02,15,20,10,18\n").unwrap();
        let series = load_prices(&path).unwrap();
        assert_eq!(series.len(), 1);
    }
}
