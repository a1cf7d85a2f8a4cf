//! Bar loading for the runner.
//!
//! Two sources:
//! 1. CSV candles with a `timestamp,open,high,low,close,volume` header
//! 2. Synthetic random-walk bars from a seeded RNG (demos and benchmarks)
//!
//! Loading does not validate ordering; the engine rejects bad series before
//! the first bar. Empty price or volume cells load as NaN so the engine can
//! skip them bar by bar.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;

use coinlab_core::domain::Bar;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unrecognised timestamp '{value}'")]
    Timestamp { row: usize, value: String },
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
}

/// Load bars from a CSV file.
pub fn load_bars_csv(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let bars = read_bars(file)?;
    tracing::info!(path = %path.display(), bars = bars.len(), "loaded bars");
    Ok(bars)
}

/// Parse bars from any CSV reader.
pub fn read_bars<R: Read>(reader: R) -> Result<Vec<Bar>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut bars = Vec::new();
    for (row, record) in rdr.deserialize::<CsvRow>().enumerate() {
        let record = record?;
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| LoadError::Timestamp {
            row: row + 1,
            value: record.timestamp.clone(),
        })?;
        let close = record.close.unwrap_or(f64::NAN);
        bars.push(Bar {
            timestamp,
            open: record.open.unwrap_or(close),
            high: record.high.unwrap_or(close),
            low: record.low.unwrap_or(close),
            close,
            volume: record.volume.unwrap_or(f64::NAN),
        });
    }
    Ok(bars)
}

/// Epoch milliseconds, RFC 3339, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD` (UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        let millis: i64 = value.parse().ok()?;
        return Utc.timestamp_millis_opt(millis).single();
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Hourly random-walk bars starting 2024-01-01, reproducible from `seed`.
pub fn synthetic_bars(n: usize, seed: u64) -> Vec<Bar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(seed);
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
    let Some(start) = start else {
        return Vec::new();
    };

    let mut bars = Vec::with_capacity(n);
    let mut price = 30_000.0_f64;
    for i in 0..n {
        let bar_return: f64 = rng.gen_range(-0.02..0.02);
        let open = price;
        let close = price * (1.0 + bar_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.005));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.005));
        let volume = rng.gen_range(50.0..500.0);
        bars.push(Bar {
            timestamp: start + Duration::hours(i as i64),
            open,
            high,
            low,
            close,
            volume,
        });
        price = close;
    }
    tracing::debug!(bars = n, seed, "generated synthetic bars");
    bars
}
