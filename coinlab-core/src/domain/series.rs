//! Price series validation.
//!
//! A series must be non-empty and strictly increasing in timestamp. These are
//! the only data-shape problems that reject a run; bad prices or volumes on
//! individual bars are handled inside the loop.

use thiserror::Error;

use super::Bar;

/// Structural problems with an input price series.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("price series is empty")]
    Empty,
    #[error("timestamps go backwards at bar {index}")]
    NonMonotonic { index: usize },
    #[error("duplicate timestamp at bar {index}")]
    DuplicateTimestamp { index: usize },
}

/// Check that `bars` is non-empty and strictly ordered by timestamp.
pub fn validate_series(bars: &[Bar]) -> Result<(), SeriesError> {
    if bars.is_empty() {
        return Err(SeriesError::Empty);
    }
    for (i, pair) in bars.windows(2).enumerate() {
        let index = i + 1;
        match pair[1].timestamp.cmp(&pair[0].timestamp) {
            std::cmp::Ordering::Greater => {}
            std::cmp::Ordering::Equal => return Err(SeriesError::DuplicateTimestamp { index }),
            std::cmp::Ordering::Less => return Err(SeriesError::NonMonotonic { index }),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bars_at(offsets_hours: &[i64]) -> Vec<Bar> {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        offsets_hours
            .iter()
            .map(|&h| Bar {
                timestamp: base + Duration::hours(h),
                open: 10.0,
                high: 11.0,
                low: 9.0,
                close: 10.0,
                volume: 1.0,
            })
            .collect()
    }

    #[test]
    fn empty_series_rejected() {
        assert_eq!(validate_series(&[]), Err(SeriesError::Empty));
    }

    #[test]
    fn ordered_series_accepted() {
        assert!(validate_series(&bars_at(&[0, 1, 2, 5])).is_ok());
    }

    #[test]
    fn backwards_timestamp_rejected() {
        assert_eq!(
            validate_series(&bars_at(&[0, 2, 1])),
            Err(SeriesError::NonMonotonic { index: 2 })
        );
    }

    #[test]
    fn duplicate_timestamp_rejected() {
        assert_eq!(
            validate_series(&bars_at(&[0, 1, 1])),
            Err(SeriesError::DuplicateTimestamp { index: 2 })
        );
    }

    #[test]
    fn single_bar_accepted() {
        assert!(validate_series(&bars_at(&[0])).is_ok());
    }
}
