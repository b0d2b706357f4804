//! TimeSeries — the normalized daily close series produced by every source.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::provider::DataSource;

/// One trading day's closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("time series has no points")]
    Empty,

    #[error("points out of order: {current} does not follow {previous}")]
    OutOfOrder {
        previous: NaiveDate,
        current: NaiveDate,
    },
}

/// Daily closes for a single ticker, strictly ascending by date.
///
/// Construction validates ordering but never re-sorts, so the points read back
/// are exactly the points handed in. There are no mutating methods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    points: Vec<PricePoint>,
    source: DataSource,
}

impl TimeSeries {
    pub fn new(points: Vec<PricePoint>, source: DataSource) -> Result<Self, SeriesError> {
        if points.is_empty() {
            return Err(SeriesError::Empty);
        }
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::OutOfOrder {
                    previous: pair[0].date,
                    current: pair[1].date,
                });
            }
        }
        Ok(Self { points, source })
    }

    /// Build a series from `(date, close)` pairs.
    pub fn from_pairs<I>(pairs: I, source: DataSource) -> Result<Self, SeriesError>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let points = pairs
            .into_iter()
            .map(|(date, close)| PricePoint::new(date, close))
            .collect();
        Self::new(points, source)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn pairs(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points.iter().map(|p| (p.date, p.close))
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    /// At least 1; construction rejects empty input.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn first(&self) -> &PricePoint {
        &self.points[0]
    }

    pub fn last(&self) -> &PricePoint {
        &self.points[self.points.len() - 1]
    }

    /// The first `n` points (fewer if the series is shorter).
    pub fn head(&self, n: usize) -> &[PricePoint] {
        &self.points[..n.min(self.points.len())]
    }

    /// Inclusive date span covered by the series.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        (self.first().date, self.last().date)
    }

    /// Lowest and highest close, ignoring NaN.
    pub fn close_range(&self) -> (f64, f64) {
        self.points
            .iter()
            .map(|p| p.close)
            .filter(|c| !c.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
                (lo.min(c), hi.max(c))
            })
    }
}

/// Collapse runs of points sharing a calendar date, keeping the latest one.
///
/// Yahoo occasionally reports the in-progress session next to the completed
/// bar for the same day. Order is otherwise untouched.
pub fn collapse_same_day(points: Vec<PricePoint>) -> Vec<PricePoint> {
    let mut out: Vec<PricePoint> = Vec::with_capacity(points.len());
    for point in points {
        match out.last_mut() {
            Some(prev) if prev.date == point.date => *prev = point,
            _ => out.push(point),
        }
    }
    out
}
