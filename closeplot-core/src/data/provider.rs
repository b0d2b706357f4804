//! Price source traits, progress reporting, and structured error types.
//!
//! `PriceSource` abstracts over the two retrieval paths (the managed Yahoo
//! library and the raw chart endpoint) so the orchestrator can be driven by
//! mocks in tests. `BarProvider` is the narrower seam under the primary source:
//! one call, one answer, no retry.

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::request::{FetchRequest, RequestError};
use crate::series::{SeriesError, TimeSeries};

/// How the primary source ran out of attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exhaustion {
    /// Every attempt came back with zero rows.
    Empty,
    /// The final attempt failed with this reason.
    Error(String),
}

impl fmt::Display for Exhaustion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exhaustion::Empty => write!(f, "provider returned no data"),
            Exhaustion::Error(reason) => write!(f, "last error: {reason}"),
        }
    }
}

/// Structured error types for data operations.
///
/// Every failure inside a source ends up as one of these values; nothing is
/// allowed to escape a source as a panic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("provider error: {0}")]
    Provider(String),

    #[error("empty result for {ticker}")]
    EmptyResult { ticker: String },

    #[error("gave up after {attempts} attempts ({last})")]
    PrimaryExhausted { attempts: u32, last: Exhaustion },

    #[error("invalid response structure: {0}")]
    InvalidResponseShape(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status} from chart endpoint")]
    HttpStatus { status: u16 },

    #[error("all sources failed (primary: {primary}; fallback: {fallback})")]
    AllSourcesFailed {
        primary: Box<DataError>,
        fallback: Box<DataError>,
    },

    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    /// The managed `yahoo_finance_api` client.
    YahooLibrary,
    /// The raw Yahoo chart JSON endpoint.
    ChartApi,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::YahooLibrary => write!(f, "yahoo_finance_api"),
            DataSource::ChartApi => write!(f, "chart endpoint"),
        }
    }
}

/// A complete retrieval path: request in, normalized series or failure out.
pub trait PriceSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch daily closes for the request's ticker and lookback window.
    fn fetch(
        &self,
        request: &FetchRequest,
        progress: &dyn FetchProgress,
    ) -> Result<TimeSeries, DataError>;
}

/// One daily bar as handed back by the managed provider, still timezone-aware.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderBar {
    pub timestamp: DateTime<FixedOffset>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// The managed data provider: a single request for daily bars over a range.
pub trait BarProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Daily bars for `ticker` between `start` and `end`. An empty vector is a
    /// valid answer here; the caller decides what empty means.
    fn daily_bars(
        &self,
        ticker: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ProviderBar>, DataError>;
}

/// Human-readable progress emitted while fetching.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchEvent<'a> {
    Started { ticker: &'a str },
    AttemptFailed {
        source: &'a str,
        attempt: u32,
        max_attempts: u32,
        reason: String,
    },
    EmptyResult { source: &'a str, ticker: &'a str },
    FallingBack { primary: &'a str, fallback: &'a str },
    SourceFailed { source: &'a str, reason: String },
    Fetched { source: &'a str, points: usize },
}

impl fmt::Display for FetchEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchEvent::Started { ticker } => write!(f, "Attempting to fetch data for {ticker}..."),
            FetchEvent::AttemptFailed {
                source,
                attempt,
                max_attempts,
                reason,
            } => write!(f, "{source} attempt {attempt}/{max_attempts} failed: {reason}"),
            FetchEvent::EmptyResult { source, ticker } => {
                write!(f, "Warning: {source} returned no data for {ticker}")
            }
            FetchEvent::FallingBack { primary, fallback } => {
                write!(f, "{primary} failed, attempting {fallback}...")
            }
            FetchEvent::SourceFailed { source, reason } => {
                write!(f, "{source} fetch failed: {reason}")
            }
            FetchEvent::Fetched { source, points } => {
                write!(f, "Fetched {points} daily closes from {source}")
            }
        }
    }
}

/// Progress callback for fetch operations.
pub trait FetchProgress {
    fn on_event(&self, event: &FetchEvent<'_>);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl FetchProgress for StdoutProgress {
    fn on_event(&self, event: &FetchEvent<'_>) {
        println!("{event}");
    }
}

/// Discards all progress.
pub struct SilentProgress;

impl FetchProgress for SilentProgress {
    fn on_event(&self, _event: &FetchEvent<'_>) {}
}
