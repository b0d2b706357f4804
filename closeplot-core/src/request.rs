//! FetchRequest — what to fetch, and the lookback window derived from it.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("ticker must not be empty")]
    EmptyTicker,

    #[error("lookback must be at least one day")]
    ZeroLookback,

    #[error("a {days}-day lookback reaches past the earliest representable date")]
    LookbackOutOfRange { days: u32 },
}

/// Input to either price source. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    ticker: String,
    lookback_days: u32,
}

impl FetchRequest {
    /// Ticker is trimmed and upper-cased.
    pub fn new(ticker: &str, lookback_days: u32) -> Result<Self, RequestError> {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(RequestError::EmptyTicker);
        }
        if lookback_days == 0 {
            return Err(RequestError::ZeroLookback);
        }
        Ok(Self {
            ticker,
            lookback_days,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    /// `[now - lookback_days, now]`. Callers pass the wall clock at call time.
    pub fn window(&self, now: DateTime<Utc>) -> Result<LookbackWindow, RequestError> {
        let start = Duration::try_days(i64::from(self.lookback_days))
            .and_then(|span| now.checked_sub_signed(span))
            .ok_or(RequestError::LookbackOutOfRange {
                days: self.lookback_days,
            })?;
        Ok(LookbackWindow { start, end: now })
    }
}

/// Absolute date range for a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ticker_is_normalized() {
        let req = FetchRequest::new("  aapl ", 10).unwrap();
        assert_eq!(req.ticker(), "AAPL");
        assert_eq!(req.lookback_days(), 10);
    }

    #[test]
    fn blank_ticker_rejected() {
        assert_eq!(FetchRequest::new("   ", 30), Err(RequestError::EmptyTicker));
    }

    #[test]
    fn zero_lookback_rejected() {
        assert_eq!(FetchRequest::new("MSFT", 0), Err(RequestError::ZeroLookback));
    }

    #[test]
    fn huge_lookback_is_an_error_not_a_panic() {
        let req = FetchRequest::new("AAPL", 200_000_000).unwrap();
        assert_eq!(
            req.window(Utc::now()),
            Err(RequestError::LookbackOutOfRange { days: 200_000_000 })
        );
    }

    #[test]
    fn largest_lookback_still_reports_cleanly() {
        let req = FetchRequest::new("AAPL", u32::MAX).unwrap();
        assert!(req.window(Utc::now()).is_err());
    }

    #[test]
    fn window_spans_lookback() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let window = FetchRequest::new("AAPL", 30).unwrap().window(now).unwrap();
        assert_eq!(window.end, now);
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
        );
    }
}
