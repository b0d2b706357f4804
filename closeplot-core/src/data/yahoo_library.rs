//! Managed provider backed by the `yahoo_finance_api` crate (blocking client).
//!
//! The crate speaks `time::OffsetDateTime`; the rest of closeplot uses
//! chrono. Quotes come back as Unix seconds, and the exchange's UTC offset is
//! read from the response metadata so bars can carry their local wall time.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

use super::provider::{BarProvider, DataError, ProviderBar};

pub struct YahooLibrary {
    connector: yahoo::YahooConnector,
}

impl YahooLibrary {
    pub fn new() -> Result<Self, DataError> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| DataError::Provider(format!("failed to init Yahoo connector: {e}")))?;
        Ok(Self { connector })
    }
}

fn to_offset_datetime(dt: DateTime<Utc>) -> Result<OffsetDateTime, DataError> {
    OffsetDateTime::from_unix_timestamp(dt.timestamp())
        .map_err(|e| DataError::Provider(format!("date out of range: {e}")))
}

/// Exchange offset from the metadata's `gmtoffset` (seconds east of UTC).
fn exchange_offset(gmtoffset: Option<i64>) -> FixedOffset {
    gmtoffset
        .and_then(|secs| i32::try_from(secs).ok())
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

impl BarProvider for YahooLibrary {
    fn name(&self) -> &str {
        "yahoo_finance_api"
    }

    fn daily_bars(
        &self,
        ticker: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ProviderBar>, DataError> {
        let resp = self
            .connector
            .get_quote_history(ticker, to_offset_datetime(start)?, to_offset_datetime(end)?)
            .map_err(|e| DataError::Provider(format!("Yahoo API error: {e}")))?;

        let quotes = resp
            .quotes()
            .map_err(|e| DataError::Provider(format!("failed to parse Yahoo quotes: {e}")))?;
        if quotes.is_empty() {
            return Ok(Vec::new());
        }

        let offset = exchange_offset(resp.metadata().ok().map(|m| i64::from(m.gmtoffset)));

        quotes
            .iter()
            .map(|quote| {
                let timestamp = DateTime::from_timestamp(quote.timestamp as i64, 0)
                    .ok_or_else(|| {
                        DataError::Provider(format!("invalid timestamp: {}", quote.timestamp))
                    })?
                    .with_timezone(&offset);
                Ok(ProviderBar {
                    timestamp,
                    open: quote.open,
                    high: quote.high,
                    low: quote.low,
                    close: quote.close,
                    volume: quote.volume,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_from_metadata() {
        let offset = exchange_offset(Some(-18_000));
        assert_eq!(offset.local_minus_utc(), -18_000);
    }

    #[test]
    fn missing_or_bogus_offset_falls_back_to_utc() {
        assert_eq!(exchange_offset(None).local_minus_utc(), 0);
        assert_eq!(exchange_offset(Some(i64::MAX)).local_minus_utc(), 0);
        assert_eq!(exchange_offset(Some(200_000)).local_minus_utc(), 0);
    }

    #[test]
    fn utc_converts_to_offset_datetime() {
        let dt = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(
            to_offset_datetime(dt).unwrap().unix_timestamp(),
            1_700_000_000
        );
    }
}
