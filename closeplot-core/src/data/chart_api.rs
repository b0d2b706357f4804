//! Fallback source: Yahoo's chart JSON endpoint queried directly.
//!
//! One request, no retry. The endpoint has no official contract and its shape
//! changes without notice, so the body is deserialized into a schema where
//! every level is optional and then validated explicitly. Anything missing is
//! an `InvalidResponseShape`, never a panic.

use chrono::{DateTime, Utc};
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::provider::{DataError, DataSource, FetchEvent, FetchProgress, PriceSource};
use crate::config::FallbackConfig;
use crate::request::FetchRequest;
use crate::series::{collapse_same_day, PricePoint, SeriesError, TimeSeries};

/// Chart endpoint response envelope.
#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Option<ChartBody>,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartFault>,
}

#[derive(Debug, Deserialize)]
struct ChartFault {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    close: Option<Vec<Option<f64>>>,
}

/// Query parameters sent with every chart request.
pub fn query_params(lookback_days: u32) -> [(&'static str, String); 4] {
    [
        ("range", format!("{lookback_days}d")),
        ("interval", "1d".to_string()),
        ("includePrePost", "false".to_string()),
        ("events", "div,split".to_string()),
    ]
}

/// Validate a chart response body and turn it into a series.
///
/// Timestamps are Unix seconds and become UTC calendar dates. Order is kept as
/// received; `null` closes are skipped. `ticker` only labels an empty result.
pub fn parse_chart_response(ticker: &str, body: &str) -> Result<TimeSeries, DataError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| DataError::InvalidResponseShape(format!("malformed JSON: {e}")))?;

    let chart = envelope
        .chart
        .ok_or_else(|| DataError::InvalidResponseShape("missing `chart`".into()))?;

    let result = match (chart.result, chart.error) {
        (Some(result), _) => result,
        (None, Some(fault)) => {
            return Err(DataError::InvalidResponseShape(format!(
                "{}: {}",
                fault.code, fault.description
            )))
        }
        (None, None) => {
            return Err(DataError::InvalidResponseShape(
                "missing `chart.result`".into(),
            ))
        }
    };

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| DataError::InvalidResponseShape("`chart.result` is empty".into()))?;

    let timestamps = data
        .timestamp
        .ok_or_else(|| DataError::InvalidResponseShape("missing `timestamp`".into()))?;

    let closes = data
        .indicators
        .and_then(|i| i.quote.into_iter().next())
        .and_then(|q| q.close)
        .ok_or_else(|| {
            DataError::InvalidResponseShape("missing `indicators.quote[0].close`".into())
        })?;

    if timestamps.len() != closes.len() {
        return Err(DataError::InvalidResponseShape(format!(
            "{} timestamps but {} closes",
            timestamps.len(),
            closes.len()
        )));
    }

    let mut points = Vec::with_capacity(timestamps.len());
    for (&ts, close) in timestamps.iter().zip(closes) {
        let Some(close) = close else {
            continue;
        };
        let date = DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| DataError::InvalidResponseShape(format!("invalid timestamp: {ts}")))?;
        points.push(PricePoint::new(date, close));
    }

    TimeSeries::new(collapse_same_day(points), DataSource::ChartApi).map_err(|e| match e {
        SeriesError::Empty => DataError::EmptyResult {
            ticker: ticker.to_string(),
        },
        other => DataError::InvalidResponseShape(other.to_string()),
    })
}

/// Fallback price source hitting the chart endpoint over blocking HTTP.
pub struct ChartApiSource {
    client: reqwest::blocking::Client,
    base_url: String,
    user_agent: String,
}

impl ChartApiSource {
    pub fn new(config: &FallbackConfig) -> Result<Self, DataError> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| DataError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
        })
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!("{}/{ticker}", self.base_url)
    }

    /// Build (but do not send) the chart request for `request`.
    pub fn build_request(
        &self,
        request: &FetchRequest,
    ) -> Result<reqwest::blocking::Request, DataError> {
        self.client
            .get(self.chart_url(request.ticker()))
            .query(&query_params(request.lookback_days()))
            .header(USER_AGENT, &self.user_agent)
            .build()
            .map_err(|e| DataError::Network(format!("failed to build request: {e}")))
    }

    fn fetch_once(&self, request: &FetchRequest) -> Result<TimeSeries, DataError> {
        let ticker = request.ticker();
        let window = request.window(Utc::now())?;
        debug!(%ticker, start = %window.start, end = %window.end, "fallback fetch window");

        let http_request = self.build_request(request)?;
        let resp = self
            .client
            .execute(http_request)
            .map_err(|e| DataError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .map_err(|e| DataError::Network(format!("failed to read body for {ticker}: {e}")))?;

        parse_chart_response(ticker, &body)
    }
}

impl PriceSource for ChartApiSource {
    fn name(&self) -> &str {
        "chart endpoint"
    }

    fn fetch(
        &self,
        request: &FetchRequest,
        progress: &dyn FetchProgress,
    ) -> Result<TimeSeries, DataError> {
        match self.fetch_once(request) {
            Ok(series) => {
                info!(
                    ticker = request.ticker(),
                    points = series.len(),
                    "fallback source succeeded"
                );
                Ok(series)
            }
            Err(e) => {
                warn!(ticker = request.ticker(), error = %e, "fallback source failed");
                progress.on_event(&FetchEvent::SourceFailed {
                    source: self.name(),
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }
}
