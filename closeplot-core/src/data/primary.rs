//! Primary source: the managed provider behind a bounded retry loop.
//!
//! Each attempt asks the `BarProvider` for daily bars over the lookback
//! window. Errors and empty answers both consume an attempt and are followed
//! by a fixed sleep unless the budget is spent. The first non-empty answer is
//! normalized to exchange-local calendar dates and returned immediately.

use chrono::Utc;
use tracing::{debug, info, warn};

use super::provider::{
    BarProvider, DataError, DataSource, Exhaustion, FetchEvent, FetchProgress, PriceSource,
    ProviderBar,
};
use super::retry::{AttemptOutcome, RetryPolicy, RetryState, Sleeper, ThreadSleeper};
use crate::request::FetchRequest;
use crate::series::{collapse_same_day, PricePoint, TimeSeries};

pub struct PrimarySource<P, S = ThreadSleeper> {
    provider: P,
    sleeper: S,
    policy: RetryPolicy,
}

impl<P: BarProvider> PrimarySource<P, ThreadSleeper> {
    pub fn new(provider: P, policy: RetryPolicy) -> Self {
        Self::with_sleeper(provider, ThreadSleeper, policy)
    }
}

impl<P: BarProvider, S: Sleeper> PrimarySource<P, S> {
    pub fn with_sleeper(provider: P, sleeper: S, policy: RetryPolicy) -> Self {
        Self {
            provider,
            sleeper,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }
}

impl<P: BarProvider, S: Sleeper> PriceSource for PrimarySource<P, S> {
    fn name(&self) -> &str {
        self.provider.name()
    }

    fn fetch(
        &self,
        request: &FetchRequest,
        progress: &dyn FetchProgress,
    ) -> Result<TimeSeries, DataError> {
        let ticker = request.ticker();
        let window = request.window(Utc::now())?;
        debug!(%ticker, start = %window.start, end = %window.end, "primary fetch window");

        let mut state = RetryState::start();
        let mut series = None;
        let mut last_reason = String::new();

        while let RetryState::Attempting(attempt) = state {
            let outcome = match self.provider.daily_bars(ticker, window.start, window.end) {
                Ok(bars) => match normalize_bars(bars) {
                    Ok(Some(fetched)) => {
                        series = Some(fetched);
                        AttemptOutcome::Data
                    }
                    Ok(None) => {
                        warn!(%ticker, attempt, "provider returned no rows");
                        progress.on_event(&FetchEvent::EmptyResult {
                            source: self.name(),
                            ticker,
                        });
                        AttemptOutcome::Empty
                    }
                    Err(e) => {
                        last_reason = e.to_string();
                        self.report_failure(progress, attempt, &last_reason);
                        AttemptOutcome::Failed
                    }
                },
                Err(e) => {
                    last_reason = e.to_string();
                    self.report_failure(progress, attempt, &last_reason);
                    AttemptOutcome::Failed
                }
            };

            state = state.advance(outcome, &self.policy);
            if !state.is_terminal() {
                self.sleeper.sleep(self.policy.delay);
            }
        }

        let attempts = self.policy.max_attempts;
        match (state, series) {
            (RetryState::Succeeded, Some(series)) => {
                info!(%ticker, points = series.len(), "primary source succeeded");
                Ok(series)
            }
            (RetryState::ExhaustedError, _) => Err(DataError::PrimaryExhausted {
                attempts,
                last: Exhaustion::Error(last_reason),
            }),
            _ => Err(DataError::PrimaryExhausted {
                attempts,
                last: Exhaustion::Empty,
            }),
        }
    }
}

impl<P: BarProvider, S: Sleeper> PrimarySource<P, S> {
    fn report_failure(&self, progress: &dyn FetchProgress, attempt: u32, reason: &str) {
        warn!(source = self.name(), attempt, %reason, "primary attempt failed");
        progress.on_event(&FetchEvent::AttemptFailed {
            source: self.name(),
            attempt,
            max_attempts: self.policy.max_attempts,
            reason: reason.to_string(),
        });
    }
}

/// Strip the exchange timezone and build the series.
///
/// Returns `Ok(None)` when no usable bar remains. Dates are the exchange's
/// local calendar date, not the UTC date.
pub fn normalize_bars(bars: Vec<ProviderBar>) -> Result<Option<TimeSeries>, DataError> {
    let mut points: Vec<PricePoint> = bars
        .into_iter()
        .filter(|bar| bar.close.is_finite())
        .map(|bar| PricePoint::new(bar.timestamp.naive_local().date(), bar.close))
        .collect();
    if points.is_empty() {
        return Ok(None);
    }
    points.sort_by_key(|p| p.date);
    let series = TimeSeries::new(collapse_same_day(points), DataSource::YahooLibrary)?;
    Ok(Some(series))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestError;
    use crate::test_helpers::*;
    use chrono::{FixedOffset, TimeZone};
    use std::time::Duration;

    fn source(
        script: Vec<Result<Vec<ProviderBar>, DataError>>,
    ) -> PrimarySource<ScriptedProvider, RecordingSleeper> {
        PrimarySource::with_sleeper(
            ScriptedProvider::new(script),
            RecordingSleeper::default(),
            RetryPolicy::new(3, Duration::from_secs(2)),
        )
    }

    fn request() -> FetchRequest {
        FetchRequest::new("AAPL", 30).unwrap()
    }

    fn bars() -> Vec<ProviderBar> {
        vec![ny_bar(2024, 1, 2, 185.6), ny_bar(2024, 1, 3, 184.2)]
    }

    #[test]
    fn success_on_first_attempt_makes_one_call_no_sleep() {
        let src = source(vec![Ok(bars())]);
        let progress = RecordingProgress::default();

        let series = src.fetch(&request(), &progress).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(src.provider.call_count(), 1);
        assert_eq!(src.sleeper.count(), 0);
    }

    #[test]
    fn success_on_third_attempt_after_error_and_empty() {
        let src = source(vec![
            Err(DataError::Provider("timeout".into())),
            Ok(vec![]),
            Ok(bars()),
        ]);
        let progress = RecordingProgress::default();

        let series = src.fetch(&request(), &progress).unwrap();

        assert_eq!(series.source(), DataSource::YahooLibrary);
        assert_eq!(src.provider.call_count(), 3);
        assert_eq!(
            *src.sleeper.sleeps.lock().unwrap(),
            vec![Duration::from_secs(2); 2]
        );
    }

    #[test]
    fn all_empty_exhausts_after_three_calls_two_sleeps() {
        let src = source(vec![Ok(vec![]), Ok(vec![]), Ok(vec![])]);
        let progress = RecordingProgress::default();

        let err = src.fetch(&request(), &progress).unwrap_err();

        assert_eq!(
            err,
            DataError::PrimaryExhausted {
                attempts: 3,
                last: Exhaustion::Empty
            }
        );
        assert_eq!(src.provider.call_count(), 3);
        assert_eq!(src.sleeper.count(), 2);
        assert_eq!(progress.lines.lock().unwrap().len(), 3);
        assert!(progress.text().contains("returned no data for AAPL"));
    }

    #[test]
    fn all_errors_exhaust_and_log_each_reason() {
        let src = source(vec![
            Err(DataError::Provider("dns failure".into())),
            Err(DataError::Provider("connection reset".into())),
            Err(DataError::Provider("HTTP 503".into())),
        ]);
        let progress = RecordingProgress::default();

        let err = src.fetch(&request(), &progress).unwrap_err();

        assert!(matches!(
            err,
            DataError::PrimaryExhausted { attempts: 3, last: Exhaustion::Error(ref r) } if r.contains("HTTP 503")
        ));
        assert_eq!(src.provider.call_count(), 3);
        assert_eq!(src.sleeper.count(), 2);
        let text = progress.text();
        assert!(text.contains("attempt 1/3 failed: provider error: dns failure"));
        assert!(text.contains("attempt 2/3 failed: provider error: connection reset"));
        assert!(text.contains("attempt 3/3 failed: provider error: HTTP 503"));
    }

    #[test]
    fn window_is_lookback_days_wide() {
        let src = source(vec![Ok(bars())]);
        src.fetch(&FetchRequest::new("msft", 45).unwrap(), &RecordingProgress::default())
            .unwrap();

        let calls = src.provider.calls.lock().unwrap();
        let (ticker, start, end) = &calls[0];
        assert_eq!(ticker, "MSFT");
        assert_eq!(*end - *start, chrono::Duration::days(45));
    }

    #[test]
    fn unrepresentable_window_fails_before_any_attempt() {
        let src = source(vec![Ok(bars())]);
        let req = FetchRequest::new("AAPL", 200_000_000).unwrap();

        let err = src.fetch(&req, &RecordingProgress::default()).unwrap_err();

        assert_eq!(
            err,
            DataError::Request(RequestError::LookbackOutOfRange { days: 200_000_000 })
        );
        assert_eq!(src.provider.call_count(), 0);
        assert_eq!(src.sleeper.count(), 0);
    }

    #[test]
    fn normalization_uses_exchange_local_date() {
        // 20:00 on Jan 2 in New York is already Jan 3 in UTC.
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let bar = ProviderBar {
            timestamp: offset.with_ymd_and_hms(2024, 1, 2, 20, 0, 0).unwrap(),
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            volume: 1,
        };
        let series = normalize_bars(vec![bar]).unwrap().unwrap();
        assert_eq!(series.first().date, date(2024, 1, 2));
    }

    #[test]
    fn normalization_sorts_and_collapses_duplicates() {
        let series = normalize_bars(vec![
            ny_bar(2024, 1, 3, 2.0),
            ny_bar(2024, 1, 2, 1.0),
            ny_bar(2024, 1, 3, 2.5),
        ])
        .unwrap()
        .unwrap();
        let pairs: Vec<_> = series.pairs().collect();
        assert_eq!(pairs, vec![(date(2024, 1, 2), 1.0), (date(2024, 1, 3), 2.5)]);
    }

    #[test]
    fn nan_only_bars_count_as_empty() {
        assert_eq!(normalize_bars(vec![ny_bar(2024, 1, 2, f64::NAN)]), Ok(None));
    }
}
