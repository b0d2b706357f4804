//! Property tests for series construction and the retry budget.
//!
//! 1. Round-trip — pairs in, same pairs out, same order
//! 2. Attempt accounting — success on attempt k means k calls and k-1 sleeps
//! 3. Exhaustion — an all-failing provider is called exactly `max` times

use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, NaiveDate, TimeZone, Utc};
use closeplot_core::data::{
    BarProvider, DataError, DataSource, PriceSource, PrimarySource, ProviderBar, RetryPolicy,
    SilentProgress, Sleeper,
};
use closeplot_core::{FetchRequest, TimeSeries};
use proptest::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

// ── Test doubles ─────────────────────────────────────────────────────

/// Fails (alternating error / empty) until `succeed_on`, then returns a bar.
struct FlakyProvider {
    succeed_on: u32,
    calls: AtomicU32,
}

impl BarProvider for FlakyProvider {
    fn name(&self) -> &str {
        "flaky"
    }

    fn daily_bars(
        &self,
        _ticker: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<ProviderBar>, DataError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n >= self.succeed_on {
            let offset = FixedOffset::west_opt(5 * 3600).unwrap();
            return Ok(vec![ProviderBar {
                timestamp: offset.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap(),
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume: 1,
            }]);
        }
        if n % 2 == 0 {
            Ok(Vec::new())
        } else {
            Err(DataError::Provider(format!("failure {n}")))
        }
    }
}

#[derive(Default)]
struct CountingSleeper {
    sleeps: AtomicU32,
}

impl Sleeper for CountingSleeper {
    fn sleep(&self, _duration: Duration) {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_pairs() -> impl Strategy<Value = Vec<(NaiveDate, f64)>> {
    prop::collection::vec((1i64..5, 1.0..1000.0_f64), 1..60).prop_map(|steps| {
        let mut day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        steps
            .into_iter()
            .map(|(gap, close)| {
                day += ChronoDuration::days(gap);
                (day, (close * 100.0).round() / 100.0)
            })
            .collect()
    })
}

// ── 1. Round-trip ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn series_round_trips_pairs(pairs in arb_pairs()) {
        let series = TimeSeries::from_pairs(pairs.clone(), DataSource::ChartApi).unwrap();
        let back: Vec<_> = series.pairs().collect();
        prop_assert_eq!(back, pairs);
    }
}

// ── 2. Attempt accounting ────────────────────────────────────────────

proptest! {
    #[test]
    fn success_on_attempt_k_costs_k_calls(max in 1u32..6, k in 1u32..6) {
        prop_assume!(k <= max);
        let provider = FlakyProvider { succeed_on: k, calls: AtomicU32::new(0) };
        let source = PrimarySource::with_sleeper(
            provider,
            CountingSleeper::default(),
            RetryPolicy::new(max, Duration::from_secs(2)),
        );
        let req = FetchRequest::new("AAPL", 30).unwrap();

        let result = source.fetch(&req, &SilentProgress);

        prop_assert!(result.is_ok());
        prop_assert_eq!(calls(&source), k);
        prop_assert_eq!(sleeps(&source), k - 1);
    }

    // ── 3. Exhaustion ────────────────────────────────────────────────

    #[test]
    fn never_succeeding_provider_is_called_max_times(max in 1u32..6) {
        let provider = FlakyProvider { succeed_on: u32::MAX, calls: AtomicU32::new(0) };
        let source = PrimarySource::with_sleeper(
            provider,
            CountingSleeper::default(),
            RetryPolicy::new(max, Duration::ZERO),
        );
        let req = FetchRequest::new("AAPL", 30).unwrap();

        let is_exhausted = matches!(
            source.fetch(&req, &SilentProgress),
            Err(DataError::PrimaryExhausted { .. })
        );
        prop_assert!(is_exhausted);
        prop_assert_eq!(calls(&source), max);
        prop_assert_eq!(sleeps(&source), max - 1);
    }
}

fn calls(source: &PrimarySource<FlakyProvider, CountingSleeper>) -> u32 {
    source.provider().calls.load(Ordering::SeqCst)
}

fn sleeps(source: &PrimarySource<FlakyProvider, CountingSleeper>) -> u32 {
    source.sleeper().sleeps.load(Ordering::SeqCst)
}
