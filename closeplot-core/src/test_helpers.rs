//! Scripted providers, sleepers, and progress sinks shared by unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};

use crate::data::provider::{BarProvider, DataError, FetchEvent, FetchProgress, ProviderBar};
use crate::data::retry::Sleeper;

/// Replays a fixed script of answers, one per call.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<Vec<ProviderBar>, DataError>>>,
    pub calls: Mutex<Vec<(String, DateTime<Utc>, DateTime<Utc>)>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<Vec<ProviderBar>, DataError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl BarProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn daily_bars(
        &self,
        ticker: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ProviderBar>, DataError> {
        self.calls
            .lock()
            .unwrap()
            .push((ticker.to_string(), start, end));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(DataError::Provider("script exhausted".into())))
    }
}

#[derive(Default)]
pub struct RecordingSleeper {
    pub sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn count(&self) -> usize {
        self.sleeps.lock().unwrap().len()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

#[derive(Default)]
pub struct RecordingProgress {
    pub lines: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn text(&self) -> String {
        self.lines.lock().unwrap().join("\n")
    }
}

impl FetchProgress for RecordingProgress {
    fn on_event(&self, event: &FetchEvent<'_>) {
        self.lines.lock().unwrap().push(event.to_string());
    }
}

/// A bar stamped 09:30 in New York (UTC-5) on the given day.
pub fn ny_bar(y: i32, m: u32, d: u32, close: f64) -> ProviderBar {
    let offset = FixedOffset::west_opt(5 * 3600).unwrap();
    ProviderBar {
        timestamp: offset.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap(),
        open: close,
        high: close,
        low: close,
        close,
        volume: 1_000,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
