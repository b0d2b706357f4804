//! Price sources: the managed Yahoo client behind a retry loop, and the raw
//! chart endpoint as a single-shot fallback.

pub mod chart_api;
pub mod primary;
pub mod provider;
pub mod retry;
pub mod yahoo_library;

pub use chart_api::{parse_chart_response, ChartApiSource};
pub use primary::PrimarySource;
pub use provider::{
    BarProvider, DataError, DataSource, Exhaustion, FetchEvent, FetchProgress, PriceSource,
    ProviderBar, SilentProgress, StdoutProgress,
};
pub use retry::{RetryPolicy, RetryState, Sleeper, ThreadSleeper};
pub use yahoo_library::YahooLibrary;
