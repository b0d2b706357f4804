//! closeplot core — fetch a ticker's daily closes with retry and fallback.
//!
//! - Domain types (`TimeSeries`, `FetchRequest`)
//! - Primary source: managed Yahoo client, bounded retry with fixed sleep
//! - Fallback source: raw chart endpoint, schema-validated, single attempt
//! - Orchestration and the `Renderer` seam consumed by `closeplot-chart`
//! - TOML configuration

pub mod config;
pub mod data;
pub mod fetch;
pub mod render;
pub mod request;
pub mod series;

#[cfg(test)]
mod test_helpers;

pub use config::{Config, ConfigError};
pub use data::DataSource;
pub use fetch::{fetch_with_fallback, run, RunError, RunOutcome};
pub use render::{RenderError, RenderReport, Renderer};
pub use request::{FetchRequest, LookbackWindow, RequestError};
pub use series::{PricePoint, SeriesError, TimeSeries};
