//! Fetch orchestration: primary first, fallback only on total primary failure.
//!
//! Fallback policy:
//! 1. Primary source (retrying internally) returns a series → use it
//! 2. Otherwise the fallback source gets exactly one try
//! 3. If both fail → print guidance, never touch the renderer

use std::io::Write;
use thiserror::Error;
use tracing::{info, warn};

use crate::data::provider::{DataError, FetchEvent, FetchProgress, PriceSource};
use crate::render::{RenderError, RenderReport, Renderer};
use crate::request::FetchRequest;
use crate::series::TimeSeries;

/// Rows shown in the console preview.
pub const PREVIEW_ROWS: usize = 5;

const FAILURE_GUIDANCE: &str = "All fetch methods failed. Please:
- Update closeplot to the latest release (the Yahoo client changes often)
- Check internet connection
- Verify ticker symbol";

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("write output: {0}")]
    Io(#[from] std::io::Error),
}

/// How a run ended. A fetch failure is a handled outcome, not an error.
#[derive(Debug)]
pub enum RunOutcome {
    Rendered {
        series: TimeSeries,
        report: RenderReport,
    },
    FetchFailed(DataError),
}

/// Try `primary`, and only if it gives up, `fallback`.
pub fn fetch_with_fallback(
    request: &FetchRequest,
    primary: &dyn PriceSource,
    fallback: &dyn PriceSource,
    progress: &dyn FetchProgress,
) -> Result<TimeSeries, DataError> {
    progress.on_event(&FetchEvent::Started {
        ticker: request.ticker(),
    });

    let primary_err = match primary.fetch(request, progress) {
        Ok(series) => {
            report_fetched(progress, primary.name(), &series);
            return Ok(series);
        }
        Err(e) => e,
    };

    warn!(ticker = request.ticker(), error = %primary_err, "primary source exhausted");
    progress.on_event(&FetchEvent::FallingBack {
        primary: primary.name(),
        fallback: fallback.name(),
    });

    match fallback.fetch(request, progress) {
        Ok(series) => {
            report_fetched(progress, fallback.name(), &series);
            Ok(series)
        }
        Err(fallback_err) => Err(DataError::AllSourcesFailed {
            primary: Box::new(primary_err),
            fallback: Box::new(fallback_err),
        }),
    }
}

fn report_fetched(progress: &dyn FetchProgress, source: &str, series: &TimeSeries) {
    info!(source, points = series.len(), "fetched series");
    progress.on_event(&FetchEvent::Fetched {
        source,
        points: series.len(),
    });
}

/// Fetch, preview, and render. On total fetch failure, print guidance to
/// `out` and return without invoking `renderer`.
pub fn run(
    request: &FetchRequest,
    primary: &dyn PriceSource,
    fallback: &dyn PriceSource,
    renderer: &dyn Renderer,
    progress: &dyn FetchProgress,
    out: &mut dyn Write,
) -> Result<RunOutcome, RunError> {
    match fetch_with_fallback(request, primary, fallback, progress) {
        Ok(series) => {
            write!(out, "{}", preview_table(&series, PREVIEW_ROWS))?;
            let report = renderer.render(&series, request.ticker())?;
            if let Some(path) = &report.image_path {
                writeln!(out, "Chart saved to {}", path.display())?;
            }
            Ok(RunOutcome::Rendered { series, report })
        }
        Err(e) => {
            writeln!(out, "{FAILURE_GUIDANCE}")?;
            writeln!(out, "(cause: {e})")?;
            Ok(RunOutcome::FetchFailed(e))
        }
    }
}

/// First `rows` closes as a small two-column table.
pub fn preview_table(series: &TimeSeries, rows: usize) -> String {
    let mut table = format!("\nStock Data Preview:\n{:<12} {:>10}\n", "Date", "Close");
    for point in series.head(rows) {
        table.push_str(&format!("{:<12} {:>10.2}\n", point.date.to_string(), point.close));
    }
    table
}
