//! Renderer seam. Implementations live in `closeplot-chart`.

use std::path::PathBuf;
use thiserror::Error;

use crate::series::TimeSeries;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("chart backend error: {0}")]
    Backend(String),

    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a renderer produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderReport {
    /// Image written to disk, if any.
    pub image_path: Option<PathBuf>,
    /// Whether an interactive view was shown.
    pub displayed: bool,
}

pub trait Renderer {
    fn render(&self, series: &TimeSeries, ticker: &str) -> Result<RenderReport, RenderError>;
}

/// `{ticker}_stock_price.png`
pub fn chart_file_name(ticker: &str) -> String {
    format!("{ticker}_stock_price.png")
}

pub fn chart_title(ticker: &str, lookback_days: u32) -> String {
    format!("{ticker} Stock Price - Last {lookback_days} Days")
}
