//! closeplot chart — renderers for a fetched close-price series.
//!
//! - `PngRenderer`: `{ticker}_stock_price.png` via plotters
//! - `TerminalChart`: interactive ratatui view, closed with `q`/`Esc`
//! - `ChartRenderer`: PNG first, then the terminal view when enabled

pub mod fonts;
pub mod png;
pub mod terminal;
pub mod theme;

pub use png::PngRenderer;
pub use terminal::{draw_chart, TerminalChart};
pub use theme::Theme;

use closeplot_core::{RenderError, RenderReport, Renderer, TimeSeries};

/// The renderer the CLI uses.
pub struct ChartRenderer {
    png: PngRenderer,
    terminal: Option<TerminalChart>,
}

impl ChartRenderer {
    pub fn new(png: PngRenderer, terminal: Option<TerminalChart>) -> Self {
        Self { png, terminal }
    }

    pub fn png_only(png: PngRenderer) -> Self {
        Self::new(png, None)
    }
}

impl Renderer for ChartRenderer {
    fn render(&self, series: &TimeSeries, ticker: &str) -> Result<RenderReport, RenderError> {
        let mut report = self.png.render(series, ticker)?;
        if let Some(terminal) = &self.terminal {
            report.displayed = terminal.render(series, ticker)?.displayed;
        }
        Ok(report)
    }
}
