//! PNG line chart of close vs date.

use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

use closeplot_core::render::{chart_file_name, chart_title};
use closeplot_core::{RenderError, RenderReport, Renderer, TimeSeries};

use crate::fonts::{ensure_font, FONT_FAMILY};

pub const DEFAULT_SIZE: (u32, u32) = (1200, 600);

fn backend_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Backend(e.to_string())
}

/// Writes `{ticker}_stock_price.png` into an output directory.
#[derive(Debug, Clone)]
pub struct PngRenderer {
    output_dir: PathBuf,
    lookback_days: u32,
    size: (u32, u32),
    font_path: Option<PathBuf>,
}

impl PngRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, lookback_days: u32) -> Self {
        Self {
            output_dir: output_dir.into(),
            lookback_days,
            size: DEFAULT_SIZE,
            font_path: None,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_font(mut self, font_path: Option<PathBuf>) -> Self {
        self.font_path = font_path;
        self
    }

    pub fn output_path(&self, ticker: &str) -> PathBuf {
        self.output_dir.join(chart_file_name(ticker))
    }

    fn draw(
        &self,
        path: &Path,
        series: &TimeSeries,
        ticker: &str,
        labelled: bool,
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(backend_err)?;

        // Pad both axes so a one-point series still has a non-empty range.
        let (first, last) = series.date_range();
        let x_range: std::ops::Range<NaiveDate> =
            (first - Duration::days(1))..(last + Duration::days(1));
        let (lo, hi) = series.close_range();
        let pad = ((hi - lo) * 0.05).max(0.5);

        let mut builder = ChartBuilder::on(&root);
        builder
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(70);
        if labelled {
            builder.caption(chart_title(ticker, self.lookback_days), (FONT_FAMILY, 24));
        }
        let mut chart = builder
            .build_cartesian_2d(x_range, (lo - pad)..(hi + pad))
            .map_err(backend_err)?;

        let date_label = |d: &NaiveDate| d.format("%Y-%m-%d").to_string();
        let mut mesh = chart.configure_mesh();
        mesh.light_line_style(&BLACK.mix(0.05))
            .bold_line_style(&BLACK.mix(0.15));
        if labelled {
            mesh.x_desc("Date")
                .y_desc("Price (USD)")
                .x_labels(8)
                .y_labels(10)
                .x_label_formatter(&date_label)
                .label_style((FONT_FAMILY, 14))
                .axis_desc_style((FONT_FAMILY, 16));
        } else {
            mesh.x_labels(0).y_labels(0);
        }
        mesh.draw().map_err(backend_err)?;

        let line = chart
            .draw_series(LineSeries::new(series.pairs(), BLUE.stroke_width(2)))
            .map_err(backend_err)?;
        if labelled {
            line.label("Closing Price").legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2))
            });
            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .label_font((FONT_FAMILY, 14))
                .draw()
                .map_err(backend_err)?;
        }

        root.present().map_err(backend_err)?;
        Ok(())
    }
}

impl Renderer for PngRenderer {
    fn render(&self, series: &TimeSeries, ticker: &str) -> Result<RenderReport, RenderError> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_path(ticker);
        let labelled = ensure_font(self.font_path.as_deref());

        self.draw(&path, series, ticker, labelled)?;
        info!(path = %path.display(), points = series.len(), labelled, "wrote chart");

        Ok(RenderReport {
            image_path: Some(path),
            displayed: false,
        })
    }
}
