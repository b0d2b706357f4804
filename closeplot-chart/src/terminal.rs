//! Interactive close-price chart drawn in the terminal.
//!
//! The view stays up until the user presses `q` or `Esc`.

use std::io::{self, stdout, Write};
use std::sync::Once;

use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Chart, Dataset, GraphType, Paragraph};
use tracing::debug;

use closeplot_core::render::chart_title;
use closeplot_core::{RenderError, RenderReport, Renderer, TimeSeries};

use crate::theme::Theme;

/// Days since the first point, so calendar gaps show on the x axis.
fn chart_points(series: &TimeSeries) -> Vec<(f64, f64)> {
    let origin = series.first().date;
    series
        .pairs()
        .map(|(date, close)| ((date - origin).num_days() as f64, close))
        .collect()
}

fn date_label(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Draw the chart plus a one-line key hint into `area`.
pub fn draw_chart(f: &mut Frame, area: Rect, series: &TimeSeries, title: &str, theme: &Theme) {
    let [chart_area, hint_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(area);

    let (lo, hi) = series.close_range();
    let padding = ((hi - lo).abs() * 0.05).max(0.5);
    let (y_min, y_max) = (lo - padding, hi + padding);

    let (first, last) = series.date_range();
    let x_max = ((last - first).num_days() as f64).max(1.0);
    let mid = first + (last - first) / 2;

    let data = chart_points(series);
    let line_color = theme.trend_color(series.first().close, series.last().close);

    let dataset = Dataset::default()
        .name("Closing Price")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(line_color))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(
            Block::bordered()
                .title(Span::styled(
                    format!(" {title} "),
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD),
                ))
                .border_style(Style::default().fg(theme.accent)),
        )
        .x_axis(
            Axis::default()
                .title("Date")
                .style(theme.muted_style())
                .bounds([0.0, x_max])
                .labels(vec![
                    Span::raw(date_label(first)),
                    Span::raw(date_label(mid)),
                    Span::raw(date_label(last)),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("Price (USD)")
                .style(theme.muted_style())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{y_min:.2}")),
                    Span::raw(format!("{:.2}", (y_min + y_max) / 2.0)),
                    Span::raw(format!("{y_max:.2}")),
                ]),
        );

    f.render_widget(chart, chart_area);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "q/Esc: close",
            theme.muted_style(),
        ))),
        hint_area,
    );
}

/// Full-screen chart in the alternate screen.
#[derive(Debug, Clone)]
pub struct TerminalChart {
    lookback_days: u32,
    theme: Theme,
}

impl TerminalChart {
    pub fn new(lookback_days: u32) -> Self {
        Self {
            lookback_days,
            theme: Theme::default(),
        }
    }

    fn event_loop<B: Backend>(
        &self,
        terminal: &mut Terminal<B>,
        series: &TimeSeries,
        title: &str,
    ) -> io::Result<()> {
        loop {
            terminal.draw(|f| draw_chart(f, f.area(), series, title, &self.theme))?;

            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
                {
                    return Ok(());
                }
            }
        }
    }
}

/// Toggles terminal raw mode.
trait RawMode {
    fn enable(&self) -> io::Result<()>;
    fn disable(&self) -> io::Result<()>;
}

struct CrosstermRawMode;

impl RawMode for CrosstermRawMode {
    fn enable(&self) -> io::Result<()> {
        enable_raw_mode()
    }

    fn disable(&self) -> io::Result<()> {
        disable_raw_mode()
    }
}

/// Raw mode plus the alternate screen. Both are undone on drop, including
/// when entering fails halfway.
struct ScreenGuard<W: Write, M: RawMode> {
    out: W,
    raw: M,
}

impl<W: Write, M: RawMode> ScreenGuard<W, M> {
    fn enter(out: W, raw: M) -> io::Result<Self> {
        raw.enable()?;
        let mut guard = Self { out, raw };
        execute!(guard.out, EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl<W: Write, M: RawMode> Drop for ScreenGuard<W, M> {
    fn drop(&mut self) {
        let _ = self.raw.disable();
        let _ = execute!(self.out, LeaveAlternateScreen);
    }
}

static PANIC_HOOK: Once = Once::new();

/// Restore the terminal before the panic message is printed. Installed once
/// per process.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stderr(), LeaveAlternateScreen);
            default_hook(info);
        }));
    });
}

impl Renderer for TerminalChart {
    fn render(&self, series: &TimeSeries, ticker: &str) -> Result<RenderReport, RenderError> {
        let title = chart_title(ticker, self.lookback_days);
        install_panic_hook();

        let screen = ScreenGuard::enter(stdout(), CrosstermRawMode)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal, series, &title);
        terminal.show_cursor()?;
        drop(screen);

        result?;
        debug!(%ticker, "terminal chart closed");
        Ok(RenderReport {
            image_path: None,
            displayed: true,
        })
    }
}
