//! Parrot/neon palette for the terminal chart.

use ratatui::style::{Color, Style};

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Electric cyan accent (borders, titles)
    pub accent: Color,
    /// Neon green (price up over the window)
    pub positive: Color,
    /// Hot pink (price down over the window)
    pub negative: Color,
    /// Steel blue (axes, hints)
    pub muted: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    pub fn parrot_neon() -> Self {
        Self {
            accent: Color::Rgb(0, 255, 255),
            positive: Color::Rgb(0, 255, 128),
            negative: Color::Rgb(255, 20, 147),
            muted: Color::Rgb(100, 149, 237),
        }
    }

    /// Line color for a window that opened at `first` and closed at `last`.
    pub fn trend_color(&self, first: f64, last: f64) -> Color {
        if last >= first {
            self.positive
        } else {
            self.negative
        }
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }
}
