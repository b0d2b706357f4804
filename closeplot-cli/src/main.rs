//! closeplot CLI — fetch a ticker's recent daily closes and chart them.
//!
//! Tries the managed Yahoo client first (with retries), then the raw chart
//! endpoint once. On success prints a preview, writes
//! `{TICKER}_stock_price.png`, and opens a terminal chart when attached to a
//! terminal. On total failure prints guidance and exits cleanly.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use closeplot_chart::{ChartRenderer, PngRenderer, TerminalChart};
use closeplot_core::data::{ChartApiSource, PrimarySource, StdoutProgress, YahooLibrary};
use closeplot_core::{run, Config, RunOutcome};

#[derive(Parser, Debug)]
#[command(
    name = "closeplot",
    version,
    about = "Fetch a ticker's daily closing prices and chart them"
)]
struct Cli {
    /// Ticker symbol (e.g., AAPL). Defaults to the config value.
    ticker: Option<String>,

    /// Calendar days of history to fetch.
    #[arg(long)]
    days: Option<u32>,

    /// Path to a TOML config file. Defaults to the user config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the PNG is written to.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Write the PNG only; skip the interactive chart.
    #[arg(long, default_value_t = false)]
    no_display: bool,

    /// Primary source attempts before falling back.
    #[arg(long)]
    attempts: Option<u32>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(ticker) = &self.ticker {
            config.ticker = ticker.clone();
        }
        if let Some(days) = self.days {
            config.lookback_days = days;
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if let Some(attempts) = self.attempts {
            config.retry.attempts = attempts;
        }
        if self.no_display {
            config.output.interactive = false;
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("failed to load config")?;
    cli.apply(&mut config);
    config.validate()?;
    let request = config.request()?;
    debug!(?config, "resolved config");

    let library = match YahooLibrary::new() {
        Ok(library) => library,
        Err(e) => bail!("{e}\nCheck that TLS root certificates are available, then retry."),
    };
    let primary = PrimarySource::new(library, config.retry_policy());
    let fallback = ChartApiSource::new(&config.fallback)?;

    let png = PngRenderer::new(&config.output.dir, request.lookback_days())
        .with_font(config.output.font_path.clone());
    let interactive = config.output.interactive && io::stdout().is_terminal();
    let terminal = interactive.then(|| TerminalChart::new(request.lookback_days()));
    let renderer = ChartRenderer::new(png, terminal);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let outcome = run(
        &request,
        &primary,
        &fallback,
        &renderer,
        &StdoutProgress,
        &mut out,
    )?;
    out.flush()?;

    if let RunOutcome::FetchFailed(e) = outcome {
        debug!(error = %e, "no data fetched");
    }
    Ok(())
}
