//! Options premium screener CLI.
//!
//! # Usage
//!
//! ```bash
//! # Screen cash-secured puts from live quotes
//! mahler-screener screen --input tickers.csv
//!
//! # Call credit spreads, cherries only, as JSON
//! mahler-screener screen --input tickers.csv --side call --cherries --format json
//!
//! # Save quotes once, then screen offline
//! mahler-screener fetch --tickers SPY,QQQ --side put --out snapshots
//! mahler-screener screen --input tickers.csv --snapshots snapshots
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use mahler_screener::data::{
    fetch_or_empty, load_requests, snapshot_file_name, NasdaqClient, OptionChain, OptionSide, QuoteProvider,
    SnapshotProvider, TickerRequest,
};
use mahler_screener::expiry::market_today;
use mahler_screener::report::{csv_out, json, table, OutputFormat, ScreenReport};
use mahler_screener::{Screener, ScreenerConfig};

const FETCH_ATTEMPTS: u32 = 3;

#[derive(Parser)]
#[command(name = "mahler-screener")]
#[command(about = "Rank cash-secured puts and call credit spreads by annualized return")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen a ticker list
    Screen {
        /// Ticker list: one `symbol,threshold` per line
        #[arg(short, long)]
        input: PathBuf,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Option side: put or call
        #[arg(long)]
        side: Option<String>,

        /// Minimum annualized ROI in percent
        #[arg(long)]
        min_roi: Option<f64>,

        /// Report only cherries
        #[arg(long)]
        cherries: bool,

        /// Read saved responses from this directory instead of the network
        #[arg(long)]
        snapshots: Option<PathBuf>,

        /// Output format: table, json or csv
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Save raw quote responses for offline screening
    Fetch {
        /// Comma-separated list of tickers
        #[arg(long)]
        tickers: String,

        /// Option side: put or call
        #[arg(long, default_value = "put")]
        side: String,

        /// Output directory
        #[arg(long, default_value = "snapshots")]
        out: PathBuf,

        /// Days ahead to request
        #[arg(long, default_value_t = 60)]
        max_expiry_days: i64,
    },
}

fn parse_side(raw: &str) -> Result<OptionSide> {
    match OptionSide::from_str(raw) {
        Some(side) => Ok(side),
        None => bail!("Invalid side '{}': expected put or call", raw),
    }
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );
    Ok(pb)
}

async fn collect_chains<P: QuoteProvider>(
    provider: &mut P,
    requests: Vec<TickerRequest>,
    side: OptionSide,
    max_expiry: NaiveDate,
) -> Result<Vec<(TickerRequest, OptionChain)>> {
    let pb = progress_bar(requests.len())?;
    let mut jobs = Vec::with_capacity(requests.len());

    for request in requests {
        pb.set_message(request.symbol.clone());
        let chain = fetch_or_empty(provider, &request.symbol, side, max_expiry).await;
        jobs.push((request, chain));
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(jobs)
}

async fn cmd_screen(
    input: PathBuf,
    config_path: Option<PathBuf>,
    side: Option<String>,
    min_roi: Option<f64>,
    cherries: bool,
    snapshots: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => ScreenerConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ScreenerConfig::default(),
    };
    if let Some(raw) = side {
        config.side = parse_side(&raw)?;
    }
    if let Some(min) = min_roi {
        config.min_annualized_roi = min;
    }
    if cherries {
        config.cherries_only = true;
    }
    config.validate().context("Invalid configuration")?;

    let requests = load_requests(&input)
        .with_context(|| format!("Failed to read ticker list {}", input.display()))?;
    if requests.is_empty() {
        warn!("{}: no tickers to screen", input.display());
    }

    let now = Utc::now();
    let max_expiry = market_today(now) + chrono::Duration::days(config.max_expiry_days);
    let side = config.side;
    info!(
        "Screening {} tickers ({} side, expiries through {})",
        requests.len(),
        side.as_str(),
        max_expiry
    );

    let jobs = match snapshots {
        Some(dir) => {
            let mut provider = SnapshotProvider::new(dir);
            collect_chains(&mut provider, requests, side, max_expiry).await?
        }
        None => {
            let mut provider = NasdaqClient::new(Duration::from_millis(config.request_interval_ms))
                .context("Failed to create quote client")?;
            let jobs = collect_chains(&mut provider, requests, side, max_expiry).await?;
            info!("Made {} quote requests", provider.request_count());
            jobs
        }
    };

    let screener = Screener::new(config);
    let evaluation = screener.screen_all(&jobs, now);

    match format {
        OutputFormat::Table => table::print_table(&evaluation),
        OutputFormat::Json => json::print_json(&ScreenReport::new(evaluation, side, now)),
        OutputFormat::Csv => {
            csv_out::print_csv(&evaluation.results).context("Failed to write CSV")?;
            for w in &evaluation.warnings {
                warn!("{}", w);
            }
        }
    }
    Ok(())
}

async fn cmd_fetch(tickers: Vec<String>, side: OptionSide, out: &Path, max_expiry_days: i64) -> Result<()> {
    fs::create_dir_all(out).with_context(|| format!("Failed to create {}", out.display()))?;

    let mut client = NasdaqClient::new(Duration::from_millis(ScreenerConfig::default().request_interval_ms))
        .context("Failed to create quote client")?;
    let today = market_today(Utc::now());
    let to = today + chrono::Duration::days(max_expiry_days);

    let pb = progress_bar(tickers.len())?;
    let mut saved = 0;
    let mut failed = Vec::new();

    for ticker in &tickers {
        pb.set_message(ticker.clone());

        let mut body = None;
        for attempt in 0..FETCH_ATTEMPTS {
            match client.fetch_raw(ticker, side, today, to).await {
                Ok(b) => {
                    body = Some(b);
                    break;
                }
                Err(e) if attempt + 1 < FETCH_ATTEMPTS => {
                    warn!("{}: attempt {} failed ({}), retrying", ticker, attempt + 1, e);
                    tokio::time::sleep(Duration::from_secs(2u64.pow(attempt))).await;
                }
                Err(e) => {
                    warn!("{}: giving up ({})", ticker, e);
                    failed.push(ticker.clone());
                }
            }
        }

        if let Some(body) = body {
            let path = out.join(snapshot_file_name(ticker, side));
            fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
            saved += 1;
        }
        pb.inc(1);
    }

    pb.finish_with_message("done");
    println!("\nSaved {} of {} snapshots to {}", saved, tickers.len(), out.display());
    if !failed.is_empty() {
        println!("  Failed: {}", failed.join(", "));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mahler_screener=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Screen {
            input,
            config,
            side,
            min_roi,
            cherries,
            snapshots,
            format,
        } => {
            cmd_screen(input, config, side, min_roi, cherries, snapshots, format).await?;
        }
        Commands::Fetch {
            tickers,
            side,
            out,
            max_expiry_days,
        } => {
            let ticker_list: Vec<String> = tickers
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
            if max_expiry_days <= 0 {
                bail!("--max-expiry-days must be positive");
            }
            cmd_fetch(ticker_list, parse_side(&side)?, &out, max_expiry_days).await?;
        }
    }

    Ok(())
}
