//! Quote providers.
//!
//! A provider turns a ticker into an [`OptionChain`]. Failures never abort a
//! screening run: [`fetch_or_empty`] logs them and hands back an empty chain.

use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tracing::warn;

use super::nasdaq::parse_option_chain;
use super::types::{OptionChain, OptionSide};
use crate::expiry::market_today;

/// Quote provider errors.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("No data available for {ticker}")]
    NoData { ticker: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of option chains.
pub trait QuoteProvider {
    /// Chain for one side of `ticker`, expiring no later than `max_expiry`.
    fn fetch_chain(
        &mut self,
        ticker: &str,
        side: OptionSide,
        max_expiry: NaiveDate,
    ) -> impl Future<Output = Result<OptionChain, ProviderError>> + Send;
}

/// Fetch a chain, turning any provider failure into an empty chain.
pub async fn fetch_or_empty<P: QuoteProvider>(
    provider: &mut P,
    ticker: &str,
    side: OptionSide,
    max_expiry: NaiveDate,
) -> OptionChain {
    match provider.fetch_chain(ticker, side, max_expiry).await {
        Ok(chain) => chain,
        Err(e) => {
            warn!("{}: quote fetch failed, skipping ({})", ticker, e);
            OptionChain::empty(ticker)
        }
    }
}

/// File name a saved response is stored under.
pub fn snapshot_file_name(ticker: &str, side: OptionSide) -> String {
    format!("{}-{}.json", ticker.to_uppercase(), side.as_str())
}

/// Reads responses previously saved by the `fetch` command.
pub struct SnapshotProvider {
    dir: PathBuf,
    as_of: Option<DateTime<Utc>>,
}

impl SnapshotProvider {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            as_of: None,
        }
    }

    /// Resolve expiry years as of `now` instead of the wall clock.
    pub fn as_of(mut self, now: DateTime<Utc>) -> Self {
        self.as_of = Some(now);
        self
    }

    pub fn path_for(&self, ticker: &str, side: OptionSide) -> PathBuf {
        self.dir.join(snapshot_file_name(ticker, side))
    }
}

impl QuoteProvider for SnapshotProvider {
    async fn fetch_chain(
        &mut self,
        ticker: &str,
        side: OptionSide,
        max_expiry: NaiveDate,
    ) -> Result<OptionChain, ProviderError> {
        let body = std::fs::read_to_string(self.path_for(ticker, side))?;
        let mut chain = parse_option_chain(ticker, &body)?;

        // Saved responses may cover a wider window than this run asks for.
        let today = market_today(self.as_of.unwrap_or_else(Utc::now));
        chain.links.retain(|link| {
            chain
                .expiry_groups
                .resolve_expiry(&link.expiry_date, today)
                .map_or(true, |expiry| expiry.date <= max_expiry)
        });
        Ok(chain)
    }
}
