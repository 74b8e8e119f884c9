//! Nasdaq option-chain client.
//!
//! The public quote endpoint returns a JSON table where expiry-group header
//! rows ("February 21, 2025") are interleaved with contract rows that carry
//! only a terse "Feb 21" token. Prices are strings and "--" marks a missing
//! quote.

use std::time::{Duration, Instant};

use chrono::{NaiveDate, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use super::provider::{ProviderError, QuoteProvider};
use super::types::{parse_price, ChainLink, OptionChain, OptionSide};
use crate::expiry::market_today;

/// Nasdaq quote API base URL.
const BASE_URL: &str = "https://api.nasdaq.com/api/quote";

/// The endpoint rejects requests without a browser-like user agent.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Maximum rows per request.
const ROW_LIMIT: &str = "5000";

#[derive(Debug, Clone, Deserialize)]
struct NasdaqResponse {
    data: Option<NasdaqData>,
    status: Option<NasdaqStatus>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NasdaqData {
    last_trade: Option<String>,
    table: Option<NasdaqTable>,
}

#[derive(Debug, Clone, Deserialize)]
struct NasdaqTable {
    #[serde(default)]
    rows: Vec<NasdaqRow>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NasdaqStatus {
    r_code: i64,
    #[serde(default)]
    b_code_message: Option<Vec<NasdaqMessage>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NasdaqMessage {
    error_message: Option<String>,
}

/// One row of the option-chain table.
#[derive(Debug, Clone, Deserialize)]
pub struct NasdaqRow {
    #[serde(default)]
    pub expirygroup: Option<String>,
    #[serde(default, rename = "expiryDate")]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub strike: Option<String>,
    #[serde(default, rename = "c_Bid")]
    pub call_bid: Option<String>,
    #[serde(default, rename = "c_Ask")]
    pub call_ask: Option<String>,
    #[serde(default, rename = "p_Bid")]
    pub put_bid: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Price out of "LAST TRADE: $227.48 (AS OF FEB 7, 2025)".
pub fn parse_last_trade(text: &str) -> Option<Decimal> {
    match text.find('$') {
        Some(pos) => {
            let amount: String = text[pos + 1..]
                .chars()
                .take_while(|c| !c.is_whitespace())
                .collect();
            parse_price(&amount)
        }
        None => parse_price(text),
    }
}

/// Convert table rows to chain links, carrying each header's label down to
/// the contract rows beneath it.
pub fn rows_to_links(rows: Vec<NasdaqRow>) -> Vec<ChainLink> {
    let mut links = Vec::with_capacity(rows.len());
    let mut current_group = String::new();

    for row in rows {
        let group = non_blank(row.expirygroup);
        let token = non_blank(row.expiry_date);

        let Some(token) = token else {
            if let Some(label) = group {
                current_group = label;
            }
            continue;
        };

        links.push(ChainLink {
            strike: row.strike,
            put_bid: row.put_bid,
            call_bid: row.call_bid,
            call_ask: row.call_ask,
            expiry_date: token,
            expiry_group: group.unwrap_or_else(|| current_group.clone()),
        });
    }
    links
}

/// Parse a raw option-chain response body.
pub fn parse_option_chain(ticker: &str, body: &str) -> Result<OptionChain, ProviderError> {
    let response: NasdaqResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    if let Some(status) = &response.status {
        if status.r_code != 200 {
            let message = status
                .b_code_message
                .iter()
                .flatten()
                .filter_map(|m| m.error_message.clone())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ProviderError::ApiError(format!("{}: {}", status.r_code, message)));
        }
    }

    let data = response.data.ok_or_else(|| ProviderError::NoData {
        ticker: ticker.to_string(),
    })?;

    let current_price = data
        .last_trade
        .as_deref()
        .and_then(parse_last_trade)
        .ok_or_else(|| ProviderError::InvalidResponse("missing last trade price".to_string()))?;

    let rows = data.table.map(|t| t.rows).unwrap_or_default();
    let chain = OptionChain::new(ticker, current_price, rows_to_links(rows));
    debug!(
        "{}: {} rows across {} expiry groups at {}",
        ticker,
        chain.links.len(),
        chain.expiry_groups.len(),
        current_price
    );
    Ok(chain)
}

/// Nasdaq API client.
pub struct NasdaqClient {
    client: Client,
    min_interval: Duration,
    last_request: Option<Instant>,
    request_count: u64,
}

impl NasdaqClient {
    /// Create a client that waits at least `min_interval` between requests.
    pub fn new(min_interval: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            min_interval,
            last_request: None,
            request_count: 0,
        })
    }

    /// Get request count for monitoring.
    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    /// Fetch the raw response body for one side of a chain.
    pub async fn fetch_raw(
        &mut self,
        ticker: &str,
        side: OptionSide,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<String, ProviderError> {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }

        let url = format!("{}/{}/option-chain", BASE_URL, ticker.to_uppercase());
        let from = from.format("%Y-%m-%d").to_string();
        let to = to.format("%Y-%m-%d").to_string();
        let params = [
            ("assetclass", "stocks"),
            ("limit", ROW_LIMIT),
            ("fromdate", from.as_str()),
            ("todate", to.as_str()),
            ("excode", "oprac"),
            ("callput", side.as_str()),
            ("money", "all"),
            ("type", "all"),
        ];

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&params)
            .send()
            .await?;

        self.last_request = Some(Instant::now());
        self.request_count += 1;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError(format!("{}: {}", status, text)));
        }

        Ok(response.text().await?)
    }
}

impl QuoteProvider for NasdaqClient {
    async fn fetch_chain(
        &mut self,
        ticker: &str,
        side: OptionSide,
        max_expiry: NaiveDate,
    ) -> Result<OptionChain, ProviderError> {
        let today = market_today(Utc::now());
        let body = self.fetch_raw(ticker, side, today, max_expiry).await?;
        parse_option_chain(ticker, &body)
    }
}
