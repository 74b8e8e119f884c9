//! Strike and quote filtering.
//!
//! Puts are kept below the threshold, calls above it, and only rows with a
//! real bid on the chosen side survive.

use rust_decimal::Decimal;
use tracing::debug;

use crate::data::{ChainLink, OptionSide};

/// A chain row that passed the filter, with its numbers parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotedRow<'a> {
    pub link: &'a ChainLink,
    pub strike: Decimal,
    pub bid: Decimal,
    /// Call ask, if quoted. Always `None` for puts.
    pub ask: Option<Decimal>,
}

impl QuotedRow<'_> {
    /// Terse expiry token of the underlying row.
    pub fn expiry_token(&self) -> &str {
        &self.link.expiry_date
    }
}

/// Rows beyond `threshold` (below it for puts, above it for calls) that carry
/// a bid on that side.
pub fn filter_chain(links: &[ChainLink], threshold: Decimal, side: OptionSide) -> Vec<QuotedRow<'_>> {
    let rows: Vec<QuotedRow<'_>> = links
        .iter()
        .filter_map(|link| {
            let strike = link.strike_price()?;
            let in_range = match side {
                OptionSide::Put => strike < threshold,
                OptionSide::Call => strike > threshold,
            };
            if !in_range {
                return None;
            }
            let bid = link.bid(side)?;
            let ask = match side {
                OptionSide::Call => link.call_ask_price(),
                OptionSide::Put => None,
            };
            Some(QuotedRow {
                link,
                strike,
                bid,
                ask,
            })
        })
        .collect();

    debug!(
        "{} of {} {} rows pass threshold {}",
        rows.len(),
        links.len(),
        side.as_str(),
        threshold
    );
    rows
}
