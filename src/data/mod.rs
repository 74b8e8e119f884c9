pub mod input;
pub mod nasdaq;
pub mod provider;
pub mod types;

pub use input::{load_requests, read_requests, InputError, TickerRequest};
pub use nasdaq::{parse_option_chain, NasdaqClient};
pub use provider::{fetch_or_empty, snapshot_file_name, ProviderError, QuoteProvider, SnapshotProvider};
pub use types::{
    parse_price, sort_by_annualized_roi, AnalysisResult, ChainLink, Evaluation, OptionChain, OptionSide,
    SpreadDetails, NO_QUOTE,
};

#[cfg(test)]
pub(crate) use types::mock_result;
