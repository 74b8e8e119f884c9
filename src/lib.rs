pub mod analytics;
pub mod config;
pub mod data;
pub mod engine;
pub mod expiry;
pub mod pricing;
pub mod report;

// Re-export commonly used types
pub use analytics::{CherryMode, PutEvaluator, SpreadOptimizer};
pub use config::{ConfigError, ScreenerConfig, ThresholdMode};
pub use data::{
    AnalysisResult, ChainLink, Evaluation, NasdaqClient, OptionChain, OptionSide, QuoteProvider,
    SnapshotProvider, TickerRequest,
};
pub use engine::Screener;
pub use expiry::ExpiryGroups;
pub use pricing::{AnnualizationModel, CommissionModel, RoiStrategy};
pub use report::{OutputFormat, ScreenReport};
