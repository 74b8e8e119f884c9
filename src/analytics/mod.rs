//! Options analytics module.
//!
//! Provides:
//! - Strike/quote filtering of raw chains
//! - Cash-secured put evaluation
//! - Call credit spread search across a width ladder
//! - Cherry (dominance) filtering

pub mod chain_filter;
pub mod cherry;
pub mod put_evaluator;
pub mod spread_optimizer;

pub use chain_filter::{filter_chain, QuotedRow};
pub use cherry::{pick_cherries, CherryMode};
pub use put_evaluator::{PutEvaluator, PutEvaluatorConfig};
pub use spread_optimizer::{default_spread_widths, SpreadOptimizer, SpreadOptimizerConfig};
