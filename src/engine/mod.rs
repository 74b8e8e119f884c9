//! Screening engine.
//!
//! Ties the chain filter, evaluators and cherry filter together and runs them
//! across a ticker list.

pub mod screener;

pub use screener::Screener;
