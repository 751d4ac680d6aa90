//! Valuation orchestration
//!
//! Shared process state per underlying, per-option volatility calibration
//! and the configuration and call arguments that drive them.

pub mod args;
pub mod config;
pub mod process_store;
pub mod volatility;

pub use args::*;
pub use config::*;
pub use process_store::*;
pub use volatility::*;
