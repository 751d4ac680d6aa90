//! Market data storage
//!
//! Handles:
//! - JSON market snapshots (underlyings, instruments, curves, config)
//! - Local store for snapshots and calibrated volatilities

pub mod snapshot;
pub mod store;

pub use snapshot::*;
pub use store::*;
