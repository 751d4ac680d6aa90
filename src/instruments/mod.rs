//! Financial instruments
//!
//! - Equity options valued through the shared process store
//! - Currency spots and cash balances
//! - OIS rates as curve calibration helpers

pub mod currency;
pub mod equity_option;
pub mod ois;

pub use currency::*;
pub use equity_option::*;
pub use ois::*;
