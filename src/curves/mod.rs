//! Yield curves
//!
//! Continuous zero-rate curves per observation date, and curves implied
//! forward from a base date.

pub mod implied;
pub mod zero;

pub use implied::*;
pub use zero::*;
