//! Core data types for option valuation
//!
//! Defines fundamental types:
//! - OptionType / ExerciseStyle / VanillaContract: payoff and exercise
//! - Greeks: price and sensitivities
//! - QuoteSeries: date-indexed observations with last-available lookup
//! - TimeSeries / OptionRecord: static instrument attributes

pub mod error;
pub mod greeks;
pub mod option;
pub mod quote;
pub mod record;

pub use error::*;
pub use greeks::*;
pub use option::*;
pub use quote::*;
pub use record::*;
