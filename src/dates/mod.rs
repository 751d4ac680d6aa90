//! Date utilities
//!
//! Business-day calendars, day-count conventions and tenor periods used to
//! move evaluation dates around and to measure time to maturity.

pub mod calendar;
pub mod day_count;
pub mod period;

pub use calendar::*;
pub use day_count::*;
pub use period::*;
