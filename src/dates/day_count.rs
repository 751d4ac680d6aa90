//! Day-count conventions

use chrono::{Datelike, NaiveDate};

use super::calendar::Calendar;
use crate::core::{ValuationError, ValuationResult};

/// Day counter used to turn a pair of dates into a year fraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayCounter {
    Actual365Fixed,
    Actual360,
    /// 30/360 US (bond basis)
    Thirty360,
    /// Business days over 252 on the given calendar
    Business252(Calendar),
}

impl DayCounter {
    /// Resolve a day counter from its configured name.
    ///
    /// `BUSINESS252` counts on the Brazilian calendar unless one is given
    /// with [`DayCounter::Business252`] directly.
    pub fn from_name(name: &str) -> ValuationResult<Self> {
        let key: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_uppercase();

        match key.as_str() {
            "ACTUAL365FIXED" | "ACTUAL365" | "ACT365" | "ACT365FIXED" => Ok(Self::Actual365Fixed),
            "ACTUAL360" | "ACT360" => Ok(Self::Actual360),
            "THIRTY360" | "30360" => Ok(Self::Thirty360),
            "BUSINESS252" | "BUS252" => Ok(Self::Business252(Calendar::brazil())),
            _ => Err(ValuationError::configuration(format!(
                "Day counter not supported: {}",
                name
            ))),
        }
    }

    pub fn day_count(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        match self {
            Self::Actual365Fixed | Self::Actual360 => (end - start).num_days(),
            Self::Thirty360 => thirty_360_days(start, end),
            Self::Business252(calendar) => calendar.business_days_between(start, end),
        }
    }

    /// Year fraction between two dates; antisymmetric in its arguments
    pub fn year_fraction(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        if start == end {
            return 0.0;
        }
        if start > end {
            return -self.year_fraction(end, start);
        }

        let days = self.day_count(start, end) as f64;
        match self {
            Self::Actual365Fixed => days / 365.0,
            Self::Actual360 | Self::Thirty360 => days / 360.0,
            Self::Business252(_) => days / 252.0,
        }
    }
}

fn thirty_360_days(start: NaiveDate, end: NaiveDate) -> i64 {
    let mut d1 = start.day() as i64;
    let mut d2 = end.day() as i64;
    if d1 == 31 {
        d1 = 30;
    }
    if d2 == 31 && d1 >= 30 {
        d2 = 30;
    }
    360 * (end.year() - start.year()) as i64
        + 30 * (end.month() as i64 - start.month() as i64)
        + (d2 - d1)
}
