//! Tenor periods ("3M", "1Y", ...)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{ValuationError, ValuationResult};

/// Unit for calendar arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    Days,
    Weeks,
    Months,
    Years,
}

/// A signed length of time, e.g. `3M` or `-1D`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub length: i32,
    pub unit: TimeUnit,
}

impl Period {
    pub fn new(length: i32, unit: TimeUnit) -> Self {
        Self { length, unit }
    }

    pub fn days(length: i32) -> Self {
        Self::new(length, TimeUnit::Days)
    }

    pub fn months(length: i32) -> Self {
        Self::new(length, TimeUnit::Months)
    }

    pub fn years(length: i32) -> Self {
        Self::new(length, TimeUnit::Years)
    }

    /// Length expressed in months, `None` for day and week units
    pub fn in_months(&self) -> ValuationResult<Option<i32>> {
        match self.unit {
            TimeUnit::Months => Ok(Some(self.length)),
            TimeUnit::Years => self.length.checked_mul(12).map(Some).ok_or_else(|| {
                ValuationError::configuration(format!("period {} is out of range", self))
            }),
            _ => Ok(None),
        }
    }
}

impl FromStr for Period {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_uppercase();
        let unit_char = s
            .chars()
            .last()
            .ok_or_else(|| ValuationError::invalid_input("empty period"))?;

        let unit = match unit_char {
            'D' => TimeUnit::Days,
            'W' => TimeUnit::Weeks,
            'M' => TimeUnit::Months,
            'Y' => TimeUnit::Years,
            other => {
                return Err(ValuationError::invalid_input(format!(
                    "unknown period unit '{}' in '{}'",
                    other, s
                )))
            }
        };

        let length = s[..s.len() - 1]
            .parse::<i32>()
            .map_err(|_| ValuationError::invalid_input(format!("invalid period '{}'", s)))?;

        Ok(Self { length, unit })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            TimeUnit::Days => 'D',
            TimeUnit::Weeks => 'W',
            TimeUnit::Months => 'M',
            TimeUnit::Years => 'Y',
        };
        write!(f, "{}{}", self.length, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_period() {
        assert_eq!("3M".parse::<Period>().unwrap(), Period::months(3));
        assert_eq!("1y".parse::<Period>().unwrap(), Period::years(1));
        assert_eq!("10D".parse::<Period>().unwrap(), Period::days(10));
        assert_eq!("2W".parse::<Period>().unwrap().unit, TimeUnit::Weeks);
        assert!("3Q".parse::<Period>().is_err());
        assert!("M".parse::<Period>().is_err());
    }

    #[test]
    fn test_period_months() {
        assert_eq!(Period::years(2).in_months().unwrap(), Some(24));
        assert_eq!(Period::days(5).in_months().unwrap(), None);
        assert_eq!(Period::months(6).to_string(), "6M");
    }

    #[test]
    fn test_huge_year_tenor_is_configuration_error() {
        let period: Period = "200000000Y".parse().unwrap();
        assert!(matches!(
            period.in_months(),
            Err(ValuationError::Configuration(_))
        ));
    }
}
