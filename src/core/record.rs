//! Time-series backed instrument records
//!
//! Every instrument is described by a [`TimeSeries`]: a name, a bag of static
//! string attributes and a set of named quote series. Typed records such as
//! [`OptionRecord`] are parsed from it once and are read-only afterwards.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{ValuationError, ValuationResult};
use super::option::{OptionType, PlainVanillaPayoff};
use super::quote::QuoteSeries;
use crate::dates::{Calendar, DayCounter};

// Attribute keys
pub const OPTION_TYPE: &str = "OPTION_TYPE";
pub const STRIKE_PRICE: &str = "STRIKE_PRICE";
pub const MATURITY_DATE: &str = "MATURITY_DATE";
pub const CALENDAR: &str = "CALENDAR";
pub const DAY_COUNTER: &str = "DAY_COUNTER";
pub const EXERCISE_TYPE: &str = "EXERCISE_TYPE";
pub const UNDERLYING_INSTRUMENT: &str = "UNDERLYING_INSTRUMENT";
pub const OPTION_CONTRACT_SIZE: &str = "OPTION_CONTRACT_SIZE";
pub const CURRENCY: &str = "CURRENCY";
pub const BASE_CURRENCY: &str = "BASE_CURRENCY";
pub const BASE_CALENDAR: &str = "BASE_CALENDAR";
pub const COUNTRY: &str = "COUNTRY";
pub const TENOR: &str = "TENOR";
pub const INDEX: &str = "INDEX";
pub const INDEX_TENOR: &str = "INDEX_TENOR";
pub const SETTLEMENT_DAYS: &str = "SETTLEMENT_DAYS";
pub const PAYMENT_LAG: &str = "PAYMENT_LAG";

// Component series names
pub const PX_MID: &str = "PX_MID";
pub const IVOL_MID: &str = "IVOL_MID";
pub const PX_LAST: &str = "PX_LAST";
pub const DIVIDEND_YIELD: &str = "DIVIDEND_YIELD";

/// Named bundle of static attributes and quote series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub ts_name: String,
    #[serde(default)]
    pub ts_attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub components: BTreeMap<String, QuoteSeries>,
}

impl TimeSeries {
    pub fn new(ts_name: impl Into<String>) -> Self {
        Self {
            ts_name: ts_name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl ToString) -> Self {
        self.ts_attributes.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_component(mut self, key: &str, series: QuoteSeries) -> Self {
        self.components.insert(key.to_string(), series);
        self
    }

    /// Required attribute
    pub fn attribute(&self, key: &str) -> ValuationResult<&str> {
        self.ts_attributes
            .get(key)
            .map(|s| s.as_str())
            .ok_or_else(|| {
                ValuationError::configuration(format!(
                    "{}: missing attribute {}",
                    self.ts_name, key
                ))
            })
    }

    /// Required attribute parsed into `T`
    pub fn parse_attribute<T: FromStr>(&self, key: &str) -> ValuationResult<T> {
        let raw = self.attribute(key)?;
        raw.trim().parse::<T>().map_err(|_| {
            ValuationError::configuration(format!(
                "{}: invalid value '{}' for attribute {}",
                self.ts_name, raw, key
            ))
        })
    }

    /// Required attribute holding an ISO date (a time suffix is ignored)
    pub fn date_attribute(&self, key: &str) -> ValuationResult<NaiveDate> {
        let raw = self.attribute(key)?.trim();
        let day = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| {
            ValuationError::configuration(format!(
                "{}: invalid date '{}' for attribute {}",
                self.ts_name, raw, key
            ))
        })
    }

    pub fn component(&self, key: &str) -> Option<&QuoteSeries> {
        self.components.get(key)
    }

    /// Component series, empty when the record does not carry it
    pub fn component_or_empty(&self, key: &str) -> QuoteSeries {
        self.components.get(key).cloned().unwrap_or_default()
    }
}

/// Static data of an equity option
#[derive(Debug, Clone, PartialEq)]
pub struct OptionRecord {
    pub name: String,
    pub option_type: OptionType,
    pub strike: f64,
    pub contract_size: f64,
    pub maturity: NaiveDate,
    pub calendar: Calendar,
    pub day_counter: DayCounter,
    /// Raw exercise type; validated when a contract is built
    pub exercise_type: String,
    pub underlying: String,
}

impl OptionRecord {
    pub fn from_timeseries(ts: &TimeSeries) -> ValuationResult<Self> {
        Ok(Self {
            name: ts.ts_name.clone(),
            option_type: ts.parse_attribute(OPTION_TYPE)?,
            strike: ts.parse_attribute(STRIKE_PRICE)?,
            contract_size: ts.parse_attribute(OPTION_CONTRACT_SIZE)?,
            maturity: ts.date_attribute(MATURITY_DATE)?,
            calendar: Calendar::from_name(ts.attribute(CALENDAR)?)?,
            day_counter: DayCounter::from_name(ts.attribute(DAY_COUNTER)?)?,
            exercise_type: ts.attribute(EXERCISE_TYPE)?.to_string(),
            underlying: ts.attribute(UNDERLYING_INSTRUMENT)?.to_string(),
        })
    }

    pub fn payoff(&self) -> PlainVanillaPayoff {
        PlainVanillaPayoff::new(self.option_type, self.strike)
    }
}
