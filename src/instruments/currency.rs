//! Currency spots and cash balances
//!
//! A currency record quotes `CURRENCY` against `BASE_CURRENCY`. Values are
//! requested in a currency code and come back as the quote, its reciprocal,
//! or NaN when the code matches neither side.

use chrono::NaiveDate;

use crate::core::{
    QuoteSeries, TimeSeries, ValuationError, ValuationResult, BASE_CALENDAR, BASE_CURRENCY,
    CALENDAR, COUNTRY, CURRENCY, PX_LAST,
};
use crate::dates::Calendar;

/// Static attributes shared by currency instruments
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyPair {
    pub currency: String,
    pub base_currency: String,
    pub calendar: Calendar,
    pub base_calendar: Calendar,
    pub country: String,
}

impl CurrencyPair {
    pub fn from_timeseries(ts: &TimeSeries) -> ValuationResult<Self> {
        Ok(Self {
            currency: ts.attribute(CURRENCY)?.trim().to_uppercase(),
            base_currency: ts.attribute(BASE_CURRENCY)?.trim().to_uppercase(),
            calendar: Calendar::from_name(ts.attribute(CALENDAR)?)?,
            base_calendar: Calendar::from_name(ts.attribute(BASE_CALENDAR)?)?,
            country: ts.attribute(COUNTRY)?.to_string(),
        })
    }

    /// Upper-cased requested code, defaulting to the quoted currency
    fn requested(&self, currency: Option<&str>) -> String {
        currency.map_or_else(|| self.currency.clone(), |c| c.trim().to_uppercase())
    }

    fn value(
        &self,
        quotes: &QuoteSeries,
        date: NaiveDate,
        currency: Option<&str>,
        last_available: bool,
    ) -> f64 {
        let requested = self.requested(currency);
        if requested.chars().count() != 3 {
            return f64::NAN;
        }
        if self.currency == self.base_currency {
            return 1.0;
        }
        let quote = quotes.get_value(date, last_available, f64::NAN);
        if requested == self.currency {
            quote
        } else if requested == self.base_currency {
            1.0 / quote
        } else {
            f64::NAN
        }
    }
}

fn quotes_of(ts: &TimeSeries) -> ValuationResult<QuoteSeries> {
    ts.component(PX_LAST)
        .cloned()
        .ok_or_else(|| ValuationError::data(format!("{}: missing {} series", ts.ts_name, PX_LAST)))
}

/// Spot exchange rate
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencySpot {
    pub name: String,
    pub pair: CurrencyPair,
    quotes: QuoteSeries,
}

impl CurrencySpot {
    pub fn from_timeseries(ts: &TimeSeries) -> ValuationResult<Self> {
        Ok(Self {
            name: ts.ts_name.clone(),
            pair: CurrencyPair::from_timeseries(ts)?,
            quotes: quotes_of(ts)?,
        })
    }

    /// Value of one unit in `currency`.
    ///
    /// NaN for codes that are not three letters or match neither side of the
    /// pair; 1 when the pair quotes a currency against itself.
    pub fn value(&self, date: NaiveDate, currency: Option<&str>, last_available: bool) -> f64 {
        self.pair.value(&self.quotes, date, currency, last_available)
    }

    pub fn risk_value(&self, date: NaiveDate, currency: Option<&str>, last_available: bool) -> f64 {
        self.value(date, currency, last_available)
    }

    /// Spot level used to seed a process in `currency`
    pub fn security(&self, date: NaiveDate, currency: Option<&str>, last_available: bool) -> f64 {
        let quote = self.quotes.get_value(date, last_available, f64::NAN);
        if self.pair.requested(currency) == self.pair.base_currency {
            1.0 / quote
        } else {
            quote
        }
    }
}

/// Cash balance valued with a separate exchange-rate series
#[derive(Debug, Clone, PartialEq)]
pub struct Cash {
    pub name: String,
    pub pair: CurrencyPair,
    currency_quotes: QuoteSeries,
}

impl Cash {
    pub fn from_timeseries(ts: &TimeSeries, currency_ts: &TimeSeries) -> ValuationResult<Self> {
        Ok(Self {
            name: ts.ts_name.clone(),
            pair: CurrencyPair::from_timeseries(ts)?,
            currency_quotes: quotes_of(currency_ts)?,
        })
    }

    /// Same rules as [`CurrencySpot::value`] on the exchange-rate series
    pub fn value(&self, date: NaiveDate, currency: Option<&str>, last_available: bool) -> f64 {
        self.pair
            .value(&self.currency_quotes, date, currency, last_available)
    }

    pub fn risk_value(&self, date: NaiveDate, currency: Option<&str>, last_available: bool) -> f64 {
        self.value(date, currency, last_available)
    }

    pub fn security(&self, date: NaiveDate, currency: Option<&str>, last_available: bool) -> f64 {
        let quote = self.currency_quotes.get_value(date, last_available, f64::NAN);
        if self.pair.requested(currency) == self.pair.base_currency {
            1.0 / quote
        } else if self.pair.currency == self.pair.base_currency {
            1.0
        } else {
            quote
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn brl_ts(currency: &str) -> TimeSeries {
        TimeSeries::new("USDBRL Curncy")
            .with_attribute(CURRENCY, currency)
            .with_attribute(BASE_CURRENCY, "USD")
            .with_attribute(CALENDAR, "BRAZIL")
            .with_attribute(BASE_CALENDAR, "UNITED_STATES")
            .with_attribute(COUNTRY, "BR")
            .with_component(PX_LAST, QuoteSeries::from_pairs([(d(2024, 3, 11), 5.0)]))
    }

    #[test]
    fn test_value_in_each_currency() {
        let spot = CurrencySpot::from_timeseries(&brl_ts("BRL")).unwrap();
        let date = d(2024, 3, 11);
        assert_eq!(spot.value(date, None, false), 5.0);
        assert_eq!(spot.value(date, Some("brl"), false), 5.0);
        assert_eq!(spot.value(date, Some("USD"), false), 0.2);
        assert!(spot.value(date, Some("EUR"), false).is_nan());
        assert_eq!(spot.risk_value(date, Some("USD"), false), 0.2);
    }

    #[test]
    fn test_two_letter_code_is_nan() {
        let spot = CurrencySpot::from_timeseries(&brl_ts("BRL")).unwrap();
        assert!(spot.value(d(2024, 3, 11), Some("BR"), false).is_nan());
    }

    #[test]
    fn test_code_length_counts_characters() {
        let spot = CurrencySpot::from_timeseries(&brl_ts("USD")).unwrap();
        // three characters, five bytes
        assert_eq!(spot.value(d(2024, 3, 11), Some("€UR"), false), 1.0);
        assert!(spot.value(d(2024, 3, 11), Some("€U"), false).is_nan());
    }

    #[test]
    fn test_last_available_flag() {
        let spot = CurrencySpot::from_timeseries(&brl_ts("BRL")).unwrap();
        assert!(spot.value(d(2024, 3, 12), None, false).is_nan());
        assert_eq!(spot.value(d(2024, 3, 12), None, true), 5.0);
    }

    #[test]
    fn test_same_currency_is_one() {
        let spot = CurrencySpot::from_timeseries(&brl_ts("USD")).unwrap();
        assert_eq!(spot.value(d(2024, 3, 11), Some("EUR"), false), 1.0);
    }

    #[test]
    fn test_security() {
        let spot = CurrencySpot::from_timeseries(&brl_ts("BRL")).unwrap();
        assert_eq!(spot.security(d(2024, 3, 11), Some("USD"), false), 0.2);
        assert_eq!(spot.security(d(2024, 3, 11), None, false), 5.0);
    }

    #[test]
    fn test_cash_uses_currency_series() {
        let cash_ts = brl_ts("USD").with_component(PX_LAST, QuoteSeries::new());
        let fx_ts = TimeSeries::new("FX")
            .with_component(PX_LAST, QuoteSeries::from_pairs([(d(2024, 3, 11), 4.0)]));
        let cash = Cash::from_timeseries(&cash_ts, &fx_ts).unwrap();

        assert_eq!(cash.value(d(2024, 3, 11), Some("USD"), false), 1.0);
        // base currency requested takes the reciprocal before the same-currency rule
        assert_eq!(cash.security(d(2024, 3, 11), Some("USD"), false), 0.25);
        assert_eq!(cash.security(d(2024, 3, 11), Some("BRL"), false), 1.0);
    }
}
