//! Overnight indexed swap rates
//!
//! An OIS quote is turned into a rate helper: the quote plus the schedule
//! dates a curve bootstrapper needs. Bootstrapping itself is not done here.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{
    QuoteSeries, TimeSeries, ValuationError, ValuationResult, INDEX, INDEX_TENOR, PAYMENT_LAG,
    PX_LAST, SETTLEMENT_DAYS, TENOR,
};
use crate::dates::{BusinessDayConvention, Calendar, DayCounter, Period, TimeUnit};

/// Overnight rate index conventions
#[derive(Debug, Clone, PartialEq)]
pub struct RateIndex {
    pub name: String,
    pub tenor: Period,
    pub fixing_calendar: Calendar,
    pub day_counter: DayCounter,
    pub fixing_days: i32,
    pub convention: BusinessDayConvention,
    pub end_of_month: bool,
}

impl RateIndex {
    /// Conventions of a known overnight index
    pub fn from_name(name: &str, tenor: Period) -> ValuationResult<Self> {
        let key = name.trim().to_uppercase();
        let (fixing_calendar, day_counter, fixing_days) = match key.as_str() {
            "CDI" => (
                Calendar::brazil(),
                DayCounter::Business252(Calendar::brazil()),
                0,
            ),
            "SOFR" | "FEDFUNDS" => (Calendar::united_states(), DayCounter::Actual360, 0),
            "SONIA" => (Calendar::weekends_only(), DayCounter::Actual365Fixed, 0),
            "ESTR" | "EONIA" => (Calendar::weekends_only(), DayCounter::Actual360, 0),
            _ => {
                return Err(ValuationError::configuration(format!(
                    "Rate index not supported: {}",
                    name
                )))
            }
        };

        Ok(Self {
            name: key,
            tenor,
            fixing_calendar,
            day_counter,
            fixing_days,
            convention: BusinessDayConvention::ModifiedFollowing,
            end_of_month: false,
        })
    }
}

/// Calibration descriptor for one OIS quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OisRateHelper {
    /// Quoted rate in decimal
    pub quote: f64,
    pub settlement_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub tenor: Period,
    pub payment_lag: i32,
    pub telescopic_value_dates: bool,
}

/// Constant-maturity OIS rate quoted in percent
#[derive(Debug, Clone, PartialEq)]
pub struct OisRate {
    pub name: String,
    pub tenor: Period,
    pub index: RateIndex,
    pub settlement_days: i32,
    pub payment_lag: i32,
    pub telescopic_value_dates: bool,
    quotes: QuoteSeries,
}

fn parse_period(ts: &TimeSeries, key: &str) -> ValuationResult<Period> {
    Period::from_str(ts.attribute(key)?).map_err(|e| {
        ValuationError::configuration(format!("{}: attribute {}: {}", ts.ts_name, key, e))
    })
}

impl OisRate {
    pub fn from_timeseries(ts: &TimeSeries) -> ValuationResult<Self> {
        let tenor = parse_period(ts, TENOR)?;
        let index_tenor = parse_period(ts, INDEX_TENOR)?;
        Ok(Self {
            name: ts.ts_name.clone(),
            tenor,
            index: RateIndex::from_name(ts.attribute(INDEX)?, index_tenor)?,
            settlement_days: ts.parse_attribute(SETTLEMENT_DAYS)?,
            payment_lag: ts.parse_attribute(PAYMENT_LAG)?,
            telescopic_value_dates: true,
            quotes: ts.component_or_empty(PX_LAST),
        })
    }

    pub fn calendar(&self) -> &Calendar {
        &self.index.fixing_calendar
    }

    pub fn day_counter(&self) -> &DayCounter {
        &self.index.day_counter
    }

    /// Quoted rate in decimal; NaN when there is no quote
    pub fn rate(&self, date: NaiveDate, last_available: bool) -> f64 {
        self.quotes.get_value(date, last_available, f64::NAN) / 100.0
    }

    pub fn settlement_date(&self, date: NaiveDate) -> ValuationResult<NaiveDate> {
        let calendar = self.calendar();
        calendar.advance(calendar.adjust(date, BusinessDayConvention::Following), self.settlement_days, TimeUnit::Days)
    }

    /// Swap maturity for a trade on `date`
    pub fn maturity(&self, date: NaiveDate) -> ValuationResult<NaiveDate> {
        let settlement = self.settlement_date(date)?;
        self.calendar().advance_period(
            settlement,
            self.tenor,
            self.index.convention,
            self.index.end_of_month,
        )
    }

    pub fn is_expired(&self, date: NaiveDate) -> ValuationResult<bool> {
        Ok(self.maturity(date)? <= date)
    }

    /// Helper for `date`, `None` when no rate is quoted
    pub fn rate_helper(&self, date: NaiveDate, last_available: bool) -> ValuationResult<Option<OisRateHelper>> {
        let quote = self.rate(date, last_available);
        if quote.is_nan() {
            return Ok(None);
        }
        Ok(Some(OisRateHelper {
            quote,
            settlement_date: self.settlement_date(date)?,
            maturity_date: self.maturity(date)?,
            tenor: self.tenor,
            payment_lag: self.payment_lag,
            telescopic_value_dates: self.telescopic_value_dates,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sofr_ts() -> TimeSeries {
        TimeSeries::new("USOSFR1 Curncy")
            .with_attribute(TENOR, "1Y")
            .with_attribute(INDEX, "sofr")
            .with_attribute(INDEX_TENOR, "1D")
            .with_attribute(SETTLEMENT_DAYS, 2)
            .with_attribute(PAYMENT_LAG, 2)
            .with_component(PX_LAST, QuoteSeries::from_pairs([(d(2024, 3, 8), 5.12)]))
    }

    #[test]
    fn test_rate_helper_dates() {
        let ois = OisRate::from_timeseries(&sofr_ts()).unwrap();
        // Friday trade settles on Tuesday
        let helper = ois.rate_helper(d(2024, 3, 8), false).unwrap().unwrap();
        assert!((helper.quote - 0.0512).abs() < 1e-12);
        assert_eq!(helper.settlement_date, d(2024, 3, 12));
        assert_eq!(helper.maturity_date, d(2025, 3, 12));
        assert!(helper.telescopic_value_dates);
        assert_eq!(helper.payment_lag, 2);
    }

    #[test]
    fn test_missing_quote_has_no_helper() {
        let ois = OisRate::from_timeseries(&sofr_ts()).unwrap();
        assert!(ois.rate_helper(d(2024, 3, 11), false).unwrap().is_none());
        assert!(ois.rate_helper(d(2024, 3, 11), true).unwrap().is_some());
    }

    #[test]
    fn test_unknown_index() {
        let ts = sofr_ts().with_attribute(INDEX, "LIBOR");
        assert!(matches!(
            OisRate::from_timeseries(&ts),
            Err(ValuationError::Configuration(_))
        ));
    }

    #[test]
    fn test_cdi_conventions() {
        let index = RateIndex::from_name("CDI", Period::days(1)).unwrap();
        assert_eq!(index.fixing_calendar, Calendar::brazil());
        assert!(matches!(index.day_counter, DayCounter::Business252(_)));
    }

    #[test]
    fn test_constant_maturity_never_expires() {
        let ois = OisRate::from_timeseries(&sofr_ts()).unwrap();
        assert!(!ois.is_expired(d(2024, 3, 8)).unwrap());
    }

    #[test]
    fn test_out_of_range_tenor_is_an_error() {
        let ts = sofr_ts().with_attribute(TENOR, "200000000Y");
        let ois = OisRate::from_timeseries(&ts).unwrap();
        assert!(matches!(
            ois.maturity(d(2024, 3, 8)),
            Err(ValuationError::Configuration(_))
        ));
    }
}
