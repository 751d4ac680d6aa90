//! Shared Black-Scholes processes
//!
//! One process per underlying, shared by every option written on it. Each
//! valuation call refreshes the process for its own date before pricing, so
//! the last writer wins and a caller must not hold on to process state
//! across calls.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use crate::core::{QuoteSeries, TimeSeries, ValuationError, ValuationResult, DIVIDEND_YIELD, PX_LAST};
use crate::curves::{ImpliedYieldCurve, YieldCurveTimeSeries};
use crate::dates::{Calendar, DayCounter};
use crate::models::BlackScholesProcess;

/// Market data of an equity underlying
#[derive(Debug, Clone, PartialEq)]
pub struct EquityUnderlying {
    pub name: String,
    pub spot: QuoteSeries,
    /// Continuous dividend yield in decimal
    pub dividend_yield: QuoteSeries,
}

impl EquityUnderlying {
    pub fn new(name: impl Into<String>, spot: QuoteSeries) -> Self {
        Self {
            name: name.into(),
            spot,
            dividend_yield: QuoteSeries::new(),
        }
    }

    pub fn with_dividend_yield(mut self, dividend_yield: QuoteSeries) -> Self {
        self.dividend_yield = dividend_yield;
        self
    }

    pub fn from_timeseries(ts: &TimeSeries) -> ValuationResult<Self> {
        let spot = ts
            .component(PX_LAST)
            .cloned()
            .ok_or_else(|| ValuationError::data(format!("{}: missing {} series", ts.ts_name, PX_LAST)))?;
        Ok(Self {
            name: ts.ts_name.clone(),
            spot,
            dividend_yield: ts.component_or_empty(DIVIDEND_YIELD),
        })
    }

    pub fn spot_price(&self, date: NaiveDate, last_available: bool) -> f64 {
        self.spot.get_value(date, last_available, f64::NAN)
    }

    /// Missing yields count as zero
    pub fn dividend_yield(&self, date: NaiveDate, last_available: bool) -> f64 {
        self.dividend_yield.get_value(date, last_available, 0.0)
    }
}

/// Inputs of a process refresh
#[derive(Debug, Clone)]
pub struct ProcessUpdate<'a> {
    pub underlying: &'a str,
    pub date: NaiveDate,
    pub base_date: NaiveDate,
    pub calendar: &'a Calendar,
    pub day_counter: &'a DayCounter,
    /// End of the rate period (option maturity)
    pub maturity: NaiveDate,
    pub dvd_tax_adjust: f64,
    pub last_available: bool,
    pub spot_override: Option<f64>,
    pub initial_vol: f64,
}

/// Processes keyed by underlying name
#[derive(Debug, Clone, Default)]
pub struct ProcessStore {
    underlyings: BTreeMap<String, EquityUnderlying>,
    processes: BTreeMap<String, BlackScholesProcess>,
    rate_curves: Option<YieldCurveTimeSeries>,
    flat_rate: f64,
}

impl ProcessStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_underlying(mut self, underlying: EquityUnderlying) -> Self {
        self.insert_underlying(underlying);
        self
    }

    pub fn insert_underlying(&mut self, underlying: EquityUnderlying) {
        self.underlyings.insert(underlying.name.clone(), underlying);
    }

    /// Zero curves used for the risk-free rate
    pub fn with_rate_curves(mut self, curves: YieldCurveTimeSeries) -> Self {
        self.rate_curves = Some(curves);
        self
    }

    /// Continuous rate used when no curve is configured
    pub fn with_flat_rate(mut self, rate: f64) -> Self {
        self.flat_rate = rate;
        self
    }

    pub fn underlying(&self, name: &str) -> ValuationResult<&EquityUnderlying> {
        self.underlyings
            .get(name)
            .ok_or_else(|| ValuationError::data(format!("unknown underlying {}", name)))
    }

    /// Current state of an underlying's process, if one was built
    pub fn process(&self, underlying: &str) -> Option<&BlackScholesProcess> {
        self.processes.get(underlying)
    }

    fn process_mut(&mut self, underlying: &str) -> ValuationResult<&mut BlackScholesProcess> {
        self.processes
            .get_mut(underlying)
            .ok_or_else(|| ValuationError::data(format!("no process built for {}", underlying)))
    }

    /// Risk-free zero rate from `date` to `maturity`.
    ///
    /// Dates after `base_date` read the curve implied forward from the
    /// base-date curve.
    pub fn risk_free_rate(
        &self,
        date: NaiveDate,
        base_date: NaiveDate,
        maturity: NaiveDate,
    ) -> ValuationResult<f64> {
        match &self.rate_curves {
            None => Ok(self.flat_rate),
            Some(curves) if date > base_date => {
                ImpliedYieldCurve::new(curves, base_date).zero_rate_to_date(date, maturity)
            }
            Some(curves) => curves.zero_rate_to_date(date, maturity),
        }
    }

    /// Refresh the underlying's process for a valuation date
    pub fn update_process(&mut self, update: &ProcessUpdate<'_>) -> ValuationResult<&BlackScholesProcess> {
        let underlying = self.underlying(update.underlying)?;

        let spot = match update.spot_override {
            Some(spot) => spot,
            None => underlying.spot_price(update.date, update.last_available),
        };
        if spot.is_nan() {
            return Err(ValuationError::data(format!(
                "{}: no spot price on {}",
                update.underlying, update.date
            )));
        }
        let dividend_yield =
            underlying.dividend_yield(update.date, update.last_available) * update.dvd_tax_adjust;
        let rate = self.risk_free_rate(update.date, update.base_date, update.maturity)?;

        let process = self
            .processes
            .entry(update.underlying.to_string())
            .or_insert_with(|| {
                BlackScholesProcess::new(
                    update.underlying,
                    update.date,
                    update.calendar.clone(),
                    update.day_counter.clone(),
                )
            });

        process.evaluation_date = update.date;
        process.spot = spot;
        process.risk_free_rate = rate;
        process.dividend_yield = dividend_yield;
        process.volatility = update.initial_vol;
        process.calendar = update.calendar.clone();
        process.day_counter = update.day_counter.clone();

        tracing::debug!(
            "Process {} on {}: spot {}, rate {:.6}, dividend yield {:.6}",
            update.underlying, update.date, spot, rate, dividend_yield
        );
        Ok(&*process)
    }

    pub fn volatility_update(&mut self, underlying: &str, volatility: f64) -> ValuationResult<()> {
        self.process_mut(underlying)?.volatility = volatility;
        Ok(())
    }

    pub fn spot_price_update(&mut self, underlying: &str, spot: f64) -> ValuationResult<()> {
        self.process_mut(underlying)?.spot = spot;
        Ok(())
    }
}
