//! Black-Scholes-Merton process state
//!
//! Market inputs for one underlying at one evaluation date. Engines read it,
//! the process store mutates it in place.

use chrono::NaiveDate;

use crate::dates::{Calendar, DayCounter};

/// Spot, carry and volatility of an underlying as of an evaluation date
#[derive(Debug, Clone, PartialEq)]
pub struct BlackScholesProcess {
    /// Underlying name the process belongs to
    pub underlying: String,
    pub evaluation_date: NaiveDate,
    pub spot: f64,
    /// Continuously compounded risk-free zero rate
    pub risk_free_rate: f64,
    /// Continuous dividend yield (already tax adjusted)
    pub dividend_yield: f64,
    /// Black volatility (annualized, decimal)
    pub volatility: f64,
    pub calendar: Calendar,
    pub day_counter: DayCounter,
}

impl BlackScholesProcess {
    pub fn new(
        underlying: impl Into<String>,
        evaluation_date: NaiveDate,
        calendar: Calendar,
        day_counter: DayCounter,
    ) -> Self {
        Self {
            underlying: underlying.into(),
            evaluation_date,
            spot: f64::NAN,
            risk_free_rate: 0.0,
            dividend_yield: 0.0,
            volatility: 0.2,
            calendar,
            day_counter,
        }
    }

    /// Year fraction from the evaluation date to `date`
    pub fn time_to(&self, date: NaiveDate) -> f64 {
        self.day_counter.year_fraction(self.evaluation_date, date)
    }

    /// Copy with another volatility, used while solving for implied vol
    pub fn with_volatility(&self, volatility: f64) -> Self {
        Self {
            volatility,
            ..self.clone()
        }
    }

    pub fn with_spot(&self, spot: f64) -> Self {
        Self {
            spot,
            ..self.clone()
        }
    }

    /// Forward price for time `t` in years
    pub fn forward(&self, t: f64) -> f64 {
        self.spot * ((self.risk_free_rate - self.dividend_yield) * t).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_and_forward() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut process = BlackScholesProcess::new(
            "SPX",
            date,
            Calendar::weekends_only(),
            DayCounter::Actual365Fixed,
        );
        process.spot = 100.0;
        process.risk_free_rate = 0.05;
        process.dividend_yield = 0.01;

        let t = process.time_to(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert!((t - 365.0 / 365.0).abs() < 1e-12);
        assert!((process.forward(1.0) - 100.0 * 0.04_f64.exp()).abs() < 1e-10);

        let bumped = process.with_volatility(0.3);
        assert_eq!(bumped.volatility, 0.3);
        assert_eq!(bumped.spot, 100.0);
    }
}
