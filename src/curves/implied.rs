//! Curves implied forward from a base date
//!
//! For a date after the base date no curve has been observed yet; its rates
//! are the forwards of the base-date curve starting at that date.

use chrono::NaiveDate;

use super::zero::YieldCurveTimeSeries;
use crate::core::ValuationResult;

#[derive(Debug, Clone, Copy)]
pub struct ImpliedYieldCurve<'a> {
    curves: &'a YieldCurveTimeSeries,
    pub base_date: NaiveDate,
}

impl<'a> ImpliedYieldCurve<'a> {
    pub fn new(curves: &'a YieldCurveTimeSeries, base_date: NaiveDate) -> Self {
        Self { curves, base_date }
    }

    /// Zero rate from `date` to `to_date` implied by the base-date curve
    pub fn zero_rate_to_date(&self, date: NaiveDate, to_date: NaiveDate) -> ValuationResult<f64> {
        if date == to_date {
            return self.forward_rate_date_to_date(date, to_date, to_date);
        }
        self.curves
            .forward_rate_date_to_date(self.base_date, date, to_date)
    }

    /// Forward rate between `to_date1` and `to_date2` seen from `date`.
    ///
    /// Forwards do not depend on the reference date of an implied curve, so
    /// `date` only anchors the call signature.
    pub fn forward_rate_date_to_date(
        &self,
        _date: NaiveDate,
        to_date1: NaiveDate,
        to_date2: NaiveDate,
    ) -> ValuationResult<f64> {
        self.curves
            .forward_rate_date_to_date(self.base_date, to_date1, to_date2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::ZeroCurve;
    use crate::dates::{Calendar, DayCounter};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_flat_curve_implies_same_rate() {
        let ts = YieldCurveTimeSeries::new(DayCounter::Actual365Fixed, Calendar::weekends_only())
            .with_curve(d(2024, 1, 2), ZeroCurve::flat(0.05));
        let implied = ImpliedYieldCurve::new(&ts, d(2024, 1, 2));

        let r = implied.zero_rate_to_date(d(2024, 6, 3), d(2024, 12, 2)).unwrap();
        assert!((r - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_upward_curve_implies_higher_forward() {
        let base = d(2024, 1, 2);
        let ts = YieldCurveTimeSeries::new(DayCounter::Actual365Fixed, Calendar::weekends_only())
            .with_curve(base, ZeroCurve::new(vec![(0.5, 0.04), (1.0, 0.05)]).unwrap());
        let implied = ImpliedYieldCurve::new(&ts, base);

        let spot_rate = ts.zero_rate_to_date(base, d(2025, 1, 1)).unwrap();
        let fwd = implied.zero_rate_to_date(d(2024, 7, 2), d(2025, 1, 1)).unwrap();
        assert!(fwd > spot_rate);
    }
}
