//! Zero-rate curves and their time series

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{ValuationError, ValuationResult};
use crate::dates::{Calendar, DayCounter};

/// Continuously compounded zero curve on year-fraction pillars.
///
/// Linear in the zero rate between pillars, flat outside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroCurve {
    /// (year fraction, zero rate) sorted by time
    pillars: Vec<(f64, f64)>,
}

impl ZeroCurve {
    pub fn new(mut pillars: Vec<(f64, f64)>) -> ValuationResult<Self> {
        if pillars.is_empty() {
            return Err(ValuationError::data("zero curve needs at least one pillar"));
        }
        if pillars.iter().any(|(t, r)| !t.is_finite() || !r.is_finite()) {
            return Err(ValuationError::data("zero curve pillars must be finite"));
        }
        pillars.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self { pillars })
    }

    pub fn flat(rate: f64) -> Self {
        Self {
            pillars: vec![(0.0, rate)],
        }
    }

    pub fn pillars(&self) -> &[(f64, f64)] {
        &self.pillars
    }

    /// Zero rate for time `t` in years
    pub fn zero_rate(&self, t: f64) -> f64 {
        let first = self.pillars[0];
        let last = self.pillars[self.pillars.len() - 1];
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }

        let idx = self.pillars.partition_point(|(pt, _)| *pt <= t);
        let (t0, r0) = self.pillars[idx - 1];
        let (t1, r1) = self.pillars[idx];
        r0 + (r1 - r0) * (t - t0) / (t1 - t0)
    }

    pub fn discount(&self, t: f64) -> f64 {
        (-self.zero_rate(t) * t).exp()
    }

    /// Continuous forward rate between `t1` and `t2`
    pub fn forward_rate(&self, t1: f64, t2: f64) -> f64 {
        if (t2 - t1).abs() < 1e-12 {
            // instantaneous forward by a small central bump
            let h = 1e-4;
            let lo = (t1 - h).max(0.0);
            return self.forward_rate(lo, lo + 2.0 * h);
        }
        (self.zero_rate(t2) * t2 - self.zero_rate(t1) * t1) / (t2 - t1)
    }
}

/// One zero curve per observation date
#[derive(Debug, Clone, PartialEq)]
pub struct YieldCurveTimeSeries {
    curves: BTreeMap<NaiveDate, ZeroCurve>,
    pub day_counter: DayCounter,
    pub calendar: Calendar,
}

impl YieldCurveTimeSeries {
    pub fn new(day_counter: DayCounter, calendar: Calendar) -> Self {
        Self {
            curves: BTreeMap::new(),
            day_counter,
            calendar,
        }
    }

    pub fn insert(&mut self, date: NaiveDate, curve: ZeroCurve) {
        self.curves.insert(date, curve);
    }

    pub fn with_curve(mut self, date: NaiveDate, curve: ZeroCurve) -> Self {
        self.insert(date, curve);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Curve observed at `date`, or the last one before it
    pub fn curve_at(&self, date: NaiveDate) -> ValuationResult<&ZeroCurve> {
        self.curves
            .range(..=date)
            .next_back()
            .map(|(_, c)| c)
            .ok_or_else(|| ValuationError::data(format!("no yield curve available on {}", date)))
    }

    /// Zero rate to `to_date` on the curve observed at `date`
    pub fn zero_rate_to_date(&self, date: NaiveDate, to_date: NaiveDate) -> ValuationResult<f64> {
        let curve = self.curve_at(date)?;
        Ok(curve.zero_rate(self.day_counter.year_fraction(date, to_date)))
    }

    pub fn discount_to_date(&self, date: NaiveDate, to_date: NaiveDate) -> ValuationResult<f64> {
        let curve = self.curve_at(date)?;
        Ok(curve.discount(self.day_counter.year_fraction(date, to_date)))
    }

    /// Forward rate between two dates on the curve observed at `date`
    pub fn forward_rate_date_to_date(
        &self,
        date: NaiveDate,
        to_date1: NaiveDate,
        to_date2: NaiveDate,
    ) -> ValuationResult<f64> {
        let curve = self.curve_at(date)?;
        let t1 = self.day_counter.year_fraction(date, to_date1);
        let t2 = self.day_counter.year_fraction(date, to_date2);
        Ok(curve.forward_rate(t1, t2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_interpolation_and_extrapolation() {
        let curve = ZeroCurve::new(vec![(2.0, 0.06), (1.0, 0.04)]).unwrap();
        assert!((curve.zero_rate(1.5) - 0.05).abs() < 1e-12);
        assert_eq!(curve.zero_rate(0.1), 0.04);
        assert_eq!(curve.zero_rate(10.0), 0.06);
    }

    #[test]
    fn test_forward_consistent_with_discounts() {
        let curve = ZeroCurve::new(vec![(1.0, 0.04), (2.0, 0.06)]).unwrap();
        let f = curve.forward_rate(1.0, 2.0);
        let ratio = curve.discount(1.0) / curve.discount(2.0);
        assert!((ratio.ln() - f).abs() < 1e-12);
    }

    #[test]
    fn test_empty_curve_rejected() {
        assert!(ZeroCurve::new(vec![]).is_err());
    }

    #[test]
    fn test_last_available_curve() {
        let ts = YieldCurveTimeSeries::new(DayCounter::Actual365Fixed, Calendar::weekends_only())
            .with_curve(d(2024, 1, 2), ZeroCurve::flat(0.05))
            .with_curve(d(2024, 1, 5), ZeroCurve::flat(0.06));

        assert_eq!(ts.zero_rate_to_date(d(2024, 1, 3), d(2024, 6, 1)).unwrap(), 0.05);
        assert_eq!(ts.zero_rate_to_date(d(2024, 2, 1), d(2024, 6, 1)).unwrap(), 0.06);
        assert!(ts.zero_rate_to_date(d(2023, 12, 1), d(2024, 6, 1)).is_err());
    }
}
