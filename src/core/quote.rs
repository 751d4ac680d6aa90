//! Quote series
//!
//! Date-indexed market observations (prices, implied vols, rates) with the
//! "last available value" lookup used throughout valuation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Time-indexed sequence of observed values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteSeries {
    values: BTreeMap<NaiveDate, f64>,
}

impl QuoteSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        Self {
            values: pairs.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, date: NaiveDate, value: f64) {
        self.values.insert(date, value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First date holding a real (non-NaN) observation
    pub fn first_valid_date(&self) -> Option<NaiveDate> {
        self.values
            .iter()
            .find(|(_, v)| !v.is_nan())
            .map(|(d, _)| *d)
    }

    /// Last date holding a real (non-NaN) observation
    pub fn last_valid_date(&self) -> Option<NaiveDate> {
        self.values
            .iter()
            .rev()
            .find(|(_, v)| !v.is_nan())
            .map(|(d, _)| *d)
    }

    /// Value at `date`.
    ///
    /// When the date is missing (or holds NaN) and `last_available` is set,
    /// the most recent earlier observation is returned; otherwise
    /// `fill_value`.
    pub fn get_value(&self, date: NaiveDate, last_available: bool, fill_value: f64) -> f64 {
        if let Some(v) = self.values.get(&date) {
            if !v.is_nan() {
                return *v;
            }
        }
        if last_available {
            if let Some(v) = self
                .values
                .range(..=date)
                .rev()
                .map(|(_, v)| *v)
                .find(|v| !v.is_nan())
            {
                return v;
            }
        }
        fill_value
    }

    /// Vectorized [`QuoteSeries::get_value`]
    pub fn get_values(&self, dates: &[NaiveDate], last_available: bool, fill_value: f64) -> Vec<f64> {
        dates
            .iter()
            .map(|d| self.get_value(*d, last_available, fill_value))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &f64)> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series() -> QuoteSeries {
        QuoteSeries::from_pairs([
            (d(2024, 3, 11), 10.0),
            (d(2024, 3, 12), f64::NAN),
            (d(2024, 3, 13), 12.0),
        ])
    }

    #[test]
    fn test_exact_lookup() {
        assert_eq!(series().get_value(d(2024, 3, 13), false, f64::NAN), 12.0);
    }

    #[test]
    fn test_last_available() {
        let s = series();
        // NaN entry falls back to the prior observation
        assert_eq!(s.get_value(d(2024, 3, 12), true, f64::NAN), 10.0);
        // date after the series end
        assert_eq!(s.get_value(d(2024, 4, 1), true, f64::NAN), 12.0);
        // nothing before the first observation
        assert!(s.get_value(d(2024, 1, 1), true, f64::NAN).is_nan());
    }

    #[test]
    fn test_fill_value() {
        let s = series();
        assert_eq!(s.get_value(d(2024, 3, 14), false, -1.0), -1.0);
        assert_eq!(
            s.get_values(&[d(2024, 3, 11), d(2024, 3, 14)], false, 0.0),
            vec![10.0, 0.0]
        );
    }

    #[test]
    fn test_valid_dates() {
        let s = series();
        assert_eq!(s.first_valid_date(), Some(d(2024, 3, 11)));
        assert_eq!(s.last_valid_date(), Some(d(2024, 3, 13)));
        assert!(QuoteSeries::new().first_valid_date().is_none());
    }
}
