//! Market snapshots
//!
//! Everything a valuation run needs, in one JSON document: the underlyings,
//! the instrument records, rate curves and the valuation config.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{TimeSeries, ValuationError, ValuationResult};
use crate::curves::{YieldCurveTimeSeries, ZeroCurve};
use crate::dates::{Calendar, DayCounter};
use crate::instruments::{CurrencySpot, EquityOption, OisRate};
use crate::pricing::{EquityUnderlying, ProcessStore, ValuationConfig};

/// Zero curves as stored on disk: (year fraction, rate) pillars per date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveSnapshot {
    pub day_counter: String,
    pub calendar: String,
    pub curves: BTreeMap<NaiveDate, Vec<(f64, f64)>>,
}

impl CurveSnapshot {
    pub fn to_time_series(&self) -> ValuationResult<YieldCurveTimeSeries> {
        let mut ts = YieldCurveTimeSeries::new(
            DayCounter::from_name(&self.day_counter)?,
            Calendar::from_name(&self.calendar)?,
        );
        for (date, pillars) in &self.curves {
            ts.insert(*date, ZeroCurve::new(pillars.clone())?);
        }
        Ok(ts)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSnapshot {
    pub config: ValuationConfig,
    /// Continuous rate used when no curves are given
    pub flat_rate: f64,
    pub rate_curves: Option<CurveSnapshot>,
    pub underlyings: Vec<TimeSeries>,
    pub options: Vec<TimeSeries>,
    pub currencies: Vec<TimeSeries>,
    pub ois_rates: Vec<TimeSeries>,
}

fn find<'a>(series: &'a [TimeSeries], name: &str, kind: &str) -> ValuationResult<&'a TimeSeries> {
    series
        .iter()
        .find(|ts| ts.ts_name == name)
        .ok_or_else(|| ValuationError::data(format!("{} {} not in snapshot", kind, name)))
}

impl MarketSnapshot {
    pub fn from_json_str(json: &str) -> ValuationResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ValuationResult<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        let snapshot = Self::from_json_str(&json)?;
        tracing::info!(
            "Loaded snapshot {:?}: {} underlyings, {} options",
            path.as_ref(),
            snapshot.underlyings.len(),
            snapshot.options.len()
        );
        Ok(snapshot)
    }

    pub fn to_json(&self) -> ValuationResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Process store seeded with every underlying and the rate curves
    pub fn process_store(&self) -> ValuationResult<ProcessStore> {
        let mut store = ProcessStore::new().with_flat_rate(self.flat_rate);
        if let Some(curves) = &self.rate_curves {
            store = store.with_rate_curves(curves.to_time_series()?);
        }
        for ts in &self.underlyings {
            store.insert_underlying(EquityUnderlying::from_timeseries(ts)?);
        }
        Ok(store)
    }

    pub fn option_names(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|ts| ts.ts_name.as_str())
    }

    pub fn option(&self, name: &str) -> ValuationResult<EquityOption> {
        EquityOption::with_config(find(&self.options, name, "option")?, self.config.clone())
    }

    pub fn currency(&self, name: &str) -> ValuationResult<CurrencySpot> {
        CurrencySpot::from_timeseries(find(&self.currencies, name, "currency")?)
    }

    pub fn ois(&self, name: &str) -> ValuationResult<OisRate> {
        OisRate::from_timeseries(find(&self.ois_rates, name, "OIS rate")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "flat_rate": 0.03,
        "config": {"binomial_steps": 101},
        "rate_curves": {
            "day_counter": "ACTUAL365FIXED",
            "calendar": "WEEKENDS_ONLY",
            "curves": {"2024-03-11": [[0.25, 0.05], [1.0, 0.052]]}
        },
        "underlyings": [
            {"ts_name": "SPX", "components": {"PX_LAST": {"2024-03-11": 110.0}}}
        ],
        "options": [{
            "ts_name": "SPX 100 C",
            "ts_attributes": {
                "OPTION_TYPE": "CALL", "STRIKE_PRICE": "100", "OPTION_CONTRACT_SIZE": "100",
                "MATURITY_DATE": "2024-12-20", "CALENDAR": "WEEKENDS_ONLY",
                "DAY_COUNTER": "ACTUAL365FIXED", "EXERCISE_TYPE": "AMERICAN",
                "UNDERLYING_INSTRUMENT": "SPX"
            },
            "components": {"PX_MID": {"2024-03-11": 14.0}}
        }]
    }"#;

    #[test]
    fn test_parse_snapshot() {
        let snapshot = MarketSnapshot::from_json_str(SNAPSHOT).unwrap();
        assert_eq!(snapshot.config.binomial_steps, 101);
        assert_eq!(snapshot.config.iv_max_evaluations, 100);
        assert_eq!(snapshot.option_names().collect::<Vec<_>>(), vec!["SPX 100 C"]);

        let store = snapshot.process_store().unwrap();
        assert!(store.underlying("SPX").is_ok());

        let option = snapshot.option("SPX 100 C").unwrap();
        assert_eq!(option.notional(), 10_000.0);
        assert!(snapshot.option("NDX").is_err());
        assert!(snapshot.currency("USDBRL").is_err());
    }

    #[test]
    fn test_curve_snapshot() {
        let snapshot = MarketSnapshot::from_json_str(SNAPSHOT).unwrap();
        let curves = snapshot.rate_curves.unwrap().to_time_series().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        assert_eq!(curves.curve_at(date).unwrap().zero_rate(0.1), 0.05);
    }

    #[test]
    fn test_invalid_json() {
        let err = MarketSnapshot::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ValuationError::Serialization(_)));
    }
}
