//! Volatility resolution and calibration cache
//!
//! The volatility driving a valuation comes, in order of precedence, from an
//! explicit override, a previous calibration for the same date, or an implied
//! volatility solve against the option's mid price.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{QuoteSeries, ValuationResult, VanillaContract};
use crate::dates::{Calendar, TimeUnit};
use crate::models::{BlackScholesProcess, PricingEngine, SolverSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilitySource {
    /// Supplied by the caller
    Override,
    /// Solved from a market price
    Implied,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CachedVolatility {
    pub value: f64,
    pub source: VolatilitySource,
}

/// Calibrated volatility per effective date.
///
/// An implied entry is never replaced by another solve; only an override
/// for the same date replaces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VolatilityCache {
    entries: BTreeMap<NaiveDate, CachedVolatility>,
}

/// Inputs of one volatility resolution
#[derive(Debug, Clone, Copy)]
pub struct VolatilityInputs<'a> {
    /// Effective date, already clamped to the base date
    pub key: NaiveDate,
    pub override_vol: Option<f64>,
    pub contract: &'a VanillaContract,
    pub process: &'a BlackScholesProcess,
    /// Calendar used to step back one business day on retry
    pub calendar: &'a Calendar,
    pub mid_prices: &'a QuoteSeries,
}

impl VolatilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.entries.contains_key(&date)
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.entries.get(&date).map(|c| c.value)
    }

    pub fn entry(&self, date: NaiveDate) -> Option<&CachedVolatility> {
        self.entries.get(&date)
    }

    pub fn set_override(&mut self, date: NaiveDate, value: f64) {
        self.entries.insert(
            date,
            CachedVolatility {
                value,
                source: VolatilitySource::Override,
            },
        );
    }

    /// Store a solved volatility unless the date already holds one.
    ///
    /// Returns the value kept for the date.
    pub fn insert_implied(&mut self, date: NaiveDate, value: f64) -> f64 {
        self.entries
            .entry(date)
            .or_insert(CachedVolatility {
                value,
                source: VolatilitySource::Implied,
            })
            .value
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &CachedVolatility)> {
        self.entries.iter()
    }

    /// Volatility for the inputs' date, solving and caching it if needed.
    ///
    /// A failed solve is retried once against the mid of the previous
    /// business day; a second failure is returned to the caller.
    pub fn resolve<E: PricingEngine + ?Sized>(
        &mut self,
        inputs: &VolatilityInputs<'_>,
        engine: &E,
        settings: &SolverSettings,
    ) -> ValuationResult<f64> {
        let key = inputs.key;

        if let Some(vol) = inputs.override_vol {
            self.set_override(key, vol);
            tracing::debug!("Volatility override {} on {}", vol, key);
            return Ok(vol);
        }

        if let Some(vol) = self.get(key) {
            tracing::debug!("Cached volatility {} on {}", vol, key);
            return Ok(vol);
        }

        let mid = inputs.mid_prices.get_value(key, true, f64::NAN);
        let vol = match engine.implied_volatility(inputs.contract, inputs.process, mid, settings) {
            Ok(vol) => vol,
            Err(e) if e.is_numerical() => {
                let prior = inputs.calendar.advance(key, -1, TimeUnit::Days)?;
                let prior_mid = inputs.mid_prices.get_value(prior, true, f64::NAN);
                tracing::warn!(
                    "Implied volatility failed on {} (mid {}): {}; retrying with mid {} of {}",
                    key, mid, e, prior_mid, prior
                );
                engine.implied_volatility(inputs.contract, inputs.process, prior_mid, settings)?
            }
            Err(e) => return Err(e),
        };

        tracing::info!("Implied volatility {:.6} on {} ({})", vol, key, engine.name());
        Ok(self.insert_implied(key, vol))
    }
}
