//! Pricing engine abstraction
//!
//! An engine values a [`VanillaContract`] under a [`BlackScholesProcess`]
//! and can be inverted for implied volatility. The orchestration layer only
//! talks to engines through this trait.

use serde::{Deserialize, Serialize};

use super::process::BlackScholesProcess;
use super::solver::brent;
use crate::core::{ValuationError, ValuationResult, VanillaContract};

/// Engine output for one contract
///
/// `vega`/`rho` are `None` when the engine does not produce them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Valuation {
    pub npv: f64,
    pub delta: f64,
    pub gamma: f64,
    /// Per year
    pub theta: f64,
    pub vega: Option<f64>,
    pub rho: Option<f64>,
}

/// Implied volatility solver settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    /// Absolute accuracy on volatility
    pub accuracy: f64,
    /// Hard cap on engine evaluations
    pub max_evaluations: usize,
    pub min_vol: f64,
    pub max_vol: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            accuracy: 1.0e-4,
            max_evaluations: 100,
            min_vol: 1.0e-7,
            max_vol: 4.0,
        }
    }
}

pub trait PricingEngine {
    fn name(&self) -> &str;

    fn evaluate(
        &self,
        contract: &VanillaContract,
        process: &BlackScholesProcess,
    ) -> ValuationResult<Valuation>;

    /// Volatility reproducing `target` under this engine.
    ///
    /// Fails with [`ValuationError::Numerical`] when no volatility in the
    /// configured range reproduces the target.
    fn implied_volatility(
        &self,
        contract: &VanillaContract,
        process: &BlackScholesProcess,
        target: f64,
        settings: &SolverSettings,
    ) -> ValuationResult<f64> {
        implied_volatility_by_repricing(self, contract, process, target, settings)
    }
}

/// Brent search over volatility, re-pricing the contract with `engine`
pub fn implied_volatility_by_repricing<E: PricingEngine + ?Sized>(
    engine: &E,
    contract: &VanillaContract,
    process: &BlackScholesProcess,
    target: f64,
    settings: &SolverSettings,
) -> ValuationResult<f64> {
    if !target.is_finite() || target <= 0.0 {
        return Err(ValuationError::numerical(format!(
            "target price must be positive, got {}",
            target
        )));
    }

    brent(
        |vol| {
            let bumped = process.with_volatility(vol);
            Ok(engine.evaluate(contract, &bumped)?.npv - target)
        },
        settings.accuracy,
        settings.min_vol,
        settings.max_vol,
        settings.max_evaluations,
    )
}
