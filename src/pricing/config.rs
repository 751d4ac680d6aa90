//! Configuration for option valuation

use serde::{Deserialize, Serialize};

use crate::models::{BinomialEngine, SolverSettings};

/// Valuation settings shared by every option of a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    /// Leisen-Reimer tree steps (bumped to the next odd number)
    /// Default: 801
    pub binomial_steps: usize,

    /// Absolute accuracy of implied volatility
    /// Default: 1e-4
    pub iv_accuracy: f64,

    /// Engine evaluations allowed per implied volatility solve
    /// Default: 100
    pub iv_max_evaluations: usize,

    /// Lower end of the volatility search bracket
    /// Default: 1e-7
    pub min_vol: f64,

    /// Upper end of the volatility search bracket
    /// Default: 4.0
    pub max_vol: f64,

    /// Placeholder volatility set on a process before calibration
    /// Default: 0.2
    pub initial_vol: f64,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            binomial_steps: 801,
            iv_accuracy: 1.0e-4,
            iv_max_evaluations: 100,
            min_vol: 1.0e-7,
            max_vol: 4.0,
            initial_vol: 0.2,
        }
    }
}

impl ValuationConfig {
    /// Coarse tree for scenario sweeps
    pub fn fast() -> Self {
        Self {
            binomial_steps: 101,
            ..Default::default()
        }
    }

    /// Finer tree and tighter implied volatility
    pub fn precise() -> Self {
        Self {
            binomial_steps: 2001,
            iv_accuracy: 1.0e-6,
            iv_max_evaluations: 200,
            ..Default::default()
        }
    }

    pub fn solver(&self) -> SolverSettings {
        SolverSettings {
            accuracy: self.iv_accuracy,
            max_evaluations: self.iv_max_evaluations,
            min_vol: self.min_vol,
            max_vol: self.max_vol,
        }
    }

    pub fn binomial_engine(&self) -> BinomialEngine {
        BinomialEngine::new(self.binomial_steps)
    }
}
