//! Pricing Models
//!
//! Implements:
//! - Black-Scholes-Merton process state
//! - Black-Scholes closed form (analytic European engine)
//! - Leisen-Reimer binomial tree (European and American exercise)
//! - Bracketed root finding for implied volatility

pub mod binomial;
pub mod black_scholes;
pub mod engine;
pub mod process;
pub mod solver;

pub use binomial::{BinomialEngine, DEFAULT_STEPS};
pub use black_scholes::AnalyticEuropeanEngine;
pub use engine::{implied_volatility_by_repricing, PricingEngine, SolverSettings, Valuation};
pub use process::BlackScholesProcess;
