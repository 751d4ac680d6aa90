//! # ts-options - Time-Series Driven Option Valuation
//!
//! Values listed equity options, currency positions and OIS quotes from
//! historical time series.
//!
//! ## Overview
//!
//! Every instrument is described by a [`core::TimeSeries`]: static
//! attributes (strike, maturity, calendar, ...) plus named quote series
//! (mid prices, implied vols, spot). Option valuation for a date:
//!
//! 1. Rebuilds the contract (exercise style may be overridden per call)
//! 2. Refreshes the underlying's shared Black-Scholes process
//! 3. Resolves volatility: override, cached calibration, or an implied
//!    volatility solve against the mid price (retried once on the previous
//!    business day)
//! 4. Evaluates the contract with a pricing engine (Leisen-Reimer tree by
//!    default)
//!
//! On or after maturity price and Greeks follow intrinsic-value rules.
//!
//! ## Key Components
//!
//! - **Dates**: calendars, day counters, tenor periods
//! - **Curves**: zero curves per date and curves implied forward
//! - **Models**: process state, binomial and analytic engines, root finding
//! - **Pricing**: process store, volatility cache, configuration
//! - **Instruments**: equity options, currency spots and cash, OIS rates
//! - **Data**: JSON market snapshots and a local store
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ts_options::prelude::*;
//!
//! let snapshot = MarketSnapshot::from_file("market.json").unwrap();
//! let mut store = snapshot.process_store().unwrap();
//! let mut option = snapshot.option("SPX 5000 C").unwrap();
//!
//! let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
//! let args = ValuationArgs::on(date);
//! let price = option.price(&mut store, &args).unwrap();
//! let delta = option.delta(&mut store, &args).unwrap();
//! ```
//!
//! ## Concurrency
//!
//! Valuation is synchronous. Options on one underlying share its process
//! through the [`pricing::ProcessStore`], which every call takes by `&mut`;
//! parallel callers must put the store behind their own lock.

pub mod core;
pub mod curves;
pub mod data;
pub mod dates;
pub mod instruments;
pub mod models;
pub mod pricing;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        ExerciseStyle, Greeks, OptionRecord, OptionType, QuoteSeries, TimeSeries, ValuationError,
        ValuationResult, VanillaContract,
    };

    // Dates and curves
    pub use crate::curves::{ImpliedYieldCurve, YieldCurveTimeSeries, ZeroCurve};
    pub use crate::dates::{BusinessDayConvention, Calendar, DayCounter, Period, TimeUnit};

    // Models
    pub use crate::models::{
        black_scholes::{greeks as bs_greeks, price as bs_price},
        AnalyticEuropeanEngine, BinomialEngine, BlackScholesProcess, PricingEngine,
        SolverSettings, Valuation,
    };

    // Valuation
    pub use crate::pricing::{
        EquityUnderlying, ProcessStore, ValuationArgs, ValuationConfig, VolatilityCache,
        VolatilitySource,
    };

    // Instruments
    pub use crate::instruments::{Cash, CurrencySpot, EquityOption, OisRate, OisRateHelper};

    // Data
    pub use crate::data::{DataStore, MarketSnapshot, StoreConfig};
}
