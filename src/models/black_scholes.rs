//! Black-Scholes Model
//!
//! Provides:
//! - European option pricing
//! - Greeks computation
//! - Implied volatility solver (Newton-Raphson with Brent fallback)
//! - `AnalyticEuropeanEngine`, the closed-form [`PricingEngine`]
//!
//! Greeks are per unit: vega per 1.00 of volatility, rho per 1.00 of rate,
//! theta per year.

use std::f64::consts::{PI, SQRT_2};

use statrs::function::erf::erfc;

use super::engine::{PricingEngine, SolverSettings, Valuation};
use super::process::BlackScholesProcess;
use super::solver::brent;
use crate::core::{OptionType, ValuationError, ValuationResult, VanillaContract};

/// Standard normal CDF
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal PDF
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Black-Scholes d1 parameter
pub fn d1(spot: f64, strike: f64, rate: f64, div: f64, vol: f64, time: f64) -> f64 {
    let forward = spot * ((rate - div) * time).exp();
    ((forward / strike).ln() + 0.5 * vol * vol * time) / (vol * time.sqrt())
}

/// Black-Scholes d2 parameter
pub fn d2(spot: f64, strike: f64, rate: f64, div: f64, vol: f64, time: f64) -> f64 {
    d1(spot, strike, rate, div, vol, time) - vol * time.sqrt()
}

/// Black-Scholes European option price
pub fn price(
    spot: f64,
    strike: f64,
    rate: f64,
    div: f64,
    vol: f64,
    time: f64,
    option_type: OptionType,
) -> f64 {
    if time <= 0.0 {
        return option_type.intrinsic(spot, strike);
    }

    let forward = spot * ((rate - div) * time).exp();
    let df = (-rate * time).exp();

    if vol <= 0.0 {
        // Zero vol = intrinsic value of the forward, discounted
        return df * option_type.intrinsic(forward, strike);
    }

    let d1 = d1(spot, strike, rate, div, vol, time);
    let d2 = d2(spot, strike, rate, div, vol, time);

    match option_type {
        OptionType::Call => df * (forward * norm_cdf(d1) - strike * norm_cdf(d2)),
        OptionType::Put => df * (strike * norm_cdf(-d2) - forward * norm_cdf(-d1)),
    }
}

/// Black-Scholes price and Greeks
pub fn greeks(
    spot: f64,
    strike: f64,
    rate: f64,
    div: f64,
    vol: f64,
    time: f64,
    option_type: OptionType,
) -> Valuation {
    let npv = price(spot, strike, rate, div, vol, time, option_type);

    if time <= 0.0 || vol <= 0.0 {
        // At expiry or zero vol
        let delta = match option_type {
            OptionType::Call => if spot > strike { 1.0 } else { 0.0 },
            OptionType::Put => if spot < strike { -1.0 } else { 0.0 },
        };
        return Valuation {
            npv,
            delta,
            vega: Some(0.0),
            rho: Some(0.0),
            ..Default::default()
        };
    }

    let d1 = d1(spot, strike, rate, div, vol, time);
    let d2 = d2(spot, strike, rate, div, vol, time);
    let df = (-rate * time).exp();
    let sqrt_t = time.sqrt();
    let pdf_d1 = norm_pdf(d1);
    let div_factor = (-div * time).exp();

    let delta = match option_type {
        OptionType::Call => div_factor * norm_cdf(d1),
        OptionType::Put => div_factor * (norm_cdf(d1) - 1.0),
    };

    // Gamma and vega are the same for call and put
    let gamma = div_factor * pdf_d1 / (spot * vol * sqrt_t);
    let vega = spot * div_factor * pdf_d1 * sqrt_t;

    let term1 = -spot * div_factor * pdf_d1 * vol / (2.0 * sqrt_t);
    let theta = match option_type {
        OptionType::Call => {
            term1 - rate * strike * df * norm_cdf(d2) + div * spot * div_factor * norm_cdf(d1)
        }
        OptionType::Put => {
            term1 + rate * strike * df * norm_cdf(-d2) - div * spot * div_factor * norm_cdf(-d1)
        }
    };

    let rho = match option_type {
        OptionType::Call => strike * time * df * norm_cdf(d2),
        OptionType::Put => -strike * time * df * norm_cdf(-d2),
    };

    Valuation {
        npv,
        delta,
        gamma,
        theta,
        vega: Some(vega),
        rho: Some(rho),
    }
}

/// Implied volatility by Newton-Raphson on the closed form.
///
/// When Newton stalls on a flat vega or leaves `[min_vol, max_vol]` the
/// root is bracketed with Brent on the same range. Returns a numerical
/// error when the price is outside no-arbitrage bounds or neither method
/// converges.
#[allow(clippy::too_many_arguments)]
pub fn implied_volatility(
    market_price: f64,
    spot: f64,
    strike: f64,
    rate: f64,
    div: f64,
    time: f64,
    option_type: OptionType,
    settings: &SolverSettings,
) -> ValuationResult<f64> {
    // Sanity checks
    if !(market_price > 0.0) {
        return Err(ValuationError::numerical("Non-positive option price"));
    }
    if time <= 0.0 {
        return Err(ValuationError::numerical("Non-positive time to expiry"));
    }
    if spot <= 0.0 || strike <= 0.0 {
        return Err(ValuationError::numerical("Non-positive spot or strike"));
    }

    let lower_bound = price(spot, strike, rate, div, 0.0, time, option_type);
    if market_price < lower_bound {
        return Err(ValuationError::numerical("Price below intrinsic value"));
    }

    // Initial guess using Brenner-Subrahmanyam approximation
    let atm_approx = market_price / (0.4 * spot * time.sqrt());
    let mut vol = atm_approx.clamp(0.01, settings.max_vol);

    for _ in 0..settings.max_evaluations {
        let model = price(spot, strike, rate, div, vol, time, option_type);
        let diff = model - market_price;

        let d1 = d1(spot, strike, rate, div, vol, time);
        let vega = spot * (-div * time).exp() * norm_pdf(d1) * time.sqrt();
        if vega.abs() < 1e-12 {
            break;
        }

        let step = diff / vega;
        let new_vol = vol - step;
        if new_vol < settings.min_vol || new_vol > settings.max_vol {
            break;
        }
        vol = new_vol;

        if step.abs() < settings.accuracy {
            return Ok(vol);
        }
    }

    // Fallback to Brent
    brent(
        |vol| Ok(price(spot, strike, rate, div, vol, time, option_type) - market_price),
        settings.accuracy,
        settings.min_vol,
        settings.max_vol,
        settings.max_evaluations,
    )
}

/// Closed-form engine for European exercise
#[derive(Debug, Clone, Default)]
pub struct AnalyticEuropeanEngine;

impl AnalyticEuropeanEngine {
    fn inputs(
        contract: &VanillaContract,
        process: &BlackScholesProcess,
    ) -> ValuationResult<f64> {
        if contract.is_american() {
            return Err(ValuationError::pricing(
                "analytic engine supports European exercise only",
            ));
        }
        if !(process.spot > 0.0) {
            return Err(ValuationError::invalid_input(format!(
                "spot must be positive, got {}",
                process.spot
            )));
        }
        Ok(process.time_to(contract.maturity()))
    }
}

impl PricingEngine for AnalyticEuropeanEngine {
    fn name(&self) -> &str {
        "analytic-european"
    }

    fn evaluate(
        &self,
        contract: &VanillaContract,
        process: &BlackScholesProcess,
    ) -> ValuationResult<Valuation> {
        let time = Self::inputs(contract, process)?;
        Ok(greeks(
            process.spot,
            contract.strike(),
            process.risk_free_rate,
            process.dividend_yield,
            process.volatility,
            time,
            contract.option_type(),
        ))
    }

    fn implied_volatility(
        &self,
        contract: &VanillaContract,
        process: &BlackScholesProcess,
        target: f64,
        settings: &SolverSettings,
    ) -> ValuationResult<f64> {
        let time = Self::inputs(contract, process)?;
        implied_volatility(
            target,
            process.spot,
            contract.strike(),
            process.risk_free_rate,
            process.dividend_yield,
            time,
            contract.option_type(),
            settings,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Exercise, ExerciseStyle, PlainVanillaPayoff};
    use crate::dates::{Calendar, DayCounter};
    use chrono::NaiveDate;

    #[test]
    fn test_norm_cdf() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-10);
        assert!((norm_cdf(1.96) - 0.975).abs() < 0.001);
        assert!((norm_cdf(-1.96) - 0.025).abs() < 0.001);
    }

    #[test]
    fn test_bs_price() {
        // ATM call, 20% vol, 1 year, 5% rate
        let call_price = price(100.0, 100.0, 0.05, 0.0, 0.20, 1.0, OptionType::Call);

        // Should be around 10.45 for these parameters
        assert!(call_price > 10.0 && call_price < 11.0);

        // Put-call parity check
        let put_price = price(100.0, 100.0, 0.05, 0.0, 0.20, 1.0, OptionType::Put);
        let forward = 100.0 * 0.05_f64.exp();
        let df = (-0.05_f64).exp();
        let parity = call_price - put_price - df * (forward - 100.0);
        assert!(parity.abs() < 0.01);
    }

    #[test]
    fn test_greeks() {
        let g = greeks(100.0, 100.0, 0.05, 0.0, 0.20, 1.0, OptionType::Call);

        // ATM call delta should be around 0.5-0.6
        assert!(g.delta > 0.5 && g.delta < 0.7);
        assert!(g.gamma > 0.0);
        // time decay
        assert!(g.theta < 0.0);
        assert!(g.vega.unwrap() > 0.0);
        assert!(g.rho.unwrap() > 0.0);
    }

    #[test]
    fn test_implied_vol() {
        let settings = SolverSettings {
            accuracy: 1e-8,
            ..Default::default()
        };
        let market_price = price(100.0, 100.0, 0.05, 0.0, 0.25, 0.5, OptionType::Call);
        let iv = implied_volatility(market_price, 100.0, 100.0, 0.05, 0.0, 0.5, OptionType::Call, &settings)
            .unwrap();
        assert!((iv - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_iv_otm_put() {
        let settings = SolverSettings::default();
        let market_price = price(100.0, 90.0, 0.05, 0.01, 0.30, 0.25, OptionType::Put);
        let iv = implied_volatility(market_price, 100.0, 90.0, 0.05, 0.01, 0.25, OptionType::Put, &settings)
            .unwrap();
        assert!((iv - 0.30).abs() < 1e-3);
    }

    #[test]
    fn test_iv_deep_otm_call() {
        let settings = SolverSettings::default();
        let market_price = price(100.0, 140.0, 0.03, 0.0, 0.45, 0.5, OptionType::Call);
        let iv = implied_volatility(market_price, 100.0, 140.0, 0.03, 0.0, 0.5, OptionType::Call, &settings)
            .unwrap();
        assert!((iv - 0.45).abs() < 1e-3);
    }

    #[test]
    fn test_price_below_bound_is_numerical_error() {
        let err = implied_volatility(0.5, 110.0, 100.0, 0.0, 0.0, 0.5, OptionType::Call, &SolverSettings::default())
            .unwrap_err();
        assert!(err.is_numerical());
    }

    #[test]
    fn test_engine_rejects_american() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let maturity = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let contract = VanillaContract::new(
            PlainVanillaPayoff::new(OptionType::Put, 100.0),
            Exercise::new(ExerciseStyle::American, today, maturity),
        );
        let mut process =
            BlackScholesProcess::new("X", today, Calendar::weekends_only(), DayCounter::Actual365Fixed);
        process.spot = 100.0;

        let err = AnalyticEuropeanEngine.evaluate(&contract, &process).unwrap_err();
        assert!(matches!(err, ValuationError::Pricing(_)));
    }
}
