//! Leisen-Reimer binomial engine
//!
//! Vanilla European and American options on a recombining tree whose
//! branch probabilities come from the Peizer-Pratt inversion. Delta and
//! gamma are read off the first two tree levels, theta from the
//! Black-Scholes PDE identity. The tree does not produce vega or rho.

use super::engine::{PricingEngine, Valuation};
use super::process::BlackScholesProcess;
use crate::core::{ValuationError, ValuationResult, VanillaContract};

/// Default number of time steps
pub const DEFAULT_STEPS: usize = 801;

#[derive(Debug, Clone)]
pub struct BinomialEngine {
    steps: usize,
}

impl Default for BinomialEngine {
    fn default() -> Self {
        Self::new(DEFAULT_STEPS)
    }
}

impl BinomialEngine {
    /// Leisen-Reimer needs an odd number of steps; even counts are bumped.
    pub fn new(steps: usize) -> Self {
        let steps = steps.max(3);
        let steps = if steps % 2 == 0 { steps + 1 } else { steps };
        Self { steps }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Valuation when diffusion is negligible: the spot follows its forward
    fn deterministic(
        &self,
        contract: &VanillaContract,
        process: &BlackScholesProcess,
        time: f64,
    ) -> Valuation {
        let (spot, r, q) = (process.spot, process.risk_free_rate, process.dividend_yield);
        let payoff = &contract.payoff;

        let (npv, exercise_time) = if contract.is_american() {
            let dt = time / self.steps as f64;
            (0..=self.steps)
                .map(|i| {
                    let t = i as f64 * dt;
                    ((-r * t).exp() * payoff.value(spot * ((r - q) * t).exp()), t)
                })
                .fold((0.0, time), |best, x| if x.0 > best.0 { x } else { best })
        } else {
            let forward = spot * ((r - q) * time).exp();
            ((-r * time).exp() * payoff.value(forward), time)
        };

        let delta = if npv > 0.0 {
            contract.option_type().phi() * (-q * exercise_time).exp()
        } else {
            0.0
        };
        let theta = r * npv - (r - q) * spot * delta;

        Valuation {
            npv,
            delta,
            gamma: 0.0,
            theta,
            vega: None,
            rho: None,
        }
    }
}

/// Peizer-Pratt method 2 inversion
fn peizer_pratt(z: f64, n: usize) -> f64 {
    let n = n as f64;
    let t = z / (n + 1.0 / 3.0 + 0.1 / (n + 1.0));
    let spread = (0.25 - 0.25 * (-t * t * (n + 1.0 / 6.0)).exp()).sqrt();
    if z > 0.0 {
        0.5 + spread
    } else {
        0.5 - spread
    }
}

impl PricingEngine for BinomialEngine {
    fn name(&self) -> &str {
        "binomial-lr"
    }

    fn evaluate(
        &self,
        contract: &VanillaContract,
        process: &BlackScholesProcess,
    ) -> ValuationResult<Valuation> {
        let strike = contract.strike();
        let spot = process.spot;
        let vol = process.volatility;

        if !(strike > 0.0) {
            return Err(ValuationError::invalid_input("strike must be positive"));
        }
        if !(spot > 0.0) {
            return Err(ValuationError::invalid_input(format!(
                "spot must be positive, got {}",
                spot
            )));
        }
        if !(vol >= 0.0) {
            return Err(ValuationError::invalid_input(format!(
                "volatility must be non-negative, got {}",
                vol
            )));
        }

        let time = process.time_to(contract.maturity());
        if time <= 0.0 {
            return Err(ValuationError::pricing(format!(
                "contract matures on {} which is not after {}",
                contract.maturity(),
                process.evaluation_date
            )));
        }

        let (r, q) = (process.risk_free_rate, process.dividend_yield);
        let n = self.steps;
        let dt = time / n as f64;
        let std_dev = vol * time.sqrt();

        let d2 = ((spot / strike).ln() + (r - q - 0.5 * vol * vol) * time) / std_dev;
        let pu = peizer_pratt(d2, n);
        let pdash = peizer_pratt(d2 + std_dev, n);
        if !(pu > 0.0 && pu < 1.0 && pdash > 0.0 && pdash < 1.0) {
            return Ok(self.deterministic(contract, process, time));
        }

        let growth = ((r - q) * dt).exp();
        let up = growth * pdash / pu;
        let down = (growth - pu * up) / (1.0 - pu);
        if !(up.is_finite() && down > 0.0 && up > down) {
            return Ok(self.deterministic(contract, process, time));
        }

        let disc_pu = (-r * dt).exp() * pu;
        let disc_pd = (-r * dt).exp() * (1.0 - pu);
        let ratio = up / down;
        let american = contract.is_american();
        let payoff = &contract.payoff;

        let mut values = vec![0.0_f64; n + 1];
        let mut st = spot * down.powi(n as i32);
        for value in values.iter_mut() {
            *value = payoff.value(st);
            st *= ratio;
        }

        let mut level1 = [0.0; 2];
        let mut level2 = [0.0; 3];
        for i in (0..n).rev() {
            let mut st = spot * down.powi(i as i32);
            for j in 0..=i {
                let continuation = disc_pu * values[j + 1] + disc_pd * values[j];
                values[j] = if american {
                    continuation.max(payoff.value(st))
                } else {
                    continuation
                };
                st *= ratio;
            }
            match i {
                2 => level2.copy_from_slice(&values[..3]),
                1 => level1.copy_from_slice(&values[..2]),
                _ => {}
            }
        }

        let npv = values[0];

        let s1 = [spot * down, spot * up];
        let delta = (level1[1] - level1[0]) / (s1[1] - s1[0]);

        let s2 = [spot * down * down, spot * up * down, spot * up * up];
        let delta_up = (level2[2] - level2[1]) / (s2[2] - s2[1]);
        let delta_down = (level2[1] - level2[0]) / (s2[1] - s2[0]);
        let gamma = (delta_up - delta_down) / (0.5 * (s2[2] - s2[0]));

        let theta = r * npv - (r - q) * spot * delta - 0.5 * vol * vol * spot * spot * gamma;

        Ok(Valuation {
            npv,
            delta,
            gamma,
            theta,
            vega: None,
            rho: None,
        })
    }
}
