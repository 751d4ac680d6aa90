//! Option Greeks
//!
//! First and second order sensitivities for options.

use serde::{Deserialize, Serialize};

/// Option price and Greeks (sensitivities)
///
/// `vega` and `rho` are `None` when they are not applicable to the contract
/// (American exercise), which is distinct from a value of zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// Net present value of one unit
    pub price: f64,
    /// Delta: dV/dS (sensitivity to spot)
    pub delta: f64,
    /// Gamma: d²V/dS² (sensitivity of delta to spot)
    pub gamma: f64,
    /// Theta: dV/dt (per year)
    pub theta: f64,
    /// Vega: dV/dσ (per unit of volatility)
    pub vega: Option<f64>,
    /// Rho: dV/dr (per unit of rate)
    pub rho: Option<f64>,
}

impl Greeks {
    pub fn new(price: f64, delta: f64, gamma: f64, theta: f64) -> Self {
        Self {
            price,
            delta,
            gamma,
            theta,
            vega: None,
            rho: None,
        }
    }

    /// Scale Greeks by a factor (e.g., contract size)
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            price: self.price * factor,
            delta: self.delta * factor,
            gamma: self.gamma * factor,
            theta: self.theta * factor,
            vega: self.vega.map(|v| v * factor),
            rho: self.rho.map(|v| v * factor),
        }
    }

    /// Add two Greeks (for a book of positions)
    pub fn add(&self, other: &Greeks) -> Self {
        Self {
            price: self.price + other.price,
            delta: self.delta + other.delta,
            gamma: self.gamma + other.gamma,
            theta: self.theta + other.theta,
            vega: match (self.vega, other.vega) {
                (Some(a), Some(b)) => Some(a + b),
                (Some(a), None) | (None, Some(a)) => Some(a),
                _ => None,
            },
            rho: match (self.rho, other.rho) {
                (Some(a), Some(b)) => Some(a + b),
                (Some(a), None) | (None, Some(a)) => Some(a),
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_keeps_not_applicable() {
        let g = Greeks::new(2.0, 0.5, 0.01, -3.0).scale(100.0);
        assert_eq!(g.price, 200.0);
        assert_eq!(g.delta, 50.0);
        assert_eq!(g.vega, None);
    }

    #[test]
    fn test_add() {
        let mut a = Greeks::new(1.0, 0.5, 0.1, -1.0);
        a.vega = Some(0.2);
        let b = Greeks::new(2.0, -0.3, 0.2, -2.0);

        let sum = a.add(&b);
        assert!((sum.delta - 0.2).abs() < 1e-12);
        assert_eq!(sum.vega, Some(0.2));
        assert_eq!(sum.rho, None);
    }
}
