//! One-dimensional root finding
//!
//! Bracketed Brent solver with a hard cap on function evaluations. Used to
//! invert pricing engines for implied volatility.

use crate::core::{ValuationError, ValuationResult};

/// Find `x` in `[low, high]` with `f(x) = 0` to within `accuracy` in `x`.
///
/// Fails with a numerical error when the root is not bracketed, when `f`
/// produces a non-finite value, or when more than `max_evaluations` calls
/// are needed.
pub fn brent<F>(
    mut f: F,
    accuracy: f64,
    low: f64,
    high: f64,
    max_evaluations: usize,
) -> ValuationResult<f64>
where
    F: FnMut(f64) -> ValuationResult<f64>,
{
    if low >= high {
        return Err(ValuationError::invalid_input(format!(
            "invalid bracket [{}, {}]",
            low, high
        )));
    }

    let mut a = low;
    let mut b = high;
    let mut fa = finite(f(a)?, a)?;
    let mut fb = finite(f(b)?, b)?;
    let mut evaluations = 2;

    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }
    if fa * fb > 0.0 {
        return Err(ValuationError::numerical(format!(
            "root not bracketed: f({:e}) = {:e}, f({:e}) = {:e}",
            a, fa, b, fb
        )));
    }

    let mut c = b;
    let mut fc = fb;
    let mut d = b - a;
    let mut e = d;

    while evaluations < max_evaluations {
        if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * accuracy;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol || fb == 0.0 {
            return Ok(b);
        }

        if e.abs() >= tol && fa.abs() > fb.abs() {
            // inverse quadratic interpolation, secant when only two points
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let qa = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * qa * (qa - r) - (b - a) * (r - 1.0)),
                    (qa - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let min1 = 3.0 * xm * q - (tol * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol { d } else { tol.copysign(xm) };
        fb = finite(f(b)?, b)?;
        evaluations += 1;
    }

    Err(ValuationError::numerical(format!(
        "maximum number of function evaluations ({}) exceeded",
        max_evaluations
    )))
}

fn finite(value: f64, x: f64) -> ValuationResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValuationError::numerical(format!(
            "objective is not finite at {:e}",
            x
        )))
    }
}
