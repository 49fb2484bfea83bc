//! Numerical quadrature.

use log::warn;

use crate::config::QuadratureConfig;
use crate::error::{Result, SedError};
use crate::interp::trapz;

/// Trapezoidal integral of `f` sampled at `nodes`.
pub fn integrate_on_nodes<F>(nodes: &[f64], f: F) -> Result<f64>
where
    F: Fn(f64) -> Result<f64>,
{
    let values = nodes.iter().map(|&w| f(w)).collect::<Result<Vec<f64>>>()?;
    Ok(trapz(nodes, &values))
}

/// Adaptive Simpson quadrature of `f` over the finite interval `[a, b]`.
///
/// Subdivides until the Richardson error estimate of each panel falls below
/// its share of `max(abs_tol, rel_tol * |whole|)`. Panels that reach
/// `max_depth` are accepted with a warning.
pub fn adaptive_simpson<F>(f: F, a: f64, b: f64, config: &QuadratureConfig) -> Result<f64>
where
    F: Fn(f64) -> Result<f64>,
{
    if !(a.is_finite() && b.is_finite()) {
        return Err(SedError::NonIntegrable(format!(
            "adaptive quadrature needs a finite interval, got [{a}, {b}]"
        )));
    }
    if a == b {
        return Ok(0.0);
    }

    let fa = f(a)?;
    let fb = f(b)?;
    let m = 0.5 * (a + b);
    let fm = f(m)?;
    let whole = simpson(a, b, fa, fm, fb);
    let tol = config.abs_tol.max(config.rel_tol * whole.abs());

    let mut exhausted = 0usize;
    let result = refine(
        &f,
        Panel { a, b, fa, fm, fb, whole },
        tol.max(f64::MIN_POSITIVE),
        config.max_depth,
        &mut exhausted,
    )?;
    if exhausted > 0 {
        warn!("adaptive quadrature on [{a}, {b}]: {exhausted} panels hit the depth limit");
    }
    if !result.is_finite() {
        return Err(SedError::NonIntegrable(format!(
            "integral over [{a}, {b}] is not finite"
        )));
    }
    Ok(result)
}

#[derive(Clone, Copy)]
struct Panel {
    a: f64,
    b: f64,
    fa: f64,
    fm: f64,
    fb: f64,
    whole: f64,
}

fn simpson(a: f64, b: f64, fa: f64, fm: f64, fb: f64) -> f64 {
    (b - a) / 6.0 * (fa + 4.0 * fm + fb)
}

fn refine<F>(f: &F, p: Panel, tol: f64, depth: u32, exhausted: &mut usize) -> Result<f64>
where
    F: Fn(f64) -> Result<f64>,
{
    let m = 0.5 * (p.a + p.b);
    let lm = 0.5 * (p.a + m);
    let rm = 0.5 * (m + p.b);
    let flm = f(lm)?;
    let frm = f(rm)?;
    let left = simpson(p.a, m, p.fa, flm, p.fm);
    let right = simpson(m, p.b, p.fm, frm, p.fb);
    let delta = left + right - p.whole;

    if delta.abs() <= 15.0 * tol {
        return Ok(left + right + delta / 15.0);
    }
    if depth == 0 {
        *exhausted += 1;
        return Ok(left + right + delta / 15.0);
    }

    let l = Panel {
        a: p.a,
        b: m,
        fa: p.fa,
        fm: flm,
        fb: p.fm,
        whole: left,
    };
    let r = Panel {
        a: m,
        b: p.b,
        fa: p.fm,
        fm: frm,
        fb: p.fb,
        whole: right,
    };
    Ok(refine(f, l, 0.5 * tol, depth - 1, exhausted)? + refine(f, r, 0.5 * tol, depth - 1, exhausted)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_simpson_polynomial_exact() {
        let cfg = QuadratureConfig::default();
        let v = adaptive_simpson(|x| Ok(x * x * x - 2.0 * x), 0.0, 2.0, &cfg).unwrap();
        assert_relative_eq!(v, 0.0, epsilon = 1e-12);
        let v = adaptive_simpson(|x| Ok(x * x), 1.0, 4.0, &cfg).unwrap();
        assert_relative_eq!(v, 21.0, max_relative = 1e-12);
    }

    #[test]
    fn test_simpson_smooth() {
        let cfg = QuadratureConfig::default();
        let v = adaptive_simpson(|x| Ok(x.sin()), 0.0, std::f64::consts::PI, &cfg).unwrap();
        assert_relative_eq!(v, 2.0, max_relative = 1e-9);
        let v = adaptive_simpson(|x| Ok((-x).exp()), 0.0, 30.0, &cfg).unwrap();
        assert_relative_eq!(v, 1.0 - (-30.0_f64).exp(), max_relative = 1e-9);
    }

    #[test]
    fn test_simpson_rejects_unbounded() {
        let cfg = QuadratureConfig::default();
        assert!(matches!(
            adaptive_simpson(|_| Ok(1.0), 0.0, f64::INFINITY, &cfg),
            Err(SedError::NonIntegrable(_))
        ));
    }

    #[test]
    fn test_error_propagates() {
        let cfg = QuadratureConfig::default();
        let r = adaptive_simpson(
            |x| {
                if x > 0.9 {
                    Err(SedError::Domain { x, min: 0.0, max: 0.9 })
                } else {
                    Ok(1.0)
                }
            },
            0.0,
            1.0,
            &cfg,
        );
        assert!(r.is_err());
    }

    #[test]
    fn test_integrate_on_nodes() {
        let v = integrate_on_nodes(&[0.0, 1.0, 2.0], |x| Ok(2.0 * x)).unwrap();
        assert_relative_eq!(v, 4.0, epsilon = 1e-15);
    }
}
