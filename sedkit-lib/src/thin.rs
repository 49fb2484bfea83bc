//! Knot thinning with a bounded integral error.

use log::debug;

use crate::error::{Result, SedError};
use crate::interp::trapz;

/// Remove knots from `(x, f)` while bounding the change of the integral.
///
/// Greedy left-to-right: from the last kept knot `i`, the next kept knot is
/// the farthest `k` such that replacing `f` on `[x_i, x_k]` by the chord
/// changes the integral of `|f|` by at most `rel_err * total * (x_k - x_i) /
/// (x_last - x_first)`. The total error is therefore below
/// `rel_err * ∫|f|`. Both endpoints are always kept.
pub fn thin_tabulated_values(x: &[f64], f: &[f64], rel_err: f64) -> Result<(Vec<f64>, Vec<f64>)> {
    if !(rel_err > 0.0 && rel_err < 1.0) {
        return Err(SedError::construction(format!(
            "rel_err must be in (0, 1), got {rel_err}"
        )));
    }
    if x.len() != f.len() || x.len() < 2 {
        return Err(SedError::construction(
            "thinning needs matching x and f with at least two knots".to_string(),
        ));
    }

    let n = x.len();
    let abs_f: Vec<f64> = f.iter().map(|v| v.abs()).collect();
    let total = trapz(x, &abs_f);
    if total == 0.0 {
        return Ok((vec![x[0], x[n - 1]], vec![f[0], f[n - 1]]));
    }

    let thresh = rel_err * total;
    let x_range = x[n - 1] - x[0];

    let mut keep = vec![0];
    let mut i = 0;
    while i < n - 1 {
        let mut j = i + 1;
        for k in (i + 2)..n {
            if chord_error(x, f, i, k) > thresh * (x[k] - x[i]) / x_range {
                break;
            }
            j = k;
        }
        keep.push(j);
        i = j;
    }

    debug!("thinned {n} knots to {} (rel_err = {rel_err})", keep.len());
    Ok((
        keep.iter().map(|&k| x[k]).collect(),
        keep.iter().map(|&k| f[k]).collect(),
    ))
}

// ∫|chord - f| over [x_i, x_k], trapezoid on the original knots
fn chord_error(x: &[f64], f: &[f64], i: usize, k: usize) -> f64 {
    let slope = (f[k] - f[i]) / (x[k] - x[i]);
    let dev = |m: usize| (f[i] + slope * (x[m] - x[i]) - f[m]).abs();
    (i..k)
        .map(|m| 0.5 * (x[m + 1] - x[m]) * (dev(m) + dev(m + 1)))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thin_straight_line() {
        let x: Vec<f64> = (0..101).map(|i| i as f64).collect();
        let f: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        let (tx, tf) = thin_tabulated_values(&x, &f, 1e-6).unwrap();
        assert_eq!(tx, vec![0.0, 100.0]);
        assert_eq!(tf, vec![1.0, 201.0]);
    }

    #[test]
    fn test_thin_bounds_integral() {
        let x: Vec<f64> = (0..=2000).map(|i| 300.0 + 0.4 * i as f64).collect();
        let f: Vec<f64> = x
            .iter()
            .map(|&w| 1.0 + 0.5 * (w / 17.0).sin() + (-(w - 600.0).powi(2) / 8.0).exp())
            .collect();
        let full = trapz(&x, &f);
        for rel_err in [1e-2, 1e-3, 1e-4, 1e-5] {
            let (tx, tf) = thin_tabulated_values(&x, &f, rel_err).unwrap();
            assert!(tx.len() < x.len());
            assert_eq!(tx[0], x[0]);
            assert_eq!(*tx.last().unwrap(), *x.last().unwrap());
            assert!(tx.windows(2).all(|w| w[0] < w[1]));
            let thinned = trapz(&tx, &tf);
            assert!(
                ((full - thinned) / full).abs() <= rel_err,
                "rel_err {rel_err}: {full} vs {thinned}"
            );
        }
    }

    #[test]
    fn test_thin_zero_function() {
        let (tx, tf) = thin_tabulated_values(&[1.0, 2.0, 3.0], &[0.0, 0.0, 0.0], 1e-3).unwrap();
        assert_eq!(tx, vec![1.0, 3.0]);
        assert_eq!(tf, vec![0.0, 0.0]);
    }

    #[test]
    fn test_thin_invalid() {
        assert!(thin_tabulated_values(&[1.0, 2.0], &[1.0, 2.0], 0.0).is_err());
        assert!(thin_tabulated_values(&[1.0], &[1.0], 1e-3).is_err());
    }
}
