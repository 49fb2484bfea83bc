/// Natural cubic spline second derivatives for knots `(x, y)`.
///
/// Solves the tridiagonal system with zero curvature at both ends.
/// `x` must be strictly increasing.
pub fn second_derivatives(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut y2 = vec![0.0; n];
    if n < 3 {
        return y2;
    }

    let mut u = vec![0.0; n];
    for i in 1..n - 1 {
        let sig = (x[i] - x[i - 1]) / (x[i + 1] - x[i - 1]);
        let p = sig * y2[i - 1] + 2.0;
        y2[i] = (sig - 1.0) / p;
        let slope_diff =
            (y[i + 1] - y[i]) / (x[i + 1] - x[i]) - (y[i] - y[i - 1]) / (x[i] - x[i - 1]);
        u[i] = (6.0 * slope_diff / (x[i + 1] - x[i - 1]) - sig * u[i - 1]) / p;
    }

    y2[n - 1] = 0.0;
    for k in (0..n - 1).rev() {
        y2[k] = y2[k] * y2[k + 1] + u[k];
    }
    y2
}

/// Cubic spline interpolation using pre-computed second derivatives.
///
/// # Arguments
/// * `xin` - Input x values (must be strictly increasing)
/// * `yin` - Input y values
/// * `yspl` - Pre-computed spline coefficients (second derivatives of y)
/// * `x` - Point to interpolate at
pub fn eval(xin: &[f64], yin: &[f64], yspl: &[f64], x: f64) -> f64 {
    let hi = crate::interp::upper_bracket(x, xin);
    let lo = hi - 1;
    if xin[hi] == x {
        return yin[hi];
    }

    let diff = xin[hi] - xin[lo];
    debug_assert!(diff > 0.0, "xin must be strictly increasing");

    let a = (xin[hi] - x) / diff;
    let b = (x - xin[lo]) / diff;

    a * yin[lo]
        + b * yin[hi]
        + (diff * diff / 6.0) * ((a * a - 1.0) * a * yspl[lo] + (b * b - 1.0) * b * yspl[hi])
}
