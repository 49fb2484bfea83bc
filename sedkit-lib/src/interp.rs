/// Index of the upper knot of the bracket containing `x`.
///
/// `xp` must be strictly increasing with at least two entries and
/// `xp[0] <= x <= xp[last]`. The returned index is in `1..xp.len()`.
pub(crate) fn upper_bracket(x: f64, xp: &[f64]) -> usize {
    match xp.partition_point(|&v| v < x) {
        0 => 1,
        i if i >= xp.len() => xp.len() - 1,
        i => i,
    }
}

/// Linear interpolation at `x`, clamped to the end values.
///
/// Exactly reproduces `fp[i]` when `x == xp[i]`.
pub fn interp_one(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[xp.len() - 1] {
        return fp[fp.len() - 1];
    }

    let idx = upper_bracket(x, xp);
    if xp[idx] == x {
        return fp[idx];
    }

    let lo = idx - 1;
    let t = (x - xp[lo]) / (xp[idx] - xp[lo]);
    fp[lo] + t * (fp[idx] - fp[lo])
}

/// Sorted union of two ascending knot sets, without duplicates.
pub fn merge_knots(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        let next = if j >= b.len() || (i < a.len() && a[i] <= b[j]) {
            i += 1;
            a[i - 1]
        } else {
            j += 1;
            b[j - 1]
        };
        if out.last() != Some(&next) {
            out.push(next);
        }
    }
    out
}

/// Trapezoidal integral of samples `y` at abscissae `x`.
pub fn trapz(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xw, yw)| 0.5 * (xw[1] - xw[0]) * (yw[0] + yw[1]))
        .sum()
}
