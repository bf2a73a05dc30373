//! Sample statistics over plain `f64` slices.
//!
//! Empty or too-small samples yield `NaN`, the same "undefined" marker the rolling
//! engine uses for incomplete windows.

use std::cmp::Ordering;

/// Dispersion below this magnitude is floating-point noise and is reported as zero.
///
/// A series with a constant daily return still produces returns that differ in the
/// last bit after division; without this floor its volatility would be ~1e-17
/// instead of exactly zero and the zero-variance policies would never trigger.
pub const NOISE_FLOOR: f64 = 1e-12;

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Variance with `n - 1` in the denominator.
pub fn sample_variance(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return f64::NAN;
    }
    let m = mean(xs);
    let var = xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (xs.len() - 1) as f64;
    snap(var, NOISE_FLOOR * NOISE_FLOOR)
}

pub fn sample_std(xs: &[f64]) -> f64 {
    sample_variance(xs).sqrt()
}

/// Standard deviation with `n` in the denominator.
pub fn population_std(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    let m = mean(xs);
    let var = xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / xs.len() as f64;
    snap(var, NOISE_FLOOR * NOISE_FLOOR).sqrt()
}

/// Sample covariance of two equally long slices.
pub fn covariance(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let (mx, my) = (mean(xs), mean(ys));
    xs.iter()
        .zip(ys)
        .map(|(x, y)| (x - mx) * (y - my))
        .sum::<f64>()
        / (n - 1) as f64
}

/// Pearson correlation; `NaN` when either side has no variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    let sx = sample_std(&xs[..n]);
    let sy = sample_std(&ys[..n]);
    if sx == 0.0 || sy == 0.0 || sx.is_nan() || sy.is_nan() {
        return f64::NAN;
    }
    (covariance(xs, ys) / (sx * sy)).clamp(-1.0, 1.0)
}

/// Empirical quantile with linear interpolation between order statistics.
///
/// For `q` in `[0, 1]` the position in the ascending sample is `q * (n - 1)`; the
/// result interpolates between the two neighbouring values. This is the "linear"
/// method (numpy's default `percentile`).
pub fn quantile_linear(xs: &[f64], q: f64) -> f64 {
    if xs.is_empty() || !(0.0..=1.0).contains(&q) {
        return f64::NAN;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Slope of the ordinary least-squares line through `(xs, ys)`.
pub fn ols_slope(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let (mx, my) = (mean(&xs[..n]), mean(&ys[..n]));
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for i in 0..n {
        let dx = xs[i] - mx;
        sxy += dx * (ys[i] - my);
        sxx += dx * dx;
    }
    let slope = sxy / sxx;
    (sxx > 0.0 && slope.is_finite()).then_some(slope)
}

fn snap(value: f64, floor: f64) -> f64 {
    if value.abs() < floor { 0.0 } else { value }
}
