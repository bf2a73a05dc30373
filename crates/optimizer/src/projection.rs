use std::cmp::Ordering;

/// Euclidean projection of `x` onto the probability simplex `{w : w >= 0, sum(w) = 1}`.
///
/// Sort-based algorithm: find the largest `k` such that the `k` biggest entries stay
/// positive after subtracting a common shift, then clip at zero.
pub fn project_to_simplex(x: &[f64]) -> Vec<f64> {
    if x.is_empty() {
        return Vec::new();
    }
    let mut sorted = x.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    let mut cumulative = 0.0;
    let mut theta = 0.0;
    for (k, u) in sorted.iter().enumerate() {
        cumulative += u;
        let candidate = (cumulative - 1.0) / (k + 1) as f64;
        if u - candidate > 0.0 {
            theta = candidate;
        }
    }
    x.iter().map(|v| (v - theta).max(0.0)).collect()
}

/// Squared distance between `x` and its projection.
pub(crate) fn squared_distance(x: &[f64], projected: &[f64]) -> f64 {
    x.iter().zip(projected).map(|(a, b)| (a - b) * (a - b)).sum()
}
