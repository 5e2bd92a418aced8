//! Information measures.

/// Binary entropy in nats: `-p ln p - (1-p) ln(1-p)`.
///
/// Defined as `0` at the endpoints so callers never see `NaN` from `0 * ln 0`.
pub fn binary_entropy(p: f64) -> f64 {
    if p <= 0.0 || p >= 1.0 {
        return 0.0;
    }
    -p * p.ln() - (1.0 - p) * (1.0 - p).ln()
}

/// Shannon entropy (nats) of a discrete distribution.
pub fn entropy(mass: &[f64]) -> f64 {
    mass.iter()
        .filter(|&&m| m > 0.0)
        .map(|&m| -m * m.ln())
        .sum()
}
