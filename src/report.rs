//! Summaries for benchmark and cross-check runs.
use crate::heap::Neighbor;
use crate::metric::Scalar;

/// Latency statistics over a set of samples, in whatever unit they were
/// recorded in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySummary {
    pub count: usize,
    pub mean: f64,
    pub p95: u64,
    pub p99: u64,
}

impl LatencySummary {
    /// `None` when there are no samples.
    pub fn from_samples(mut samples: Vec<u64>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        samples.sort_unstable();

        let count = samples.len();
        let mean = samples.iter().map(|&s| s as f64).sum::<f64>() / count as f64;
        let quantile = |q: f64| samples[((count as f64 * q) as usize).min(count - 1)];

        Some(LatencySummary { count: count, mean: mean, p95: quantile(0.95), p99: quantile(0.99) })
    }
}

/// Absolute difference between the summed distances of two result lists.
///
/// Zero when both lists hold the same distances, whichever items they
/// picked among ties.
pub fn distance_error<T, F: Scalar>(a: &[Neighbor<'_, T, F>], b: &[Neighbor<'_, T, F>]) -> f64 {
    let sum = |ns: &[Neighbor<'_, T, F>]| {
        ns.iter().map(|n| n.distance.to_f64().unwrap_or(std::f64::NAN)).sum::<f64>()
    };
    (sum(a) - sum(b)).abs()
}
