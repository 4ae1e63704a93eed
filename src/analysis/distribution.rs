//! Weighted histogram and Gaussian KDE over the [0, 100] severity domain.
//!
//! The KDE is O(reports × points). That is fine for one location's reports
//! per call; batch scans across many locations should pre-aggregate by
//! locality first.

use serde::Serialize;

use crate::config::GridConfig;

pub const SEVERITY_MIN: f64 = 0.0;
pub const SEVERITY_MAX: f64 = 100.0;

const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    /// Sum of the weights of the reports falling in this bin.
    pub weight: f64,
}

impl HistogramBin {
    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KdePoint {
    pub severity: f64,
    pub density: f64,
}

/// Fixed-bin weighted histogram plus the KDE sampled on an even grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub histogram: Vec<HistogramBin>,
    pub kde: Vec<KdePoint>,
    pub total_weight: f64,
}

impl Distribution {
    pub fn build(severities: &[f64], weights: &[f64], grid: &GridConfig) -> Distribution {
        Distribution {
            histogram: weighted_histogram(severities, weights, grid.histogram_bins),
            kde: weighted_kde(severities, weights, grid.kde_points, grid.bandwidth),
            total_weight: weights.iter().sum(),
        }
    }

    /// Largest bin weight, 0 for an empty histogram.
    pub fn max_bin_weight(&self) -> f64 {
        self.histogram.iter().map(|b| b.weight).fold(0.0, f64::max)
    }

    pub fn max_density(&self) -> f64 {
        self.kde.iter().map(|p| p.density).fold(0.0, f64::max)
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Index of the bin `severity` falls in; 100 lands in the last bin.
pub fn bin_index(severity: f64, bins: usize) -> usize {
    let bins = bins.max(1);
    let width = (SEVERITY_MAX - SEVERITY_MIN) / bins as f64;
    let raw = ((severity - SEVERITY_MIN) / width).floor();
    if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(bins - 1)
    }
}

pub fn weighted_histogram(severities: &[f64], weights: &[f64], bins: usize) -> Vec<HistogramBin> {
    let bins = bins.max(1);
    let width = (SEVERITY_MAX - SEVERITY_MIN) / bins as f64;
    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: SEVERITY_MIN + i as f64 * width,
            upper: SEVERITY_MIN + (i + 1) as f64 * width,
            weight: 0.0,
        })
        .collect();

    for (&severity, &weight) in severities.iter().zip(weights) {
        histogram[bin_index(severity, bins)].weight += weight;
    }
    histogram
}

// ---------------------------------------------------------------------------
// KDE
// ---------------------------------------------------------------------------

pub fn gaussian_kernel(u: f64) -> f64 {
    (-0.5 * u * u).exp() * INV_SQRT_2PI
}

/// Evenly spaced evaluation grid over [0, 100], both ends included.
pub fn kde_grid(points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![SEVERITY_MIN],
        n => {
            let step = (SEVERITY_MAX - SEVERITY_MIN) / (n - 1) as f64;
            (0..n).map(|i| SEVERITY_MIN + i as f64 * step).collect()
        }
    }
}

/// density(x) = Σ (wᵢ / ΣW) · K((x − sᵢ) / h) / h.
/// Uniformly zero when the total weight is not positive.
pub fn weighted_kde(
    severities: &[f64],
    weights: &[f64],
    points: usize,
    bandwidth: f64,
) -> Vec<KdePoint> {
    let total_weight: f64 = weights.iter().sum();
    let grid = kde_grid(points);

    if total_weight <= 0.0 || bandwidth <= 0.0 {
        return grid
            .into_iter()
            .map(|severity| KdePoint { severity, density: 0.0 })
            .collect();
    }

    grid.into_iter()
        .map(|x| {
            let density = severities
                .iter()
                .zip(weights)
                .map(|(&s, &w)| (w / total_weight) * gaussian_kernel((x - s) / bandwidth) / bandwidth)
                .sum();
            KdePoint { severity: x, density }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
