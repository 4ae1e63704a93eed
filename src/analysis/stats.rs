//! Weighted statistics shared by the outlier detector and the classifier.
//!
//! All moments are weight-normalized population moments. Plain sample
//! statistics are never mixed in.

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::analysis::distribution::HistogramBin;

/// Significance level for the uniformity test.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

const VARIANCE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WeightedMoments {
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub skewness: f64,
    pub excess_kurtosis: f64,
}

/// Weighted mean, variance, skewness and excess kurtosis.
///
/// Zero total weight gives all zeros; zero variance gives zero shape moments.
pub fn weighted_moments(values: &[f64], weights: &[f64]) -> WeightedMoments {
    let total_weight: f64 = weights.iter().sum();
    if total_weight <= 0.0 {
        return WeightedMoments::default();
    }

    let mean = values
        .iter()
        .zip(weights)
        .map(|(&x, &w)| w * x)
        .sum::<f64>()
        / total_weight;

    let central = |power: i32| {
        values
            .iter()
            .zip(weights)
            .map(|(&x, &w)| w * (x - mean).powi(power))
            .sum::<f64>()
            / total_weight
    };

    let variance = central(2);
    if variance <= VARIANCE_EPSILON {
        return WeightedMoments {
            mean,
            variance: 0.0,
            ..Default::default()
        };
    }

    let std_dev = variance.sqrt();
    WeightedMoments {
        mean,
        variance,
        std_dev,
        skewness: central(3) / std_dev.powi(3),
        excess_kurtosis: central(4) / (variance * variance) - 3.0,
    }
}

/// Sarle's bimodality coefficient. Values above 5/9 ≈ 0.555 hint at a
/// split population.
///
/// For n > 3 the skewness and kurtosis are bias-corrected:
///   BC = (G1² + 1) / (G2 + 3(n−1)² / ((n−2)(n−3)))
/// which reduces to (G1² + 1)(n−2)(n−3) / ((n−1)(n+1)(g2 + 3)).
/// Smaller samples use the population form (g1² + 1) / (g2 + 3).
/// Returns 0 when there is no spread.
pub fn bimodality_coefficient(moments: &WeightedMoments, n: usize) -> f64 {
    if moments.variance <= 0.0 {
        return 0.0;
    }

    let g1 = moments.skewness;
    let g2 = moments.excess_kurtosis;

    let (numerator, denominator) = if n > 3 {
        let n = n as f64;
        let corrected_skew = g1 * (n * (n - 1.0)).sqrt() / (n - 2.0);
        (
            corrected_skew * corrected_skew + 1.0,
            (n - 1.0) * (n + 1.0) * (g2 + 3.0) / ((n - 2.0) * (n - 3.0)),
        )
    } else {
        (g1 * g1 + 1.0, g2 + 3.0)
    };

    if denominator <= 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    numerator / denominator
}

// ---------------------------------------------------------------------------
// Chi-square uniformity test
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
    /// True when uniformity is rejected at `SIGNIFICANCE_LEVEL`.
    pub significant: bool,
}

/// Tests the weighted histogram against a uniform null over its bins.
///
/// Observed counts are each bin's weight share scaled to `n` reports, so
/// trust weights shape the distribution without inflating the sample size.
/// Expected count per bin is n / bins, with bins − 1 degrees of freedom.
pub fn chi_square_uniformity(histogram: &[HistogramBin], n: usize) -> ChiSquareTest {
    let bins = histogram.len();
    let total_weight: f64 = histogram.iter().map(|b| b.weight).sum();
    let degrees_of_freedom = bins.saturating_sub(1);

    if n == 0 || bins < 2 || total_weight <= 0.0 {
        return ChiSquareTest {
            statistic: 0.0,
            degrees_of_freedom,
            p_value: 1.0,
            significant: false,
        };
    }

    let n = n as f64;
    let expected = n / bins as f64;
    let statistic: f64 = histogram
        .iter()
        .map(|bin| {
            let observed = n * bin.weight / total_weight;
            (observed - expected).powi(2) / expected
        })
        .sum();

    let p_value = match ChiSquared::new(degrees_of_freedom as f64) {
        Ok(dist) => dist.sf(statistic).clamp(0.0, 1.0),
        Err(_) => 1.0,
    };

    ChiSquareTest {
        statistic,
        degrees_of_freedom,
        p_value,
        significant: p_value < SIGNIFICANCE_LEVEL,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
