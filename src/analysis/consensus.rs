//! Modal severity, consensus, and the headline WBSI scores.

use serde::Serialize;

use crate::analysis::distribution::KdePoint;
use crate::analysis::severity::DEFAULT_SEVERITY;
use crate::config::TuningParams;

/// Severity at the KDE maximum. First occurrence wins on ties; an empty or
/// all-zero density gives the neutral 50.
pub fn modal_severity(kde: &[KdePoint]) -> f64 {
    let mut best: Option<&KdePoint> = None;
    for point in kde {
        if best.is_none_or(|b| point.density > b.density) {
            best = Some(point);
        }
    }
    match best {
        Some(point) if point.density > 0.0 => point.severity,
        _ => DEFAULT_SEVERITY,
    }
}

/// Weighted share of reports within `delta` of the mode, in [0, 1].
pub fn consensus(severities: &[f64], weights: &[f64], mode: f64, delta: f64) -> f64 {
    let total_weight: f64 = weights.iter().sum();
    if total_weight <= 0.0 {
        return 0.0;
    }

    let agreeing: f64 = severities
        .iter()
        .zip(weights)
        .filter(|(s, _)| (**s - mode).abs() <= delta)
        .map(|(_, &w)| w)
        .sum();
    (agreeing / total_weight).clamp(0.0, 1.0)
}

/// n / (n + κ): 0 for no reports, approaching 1 as n grows.
pub fn shrinkage_factor(n: usize, kappa: f64) -> f64 {
    let n = n as f64;
    if n + kappa <= 0.0 {
        return 0.0;
    }
    n / (n + kappa)
}

/// The two headline variants and their small-sample shrunk forms.
///
/// Callers should display the shrunk variant when n < 10 and always show
/// the raw one next to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WbsiScores {
    pub wbsi_mode: f64,
    pub wbsi_consensus: f64,
    pub wbsi_mode_shrunk: f64,
    pub wbsi_consensus_shrunk: f64,
    pub shrinkage_factor: f64,
}

/// Sample size below which the shrunk variant is the one to display.
pub const PREFER_SHRUNK_BELOW: usize = 10;

pub fn compose_wbsi(mode: f64, consensus: f64, n: usize, tuning: &TuningParams) -> WbsiScores {
    let wbsi_mode = mode;
    let wbsi_consensus = tuning.alpha * mode + (1.0 - tuning.alpha) * (100.0 * consensus);
    let factor = shrinkage_factor(n, tuning.kappa);

    WbsiScores {
        wbsi_mode,
        wbsi_consensus,
        wbsi_mode_shrunk: wbsi_mode * factor,
        wbsi_consensus_shrunk: wbsi_consensus * factor,
        shrinkage_factor: factor,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn point(severity: f64, density: f64) -> KdePoint {
        KdePoint { severity, density }
    }

    // --- Mode ---------------------------------------------------------------

    #[test]
    fn test_mode_is_argmax() {
        let kde = [point(0.0, 0.1), point(10.0, 0.4), point(20.0, 0.2)];
        assert_eq!(modal_severity(&kde), 10.0);
    }

    #[test]
    fn test_mode_ties_resolve_to_first_occurrence() {
        let kde = [point(0.0, 0.1), point(30.0, 0.4), point(70.0, 0.4)];
        assert_eq!(modal_severity(&kde), 30.0);
    }

    #[test]
    fn test_empty_or_flat_zero_density_defaults_to_fifty() {
        assert_eq!(modal_severity(&[]), 50.0);
        assert_eq!(modal_severity(&[point(0.0, 0.0), point(100.0, 0.0)]), 50.0);
    }

    // --- Consensus ----------------------------------------------------------

    #[test]
    fn test_consensus_is_weighted_share_within_delta() {
        // 0.9 of 1.2 total weight lies within 10 of 40.
        let c = consensus(&[35.0, 50.0, 80.0], &[0.5, 0.4, 0.3], 40.0, 10.0);
        assert!((c - 0.75).abs() < 1e-12, "got {}", c);
    }

    #[test]
    fn test_consensus_tolerance_is_inclusive() {
        assert_eq!(consensus(&[30.0], &[1.0], 40.0, 10.0), 1.0);
    }

    #[test]
    fn test_consensus_without_weight_is_zero() {
        assert_eq!(consensus(&[], &[], 50.0, 10.0), 0.0);
    }

    // --- Shrinkage and composition -----------------------------------------

    #[test]
    fn test_shrinkage_factor_values() {
        assert_eq!(shrinkage_factor(0, 20.0), 0.0);
        assert_eq!(shrinkage_factor(20, 20.0), 0.5);
        assert!(shrinkage_factor(1000, 20.0) < 1.0);
    }

    #[test]
    fn test_shrinkage_is_strictly_increasing_in_n() {
        let mut previous = shrinkage_factor(0, 20.0);
        for n in 1..200 {
            let current = shrinkage_factor(n, 20.0);
            assert!(current > previous, "n={} did not increase the factor", n);
            previous = current;
        }
    }

    #[test]
    fn test_compose_blends_mode_and_consensus() {
        let tuning = TuningParams::default();
        let scores = compose_wbsi(80.0, 0.5, 20, &tuning);
        assert_eq!(scores.wbsi_mode, 80.0);
        // 0.7 * 80 + 0.3 * 50 = 71
        assert!((scores.wbsi_consensus - 71.0).abs() < 1e-9);
        assert_eq!(scores.shrinkage_factor, 0.5);
        assert!((scores.wbsi_mode_shrunk - 40.0).abs() < 1e-9);
        assert!((scores.wbsi_consensus_shrunk - 35.5).abs() < 1e-9);
    }

    #[test]
    fn test_alpha_one_ignores_consensus() {
        let tuning = TuningParams { alpha: 1.0, ..Default::default() };
        let scores = compose_wbsi(64.0, 0.1, 5, &tuning);
        assert_eq!(scores.wbsi_consensus, 64.0);
    }
}
