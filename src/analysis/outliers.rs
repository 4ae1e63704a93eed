//! Reports far from the weighted mean.

use serde::Serialize;

use crate::analysis::stats::WeightedMoments;

/// Minimum number of reports before a standard deviation is meaningful.
pub const MIN_REPORTS_FOR_OUTLIERS: usize = 3;

/// Reports deviating by more than this many standard deviations are flagged.
pub const OUTLIER_SIGMA: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outlier {
    pub id: String,
    pub severity: f64,
    /// Absolute distance from the weighted mean.
    pub deviation: f64,
    /// Deviation in weighted standard deviations.
    pub z_score: f64,
}

/// Flags reports whose |severity − mean| exceeds 2σ, using the weighted
/// mean and standard deviation in `moments`. Empty for fewer than 3 reports
/// or when the severities have no spread.
pub fn detect_outliers(ids: &[&str], severities: &[f64], moments: &WeightedMoments) -> Vec<Outlier> {
    if severities.len() < MIN_REPORTS_FOR_OUTLIERS || moments.std_dev <= 0.0 {
        return Vec::new();
    }

    let limit = OUTLIER_SIGMA * moments.std_dev;
    ids.iter()
        .zip(severities)
        .filter_map(|(id, &severity)| {
            let deviation = (severity - moments.mean).abs();
            (deviation > limit).then(|| Outlier {
                id: id.to_string(),
                severity,
                deviation,
                z_score: deviation / moments.std_dev,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::stats::weighted_moments;

    fn run(severities: &[f64], weights: &[f64]) -> Vec<Outlier> {
        let ids: Vec<String> = (0..severities.len()).map(|i| format!("r-{}", i)).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let moments = weighted_moments(severities, weights);
        detect_outliers(&id_refs, severities, &moments)
    }

    #[test]
    fn test_flags_single_extreme_report() {
        let severities = [10.0, 11.0, 12.0, 10.0, 11.0, 12.0, 10.0, 11.0, 90.0];
        let outliers = run(&severities, &[1.0; 9]);
        assert_eq!(outliers.len(), 1);
        assert_eq!(outliers[0].id, "r-8");
        assert_eq!(outliers[0].severity, 90.0);
        assert!(outliers[0].z_score > 2.0);
    }

    #[test]
    fn test_fewer_than_three_reports_is_always_empty() {
        assert!(run(&[], &[]).is_empty());
        assert!(run(&[5.0], &[1.0]).is_empty());
        assert!(run(&[0.0, 100.0], &[1.0, 1.0]).is_empty());
    }

    #[test]
    fn test_identical_severities_have_no_outliers() {
        assert!(run(&[40.0, 40.0, 40.0, 40.0], &[1.0, 0.2, 0.5, 0.9]).is_empty());
    }

    #[test]
    fn test_weighted_spread_decides_what_is_extreme() {
        let severities = [0.0, 50.0, 100.0];
        // Equal weights: σ ≈ 40.8, nothing lies beyond 2σ.
        assert!(run(&severities, &[1.0, 1.0, 1.0]).is_empty());

        // A heavily trusted middle report shrinks σ to about 7.
        let outliers = run(&severities, &[1.0, 100.0, 1.0]);
        let flagged: Vec<&str> = outliers.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(flagged, vec!["r-0", "r-2"]);
        assert!((outliers[0].deviation - 50.0).abs() < 1e-9);
    }
}
