//! The severity aggregation pipeline for one location.
//!
//! Stages run strictly forward: extract → weight → distribution → mode and
//! consensus → WBSI → bands → polymodality → outliers → thresholds. Nothing
//! is kept between calls, and for a fixed input, fixed parameters and a
//! fixed `now` the result is bit-for-bit reproducible.
//!
//! No input makes the engine fail. An empty list yields the neutral result:
//! modal severity 50, consensus 0, zero bands, no outliers, LOW PRIORITY,
//! Low confidence, Not Actionable.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::alert::thresholds::{classify, ClassifierInput, ThresholdAnalysis};
use crate::analysis::bands::{severity_bands, SeverityBands};
use crate::analysis::consensus::{compose_wbsi, consensus, modal_severity};
use crate::analysis::distribution::Distribution;
use crate::analysis::outliers::{detect_outliers, Outlier};
use crate::analysis::polymodality::{detect_polymodality, Polymodality};
use crate::analysis::severity::extract_severity;
use crate::analysis::stats::weighted_moments;
use crate::analysis::weights::report_weight_at;
use crate::config::{EngineConfig, GridConfig, TuningParams};
use crate::logging::{self, Stage};
use crate::model::{Report, VerificationStatus};

/// Everything computed for one location in one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WbsiResult {
    pub wbsi_mode: f64,
    pub wbsi_consensus: f64,
    pub wbsi_mode_shrunk: f64,
    pub wbsi_consensus_shrunk: f64,
    pub modal_severity: f64,
    /// Weighted share of reports within δ of the mode, 0-1.
    pub consensus: f64,
    /// Number of verified reports that participated.
    pub report_count: usize,
    pub shrinkage_factor: f64,
    pub distribution: Distribution,
    pub severity_bands: SeverityBands,
    pub polymodality: Polymodality,
    pub outliers: Vec<Outlier>,
    pub thresholds: ThresholdAnalysis,
    pub parameters: TuningParams,
}

/// Runs the full pipeline over the verified reports in `reports`.
///
/// Out-of-range tuning values are replaced by their defaults; the values
/// actually used are echoed in `parameters`.
pub fn compute_wbsi_at(
    reports: &[Report],
    tuning: &TuningParams,
    grid: &GridConfig,
    now: DateTime<Utc>,
) -> WbsiResult {
    let tuning = &tuning.sanitized();
    let verified: Vec<&Report> = reports
        .iter()
        .filter(|r| r.status == VerificationStatus::Verified)
        .collect();
    if verified.len() < reports.len() {
        logging::debug(
            Stage::Engine,
            None,
            &format!(
                "Skipping {} unverified report(s) of {}",
                reports.len() - verified.len(),
                reports.len()
            ),
        );
    }

    let n = verified.len();
    let ids: Vec<&str> = verified.iter().map(|r| r.id.as_str()).collect();
    let severities: Vec<f64> = verified.iter().map(|r| extract_severity(r)).collect();
    let weights: Vec<f64> = verified.iter().map(|r| report_weight_at(r, now)).collect();

    let distribution = Distribution::build(&severities, &weights, grid);
    logging::debug(
        Stage::Distribution,
        None,
        &format!(
            "{} report(s), total weight {:.3}, {} bins, {} KDE points",
            n,
            distribution.total_weight,
            distribution.histogram.len(),
            distribution.kde.len()
        ),
    );
    let mode = modal_severity(&distribution.kde);
    let consensus = consensus(&severities, &weights, mode, tuning.delta);
    let scores = compose_wbsi(mode, consensus, n, tuning);

    let bands = severity_bands(&severities, &weights);
    let polymodality = detect_polymodality(&distribution.kde);

    let moments = weighted_moments(&severities, &weights);
    let outliers = detect_outliers(&ids, &severities, &moments);

    let thresholds = classify(&ClassifierInput {
        severities: &severities,
        weights: &weights,
        consensus,
        report_count: n,
        is_polymodal: polymodality.is_polymodal,
        bands: &bands,
        histogram_bins: grid.histogram_bins,
    });

    WbsiResult {
        wbsi_mode: scores.wbsi_mode,
        wbsi_consensus: scores.wbsi_consensus,
        wbsi_mode_shrunk: scores.wbsi_mode_shrunk,
        wbsi_consensus_shrunk: scores.wbsi_consensus_shrunk,
        modal_severity: mode,
        consensus,
        report_count: n,
        shrinkage_factor: scores.shrinkage_factor,
        distribution,
        severity_bands: bands,
        polymodality,
        outliers,
        thresholds,
        parameters: *tuning,
    }
}

/// Convenience wrapper that uses the real current time.
/// Use `compute_wbsi_at` in tests to keep them deterministic.
pub fn compute_wbsi(reports: &[Report], tuning: &TuningParams, grid: &GridConfig) -> WbsiResult {
    compute_wbsi_at(reports, tuning, grid, Utc::now())
}

/// Runs the pipeline with a loaded config and logs a one-line summary
/// tagged with the location.
pub fn analyze_location_at(
    location: &str,
    reports: &[Report],
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> WbsiResult {
    let result = compute_wbsi_at(reports, &config.tuning, &config.grid, now);

    for outlier in &result.outliers {
        logging::debug(
            Stage::Classify,
            Some(location),
            &format!(
                "Outlier {} at severity {:.1} ({:.1}σ from mean)",
                outlier.id, outlier.severity, outlier.z_score
            ),
        );
    }
    logging::log_analysis_summary(
        Some(location),
        result.report_count,
        result.wbsi_consensus,
        result.thresholds.concern_level,
        result.thresholds.actionability,
    );
    result
}

pub fn analyze_location(location: &str, reports: &[Report], config: &EngineConfig) -> WbsiResult {
    analyze_location_at(location, reports, config, Utc::now())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
