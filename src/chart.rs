//! Display-ready projection of a `WbsiResult`.
//!
//! A pure reshape for the rendering layer: histogram bars, the KDE curve
//! rescaled to overlay the bars, a summary block and the outlier list.
//! Nothing new is computed here.

use serde::Serialize;

use crate::analysis::bands::{SeverityBand, SeverityBands};
use crate::analysis::consensus::PREFER_SHRUNK_BELOW;
use crate::analysis::distribution::{SEVERITY_MAX, SEVERITY_MIN};
use crate::analysis::outliers::Outlier;
use crate::engine::WbsiResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    /// Bin midpoint.
    pub severity: f64,
    /// Summed report weight in the bin.
    pub count: f64,
    pub band: SeverityBand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartCurvePoint {
    pub severity: f64,
    pub density: f64,
    /// Density rescaled so the curve's peak matches the tallest bar.
    pub scaled_density: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    pub peak_severity: f64,
    /// Mode ± δ, clipped to the severity domain.
    pub consensus_range: (f64, f64),
    pub wbsi_mode: f64,
    pub wbsi_mode_shrunk: f64,
    pub wbsi_consensus: f64,
    pub wbsi_consensus_shrunk: f64,
    /// True when the shrunk variants are the ones to headline (n < 10).
    pub prefer_shrunk: bool,
    pub display_wbsi_mode: f64,
    pub display_wbsi_consensus: f64,
    pub shrinkage_factor: f64,
    pub consensus_percent: f64,
    pub severity_bands: SeverityBands,
    pub report_count: usize,
    pub is_polymodal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub bars: Vec<ChartBar>,
    pub curve: Vec<ChartCurvePoint>,
    pub config: ChartConfig,
    pub outliers: Vec<Outlier>,
}

impl ChartData {
    pub fn from_result(result: &WbsiResult) -> ChartData {
        let bars: Vec<ChartBar> = result
            .distribution
            .histogram
            .iter()
            .map(|bin| ChartBar {
                severity: bin.midpoint(),
                count: bin.weight,
                band: SeverityBand::from_severity(bin.midpoint()),
            })
            .collect();

        let max_bar = result.distribution.max_bin_weight();
        let max_density = result.distribution.max_density();
        let scale = if max_density > 0.0 { max_bar / max_density } else { 0.0 };

        let curve = result
            .distribution
            .kde
            .iter()
            .map(|point| ChartCurvePoint {
                severity: point.severity,
                density: point.density,
                scaled_density: point.density * scale,
            })
            .collect();

        let delta = result.parameters.delta;
        let prefer_shrunk = result.report_count < PREFER_SHRUNK_BELOW;
        let pick = |raw: f64, shrunk: f64| if prefer_shrunk { shrunk } else { raw };

        let config = ChartConfig {
            peak_severity: result.modal_severity,
            consensus_range: (
                (result.modal_severity - delta).max(SEVERITY_MIN),
                (result.modal_severity + delta).min(SEVERITY_MAX),
            ),
            wbsi_mode: result.wbsi_mode,
            wbsi_mode_shrunk: result.wbsi_mode_shrunk,
            wbsi_consensus: result.wbsi_consensus,
            wbsi_consensus_shrunk: result.wbsi_consensus_shrunk,
            prefer_shrunk,
            display_wbsi_mode: pick(result.wbsi_mode, result.wbsi_mode_shrunk),
            display_wbsi_consensus: pick(result.wbsi_consensus, result.wbsi_consensus_shrunk),
            shrinkage_factor: result.shrinkage_factor,
            consensus_percent: result.consensus * 100.0,
            severity_bands: result.severity_bands,
            report_count: result.report_count,
            is_polymodal: result.polymodality.is_polymodal,
        };

        ChartData {
            bars,
            curve,
            config,
            outliers: result.outliers.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl From<&WbsiResult> for ChartData {
    fn from(result: &WbsiResult) -> Self {
        ChartData::from_result(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GridConfig, TuningParams};
    use crate::engine::compute_wbsi_at;
    use crate::model::{Report, VerificationStatus};
    use chrono::{TimeZone, Utc};

    fn result_for(severities: &[f64]) -> WbsiResult {
        let reports: Vec<Report> = severities
            .iter()
            .enumerate()
            .map(|(i, &s)| Report {
                id: format!("r-{}", i),
                severity_percentage: Some(s),
                status: VerificationStatus::Verified,
                ..Default::default()
            })
            .collect();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap();
        compute_wbsi_at(&reports, &TuningParams::default(), &GridConfig::default(), now)
    }

    #[test]
    fn test_bars_mirror_histogram() {
        let result = result_for(&[12.0, 13.0, 61.0]);
        let chart = ChartData::from_result(&result);
        assert_eq!(chart.bars.len(), 20);
        assert_eq!(chart.bars[2].severity, 12.5);
        assert_eq!(chart.bars[2].count, 1.0); // two reports at weight 0.5
        assert_eq!(chart.bars[2].band, SeverityBand::Low);
        assert_eq!(chart.bars[12].band, SeverityBand::High);
    }

    #[test]
    fn test_curve_peak_matches_tallest_bar() {
        let result = result_for(&[40.0, 42.0, 44.0, 70.0]);
        let chart = ChartData::from_result(&result);
        let max_scaled = chart.curve.iter().map(|p| p.scaled_density).fold(0.0, f64::max);
        let max_bar = chart.bars.iter().map(|b| b.count).fold(0.0, f64::max);
        assert!((max_scaled - max_bar).abs() < 1e-12);
        assert_eq!(chart.curve.len(), 500);
    }

    #[test]
    fn test_small_sample_prefers_shrunk_display() {
        let chart = ChartData::from_result(&result_for(&[30.0, 32.0]));
        assert!(chart.config.prefer_shrunk);
        assert_eq!(chart.config.display_wbsi_mode, chart.config.wbsi_mode_shrunk);
        assert!(chart.config.wbsi_mode > chart.config.display_wbsi_mode);
    }

    #[test]
    fn test_large_sample_displays_raw_scores() {
        let severities: Vec<f64> = (0..12).map(|i| 30.0 + i as f64).collect();
        let chart = ChartData::from_result(&result_for(&severities));
        assert!(!chart.config.prefer_shrunk);
        assert_eq!(chart.config.display_wbsi_consensus, chart.config.wbsi_consensus);
    }

    #[test]
    fn test_consensus_range_is_clipped_to_domain() {
        let chart = ChartData::from_result(&result_for(&[2.0, 3.0, 4.0]));
        let (lo, hi) = chart.config.consensus_range;
        assert_eq!(lo, 0.0);
        assert!((hi - (chart.config.peak_severity + 10.0)).abs() < 1e-12);
    }

    #[test]
    fn test_empty_result_projects_without_nan() {
        let chart = ChartData::from_result(&result_for(&[]));
        assert!(chart.curve.iter().all(|p| p.scaled_density == 0.0));
        assert_eq!(chart.config.consensus_percent, 0.0);
        assert_eq!(chart.config.consensus_range, (40.0, 60.0));
        let json = chart.to_json().expect("chart data should serialize");
        assert!(json.contains("\"is_polymodal\": false"));
    }
}
