//! Per-report severity extraction.
//!
//! Resolves one report to a single severity in [0, 100]. The first
//! applicable source wins:
//!   1. explicit severity percentage, clamped
//!   2. polluted / water pixel ratio, clamped (0 when water pixels ≤ 0)
//!   3. categorical label, AI label before user label, mapped to band midpoints
//!   4. 50.0
//!
//! Absent or non-finite numbers are "not applicable" and fall through.

use serde::Serialize;

use crate::analysis::bands::SeverityBand;
use crate::logging::{self, Stage};
use crate::model::Report;

/// Severity used when a report carries nothing usable.
pub const DEFAULT_SEVERITY: f64 = 50.0;

/// Which field a report's severity was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeveritySource {
    Explicit,
    PixelRatio,
    Label,
    Default,
}

/// Returns the report's severity in [0, 100].
pub fn extract_severity(report: &Report) -> f64 {
    resolve_severity(report).0
}

/// Returns the severity together with the source it was resolved from.
pub fn resolve_severity(report: &Report) -> (f64, SeveritySource) {
    if let Some(pct) = finite(report.severity_percentage) {
        return (clamp_severity(pct), SeveritySource::Explicit);
    }

    if let Some(ratio) = pixel_severity(report.polluted_pixels, report.water_pixels) {
        return (ratio, SeveritySource::PixelRatio);
    }

    let label_severity = [&report.ai_severity_label, &report.user_severity_label]
        .into_iter()
        .flatten()
        .find_map(|label| label_midpoint(label));
    if let Some(midpoint) = label_severity {
        return (midpoint, SeveritySource::Label);
    }

    logging::debug(
        Stage::Extract,
        None,
        &format!("Report {} has no usable severity, using {}", report.id, DEFAULT_SEVERITY),
    );
    (DEFAULT_SEVERITY, SeveritySource::Default)
}

/// `100 * polluted / water`, clamped. Needs both counts; zero water area
/// is an explicit 0 rather than a division error.
fn pixel_severity(polluted: Option<f64>, water: Option<f64>) -> Option<f64> {
    let polluted = finite(polluted)?;
    let water = finite(water)?;
    if water <= 0.0 {
        return Some(0.0);
    }
    Some(clamp_severity(100.0 * polluted / water))
}

/// Case-insensitive substring match against the band names, most severe
/// first so "high-critical" resolves to critical.
pub fn label_midpoint(label: &str) -> Option<f64> {
    let lowered = label.to_lowercase();
    [
        SeverityBand::Critical,
        SeverityBand::High,
        SeverityBand::Medium,
        SeverityBand::Low,
    ]
    .into_iter()
    .find(|band| lowered.contains(band.name()))
    .map(SeverityBand::midpoint)
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn clamp_severity(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
