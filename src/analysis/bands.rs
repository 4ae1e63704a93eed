//! Severity bands: the four named ranges partitioning [0, 100].
//!
//! Band bounds are lower-inclusive; critical also includes 100.

use serde::Serialize;

/// The four named severity ranges, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityBand {
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityBand {
    pub const ALL: [SeverityBand; 4] = [
        SeverityBand::Low,
        SeverityBand::Medium,
        SeverityBand::High,
        SeverityBand::Critical,
    ];

    pub fn from_severity(severity: f64) -> SeverityBand {
        if severity < 25.0 {
            SeverityBand::Low
        } else if severity < 50.0 {
            SeverityBand::Medium
        } else if severity < 75.0 {
            SeverityBand::High
        } else {
            SeverityBand::Critical
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SeverityBand::Low => "low",
            SeverityBand::Medium => "medium",
            SeverityBand::High => "high",
            SeverityBand::Critical => "critical",
        }
    }

    /// Lower and upper bound of the band.
    pub fn range(self) -> (f64, f64) {
        match self {
            SeverityBand::Low => (0.0, 25.0),
            SeverityBand::Medium => (25.0, 50.0),
            SeverityBand::High => (50.0, 75.0),
            SeverityBand::Critical => (75.0, 100.0),
        }
    }

    pub fn midpoint(self) -> f64 {
        let (lo, hi) = self.range();
        (lo + hi) / 2.0
    }
}

/// Weighted share of reports per band, as percentages.
///
/// Sums to 100 when any weight is present, all zero otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SeverityBands {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl SeverityBands {
    pub fn get(&self, band: SeverityBand) -> f64 {
        match band {
            SeverityBand::Low => self.low,
            SeverityBand::Medium => self.medium,
            SeverityBand::High => self.high,
            SeverityBand::Critical => self.critical,
        }
    }

    pub fn total(&self) -> f64 {
        self.low + self.medium + self.high + self.critical
    }
}

/// Buckets each report's weight by its severity band and normalizes to
/// percentages of the total weight.
pub fn severity_bands(severities: &[f64], weights: &[f64]) -> SeverityBands {
    let mut totals = [0.0_f64; 4];
    for (&severity, &weight) in severities.iter().zip(weights) {
        totals[SeverityBand::from_severity(severity) as usize] += weight;
    }

    let total_weight: f64 = totals.iter().sum();
    if total_weight <= 0.0 {
        return SeverityBands::default();
    }

    let pct = |w: f64| 100.0 * w / total_weight;
    SeverityBands {
        low: pct(totals[0]),
        medium: pct(totals[1]),
        high: pct(totals[2]),
        critical: pct(totals[3]),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
