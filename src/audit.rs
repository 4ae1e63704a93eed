//! Per-report audit trail
//!
//! Explains how each report entered the aggregation: where its severity
//! came from and which factors shaped its weight. Lets the reporting layer
//! answer "why did this report count for so little?" without re-deriving
//! anything.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::severity::{resolve_severity, SeveritySource};
use crate::analysis::weights::{weight_factors_at, WeightFactors};
use crate::model::{Report, VerificationStatus};

// ============================================================================
// Audit Results
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportContribution {
    pub id: String,
    pub severity: f64,
    pub severity_source: SeveritySource,
    pub weight: f64,
    pub factors: WeightFactors,
    /// The raw factor product fell below the weight floor.
    pub weight_floored: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditSummary {
    pub total: usize,
    pub verified: usize,
    pub skipped_unverified: usize,
    pub from_explicit: usize,
    pub from_pixel_ratio: usize,
    pub from_label: usize,
    pub from_default: usize,
    pub weight_floored: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    pub timestamp: String,
    pub contributions: Vec<ReportContribution>,
    pub summary: AuditSummary,
}

// ============================================================================
// Audit
// ============================================================================

pub fn contribution_at(report: &Report, now: DateTime<Utc>) -> ReportContribution {
    let (severity, severity_source) = resolve_severity(report);
    let factors = weight_factors_at(report, now);
    ReportContribution {
        id: report.id.clone(),
        severity,
        severity_source,
        weight: factors.weight(),
        factors,
        weight_floored: factors.floored(),
    }
}

/// Audits the verified reports in `reports`; unverified ones are only counted.
pub fn audit_reports_at(reports: &[Report], now: DateTime<Utc>) -> AuditReport {
    let mut summary = AuditSummary {
        total: reports.len(),
        ..Default::default()
    };

    let contributions: Vec<ReportContribution> = reports
        .iter()
        .filter(|r| r.status == VerificationStatus::Verified)
        .map(|r| contribution_at(r, now))
        .collect();

    summary.verified = contributions.len();
    summary.skipped_unverified = summary.total - summary.verified;
    for c in &contributions {
        match c.severity_source {
            SeveritySource::Explicit => summary.from_explicit += 1,
            SeveritySource::PixelRatio => summary.from_pixel_ratio += 1,
            SeveritySource::Label => summary.from_label += 1,
            SeveritySource::Default => summary.from_default += 1,
        }
        if c.weight_floored {
            summary.weight_floored += 1;
        }
    }

    AuditReport {
        timestamp: now.to_rfc3339(),
        contributions,
        summary,
    }
}

pub fn audit_reports(reports: &[Report]) -> AuditReport {
    audit_reports_at(reports, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()
    }

    fn verified(id: &str) -> Report {
        Report {
            id: id.to_string(),
            status: VerificationStatus::Verified,
            ..Default::default()
        }
    }

    #[test]
    fn test_summary_counts_each_severity_source() {
        let reports = vec![
            Report { severity_percentage: Some(30.0), ..verified("a") },
            Report { polluted_pixels: Some(1.0), water_pixels: Some(4.0), ..verified("b") },
            Report { user_severity_label: Some("critical".to_string()), ..verified("c") },
            verified("d"),
            Report { status: VerificationStatus::Rejected, ..verified("e") },
        ];
        let audit = audit_reports_at(&reports, fixed_now());
        assert_eq!(audit.summary.total, 5);
        assert_eq!(audit.summary.verified, 4);
        assert_eq!(audit.summary.skipped_unverified, 1);
        assert_eq!(audit.summary.from_explicit, 1);
        assert_eq!(audit.summary.from_pixel_ratio, 1);
        assert_eq!(audit.summary.from_label, 1);
        assert_eq!(audit.summary.from_default, 1);
        assert_eq!(audit.contributions[1].severity, 25.0);
    }

    #[test]
    fn test_floored_weights_are_reported() {
        let reports = vec![Report { ai_confidence: Some(0.5), ..verified("a") }];
        let audit = audit_reports_at(&reports, fixed_now());
        let c = &audit.contributions[0];
        assert!(c.weight_floored);
        assert_eq!(c.weight, 0.01);
        assert_eq!(c.factors.confidence, 0.005);
        assert_eq!(audit.summary.weight_floored, 1);
    }

    #[test]
    fn test_audit_serializes_with_timestamp() {
        let audit = audit_reports_at(&[verified("a")], fixed_now());
        assert_eq!(audit.timestamp, "2024-05-01T13:00:00+00:00");
        let json = serde_json::to_string(&audit).expect("audit should serialize");
        assert!(json.contains("\"severity_source\":\"Default\""));
    }
}
