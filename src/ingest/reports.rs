/// Report payload ingestion
///
/// Turns the JSON report list handed over by the surrounding application
/// into `Report` values. Field names are accepted in snake_case or
/// camelCase. Numeric fields may arrive as JSON numbers or numeric strings;
/// anything else (null, "n/a", NaN) becomes `None` so the severity and
/// weight fall-through chains apply instead of failing the whole batch.
///
/// Only a document that is not an array of objects, or a report without an
/// identifier, is an error.

use serde::Deserialize;
use serde_json::Value;

use crate::logging::{self, Stage};
use crate::model::{IngestError, Report, VerificationStatus};

// ============================================================================
// Wire Structures
// ============================================================================

/// One report as it appears on the wire, before normalization.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawReport {
    pub id: Option<Value>,
    #[serde(alias = "severityPercentage")]
    pub severity_percentage: Option<Value>,
    #[serde(alias = "pollutedPixels")]
    pub polluted_pixels: Option<Value>,
    #[serde(alias = "waterPixels")]
    pub water_pixels: Option<Value>,
    #[serde(alias = "aiSeverityLabel")]
    pub ai_severity_label: Option<Value>,
    #[serde(alias = "userSeverityLabel")]
    pub user_severity_label: Option<Value>,
    #[serde(alias = "verificationStatus")]
    pub verification_status: Option<Value>,
    #[serde(alias = "aiConfidence")]
    pub ai_confidence: Option<Value>,
    #[serde(alias = "submitterLocalityReports")]
    pub submitter_locality_reports: Option<Value>,
    #[serde(alias = "submittedAt")]
    pub submitted_at: Option<Value>,
    #[serde(alias = "qualityScore")]
    pub quality_score: Option<Value>,
}

// ============================================================================
// Parsing
// ============================================================================

/// Parses a JSON array of reports.
pub fn parse_reports(json: &str) -> Result<Vec<Report>, IngestError> {
    let raw: Vec<RawReport> =
        serde_json::from_str(json).map_err(|e| IngestError::Parse(e.to_string()))?;

    let reports = raw
        .into_iter()
        .enumerate()
        .map(|(index, raw)| normalize_report(index, raw))
        .collect::<Result<Vec<_>, _>>()?;

    logging::debug(
        Stage::Ingest,
        None,
        &format!("Parsed {} report(s) from payload", reports.len()),
    );
    Ok(reports)
}

/// Converts one wire report into the model type.
pub fn normalize_report(index: usize, raw: RawReport) -> Result<Report, IngestError> {
    let id = raw
        .id
        .as_ref()
        .and_then(identifier)
        .ok_or(IngestError::MissingField { index, field: "id" })?;

    Ok(Report {
        severity_percentage: numeric(&raw.severity_percentage),
        polluted_pixels: numeric(&raw.polluted_pixels),
        water_pixels: numeric(&raw.water_pixels),
        ai_severity_label: text(&raw.ai_severity_label),
        user_severity_label: text(&raw.user_severity_label),
        status: status(&raw.verification_status),
        ai_confidence: numeric(&raw.ai_confidence),
        submitter_locality_reports: count(&raw.submitter_locality_reports),
        submitted_at: text(&raw.submitted_at).unwrap_or_default(),
        quality_score: numeric(&raw.quality_score),
        id,
    })
}

/// Keeps only reports whose verification status is "verified".
pub fn verified_only(reports: &[Report]) -> Vec<Report> {
    reports
        .iter()
        .filter(|r| r.status == VerificationStatus::Verified)
        .cloned()
        .collect()
}

// ============================================================================
// Field Helpers
// ============================================================================

fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// JSON number or numeric string, finite only.
fn numeric(value: &Option<Value>) -> Option<f64> {
    let parsed = match value.as_ref()? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn count(value: &Option<Value>) -> Option<u32> {
    numeric(value)
        .filter(|v| *v >= 0.0 && *v <= u32::MAX as f64)
        .map(|v| v.round() as u32)
}

fn text(value: &Option<Value>) -> Option<String> {
    match value.as_ref()? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn status(value: &Option<Value>) -> VerificationStatus {
    match text(value).map(|s| s.to_ascii_lowercase()).as_deref() {
        Some("verified") => VerificationStatus::Verified,
        Some("rejected") => VerificationStatus::Rejected,
        _ => VerificationStatus::Pending,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_snake_and_camel_case_fields() {
        let json = r#"[
            {"id": "a", "severity_percentage": 40, "verification_status": "verified"},
            {"id": "b", "severityPercentage": 60, "verificationStatus": "Verified",
             "aiConfidence": 90, "submitterLocalityReports": 3, "qualityScore": 0.8,
             "submittedAt": "2024-05-01T12:00:00Z"}
        ]"#;
        let reports = parse_reports(json).expect("valid payload should parse");
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].severity_percentage, Some(40.0));
        assert_eq!(reports[1].severity_percentage, Some(60.0));
        assert_eq!(reports[1].status, VerificationStatus::Verified);
        assert_eq!(reports[1].ai_confidence, Some(90.0));
        assert_eq!(reports[1].submitter_locality_reports, Some(3));
        assert_eq!(reports[1].quality_score, Some(0.8));
        assert_eq!(reports[1].submitted_at, "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let json = r#"[{"id": 7, "polluted_pixels": "120", "water_pixels": " 480 "}]"#;
        let reports = parse_reports(json).unwrap();
        assert_eq!(reports[0].id, "7");
        assert_eq!(reports[0].polluted_pixels, Some(120.0));
        assert_eq!(reports[0].water_pixels, Some(480.0));
    }

    #[test]
    fn test_malformed_numbers_become_none() {
        let json = r#"[{"id": "a", "severity_percentage": "n/a", "ai_confidence": null,
                        "quality_score": {"value": 1}, "submitter_locality_reports": -2}]"#;
        let report = &parse_reports(json).unwrap()[0];
        assert_eq!(report.severity_percentage, None);
        assert_eq!(report.ai_confidence, None);
        assert_eq!(report.quality_score, None);
        assert_eq!(report.submitter_locality_reports, None);
    }

    #[test]
    fn test_unknown_status_is_pending() {
        let json = r#"[{"id": "a", "verification_status": "under review"}, {"id": "b"}]"#;
        let reports = parse_reports(json).unwrap();
        assert!(reports.iter().all(|r| r.status == VerificationStatus::Pending));
    }

    #[test]
    fn test_missing_id_is_an_error() {
        let json = r#"[{"id": "a"}, {"severity_percentage": 10}]"#;
        assert_eq!(
            parse_reports(json),
            Err(IngestError::MissingField { index: 1, field: "id" })
        );
    }

    #[test]
    fn test_non_array_document_is_a_parse_error() {
        assert!(matches!(parse_reports(r#"{"id": "a"}"#), Err(IngestError::Parse(_))));
        assert!(matches!(parse_reports("not json"), Err(IngestError::Parse(_))));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let json = r#"[{"id": "a", "latitude": 40.7, "photo_url": "x.jpg"}]"#;
        assert_eq!(parse_reports(json).unwrap().len(), 1);
    }

    #[test]
    fn test_verified_only_filters_by_status() {
        let json = r#"[
            {"id": "a", "verification_status": "verified"},
            {"id": "b", "verification_status": "rejected"},
            {"id": "c", "verification_status": "pending"}
        ]"#;
        let verified = verified_only(&parse_reports(json).unwrap());
        assert_eq!(verified.len(), 1);
        assert_eq!(verified[0].id, "a");
    }
}
