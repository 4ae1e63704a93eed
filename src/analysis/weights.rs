/// Per-report trust weights.
///
/// Four independent factors multiply together: model confidence,
/// submitter uniqueness, recency and image quality. The product is floored
/// at `MIN_WEIGHT` so no verified report disappears from the density.
///
/// # Clock injection
/// Recency depends on "now". Every function that needs it takes a
/// `now: DateTime<Utc>` parameter rather than calling `Utc::now()`
/// internally, which keeps the engine bit-for-bit reproducible in tests.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::logging::{self, Stage};
use crate::model::Report;

/// Weight floor applied after the factors are multiplied.
pub const MIN_WEIGHT: f64 = 0.01;

/// Recency decay rate, per day.
pub const RECENCY_DECAY_PER_DAY: f64 = 0.01;

const DEFAULT_CONFIDENCE: f64 = 50.0;

/// The individual factors behind one report's weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightFactors {
    pub confidence: f64,
    pub uniqueness: f64,
    pub recency: f64,
    pub quality: f64,
}

impl WeightFactors {
    /// Product of the factors, floored at `MIN_WEIGHT`.
    pub fn weight(&self) -> f64 {
        (self.confidence * self.uniqueness * self.recency * self.quality).max(MIN_WEIGHT)
    }

    /// True when the raw product fell below the floor.
    pub fn floored(&self) -> bool {
        self.confidence * self.uniqueness * self.recency * self.quality < MIN_WEIGHT
    }
}

// ---------------------------------------------------------------------------
// Factors
// ---------------------------------------------------------------------------

pub fn weight_factors_at(report: &Report, now: DateTime<Utc>) -> WeightFactors {
    WeightFactors {
        confidence: confidence_factor(report.ai_confidence),
        uniqueness: uniqueness_factor(report.submitter_locality_reports),
        recency: recency_factor_at(&report.submitted_at, now),
        quality: quality_factor(report.quality_score),
    }
}

/// Trust weight of one report, in [`MIN_WEIGHT`, 1].
pub fn report_weight_at(report: &Report, now: DateTime<Utc>) -> f64 {
    weight_factors_at(report, now).weight()
}

/// Convenience wrapper that uses the real current time.
/// Use `report_weight_at` in tests to keep them deterministic.
pub fn report_weight(report: &Report) -> f64 {
    report_weight_at(report, Utc::now())
}

/// AI confidence / 100, clamped to [0, 1]. Absent means 50.
pub fn confidence_factor(ai_confidence: Option<f64>) -> f64 {
    let confidence = ai_confidence
        .filter(|c| c.is_finite())
        .unwrap_or(DEFAULT_CONFIDENCE);
    (confidence / 100.0).clamp(0.0, 1.0)
}

/// `min(1, 1 / n)` for n reports by the same submitter in this locality.
/// Absent or zero counts as a single report.
pub fn uniqueness_factor(submitter_reports: Option<u32>) -> f64 {
    let count = submitter_reports.unwrap_or(1).max(1);
    (1.0 / count as f64).min(1.0)
}

/// `exp(-λ·Δdays)` with Δdays the whole days elapsed since submission.
/// Future timestamps count as zero days; unparseable ones get full weight.
pub fn recency_factor_at(submitted_at: &str, now: DateTime<Utc>) -> f64 {
    match age_days_at(submitted_at, now) {
        Ok(days) => (-RECENCY_DECAY_PER_DAY * days as f64).exp(),
        Err(e) => {
            logging::debug(Stage::Weight, None, &format!("{}; using full recency", e));
            1.0
        }
    }
}

/// Quality score clamped to [0, 1]. Absent means 1.
pub fn quality_factor(quality_score: Option<f64>) -> f64 {
    quality_score
        .filter(|q| q.is_finite())
        .unwrap_or(1.0)
        .clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Timestamp handling
// ---------------------------------------------------------------------------

/// Whole days between `submitted_at` and `now`, never negative.
///
/// Returns an error if the timestamp cannot be parsed. Callers treat parse
/// failures as "fresh" (full recency weight).
pub fn age_days_at(submitted_at: &str, now: DateTime<Utc>) -> Result<u64, String> {
    let submitted = parse_timestamp(submitted_at)?;
    let days = (now - submitted).num_days();
    Ok(days.max(0) as u64)
}

/// Accepts RFC 3339, naive `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS`
/// (read as UTC) and bare dates.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("empty timestamp".to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
        .ok_or_else(|| format!("unrecognized timestamp '{}'", raw))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
