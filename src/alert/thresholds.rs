//! Threshold classification of an aggregated severity picture.
//!
//! Maps consensus, sample size, band mix, distribution shape and a
//! goodness-of-fit test to four independent labels: consensus level,
//! concern level, confidence level and actionability. Every supporting
//! number is kept on the result so the display layer can show why a
//! verdict was reached.

use std::fmt;

use serde::Serialize;

use crate::analysis::bands::SeverityBands;
use crate::analysis::distribution::weighted_histogram;
use crate::analysis::stats::{
    bimodality_coefficient, chi_square_uniformity, weighted_moments, ChiSquareTest,
};

/// Minimum report count for an adequate sample.
pub const MIN_ADEQUATE_SAMPLE: usize = 8;

/// Consensus below this raises a confidence warning.
pub const LOW_CONSENSUS_WARNING: f64 = 0.5;

/// Consensus below this blocks any action.
pub const MIN_ACTIONABLE_CONSENSUS: f64 = 0.3;

/// Bimodality coefficient above this raises a confidence warning.
pub const BIMODALITY_WARNING: f64 = 0.55;

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConsensusLevel {
    #[serde(rename = "Strong")]
    Strong,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "Weak")]
    Weak,
    #[serde(rename = "No Consensus")]
    NoConsensus,
}

/// Concern levels, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ConcernLevel {
    #[serde(rename = "LOW PRIORITY")]
    LowPriority,
    #[serde(rename = "MINOR CONCERN")]
    Minor,
    #[serde(rename = "MODERATE CONCERN")]
    Moderate,
    #[serde(rename = "HIGH CONCERN")]
    High,
    #[serde(rename = "EMERGENCY")]
    Emergency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Actionability {
    #[serde(rename = "Immediate Action")]
    ImmediateAction,
    #[serde(rename = "Plan Intervention")]
    PlanIntervention,
    #[serde(rename = "Monitor")]
    Monitor,
    #[serde(rename = "Not Actionable")]
    NotActionable,
}

impl fmt::Display for ConsensusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsensusLevel::Strong => write!(f, "Strong"),
            ConsensusLevel::Moderate => write!(f, "Moderate"),
            ConsensusLevel::Weak => write!(f, "Weak"),
            ConsensusLevel::NoConsensus => write!(f, "No Consensus"),
        }
    }
}

impl fmt::Display for ConcernLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConcernLevel::LowPriority => write!(f, "LOW PRIORITY"),
            ConcernLevel::Minor => write!(f, "MINOR CONCERN"),
            ConcernLevel::Moderate => write!(f, "MODERATE CONCERN"),
            ConcernLevel::High => write!(f, "HIGH CONCERN"),
            ConcernLevel::Emergency => write!(f, "EMERGENCY"),
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::High => write!(f, "High"),
            ConfidenceLevel::Medium => write!(f, "Medium"),
            ConfidenceLevel::Low => write!(f, "Low"),
        }
    }
}

impl fmt::Display for Actionability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actionability::ImmediateAction => write!(f, "Immediate Action"),
            Actionability::PlanIntervention => write!(f, "Plan Intervention"),
            Actionability::Monitor => write!(f, "Monitor"),
            Actionability::NotActionable => write!(f, "Not Actionable"),
        }
    }
}

// ---------------------------------------------------------------------------
// Concern ladder
// ---------------------------------------------------------------------------

/// One rung of the concern ladder: both ratios must reach their minimum.
pub struct ConcernRule {
    pub level: ConcernLevel,
    /// Minimum share of weight in the critical band, 0-1.
    pub min_critical: f64,
    /// Minimum share of weight in the high + critical bands, 0-1.
    pub min_serious: f64,
}

/// Most severe rung first; the first satisfied rule wins.
pub static CONCERN_LADDER: &[ConcernRule] = &[
    ConcernRule {
        level: ConcernLevel::Emergency,
        min_critical: 0.8,
        min_serious: 0.9,
    },
    ConcernRule {
        level: ConcernLevel::High,
        min_critical: 0.5,
        min_serious: 0.7,
    },
    ConcernRule {
        level: ConcernLevel::Moderate,
        min_critical: 0.3,
        min_serious: 0.5,
    },
    ConcernRule {
        level: ConcernLevel::Minor,
        min_critical: 0.1,
        min_serious: 0.3,
    },
];

pub fn concern_level(critical_ratio: f64, serious_ratio: f64) -> ConcernLevel {
    CONCERN_LADDER
        .iter()
        .find(|rule| critical_ratio >= rule.min_critical && serious_ratio >= rule.min_serious)
        .map(|rule| rule.level)
        .unwrap_or(ConcernLevel::LowPriority)
}

pub fn consensus_level(consensus: f64) -> ConsensusLevel {
    if consensus >= 0.7 {
        ConsensusLevel::Strong
    } else if consensus >= 0.5 {
        ConsensusLevel::Moderate
    } else if consensus >= 0.3 {
        ConsensusLevel::Weak
    } else {
        ConsensusLevel::NoConsensus
    }
}

pub fn confidence_level(warning_count: usize) -> ConfidenceLevel {
    match warning_count {
        0 => ConfidenceLevel::High,
        1 | 2 => ConfidenceLevel::Medium,
        _ => ConfidenceLevel::Low,
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Everything the classifier looks at. Severities and weights are parallel.
#[derive(Debug, Clone, Copy)]
pub struct ClassifierInput<'a> {
    pub severities: &'a [f64],
    pub weights: &'a [f64],
    pub consensus: f64,
    pub report_count: usize,
    pub is_polymodal: bool,
    pub bands: &'a SeverityBands,
    /// Histogram resolution used for the goodness-of-fit test.
    pub histogram_bins: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdAnalysis {
    pub consensus_level: ConsensusLevel,
    pub sample_adequate: bool,
    pub critical_ratio: f64,
    pub serious_ratio: f64,
    pub concern_level: ConcernLevel,
    pub significance: ChiSquareTest,
    pub bimodality_coefficient: f64,
    pub warnings: Vec<String>,
    pub confidence_level: ConfidenceLevel,
    pub actionability: Actionability,
}

pub fn classify(input: &ClassifierInput<'_>) -> ThresholdAnalysis {
    let n = input.report_count;
    let sample_adequate = n >= MIN_ADEQUATE_SAMPLE;

    let critical_ratio = input.bands.critical / 100.0;
    let serious_ratio = (input.bands.critical + input.bands.high) / 100.0;
    let concern = concern_level(critical_ratio, serious_ratio);

    let histogram = weighted_histogram(input.severities, input.weights, input.histogram_bins);
    let significance = chi_square_uniformity(&histogram, n);

    let moments = weighted_moments(input.severities, input.weights);
    let bc = bimodality_coefficient(&moments, n);

    let mut warnings = Vec::new();
    if !sample_adequate {
        warnings.push(format!(
            "Insufficient sample size: {} report(s), need at least {}",
            n, MIN_ADEQUATE_SAMPLE
        ));
    }
    if input.consensus < LOW_CONSENSUS_WARNING {
        warnings.push(format!("Low consensus: {:.0}% agreement", input.consensus * 100.0));
    }
    if bc > BIMODALITY_WARNING || input.is_polymodal {
        warnings.push(format!(
            "Split opinion: bimodality coefficient {:.2}{}",
            bc,
            if input.is_polymodal { ", competing density peaks" } else { "" }
        ));
    }
    if !significance.significant {
        warnings.push(format!(
            "Not statistically significant: chi-square p = {:.3}",
            significance.p_value
        ));
    }

    let actionable = sample_adequate
        && input.consensus >= MIN_ACTIONABLE_CONSENSUS
        && concern != ConcernLevel::LowPriority
        && significance.significant;

    let actionability = if !actionable {
        Actionability::NotActionable
    } else {
        match concern {
            ConcernLevel::Emergency | ConcernLevel::High => Actionability::ImmediateAction,
            ConcernLevel::Moderate => Actionability::PlanIntervention,
            _ => Actionability::Monitor,
        }
    };

    ThresholdAnalysis {
        consensus_level: consensus_level(input.consensus),
        sample_adequate,
        critical_ratio,
        serious_ratio,
        concern_level: concern,
        significance,
        bimodality_coefficient: bc,
        confidence_level: confidence_level(warnings.len()),
        warnings,
        actionability,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::bands::severity_bands;

    fn classify_equal(severities: &[f64], consensus: f64, is_polymodal: bool) -> ThresholdAnalysis {
        let weights = vec![1.0; severities.len()];
        let bands = severity_bands(severities, &weights);
        classify(&ClassifierInput {
            severities,
            weights: &weights,
            consensus,
            report_count: severities.len(),
            is_polymodal,
            bands: &bands,
            histogram_bins: 20,
        })
    }

    // --- Ladders ------------------------------------------------------------

    #[test]
    fn test_consensus_level_thresholds() {
        assert_eq!(consensus_level(0.95), ConsensusLevel::Strong);
        assert_eq!(consensus_level(0.7), ConsensusLevel::Strong);
        assert_eq!(consensus_level(0.69), ConsensusLevel::Moderate);
        assert_eq!(consensus_level(0.5), ConsensusLevel::Moderate);
        assert_eq!(consensus_level(0.3), ConsensusLevel::Weak);
        assert_eq!(consensus_level(0.29), ConsensusLevel::NoConsensus);
    }

    #[test]
    fn test_concern_ladder_most_severe_first() {
        assert_eq!(concern_level(1.0, 1.0), ConcernLevel::Emergency);
        assert_eq!(concern_level(0.8, 0.9), ConcernLevel::Emergency);
        assert_eq!(concern_level(0.8, 0.85), ConcernLevel::High);
        assert_eq!(concern_level(0.5, 0.7), ConcernLevel::High);
        assert_eq!(concern_level(0.3, 0.5), ConcernLevel::Moderate);
        assert_eq!(concern_level(0.1, 0.3), ConcernLevel::Minor);
        assert_eq!(concern_level(0.05, 1.0), ConcernLevel::LowPriority);
        assert_eq!(concern_level(0.0, 0.0), ConcernLevel::LowPriority);
    }

    #[test]
    fn test_concern_ladder_is_ordered_by_strictness() {
        for pair in CONCERN_LADDER.windows(2) {
            assert!(pair[0].level > pair[1].level);
            assert!(pair[0].min_critical > pair[1].min_critical);
            assert!(pair[0].min_serious > pair[1].min_serious);
        }
    }

    #[test]
    fn test_confidence_level_by_warning_count() {
        assert_eq!(confidence_level(0), ConfidenceLevel::High);
        assert_eq!(confidence_level(1), ConfidenceLevel::Medium);
        assert_eq!(confidence_level(2), ConfidenceLevel::Medium);
        assert_eq!(confidence_level(3), ConfidenceLevel::Low);
        assert_eq!(confidence_level(4), ConfidenceLevel::Low);
    }

    #[test]
    fn test_labels_display_as_human_strings() {
        assert_eq!(ConcernLevel::High.to_string(), "HIGH CONCERN");
        assert_eq!(ConsensusLevel::NoConsensus.to_string(), "No Consensus");
        assert_eq!(
            serde_json::to_string(&ConsensusLevel::NoConsensus).unwrap(),
            "\"No Consensus\""
        );
        assert_eq!(Actionability::PlanIntervention.to_string(), "Plan Intervention");
        assert_eq!(
            serde_json::to_string(&Actionability::NotActionable).unwrap(),
            "\"Not Actionable\""
        );
    }

    // --- Full classification -----------------------------------------------

    #[test]
    fn test_tight_critical_cluster_is_immediate_action() {
        let severities = [80.0, 82.0, 85.0, 86.0, 88.0, 89.0, 90.0, 91.0, 93.0, 95.0];
        let analysis = classify_equal(&severities, 1.0, false);
        assert!(analysis.sample_adequate);
        assert_eq!(analysis.concern_level, ConcernLevel::Emergency);
        assert!(analysis.significance.significant);
        assert_eq!(analysis.actionability, Actionability::ImmediateAction);
        assert_eq!(analysis.confidence_level, ConfidenceLevel::High);
        assert!(analysis.warnings.is_empty(), "got {:?}", analysis.warnings);
    }

    #[test]
    fn test_moderate_concern_plans_intervention() {
        // 4 critical, 2 high, 4 low: critical 0.4, serious 0.6.
        let severities = [80.0, 82.0, 84.0, 86.0, 60.0, 62.0, 10.0, 12.0, 14.0, 16.0];
        let analysis = classify_equal(&severities, 0.4, false);
        assert_eq!(analysis.concern_level, ConcernLevel::Moderate);
        assert!(analysis.significance.significant);
        assert_eq!(analysis.actionability, Actionability::PlanIntervention);
    }

    #[test]
    fn test_small_sample_is_never_actionable() {
        let analysis = classify_equal(&[80.0, 85.0, 88.0, 90.0, 95.0], 1.0, false);
        assert!(!analysis.sample_adequate);
        assert_eq!(analysis.concern_level, ConcernLevel::Emergency);
        assert_eq!(analysis.actionability, Actionability::NotActionable);
        assert!(analysis.warnings[0].contains("Insufficient sample size"));
    }

    #[test]
    fn test_low_consensus_blocks_action() {
        let severities = [80.0, 82.0, 85.0, 86.0, 88.0, 89.0, 90.0, 91.0, 93.0, 95.0];
        let analysis = classify_equal(&severities, 0.2, false);
        assert_eq!(analysis.consensus_level, ConsensusLevel::NoConsensus);
        assert_eq!(analysis.actionability, Actionability::NotActionable);
        assert_eq!(analysis.confidence_level, ConfidenceLevel::Medium);
    }

    #[test]
    fn test_polymodal_flag_raises_split_opinion_warning() {
        let severities = [80.0, 82.0, 85.0, 86.0, 88.0, 89.0, 90.0, 91.0, 93.0, 95.0];
        let analysis = classify_equal(&severities, 1.0, true);
        assert!(analysis.warnings.iter().any(|w| w.contains("Split opinion")));
        assert_eq!(analysis.confidence_level, ConfidenceLevel::Medium);
    }

    #[test]
    fn test_empty_input_is_low_priority_low_confidence() {
        let analysis = classify_equal(&[], 0.0, false);
        assert_eq!(analysis.concern_level, ConcernLevel::LowPriority);
        assert_eq!(analysis.consensus_level, ConsensusLevel::NoConsensus);
        assert_eq!(analysis.confidence_level, ConfidenceLevel::Low);
        assert_eq!(analysis.actionability, Actionability::NotActionable);
        assert_eq!(analysis.bimodality_coefficient, 0.0);
    }
}
