//! Detection of competing peaks in the severity density.
//!
//! A distribution is polymodal when its two strongest local maxima are
//! comparably high and well separated. One wide peak never qualifies.
//!
//! Peaks are strict local maxima, extended so that a flat top strictly
//! above both of its neighbours counts as a single peak.

use serde::Serialize;

use crate::analysis::distribution::KdePoint;

/// Second peak must reach this share of the first.
pub const PEAK_RATIO_THRESHOLD: f64 = 0.8;

/// Peaks must be further apart than this, in severity units.
pub const PEAK_SEPARATION_THRESHOLD: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Peak {
    pub severity: f64,
    pub density: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polymodality {
    pub is_polymodal: bool,
    /// Local maxima (flat tops counted once), strongest first.
    pub peaks: Vec<Peak>,
    /// Second peak density over first, when at least two peaks exist.
    pub peak_ratio: Option<f64>,
    /// Distance between the two strongest peaks.
    pub separation: Option<f64>,
}

/// Interior grid points strictly greater than both neighbours.
///
/// A flat top of equal densities counts as one peak, reported at its first
/// point, when it is strictly higher than the points on either side of it.
/// Without this a maximum falling exactly between two grid points could
/// vanish.
pub fn local_maxima(kde: &[KdePoint]) -> Vec<Peak> {
    let mut peaks = Vec::new();
    let mut i = 1;
    while i + 1 < kde.len() {
        if kde[i].density <= kde[i - 1].density {
            i += 1;
            continue;
        }

        let mut end = i;
        while end + 1 < kde.len() && kde[end + 1].density == kde[i].density {
            end += 1;
        }
        if end + 1 < kde.len() && kde[end + 1].density < kde[i].density {
            peaks.push(Peak {
                severity: kde[i].severity,
                density: kde[i].density,
            });
        }
        i = end + 1;
    }
    peaks
}

pub fn detect_polymodality(kde: &[KdePoint]) -> Polymodality {
    let mut peaks = local_maxima(kde);
    peaks.sort_by(|a, b| b.density.total_cmp(&a.density));

    let (first, second) = match (peaks.first(), peaks.get(1)) {
        (Some(first), Some(second)) => (*first, *second),
        _ => {
            return Polymodality {
                is_polymodal: false,
                peaks,
                peak_ratio: None,
                separation: None,
            };
        }
    };

    let peak_ratio = if first.density > 0.0 {
        second.density / first.density
    } else {
        0.0
    };
    let separation = (first.severity - second.severity).abs();

    Polymodality {
        is_polymodal: peak_ratio >= PEAK_RATIO_THRESHOLD && separation > PEAK_SEPARATION_THRESHOLD,
        peaks,
        peak_ratio: Some(peak_ratio),
        separation: Some(separation),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
