/// Severity aggregation stages for one location's reports.
///
/// Each submodule is one pipeline stage; `engine` wires them together in
/// order. Every stage is a pure function of its inputs.
///
/// Submodules:
/// - `severity`     - normalizes each report to a severity in [0, 100].
/// - `weights`      - per-report trust weight with injected clock.
/// - `distribution` - weighted histogram and Gaussian KDE.
/// - `consensus`    - modal severity, consensus, WBSI composition, shrinkage.
/// - `bands`        - low/medium/high/critical weighted percentages.
/// - `polymodality` - competing peaks in the KDE.
/// - `outliers`     - reports beyond 2σ of the weighted mean.
/// - `stats`        - weighted moments, bimodality coefficient, chi-square.

pub mod bands;
pub mod consensus;
pub mod distribution;
pub mod outliers;
pub mod polymodality;
pub mod severity;
pub mod stats;
pub mod weights;
