/// Verdicts derived from the aggregated severity picture.
///
/// Submodules:
/// - `thresholds` - consensus/concern/confidence ladders and actionability.

pub mod thresholds;
