/// Conversion of external payloads into model types.
///
/// Submodules:
/// - `reports` - JSON report lists from the surrounding application.

pub mod reports;
