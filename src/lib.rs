//! WaterBase Severity Index (WBSI) engine.
//!
//! Reduces a noisy, crowd-sourced set of pollution reports for one water
//! body to a severity score, a weighted distribution, a consensus measure,
//! outlier flags and an actionability verdict.
//!
//! ```no_run
//! use wbsi_engine::chart::ChartData;
//! use wbsi_engine::config::EngineConfig;
//! use wbsi_engine::engine::analyze_location;
//! use wbsi_engine::ingest::reports::parse_reports;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::from_env()?;
//! let reports = parse_reports(r#"[{"id": "a", "severity_percentage": 72, "verification_status": "verified"}]"#)?;
//! let result = analyze_location("lake-7", &reports, &config);
//! println!("{}", ChartData::from_result(&result).to_json()?);
//! # Ok(())
//! # }
//! ```

pub mod alert;
pub mod analysis;
pub mod audit;
pub mod chart;
pub mod config;
pub mod engine;
pub mod ingest;
pub mod logging;
pub mod model;
