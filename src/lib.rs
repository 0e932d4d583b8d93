//! Trust Calibration - Trial metrics for human-agent navigation studies
//!
//! Turns per-corner decision logs from a maze navigation task into
//! per-participant trust and compliance metrics through a deterministic
//! pipeline: record adaptation → metric derivation → condition analysis
//! → report encoding.
//!
//! ## Modules
//!
//! - **Derivation**: phase latencies, compliance rate, initial trust and
//!   overcompliance against a configurable [`layout::MazeLayout`]
//! - **Analysis**: per-condition descriptives, t-tests, chi-square and
//!   correlations over derived metrics

pub mod analysis;
pub mod config;
pub mod encoder;
pub mod error;
pub mod features;
pub mod layout;
pub mod pipeline;
pub mod schema;
pub mod stats;
pub mod types;

pub use analysis::{Measure, Metric};
pub use config::{Factor, StudyConfig};
pub use error::ComputeError;
pub use features::TrialMetricsDeriver;
pub use layout::MazeLayout;
pub use pipeline::{derive_metrics, StudyProcessor};

// Schema exports
pub use schema::{InputFormat, RawRow, RecordAdapter, SCHEMA_VERSION};

/// Crate version embedded in all reports
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "trust-calibration";
