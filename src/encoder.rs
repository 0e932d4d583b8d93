//! Metrics report encoding
//!
//! This module encodes annotated records into a flat CSV table or a JSON
//! report carrying producer metadata and the study layout summary.

use crate::config::StudyConfig;
use crate::error::ComputeError;
use crate::types::{AnnotatedRecord, MetricsReport, ReportProducer, ReportRecord};
use crate::{PRODUCER_NAME, VERSION};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Column order of the CSV output
pub const CSV_COLUMNS: [&str; 14] = [
    "participant_id",
    "condition",
    "phase1_mean_latency",
    "phase2_mean_latency",
    "latency_change",
    "error_corner_mean_latency",
    "overall_mean_latency",
    "compliance_rate",
    "initial_trust",
    "overcompliance_count",
    "undercompliance_count",
    "trust_difference",
    "total_responses",
    "followed_count",
];

/// Encoder for metrics tables and reports
pub struct MetricsEncoder {
    instance_id: String,
}

impl Default for MetricsEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Build a JSON report for a batch of records
    pub fn encode(&self, records: &[AnnotatedRecord], config: &StudyConfig) -> MetricsReport {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let rows: Vec<ReportRecord> = records
            .iter()
            .map(|r| ReportRecord {
                participant_id: r.participant_id().to_string(),
                condition: r.condition().to_string(),
                metrics: r.metrics.clone(),
                covariates: r.record.covariates.clone(),
            })
            .collect();

        MetricsReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            computed_at_utc: Utc::now().to_rfc3339(),
            study: config.name.clone(),
            error_corners: config.layout.error_corners(),
            participant_count: rows.len(),
            records: rows,
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(
        &self,
        records: &[AnnotatedRecord],
        config: &StudyConfig,
    ) -> Result<String, ComputeError> {
        let report = self.encode(records, config);
        serde_json::to_string_pretty(&report).map_err(ComputeError::JsonError)
    }

    /// Encode records as CSV with a header row
    pub fn encode_csv(&self, records: &[AnnotatedRecord]) -> String {
        let mut out = CSV_COLUMNS.join(",");
        out.push('\n');

        for record in records {
            let m = &record.metrics;
            let fields = [
                csv_field(record.participant_id()),
                csv_field(record.condition()),
                opt_number(m.phase1_mean_latency),
                opt_number(m.phase2_mean_latency),
                opt_number(m.latency_change),
                opt_number(m.error_corner_mean_latency),
                opt_number(m.overall_mean_latency),
                opt_number(m.compliance_rate),
                opt_number(m.initial_trust.map(u8::from)),
                opt_number(m.overcompliance_count),
                opt_number(m.undercompliance_count),
                opt_number(m.trust_difference),
                opt_number(m.total_responses),
                opt_number(m.followed_count),
            ];
            out.push_str(&fields.join(","));
            out.push('\n');
        }

        out
    }
}

fn opt_number<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
