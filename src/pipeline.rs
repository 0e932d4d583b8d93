//! Pipeline orchestration
//!
//! This module provides the public API for trial metric derivation.
//! It orchestrates the full pipeline from an exported study table to
//! annotated records and condition- or factor-level analyses.

use crate::analysis::{
    self, Comparison, GroupSummary, Grouping, InitialTrustAnalysis, Measure, MetricCorrelation,
};
use crate::config::StudyConfig;
use crate::encoder::MetricsEncoder;
use crate::error::ComputeError;
use crate::features::TrialMetricsDeriver;
use crate::schema::{InputFormat, RecordAdapter};
use crate::stats::Variance;
use crate::types::{AnnotatedRecord, ParticipantRecord};
use std::collections::HashSet;

/// Derive trial metrics for every participant in an exported table.
///
/// Pipeline stages:
/// 1. RecordAdapter - Parse rows and map them to participant records
/// 2. TrialMetricsDeriver - Compute derived metrics against the layout
///
/// # Example
/// ```ignore
/// let records = derive_metrics(&csv_text, InputFormat::Csv, &StudyConfig::study1())?;
/// ```
pub fn derive_metrics(
    input: &str,
    format: InputFormat,
    config: &StudyConfig,
) -> Result<Vec<AnnotatedRecord>, ComputeError> {
    let rows = RecordAdapter::parse(input, format)?;
    let records = RecordAdapter::to_records(&rows, config)?;
    annotate_all(records, config)
}

fn annotate_all(
    records: Vec<ParticipantRecord>,
    config: &StudyConfig,
) -> Result<Vec<AnnotatedRecord>, ComputeError> {
    records
        .into_iter()
        .map(|record| {
            let metrics = TrialMetricsDeriver::derive(&record, &config.layout)?;
            log::debug!(
                "participant {}: {:?} responses, compliance {:?}",
                record.participant_id,
                metrics.total_responses,
                metrics.compliance_rate
            );
            Ok(AnnotatedRecord { record, metrics })
        })
        .collect()
}

/// Stateful processor that accumulates participants across several inputs.
///
/// Use this when a study is exported in batches (per session or per site)
/// and analysed as a whole.
pub struct StudyProcessor {
    config: StudyConfig,
    records: Vec<AnnotatedRecord>,
    encoder: MetricsEncoder,
}

impl Default for StudyProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl StudyProcessor {
    /// Create a processor for the Study 1 layout
    pub fn new() -> Self {
        Self::with_config(StudyConfig::default())
    }

    pub fn with_config(config: StudyConfig) -> Self {
        Self {
            config,
            records: Vec::new(),
            encoder: MetricsEncoder::new(),
        }
    }

    pub fn config(&self) -> &StudyConfig {
        &self.config
    }

    /// Parse, adapt and derive a batch; returns the number of records added.
    ///
    /// The batch is all-or-nothing: on error no record from it is kept.
    pub fn ingest(&mut self, input: &str, format: InputFormat) -> Result<usize, ComputeError> {
        let batch = derive_metrics(input, format, &self.config)?;

        let known: HashSet<&str> = self.records.iter().map(|r| r.participant_id()).collect();
        if let Some(dup) = batch.iter().find(|r| known.contains(r.participant_id())) {
            return Err(ComputeError::DuplicateParticipant(
                dup.participant_id().to_string(),
            ));
        }

        let added = batch.len();
        self.records.extend(batch);
        log::info!(
            "ingested {added} participants ({} total) for study {}",
            self.records.len(),
            self.config.name
        );
        Ok(added)
    }

    pub fn records(&self) -> &[AnnotatedRecord] {
        &self.records
    }

    pub fn participant_count(&self) -> usize {
        self.records.len()
    }

    /// Resolve a metric, trust score or covariate name for this study
    pub fn measure(&self, name: &str) -> Result<Measure, ComputeError> {
        Measure::resolve(name, &self.config)
    }

    /// Condition grouping, or the named factor's levels
    pub fn grouping(&self, factor: Option<&str>) -> Result<Grouping<'_>, ComputeError> {
        match factor {
            Some(name) => Ok(Grouping::Factor(self.config.factor(name)?)),
            None => Ok(Grouping::Condition),
        }
    }

    pub fn summarize(&self, metric: impl Into<Measure>) -> Vec<GroupSummary> {
        analysis::summarize(&self.records, metric)
    }

    /// Summarize over the levels of a configured factor
    pub fn summarize_by(
        &self,
        metric: impl Into<Measure>,
        factor: &str,
    ) -> Result<Vec<GroupSummary>, ComputeError> {
        let grouping = self.grouping(Some(factor))?;
        Ok(analysis::summarize_by(&self.records, metric, grouping))
    }

    pub fn compare(
        &self,
        metric: impl Into<Measure>,
        condition_a: &str,
        condition_b: &str,
        variance: Variance,
    ) -> Result<Comparison, ComputeError> {
        analysis::compare_conditions(&self.records, metric, condition_a, condition_b, variance)
    }

    /// Compare two levels of a configured factor, pooling their conditions
    pub fn compare_by(
        &self,
        metric: impl Into<Measure>,
        factor: &str,
        level_a: &str,
        level_b: &str,
        variance: Variance,
    ) -> Result<Comparison, ComputeError> {
        let grouping = self.grouping(Some(factor))?;
        analysis::compare_groups(&self.records, metric, grouping, level_a, level_b, variance)
    }

    pub fn initial_trust_by_condition(&self) -> InitialTrustAnalysis {
        analysis::initial_trust_by_condition(&self.records)
    }

    pub fn initial_trust_by(&self, factor: &str) -> Result<InitialTrustAnalysis, ComputeError> {
        let grouping = self.grouping(Some(factor))?;
        Ok(analysis::initial_trust_by(&self.records, grouping))
    }

    pub fn correlate(
        &self,
        x: impl Into<Measure>,
        y: impl Into<Measure>,
    ) -> Result<MetricCorrelation, ComputeError> {
        analysis::correlate(&self.records, x, y)
    }

    pub fn to_csv(&self) -> String {
        self.encoder.encode_csv(&self.records)
    }

    pub fn to_json(&self) -> Result<String, ComputeError> {
        self.encoder.encode_to_json(&self.records, &self.config)
    }

    /// Drop all accumulated records, keeping the configuration
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Metric;
    use crate::schema::{direction_column, time_column};
    use pretty_assertions::assert_eq;

    const AGENT: [&str; 10] = ["R", "F", "L", "R", "F", "F", "F", "L", "L", "L"];
    const CORRECT: [&str; 10] = ["R", "F", "R", "R", "F", "F", "L", "L", "F", "L"];

    fn header() -> String {
        let mut columns = vec!["ID".to_string(), "Display".to_string()];
        for corner in 1..=10u8 {
            columns.push(direction_column(corner));
            columns.push(time_column(corner));
        }
        columns.join(",")
    }

    fn row(id: &str, condition: &str, choices: &[&str; 10], latency: f64) -> String {
        let mut fields = vec![id.to_string(), condition.to_string()];
        for choice in choices {
            fields.push(choice.to_string());
            fields.push(latency.to_string());
        }
        fields.join(",")
    }

    fn study_csv(rows: &[String]) -> String {
        let mut text = header();
        for r in rows {
            text.push('\n');
            text.push_str(r);
        }
        text
    }

    #[test]
    fn test_derive_metrics_from_csv() {
        let csv = study_csv(&[
            row("1", "I+MAPK", &AGENT, 10.0),
            row("2", "E-MAPK", &CORRECT, 4.0),
        ]);

        let records = derive_metrics(&csv, InputFormat::Csv, &StudyConfig::study1()).unwrap();
        assert_eq!(records.len(), 2);

        let follower = &records[0].metrics;
        assert_eq!(follower.compliance_rate, Some(100.0));
        assert_eq!(follower.initial_trust, Some(true));
        assert_eq!(follower.overcompliance_count, Some(3));
        assert_eq!(follower.overall_mean_latency, Some(10.0));

        let independent = &records[1].metrics;
        assert_eq!(independent.compliance_rate, Some(70.0));
        assert_eq!(independent.overcompliance_count, Some(0));
        assert_eq!(independent.latency_change, Some(0.0));
    }

    #[test]
    fn test_derive_metrics_rejects_unknown_condition() {
        let csv = study_csv(&[row("1", "Baseline", &AGENT, 10.0)]);
        let err = derive_metrics(&csv, InputFormat::Csv, &StudyConfig::study1()).unwrap_err();
        assert!(matches!(err, ComputeError::UnknownCondition(_)));
    }

    #[test]
    fn test_processor_accumulates_batches() {
        let mut processor = StudyProcessor::new();

        let first = study_csv(&[
            row("1", "I+MAPK", &AGENT, 10.0),
            row("2", "I+MAPK", &CORRECT, 12.0),
        ]);
        let second = study_csv(&[
            row("3", "E-MAPK", &CORRECT, 5.0),
            row("4", "E-MAPK", &CORRECT, 6.0),
        ]);

        assert_eq!(processor.ingest(&first, InputFormat::Csv).unwrap(), 2);
        assert_eq!(processor.ingest(&second, InputFormat::Csv).unwrap(), 2);
        assert_eq!(processor.participant_count(), 4);

        let summaries = processor.summarize(Metric::ComplianceRate);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[1].group, "I+MAPK");
        assert_eq!(summaries[1].summary.as_ref().unwrap().mean, 85.0);

        let trust = processor.initial_trust_by_condition();
        assert_eq!(trust.counts.len(), 2);
    }

    #[test]
    fn test_processor_rejects_duplicates_across_batches() {
        let mut processor = StudyProcessor::new();
        let batch = study_csv(&[row("7", "I+MAPK", &AGENT, 10.0)]);

        processor.ingest(&batch, InputFormat::Csv).unwrap();
        let err = processor.ingest(&batch, InputFormat::Csv).unwrap_err();
        assert!(matches!(err, ComputeError::DuplicateParticipant(id) if id == "7"));
        assert_eq!(processor.participant_count(), 1);
    }

    #[test]
    fn test_processor_outputs_and_clear() {
        let mut processor = StudyProcessor::new();
        let batch = study_csv(&[row("1", "E+MAPK", &AGENT, 3.0)]);
        processor.ingest(&batch, InputFormat::Csv).unwrap();

        let csv = processor.to_csv();
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.lines().nth(1).unwrap().starts_with("1,E+MAPK,3,3,0,3,3,100,1,3,0,"));

        let json: serde_json::Value = serde_json::from_str(&processor.to_json().unwrap()).unwrap();
        assert_eq!(json["participant_count"], 1);
        assert_eq!(json["study"], processor.config().name.as_str());

        processor.clear();
        assert!(processor.records().is_empty());
    }

    #[test]
    fn test_processor_json_input() {
        let json = r#"[
            {"participant_id": "A", "Display": "I-MAPK",
             "corner1_decision1_direction": "Right", "corner1_decision1_time": 2.5,
             "corner3_decision1_direction": "Left", "corner3_decision1_time": 4.5}
        ]"#;

        let mut processor = StudyProcessor::new();
        assert_eq!(processor.ingest(json, InputFormat::Json).unwrap(), 1);

        let metrics = &processor.records()[0].metrics;
        assert_eq!(metrics.total_responses, Some(2));
        assert_eq!(metrics.overcompliance_count, Some(1));
        assert_eq!(metrics.error_corner_mean_latency, Some(4.5));
        assert_eq!(metrics.phase2_mean_latency, None);
        assert_eq!(metrics.latency_change, None);
    }

    #[test]
    fn test_processor_compares_factor_levels() {
        let mut processor = StudyProcessor::new();
        let batch = study_csv(&[
            row("1", "I+MAPK", &AGENT, 10.0),
            row("2", "E+MAPK", &CORRECT, 12.0),
            row("3", "I-MAPK", &CORRECT, 5.0),
            row("4", "E-MAPK", &CORRECT, 7.0),
        ]);
        processor.ingest(&batch, InputFormat::Csv).unwrap();

        let comparison = processor
            .compare_by(Metric::OverallMeanLatency, "memory_function", "+MAPK", "-MAPK", Variance::Welch)
            .unwrap();
        assert_eq!(comparison.group_a.summary.as_ref().unwrap().mean, 11.0);
        assert_eq!(comparison.group_b.summary.as_ref().unwrap().mean, 6.0);

        let summaries = processor
            .summarize_by(Metric::ComplianceRate, "agent_personality")
            .unwrap();
        assert_eq!(summaries[0].group, "Extrovert");
        assert_eq!(summaries[0].participants, 2);

        let trust = processor.initial_trust_by("agent_personality").unwrap();
        assert_eq!(trust.counts.len(), 2);

        assert!(matches!(
            processor.summarize_by(Metric::ComplianceRate, "distance"),
            Err(ComputeError::UnknownFactor(_))
        ));
    }

    #[test]
    fn test_processor_covariates_from_json() {
        let json = r#"[
            {"participant_id": "A", "Display": "I-MAPK", "Trust_post": 3.0, "Intelligence": 3.5,
             "corner1_decision1_direction": "Right", "corner1_decision1_time": 2.0},
            {"participant_id": "B", "Display": "E-MAPK", "Trust_post": 4.0, "Intelligence": 4.0,
             "corner1_decision1_direction": "Left", "corner1_decision1_time": 3.0},
            {"participant_id": "C", "Display": "E+MAPK", "Trust_post": 5.0, "Intelligence": 5.0,
             "corner1_decision1_direction": "Right", "corner1_decision1_time": 4.0}
        ]"#;

        let mut processor = StudyProcessor::new();
        processor.ingest(json, InputFormat::Json).unwrap();
        assert_eq!(
            processor.records()[0].record.covariates.get("Intelligence"),
            Some(&3.5)
        );

        let intelligence = processor.measure("intelligence").unwrap();
        let trust_post = processor.measure("Trust_post").unwrap();
        let result = processor.correlate(intelligence, trust_post).unwrap();
        assert_eq!(result.correlation.n, 3);
        assert!(result.correlation.r > 0.9);

        let report: serde_json::Value =
            serde_json::from_str(&processor.to_json().unwrap()).unwrap();
        assert_eq!(report["records"][2]["covariates"]["Intelligence"], 5.0);
    }
}
