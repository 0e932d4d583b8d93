//! Group-wise analysis of derived metrics and covariates
//!
//! Groups annotated records by condition or by a design factor and runs the
//! independent-samples comparisons used in the study reports. Undefined
//! values are dropped before any statistic is computed.

use crate::config::{Factor, StudyConfig};
use crate::error::ComputeError;
use crate::stats::{
    chi_square_independence, describe, independent_t_test, pearson, significance_marker,
    ChiSquare, Correlation, Summary, TTest, Variance,
};
use crate::types::{AnnotatedRecord, DerivedMetrics};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A derived metric selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Phase1MeanLatency,
    Phase2MeanLatency,
    LatencyChange,
    ErrorCornerMeanLatency,
    OverallMeanLatency,
    ComplianceRate,
    InitialTrust,
    OvercomplianceCount,
    UndercomplianceCount,
    TrustDifference,
}

impl Metric {
    pub const ALL: [Metric; 10] = [
        Metric::Phase1MeanLatency,
        Metric::Phase2MeanLatency,
        Metric::LatencyChange,
        Metric::ErrorCornerMeanLatency,
        Metric::OverallMeanLatency,
        Metric::ComplianceRate,
        Metric::InitialTrust,
        Metric::OvercomplianceCount,
        Metric::UndercomplianceCount,
        Metric::TrustDifference,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Phase1MeanLatency => "phase1_mean_latency",
            Metric::Phase2MeanLatency => "phase2_mean_latency",
            Metric::LatencyChange => "latency_change",
            Metric::ErrorCornerMeanLatency => "error_corner_mean_latency",
            Metric::OverallMeanLatency => "overall_mean_latency",
            Metric::ComplianceRate => "compliance_rate",
            Metric::InitialTrust => "initial_trust",
            Metric::OvercomplianceCount => "overcompliance_count",
            Metric::UndercomplianceCount => "undercompliance_count",
            Metric::TrustDifference => "trust_difference",
        }
    }

    /// Value of this metric as a real number; `initial_trust` maps to 0/1
    pub fn extract(&self, metrics: &DerivedMetrics) -> Option<f64> {
        match self {
            Metric::Phase1MeanLatency => metrics.phase1_mean_latency,
            Metric::Phase2MeanLatency => metrics.phase2_mean_latency,
            Metric::LatencyChange => metrics.latency_change,
            Metric::ErrorCornerMeanLatency => metrics.error_corner_mean_latency,
            Metric::OverallMeanLatency => metrics.overall_mean_latency,
            Metric::ComplianceRate => metrics.compliance_rate,
            Metric::InitialTrust => metrics.initial_trust.map(|t| if t { 1.0 } else { 0.0 }),
            Metric::OvercomplianceCount => metrics.overcompliance_count.map(f64::from),
            Metric::UndercomplianceCount => metrics.undercompliance_count.map(f64::from),
            Metric::TrustDifference => metrics.trust_difference,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Metric::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ComputeError::UnknownMetric(wanted.to_string()))
    }
}

/// Name of the pre-task trust measure
pub const TRUST_PRE: &str = "trust_pre";
/// Name of the post-task trust measure
pub const TRUST_POST: &str = "trust_post";

/// Any per-participant quantity that can be analysed: a derived metric,
/// one of the trust scores, or a configured covariate column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Measure {
    Derived(Metric),
    TrustPre,
    TrustPost,
    Covariate(String),
}

impl Measure {
    /// Resolve a name against the derived metrics, the trust scores and the
    /// covariates configured for the study
    pub fn resolve(name: &str, config: &StudyConfig) -> Result<Measure, ComputeError> {
        let wanted = name.trim();
        if let Ok(metric) = wanted.parse::<Metric>() {
            return Ok(Measure::Derived(metric));
        }
        if wanted.eq_ignore_ascii_case(TRUST_PRE) {
            return Ok(Measure::TrustPre);
        }
        if wanted.eq_ignore_ascii_case(TRUST_POST) {
            return Ok(Measure::TrustPost);
        }
        config
            .covariate(wanted)
            .map(|c| Measure::Covariate(c.to_string()))
            .ok_or_else(|| ComputeError::UnknownMetric(wanted.to_string()))
    }

    pub fn name(&self) -> &str {
        match self {
            Measure::Derived(metric) => metric.name(),
            Measure::TrustPre => TRUST_PRE,
            Measure::TrustPost => TRUST_POST,
            Measure::Covariate(name) => name.as_str(),
        }
    }

    pub fn extract(&self, record: &AnnotatedRecord) -> Option<f64> {
        match self {
            Measure::Derived(metric) => metric.extract(&record.metrics),
            Measure::TrustPre => record.record.trust_pre,
            Measure::TrustPost => record.record.trust_post,
            Measure::Covariate(name) => record.record.covariates.get(name).copied(),
        }
    }
}

impl From<Metric> for Measure {
    fn from(metric: Metric) -> Self {
        Measure::Derived(metric)
    }
}

impl From<String> for Measure {
    fn from(name: String) -> Self {
        if let Ok(metric) = name.parse::<Metric>() {
            Measure::Derived(metric)
        } else if name.eq_ignore_ascii_case(TRUST_PRE) {
            Measure::TrustPre
        } else if name.eq_ignore_ascii_case(TRUST_POST) {
            Measure::TrustPost
        } else {
            Measure::Covariate(name)
        }
    }
}

impl From<Measure> for String {
    fn from(measure: Measure) -> Self {
        measure.name().to_string()
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How records are split into groups
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Grouping<'a> {
    /// One group per condition label
    Condition,
    /// One group per factor level; conditions outside every level are left out
    Factor(&'a Factor),
}

impl Grouping<'_> {
    pub fn name(&self) -> &str {
        match self {
            Grouping::Condition => "condition",
            Grouping::Factor(factor) => factor.name.as_str(),
        }
    }

    fn key<'r>(&'r self, record: &'r AnnotatedRecord) -> Option<&'r str> {
        match self {
            Grouping::Condition => Some(record.condition()),
            Grouping::Factor(factor) => factor.level_of(record.condition()),
        }
    }

    fn missing_group(&self, label: &str) -> ComputeError {
        match self {
            Grouping::Condition => ComputeError::UnknownCondition(label.to_string()),
            Grouping::Factor(factor) if factor.has_level(label) => ComputeError::InsufficientData(
                format!("{}: level {label} has no records", factor.name),
            ),
            Grouping::Factor(factor) => {
                ComputeError::UnknownFactor(format!("{}: no level {label}", factor.name))
            }
        }
    }
}

/// Group records by condition label, in label order
pub fn group_by_condition(records: &[AnnotatedRecord]) -> BTreeMap<&str, Vec<&AnnotatedRecord>> {
    let mut groups: BTreeMap<&str, Vec<&AnnotatedRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.condition()).or_default().push(record);
    }
    groups
}

/// Group records by condition or factor level, in group-name order
pub fn group_by<'r>(
    records: &'r [AnnotatedRecord],
    grouping: Grouping<'_>,
) -> BTreeMap<String, Vec<&'r AnnotatedRecord>> {
    let mut groups: BTreeMap<String, Vec<&AnnotatedRecord>> = BTreeMap::new();
    for record in records {
        if let Some(key) = grouping.key(record) {
            groups.entry(key.to_string()).or_default().push(record);
        }
    }
    groups
}

/// Defined values of a measure across records
pub fn metric_values<'a, I>(records: I, measure: &Measure) -> Vec<f64>
where
    I: IntoIterator<Item = &'a AnnotatedRecord>,
{
    records
        .into_iter()
        .filter_map(|r| measure.extract(r))
        .collect()
}

/// Descriptive statistics for one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Condition label or factor level
    pub group: String,
    /// Records in the group
    pub participants: usize,
    /// Records whose value was undefined and therefore excluded
    pub undefined: usize,
    pub summary: Option<Summary>,
}

impl GroupSummary {
    fn of(group: &str, records: &[&AnnotatedRecord], values: &[f64]) -> Self {
        Self {
            group: group.to_string(),
            participants: records.len(),
            undefined: records.len() - values.len(),
            summary: describe(values),
        }
    }
}

/// Per-condition summary of a measure
pub fn summarize(records: &[AnnotatedRecord], measure: impl Into<Measure>) -> Vec<GroupSummary> {
    summarize_by(records, measure, Grouping::Condition)
}

/// Per-group summary of a measure
pub fn summarize_by(
    records: &[AnnotatedRecord],
    measure: impl Into<Measure>,
    grouping: Grouping<'_>,
) -> Vec<GroupSummary> {
    let measure = measure.into();
    group_by(records, grouping)
        .iter()
        .map(|(group, members)| {
            let values = metric_values(members.iter().copied(), &measure);
            GroupSummary::of(group, members, &values)
        })
        .collect()
}

/// Two-group comparison of one measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub metric: Measure,
    /// `condition` or the factor name
    pub grouping: String,
    pub group_a: GroupSummary,
    pub group_b: GroupSummary,
    pub test: TTest,
    pub significance: String,
}

/// Independent-samples t-test of a measure between two conditions
pub fn compare_conditions(
    records: &[AnnotatedRecord],
    measure: impl Into<Measure>,
    condition_a: &str,
    condition_b: &str,
    variance: Variance,
) -> Result<Comparison, ComputeError> {
    compare_groups(
        records,
        measure,
        Grouping::Condition,
        condition_a,
        condition_b,
        variance,
    )
}

/// Independent-samples t-test of a measure between two groups.
///
/// With a factor grouping, `a` and `b` name factor levels and every
/// condition in a level is pooled.
pub fn compare_groups(
    records: &[AnnotatedRecord],
    measure: impl Into<Measure>,
    grouping: Grouping<'_>,
    a: &str,
    b: &str,
    variance: Variance,
) -> Result<Comparison, ComputeError> {
    let metric = measure.into();
    let groups = group_by(records, grouping);
    let members_a = groups.get(a).ok_or_else(|| grouping.missing_group(a))?;
    let members_b = groups.get(b).ok_or_else(|| grouping.missing_group(b))?;

    let values_a = metric_values(members_a.iter().copied(), &metric);
    let values_b = metric_values(members_b.iter().copied(), &metric);

    let test = independent_t_test(&values_a, &values_b, variance).ok_or_else(|| {
        ComputeError::InsufficientData(format!(
            "{metric}: {a} has {} and {b} has {} defined values; \
             need at least two per group with non-zero variance",
            values_a.len(),
            values_b.len()
        ))
    })?;

    log::info!(
        "{metric} by {}: {a} vs {b} t({:.1}) = {:.3}, p = {:.3}",
        grouping.name(),
        test.df,
        test.t,
        test.p_value
    );

    Ok(Comparison {
        grouping: grouping.name().to_string(),
        group_a: GroupSummary::of(a, members_a, &values_a),
        group_b: GroupSummary::of(b, members_b, &values_b),
        significance: significance_marker(test.p_value).to_string(),
        metric,
        test,
    })
}

/// Corner-1 compliance counts for one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialTrustCounts {
    pub group: String,
    pub complied: u32,
    pub not_complied: u32,
}

/// Group x initial-trust contingency table and its chi-square test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialTrustAnalysis {
    /// `condition` or the factor name
    pub grouping: String,
    pub counts: Vec<InitialTrustCounts>,
    /// `None` when the table collapses to a single row or column
    pub test: Option<ChiSquare>,
}

/// Test whether initial trust depends on condition
pub fn initial_trust_by_condition(records: &[AnnotatedRecord]) -> InitialTrustAnalysis {
    initial_trust_by(records, Grouping::Condition)
}

/// Test whether initial trust depends on the grouping
pub fn initial_trust_by(
    records: &[AnnotatedRecord],
    grouping: Grouping<'_>,
) -> InitialTrustAnalysis {
    let counts: Vec<InitialTrustCounts> = group_by(records, grouping)
        .into_iter()
        .map(|(group, members)| {
            let (complied, not_complied) =
                members
                    .iter()
                    .fold((0, 0), |(yes, no), r| match r.metrics.initial_trust {
                        Some(true) => (yes + 1, no),
                        Some(false) => (yes, no + 1),
                        None => (yes, no),
                    });
            InitialTrustCounts {
                group,
                complied,
                not_complied,
            }
        })
        .collect();

    let table: Vec<Vec<f64>> = counts
        .iter()
        .map(|c| vec![c.not_complied as f64, c.complied as f64])
        .collect();

    InitialTrustAnalysis {
        grouping: grouping.name().to_string(),
        test: chi_square_independence(&table),
        counts,
    }
}

/// Pearson correlation between two measures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCorrelation {
    pub x: Measure,
    pub y: Measure,
    pub correlation: Correlation,
    pub significance: String,
}

/// Correlate two measures over records where both are defined
pub fn correlate(
    records: &[AnnotatedRecord],
    x: impl Into<Measure>,
    y: impl Into<Measure>,
) -> Result<MetricCorrelation, ComputeError> {
    let (x, y) = (x.into(), y.into());
    let (xs, ys): (Vec<f64>, Vec<f64>) = records
        .iter()
        .filter_map(|r| Some((x.extract(r)?, y.extract(r)?)))
        .unzip();

    let correlation = pearson(&xs, &ys).ok_or_else(|| {
        ComputeError::InsufficientData(format!(
            "{x} vs {y}: {} complete pairs; need at least three with non-zero variance",
            xs.len()
        ))
    })?;

    Ok(MetricCorrelation {
        x,
        y,
        significance: significance_marker(correlation.p_value).to_string(),
        correlation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParticipantRecord;
    use pretty_assertions::assert_eq;

    fn annotated(id: &str, condition: &str, metrics: DerivedMetrics) -> AnnotatedRecord {
        AnnotatedRecord {
            record: ParticipantRecord::new(id, condition),
            metrics,
        }
    }

    fn with_scores(
        id: &str,
        condition: &str,
        compliance_rate: Option<f64>,
        trust_post: Option<f64>,
        covariates: &[(&str, f64)],
    ) -> AnnotatedRecord {
        let mut record = ParticipantRecord::new(id, condition);
        record.trust_post = trust_post;
        record.covariates = covariates
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect();
        AnnotatedRecord {
            record,
            metrics: with_compliance(compliance_rate, true),
        }
    }

    fn factorial_records() -> Vec<AnnotatedRecord> {
        vec![
            with_scores("1", "I+MAPK", Some(60.0), Some(3.0), &[("Likeability", 3.0)]),
            with_scores("2", "I+MAPK", Some(70.0), Some(3.5), &[("Likeability", 3.5)]),
            with_scores("3", "E+MAPK", Some(80.0), Some(4.0), &[("Likeability", 4.0)]),
            with_scores("4", "I-MAPK", Some(90.0), Some(2.0), &[("Likeability", 4.0)]),
            with_scores("5", "I-MAPK", Some(95.0), None, &[]),
            with_scores("6", "E-MAPK", Some(100.0), Some(4.5), &[("Likeability", 4.5)]),
            with_scores("7", "E-MAPK", None, Some(5.0), &[("Likeability", 5.0)]),
            with_scores("8", "Baseline", Some(10.0), Some(1.0), &[("Likeability", 1.0)]),
        ]
    }

    fn with_compliance(rate: Option<f64>, initial_trust: bool) -> DerivedMetrics {
        DerivedMetrics {
            compliance_rate: rate,
            initial_trust: Some(initial_trust),
            ..DerivedMetrics::default()
        }
    }

    fn sample_records() -> Vec<AnnotatedRecord> {
        vec![
            annotated("1", "I+MAPK", with_compliance(Some(60.0), true)),
            annotated("2", "I+MAPK", with_compliance(Some(70.0), true)),
            annotated("3", "I+MAPK", with_compliance(Some(80.0), true)),
            annotated("4", "I+MAPK", with_compliance(None, false)),
            annotated("5", "E-MAPK", with_compliance(Some(80.0), false)),
            annotated("6", "E-MAPK", with_compliance(Some(90.0), false)),
            annotated("7", "E-MAPK", with_compliance(Some(100.0), true)),
        ]
    }

    #[test]
    fn test_metric_names_roundtrip() {
        for metric in Metric::ALL {
            assert_eq!(metric.name().parse::<Metric>().unwrap(), metric);
        }
        assert_eq!(
            "Compliance_Rate".parse::<Metric>().unwrap(),
            Metric::ComplianceRate
        );
        assert!(matches!(
            "speed".parse::<Metric>(),
            Err(ComputeError::UnknownMetric(_))
        ));
        let json = serde_json::to_string(&Metric::ErrorCornerMeanLatency).unwrap();
        assert_eq!(json, "\"error_corner_mean_latency\"");
    }

    #[test]
    fn test_extract_initial_trust_and_counts() {
        let metrics = DerivedMetrics {
            initial_trust: Some(true),
            overcompliance_count: Some(2),
            ..DerivedMetrics::default()
        };
        assert_eq!(Metric::InitialTrust.extract(&metrics), Some(1.0));
        assert_eq!(Metric::OvercomplianceCount.extract(&metrics), Some(2.0));
        assert_eq!(Metric::UndercomplianceCount.extract(&metrics), None);
    }

    #[test]
    fn test_group_by_condition() {
        let records = sample_records();
        let groups = group_by_condition(&records);
        let labels: Vec<&str> = groups.keys().copied().collect();
        assert_eq!(labels, vec!["E-MAPK", "I+MAPK"]);
        assert_eq!(groups["I+MAPK"].len(), 4);
    }

    #[test]
    fn test_summarize_drops_undefined() {
        let records = sample_records();
        let summaries = summarize(&records, Metric::ComplianceRate);

        let introvert = summaries.iter().find(|s| s.group == "I+MAPK").unwrap();
        assert_eq!(introvert.participants, 4);
        assert_eq!(introvert.undefined, 1);
        let summary = introvert.summary.as_ref().unwrap();
        assert_eq!(summary.n, 3);
        assert_eq!(summary.mean, 70.0);
    }

    #[test]
    fn test_compare_conditions() {
        let records = sample_records();
        let comparison = compare_conditions(
            &records,
            Metric::ComplianceRate,
            "I+MAPK",
            "E-MAPK",
            Variance::Pooled,
        )
        .unwrap();

        assert_eq!(comparison.grouping, "condition");
        assert_eq!(comparison.metric, Measure::Derived(Metric::ComplianceRate));
        assert_eq!(comparison.group_a.summary.as_ref().unwrap().n, 3);
        assert!((comparison.test.mean_difference + 20.0).abs() < 1e-9);
        assert!((comparison.test.df - 4.0).abs() < 1e-9);
        assert!(comparison.test.t < 0.0);
        assert_eq!(
            comparison.significance,
            significance_marker(comparison.test.p_value)
        );
    }

    #[test]
    fn test_compare_unknown_and_insufficient() {
        let records = sample_records();
        assert!(matches!(
            compare_conditions(&records, Metric::ComplianceRate, "I+MAPK", "nope", Variance::Pooled),
            Err(ComputeError::UnknownCondition(_))
        ));
        assert!(matches!(
            compare_conditions(&records, Metric::TrustDifference, "I+MAPK", "E-MAPK", Variance::Welch),
            Err(ComputeError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_initial_trust_by_condition() {
        let records = sample_records();
        let analysis = initial_trust_by_condition(&records);

        assert_eq!(
            analysis.counts,
            vec![
                InitialTrustCounts {
                    group: "E-MAPK".to_string(),
                    complied: 1,
                    not_complied: 2,
                },
                InitialTrustCounts {
                    group: "I+MAPK".to_string(),
                    complied: 3,
                    not_complied: 1,
                },
            ]
        );
        let test = analysis.test.unwrap();
        assert_eq!(test.dof, 1);
    }

    #[test]
    fn test_correlate() {
        let records: Vec<AnnotatedRecord> = (0..6)
            .map(|i| {
                let x = i as f64;
                annotated(
                    &i.to_string(),
                    "I+MAPK",
                    DerivedMetrics {
                        overall_mean_latency: Some(2.0 + x),
                        compliance_rate: Some(100.0 - 10.0 * x),
                        ..DerivedMetrics::default()
                    },
                )
            })
            .collect();

        let result =
            correlate(&records, Metric::OverallMeanLatency, Metric::ComplianceRate).unwrap();
        assert!((result.correlation.r + 1.0).abs() < 1e-12);
        assert_eq!(result.correlation.n, 6);
        assert_eq!(result.significance, "***");

        assert!(matches!(
            correlate(&records, Metric::OverallMeanLatency, Metric::TrustDifference),
            Err(ComputeError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_measure_resolve() {
        let config = StudyConfig::study1();
        assert_eq!(
            Measure::resolve("Compliance_Rate", &config).unwrap(),
            Measure::Derived(Metric::ComplianceRate)
        );
        assert_eq!(Measure::resolve("Trust_pre", &config).unwrap(), Measure::TrustPre);
        assert_eq!(
            Measure::resolve("intelligence", &config).unwrap(),
            Measure::Covariate("Intelligence".to_string())
        );
        assert!(matches!(
            Measure::resolve("Shoe size", &config),
            Err(ComputeError::UnknownMetric(_))
        ));

        let json = serde_json::to_string(&Measure::Covariate("Likeability".into())).unwrap();
        assert_eq!(json, "\"Likeability\"");
        let parsed: Measure = serde_json::from_str("\"latency_change\"").unwrap();
        assert_eq!(parsed, Measure::Derived(Metric::LatencyChange));
    }

    #[test]
    fn test_group_by_factor_leaves_out_unmapped_conditions() {
        let config = StudyConfig::study1();
        let memory = config.factor("memory_function").unwrap();
        let records = factorial_records();

        let groups = group_by(&records, Grouping::Factor(memory));
        let levels: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(levels, vec!["+MAPK", "-MAPK"]);
        assert_eq!(groups["+MAPK"].len(), 3);
        assert_eq!(groups["-MAPK"].len(), 4);

        let by_condition = group_by(&records, Grouping::Condition);
        assert_eq!(by_condition.len(), 5);
    }

    #[test]
    fn test_compare_memory_levels_pools_conditions() {
        let config = StudyConfig::study1();
        let memory = config.factor("memory_function").unwrap();
        let records = factorial_records();

        let comparison = compare_groups(
            &records,
            Metric::ComplianceRate,
            Grouping::Factor(memory),
            "+MAPK",
            "-MAPK",
            Variance::Pooled,
        )
        .unwrap();

        assert_eq!(comparison.grouping, "memory_function");
        assert_eq!(comparison.group_a.group, "+MAPK");
        assert_eq!(comparison.group_a.participants, 3);
        assert_eq!(comparison.group_a.summary.as_ref().unwrap().mean, 70.0);
        assert_eq!(comparison.group_b.participants, 4);
        assert_eq!(comparison.group_b.undefined, 1);
        assert_eq!(comparison.group_b.summary.as_ref().unwrap().n, 3);
        assert!((comparison.test.mean_difference + 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_compare_likeability_by_personality() {
        let config = StudyConfig::study1();
        let personality = config.factor("agent_personality").unwrap();
        let records = factorial_records();
        let likeability = Measure::resolve("Likeability", &config).unwrap();

        let comparison = compare_groups(
            &records,
            likeability.clone(),
            Grouping::Factor(personality),
            "Extrovert",
            "Introvert",
            Variance::Welch,
        )
        .unwrap();

        assert_eq!(comparison.metric, likeability);
        // record 5 has no likeability score
        assert_eq!(comparison.group_b.undefined, 1);
        let extrovert = comparison.group_a.summary.as_ref().unwrap();
        assert_eq!(extrovert.n, 3);
        assert!((extrovert.mean - 4.5).abs() < 1e-9);
        assert!(comparison.test.mean_difference > 0.0);
    }

    #[test]
    fn test_factor_level_errors() {
        let config = StudyConfig::study1();
        let memory = config.factor("memory_function").unwrap();
        let records = factorial_records();

        assert!(matches!(
            compare_groups(&records, Metric::ComplianceRate, Grouping::Factor(memory), "+MAPK", "MAPK", Variance::Pooled),
            Err(ComputeError::UnknownFactor(_))
        ));

        let only_with_memory: Vec<AnnotatedRecord> = records
            .into_iter()
            .filter(|r| r.condition().contains("+MAPK"))
            .collect();
        assert!(matches!(
            compare_groups(&only_with_memory, Metric::ComplianceRate, Grouping::Factor(memory), "+MAPK", "-MAPK", Variance::Pooled),
            Err(ComputeError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_summarize_and_initial_trust_by_factor() {
        let config = StudyConfig::study1();
        let personality = config.factor("agent_personality").unwrap();
        let records = factorial_records();

        let summaries = summarize_by(&records, Measure::TrustPost, Grouping::Factor(personality));
        let groups: Vec<&str> = summaries.iter().map(|s| s.group.as_str()).collect();
        assert_eq!(groups, vec!["Extrovert", "Introvert"]);
        assert_eq!(summaries[1].participants, 4);
        assert_eq!(summaries[1].undefined, 1);

        let analysis = initial_trust_by(&records, Grouping::Factor(personality));
        assert_eq!(analysis.grouping, "agent_personality");
        assert_eq!(analysis.counts.len(), 2);
        assert_eq!(analysis.counts[0].complied, 3);
        assert_eq!(analysis.counts[1].complied, 4);
    }

    #[test]
    fn test_correlate_covariate_with_trust() {
        let records = factorial_records();
        let result = correlate(
            &records,
            Measure::Covariate("Likeability".to_string()),
            Measure::TrustPost,
        )
        .unwrap();

        // record 5 lacks both values
        assert_eq!(result.correlation.n, 7);
        assert!(result.correlation.r > 0.0);
        assert_eq!(result.x.name(), "Likeability");
        assert_eq!(result.y.name(), TRUST_POST);
    }
}
