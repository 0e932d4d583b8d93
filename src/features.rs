//! Trial metric derivation
//!
//! Computes per-participant behavioral metrics from raw corner events: phase
//! latencies, error-corner latency, compliance, initial trust and
//! over/undercompliance counts.

use crate::error::ComputeError;
use crate::layout::{MazeLayout, Phase};
use crate::stats::mean;
use crate::types::{AnnotatedRecord, DerivedMetrics, Direction, ParticipantRecord};
use std::collections::BTreeSet;

/// Running compliance counts over the responded corners
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ComplianceTally {
    total: u32,
    followed: u32,
    over: u32,
    under: u32,
}

impl ComplianceTally {
    fn record(&mut self, choice: Direction, agent: Direction, correct: Direction) {
        self.total += 1;
        let agent_right = agent == correct;
        if choice == agent {
            self.followed += 1;
            if !agent_right {
                self.over += 1;
            }
        } else if agent_right {
            self.under += 1;
        }
    }
}

/// Deriver for participant trial metrics
pub struct TrialMetricsDeriver;

impl TrialMetricsDeriver {
    /// Derive metrics for one participant.
    ///
    /// Events with neither a direction nor a latency are skipped. Any other
    /// event at a corner the layout has no reference entry for fails the
    /// record with [`ComputeError::ConfigurationError`]. A corner listed twice
    /// is a [`ComputeError::ParseError`].
    pub fn derive(
        record: &ParticipantRecord,
        layout: &MazeLayout,
    ) -> Result<DerivedMetrics, ComputeError> {
        check_unique_corners(record)?;
        let trust_difference = compute_trust_difference(record.trust_pre, record.trust_post);

        if record.corner_events.is_empty() {
            log::debug!(
                "participant {}: no corner events recorded",
                record.participant_id
            );
            return Ok(DerivedMetrics {
                trust_difference,
                ..DerivedMetrics::default()
            });
        }

        let mut phase1 = Vec::new();
        let mut phase2 = Vec::new();
        let mut all = Vec::new();
        let mut error = Vec::new();
        let mut tally = ComplianceTally::default();
        let mut initial_trust = false;

        for event in &record.corner_events {
            if event.is_missing() {
                continue;
            }
            let (agent, correct) = layout.reference(event.corner)?;

            if let Some(latency) = event.latency_sec {
                all.push(latency);
                match layout.phases.phase_of(event.corner) {
                    Some(Phase::One) => phase1.push(latency),
                    Some(Phase::Two) => phase2.push(latency),
                    None => {}
                }
                if agent != correct {
                    error.push(latency);
                }
            }

            if let Some(choice) = event.direction {
                tally.record(choice, agent, correct);
                if event.corner == 1 {
                    initial_trust = choice == agent;
                }
            }
        }

        let phase1_mean_latency = mean(&phase1);
        let phase2_mean_latency = mean(&phase2);
        let latency_change = compute_latency_change(phase1_mean_latency, phase2_mean_latency);
        let compliance_rate = compute_compliance_rate(tally.followed, tally.total);

        log::debug!(
            "participant {}: {} responses, {} followed, {} latencies",
            record.participant_id,
            tally.total,
            tally.followed,
            all.len()
        );

        Ok(DerivedMetrics {
            phase1_mean_latency,
            phase2_mean_latency,
            latency_change,
            error_corner_mean_latency: mean(&error),
            overall_mean_latency: mean(&all),
            compliance_rate,
            initial_trust: Some(initial_trust),
            overcompliance_count: Some(tally.over),
            undercompliance_count: Some(tally.under),
            trust_difference,
            total_responses: Some(tally.total),
            followed_count: Some(tally.followed),
        })
    }

    /// Derive metrics and pair them with a copy of the record
    pub fn annotate(
        record: &ParticipantRecord,
        layout: &MazeLayout,
    ) -> Result<AnnotatedRecord, ComputeError> {
        let metrics = Self::derive(record, layout)?;
        Ok(AnnotatedRecord {
            record: record.clone(),
            metrics,
        })
    }
}

/// Phase 2 mean minus phase 1 mean; needs both phases observed
fn compute_latency_change(phase1: Option<f64>, phase2: Option<f64>) -> Option<f64> {
    Some(phase2? - phase1?)
}

/// Percentage of responses that followed the agent
fn compute_compliance_rate(followed: u32, total: u32) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(100.0 * followed as f64 / total as f64)
}

/// Post-task minus pre-task trust; needs both scores
fn compute_trust_difference(pre: Option<f64>, post: Option<f64>) -> Option<f64> {
    Some(post? - pre?)
}

fn check_unique_corners(record: &ParticipantRecord) -> Result<(), ComputeError> {
    let mut seen = BTreeSet::new();
    for event in &record.corner_events {
        if !seen.insert(event.corner) {
            return Err(ComputeError::ParseError(format!(
                "participant {}: corner {} recorded more than once",
                record.participant_id, event.corner
            )));
        }
    }
    Ok(())
}
