//! Core data types for participant trial records
//!
//! These types flow through the pipeline: raw rows are adapted into
//! [`ParticipantRecord`]s, the deriver computes [`DerivedMetrics`], and the
//! pair travels on as an [`AnnotatedRecord`].

use crate::error::ComputeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Direction a participant (or the agent) can take at a corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Forward,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "Left",
            Direction::Right => "Right",
            Direction::Forward => "Forward",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ComputeError;

    /// Parse a direction label. Accepts the full names case-insensitively
    /// and the single-letter forms `L`, `R`, `F`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Direction::Left),
            "right" | "r" => Ok(Direction::Right),
            "forward" | "f" => Ok(Direction::Forward),
            other => Err(ComputeError::ParseError(format!(
                "Unknown direction label: {other:?}"
            ))),
        }
    }
}

/// A single decision event at one corner of the maze
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CornerEvent {
    /// 1-based corner index
    pub corner: u8,
    /// Direction chosen at the first decision, if recorded
    #[serde(default)]
    pub direction: Option<Direction>,
    /// Decision latency in seconds, if recorded
    #[serde(default)]
    pub latency_sec: Option<f64>,
}

impl CornerEvent {
    pub fn new(corner: u8, direction: Option<Direction>, latency_sec: Option<f64>) -> Self {
        Self {
            corner,
            direction,
            latency_sec,
        }
    }

    /// True when neither a direction nor a latency was recorded
    pub fn is_missing(&self) -> bool {
        self.direction.is_none() && self.latency_sec.is_none()
    }
}

/// One participant's raw trial data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    /// Opaque participant identifier
    pub participant_id: String,
    /// Experimental condition label (e.g. "I+MAPK", "High Distance (5.4m)")
    pub condition: String,
    /// Corner events in corner order; absent corners may be omitted
    #[serde(default)]
    pub corner_events: Vec<CornerEvent>,
    /// Pre-task trust questionnaire score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_pre: Option<f64>,
    /// Post-task trust questionnaire score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_post: Option<f64>,
    /// Extra numeric columns kept for analysis (questionnaire scales etc.)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub covariates: BTreeMap<String, f64>,
}

impl ParticipantRecord {
    pub fn new(participant_id: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            participant_id: participant_id.into(),
            condition: condition.into(),
            corner_events: Vec::new(),
            trust_pre: None,
            trust_post: None,
            covariates: BTreeMap::new(),
        }
    }

    /// Look up the event recorded at a corner
    pub fn event(&self, corner: u8) -> Option<&CornerEvent> {
        self.corner_events.iter().find(|e| e.corner == corner)
    }
}

/// Metrics derived from a participant's corner events.
///
/// Every aggregate is `None` when no observation contributed to it, so
/// downstream statistics can drop it instead of treating it as zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Mean decision latency over phase 1 corners (seconds)
    pub phase1_mean_latency: Option<f64>,
    /// Mean decision latency over phase 2 corners (seconds)
    pub phase2_mean_latency: Option<f64>,
    /// Phase 2 mean minus phase 1 mean
    pub latency_change: Option<f64>,
    /// Mean decision latency over corners where the agent was wrong
    pub error_corner_mean_latency: Option<f64>,
    /// Mean decision latency over every recorded corner
    pub overall_mean_latency: Option<f64>,
    /// Percentage (0-100) of responses that followed the agent
    pub compliance_rate: Option<f64>,
    /// Whether the participant followed the agent at corner 1
    pub initial_trust: Option<bool>,
    /// Number of times the participant followed a wrong recommendation
    pub overcompliance_count: Option<u32>,
    /// Number of times the participant ignored a right recommendation
    pub undercompliance_count: Option<u32>,
    /// Post-task minus pre-task trust
    pub trust_difference: Option<f64>,
    /// Corners with a recorded direction; `None` when no corner was logged
    pub total_responses: Option<u32>,
    /// Corners where the recorded direction matched the agent
    pub followed_count: Option<u32>,
}

/// A participant record together with its derived metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    pub record: ParticipantRecord,
    pub metrics: DerivedMetrics,
}

impl AnnotatedRecord {
    pub fn participant_id(&self) -> &str {
        &self.record.participant_id
    }

    pub fn condition(&self) -> &str {
        &self.record.condition
    }
}

/// Producer metadata attached to every report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// One participant row in a metrics report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub participant_id: String,
    pub condition: String,
    #[serde(flatten)]
    pub metrics: DerivedMetrics,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub covariates: BTreeMap<String, f64>,
}

/// JSON metrics report for a batch of participants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    /// Name of the study configuration used
    pub study: String,
    /// Corners where the agent recommendation was wrong
    pub error_corners: Vec<u8>,
    pub participant_count: usize,
    pub records: Vec<ReportRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        let json = serde_json::to_string(&Direction::Forward).unwrap();
        assert_eq!(json, "\"Forward\"");

        let parsed: Direction = serde_json::from_str("\"Left\"").unwrap();
        assert_eq!(parsed, Direction::Left);
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("right".parse::<Direction>().unwrap(), Direction::Right);
        assert_eq!(" Forward ".parse::<Direction>().unwrap(), Direction::Forward);
        assert_eq!("L".parse::<Direction>().unwrap(), Direction::Left);
        assert!("Back".parse::<Direction>().is_err());
    }

    #[test]
    fn test_participant_record_deserialization() {
        let json = r#"{
            "participant_id": "P07",
            "condition": "I+MAPK",
            "corner_events": [
                { "corner": 1, "direction": "Right", "latency_sec": 4.2 },
                { "corner": 2, "latency_sec": 3.1 }
            ],
            "trust_pre": 3.5
        }"#;

        let record: ParticipantRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.participant_id, "P07");
        assert_eq!(record.corner_events.len(), 2);
        assert_eq!(record.event(2).unwrap().direction, None);
        assert_eq!(record.trust_pre, Some(3.5));
        assert_eq!(record.trust_post, None);
        assert!(record.event(3).is_none());
    }

    #[test]
    fn test_corner_event_missing() {
        assert!(CornerEvent::new(4, None, None).is_missing());
        assert!(!CornerEvent::new(4, None, Some(2.0)).is_missing());
        assert!(!CornerEvent::new(4, Some(Direction::Left), None).is_missing());
    }
}
