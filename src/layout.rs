//! Maze layout reference tables
//!
//! A layout pairs the direction the agent recommends at each corner with the
//! objectively correct direction, plus the phase split used for latency
//! aggregation. Error corners are derived from the two tables so that studies
//! with different mazes share one deriver.

use crate::error::ComputeError;
use crate::types::Direction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default last corner of phase 1
pub const DEFAULT_PHASE1_END: u8 = 5;

/// Default last corner of phase 2
pub const DEFAULT_PHASE2_END: u8 = 10;

/// Task phase a corner belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    One,
    Two,
}

/// Phase boundaries: phase 1 is `1..=phase1_end`, phase 2 is
/// `phase1_end + 1..=phase2_end`. Corners past `phase2_end` belong to neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSplit {
    pub phase1_end: u8,
    pub phase2_end: u8,
}

impl Default for PhaseSplit {
    fn default() -> Self {
        Self {
            phase1_end: DEFAULT_PHASE1_END,
            phase2_end: DEFAULT_PHASE2_END,
        }
    }
}

impl PhaseSplit {
    pub fn phase_of(&self, corner: u8) -> Option<Phase> {
        if corner == 0 {
            None
        } else if corner <= self.phase1_end {
            Some(Phase::One)
        } else if corner <= self.phase2_end {
            Some(Phase::Two)
        } else {
            None
        }
    }
}

/// Reference tables for one maze
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeLayout {
    /// Direction suggested by the agent, keyed by 1-based corner
    pub agent_recommendation: BTreeMap<u8, Direction>,
    /// Objectively correct direction, keyed by 1-based corner
    pub correct_direction: BTreeMap<u8, Direction>,
    #[serde(default)]
    pub phases: PhaseSplit,
}

impl Default for MazeLayout {
    fn default() -> Self {
        Self::study1()
    }
}

impl MazeLayout {
    /// Build a layout and check it for consistency
    pub fn new(
        agent_recommendation: BTreeMap<u8, Direction>,
        correct_direction: BTreeMap<u8, Direction>,
        phases: PhaseSplit,
    ) -> Result<Self, ComputeError> {
        let layout = Self {
            agent_recommendation,
            correct_direction,
            phases,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Ten-corner maze used in the memory/personality study
    pub fn study1() -> Self {
        use Direction::{Forward, Left, Right};

        let agent = [
            Right, Forward, Left, Right, Forward, Forward, Forward, Left, Left, Left,
        ];
        let correct = [
            Right, Forward, Right, Right, Forward, Forward, Left, Left, Forward, Left,
        ];

        Self {
            agent_recommendation: (1u8..).zip(agent).collect(),
            correct_direction: (1u8..).zip(correct).collect(),
            phases: PhaseSplit::default(),
        }
    }

    /// Check table keys and phase boundaries
    pub fn validate(&self) -> Result<(), ComputeError> {
        if self.agent_recommendation.is_empty() || self.correct_direction.is_empty() {
            return Err(ComputeError::InvalidLayout(
                "Reference tables must not be empty".to_string(),
            ));
        }
        if self.agent_recommendation.contains_key(&0) || self.correct_direction.contains_key(&0)
        {
            return Err(ComputeError::InvalidLayout(
                "Corner indices are 1-based; found corner 0".to_string(),
            ));
        }
        let PhaseSplit {
            phase1_end,
            phase2_end,
        } = self.phases;
        if phase1_end == 0 || phase2_end <= phase1_end {
            return Err(ComputeError::InvalidLayout(format!(
                "Phase split must satisfy 0 < phase1_end < phase2_end (got {phase1_end}/{phase2_end})"
            )));
        }
        Ok(())
    }

    /// Agent recommendation and correct direction at a corner.
    ///
    /// A corner missing from either table is a configuration error.
    pub fn reference(&self, corner: u8) -> Result<(Direction, Direction), ComputeError> {
        match (
            self.agent_recommendation.get(&corner),
            self.correct_direction.get(&corner),
        ) {
            (Some(agent), Some(correct)) => Ok((*agent, *correct)),
            _ => Err(ComputeError::ConfigurationError { corner }),
        }
    }

    /// Corners where the agent's recommendation is wrong
    pub fn error_corners(&self) -> Vec<u8> {
        self.agent_recommendation
            .iter()
            .filter(|(corner, agent)| {
                self.correct_direction
                    .get(corner)
                    .is_some_and(|correct| correct != *agent)
            })
            .map(|(corner, _)| *corner)
            .collect()
    }

    /// Highest corner index referenced by the tables or the phase split
    pub fn corner_count(&self) -> u8 {
        let table_max = self
            .agent_recommendation
            .keys()
            .chain(self.correct_direction.keys())
            .copied()
            .max()
            .unwrap_or(0);
        table_max.max(self.phases.phase2_end)
    }
}
