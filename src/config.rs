//! Study configuration
//!
//! Bundles the maze layout with the column naming and condition vocabulary a
//! dataset uses. Configurations are plain JSON so that each study can ship its
//! own file next to its data.

use crate::error::ComputeError;
use crate::layout::MazeLayout;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Default name of the column holding the condition label
pub const DEFAULT_CONDITION_COLUMN: &str = "Display";

/// Conditions of the memory function x agent personality design
pub const STUDY1_CONDITIONS: [&str; 4] = ["I+MAPK", "I-MAPK", "E+MAPK", "E-MAPK"];

/// Agent-perception and VR questionnaire scales recorded in Study 1
pub const STUDY1_COVARIATES: [&str; 9] = [
    "Anthropomorphism",
    "Animacy",
    "Likeability",
    "Intelligence",
    "Safety",
    "Aesthetic",
    "Familiarity",
    "Immersion",
    "Self-efficacy",
];

fn default_condition_column() -> String {
    DEFAULT_CONDITION_COLUMN.to_string()
}

/// Configuration for one study's dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Human-readable study name, carried into reports
    pub name: String,
    /// Reference tables and phase split
    #[serde(default)]
    pub layout: MazeLayout,
    /// Column holding the condition label
    #[serde(default = "default_condition_column")]
    pub condition_column: String,
    /// Allowed condition labels; empty accepts any label
    #[serde(default)]
    pub conditions: Vec<String>,
    /// Design factors pooling condition labels into levels
    #[serde(default)]
    pub factors: Vec<Factor>,
    /// Extra numeric columns carried on each record
    #[serde(default)]
    pub covariates: Vec<String>,
}

/// A design factor: each level pools one or more condition labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub name: String,
    /// Level name to the condition labels it contains
    pub levels: BTreeMap<String, Vec<String>>,
}

impl Factor {
    pub fn new<L, C>(name: impl Into<String>, levels: L) -> Self
    where
        L: IntoIterator<Item = (&'static str, C)>,
        C: IntoIterator<Item = &'static str>,
    {
        Self {
            name: name.into(),
            levels: levels
                .into_iter()
                .map(|(level, labels)| {
                    (
                        level.to_string(),
                        labels.into_iter().map(str::to_string).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Level a condition label belongs to, if any
    pub fn level_of(&self, condition: &str) -> Option<&str> {
        self.levels
            .iter()
            .find(|(_, labels)| labels.iter().any(|l| l == condition))
            .map(|(level, _)| level.as_str())
    }

    pub fn has_level(&self, level: &str) -> bool {
        self.levels.contains_key(level)
    }

    fn validate(&self) -> Result<(), ComputeError> {
        if self.levels.len() < 2 {
            return Err(ComputeError::InvalidConfig(format!(
                "factor {} needs at least two levels",
                self.name
            )));
        }
        let mut owner: BTreeMap<&str, &str> = BTreeMap::new();
        for (level, labels) in &self.levels {
            for label in labels {
                if let Some(previous) = owner.insert(label.as_str(), level.as_str()) {
                    return Err(ComputeError::InvalidConfig(format!(
                        "factor {}: condition {label} is in both {previous} and {level}",
                        self.name
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self::study1()
    }
}

impl StudyConfig {
    /// Memory function and personality matching study
    pub fn study1() -> Self {
        Self {
            name: "study1_memory_personality".to_string(),
            layout: MazeLayout::study1(),
            condition_column: default_condition_column(),
            conditions: STUDY1_CONDITIONS.iter().map(|c| c.to_string()).collect(),
            factors: vec![
                Factor::new(
                    "memory_function",
                    [("+MAPK", ["I+MAPK", "E+MAPK"]), ("-MAPK", ["I-MAPK", "E-MAPK"])],
                ),
                Factor::new(
                    "agent_personality",
                    [
                        ("Introvert", ["I+MAPK", "I-MAPK"]),
                        ("Extrovert", ["E+MAPK", "E-MAPK"]),
                    ],
                ),
            ],
            covariates: STUDY1_COVARIATES.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Parse and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: StudyConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the layout and every factor
    pub fn validate(&self) -> Result<(), ComputeError> {
        self.layout.validate()?;
        for factor in &self.factors {
            factor.validate()?;
        }
        Ok(())
    }

    /// Read a configuration file from disk
    pub fn load(path: &Path) -> Result<Self, ComputeError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(self).map_err(ComputeError::JsonError)
    }

    /// Check a condition label against the vocabulary
    pub fn check_condition(&self, condition: &str) -> Result<(), ComputeError> {
        if self.conditions.is_empty() || self.conditions.iter().any(|c| c == condition) {
            Ok(())
        } else {
            Err(ComputeError::UnknownCondition(condition.to_string()))
        }
    }

    /// Look up a factor by name (case-insensitive)
    pub fn factor(&self, name: &str) -> Result<&Factor, ComputeError> {
        self.factors
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| ComputeError::UnknownFactor(name.trim().to_string()))
    }

    /// Configured covariate column matching a name (case-insensitive)
    pub fn covariate(&self, name: &str) -> Option<&str> {
        self.covariates
            .iter()
            .find(|c| c.eq_ignore_ascii_case(name.trim()))
            .map(String::as_str)
    }
}
