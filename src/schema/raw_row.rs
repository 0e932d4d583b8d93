//! trial.raw_row.v1 schema definition
//!
//! A raw row is one participant's line in the exported study table, keyed by
//! column name. Per-corner columns follow the export naming
//! `corner{N}_decision1_direction` / `corner{N}_decision1_time`.

use crate::error::ComputeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Current schema version
pub const SCHEMA_VERSION: &str = "trial.raw_row.v1";

/// Accepted names for the participant identifier column
pub const PARTICIPANT_ID_COLUMNS: [&str; 4] = ["participant_id", "ID", "id", "Participant"];

/// Accepted names for the pre-task trust column
pub const TRUST_PRE_COLUMNS: [&str; 2] = ["trust_pre", "Trust_pre"];

/// Accepted names for the post-task trust column
pub const TRUST_POST_COLUMNS: [&str; 2] = ["trust_post", "Trust_post"];

/// Cell tokens that mean "no value"
const MISSING_TOKENS: [&str; 7] = ["", "nan", "na", "n/a", "null", "none", "-"];

/// Column holding the first-decision direction at a corner
pub fn direction_column(corner: u8) -> String {
    format!("corner{corner}_decision1_direction")
}

/// Column holding the first-decision latency at a corner
pub fn time_column(corner: u8) -> String {
    format!("corner{corner}_decision1_time")
}

/// Corner index of a `corner{N}_decision1_direction` or `..._time` column.
///
/// Other columns yield `Ok(None)`; a corner index of 0 or above 255 is an error.
pub fn corner_of_column(column: &str) -> Result<Option<u8>, ComputeError> {
    let Some((index, field)) = column
        .strip_prefix("corner")
        .and_then(|rest| rest.split_once("_decision1_"))
    else {
        return Ok(None);
    };
    if !matches!(field, "direction" | "time")
        || index.is_empty()
        || !index.bytes().all(|b| b.is_ascii_digit())
    {
        return Ok(None);
    }

    match index.parse::<u8>() {
        Ok(corner) if corner > 0 => Ok(Some(corner)),
        _ => Err(ComputeError::ParseError(format!(
            "column {column}: corner index must be between 1 and 255"
        ))),
    }
}

/// Tabular input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// Comma-separated values with a header row
    Csv,
    /// JSON array of row objects
    Json,
    /// Newline-delimited JSON, one row object per line
    Ndjson,
}

impl FromStr for InputFormat {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(InputFormat::Csv),
            "json" => Ok(InputFormat::Json),
            "ndjson" | "jsonl" => Ok(InputFormat::Ndjson),
            other => Err(ComputeError::ParseError(format!(
                "Unknown input format: {other}"
            ))),
        }
    }
}

/// A single table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Cell {
    /// Trimmed text content, or `None` for missing tokens
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Bool(b) => Some(b.to_string()),
            Cell::Number(n) if n.is_nan() => None,
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            Cell::Number(n) => Some(n.to_string()),
            Cell::Text(s) => {
                let trimmed = s.trim();
                if is_missing_token(trimmed) {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }

    /// Numeric content; missing cells are `Ok(None)`, unparseable text is an error
    pub fn as_number(&self) -> Result<Option<f64>, ComputeError> {
        match self {
            Cell::Null => Ok(None),
            Cell::Number(n) if n.is_nan() => Ok(None),
            Cell::Number(n) => Ok(Some(*n)),
            Cell::Bool(b) => Err(ComputeError::ParseError(format!(
                "Expected a number, found boolean {b}"
            ))),
            Cell::Text(_) => match self.as_text() {
                None => Ok(None),
                Some(text) => text.parse::<f64>().map(Some).map_err(|_| {
                    ComputeError::ParseError(format!("Expected a number, found {text:?}"))
                }),
            },
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text().unwrap_or_default())
    }
}

fn is_missing_token(s: &str) -> bool {
    MISSING_TOKENS.iter().any(|t| s.eq_ignore_ascii_case(t))
}

/// One row of the raw study table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow {
    cells: BTreeMap<String, Cell>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, cell: Cell) {
        self.cells.insert(column.into(), cell);
    }

    /// Builder-style insert
    pub fn with(mut self, column: impl Into<String>, cell: Cell) -> Self {
        self.insert(column, cell);
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }

    /// Text of the first listed column that holds a value
    pub fn text_any(&self, columns: &[&str]) -> Option<String> {
        columns
            .iter()
            .filter_map(|c| self.get(c))
            .find_map(Cell::as_text)
    }

    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).and_then(Cell::as_text)
    }

    /// Number in a column, with the column name attached to parse errors
    pub fn number(&self, column: &str) -> Result<Option<f64>, ComputeError> {
        match self.get(column) {
            None => Ok(None),
            Some(cell) => cell
                .as_number()
                .map_err(|e| ComputeError::ParseError(format!("column {column}: {e}"))),
        }
    }

    /// Number from the first listed column that holds a value
    pub fn number_any(&self, columns: &[&str]) -> Result<Option<f64>, ComputeError> {
        for column in columns {
            if let Some(value) = self.number(column)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
