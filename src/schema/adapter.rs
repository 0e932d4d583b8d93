//! Raw row adapter
//!
//! Parses tabular input (CSV, JSON array, NDJSON) into [`RawRow`]s and adapts
//! rows into [`ParticipantRecord`]s according to a [`StudyConfig`].

use super::raw_row::{
    corner_of_column, direction_column, time_column, Cell, InputFormat, RawRow,
    PARTICIPANT_ID_COLUMNS, TRUST_POST_COLUMNS, TRUST_PRE_COLUMNS,
};
use crate::config::StudyConfig;
use crate::error::ComputeError;
use crate::features::TrialMetricsDeriver;
use crate::types::{CornerEvent, Direction, ParticipantRecord};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Adapter for raw study tables
pub struct RecordAdapter;

impl RecordAdapter {
    /// Parse input in the given format
    pub fn parse(input: &str, format: InputFormat) -> Result<Vec<RawRow>, ComputeError> {
        match format {
            InputFormat::Csv => Self::parse_csv(input),
            InputFormat::Json => Self::parse_array(input),
            InputFormat::Ndjson => Self::parse_ndjson(input),
        }
    }

    /// Parse a JSON array of row objects
    pub fn parse_array(json: &str) -> Result<Vec<RawRow>, ComputeError> {
        serde_json::from_str(json)
            .map_err(|e| ComputeError::ParseError(format!("Failed to parse JSON array: {e}")))
    }

    /// Parse newline-delimited JSON rows
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<RawRow>, ComputeError> {
        let mut rows = Vec::new();

        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let row: RawRow = serde_json::from_str(trimmed).map_err(|e| {
                ComputeError::ParseError(format!(
                    "Failed to parse row at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;
            rows.push(row);
        }

        Ok(rows)
    }

    /// Parse CSV text with a header row. Quoted fields may contain commas,
    /// doubled quotes and line breaks.
    pub fn parse_csv(text: &str) -> Result<Vec<RawRow>, ComputeError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut records = split_csv(text)?.into_iter();

        let header = match records.next() {
            Some((_, header)) => header,
            None => return Ok(Vec::new()),
        };
        let header: Vec<String> = header.into_iter().map(|h| h.trim().to_string()).collect();
        let mut seen = HashSet::new();
        for column in &header {
            if !seen.insert(column.as_str()) {
                let what = match corner_of_column(column)? {
                    Some(corner) => format!("corner {corner} column {column}"),
                    None => format!("column {column}"),
                };
                return Err(ComputeError::ParseError(format!(
                    "CSV header: {what} appears more than once"
                )));
            }
        }

        let mut rows = Vec::new();
        for (line, fields) in records {
            if fields.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            if fields.len() != header.len() {
                return Err(ComputeError::ParseError(format!(
                    "CSV line {line}: expected {} fields, found {}",
                    header.len(),
                    fields.len()
                )));
            }
            let row = header
                .iter()
                .zip(fields)
                .fold(RawRow::new(), |row, (column, value)| {
                    row.with(column.clone(), Cell::Text(value))
                });
            rows.push(row);
        }

        Ok(rows)
    }

    /// Adapt one row into a participant record.
    ///
    /// Every `corner{N}_decision1_*` column in the row is picked up. A corner
    /// with neither column present contributes no event; present-but-empty
    /// cells become missing entries. Data at a corner the layout has no
    /// reference entry for is a [`ComputeError::ConfigurationError`].
    pub fn to_record(
        row: &RawRow,
        config: &StudyConfig,
    ) -> Result<ParticipantRecord, ComputeError> {
        let participant_id = row
            .text_any(&PARTICIPANT_ID_COLUMNS)
            .ok_or_else(|| ComputeError::MissingField("participant_id".to_string()))?;

        let condition = row
            .text_any(&[config.condition_column.as_str(), "condition"])
            .ok_or_else(|| ComputeError::MissingField(config.condition_column.clone()))?;
        config.check_condition(&condition)?;

        let mut corners = BTreeSet::new();
        for column in row.columns() {
            if let Some(corner) = corner_of_column(column)? {
                corners.insert(corner);
            }
        }

        let mut corner_events = Vec::with_capacity(corners.len());
        for corner in corners {
            let direction = parse_direction(row, &direction_column(corner))?;
            let latency = parse_latency(row, &time_column(corner))?;
            let event = CornerEvent::new(corner, direction, latency);
            if !event.is_missing() {
                config.layout.reference(corner)?;
            }
            corner_events.push(event);
        }

        let mut covariates = BTreeMap::new();
        for column in &config.covariates {
            if let Some(value) = row.number(column)? {
                covariates.insert(column.clone(), value);
            }
        }

        Ok(ParticipantRecord {
            participant_id,
            condition,
            corner_events,
            trust_pre: row.number_any(&TRUST_PRE_COLUMNS)?,
            trust_post: row.number_any(&TRUST_POST_COLUMNS)?,
            covariates,
        })
    }

    /// Adapt every row, rejecting duplicate participant ids
    pub fn to_records(
        rows: &[RawRow],
        config: &StudyConfig,
    ) -> Result<Vec<ParticipantRecord>, ComputeError> {
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(rows.len());

        for row in rows {
            let record = Self::to_record(row, config)?;
            if !seen.insert(record.participant_id.clone()) {
                return Err(ComputeError::DuplicateParticipant(record.participant_id));
            }
            records.push(record);
        }

        log::info!("adapted {} participant records", records.len());
        Ok(records)
    }

    /// Validate every row without stopping at the first failure.
    ///
    /// Rows are adapted and run through the deriver so that reference-table
    /// gaps surface here too. Only failing rows are returned.
    pub fn validate_rows(rows: &[RawRow], config: &StudyConfig) -> Vec<ValidationResult> {
        let mut seen = HashSet::new();

        rows.iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let participant_id = row.text_any(&PARTICIPANT_ID_COLUMNS);
                let outcome = Self::to_record(row, config).and_then(|record| {
                    if !seen.insert(record.participant_id.clone()) {
                        return Err(ComputeError::DuplicateParticipant(record.participant_id));
                    }
                    TrialMetricsDeriver::derive(&record, &config.layout).map(|_| ())
                });

                outcome.err().map(|error| {
                    log::warn!("row {index}: {error}");
                    ValidationResult {
                        index,
                        participant_id,
                        error,
                    }
                })
            })
            .collect()
    }
}

/// A row that failed validation
#[derive(Debug)]
pub struct ValidationResult {
    /// Zero-based row index (header excluded)
    pub index: usize,
    pub participant_id: Option<String>,
    pub error: ComputeError,
}

fn parse_direction(row: &RawRow, column: &str) -> Result<Option<Direction>, ComputeError> {
    row.text(column)
        .map(|raw| {
            raw.parse::<Direction>().map_err(|_| {
                ComputeError::ParseError(format!("column {column}: unknown direction {raw:?}"))
            })
        })
        .transpose()
}

fn parse_latency(row: &RawRow, column: &str) -> Result<Option<f64>, ComputeError> {
    match row.number(column)? {
        Some(value) if !value.is_finite() || value < 0.0 => Err(ComputeError::ParseError(
            format!("column {column}: latency must be a non-negative number, found {value}"),
        )),
        other => Ok(other),
    }
}

/// Split CSV text into records of fields, each tagged with its 1-based
/// starting line.
fn split_csv(text: &str) -> Result<Vec<(usize, Vec<String>)>, ComputeError> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                fields.push(std::mem::take(&mut field));
                records.push((record_line, std::mem::take(&mut fields)));
                line += 1;
                record_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(ComputeError::ParseError(format!(
            "CSV line {record_line}: unterminated quoted field"
        )));
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        records.push((record_line, fields));
    }

    Ok(records)
}
