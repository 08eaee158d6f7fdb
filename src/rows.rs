use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::MalformedInput;

/// Role tag marking a rally-boundary record.
pub const RALLY_ROW: &str = "RALLY";

pub const COL_ROLE: &str = "Row";
pub const COL_OUTCOME: &str = "OUTCOME";
pub const COL_PLAYER: &str = "PLAYER'S NAME";
pub const COL_STROKE: &str = "Stroke";
pub const COL_DIRECTION: &str = "Shot Direction";
pub const COL_START_TIME: &str = "Start time";
pub const COL_DURATION: &str = "Duration";
pub const COL_INSTANCE: &str = "Instance number";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutcomeKind {
    Winner,
    Error,
}

/// One record of the tagged export. Optional fields are `None` when the cell
/// is empty, so a stroke literally named "None" stays distinguishable from an
/// absent stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    /// 1-based line in the source file, carried for error reporting.
    pub line: usize,
    pub role: String,
    pub outcome: Option<OutcomeKind>,
    pub player: Option<String>,
    pub stroke: Option<String>,
    pub direction: Option<String>,
    pub start_time: f64,
    pub duration: Option<f64>,
    pub instance_number: Option<u32>,
}

impl EventRow {
    pub fn is_rally_boundary(&self) -> bool {
        self.role == RALLY_ROW
    }
}

struct Columns {
    role: usize,
    outcome: usize,
    player: usize,
    stroke: usize,
    direction: usize,
    start_time: usize,
    duration: usize,
    instance: usize,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Columns, MalformedInput> {
        Ok(Columns {
            role: column_index(headers, COL_ROLE)?,
            outcome: column_index(headers, COL_OUTCOME)?,
            player: column_index(headers, COL_PLAYER)?,
            stroke: column_index(headers, COL_STROKE)?,
            direction: column_index(headers, COL_DIRECTION)?,
            start_time: column_index(headers, COL_START_TIME)?,
            duration: column_index(headers, COL_DURATION)?,
            instance: column_index(headers, COL_INSTANCE)?,
        })
    }
}

fn column_index(
    headers: &csv::StringRecord,
    name: &'static str,
) -> Result<usize, MalformedInput> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or(MalformedInput::MissingColumn(name))
}

/// Parse the whole export into event rows. Column order is irrelevant; fields
/// are looked up by header name. Row order is whatever the file supplies; the
/// segmenter sorts by start time itself.
pub fn parse_event_rows<R: Read>(input: R) -> Result<Vec<EventRow>, MalformedInput> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|err| MalformedInput::UnreadableRecord {
            line: 1,
            message: err.to_string(),
        })?
        .clone();
    let columns = Columns::resolve(&headers)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| MalformedInput::UnreadableRecord {
            line: err
                .position()
                .map(|pos| pos.line() as usize)
                .unwrap_or_default(),
            message: err.to_string(),
        })?;
        let line = record
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or_default();
        rows.push(parse_record(&record, &columns, line)?);
    }

    log::debug!("parsed {} event rows", rows.len());
    Ok(rows)
}

/// Convenience wrapper for callers holding the export in memory, which is how
/// uploads arrive from the transport layer.
pub fn parse_event_rows_str(raw: &str) -> Result<Vec<EventRow>, MalformedInput> {
    parse_event_rows(raw.as_bytes())
}

fn parse_record(
    record: &csv::StringRecord,
    columns: &Columns,
    line: usize,
) -> Result<EventRow, MalformedInput> {
    let role = cell(record, columns.role)
        .ok_or(MalformedInput::MissingField {
            line,
            field: COL_ROLE,
        })?
        .to_string();

    let outcome = match cell(record, columns.outcome) {
        None => None,
        Some("WINNER") => Some(OutcomeKind::Winner),
        Some("ERROR") => Some(OutcomeKind::Error),
        Some(other) => {
            return Err(MalformedInput::UnknownOutcome {
                line,
                value: other.to_string(),
            });
        }
    };

    let start_time = require_f64(record, columns.start_time, COL_START_TIME, line)?;
    let is_boundary = role == RALLY_ROW;

    let duration = parse_opt_f64(record, columns.duration, COL_DURATION, line)?;
    let instance_number = parse_opt_u32(record, columns.instance, COL_INSTANCE, line)?;
    if is_boundary {
        if duration.is_none() {
            return Err(MalformedInput::MissingField {
                line,
                field: COL_DURATION,
            });
        }
        if instance_number.is_none() {
            return Err(MalformedInput::MissingField {
                line,
                field: COL_INSTANCE,
            });
        }
    }

    Ok(EventRow {
        line,
        role,
        outcome,
        player: cell(record, columns.player).map(str::to_string),
        stroke: cell(record, columns.stroke).map(str::to_string),
        direction: cell(record, columns.direction).map(str::to_string),
        start_time,
        duration,
        instance_number,
    })
}

fn cell(record: &csv::StringRecord, idx: usize) -> Option<&str> {
    match record.get(idx).map(str::trim) {
        Some("") | None => None,
        Some(value) => Some(value),
    }
}

fn require_f64(
    record: &csv::StringRecord,
    idx: usize,
    field: &'static str,
    line: usize,
) -> Result<f64, MalformedInput> {
    let raw = cell(record, idx).ok_or(MalformedInput::MissingField { line, field })?;
    parse_finite_f64(raw).ok_or_else(|| MalformedInput::InvalidNumber {
        line,
        field,
        value: raw.to_string(),
    })
}

fn parse_opt_f64(
    record: &csv::StringRecord,
    idx: usize,
    field: &'static str,
    line: usize,
) -> Result<Option<f64>, MalformedInput> {
    let Some(raw) = cell(record, idx) else {
        return Ok(None);
    };
    parse_finite_f64(raw)
        .map(Some)
        .ok_or_else(|| MalformedInput::InvalidNumber {
            line,
            field,
            value: raw.to_string(),
        })
}

fn parse_opt_u32(
    record: &csv::StringRecord,
    idx: usize,
    field: &'static str,
    line: usize,
) -> Result<Option<u32>, MalformedInput> {
    let Some(raw) = cell(record, idx) else {
        return Ok(None);
    };
    // Some taggers export integer columns as floats ("3.0").
    let parsed = raw
        .parse::<u32>()
        .ok()
        .or_else(|| parse_finite_f64(raw).and_then(to_whole_u32));
    parsed.map(Some).ok_or_else(|| MalformedInput::InvalidNumber {
        line,
        field,
        value: raw.to_string(),
    })
}

fn parse_finite_f64(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn to_whole_u32(v: f64) -> Option<u32> {
    if v.fract() == 0.0 && v >= 0.0 && v <= u32::MAX as f64 {
        Some(v as u32)
    } else {
        None
    }
}
