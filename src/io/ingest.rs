//! CSV ingest of annual peak-flow records.
//!
//! Turns a CSV with a flow column (and optionally a `year` or `date` column) into
//! a validated `Sample`.
//!
//! - Header lookup is case-insensitive and tolerant of a UTF-8 BOM.
//! - Missing flow column is a schema error (exit code 2).
//! - Bad rows are skipped and reported; an empty result is exit code 3.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use csv::StringRecord;
use tracing::warn;

use crate::data::{Observation, Sample};
use crate::error::AppError;

/// Flow columns tried in order when `--column` is not given.
pub const FLOW_COLUMNS: [&str; 5] = ["flow", "peak", "q", "discharge", "value"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the sample plus bookkeeping for the run summary.
#[derive(Debug, Clone)]
pub struct IngestedSample {
    pub sample: Sample,
    pub flow_column: String,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

pub fn load_sample(path: &Path, column: Option<&str>) -> Result<IngestedSample, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_sample(file, column)
}

pub fn read_sample<R: Read>(input: R, column: Option<&str>) -> Result<IngestedSample, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    let flow_column = resolve_flow_column(column, &header_map)?;

    let mut observations = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &header_map, &flow_column));
        match parsed {
            Ok(obs) => observations.push(obs),
            Err(message) => {
                warn!(line, %message, "skipping CSV row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    if observations.is_empty() {
        return Err(AppError::new(
            3,
            format!("No valid rows in column `{flow_column}` ({rows_read} rows read)."),
        ));
    }

    let sample = Sample::from_observations(&observations)?;
    Ok(IngestedSample {
        sample,
        flow_column,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn resolve_flow_column(column: Option<&str>, header_map: &HashMap<String, usize>) -> Result<String, AppError> {
    if let Some(column) = column {
        let name = normalize_header_name(column);
        return if header_map.contains_key(&name) {
            Ok(name)
        } else {
            Err(AppError::new(2, format!("Missing column given by `--column`: `{column}`")))
        };
    }

    FLOW_COLUMNS
        .iter()
        .find(|name| header_map.contains_key(**name))
        .map(|name| name.to_string())
        .ok_or_else(|| {
            AppError::new(
                2,
                format!(
                    "No flow column found; expected one of {} or pass `--column`.",
                    FLOW_COLUMNS.map(|c| format!("`{c}`")).join(", ")
                ),
            )
        })
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>, flow_column: &str) -> Result<Observation, String> {
    let raw = get_optional(record, header_map, flow_column)
        .ok_or_else(|| format!("Missing `{flow_column}` value."))?;
    let flow = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{flow_column}` value '{raw}'."))?;
    if !(flow.is_finite() && flow > 0.0) {
        return Err(format!("`{flow_column}` must be finite and > 0, got {flow}."));
    }

    let year = match get_optional(record, header_map, "year") {
        Some(s) => Some(s.parse::<i32>().map_err(|_| format!("Invalid `year` '{s}'."))?),
        None => get_optional(record, header_map, "date")
            .map(parse_date)
            .transpose()?
            .map(|d| d.year()),
    };

    Ok(Observation { flow, year })
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}
