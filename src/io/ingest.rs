//! CSV ingest.
//!
//! Turns a CDC-style case/death export into a `Vec<Record>`. Only three
//! columns matter (`state`, `submission_date`, `new_death`); everything else
//! is ignored.
//!
//! Unlike a validation pipeline, ingest is all-or-nothing: the first row that
//! cannot be parsed aborts the load with its line number (exit code 2).

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::debug;

use crate::domain::Record;
use crate::error::AppError;

const COL_STATE: &str = "state";
const COL_DATE: &str = "submission_date";
const COL_DEATHS: &str = "new_death";

/// Date layouts accepted in `submission_date`.
const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];

/// Load records from a CSV file.
pub fn load_dataset(path: &Path) -> Result<Vec<Record>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let records = read_dataset(file)?;
    debug!(path = %path.display(), records = records.len(), "loaded dataset");
    Ok(records)
}

/// Read records from any CSV source.
pub fn read_dataset<R: Read>(source: R) -> Result<Vec<Record>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for required in [COL_STATE, COL_DATE, COL_DEATHS] {
        if !header_map.contains_key(required) {
            return Err(AppError::new(2, format!("Missing required column: `{required}`")));
        }
    }

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header line, CSV lines are 1-based.
        let line = idx + 2;
        let row = result.map_err(|e| AppError::new(2, format!("CSV parse error on line {line}: {e}")))?;
        let record =
            parse_row(&row, &header_map).map_err(|msg| AppError::new(2, format!("Line {line}: {msg}")))?;
        records.push(record);
    }

    Ok(records)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<Record, String> {
    let key = get_required(record, header_map, COL_STATE)?.to_string();
    let date = parse_date(get_required(record, header_map, COL_DATE)?)?;
    let delta = get_optional(record, header_map, COL_DEATHS)
        .map(parse_count)
        .transpose()?;
    Ok(Record { key, date, delta })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    get_optional(record, header_map, name).ok_or_else(|| format!("Missing `{name}` value."))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = *header_map.get(name)?;
    record.get(idx).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // Some exports append a midnight timestamp ("01/22/2020 12:00:00 AM").
    let date_part = s.split_whitespace().next().unwrap_or(s);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .ok_or_else(|| format!("Invalid `{COL_DATE}` value: {s:?}"))
}

fn parse_count(s: &str) -> Result<i64, String> {
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    // Float-typed exports write whole counts as "3.0".
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
        _ => Err(format!("Invalid `{COL_DEATHS}` value: {s:?}")),
    }
}
