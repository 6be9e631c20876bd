//! Turns a raw weather payload into the feature table the estimator was trained on.
//!
//! The steps run in a fixed order:
//! 1. wrap the record(s) in a frame
//! 2. select the expected payload columns
//! 3. mean-fill nulls in [`MEAN_FILL_COLUMNS`]
//! 4. parse the timestamp
//! 5. drop the index placeholder, [`EXPLICIT_DROPS`] and anything matching [`DROP_SUBSTRINGS`]
//! 6. category-code the surviving pressure/degree columns
//! 7. derive `month` and `day`, reduce `time` to a clock-time category
//! 8. lay out calendar columns followed by the weather features, without `time`

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    error::PreprocessError,
    frame::{Cell, Column, Frame},
    model::FeatureTable,
    schema::{
        CALENDAR_COLUMNS, CATEGORICAL_SUBSTRINGS, DAY_COLUMN, DROP_SUBSTRINGS, EXPLICIT_DROPS,
        FEATURE_SUBSTRINGS, INDEX_COLUMN, MEAN_FILL_COLUMNS, MONTH_COLUMN, RAW_COLUMNS,
        TIMESTAMP_COLUMN, contains_any,
    },
};

/// Preprocess a single JSON-encoded record.
pub fn preprocess(data: &str) -> Result<FeatureTable, PreprocessError> {
    match serde_json::from_str::<Value>(data)? {
        Value::Object(record) => transform(&[record]),
        other => Err(PreprocessError::NotAnObject(json_kind(&other))),
    }
}

/// Preprocess a JSON array of records, or a single record.
pub fn preprocess_batch(data: &str) -> Result<FeatureTable, PreprocessError> {
    let value: Value = serde_json::from_str(data)?;
    preprocess_value(&value)
}

pub fn preprocess_value(value: &Value) -> Result<FeatureTable, PreprocessError> {
    let records = match value {
        Value::Object(record) => vec![record.clone()],
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_object()
                    .cloned()
                    .ok_or_else(|| PreprocessError::NotAnObject(json_kind(item)))
            })
            .collect::<Result<Vec<_>, _>>()?,
        other => return Err(PreprocessError::NotAnObject(json_kind(other))),
    };

    transform(&records)
}

fn transform(records: &[Map<String, Value>]) -> Result<FeatureTable, PreprocessError> {
    if records.is_empty() {
        return Err(PreprocessError::EmptyPayload);
    }

    let raw = Frame::from_records(records)?;
    let mut frame = raw.select(&RAW_COLUMNS)?;
    debug!(rows = frame.n_rows(), columns = RAW_COLUMNS.len(), "selected payload columns");

    for name in MEAN_FILL_COLUMNS {
        let mean = frame.fill_null_with_mean(name)?;
        debug!(column = name, ?mean, "filled nulls with column mean");
    }

    let timestamps = parse_timestamps(&frame)?;

    frame.drop_columns(&[INDEX_COLUMN]);
    frame.drop_columns(&EXPLICIT_DROPS);
    frame.drop_where(|name| contains_any(name, &DROP_SUBSTRINGS));
    debug!(remaining = frame.names().len(), "dropped unused columns");

    let categorical: Vec<String> = frame
        .names()
        .into_iter()
        .filter(|name| contains_any(name, &CATEGORICAL_SUBSTRINGS))
        .map(str::to_string)
        .collect();
    for name in &categorical {
        let categories = frame.categorical_codes(name)?;
        debug!(column = %name, categories, "encoded categorical column");
    }

    frame.push_column(Column::new(
        MONTH_COLUMN,
        timestamps.iter().map(|t| Cell::Number(f64::from(t.month()))).collect(),
    ));
    frame.push_column(Column::new(
        DAY_COLUMN,
        timestamps.iter().map(|t| Cell::Number(f64::from(t.day()))).collect(),
    ));
    frame.push_column(Column::new(
        TIMESTAMP_COLUMN,
        timestamps
            .iter()
            .map(|t| Cell::Text(t.time().format("%H:%M:%S%.f").to_string()))
            .collect(),
    ));
    frame.categorical_codes(TIMESTAMP_COLUMN)?;

    let columns: Vec<&str> = feature_layout(&frame.names())
        .into_iter()
        .filter(|name| *name != TIMESTAMP_COLUMN)
        .collect();
    let rows = frame.to_numeric(&columns)?;
    debug!(rows = rows.len(), columns = columns.len(), "built feature table");

    Ok(FeatureTable::new(columns.iter().map(|c| c.to_string()).collect(), rows))
}

/// Calendar columns first, then the weather feature columns, both in frame order.
fn feature_layout<'a>(names: &[&'a str]) -> Vec<&'a str> {
    let calendar = names.iter().filter(|name| CALENDAR_COLUMNS.contains(*name));
    let weather = names.iter().filter(|name| contains_any(name, &FEATURE_SUBSTRINGS));
    calendar.chain(weather).copied().collect()
}

fn parse_timestamps(frame: &Frame) -> Result<Vec<NaiveDateTime>, PreprocessError> {
    let column = frame
        .column(TIMESTAMP_COLUMN)
        .ok_or_else(|| PreprocessError::MissingColumn(TIMESTAMP_COLUMN.to_string()))?;

    column
        .values
        .iter()
        .map(|cell| {
            let parsed = match cell {
                Cell::Text(s) => parse_timestamp(s),
                _ => None,
            };
            parsed.ok_or_else(|| PreprocessError::InvalidTimestamp {
                column: TIMESTAMP_COLUMN.to_string(),
                value: cell.to_string(),
            })
        })
        .collect()
}

/// Parse the timestamp formats seen in exported weather data. Offsets are
/// discarded; the wall-clock time is kept.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

    let value = value.trim();

    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.naive_local()))
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
