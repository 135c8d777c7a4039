use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::finsheet::tools::error::{Result, ToolError};
use crate::finsheet::tools::model::{CellValue, Table};

/// Text markers spreadsheets commonly use in place of an empty cell.
pub const NULL_TOKENS: [&str; 5] = ["N/A", "NA", "None", "-", ""];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%m/%d/%y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

fn leading_dash_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-\s*").expect("invalid leading dash regex"))
}

fn inner_dash_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*-\s*").expect("invalid inner dash regex"))
}

fn non_digit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\D").expect("invalid non-digit regex"))
}

/// Trims column names and removes embedded line breaks.
pub fn cleanse_column_names(table: &mut Table) -> Result<()> {
    table.rename_columns(|name| name.trim().replace('\n', ""))
}

/// Replaces null-like text markers and NaN numbers with [`CellValue::Missing`].
pub fn modernize_nulls(table: &mut Table) {
    table.map_cells(|cell| match cell {
        CellValue::Text(text) if NULL_TOKENS.contains(&text.as_str()) => Some(CellValue::Missing),
        CellValue::Number(number) if number.is_nan() => Some(CellValue::Missing),
        _ => None,
    });
}

/// Target type for [`update_data_types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Float,
    Integer,
    Text,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Float => write!(f, "float"),
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Text => write!(f, "text"),
        }
    }
}

/// Coerces each listed column to the requested type, in list order.
///
/// Missing cells stay missing. The first value that cannot be converted
/// aborts the call with [`ToolError::TypeCoercion`]; columns converted before
/// it keep their new values.
pub fn update_data_types(table: &mut Table, types: &[(String, ColumnType)]) -> Result<()> {
    for (column, column_type) in types {
        debug!(%column, %column_type, "coercing column");
        table.try_map_column(column, |value| coerce(column, value, *column_type))?;
    }
    Ok(())
}

fn coerce(column: &str, value: &CellValue, target: ColumnType) -> Result<CellValue> {
    let failure = || ToolError::TypeCoercion {
        column: column.to_string(),
        value: value.to_string(),
        target: target.to_string(),
    };

    Ok(match (target, value) {
        (_, CellValue::Missing) => CellValue::Missing,
        (ColumnType::Float, CellValue::Number(number)) => CellValue::Number(*number),
        (ColumnType::Float, CellValue::Text(text)) => {
            CellValue::Number(text.trim().parse::<f64>().map_err(|_| failure())?)
        }
        (ColumnType::Integer, CellValue::Number(number)) => {
            if !number.is_finite() {
                return Err(failure());
            }
            CellValue::Number(number.trunc())
        }
        (ColumnType::Integer, CellValue::Text(text)) => {
            let trimmed = text.trim();
            match trimmed.parse::<i64>() {
                Ok(integer) => CellValue::from(integer),
                Err(_) => {
                    let number = trimmed.parse::<f64>().map_err(|_| failure())?;
                    if !number.is_finite() {
                        return Err(failure());
                    }
                    CellValue::Number(number.trunc())
                }
            }
        }
        (ColumnType::Text, other) => CellValue::Text(other.to_string()),
    })
}

/// Parses dates typed inconsistently in spreadsheets.
///
/// Full timestamps and plain dates in the usual ISO, US and long forms are
/// accepted, as is the abbreviated month-year form (`Mar-21`), which resolves
/// to the first day of that month. Anything else yields `None`.
pub fn parse_date(value: &CellValue) -> Option<NaiveDateTime> {
    let CellValue::Text(text) = value else {
        return None;
    };
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.naive_utc());
    }
    if let Some(parsed) = DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
    {
        return Some(parsed);
    }
    if let Some(parsed) = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
    {
        return parsed.and_hms_opt(0, 0, 0);
    }

    NaiveDate::parse_from_str(&format!("01-{text}"), "%d-%b-%y")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Rewrites dash-separated spreadsheet text as a comma-separated list.
pub fn clean_dash_text(value: &CellValue) -> CellValue {
    if value.is_missing() {
        return CellValue::Missing;
    }

    let text = value.to_string();
    let text = text.trim();
    let text = leading_dash_re().replace(text, "");
    let text = inner_dash_re().replace_all(&text, ", ");
    CellValue::Text(text.trim().to_string())
}

/// Keeps only the digits of a phone number.
pub fn clean_phone(value: &CellValue) -> CellValue {
    if value.is_missing() {
        return CellValue::Missing;
    }
    CellValue::Text(non_digit_re().replace_all(&value.to_string(), "").into_owned())
}
