use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

use crate::finsheet::tools::error::{Result, ToolError};
use crate::finsheet::tools::model::{CellValue, Table};

/// Reads a worksheet into a [`Table`]. The first row is the header; every
/// following row becomes a table row. When `sheet` is `None` the first sheet
/// of the workbook is used.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ToolError::MissingSheet("<first>".into()))?,
    };

    let range = read_required_sheet(&mut workbook, &sheet_name)?;
    let table = range_to_table(&range)?;
    debug!(sheet = %sheet_name, rows = table.len(), columns = table.columns().len(), "worksheet loaded");
    Ok(table)
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<calamine::Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::MissingSheet(name.to_string()))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

fn range_to_table(range: &calamine::Range<DataType>) -> Result<Table> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(position, cell)| header_name(position, cell))
        .collect();
    let width = columns.len();
    let mut table = Table::new(columns)?;

    for row in rows {
        let mut cells: Vec<CellValue> = row.iter().map(cell_to_value).collect();
        cells.resize(width, CellValue::Missing);
        if cells.iter().all(CellValue::is_missing) {
            continue;
        }
        table.push_row(cells)?;
    }

    Ok(table)
}

fn header_name(position: usize, cell: &DataType) -> String {
    match cell_to_value(cell) {
        CellValue::Missing => format!("Unnamed: {position}"),
        other => other.to_string(),
    }
}

fn cell_to_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::String(value) => CellValue::Text(value.clone()),
        DataType::Float(value) => CellValue::Number(*value),
        DataType::Int(value) => CellValue::Number(*value as f64),
        DataType::Bool(value) => CellValue::Text(value.to_string()),
        DataType::DateTime(serial) => excel_serial_to_text(*serial)
            .map(CellValue::Text)
            .unwrap_or(CellValue::Number(*serial)),
        DataType::Empty => CellValue::Missing,
        DataType::Error(error) => {
            warn!(?error, "spreadsheet error cell treated as missing");
            CellValue::Missing
        }
        other => CellValue::Text(other.to_string()),
    }
}

/// Excel stores dates as days since 1899-12-30 with the time of day as the
/// fractional part.
fn excel_serial_to_text(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    let timestamp = epoch.checked_add_signed(Duration::try_seconds(seconds)?)?;
    if serial.fract() == 0.0 {
        Some(timestamp.format("%Y-%m-%d").to_string())
    } else {
        Some(timestamp.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}
