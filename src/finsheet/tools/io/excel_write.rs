use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet};

use crate::finsheet::tools::error::{Result, ToolError};
use crate::finsheet::tools::model::{CellValue, Table};

/// Writes each `(sheet name, table)` pair as a worksheet of a new workbook.
///
/// Excel tables compare header names without regard to case, so every table
/// is checked for such clashes before anything is written.
pub fn write_tables(path: &Path, tables: &[(&str, &Table)]) -> Result<()> {
    for (_, table) in tables {
        check_headers(table)?;
    }

    let mut workbook_writer = Workbook::new();

    for (sheet_name, table) in tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(*sheet_name)?;
        write_sheet(worksheet, table)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}

fn write_sheet(worksheet: &mut Worksheet, table: &Table) -> Result<()> {
    for (col_idx, header) in table.columns().iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, header)?;
    }

    for (row_idx, (_, cells)) in table.rows().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        for (col_idx, cell) in cells.iter().enumerate() {
            match cell {
                CellValue::Number(value) if value.is_finite() => {
                    worksheet.write_number(excel_row, col_idx as u16, *value)?;
                }
                CellValue::Text(value) => {
                    worksheet.write_string(excel_row, col_idx as u16, value)?;
                }
                _ => {}
            }
        }
    }

    if table.columns().is_empty() || table.is_empty() {
        return Ok(());
    }

    let mut excel_table = rust_xlsxwriter::Table::new();
    excel_table.set_autofilter(true);
    let col_end = (table.columns().len() as u16).saturating_sub(1);
    worksheet.add_table(0, 0, table.len() as u32, col_end, &excel_table)?;
    Ok(())
}

fn check_headers(table: &Table) -> Result<()> {
    let mut seen: Vec<String> = Vec::with_capacity(table.columns().len());
    for column in table.columns() {
        let folded = column.to_lowercase();
        if seen.contains(&folded) {
            return Err(ToolError::DuplicateColumn(column.clone()));
        }
        seen.push(folded);
    }
    Ok(())
}
