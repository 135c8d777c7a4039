use std::path::{Path, PathBuf};

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::finsheet::tools::audit::AuditLog;
use crate::finsheet::tools::error::{Result, ToolError};
use crate::finsheet::tools::io::{audit_json, excel_read, excel_write};
use crate::finsheet::tools::model::{CellValue, Table};
use crate::finsheet::tools::normalize::{
    ColumnType, clean_dash_text, clean_phone, cleanse_column_names, modernize_nulls, parse_date,
    update_data_types,
};
use crate::finsheet::tools::reconcile::{FinancialReconciler, ReconcileOptions};

/// Sheet holding the cleaned table in the output workbook.
pub const DATA_SHEET: &str = "Data";
/// Sheet holding the audit trail in the output workbook.
pub const AUDIT_SHEET: &str = "Audit";

const DATE_OUTPUT_FORMAT: &str = "%Y-%m-%d";
const DATETIME_OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Describes which cleanup steps apply to which columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanPlan {
    /// Worksheet to read; the first sheet when absent.
    pub sheet: Option<String>,
    pub column_types: Vec<(String, ColumnType)>,
    pub date_columns: Vec<String>,
    pub dash_columns: Vec<String>,
    pub phone_columns: Vec<String>,
    pub financial_columns: Vec<String>,
    pub reconcile: ReconcileOptions,
    /// Optional path receiving the audit trail as JSON.
    pub audit_json: Option<PathBuf>,
}

impl CleanPlan {
    /// Loads a plan from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ToolError::MissingInput(path.to_path_buf()));
        }
        let source = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&source)?)
    }
}

/// Counters reported once a workbook has been cleaned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CleanSummary {
    pub rows: usize,
    pub columns: usize,
    pub audited_cells: usize,
    pub migrated_cells: usize,
}

/// Runs every cleanup step of `plan` over an in-memory table, in order:
/// column names, null markers, type coercion, dates, dash text, phone
/// numbers, then financial reconciliation.
#[instrument(level = "debug", skip_all, fields(rows = table.len()))]
pub fn clean_table(table: &mut Table, plan: &CleanPlan) -> Result<AuditLog> {
    let reconciler = FinancialReconciler::new(plan.reconcile.clone())?;

    cleanse_column_names(table)?;
    modernize_nulls(table);
    update_data_types(table, &plan.column_types)?;

    for column in &plan.date_columns {
        table.map_column(column, format_date)?;
    }
    for column in &plan.dash_columns {
        table.map_column(column, clean_dash_text)?;
    }
    for column in &plan.phone_columns {
        table.map_column(column, clean_phone)?;
    }
    debug!("field normalizers applied");

    reconciler.reconcile(table, plan.financial_columns.as_slice())
}

/// Reads a workbook, cleans it according to `plan` and writes the cleaned
/// table plus its audit trail to `output`.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn clean_workbook(input: &Path, output: &Path, plan: &CleanPlan) -> Result<CleanSummary> {
    let mut table = excel_read::read_table(input, plan.sheet.as_deref())?;
    info!(row_count = table.len(), "read table from workbook");

    let audit = clean_table(&mut table, plan)?;
    let audit_table = audit.to_table()?;
    excel_write::write_tables(output, &[(DATA_SHEET, &table), (AUDIT_SHEET, &audit_table)])?;

    if let Some(path) = &plan.audit_json {
        audit_json::write_audit_json(path, &audit)?;
        debug!(path = %path.display(), "audit trail written as JSON");
    }

    Ok(CleanSummary {
        rows: table.len(),
        columns: table.columns().len(),
        audited_cells: audit.len(),
        migrated_cells: audit.migrations().count(),
    })
}

fn format_date(value: &CellValue) -> CellValue {
    match parse_date(value) {
        Some(parsed) if parsed.num_seconds_from_midnight() == 0 => {
            CellValue::Text(parsed.format(DATE_OUTPUT_FORMAT).to_string())
        }
        Some(parsed) => CellValue::Text(parsed.format(DATETIME_OUTPUT_FORMAT).to_string()),
        None => CellValue::Missing,
    }
}
