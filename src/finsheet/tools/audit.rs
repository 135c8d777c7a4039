use serde::{Deserialize, Serialize};

use crate::finsheet::tools::error::Result;
use crate::finsheet::tools::model::{CellValue, RowIndex, Table};

/// Column headers of the table produced by [`AuditLog::to_table`].
pub const AUDIT_COLUMNS: [&str; 6] = [
    "Row Index",
    "Column Name",
    "Old Value",
    "New Value",
    "Notes Added",
    "Migrated To Column",
];

/// Before/after state of one processed cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    #[serde(rename = "Row Index")]
    pub row_index: RowIndex,
    #[serde(rename = "Column Name")]
    pub column_name: String,
    #[serde(rename = "Old Value")]
    pub old_value: CellValue,
    #[serde(rename = "New Value")]
    pub new_value: Option<f64>,
    #[serde(rename = "Notes Added")]
    pub notes_added: Option<String>,
    #[serde(rename = "Migrated To Column")]
    pub migrated_to_column: Option<String>,
}

/// Ordered audit trail of a reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditLog {
    records: Vec<AuditRecord>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: AuditRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records that moved a value into another column.
    pub fn migrations(&self) -> impl Iterator<Item = &AuditRecord> {
        self.records
            .iter()
            .filter(|record| record.migrated_to_column.is_some())
    }

    /// Materialises the log as a table with the [`AUDIT_COLUMNS`] header.
    pub fn to_table(&self) -> Result<Table> {
        let mut table = Table::new(AUDIT_COLUMNS)?;
        for record in &self.records {
            table.push_row(vec![
                CellValue::Number(record.row_index as f64),
                CellValue::Text(record.column_name.clone()),
                record.old_value.clone(),
                CellValue::from(record.new_value),
                optional_text(&record.notes_added),
                optional_text(&record.migrated_to_column),
            ])?;
        }
        Ok(table)
    }
}

fn optional_text(value: &Option<String>) -> CellValue {
    value
        .as_ref()
        .map(|text| CellValue::Text(text.clone()))
        .unwrap_or(CellValue::Missing)
}
