//! Financial line-item reconciliation.
//!
//! Each designated cell is split into its numeric part and its descriptive
//! text, converted from CAD when tagged as such, annotated in the row's notes
//! column, and copied into a canonical metric column when the text names one.
//! Every processed cell yields one [`AuditRecord`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use crate::finsheet::tools::audit::{AuditLog, AuditRecord};
use crate::finsheet::tools::error::{Result, ToolError};
use crate::finsheet::tools::model::{CellValue, Table};
use crate::finsheet::tools::normalize::{
    TargetColumnMap, clean_numeric_value, extract_text_content, is_cad_currency,
};

/// Rate applied to CAD-tagged values when none is configured.
pub const DEFAULT_CAD_TO_USD_RATE: f64 = 0.73;
/// Column collecting per-row annotations.
pub const DEFAULT_NOTES_COLUMN: &str = "Notes";
/// Fragment appended to the notes of a row whose value was converted.
pub const CAD_NOTE: &str = "originally stored as CAD";

const NOTE_SEPARATOR: &str = "; ";

/// What the audit log reports as "Notes Added" for a cell that produced no
/// note fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditNotesPolicy {
    /// Record the fragments of the current cell, or nothing.
    #[default]
    PerCell,
    /// Record the most recent fragment text produced earlier in the same run.
    /// This mirrors older audit sheets, whose "Notes Added" column leaked the
    /// previous cell's notes into cells that had none.
    CarryOver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileOptions {
    pub cad_to_usd_rate: f64,
    pub notes_column: String,
    pub targets: TargetColumnMap,
    pub audit_notes: AuditNotesPolicy,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            cad_to_usd_rate: DEFAULT_CAD_TO_USD_RATE,
            notes_column: DEFAULT_NOTES_COLUMN.to_string(),
            targets: TargetColumnMap::default(),
            audit_notes: AuditNotesPolicy::default(),
        }
    }
}

impl ReconcileOptions {
    pub fn with_rate(rate: f64) -> Self {
        Self {
            cad_to_usd_rate: rate,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.cad_to_usd_rate.is_finite() {
            return Err(ToolError::InvalidOption {
                name: "cad_to_usd_rate".into(),
                reason: format!("expected a finite number, got {}", self.cad_to_usd_rate),
            });
        }
        if self.notes_column.trim().is_empty() {
            return Err(ToolError::InvalidOption {
                name: "notes_column".into(),
                reason: "column name must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// Reconciles financial columns according to a fixed set of options. The
/// reconciler keeps no state between calls.
#[derive(Debug, Clone)]
pub struct FinancialReconciler {
    options: ReconcileOptions,
}

impl FinancialReconciler {
    pub fn new(options: ReconcileOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Processes `columns` of every row in place and returns the audit trail.
    ///
    /// Rows are visited in table order and, within a row, columns in the order
    /// given. Raw values are read from a copy of the row taken before any of
    /// its cells is rewritten, so a value relocated into a column that is
    /// processed later in the same row does not replace that column's own raw
    /// value. All listed columns must exist when the call starts.
    #[instrument(
        level = "info",
        skip_all,
        fields(rows = table.len(), columns = columns.len())
    )]
    pub fn reconcile<S: AsRef<str>>(&self, table: &mut Table, columns: &[S]) -> Result<AuditLog> {
        let targets = columns
            .iter()
            .map(|column| {
                let name = column.as_ref();
                table
                    .column_position(name)
                    .map(|position| (name, position))
                    .ok_or_else(|| ToolError::MissingColumn(name.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut audit = AuditLog::new();
        let mut last_notes: Option<String> = None;
        let mut converted = 0usize;
        let mut relocated = 0usize;

        for position in 0..table.len() {
            let row_index = table
                .row_index(position)
                .ok_or(ToolError::RowOutOfBounds(position))?;
            let snapshot = table
                .row(position)
                .ok_or(ToolError::RowOutOfBounds(position))?
                .to_vec();

            for &(column, column_position) in &targets {
                let raw = &snapshot[column_position];
                if raw.is_missing() {
                    continue;
                }

                let extracted_text = extract_text_content(raw);
                let is_cad = is_cad_currency(raw);
                let mut numeric_value = clean_numeric_value(raw);
                if is_cad && numeric_value.is_some() {
                    numeric_value = numeric_value.map(|value| value * self.options.cad_to_usd_rate);
                    converted += 1;
                }

                table.set_at(position, column_position, CellValue::from(numeric_value))?;

                let mut fragments = Vec::new();
                if !extracted_text.is_empty() {
                    fragments.push(format!("{column}: {extracted_text}"));
                }
                if is_cad {
                    fragments.push(CAD_NOTE.to_string());
                }

                let cell_notes = if fragments.is_empty() {
                    None
                } else {
                    let joined = fragments.join(NOTE_SEPARATOR);
                    self.append_note(table, position, &joined)?;
                    last_notes = Some(joined.clone());
                    Some(joined)
                };

                let target_column = match self.options.targets.resolve(&extracted_text) {
                    Some(target) => {
                        let target_position = table.ensure_column_ignore_case(target);
                        table.set_at(position, target_position, CellValue::from(numeric_value))?;
                        relocated += 1;
                        let target = table.columns()[target_position].clone();
                        debug!(row = row_index, %column, %target, "copied value into canonical column");
                        Some(target)
                    }
                    None => None,
                };

                let notes_added = match self.options.audit_notes {
                    AuditNotesPolicy::PerCell => cell_notes,
                    AuditNotesPolicy::CarryOver => last_notes.clone(),
                };

                trace!(row = row_index, %column, old = %raw, new = ?numeric_value, "cell reconciled");
                audit.push(AuditRecord {
                    row_index,
                    column_name: column.to_string(),
                    old_value: raw.clone(),
                    new_value: numeric_value,
                    notes_added,
                    migrated_to_column: target_column,
                });
            }
        }

        info!(
            processed = audit.len(),
            converted, relocated, "financial columns reconciled"
        );
        Ok(audit)
    }

    fn append_note(&self, table: &mut Table, position: usize, note: &str) -> Result<()> {
        let notes_position = table.ensure_column_ignore_case(&self.options.notes_column);
        let updated = match table.get_at(position, notes_position) {
            Some(current) if !current.is_missing() => {
                format!("{current}{NOTE_SEPARATOR}{note}")
            }
            _ => note.to_string(),
        };
        table.set_at(position, notes_position, CellValue::Text(updated))
    }
}

/// Reconciles `columns` of `table` with the default options and the given
/// CAD to USD rate. Returns the mutated table alongside the audit trail.
pub fn process_financial_table<'t, S: AsRef<str>>(
    table: &'t mut Table,
    columns: &[S],
    cad_to_usd_rate: f64,
) -> Result<(&'t mut Table, AuditLog)> {
    let reconciler = FinancialReconciler::new(ReconcileOptions::with_rate(cad_to_usd_rate))?;
    let audit = reconciler.reconcile(table, columns)?;
    Ok((table, audit))
}
