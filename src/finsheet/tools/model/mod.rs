use std::fmt;

use serde::{Deserialize, Serialize};

use crate::finsheet::tools::error::{Result, ToolError};

/// Stable identity of a row. It is assigned when the row enters the table and
/// never changes, regardless of the columns added later on.
pub type RowIndex = usize;

/// A single spreadsheet cell. The set of variants is closed on purpose so
/// every normalizer handles each shape explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    /// Absent value. Serialised as JSON `null`.
    #[default]
    Missing,
    /// Floating point number.
    Number(f64),
    /// Free text, possibly with an embedded number or currency tag.
    Text(String),
}

impl CellValue {
    /// Returns `true` for [`CellValue::Missing`] and for numbers holding NaN.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Missing => true,
            CellValue::Number(value) => value.is_nan(),
            CellValue::Text(_) => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) if !value.is_nan() => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Missing => Ok(()),
            CellValue::Number(value) => write!(f, "{value}"),
            CellValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<Option<f64>> for CellValue {
    fn from(value: Option<f64>) -> Self {
        value.map(CellValue::Number).unwrap_or(CellValue::Missing)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// Ordered, column-named table. Rows are stored positionally and columns are
/// only ever appended, so a row position stays valid while new columns are
/// created during a traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
    next_index: RowIndex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Row {
    index: RowIndex,
    cells: Vec<CellValue>,
}

impl Table {
    /// Creates an empty table with the provided header.
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Table::default();
        for column in columns {
            let column = column.into();
            if table.has_column(&column) {
                return Err(ToolError::DuplicateColumn(column));
            }
            table.columns.push(column);
        }
        Ok(table)
    }

    /// Creates a table and fills it with the provided rows.
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<CellValue>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Table::new(columns)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Appends a row and returns the index assigned to it.
    pub fn push_row(&mut self, cells: Vec<CellValue>) -> Result<RowIndex> {
        if cells.len() != self.columns.len() {
            return Err(ToolError::RowWidth {
                expected: self.columns.len(),
                actual: cells.len(),
            });
        }
        let index = self.next_index;
        self.next_index += 1;
        self.rows.push(Row { index, cells });
        Ok(index)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_position(name).is_some()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Returns the position of `name`, appending a column of missing values
    /// when it does not exist yet. Calling it repeatedly is harmless.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(position) = self.column_position(name) {
            return position;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.cells.push(CellValue::Missing);
        }
        self.columns.len() - 1
    }

    /// Like [`Table::ensure_column`], but an existing column whose name only
    /// differs in case is reused. Spreadsheet tables treat such names as the
    /// same header.
    pub fn ensure_column_ignore_case(&mut self, name: &str) -> usize {
        let folded = name.to_lowercase();
        match self
            .columns
            .iter()
            .position(|column| column.to_lowercase() == folded)
        {
            Some(position) => position,
            None => self.ensure_column(name),
        }
    }

    /// Stable index of the row stored at `position`.
    pub fn row_index(&self, position: usize) -> Option<RowIndex> {
        self.rows.get(position).map(|row| row.index)
    }

    /// Cells of the row stored at `position`, in column order.
    pub fn row(&self, position: usize) -> Option<&[CellValue]> {
        self.rows.get(position).map(|row| row.cells.as_slice())
    }

    /// Iterates rows as `(row index, cells)` pairs in table order.
    pub fn rows(&self) -> impl Iterator<Item = (RowIndex, &[CellValue])> {
        self.rows.iter().map(|row| (row.index, row.cells.as_slice()))
    }

    pub fn get(&self, position: usize, column: &str) -> Option<&CellValue> {
        let column = self.column_position(column)?;
        self.rows.get(position)?.cells.get(column)
    }

    pub(crate) fn set_at(&mut self, position: usize, column: usize, value: CellValue) -> Result<()> {
        let row = self
            .rows
            .get_mut(position)
            .ok_or(ToolError::RowOutOfBounds(position))?;
        match row.cells.get_mut(column) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(ToolError::ColumnOutOfBounds(column)),
        }
    }

    pub(crate) fn get_at(&self, position: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(position)?.cells.get(column)
    }

    /// Replaces every value of `column` with the result of `mapper`.
    pub fn map_column<F>(&mut self, column: &str, mut mapper: F) -> Result<()>
    where
        F: FnMut(&CellValue) -> CellValue,
    {
        self.try_map_column(column, |value| Ok(mapper(value)))
    }

    /// Fallible variant of [`Table::map_column`]. The column is left
    /// untouched when any value fails to map.
    pub fn try_map_column<F>(&mut self, column: &str, mut mapper: F) -> Result<()>
    where
        F: FnMut(&CellValue) -> Result<CellValue>,
    {
        let column_position = self
            .column_position(column)
            .ok_or_else(|| ToolError::MissingColumn(column.to_string()))?;
        let mapped = self
            .rows
            .iter()
            .map(|row| mapper(&row.cells[column_position]))
            .collect::<Result<Vec<_>>>()?;
        for (row, value) in self.rows.iter_mut().zip(mapped) {
            row.cells[column_position] = value;
        }
        Ok(())
    }

    /// Applies `mapper` to every cell of the table.
    pub fn map_cells<F>(&mut self, mut mapper: F)
    where
        F: FnMut(&CellValue) -> Option<CellValue>,
    {
        for row in &mut self.rows {
            for cell in &mut row.cells {
                if let Some(replacement) = mapper(cell) {
                    *cell = replacement;
                }
            }
        }
    }

    /// Renames every column through `rename`. Fails without modifying the
    /// table when two columns would share a name.
    pub fn rename_columns<F>(&mut self, mut rename: F) -> Result<()>
    where
        F: FnMut(&str) -> String,
    {
        let mut renamed: Vec<String> = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let name = rename(column);
            if renamed.contains(&name) {
                return Err(ToolError::DuplicateColumn(name));
            }
            renamed.push(name);
        }
        self.columns = renamed;
        Ok(())
    }
}
