use std::fs::File;
use std::io::Write;

use camino::Utf8Path;
use itertools::Itertools;

use crate::ppem_errors::PpemError;

/// Named rows × named columns of optional fractions.
///
/// Used for criterion rates (rows = criteria) and null fractions (rows = `Null`,
/// `Non-Nulls`); columns are the sheet columns. A `None` cell is a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    rows: Vec<String>,
    columns: Vec<String>,
    /// Row-major cells.
    cells: Vec<Vec<Option<f64>>>,
}

impl SummaryTable {
    pub fn new(rows: Vec<String>, columns: Vec<String>) -> Self {
        let cells = vec![vec![None; columns.len()]; rows.len()];
        SummaryTable {
            rows,
            columns,
            cells,
        }
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: Option<f64>) {
        self.cells[row][col] = value;
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Value at (`row`, `column`); `None` when missing or when either name is unknown.
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.rows.iter().position(|n| n == row)?;
        let c = self.columns.iter().position(|n| n == column)?;
        self.cells[r][c]
    }

    /// Cells of one row, aligned with [`SummaryTable::columns`].
    pub fn row(&self, row: &str) -> Option<&[Option<f64>]> {
        let r = self.rows.iter().position(|n| n == row)?;
        Some(&self.cells[r])
    }

    /// Write with an unnamed leading index column; missing cells are empty.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), PpemError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let mut header = vec![String::new()];
        header.extend(self.columns.iter().cloned());
        csv_writer.write_record(&header)?;

        for (name, cells) in self.rows.iter().zip(&self.cells) {
            let mut record = vec![name.clone()];
            record.extend(cells.iter().map(|c| c.map(|v| v.to_string()).unwrap_or_default()));
            csv_writer.write_record(&record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn save_csv(&self, path: &Utf8Path) -> Result<(), PpemError> {
        self.write_csv(File::create(path)?)
    }
}

/// Summaries of several tiers stacked into rows keyed by `(tier, row)`.
///
/// Columns are the union of the stacked tables' columns, in first-seen order. A column absent
/// from a tier is missing in that tier's rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StackedSummary {
    columns: Vec<String>,
    keys: Vec<(String, String)>,
    cells: Vec<Vec<Option<f64>>>,
}

impl StackedSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every row of `table` under `tier`.
    pub fn push_tier(&mut self, tier: &str, table: &SummaryTable) {
        for column in table.columns() {
            if !self.columns.contains(column) {
                self.columns.push(column.clone());
                for row in &mut self.cells {
                    row.push(None);
                }
            }
        }
        for row in table.rows() {
            let cells = self
                .columns
                .iter()
                .map(|col| table.get(row, col))
                .collect();
            self.keys.push((tier.to_string(), row.clone()));
            self.cells.push(cells);
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// `(tier, row)` keys in stacking order.
    pub fn keys(&self) -> &[(String, String)] {
        &self.keys
    }

    /// Distinct tiers in stacking order.
    pub fn tiers(&self) -> Vec<&str> {
        self.keys.iter().map(|(tier, _)| tier.as_str()).unique().collect()
    }

    pub fn get(&self, tier: &str, row: &str, column: &str) -> Option<f64> {
        let r = self.keys.iter().position(|(t, n)| t == tier && n == row)?;
        let c = self.columns.iter().position(|n| n == column)?;
        self.cells[r][c]
    }

    /// Write with two leading index columns `tier`, `row`.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), PpemError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let mut header = vec!["tier".to_string(), "row".to_string()];
        header.extend(self.columns.iter().cloned());
        csv_writer.write_record(&header)?;

        for ((tier, row), cells) in self.keys.iter().zip(&self.cells) {
            let mut record = vec![tier.clone(), row.clone()];
            record.extend(cells.iter().map(|c| c.map(|v| v.to_string()).unwrap_or_default()));
            csv_writer.write_record(&record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn save_csv(&self, path: &Utf8Path) -> Result<(), PpemError> {
        self.write_csv(File::create(path)?)
    }
}
