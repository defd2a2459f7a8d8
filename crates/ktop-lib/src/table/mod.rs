//! Table model and fixed-width box-drawing renderer

mod render;

pub use render::TableRenderer;

use tabled::Tabled;
use thiserror::Error;

/// A row does not have one cell per header column
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("row has {found} cells but the table has {expected} columns")]
pub struct TableError {
    pub expected: usize,
    pub found: usize,
}

/// Header plus ordered rows of pre-formatted cells
///
/// Every row has exactly as many cells as the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableModel {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableModel {
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from typed rows, using their field names as header
    pub fn from_rows<T: Tabled>(rows: &[T]) -> Self {
        Self {
            header: T::headers().into_iter().map(|h| h.into_owned()).collect(),
            rows: rows
                .iter()
                .map(|row| row.fields().into_iter().map(|c| c.into_owned()).collect())
                .collect(),
        }
    }

    /// Append a row, rejecting it if its width differs from the header
    pub fn push_row<I, S>(&mut self, row: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = row.into_iter().map(Into::into).collect();
        if row.len() != self.header.len() {
            return Err(TableError {
                expected: self.header.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}
