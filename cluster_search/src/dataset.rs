//! Columnar per-node scalar data and single-column extraction.

use serde::{Deserialize, Serialize};

use crate::error::{SearchError, SearchResult};

/// A scalar field over all surface nodes for a number of columns.
///
/// Stored column-major: `columns[c][node]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnarData {
    pub name: String,
    node_count: usize,
    column_names: Vec<String>,
    columns: Vec<Vec<f32>>,
}

/// One column copied out of a [`ColumnarData`], owned by a single worker.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnData {
    /// 0-based index of the source column.
    pub column: usize,
    pub values: Vec<f32>,
}

impl ColumnarData {
    pub fn new(name: impl Into<String>, node_count: usize) -> Self {
        Self {
            name: name.into(),
            node_count,
            column_names: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Appends a column. Values beyond `node_count` are dropped, missing ones are zero.
    pub fn add_column(&mut self, name: impl Into<String>, mut values: Vec<f32>) -> usize {
        values.resize(self.node_count, 0.0);
        self.column_names.push(name.into());
        self.columns.push(values);
        self.columns.len() - 1
    }

    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f32>) -> Self {
        self.add_column(name, values);
        self
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_name(&self, column: usize) -> Option<&str> {
        self.column_names.get(column).map(String::as_str)
    }

    pub fn column(&self, column: usize) -> Option<&[f32]> {
        self.columns.get(column).map(Vec::as_slice)
    }

    /// Value at `(node, column)`, `None` when either index is out of range.
    pub fn value(&self, node: usize, column: usize) -> Option<f32> {
        self.columns.get(column)?.get(node).copied()
    }

    pub fn check_column(&self, column: usize) -> SearchResult<()> {
        if column >= self.column_count() {
            return Err(SearchError::InvalidColumn {
                column,
                column_count: self.column_count(),
                dataset: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Copies one column into an isolated single-column dataset.
    ///
    /// Node order is preserved so node indices produced from the copy address
    /// the source mesh directly.
    pub fn extract(&self, column: usize) -> SearchResult<ColumnData> {
        self.check_column(column)?;
        Ok(ColumnData {
            column,
            values: self.columns[column].clone(),
        })
    }
}

impl ColumnData {
    pub fn node_count(&self) -> usize {
        self.values.len()
    }
}
