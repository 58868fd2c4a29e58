//! Distortion-corrected cluster area.

use std::sync::Arc;

use crate::dataset::ColumnarData;

/// Per-node exponential area correction: a node with correction value `v`
/// contributes `area * 2^v`.
#[derive(Debug, Clone, Default)]
pub struct AreaCorrection {
    table: Option<Arc<ColumnarData>>,
    column: Option<usize>,
}

impl AreaCorrection {
    pub fn new(table: Arc<ColumnarData>, column: usize) -> Self {
        Self {
            table: Some(table),
            column: Some(column),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.table.is_some() && self.column.is_some()
    }

    pub fn table(&self) -> Option<&ColumnarData> {
        self.table.as_deref()
    }

    pub fn column(&self) -> Option<usize> {
        self.column
    }

    /// Corrected area of `nodes`; zero when correction is disabled.
    pub fn corrected_area(&self, nodes: &[usize], node_areas: &[f32]) -> f32 {
        let (Some(table), Some(column)) = (self.table.as_deref(), self.column) else {
            return 0.0;
        };

        let total: f64 = nodes
            .iter()
            .filter_map(|&node| {
                let area = *node_areas.get(node)? as f64;
                let correction = table.value(node, column)? as f64;
                Some(area * 2.0f64.powf(correction))
            })
            .sum();

        total as f32
    }
}
