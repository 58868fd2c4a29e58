//! Per-column steps shared by the worker pool and the sequential driver.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::algorithm::{AlgorithmFactory, ClusteringAlgorithm};
use crate::cluster::{Cluster, ClusterGeometry};
use crate::config::ThresholdBounds;
use crate::correction::AreaCorrection;
use crate::dataset::ColumnarData;
use crate::error::{AlgorithmError, AlgorithmResult, SearchResult};
use crate::progress::{progress_message, ProgressSink};

/// Read-only state of one `find_clusters` call.
pub(crate) struct SearchContext<'a> {
    pub factory: &'a Arc<dyn AlgorithmFactory>,
    pub node_areas: &'a [f32],
    pub correction: &'a AreaCorrection,
    pub thresholds: ThresholdBounds,
    pub progress: &'a dyn ProgressSink,
    pub progress_template: &'a str,
    pub total_columns: usize,
}

impl SearchContext<'_> {
    /// Isolates `column` and binds a fresh algorithm instance to the copy.
    pub fn instantiate(
        &self,
        dataset: &ColumnarData,
        column: usize,
    ) -> SearchResult<Box<dyn ClusteringAlgorithm>> {
        let data = dataset.extract(column)?;
        Ok(self.factory.create(data, self.thresholds))
    }

    /// Converts raw geometry of a 0-based column into corrected clusters.
    pub fn finish_column(&self, column: usize, geometries: Vec<ClusterGeometry>) -> Vec<Cluster> {
        geometries
            .into_iter()
            .map(|geometry| {
                let area_corrected = self
                    .correction
                    .corrected_area(&geometry.nodes, self.node_areas);
                Cluster::from_geometry(column + 1, geometry, area_corrected)
            })
            .collect()
    }

    pub fn report_progress(&self, processed: usize) {
        let message = progress_message(self.progress_template, processed, self.total_columns);
        self.progress.update(&message, processed, self.total_columns);
    }
}

/// Runs `instance` on the current thread, turning a panic into an error for
/// the 0-based `column`. The instance is dropped before this returns.
pub(crate) fn execute_isolated(
    column: usize,
    instance: Box<dyn ClusteringAlgorithm>,
) -> AlgorithmResult<Vec<ClusterGeometry>> {
    std::panic::catch_unwind(AssertUnwindSafe(move || instance.execute()))
        .unwrap_or_else(|payload| Err(AlgorithmError::new(column + 1, panic_message(payload))))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("worker panicked: {message}")
    } else {
        "worker panicked".to_string()
    }
}
