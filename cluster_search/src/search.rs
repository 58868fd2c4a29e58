use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;
use std::time::Instant;

use common::CancelFlag;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::ClusterAggregator;
use crate::algorithm::{AlgorithmFactory, ClusterAlgorithmKind, SurfaceClustering};
use crate::artifacts::{clusters_label_artifact, clusters_scalar_artifact, emit};
use crate::cluster::Cluster;
use crate::config::{ColumnSelection, SearchConfig};
use crate::context::SearchContext;
use crate::correction::AreaCorrection;
use crate::dataset::ColumnarData;
use crate::error::{ConfigError, SearchResult};
use crate::mesh::SurfaceMesh;
use crate::progress::{ProgressSink, TracingProgress};
use crate::report::write_analysis_report;
use crate::scheduler::WorkerPool;
use crate::sequential::run_sequential;
use crate::significance::{assign_p_values, significant_corrected_area};

/// Result of a statistical map searched against its permuted counterpart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub clusters: Vec<Cluster>,
    pub permuted_clusters: Vec<Cluster>,
    pub significant_area: f32,
}

/// Cluster search over columnar surface data.
///
/// Mesh-derived node areas, the correction table and the clustering
/// algorithm are injected once and shared read-only by every worker.
pub struct ClusterSearch {
    config: SearchConfig,
    factory: Arc<dyn AlgorithmFactory>,
    node_areas: Arc<[f32]>,
    correction: AreaCorrection,
    progress: Arc<dyn ProgressSink>,
    cancel: CancelFlag,
}

impl ClusterSearch {
    pub fn new(
        config: SearchConfig,
        factory: Arc<dyn AlgorithmFactory>,
        node_areas: Arc<[f32]>,
        correction: AreaCorrection,
    ) -> Self {
        Self {
            config,
            factory,
            node_areas,
            correction,
            progress: Arc::new(TracingProgress),
            cancel: CancelFlag::default(),
        }
    }

    /// Search using flood-fill clustering over `mesh`.
    pub fn for_mesh(
        config: SearchConfig,
        mesh: Arc<SurfaceMesh>,
        correction: AreaCorrection,
    ) -> Self {
        let kind = ClusterAlgorithmKind::MinimumSurfaceArea(config.minimum_cluster_area);
        let node_areas: Arc<[f32]> = Arc::from(mesh.node_areas());
        let factory = Arc::new(SurfaceClustering::new(mesh, kind));
        Self::new(config, factory, node_areas, correction)
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    fn validate(&self) -> SearchResult<()> {
        self.config.validate()?;
        if let (Some(table), Some(column)) = (self.correction.table(), self.correction.column()) {
            table.check_column(column)?;
        }
        Ok(())
    }

    /// Finds, corrects and ranks clusters of the selected columns.
    ///
    /// Uses the worker pool when more than one worker is configured and the
    /// sequential driver otherwise. Clusters come back largest corrected
    /// area first.
    pub async fn find_clusters(
        &self,
        dataset: &ColumnarData,
        progress_template: &str,
        selection: ColumnSelection,
        keep_largest_only: bool,
    ) -> SearchResult<Vec<Cluster>> {
        self.validate()?;

        let columns: Vec<usize> = match selection {
            ColumnSelection::All => (0..dataset.column_count()).collect(),
            ColumnSelection::Single(column) => {
                dataset.check_column(column)?;
                vec![column]
            }
        };

        let started = Instant::now();
        let ctx = SearchContext {
            factory: &self.factory,
            node_areas: &self.node_areas,
            correction: &self.correction,
            thresholds: self.config.thresholds(),
            progress: self.progress.as_ref(),
            progress_template,
            total_columns: columns.len(),
        };
        let mut aggregator = ClusterAggregator::new(keep_largest_only);

        let workers = self.config.worker_count;
        if workers <= 1 {
            run_sequential(&ctx, dataset, &columns, &self.cancel, &mut aggregator).await?;
        } else {
            WorkerPool::new(workers)
                .run(&ctx, dataset, &columns, &self.cancel, &mut aggregator)
                .await?;
        }

        let clusters = aggregator.finish();
        info!(
            dataset = %dataset.name,
            workers,
            columns = columns.len(),
            clusters = clusters.len(),
            "Cluster search with {workers} threads: {:.3} seconds",
            started.elapsed().as_secs_f64()
        );
        Ok(clusters)
    }

    /// Clusters one column of `statistical_map`, ranks them against the
    /// largest cluster of every column of `permuted_map` and assigns p-values.
    pub async fn run_analysis(
        &self,
        statistical_map: &ColumnarData,
        permuted_map: &ColumnarData,
        statistical_column: usize,
    ) -> SearchResult<AnalysisOutcome> {
        if self.config.permutation_iterations == 0 {
            return Err(ConfigError::ZeroIterations.into());
        }

        let mut clusters = self
            .find_clusters(
                statistical_map,
                "Finding Clusters in Statistical Map",
                ColumnSelection::Single(statistical_column),
                false,
            )
            .await?;
        let permuted_clusters = self
            .find_clusters(
                permuted_map,
                "Finding Clusters in Permuted Map",
                ColumnSelection::All,
                true,
            )
            .await?;

        let iterations = self.config.permutation_iterations;
        let significant_area =
            significant_corrected_area(&permuted_clusters, self.config.p_value, iterations);
        assign_p_values(&mut clusters, &permuted_clusters, iterations);

        info!(
            clusters = clusters.len(),
            permuted = permuted_clusters.len(),
            significant_area,
            "Permutation analysis finished"
        );

        Ok(AnalysisOutcome {
            clusters,
            permuted_clusters,
            significant_area,
        })
    }

    /// Writes the report file and the configured derived artifacts.
    ///
    /// The statistical column is checked before anything is written. Report
    /// failures are returned; artifact failures are only logged.
    pub fn write_outputs(
        &self,
        outcome: &AnalysisOutcome,
        statistical_map: &ColumnarData,
        statistical_column: usize,
    ) -> SearchResult<()> {
        self.config.validate_analysis()?;
        statistical_map.check_column(statistical_column)?;
        let outputs = &self.config.outputs;

        let mut writer = BufWriter::new(File::create(&outputs.report)?);
        write_analysis_report(&mut writer, &self.config, &statistical_map.name, outcome)?;
        writer.flush()?;

        let node_count = statistical_map.node_count();
        if let Some(path) = &outputs.clusters_label {
            let table =
                clusters_label_artifact(&outcome.clusters, outcome.significant_area, node_count);
            emit(&table, path);
        }
        if let Some(path) = &outputs.clusters_scalar {
            let table = clusters_scalar_artifact(
                &outcome.clusters,
                statistical_map,
                statistical_column,
                node_count,
            )?;
            emit(&table, path);
        }
        Ok(())
    }
}

impl std::fmt::Debug for ClusterSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterSearch")
            .field("config", &self.config)
            .field("node_count", &self.node_areas.len())
            .field("correction", &self.correction.is_enabled())
            .finish()
    }
}

