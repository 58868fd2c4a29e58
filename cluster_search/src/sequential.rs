use common::CancelFlag;
use tracing::debug;

use crate::aggregate::ClusterAggregator;
use crate::context::{execute_isolated, SearchContext};
use crate::dataset::ColumnarData;
use crate::error::{AlgorithmError, SearchError, SearchResult};

/// Single-worker analogue of [`WorkerPool::run`](crate::scheduler::WorkerPool::run).
///
/// Columns are clustered one after another, each on the blocking pool so the
/// runtime keeps serving other tasks; the first error aborts the run.
pub(crate) async fn run_sequential(
    ctx: &SearchContext<'_>,
    dataset: &ColumnarData,
    columns: &[usize],
    cancel: &CancelFlag,
    aggregator: &mut ClusterAggregator,
) -> SearchResult<()> {
    for (processed, &column) in columns.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        debug!(column, "Cluster analysis for column");
        ctx.report_progress(processed + 1);

        let instance = ctx.instantiate(dataset, column)?;
        let geometries = tokio::task::spawn_blocking(move || execute_isolated(column, instance))
            .await
            .map_err(|err| AlgorithmError::new(column + 1, err.to_string()))??;
        aggregator.add_column(column + 1, ctx.finish_column(column, geometries));
    }
    Ok(())
}
