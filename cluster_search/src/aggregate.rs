//! Collection and ranking of per-column clusters.

use std::collections::BTreeMap;

use crate::cluster::{rank_descending, Cluster};

/// Buffers clusters by column as columns complete, in any order.
///
/// Results are combined in column order at [`finish`](Self::finish), so the
/// ranking never depends on which worker finished first.
#[derive(Debug, Default)]
pub struct ClusterAggregator {
    keep_largest_only: bool,
    by_column: BTreeMap<usize, Vec<Cluster>>,
}

impl ClusterAggregator {
    pub fn new(keep_largest_only: bool) -> Self {
        Self {
            keep_largest_only,
            by_column: BTreeMap::new(),
        }
    }

    pub fn add_column(&mut self, column: usize, clusters: Vec<Cluster>) {
        let previous = self.by_column.insert(column, clusters);
        debug_assert!(previous.is_none(), "column {column} aggregated twice");
    }

    pub fn column_count(&self) -> usize {
        self.by_column.len()
    }

    pub fn finish(self) -> Vec<Cluster> {
        aggregate(self.by_column.into_values(), self.keep_largest_only)
    }
}

/// Filters, names and ranks clusters gathered from several columns.
///
/// With `keep_largest_only` each column contributes only its largest cluster;
/// among equal largest areas the last one in collection order is kept.
pub fn aggregate<I>(per_column: I, keep_largest_only: bool) -> Vec<Cluster>
where
    I: IntoIterator<Item = Vec<Cluster>>,
{
    let mut clusters: Vec<Cluster> = if keep_largest_only {
        per_column
            .into_iter()
            .filter_map(|column| column.into_iter().max_by(Cluster::cmp_area))
            .collect()
    } else {
        per_column.into_iter().flatten().collect()
    };

    for cluster in clusters.iter_mut() {
        cluster.assign_name();
    }

    rank_descending(&mut clusters);
    clusters
}
