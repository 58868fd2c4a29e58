//! Derived per-node surface files built from ranked clusters.
//!
//! Writing is best effort: [`emit`] logs failures and reports them only as a
//! boolean, so a broken output path never aborts an analysis.

use std::path::Path;

use common::FileFormat;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cluster::Cluster;
use crate::dataset::ColumnarData;
use crate::error::{ArtifactError, SearchResult};

pub const UNASSIGNED_LABEL: &str = "???";
pub const CLUSTERS_COLUMN_NAME: &str = "Clusters";
pub const ONE_MINUS_P_COLUMN_NAME: &str = "1 - P";

/// One label column: every node carries an index into `labels`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelTable {
    pub column_name: String,
    pub labels: Vec<String>,
    pub node_labels: Vec<u32>,
}

impl LabelTable {
    pub fn new(column_name: impl Into<String>, node_count: usize) -> Self {
        Self {
            column_name: column_name.into(),
            labels: vec![UNASSIGNED_LABEL.to_string()],
            node_labels: vec![0; node_count],
        }
    }

    /// Returns the index of `name`, adding it when new.
    pub fn add_label(&mut self, name: &str) -> u32 {
        let index = match self.labels.iter().position(|label| label == name) {
            Some(index) => index,
            None => {
                self.labels.push(name.to_string());
                self.labels.len() - 1
            }
        };
        index as u32
    }

    pub fn label_of(&self, node: usize) -> Option<&str> {
        let index = *self.node_labels.get(node)? as usize;
        self.labels.get(index).map(String::as_str)
    }
}

/// Two scalar columns per node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarPairTable {
    pub column_names: [String; 2],
    pub values: Vec<[f32; 2]>,
}

/// Labels the nodes of every cluster reaching `significant_area` with its name.
pub fn clusters_label_artifact(
    clusters: &[Cluster],
    significant_area: f32,
    node_count: usize,
) -> LabelTable {
    let mut table = LabelTable::new(CLUSTERS_COLUMN_NAME, node_count);
    for cluster in clusters
        .iter()
        .filter(|cluster| cluster.area_corrected >= significant_area)
    {
        let label = table.add_label(&cluster.name);
        for &node in &cluster.nodes {
            if let Some(slot) = table.node_labels.get_mut(node) {
                *slot = label;
            }
        }
    }
    table
}

/// Source value and `1 - p` for the nodes of every cluster with a positive
/// corrected area. Clusters without a p-value contribute `0` in the second column.
pub fn clusters_scalar_artifact(
    clusters: &[Cluster],
    source: &ColumnarData,
    source_column: usize,
    node_count: usize,
) -> SearchResult<ScalarPairTable> {
    source.check_column(source_column)?;

    let source_name = source
        .column_name(source_column)
        .unwrap_or_default()
        .to_string();
    let mut table = ScalarPairTable {
        column_names: [source_name, ONE_MINUS_P_COLUMN_NAME.to_string()],
        values: vec![[0.0; 2]; node_count],
    };

    for cluster in clusters.iter().filter(|cluster| cluster.area_corrected > 0.0) {
        let q = cluster.p_value.map_or(0.0, |p| 1.0 - p);
        for &node in &cluster.nodes {
            let value = source.value(node, source_column).unwrap_or(0.0);
            if let Some(slot) = table.values.get_mut(node) {
                *slot = [value, q];
            }
        }
    }
    Ok(table)
}

/// Serializes `artifact` to `path`, format chosen by extension.
pub fn write_artifact<T: Serialize>(artifact: &T, path: &Path) -> Result<(), ArtifactError> {
    let format = FileFormat::from_path(path)?;
    let text = common::serialize(artifact, format)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Best-effort [`write_artifact`]: failures are logged and swallowed.
pub fn emit<T: Serialize>(artifact: &T, path: &Path) -> bool {
    match write_artifact(artifact, path) {
        Ok(()) => {
            info!(path = %path.display(), "Wrote cluster artifact");
            true
        }
        Err(err) => {
            warn!(path = %path.display(), "Unable to write cluster artifact: {err}");
            false
        }
    }
}
