//! Clustering algorithm seam and the mesh flood-fill implementation.
//!
//! The scheduler only sees [`AlgorithmFactory`] and [`ClusteringAlgorithm`]:
//! one fresh instance per dispatched column, consumed by `execute` so the
//! instance and its column data are released as soon as it finishes.

use std::collections::VecDeque;
use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::cluster::ClusterGeometry;
use crate::config::ThresholdBounds;
use crate::dataset::ColumnData;
use crate::error::{AlgorithmError, AlgorithmResult};
use crate::mesh::SurfaceMesh;

pub trait ClusteringAlgorithm: Send {
    fn execute(self: Box<Self>) -> AlgorithmResult<Vec<ClusterGeometry>>;
}

pub trait AlgorithmFactory: Send + Sync {
    fn create(&self, data: ColumnData, thresholds: ThresholdBounds) -> Box<dyn ClusteringAlgorithm>;
}

/// Which connected regions are kept as clusters.
#[derive(Debug, Clone, Copy, PartialEq, Display, Serialize, Deserialize)]
pub enum ClusterAlgorithmKind {
    AnySize,
    MinimumNodes(usize),
    MinimumSurfaceArea(f32),
}

impl ClusterAlgorithmKind {
    pub fn accepts(&self, node_count: usize, area: f32) -> bool {
        match *self {
            Self::AnySize => node_count > 0,
            Self::MinimumNodes(minimum) => node_count >= minimum.max(1),
            Self::MinimumSurfaceArea(minimum) => node_count > 0 && area >= minimum,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Range {
    Positive,
    Negative,
}

/// Builds [`MeshClustering`] runs that share one read-only mesh.
#[derive(Debug, Clone)]
pub struct SurfaceClustering {
    mesh: Arc<SurfaceMesh>,
    kind: ClusterAlgorithmKind,
}

impl SurfaceClustering {
    pub fn new(mesh: Arc<SurfaceMesh>, kind: ClusterAlgorithmKind) -> Self {
        Self { mesh, kind }
    }
}

impl AlgorithmFactory for SurfaceClustering {
    fn create(
        &self,
        data: ColumnData,
        thresholds: ThresholdBounds,
    ) -> Box<dyn ClusteringAlgorithm> {
        Box::new(MeshClustering {
            mesh: Arc::clone(&self.mesh),
            kind: self.kind,
            data,
            thresholds,
        })
    }
}

/// Flood-fill clustering of one column over the mesh adjacency.
///
/// Positive and negative nodes never share a cluster.
#[derive(Debug)]
pub struct MeshClustering {
    mesh: Arc<SurfaceMesh>,
    kind: ClusterAlgorithmKind,
    data: ColumnData,
    thresholds: ThresholdBounds,
}

impl MeshClustering {
    fn range_of(&self, value: f32) -> Option<Range> {
        if self.thresholds.in_positive_range(value) {
            Some(Range::Positive)
        } else if self.thresholds.in_negative_range(value) {
            Some(Range::Negative)
        } else {
            None
        }
    }

    fn error(&self, message: impl Into<String>) -> AlgorithmError {
        AlgorithmError::new(self.data.column + 1, message)
    }

    fn flood(&self, start: usize, range: Range, visited: &mut [bool]) -> Vec<usize> {
        let mut nodes = Vec::new();
        let mut queue = VecDeque::from([start]);
        visited[start] = true;

        while let Some(node) = queue.pop_front() {
            nodes.push(node);
            for &neighbor in self.mesh.neighbors(node) {
                if !visited[neighbor] && self.range_of(self.data.values[neighbor]) == Some(range) {
                    visited[neighbor] = true;
                    queue.push_back(neighbor);
                }
            }
        }

        nodes.sort_unstable();
        nodes
    }

    fn geometry(&self, nodes: Vec<usize>, range: Range) -> ClusterGeometry {
        let node_areas = self.mesh.node_areas();
        let area: f32 = nodes.iter().map(|&node| node_areas[node]).sum();
        let sum: Vec3 = nodes.iter().map(|&node| self.mesh.coordinate(node)).sum();
        let centroid = sum / nodes.len().max(1) as f32;

        let (threshold_min, threshold_max) = match range {
            Range::Positive => (self.thresholds.positive_min, self.thresholds.positive_max),
            Range::Negative => (self.thresholds.negative_max, self.thresholds.negative_min),
        };

        ClusterGeometry {
            nodes,
            area,
            centroid,
            threshold_min,
            threshold_max,
        }
    }
}

impl ClusteringAlgorithm for MeshClustering {
    fn execute(self: Box<Self>) -> AlgorithmResult<Vec<ClusterGeometry>> {
        let node_count = self.mesh.node_count();
        if self.data.values.is_empty() {
            return Err(self.error("Column has no data"));
        }
        if self.data.node_count() != node_count {
            return Err(self.error(format!(
                "Column has {} nodes but the surface has {}",
                self.data.node_count(),
                node_count
            )));
        }

        let mut visited = vec![false; node_count];
        let mut clusters = Vec::new();

        for start in 0..node_count {
            if visited[start] {
                continue;
            }
            let Some(range) = self.range_of(self.data.values[start]) else {
                continue;
            };

            let nodes = self.flood(start, range, &mut visited);
            let geometry = self.geometry(nodes, range);
            if self.kind.accepts(geometry.node_count(), geometry.area) {
                clusters.push(geometry);
            }
        }

        tracing::trace!(
            column = self.data.column,
            clusters = clusters.len(),
            kind = %self.kind,
            "column clustered"
        );

        Ok(clusters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::strip_mesh;

    fn run(values: Vec<f32>, kind: ClusterAlgorithmKind) -> AlgorithmResult<Vec<ClusterGeometry>> {
        let mesh = Arc::new(strip_mesh(values.len() / 2));
        let factory = SurfaceClustering::new(mesh, kind);
        factory
            .create(ColumnData { column: 0, values }, ThresholdBounds::new(-1.0, 1.0))
            .execute()
    }

    #[test]
    fn positive_and_negative_regions_are_separate() {
        // strip of 4 columns: nodes (0,1) (2,3) (4,5) (6,7)
        let values = vec![2.0, 2.0, -3.0, -3.0, 0.0, 0.0, 5.0, 5.0];
        let clusters = run(values, ClusterAlgorithmKind::AnySize).unwrap();

        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters[0].nodes, vec![0, 1]);
        assert_eq!(clusters[1].nodes, vec![2, 3]);
        assert_eq!(clusters[1].threshold_max, -1.0);
        assert_eq!(clusters[1].threshold_min, -f32::MAX);
        assert_eq!(clusters[2].nodes, vec![6, 7]);
        assert_eq!(clusters[2].threshold_min, 1.0);
    }

    #[test]
    fn connected_region_reports_area_and_centroid() {
        let values = vec![3.0; 6];
        let clusters = run(values, ClusterAlgorithmKind::AnySize).unwrap();

        assert_eq!(clusters.len(), 1);
        let cluster = &clusters[0];
        assert_eq!(cluster.node_count(), 6);
        // strip of unit squares, 2 squares long
        assert!((cluster.area - 2.0).abs() < 1e-5);
        assert!((cluster.centroid - Vec3::new(1.0, 0.5, 0.0)).length() < 1e-5);
    }

    #[test]
    fn kinds_filter_small_regions() {
        let values = vec![2.0, 2.0, 0.0, 0.0, 2.0, 2.0, 2.0, 2.0];
        let by_nodes = run(values.clone(), ClusterAlgorithmKind::MinimumNodes(3)).unwrap();
        assert_eq!(by_nodes.len(), 1);
        assert_eq!(by_nodes[0].nodes, vec![4, 5, 6, 7]);

        let by_area = run(values, ClusterAlgorithmKind::MinimumSurfaceArea(10.0)).unwrap();
        assert!(by_area.is_empty());
    }

    #[test]
    fn mismatched_column_fails() {
        let mesh = Arc::new(strip_mesh(2));
        let factory = SurfaceClustering::new(mesh, ClusterAlgorithmKind::AnySize);
        let err = factory
            .create(
                ColumnData {
                    column: 4,
                    values: vec![1.0; 3],
                },
                ThresholdBounds::new(-1.0, 1.0),
            )
            .execute()
            .unwrap_err();
        assert_eq!(err.column, 5);

        let err = factory
            .create(
                ColumnData {
                    column: 0,
                    values: vec![],
                },
                ThresholdBounds::new(-1.0, 1.0),
            )
            .execute()
            .unwrap_err();
        assert_eq!(err.message, "Column has no data");
    }
}
