use std::cmp::Ordering;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Raw output of the clustering pass for one connected region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterGeometry {
    pub nodes: Vec<usize>,
    pub area: f32,
    pub centroid: Vec3,
    pub threshold_min: f32,
    pub threshold_max: f32,
}

impl ClusterGeometry {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// One detected cluster, enriched with its corrected area and significance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// 1-based source column.
    pub column: usize,
    pub nodes: Vec<usize>,
    pub area: f32,
    pub area_corrected: f32,
    pub centroid: Vec3,
    pub threshold_min: f32,
    pub threshold_max: f32,
    pub p_value: Option<f32>,
    pub name: String,
}

impl Cluster {
    pub fn from_geometry(column: usize, geometry: ClusterGeometry, area_corrected: f32) -> Self {
        Self {
            column,
            nodes: geometry.nodes,
            area: geometry.area,
            area_corrected,
            centroid: geometry.centroid,
            threshold_min: geometry.threshold_min,
            threshold_max: geometry.threshold_max,
            p_value: None,
            name: String::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_negative(&self) -> bool {
        self.threshold_max < 0.0
    }

    /// The bound closest to zero of the range that produced this cluster.
    pub fn report_threshold(&self) -> f32 {
        if self.threshold_min < 0.0 {
            self.threshold_max
        } else {
            self.threshold_min
        }
    }

    /// Ascending order by corrected area.
    pub fn cmp_area(&self, other: &Self) -> Ordering {
        self.area_corrected.total_cmp(&other.area_corrected)
    }

    pub fn display_name(&self) -> String {
        format!(
            "{}cluster_area_{:.2}_nodes_{}",
            if self.is_negative() { "minus_" } else { "plus_" },
            self.area_corrected,
            self.node_count()
        )
    }

    pub fn assign_name(&mut self) {
        self.name = self.display_name();
    }
}

/// Sorts ascending by corrected area (stable) and reverses, so the largest
/// cluster comes first and equal areas end up in reverse collection order.
pub fn rank_descending(clusters: &mut [Cluster]) {
    clusters.sort_by(Cluster::cmp_area);
    clusters.reverse();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(
        column: usize,
        area_corrected: f32,
        threshold_min: f32,
        threshold_max: f32,
    ) -> Cluster {
        Cluster::from_geometry(
            column,
            ClusterGeometry {
                nodes: vec![0, 1, 2],
                area: 1.0,
                centroid: Vec3::ZERO,
                threshold_min,
                threshold_max,
            },
            area_corrected,
        )
    }

    #[test]
    fn names_carry_sign_area_and_size() {
        let mut positive = cluster(1, 12.5, 2.0, f32::MAX);
        positive.assign_name();
        assert_eq!(positive.name, "plus_cluster_area_12.50_nodes_3");

        let mut negative = cluster(1, 3.0, -f32::MAX, -2.0);
        negative.assign_name();
        assert_eq!(negative.name, "minus_cluster_area_3.00_nodes_3");
        assert_eq!(negative.report_threshold(), -2.0);
        assert_eq!(positive.report_threshold(), 2.0);
    }

    #[test]
    fn ranking_reverses_ties() {
        let mut clusters = vec![
            cluster(1, 5.0, 1.0, 2.0),
            cluster(2, 9.0, 1.0, 2.0),
            cluster(3, 5.0, 1.0, 2.0),
        ];
        rank_descending(&mut clusters);
        let columns: Vec<usize> = clusters.iter().map(|c| c.column).collect();
        assert_eq!(columns, vec![2, 3, 1]);
    }
}
