//! Triangulated surface: node coordinates, adjacency and per-node area.

use glam::Vec3;
use hashbrown::HashSet;

use crate::error::MeshError;

#[derive(Debug, Clone)]
pub struct SurfaceMesh {
    coordinates: Vec<Vec3>,
    neighbors: Vec<Vec<usize>>,
    node_areas: Vec<f32>,
}

impl SurfaceMesh {
    pub fn new(coordinates: Vec<Vec3>, triangles: Vec<[usize; 3]>) -> Result<Self, MeshError> {
        let node_count = coordinates.len();
        if node_count == 0 {
            return Err(MeshError::NoNodes);
        }
        if triangles.is_empty() {
            return Err(MeshError::NoTriangles);
        }

        let mut adjacency: Vec<HashSet<usize>> = vec![HashSet::new(); node_count];
        let mut node_areas = vec![0.0f32; node_count];

        for (triangle_idx, triangle) in triangles.iter().enumerate() {
            if let Some(&node) = triangle.iter().find(|&&node| node >= node_count) {
                return Err(MeshError::NodeOutOfRange {
                    triangle: triangle_idx,
                    node,
                    node_count,
                });
            }

            let [a, b, c] = *triangle;
            // each vertex owns a third of the triangle
            let third = triangle_area(coordinates[a], coordinates[b], coordinates[c]) / 3.0;
            for (node, others) in [(a, [b, c]), (b, [a, c]), (c, [a, b])] {
                node_areas[node] += third;
                adjacency[node].extend(others.into_iter().filter(|&other| other != node));
            }
        }

        let neighbors = adjacency
            .into_iter()
            .map(|set| {
                let mut list: Vec<usize> = set.into_iter().collect();
                list.sort_unstable();
                list
            })
            .collect();

        Ok(Self {
            coordinates,
            neighbors,
            node_areas,
        })
    }

    pub fn node_count(&self) -> usize {
        self.coordinates.len()
    }

    pub fn coordinate(&self, node: usize) -> Vec3 {
        self.coordinates[node]
    }

    pub fn neighbors(&self, node: usize) -> &[usize] {
        &self.neighbors[node]
    }

    pub fn node_areas(&self) -> &[f32] {
        &self.node_areas
    }
}

fn triangle_area(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    (b - a).cross(c - a).length() * 0.5
}
