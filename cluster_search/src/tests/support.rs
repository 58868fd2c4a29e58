use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use glam::Vec3;

use crate::algorithm::{AlgorithmFactory, ClusteringAlgorithm};
use crate::cluster::{Cluster, ClusterGeometry};
use crate::config::ThresholdBounds;
use crate::dataset::ColumnData;
use crate::error::{AlgorithmError, AlgorithmResult};
use crate::mesh::SurfaceMesh;

/// Flat grid of unit squares; node `(x, y)` has index `x * height + y`.
pub(crate) fn grid_mesh(width: usize, height: usize) -> SurfaceMesh {
    let index = |x: usize, y: usize| x * height + y;

    let mut coordinates = Vec::with_capacity(width * height);
    for x in 0..width {
        for y in 0..height {
            coordinates.push(Vec3::new(x as f32, y as f32, 0.0));
        }
    }

    let mut triangles = Vec::new();
    for x in 0..width - 1 {
        for y in 0..height - 1 {
            let a = index(x, y);
            let b = index(x, y + 1);
            let c = index(x + 1, y);
            let d = index(x + 1, y + 1);
            triangles.push([a, c, d]);
            triangles.push([a, d, b]);
        }
    }

    SurfaceMesh::new(coordinates, triangles).expect("grid mesh is valid")
}

/// Two-row grid: nodes `2x` and `2x + 1` sit at the same `x`.
pub(crate) fn strip_mesh(columns: usize) -> SurfaceMesh {
    grid_mesh(columns, 2)
}

pub(crate) fn cluster_with_area(column: usize, area_corrected: f32, node: usize) -> Cluster {
    Cluster::from_geometry(
        column,
        ClusterGeometry {
            nodes: vec![node],
            area: area_corrected,
            centroid: Vec3::ZERO,
            threshold_min: 1.0,
            threshold_max: f32::MAX,
        },
        area_corrected,
    )
}

/// Counts algorithm instances that are alive and executing.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResourceProbe {
    live: Arc<AtomicUsize>,
    created: Arc<AtomicUsize>,
    running: Arc<AtomicUsize>,
    max_running: Arc<AtomicUsize>,
    executed: Arc<AtomicUsize>,
}

impl ResourceProbe {
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn max_running(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }

    pub fn executed(&self) -> usize {
        self.executed.load(Ordering::SeqCst)
    }

    fn acquire(&self) -> ProbeGuard {
        self.live.fetch_add(1, Ordering::SeqCst);
        self.created.fetch_add(1, Ordering::SeqCst);
        ProbeGuard {
            counter: Arc::clone(&self.live),
        }
    }

    fn start_running(&self) -> ProbeGuard {
        let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(running, Ordering::SeqCst);
        ProbeGuard {
            counter: Arc::clone(&self.running),
        }
    }
}

#[derive(Debug)]
struct ProbeGuard {
    counter: Arc<AtomicUsize>,
}

impl Drop for ProbeGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Algorithm whose every in-range node becomes a single-node cluster.
///
/// Selected 0-based columns fail or panic instead.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedFactory {
    pub probe: ResourceProbe,
    pub fail_columns: Vec<usize>,
    pub panic_columns: Vec<usize>,
    pub delay: Duration,
}

impl ScriptedFactory {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }
}

struct ScriptedAlgorithm {
    _guard: ProbeGuard,
    probe: ResourceProbe,
    data: ColumnData,
    thresholds: ThresholdBounds,
    fail: bool,
    panic: bool,
    delay: Duration,
}

impl AlgorithmFactory for ScriptedFactory {
    fn create(
        &self,
        data: ColumnData,
        thresholds: ThresholdBounds,
    ) -> Box<dyn ClusteringAlgorithm> {
        Box::new(ScriptedAlgorithm {
            _guard: self.probe.acquire(),
            probe: self.probe.clone(),
            fail: self.fail_columns.contains(&data.column),
            panic: self.panic_columns.contains(&data.column),
            data,
            thresholds,
            delay: self.delay,
        })
    }
}

impl ClusteringAlgorithm for ScriptedAlgorithm {
    fn execute(self: Box<Self>) -> AlgorithmResult<Vec<ClusterGeometry>> {
        let _running = self.probe.start_running();
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.probe.executed.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(AlgorithmError::new(self.data.column + 1, "scripted failure"));
        }
        if self.panic {
            panic!("scripted panic in column {}", self.data.column);
        }

        let clusters = self
            .data
            .values
            .iter()
            .enumerate()
            .filter_map(|(node, &value)| {
                let (threshold_min, threshold_max) = if self.thresholds.in_positive_range(value) {
                    (self.thresholds.positive_min, self.thresholds.positive_max)
                } else if self.thresholds.in_negative_range(value) {
                    (self.thresholds.negative_max, self.thresholds.negative_min)
                } else {
                    return None;
                };
                Some(ClusterGeometry {
                    nodes: vec![node],
                    area: value.abs(),
                    centroid: Vec3::new(node as f32, 0.0, 0.0),
                    threshold_min,
                    threshold_max,
                })
            })
            .collect();
        Ok(clusters)
    }
}
