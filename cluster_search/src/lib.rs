pub mod aggregate;
pub mod algorithm;
pub mod artifacts;
pub mod cluster;
pub mod config;
mod context;
pub mod correction;
pub mod dataset;
pub mod error;
pub mod mesh;
pub mod progress;
pub mod report;
pub mod scheduler;
pub mod search;
mod sequential;
pub mod significance;

#[cfg(test)]
mod tests;

pub use algorithm::{
    AlgorithmFactory, ClusterAlgorithmKind, ClusteringAlgorithm, SurfaceClustering,
};
pub use cluster::{Cluster, ClusterGeometry};
pub use config::{ColumnSelection, OutputFiles, SearchConfig, ThresholdBounds};
pub use correction::AreaCorrection;
pub use dataset::{ColumnData, ColumnarData};
pub use error::{AlgorithmError, ArtifactError, ConfigError, MeshError, SearchError, SearchResult};
pub use mesh::SurfaceMesh;
pub use progress::{ProgressSink, ProgressUpdate, TracingProgress};
pub use report::print_report;
pub use search::{AnalysisOutcome, ClusterSearch};
