use thiserror::Error;

/// Invalid analysis inputs, detected before any column is touched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Negative threshold cannot be positive, got {0}")]
    NegativeThresholdPositive(f32),
    #[error("Positive threshold cannot be negative, got {0}")]
    PositiveThresholdNegative(f32),
    #[error("P-Value must be between 0.0 and 1.0, got {0}")]
    PValueOutOfRange(f32),
    #[error("Permutation iterations must be positive")]
    ZeroIterations,
    #[error("{0} file name is empty")]
    EmptyFileName(&'static str),
}

/// Failure of one column's clustering computation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Clustering failed for column {column}: {message}")]
pub struct AlgorithmError {
    /// 1-based column the failing computation was working on.
    pub column: usize,
    pub message: String,
}

impl AlgorithmError {
    pub fn new(column: usize, message: impl Into<String>) -> Self {
        Self {
            column,
            message: message.into(),
        }
    }
}

pub type AlgorithmResult<T> = std::result::Result<T, AlgorithmError>;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid column: {column} for {dataset} with {column_count} columns")]
    InvalidColumn {
        column: usize,
        column_count: usize,
        dataset: String,
    },
    #[error(transparent)]
    Algorithm(#[from] AlgorithmError),
    #[error("Cluster search cancelled")]
    Cancelled,
    #[error("Unable to write report: {0}")]
    Io(#[from] std::io::Error),
}

impl SearchError {
    /// True for errors raised by validation, before any column was dispatched.
    pub fn is_pre_dispatch(&self) -> bool {
        matches!(self, Self::Config(_) | Self::InvalidColumn { .. })
    }
}

pub type SearchResult<T> = std::result::Result<T, SearchError>;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("Surface has no nodes")]
    NoNodes,
    #[error("Surface has no triangles")]
    NoTriangles,
    #[error("Triangle {triangle} references node {node} but the surface has {node_count} nodes")]
    NodeOutOfRange {
        triangle: usize,
        node: usize,
        node_count: usize,
    },
}

/// Failure to persist a derived surface file. Never escalated past emission.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Unsupported artifact file name")]
    Format(#[from] common::FileExtensionError),
    #[error("Artifact serialization failed")]
    Serialize(#[from] common::SerdeFormatError),
    #[error("Artifact write failed")]
    Io(#[from] std::io::Error),
}
