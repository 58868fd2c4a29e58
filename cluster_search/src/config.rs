//! Analysis configuration.
//!
//! [`SearchConfig`] is immutable for the duration of a search. It can be
//! built in code or loaded from a YAML/JSON file; either way it must pass
//! [`SearchConfig::validate`] before any column is dispatched.

use std::path::{Path, PathBuf};

use common::FileFormat;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Budget for one polling sweep over all worker slots.
pub const POLL_BUDGET_MS: u64 = 1000;

/// Minimum surface area the clustering pass requires for a region.
pub const MINIMUM_CLUSTER_AREA: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColumnSelection {
    #[default]
    All,
    /// A single 0-based column.
    Single(usize),
}

/// Value ranges a node must fall in to take part in a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBounds {
    pub positive_min: f32,
    pub positive_max: f32,
    /// Closest to zero of the negative range.
    pub negative_min: f32,
    pub negative_max: f32,
}

impl ThresholdBounds {
    pub fn new(negative_threshold: f32, positive_threshold: f32) -> Self {
        Self {
            positive_min: positive_threshold,
            positive_max: f32::MAX,
            negative_min: negative_threshold,
            negative_max: -f32::MAX,
        }
    }

    pub fn in_positive_range(&self, value: f32) -> bool {
        value >= self.positive_min && value <= self.positive_max
    }

    pub fn in_negative_range(&self, value: f32) -> bool {
        value <= self.negative_min && value >= self.negative_max
    }
}

/// Destination files of a full analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputFiles {
    pub report: PathBuf,
    pub clusters_label: Option<PathBuf>,
    pub clusters_scalar: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub negative_threshold: f32,
    pub positive_threshold: f32,
    /// Significance probability used to pick the cut-off area from the permuted map.
    pub p_value: f32,
    pub permutation_iterations: usize,
    pub worker_count: usize,
    /// Column of the area correction table, `None` disables correction.
    pub area_correction_column: Option<usize>,
    pub minimum_cluster_area: f32,
    pub outputs: OutputFiles,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            negative_threshold: 0.0,
            positive_threshold: 0.0,
            p_value: 0.05,
            permutation_iterations: 1000,
            worker_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            area_correction_column: None,
            minimum_cluster_area: MINIMUM_CLUSTER_AREA,
            outputs: OutputFiles::default(),
        }
    }
}

impl SearchConfig {
    pub fn with_thresholds(negative_threshold: f32, positive_threshold: f32) -> Self {
        Self {
            negative_threshold,
            positive_threshold,
            ..Self::default()
        }
    }

    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn thresholds(&self) -> ThresholdBounds {
        ThresholdBounds::new(self.negative_threshold, self.positive_threshold)
    }

    /// Checks the settings needed by any cluster search.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.negative_threshold > 0.0 {
            return Err(ConfigError::NegativeThresholdPositive(
                self.negative_threshold,
            ));
        }
        if self.positive_threshold < 0.0 {
            return Err(ConfigError::PositiveThresholdNegative(
                self.positive_threshold,
            ));
        }
        if !(0.0..=1.0).contains(&self.p_value) {
            return Err(ConfigError::PValueOutOfRange(self.p_value));
        }
        Ok(())
    }

    /// Additional checks for a full permutation analysis with file output.
    pub fn validate_analysis(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.permutation_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if self.outputs.report.as_os_str().is_empty() {
            return Err(ConfigError::EmptyFileName("Report"));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let format = FileFormat::from_path(path)?;
        let text = std::fs::read_to_string(path)?;
        let config: Self = common::deserialize(&text, format)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_ranges() {
        let bounds = ThresholdBounds::new(-2.0, 3.0);
        assert!(bounds.in_positive_range(3.0));
        assert!(!bounds.in_positive_range(2.9));
        assert!(bounds.in_negative_range(-2.0));
        assert!(!bounds.in_negative_range(-1.0));
        assert!(!bounds.in_negative_range(5.0));
    }

    #[test]
    fn validate_rejects_bad_thresholds() {
        let config = SearchConfig::with_thresholds(1.0, 2.0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::NegativeThresholdPositive(1.0))
        );

        let config = SearchConfig::with_thresholds(-1.0, -1.0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::PositiveThresholdNegative(-1.0))
        );

        let config = SearchConfig {
            p_value: 1.5,
            ..SearchConfig::with_thresholds(-1.0, 1.0)
        };
        assert_eq!(config.validate(), Err(ConfigError::PValueOutOfRange(1.5)));
    }

    #[test]
    fn analysis_requires_report_and_iterations() {
        let mut config = SearchConfig::with_thresholds(-1.0, 1.0);
        assert_eq!(
            config.validate_analysis(),
            Err(ConfigError::EmptyFileName("Report"))
        );

        config.outputs.report = PathBuf::from("report.txt");
        config.permutation_iterations = 0;
        assert_eq!(config.validate_analysis(), Err(ConfigError::ZeroIterations));

        config.permutation_iterations = 10;
        assert_eq!(config.validate_analysis(), Ok(()));
    }

    #[test]
    fn load_yaml_config() -> anyhow::Result<()> {
        let path = common::test_utils::test_output_path("search_config.yaml");
        std::fs::write(
            &path,
            "negative_threshold: -2.5\n\
             positive_threshold: 2.5\n\
             worker_count: 3\n\
             area_correction_column: 0\n\
             outputs:\n  report: clusters_report.txt\n",
        )?;

        let config = SearchConfig::load(&path)?;
        assert_eq!(config.negative_threshold, -2.5);
        assert_eq!(config.worker_count, 3);
        assert_eq!(config.area_correction_column, Some(0));
        assert_eq!(config.outputs.report, PathBuf::from("clusters_report.txt"));
        assert_eq!(config.minimum_cluster_area, MINIMUM_CLUSTER_AREA);
        Ok(())
    }

    #[test]
    fn load_rejects_invalid_config() -> anyhow::Result<()> {
        let path = common::test_utils::test_output_path("invalid_search_config.json");
        std::fs::write(&path, r#"{ "positive_threshold": -1.0 }"#)?;

        let err = SearchConfig::load(&path).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::PositiveThresholdNegative(-1.0))
        );
        Ok(())
    }
}
