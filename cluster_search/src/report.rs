//! Fixed-width text report of ranked clusters.

use std::io::Write;

use crate::cluster::Cluster;
use crate::config::SearchConfig;
use crate::search::AnalysisOutcome;

pub const REPORT_HEADER: &str =
    "Column    Thresh  Num-Nodes          Area  Area-Corrected     COG-X     COG-Y     COG-Z   P-Value";

fn format_row(cluster: &Cluster) -> String {
    let mut row = format!(
        "{:>6}  {:>8.3}  {:>9}  {:>12.6}  {:>14.6}  {:>8.3}  {:>8.3}  {:>8.3}",
        cluster.column,
        cluster.report_threshold(),
        cluster.node_count(),
        cluster.area,
        cluster.area_corrected,
        cluster.centroid.x,
        cluster.centroid.y,
        cluster.centroid.z,
    );
    if let Some(p_value) = cluster.p_value {
        row.push_str(&format!("  {p_value:>8.6}"));
    }
    row
}

/// Writes the header and one row per cluster whose corrected area reaches
/// `significant_area`.
pub fn print_report<W: Write>(
    out: &mut W,
    clusters: &[Cluster],
    significant_area: f32,
) -> std::io::Result<()> {
    writeln!(out, "{REPORT_HEADER}")?;
    for cluster in clusters
        .iter()
        .filter(|cluster| cluster.area_corrected >= significant_area)
    {
        writeln!(out, "{}", format_row(cluster))?;
    }
    Ok(())
}

/// Report of a full permutation analysis: parameters, then the cluster table.
pub fn write_analysis_report<W: Write>(
    out: &mut W,
    config: &SearchConfig,
    dataset_name: &str,
    outcome: &AnalysisOutcome,
) -> std::io::Result<()> {
    writeln!(out, "Statistical Map:     {dataset_name}")?;
    writeln!(out, "Negative Threshold:  {}", config.negative_threshold)?;
    writeln!(out, "Positive Threshold:  {}", config.positive_threshold)?;
    writeln!(out, "P-Value:             {}", config.p_value)?;
    writeln!(out, "Iterations:          {}", config.permutation_iterations)?;
    match config.area_correction_column {
        Some(column) => writeln!(out, "Correction Column:   {}", column + 1)?,
        None => writeln!(out, "Correction Column:   none")?,
    }
    writeln!(out, "Significant Area:    {}", outcome.significant_area)?;
    writeln!(out)?;

    writeln!(out, "Largest cluster per permuted column")?;
    print_report(out, &outcome.permuted_clusters, 0.0)?;
    writeln!(out)?;

    writeln!(out, "Significant clusters")?;
    print_report(out, &outcome.clusters, outcome.significant_area)
}
