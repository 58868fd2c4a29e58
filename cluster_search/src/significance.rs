//! Empirical significance from a permuted statistical map.
//!
//! `permuted` is always the descending ranking of the largest cluster of each
//! permuted column, as produced by a keep-largest-only search.

use crate::cluster::Cluster;

/// Corrected area a cluster must reach to be significant at `p_value`.
///
/// `f32::MAX` when the permuted map produced no clusters at all.
pub fn significant_corrected_area(permuted: &[Cluster], p_value: f32, iterations: usize) -> f32 {
    if permuted.is_empty() {
        return f32::MAX;
    }

    let rank = (p_value * iterations as f32) as isize - 1;
    let index = rank.clamp(0, permuted.len() as isize - 1) as usize;
    permuted[index].area_corrected
}

/// Rank of `area` among the permuted areas: how many permuted clusters are larger.
fn permuted_rank(area: f32, permuted: &[Cluster]) -> usize {
    if area > permuted[0].area_corrected {
        return 0;
    }

    permuted
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| area < pair[0].area_corrected && area >= pair[1].area_corrected)
        .map(|(index, _)| index)
        .last()
        .unwrap_or(permuted.len() - 1)
}

/// Sets `p_value = rank / iterations` on every cluster.
///
/// Leaves p-values unset when the permuted map produced no clusters.
pub fn assign_p_values(clusters: &mut [Cluster], permuted: &[Cluster], iterations: usize) {
    if permuted.is_empty() || iterations == 0 {
        return;
    }

    for cluster in clusters.iter_mut() {
        let rank = permuted_rank(cluster.area_corrected, permuted).min(iterations);
        cluster.p_value = Some(rank as f32 / iterations as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::cluster_with_area;

    fn permuted(areas: &[f32]) -> Vec<Cluster> {
        areas
            .iter()
            .enumerate()
            .map(|(column, &area)| cluster_with_area(column + 1, area, 0))
            .collect()
    }

    #[test]
    fn significant_area_indexes_permuted_ranking() {
        let ranking = permuted(&[50.0, 40.0, 30.0, 20.0, 10.0]);
        // 0.4 * 5 - 1 = 1
        assert_eq!(significant_corrected_area(&ranking, 0.4, 5), 40.0);
        // below the first rank clamps to the largest
        assert_eq!(significant_corrected_area(&ranking, 0.0, 5), 50.0);
        // beyond the ranking clamps to the smallest
        assert_eq!(significant_corrected_area(&ranking, 1.0, 100), 10.0);
        assert_eq!(significant_corrected_area(&[], 0.05, 100), f32::MAX);
    }

    #[test]
    fn p_values_follow_permuted_rank() {
        let ranking = permuted(&[50.0, 40.0, 30.0, 20.0]);
        let mut clusters = vec![
            cluster_with_area(1, 60.0, 0),
            cluster_with_area(1, 35.0, 0),
            cluster_with_area(1, 40.0, 0),
            cluster_with_area(1, 5.0, 0),
        ];

        assign_p_values(&mut clusters, &ranking, 10);
        let p: Vec<Option<f32>> = clusters.iter().map(|c| c.p_value).collect();
        assert_eq!(p, vec![Some(0.0), Some(0.1), Some(0.0), Some(0.3)]);
    }

    #[test]
    fn p_values_unset_without_permuted_clusters() {
        let mut clusters = vec![cluster_with_area(1, 60.0, 0)];
        assign_p_values(&mut clusters, &[], 10);
        assert_eq!(clusters[0].p_value, None);
    }
}
