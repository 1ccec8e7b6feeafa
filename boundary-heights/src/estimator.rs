/// Neighbourhood elevation estimation over the spatial index
use crate::grid::SpatialIndex;
use crate::policy::{Aggregate, Discovery, HeightPolicy};

/// Estimate the surface elevation at a 2D query location.
///
/// Gathers neighbours per the policy's discovery mode, aggregates their
/// elevations and applies the policy offset. Returns `None` when no
/// neighbour was found; the caller must not invent a surface value from
/// that. Read-only over the index, safe to call concurrently.
pub fn estimate(index: &SpatialIndex, x: f64, y: f64, policy: &HeightPolicy) -> Option<f64> {
    let neighbours = match policy.discovery {
        Discovery::Radius {
            radius,
            max_neighbours,
        } => index.radius_query(x, y, radius, max_neighbours),
        Discovery::KNearest { k } => index.knn_query(x, y, k),
    };
    if neighbours.is_empty() {
        return None;
    }

    let mut zs: Vec<f64> = neighbours.iter().map(|p| p.z).collect();
    let raw = match policy.aggregate {
        Aggregate::Percentile(p) => {
            zs.sort_unstable_by(f64::total_cmp);
            percentile_sorted(&zs, p)
        }
        Aggregate::Mean => zs.iter().sum::<f64>() / zs.len() as f64,
    };

    Some(raw + policy.offset)
}

/// Percentile of an already sorted slice, linearly interpolated at rank
/// `p/100 * (n-1)`. A single element is returned unchanged for any `p`.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let rank = p / 100.0 * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{CloudPoint, PointSubset};
    use crate::region::Region;

    fn index_of(points: Vec<CloudPoint>) -> SpatialIndex {
        let mut region = Region::new();
        for p in &points {
            region.update(p.x, p.y);
        }
        SpatialIndex::build(PointSubset { points, region })
    }

    fn cluster_at_origin(zs: &[f64]) -> SpatialIndex {
        index_of(
            zs.iter()
                .enumerate()
                .map(|(i, &z)| CloudPoint::new(i as f64 * 0.01, 0.0, z))
                .collect(),
        )
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        let zs = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((percentile_sorted(&zs, 10.0) - 1.4).abs() < 1e-12);
        assert!((percentile_sorted(&zs, 50.0) - 3.0).abs() < 1e-12);
        assert!((percentile_sorted(&zs, 95.0) - 4.8).abs() < 1e-12);
        assert_eq!(percentile_sorted(&zs, 0.0), 1.0);
        assert_eq!(percentile_sorted(&zs, 100.0), 5.0);
    }

    #[test]
    fn estimate_applies_percentile_over_neighbours() {
        let index = cluster_at_origin(&[5.0, 1.0, 3.0, 2.0, 4.0]);
        let policy = HeightPolicy::new(
            Discovery::Radius {
                radius: 1.0,
                max_neighbours: 16,
            },
            Aggregate::Percentile(10.0),
            0.0,
        )
        .unwrap();

        let z = estimate(&index, 0.0, 0.0, &policy).unwrap();
        assert!((z - 1.4).abs() < 1e-12);
    }

    #[test]
    fn estimate_mean_and_offset() {
        let index = cluster_at_origin(&[2.0, 4.0]);
        let policy = HeightPolicy::new(
            Discovery::KNearest { k: 2 },
            Aggregate::Mean,
            0.25,
        )
        .unwrap();

        assert_eq!(estimate(&index, 0.0, 0.0, &policy), Some(3.25));
    }

    #[test]
    fn single_neighbour_wins_for_any_percentile() {
        let index = cluster_at_origin(&[7.5]);
        for p in [0.0, 10.0, 50.0, 95.0, 100.0] {
            let policy = HeightPolicy::new(
                Discovery::KNearest { k: 1 },
                Aggregate::Percentile(p),
                0.0,
            )
            .unwrap();
            assert_eq!(estimate(&index, 0.0, 0.0, &policy), Some(7.5));
        }
    }

    #[test]
    fn no_neighbours_is_not_an_estimate() {
        let empty = index_of(Vec::new());
        let policy = HeightPolicy::new(
            Discovery::Radius {
                radius: 5.0,
                max_neighbours: 8,
            },
            Aggregate::Percentile(50.0),
            0.0,
        )
        .unwrap();
        assert_eq!(estimate(&empty, 0.0, 0.0, &policy), None);

        // Populated index, but the query sits far outside the radius.
        let far = cluster_at_origin(&[1.0, 2.0]);
        assert_eq!(estimate(&far, 1000.0, 1000.0, &policy), None);
    }
}
