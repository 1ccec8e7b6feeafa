/// Region-restricted subset loading with seedable uniform subsampling
use crate::error::{HeightError, Result};
use crate::point::{CloudPoint, PointSubset};
use crate::region::Region;
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Streaming access to a point cloud, the boundary to the excluded
/// ingestion layer. Implementations enumerate every point exactly once
/// per call; the loader does the region filtering.
pub trait CloudSource {
    /// Total point count if cheaply known, used to size progress reporting.
    fn point_count_hint(&self) -> Option<u64> {
        None
    }

    /// Stream every point to the visitor.
    fn for_each_point(&mut self, visit: &mut dyn FnMut(CloudPoint)) -> Result<()>;
}

/// In-memory source over an existing point vector, used by synthetic
/// runs and tests.
impl CloudSource for Vec<CloudPoint> {
    fn point_count_hint(&self) -> Option<u64> {
        Some(self.len() as u64)
    }

    fn for_each_point(&mut self, visit: &mut dyn FnMut(CloudPoint)) -> Result<()> {
        for point in self.iter() {
            visit(*point);
        }
        Ok(())
    }
}

/// Load the in-region subset of a cloud, capped at `max_points`.
///
/// A cap of `0` means no cap. When more than `max_points` points fall in
/// the region the kept set is a uniform random sample without replacement
/// (reservoir sampling), deterministic for a fixed `seed` and input order.
/// Signals `EmptyRegion` when nothing falls inside `region`.
pub fn load_subset(
    source: &mut dyn CloudSource,
    region: &Region,
    max_points: usize,
    seed: u64,
) -> Result<PointSubset> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut kept: Vec<CloudPoint> = Vec::new();
    let mut in_region = 0usize;
    let mut streamed = 0u64;
    let mut cloud_extent = Region::new();

    let pb = match source.point_count_hint() {
        Some(total) => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{bar:40.cyan/blue}] {pos}/{len} points ({percent}%) {msg}")
                    .unwrap()
                    .progress_chars("▉▊▋▌▍▎▏ "),
            );
            pb.set_message("Loading cloud subset");
            Some(pb)
        }
        None => None,
    };

    source.for_each_point(&mut |point| {
        streamed += 1;
        if let Some(pb) = &pb {
            if streamed % 50_000 == 0 {
                pb.set_position(streamed);
            }
        }

        cloud_extent.update(point.x, point.y);
        if !region.contains(point.x, point.y) {
            return;
        }
        in_region += 1;

        if max_points == 0 || kept.len() < max_points {
            kept.push(point);
        } else {
            // Reservoir step: the incoming point displaces a kept one with
            // probability max_points / in_region.
            let slot = rng.gen_range(0..in_region);
            if slot < max_points {
                kept[slot] = point;
            }
        }
    })?;

    if let Some(pb) = &pb {
        pb.finish_with_message("Cloud subset loaded");
    }

    if in_region == 0 {
        return Err(HeightError::EmptyRegion {
            region: *region,
            cloud_extent: cloud_extent.is_valid().then_some(cloud_extent),
        });
    }

    println!(
        "Loaded {} of {} in-region points (cap {})",
        kept.len(),
        in_region,
        if max_points == 0 {
            "none".to_string()
        } else {
            max_points.to_string()
        }
    );

    Ok(PointSubset {
        points: kept,
        region: *region,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_cloud(n_per_side: usize, spacing: f64) -> Vec<CloudPoint> {
        let mut points = Vec::new();
        for i in 0..n_per_side {
            for j in 0..n_per_side {
                points.push(CloudPoint::new(
                    i as f64 * spacing,
                    j as f64 * spacing,
                    (i + j) as f64,
                ));
            }
        }
        points
    }

    fn region(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Region {
        let mut r = Region::new();
        r.update(min_x, min_y);
        r.update(max_x, max_y);
        r
    }

    #[test]
    fn every_kept_point_lies_inside_the_region() {
        let mut cloud = square_cloud(20, 1.0);
        let roi = region(3.0, 3.0, 8.0, 8.0);

        let subset = load_subset(&mut cloud, &roi, 0, 7).unwrap();
        assert!(!subset.is_empty());
        for p in &subset.points {
            assert!(roi.contains(p.x, p.y), "escaped region: {:?}", p);
        }
    }

    #[test]
    fn cap_is_exact_when_population_exceeds_it() {
        let mut cloud = square_cloud(20, 1.0); // 400 points, all in region
        let roi = region(-1.0, -1.0, 20.0, 20.0);

        let subset = load_subset(&mut cloud, &roi, 150, 42).unwrap();
        assert_eq!(subset.len(), 150);
        for p in &subset.points {
            assert!(roi.contains(p.x, p.y));
        }
    }

    #[test]
    fn cap_is_ignored_when_population_is_smaller() {
        let mut cloud = square_cloud(5, 1.0); // 25 points
        let roi = region(-1.0, -1.0, 10.0, 10.0);

        let subset = load_subset(&mut cloud, &roi, 1000, 42).unwrap();
        assert_eq!(subset.len(), 25);
    }

    #[test]
    fn same_seed_yields_the_same_sample() {
        let roi = region(-1.0, -1.0, 20.0, 20.0);

        let a = load_subset(&mut square_cloud(20, 1.0), &roi, 100, 9).unwrap();
        let b = load_subset(&mut square_cloud(20, 1.0), &roi, 100, 9).unwrap();
        assert_eq!(a.points, b.points);
    }

    #[test]
    fn empty_region_is_signalled_with_cloud_extent() {
        let mut cloud = square_cloud(5, 1.0);
        let roi = region(100.0, 100.0, 110.0, 110.0);

        match load_subset(&mut cloud, &roi, 0, 0) {
            Err(HeightError::EmptyRegion { cloud_extent, .. }) => {
                let extent = cloud_extent.expect("extent observed");
                assert_eq!(extent.max_x, 4.0);
            }
            other => panic!("expected EmptyRegion, got {:?}", other.map(|s| s.len())),
        }
    }
}
