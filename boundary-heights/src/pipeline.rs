/// Four-stage pipeline orchestration: load, index, resolve, assemble
use crate::assembler::{self, OutputPoint};
use crate::boundary::{self, Boundary};
use crate::error::{HeightError, Result};
use crate::grid::SpatialIndex;
use crate::policy::HeightPolicy;
use crate::resolver::{self, ResolveSummary, ResolvedPoint};
use crate::subset::{self, CloudSource};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Full configuration surface of one run. Deserializable so front ends
/// can hand over a JSON document; missing fields take the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Elevation mode name: `relief`, `surface_p10` or `p95`.
    pub mode: String,
    /// Neighbour search radius in cloud units.
    pub radius: f64,
    /// Neighbour cap per query.
    pub max_neighbours: usize,
    /// Fixed additive offset applied to estimated elevations.
    pub offset: f64,
    /// Use a vertex's own elevation when it carries one.
    pub prefer_source_z: bool,
    /// Resample boundaries at this horizontal spacing before resolving.
    pub densify_step: Option<f64>,
    /// Margin added around the boundary extent when loading the cloud.
    pub region_padding: f64,
    /// Subset cap, 0 for no cap.
    pub max_points: usize,
    /// Seed for the subsampling reservoir.
    pub seed: u64,
    pub default_colour: (u8, u8, u8),
    pub layer_colours: HashMap<String, (u8, u8, u8)>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: "relief".to_string(),
            radius: 2.0,
            max_neighbours: 64,
            offset: 0.0,
            prefer_source_z: false,
            densify_step: None,
            region_padding: 2.0,
            max_points: 2_000_000,
            seed: 0,
            default_colour: (255, 0, 0),
            layer_colours: HashMap::new(),
        }
    }
}

/// Everything one run produces. The point list goes to the external
/// writer; the summary tells the user how much was estimated vs. carried
/// over vs. left unresolved.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub points: Vec<OutputPoint>,
    pub summary: ResolveSummary,
    pub subset_size: usize,
}

/// Run the whole pipeline: region from boundary extents, subset load,
/// index build, per-vertex resolution, output assembly.
pub fn run(
    source: &mut dyn CloudSource,
    boundaries: &[Boundary],
    config: &RunConfig,
) -> Result<RunOutput> {
    run_cancellable(source, boundaries, config, &AtomicBool::new(false))
}

/// Same as [`run`], checking `cancel` between boundaries so an abort
/// does not have to wait for the whole boundary set.
pub fn run_cancellable(
    source: &mut dyn CloudSource,
    boundaries: &[Boundary],
    config: &RunConfig,
    cancel: &AtomicBool,
) -> Result<RunOutput> {
    let policy = HeightPolicy::from_mode(
        &config.mode,
        config.radius,
        config.max_neighbours,
        config.offset,
    )?;

    let region = boundary::extent(boundaries)
        .ok_or(HeightError::NoBoundaries)?
        .padded(config.region_padding);

    let subset = subset::load_subset(source, &region, config.max_points, config.seed)?;
    let subset_size = subset.len();

    let index = SpatialIndex::build(subset);
    let fallback = index.median_elevation();

    let boundaries: Vec<Boundary> = match config.densify_step {
        Some(step) => boundaries
            .iter()
            .map(|b| boundary::densify(b, step))
            .collect::<Result<_>>()?,
        None => boundaries.to_vec(),
    };

    let pb = ProgressBar::new(boundaries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.green/blue}] {pos}/{len} boundaries ({percent}%) {msg}")
            .unwrap()
            .progress_chars("▉▊▋▌▍▎▏ "),
    );
    pb.set_message("Resolving vertices");

    // The index is immutable now, so boundaries resolve in parallel.
    // Vertex order within each boundary is preserved by construction.
    let per_boundary: Vec<Vec<ResolvedPoint>> = boundaries
        .par_iter()
        .map(|b| {
            if cancel.load(Ordering::Relaxed) {
                return Vec::new();
            }
            let resolved =
                resolver::resolve(b, &policy, &index, config.prefer_source_z, fallback);
            pb.inc(1);
            resolved
        })
        .collect();
    pb.finish_with_message("Vertices resolved");

    if cancel.load(Ordering::Relaxed) {
        return Err(HeightError::Cancelled);
    }

    let layer_of_boundary: HashMap<u32, String> = boundaries
        .iter()
        .map(|b| (b.id, b.layer.clone()))
        .collect();
    let resolved: Vec<ResolvedPoint> = per_boundary.into_iter().flatten().collect();
    let summary = ResolveSummary::tally(&resolved);

    let points = assembler::assemble(
        &resolved,
        &layer_of_boundary,
        &config.layer_colours,
        config.default_colour,
    );

    println!(
        "Resolved {} vertices: {} from source, {} estimated, {} unresolved",
        summary.total(),
        summary.source,
        summary.estimated,
        summary.unresolved
    );

    Ok(RunOutput {
        points,
        summary,
        subset_size,
    })
}
