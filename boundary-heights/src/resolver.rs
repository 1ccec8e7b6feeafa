/// Per-vertex elevation resolution against the spatial index
use crate::boundary::Boundary;
use crate::estimator;
use crate::grid::SpatialIndex;
use crate::policy::HeightPolicy;
use serde::Serialize;

/// How a resolved point's elevation was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElevationSource {
    /// Source elevation used verbatim, no index query performed.
    Source,
    Estimated,
    EstimatedOffset,
    /// No neighbours found; carries the run-wide fallback (or NaN).
    Unresolved,
}

/// A boundary vertex with its elevation finalised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub boundary_id: u32,
    pub source: ElevationSource,
}

/// Per-tag counts across a run, reported so output quality is judgeable.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolveSummary {
    pub source: usize,
    pub estimated: usize,
    pub unresolved: usize,
}

impl ResolveSummary {
    pub fn tally(points: &[ResolvedPoint]) -> Self {
        let mut summary = Self::default();
        for p in points {
            match p.source {
                ElevationSource::Source => summary.source += 1,
                ElevationSource::Estimated | ElevationSource::EstimatedOffset => {
                    summary.estimated += 1
                }
                ElevationSource::Unresolved => summary.unresolved += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.source + self.estimated + self.unresolved
    }
}

/// Resolve every vertex of one boundary, in order, one resolved point
/// per vertex.
///
/// With `prefer_source_z` set, a vertex flagged `has_z` short-circuits:
/// its elevation passes through untouched and the index is never queried.
/// Everything else is estimated; a vertex with no neighbours gets the
/// `fallback` elevation (plus the policy offset) and the `Unresolved`
/// tag, or NaN when no fallback exists, so no vertex is ever dropped.
pub fn resolve(
    boundary: &Boundary,
    policy: &HeightPolicy,
    index: &SpatialIndex,
    prefer_source_z: bool,
    fallback: Option<f64>,
) -> Vec<ResolvedPoint> {
    boundary
        .vertices
        .iter()
        .map(|vertex| {
            if prefer_source_z && vertex.has_z {
                return ResolvedPoint {
                    x: vertex.x,
                    y: vertex.y,
                    z: vertex.z,
                    boundary_id: boundary.id,
                    source: ElevationSource::Source,
                };
            }

            match estimator::estimate(index, vertex.x, vertex.y, policy) {
                Some(z) => ResolvedPoint {
                    x: vertex.x,
                    y: vertex.y,
                    z,
                    boundary_id: boundary.id,
                    source: if policy.offset != 0.0 {
                        ElevationSource::EstimatedOffset
                    } else {
                        ElevationSource::Estimated
                    },
                },
                None => ResolvedPoint {
                    x: vertex.x,
                    y: vertex.y,
                    z: fallback.map_or(f64::NAN, |f| f + policy.offset),
                    boundary_id: boundary.id,
                    source: ElevationSource::Unresolved,
                },
            }
        })
        .collect()
}
