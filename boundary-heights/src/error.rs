//! Error types for the boundary height pipeline.

use crate::region::Region;
use thiserror::Error;

/// Boundary height pipeline error type.
///
/// Per-vertex estimation failures are not represented here: a query with no
/// neighbours surfaces as `None` from the estimator and an `Unresolved` tag
/// from the resolver, never as an error.
#[derive(Error, Debug)]
pub enum HeightError {
    /// No cloud points fell inside the region of interest. The observed
    /// cloud extent is reported alongside so a mismatch is obvious.
    #[error("no cloud points inside region of interest {region:?}; cloud extent {cloud_extent:?}")]
    EmptyRegion {
        region: Region,
        cloud_extent: Option<Region>,
    },

    /// Rejected at policy construction, never reaches query time.
    #[error("invalid height policy: {0}")]
    InvalidPolicy(String),

    /// Densification step must be strictly positive.
    #[error("invalid densify step {0} (must be > 0)")]
    InvalidStep(f64),

    #[error("point cloud read failed: {0}")]
    Las(#[from] las::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// No boundary carried any vertex, so there is no region to query.
    #[error("no boundary vertices to resolve")]
    NoBoundaries,

    /// Cooperative abort observed between boundaries.
    #[error("run cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, HeightError>;
