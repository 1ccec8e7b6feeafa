//! Elevation-aware augmentation of point clouds from boundary linework.
//!
//! Takes 2D (or partially 3D) boundary polylines plus a large LAS/LAZ
//! point cloud and produces output points whose elevations follow the
//! surface evidence around each vertex. The pipeline is four stages:
//! load a region-restricted subset of the cloud, index it over the
//! horizontal plane, resolve every boundary vertex against the index,
//! and assemble coloured output records for an external writer to merge
//! with the original cloud.

pub mod assembler;
pub mod boundary;
pub mod error;
pub mod estimator;
pub mod grid;
pub mod las_source;
pub mod pipeline;
pub mod point;
pub mod policy;
pub mod region;
pub mod resolver;
pub mod subset;

pub use assembler::OutputPoint;
pub use boundary::{Boundary, Vertex};
pub use error::{HeightError, Result};
pub use grid::SpatialIndex;
pub use pipeline::{run, run_cancellable, RunConfig, RunOutput};
pub use point::{CloudPoint, PointSubset};
pub use policy::{Aggregate, Discovery, HeightPolicy};
pub use region::Region;
pub use resolver::{ElevationSource, ResolveSummary, ResolvedPoint};
