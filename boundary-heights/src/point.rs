/// Cloud point data model shared across the pipeline
use crate::region::Region;

/// One point of the input cloud. Colour is carried through unmodified
/// when the source format provides it (16-bit channels, LAS convention).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub colour: Option<(u16, u16, u16)>,
}

impl CloudPoint {
    /// Convenience constructor for uncoloured points
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            colour: None,
        }
    }
}

/// Region-restricted collection of cloud points, capped at the loader's
/// configured maximum. Read-only to everything downstream of the loader.
#[derive(Debug, Clone)]
pub struct PointSubset {
    pub points: Vec<CloudPoint>,
    pub region: Region,
}

impl PointSubset {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
