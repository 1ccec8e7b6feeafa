/// Boundary polyline model and segment densification
use crate::error::{HeightError, Result};
use crate::region::Region;
use serde::{Deserialize, Serialize};

/// One vertex of a boundary polyline. `has_z` distinguishes a surveyed
/// source elevation from a default/sentinel `z`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub has_z: bool,
}

impl Vertex {
    /// Vertex without a meaningful source elevation
    pub fn flat(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            has_z: false,
        }
    }

    /// Vertex carrying an authoritative source elevation
    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            has_z: true,
        }
    }
}

/// Ordered polyline from the vector input, identified and coloured by
/// layer. Expected to carry at least two vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub id: u32,
    pub layer: String,
    pub vertices: Vec<Vertex>,
}

/// Combined horizontal extent of all boundary vertices, `None` when no
/// boundary carries any vertex.
pub fn extent(boundaries: &[Boundary]) -> Option<Region> {
    let mut region = Region::new();
    for boundary in boundaries {
        for v in &boundary.vertices {
            region.update(v.x, v.y);
        }
    }
    region.is_valid().then_some(region)
}

/// Resample a boundary so consecutive vertices sit at most `step` apart
/// in the horizontal plane. Interpolated vertices inherit a linearly
/// blended elevation only when both segment endpoints carry one.
/// Consecutive duplicates (within 1e-9 per axis) collapse to one vertex.
pub fn densify(boundary: &Boundary, step: f64) -> Result<Boundary> {
    if step <= 0.0 || !step.is_finite() {
        return Err(HeightError::InvalidStep(step));
    }
    if boundary.vertices.len() < 2 {
        return Ok(boundary.clone());
    }

    let mut out: Vec<Vertex> = Vec::new();
    for pair in boundary.vertices.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let seg_len = dx.hypot(dy);
        if seg_len == 0.0 {
            continue;
        }

        let n = ((seg_len / step).ceil() as usize).max(1);
        for j in 0..n {
            let t = j as f64 / n as f64;
            let vertex = if a.has_z && b.has_z {
                Vertex::with_z(a.x + dx * t, a.y + dy * t, a.z + (b.z - a.z) * t)
            } else {
                Vertex::flat(a.x + dx * t, a.y + dy * t)
            };
            out.push(vertex);
        }
    }
    out.push(*boundary.vertices.last().expect("len checked above"));

    let mut dedup: Vec<Vertex> = Vec::with_capacity(out.len());
    for v in out {
        let duplicate = dedup
            .last()
            .is_some_and(|prev| (prev.x - v.x).abs() <= 1e-9 && (prev.y - v.y).abs() <= 1e-9);
        if !duplicate {
            dedup.push(v);
        }
    }

    Ok(Boundary {
        id: boundary.id,
        layer: boundary.layer.clone(),
        vertices: dedup,
    })
}
