/// Output record assembly for merging with the source cloud
use crate::resolver::ResolvedPoint;
use serde::Serialize;
use std::collections::HashMap;

/// One output record, ready for the external writer to merge with the
/// original cloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutputPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub colour: (u8, u8, u8),
    pub boundary_id: u32,
}

/// Map resolved points to output records, colouring each one from its
/// boundary's layer. Pure transformation: no filtering, no reordering.
/// Boundaries on an unmapped layer get the default colour.
pub fn assemble(
    resolved: &[ResolvedPoint],
    layer_of_boundary: &HashMap<u32, String>,
    layer_colours: &HashMap<String, (u8, u8, u8)>,
    default_colour: (u8, u8, u8),
) -> Vec<OutputPoint> {
    resolved
        .iter()
        .map(|point| {
            let colour = layer_of_boundary
                .get(&point.boundary_id)
                .and_then(|layer| layer_colours.get(layer))
                .copied()
                .unwrap_or(default_colour);

            OutputPoint {
                x: point.x,
                y: point.y,
                z: point.z,
                colour,
                boundary_id: point.boundary_id,
            }
        })
        .collect()
}
