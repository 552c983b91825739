//! Displacement pass: push touched vertices along the brush direction.
//!
//! Every vertex of the stroke region is a candidate. Candidates farther than
//! the brush radius from the center are skipped; they were only reached
//! because they share a triangle with a vertex in range. The rest move by
//! `direction * (1 - dist / radius) * intensity`.
//!
//! Each vertex reads only its own position before writing it, so the result
//! does not depend on the order candidates are visited in.

use tracing::trace;

use crate::brush::BrushState;
use crate::geometry::GeometryBuffer;
use crate::region::StrokeRegion;

/// Result of a displacement pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplacementResult {
    /// Vertices whose position was written, ascending
    pub moved_vertices: Vec<u32>,
}

impl DisplacementResult {
    pub fn is_empty(&self) -> bool {
        self.moved_vertices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.moved_vertices.len()
    }
}

/// Apply the brush to every in-range vertex of the region.
///
/// Only positions are written; normals and topology are left alone.
pub fn displace_region(
    geometry: &mut GeometryBuffer,
    region: &StrokeRegion,
    brush: &BrushState,
) -> DisplacementResult {
    let mut result = DisplacementResult::default();

    for &vertex in region.vertices() {
        let position = geometry.position(vertex);
        let distance = position.distance(brush.center);
        if distance > brush.radius {
            continue;
        }

        let weight = brush.weight(distance);
        geometry.set_position(vertex, position + brush.offset(weight));
        result.moved_vertices.push(vertex);
    }

    trace!(
        "displacement: moved {} of {} candidates",
        result.moved_vertices.len(),
        region.vertices().len()
    );

    result
}
