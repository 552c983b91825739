//! Normal refresh pass.
//!
//! After a stroke moves vertices, the normal of every vertex in the stroke
//! region is rebuilt as the arithmetic mean of the unit face normals of its
//! incident triangles within that region, using post-displacement positions.
//! Vertices outside the region keep their normal untouched, even when a
//! neighbor moved.

use glam::Vec3;
use tracing::trace;

use crate::geometry::GeometryBuffer;
use crate::region::StrokeRegion;

/// Unit normal of triangle `abc` with counter-clockwise winding.
///
/// Degenerate triangles yield the zero vector.
#[inline]
pub fn triangle_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

/// Recompute the normal of every vertex in the region.
///
/// Must run only after all position writes of the stroke are done.
/// Returns the number of normals written.
pub fn refresh_normals(geometry: &mut GeometryBuffer, region: &StrokeRegion) -> usize {
    let mut written = 0;

    for &vertex in region.vertices() {
        let triangles = region.incident_triangles(vertex);
        if triangles.is_empty() {
            continue;
        }

        let sum: Vec3 = triangles.iter().map(|&t| geometry.face_normal(t)).sum();
        geometry.set_normal(vertex, sum / triangles.len() as f32);
        written += 1;
    }

    trace!("normal refresh: wrote {} normals", written);
    written
}
