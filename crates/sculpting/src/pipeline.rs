//! One stroke, end to end.
//!
//! A stroke runs three passes in a fixed order:
//! 1. Region query: brush sphere -> touched vertices and their incident triangles
//! 2. Displacement: in-range vertices move along the brush direction
//! 3. Normal refresh: touched vertices get normals from the new positions
//!
//! Normals are written only after every position write of the stroke, and
//! only if at least one vertex moved.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::brush::BrushState;
use crate::deformation::displace_region;
use crate::geometry::GeometryBuffer;
use crate::normals::refresh_normals;
use crate::region::StrokeRegion;
use crate::spatial::SpatialIndex;

/// Summary of one stroke.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeReport {
    /// Triangles accepted by the region query
    pub triangles_touched: usize,
    /// Unique vertices reached by the region query
    pub candidate_vertices: usize,
    /// Vertices within the brush radius that were displaced
    pub vertices_moved: usize,
    /// Normals rewritten by the refresh pass (0 if nothing moved)
    pub normals_refreshed: usize,
}

impl StrokeReport {
    pub fn is_noop(&self) -> bool {
        self.vertices_moved == 0
    }
}

/// Apply one stroke of `brush` to `geometry`.
///
/// `scratch` holds the region of the previous stroke and is overwritten; it
/// is passed in so its allocations can be reused from frame to frame.
pub fn apply_stroke<I: SpatialIndex>(
    geometry: &mut GeometryBuffer,
    index: &I,
    brush: &BrushState,
    scratch: &mut StrokeRegion,
) -> StrokeReport {
    scratch.fill(index, geometry, brush.sphere());

    let mut report = StrokeReport {
        triangles_touched: scratch.triangle_count(),
        candidate_vertices: scratch.vertices().len(),
        ..Default::default()
    };

    if scratch.is_empty() {
        debug!("stroke at {:?}: brush touches no geometry", brush.center);
        return report;
    }

    let displaced = displace_region(geometry, scratch, brush);
    report.vertices_moved = displaced.len();

    if !displaced.is_empty() {
        report.normals_refreshed = refresh_normals(geometry, scratch);
    }

    debug!(
        "stroke at {:?}: {} triangles, {} candidates, {} moved, {} normals",
        brush.center,
        report.triangles_touched,
        report.candidate_vertices,
        report.vertices_moved,
        report.normals_refreshed
    );

    report
}
