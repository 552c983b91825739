//! Brush sculpting core.
//!
//! Each frame, a pointer hit on a triangle mesh becomes at most one stroke
//! that pushes nearby vertices along the surface normal and then refreshes
//! the normals it invalidated:
//! - [`geometry::GeometryBuffer`] - Shared vertex positions, normals and triangle indices
//! - [`spatial`] - Bounding volumes and the shapecast seam to a spatial index
//! - [`region::StrokeRegion`] - Vertices touched by a brush, with their incident triangles
//! - [`deformation`] - Linear-falloff displacement along the brush direction
//! - [`normals`] - Per-vertex normal refresh limited to the stroke region
//! - [`pipeline`] - One stroke: region query, displacement, normal refresh
//! - [`picking`] - Ray picking and world to mesh space conversion
//! - [`driver::StrokeDriver`] - Idle/Sculpting state machine fed per frame
//!
//! Brush parameters live in the `sculpting-config` crate and are re-exported
//! here as [`SculptParams`].

pub mod brush;
pub mod deformation;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod normals;
pub mod picking;
pub mod pipeline;
pub mod region;
pub mod spatial;

#[cfg(feature = "bevy")]
mod bevy_mesh;

pub use brush::{linear_falloff, BrushState};
pub use deformation::{displace_region, DisplacementResult};
pub use driver::{BrushPlacement, FrameInput, FrameOutcome, SculptState, StrokeDriver};
pub use error::GeometryError;
pub use geometry::{GeometryBuffer, Triangle, TriangleId};
pub use normals::{refresh_normals, triangle_normal};
pub use picking::{pick_mesh, LocalHit, PickHit, Ray};
pub use pipeline::{apply_stroke, StrokeReport};
pub use region::StrokeRegion;
pub use spatial::{Aabb, Containment, FlatIndex, ShapecastVisitor, SpatialIndex, Sphere};

pub use sculpting_config::{SculptParams, MIN_BRUSH_RADIUS};
