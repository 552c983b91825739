//! Region query: which vertices and triangles a brush sphere can touch.
//!
//! The query drives a [`SpatialIndex`] with a [`SphereRegionVisitor`]. The
//! visitor prunes nodes whose bounds miss the sphere, accepts every triangle
//! under a node the sphere fully contains, and tests the remaining triangles
//! one by one. Accepted triangles are recorded against each of their three
//! vertices by global [`TriangleId`], forming the per-stroke incidence map.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::geometry::{GeometryBuffer, Triangle, TriangleId};
use crate::spatial::{Aabb, Containment, ShapecastVisitor, SpatialIndex, Sphere};

/// Vertices and triangles reached by one brush placement.
///
/// A region is cleared and refilled by every query, so one instance can be
/// kept around as scratch space and reused stroke after stroke.
#[derive(Debug, Clone, Default)]
pub struct StrokeRegion {
    /// Unique touched vertices, ascending
    vertices: Vec<u32>,
    /// Touched vertex -> accepted triangles containing it
    incidence: HashMap<u32, Vec<TriangleId>>,
    /// Accepted triangles; an index may offer a triangle under several nodes
    accepted: HashSet<TriangleId>,
}

impl StrokeRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a query into a fresh region.
    pub fn query<I: SpatialIndex>(index: &I, geometry: &GeometryBuffer, sphere: Sphere) -> Self {
        let mut region = Self::new();
        region.fill(index, geometry, sphere);
        region
    }

    /// Replace the contents of this region with the result of a new query.
    pub fn fill<I: SpatialIndex>(&mut self, index: &I, geometry: &GeometryBuffer, sphere: Sphere) {
        self.clear();

        let mut visitor = SphereRegionVisitor {
            sphere,
            region: self,
        };
        index.shapecast(geometry, &mut visitor);

        self.vertices.extend(self.incidence.keys().copied());
        self.vertices.sort_unstable();

        trace!(
            "region query: {} triangles, {} vertices",
            self.accepted.len(),
            self.vertices.len()
        );
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.incidence.clear();
        self.accepted.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Unique vertex indices of every accepted triangle, ascending.
    pub fn vertices(&self) -> &[u32] {
        &self.vertices
    }

    /// Accepted triangles containing `vertex` (empty if the vertex was not touched).
    pub fn incident_triangles(&self, vertex: u32) -> &[TriangleId] {
        self.incidence
            .get(&vertex)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains_vertex(&self, vertex: u32) -> bool {
        self.incidence.contains_key(&vertex)
    }

    pub fn triangle_count(&self) -> usize {
        self.accepted.len()
    }

    fn record(&mut self, triangle: &Triangle) {
        if !self.accepted.insert(triangle.id) {
            return;
        }
        for vertex in triangle.vertices {
            self.incidence.entry(vertex).or_default().push(triangle.id);
        }
    }
}

/// Region and primitive tests for a brush sphere.
pub(crate) struct SphereRegionVisitor<'a> {
    sphere: Sphere,
    region: &'a mut StrokeRegion,
}

impl ShapecastVisitor for SphereRegionVisitor<'_> {
    fn intersects_bounds(&mut self, bounds: &Aabb) -> Containment {
        self.sphere.classify_aabb(bounds)
    }

    fn intersects_triangle(&mut self, triangle: &Triangle, contained: bool) -> bool {
        let [a, b, c] = triangle.positions;
        if contained || self.sphere.intersects_triangle(a, b, c) {
            self.region.record(triangle);
        }
        // Collect every match.
        false
    }
}
