//! Single-node spatial index.

use tracing::trace;

use super::{Aabb, Containment, ShapecastVisitor, SpatialIndex};
use crate::geometry::GeometryBuffer;

/// An index with one node holding every triangle.
///
/// The node's bounds are captured when the index is built. Strokes move
/// vertices without touching the index, so the bounds go stale until
/// [`FlatIndex::refit`] is called.
///
/// Once a surface has been pulled more than a brush radius outside the
/// stale box, the root is pruned and that area can no longer be sculpted.
/// Hosts that sculpt repeatedly in one place call `refit` after strokes,
/// e.g. when `StrokeReport::vertices_moved` is non-zero.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    bounds: Aabb,
}

impl FlatIndex {
    pub fn new(geometry: &GeometryBuffer) -> Self {
        Self {
            bounds: geometry.bounds(),
        }
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Recompute the node bounds from the current positions.
    pub fn refit(&mut self, geometry: &GeometryBuffer) {
        self.bounds = geometry.bounds();
    }
}

impl SpatialIndex for FlatIndex {
    fn shapecast<V: ShapecastVisitor>(&self, geometry: &GeometryBuffer, visitor: &mut V) -> bool {
        let contained = match visitor.intersects_bounds(&self.bounds) {
            Containment::NotIntersected => {
                trace!("flat index: root pruned");
                return false;
            }
            Containment::Contained => true,
            Containment::Intersected => false,
        };

        geometry
            .triangles()
            .any(|triangle| visitor.intersects_triangle(&triangle, contained))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Triangle, TriangleId};
    use glam::Vec3;

    /// Records every callback and stops after `stop_after` triangles.
    struct Recorder {
        answer: Containment,
        seen: Vec<(TriangleId, bool)>,
        stop_after: Option<usize>,
    }

    impl ShapecastVisitor for Recorder {
        fn intersects_bounds(&mut self, _bounds: &Aabb) -> Containment {
            self.answer
        }

        fn intersects_triangle(&mut self, triangle: &Triangle, contained: bool) -> bool {
            self.seen.push((triangle.id, contained));
            self.stop_after.is_some_and(|n| self.seen.len() >= n)
        }
    }

    fn recorder(answer: Containment) -> Recorder {
        Recorder {
            answer,
            seen: Vec::new(),
            stop_after: None,
        }
    }

    #[test]
    fn test_pruned_root_offers_nothing() {
        let sphere = GeometryBuffer::icosphere(1.0, 1);
        let index = FlatIndex::new(&sphere);
        let mut visitor = recorder(Containment::NotIntersected);

        assert!(!index.shapecast(&sphere, &mut visitor));
        assert!(visitor.seen.is_empty());
    }

    #[test]
    fn test_offers_every_triangle_with_containment_flag() {
        let sphere = GeometryBuffer::icosphere(1.0, 1);
        let index = FlatIndex::new(&sphere);

        let mut visitor = recorder(Containment::Contained);
        index.shapecast(&sphere, &mut visitor);
        assert_eq!(visitor.seen.len(), sphere.triangle_count());
        assert!(visitor.seen.iter().all(|&(_, contained)| contained));

        let mut visitor = recorder(Containment::Intersected);
        index.shapecast(&sphere, &mut visitor);
        assert_eq!(visitor.seen.len(), sphere.triangle_count());
        assert!(visitor.seen.iter().all(|&(_, contained)| !contained));
    }

    #[test]
    fn test_visitor_can_stop_early() {
        let sphere = GeometryBuffer::icosphere(1.0, 1);
        let index = FlatIndex::new(&sphere);
        let mut visitor = Recorder {
            stop_after: Some(3),
            ..recorder(Containment::Intersected)
        };

        assert!(index.shapecast(&sphere, &mut visitor));
        assert_eq!(visitor.seen.len(), 3);
    }

    #[test]
    fn test_refit_tracks_moved_vertices() {
        let mut sphere = GeometryBuffer::icosphere(1.0, 0);
        let mut index = FlatIndex::new(&sphere);
        assert!((index.bounds().max.z - 1.0).abs() < 1e-6);

        sphere.set_position(0, Vec3::new(0.0, 0.0, 3.0));
        assert!((index.bounds().max.z - 1.0).abs() < 1e-6);

        index.refit(&sphere);
        assert!((index.bounds().max.z - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_stale_bounds_prune_until_refit() {
        use crate::region::StrokeRegion;
        use crate::spatial::Sphere;

        let mut sphere = GeometryBuffer::icosphere(1.0, 2);
        let mut index = FlatIndex::new(&sphere);

        // Pull the pole far above the box captured at build time.
        sphere.set_position(0, Vec3::new(0.0, 0.0, 3.0));
        let brush = Sphere::new(Vec3::new(0.0, 0.0, 3.0), 0.1);
        assert!(StrokeRegion::query(&index, &sphere, brush).is_empty());

        index.refit(&sphere);
        let region = StrokeRegion::query(&index, &sphere, brush);
        assert!(region.contains_vertex(0));
    }
}
