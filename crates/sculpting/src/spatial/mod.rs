//! Spatial queries for brush strokes.
//!
//! This module provides:
//! - Axis-aligned bounds and the brush sphere primitive
//! - The sphere/box classification used to prune index nodes
//! - The sphere/triangle overlap test used on leaf triangles
//! - The [`SpatialIndex`] contract the region query drives, with a flat
//!   reference implementation in [`FlatIndex`]

mod flat;

pub use flat::FlatIndex;

use glam::Vec3;

use crate::geometry::{GeometryBuffer, Triangle};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// An inverted box that any included point will replace.
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut bounds = Self::empty();
        for point in points {
            bounds.include_point(point);
        }
        bounds
    }

    pub fn include_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// The eight corners, indexed by bit pattern (x = bit 0, y = bit 1, z = bit 2).
    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 != 0 { self.max.x } else { self.min.x },
                if i & 2 != 0 { self.max.y } else { self.min.y },
                if i & 4 != 0 { self.max.z } else { self.min.z },
            )
        })
    }

    /// Point of the box nearest to `point` (the point itself when inside).
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }
}

/// How a bounding box relates to the brush sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// All eight corners lie inside the sphere, so every triangle under the
    /// node intersects it.
    Contained,
    /// The box overlaps the sphere but is not fully inside it.
    Intersected,
    /// The box and the sphere are disjoint.
    NotIntersected,
}

/// A sphere in mesh-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.distance_squared(self.center) <= self.radius * self.radius
    }

    pub fn intersects_aabb(&self, bounds: &Aabb) -> bool {
        self.contains_point(bounds.closest_point(self.center))
    }

    /// Classify a box against the sphere.
    pub fn classify_aabb(&self, bounds: &Aabb) -> Containment {
        if !self.intersects_aabb(bounds) {
            return Containment::NotIntersected;
        }
        if bounds.corners().iter().all(|&c| self.contains_point(c)) {
            Containment::Contained
        } else {
            Containment::Intersected
        }
    }

    /// Whether any point of the (filled) triangle lies within the sphere.
    pub fn intersects_triangle(&self, a: Vec3, b: Vec3, c: Vec3) -> bool {
        self.contains_point(closest_point_on_triangle(self.center, a, b, c))
    }
}

/// Closest point on triangle `abc` to `p`, by Voronoi region of the triangle.
pub fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;

    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = va + vb + vc;
    if denom.abs() <= f32::EPSILON {
        // Degenerate triangle that slipped through the edge regions.
        return a;
    }
    let inv = 1.0 / denom;
    let v = vb * inv;
    let w = vc * inv;
    a + ab * v + ac * w
}

/// Callbacks driving a bounded traversal of a [`SpatialIndex`].
pub trait ShapecastVisitor {
    /// Region test, called once per index node with that node's bounds.
    ///
    /// Returning [`Containment::NotIntersected`] prunes the node.
    fn intersects_bounds(&mut self, bounds: &Aabb) -> Containment;

    /// Primitive test, called once per triangle under a node that was not
    /// pruned. `contained` is true when that node was classified as
    /// [`Containment::Contained`].
    ///
    /// Returning `true` stops the traversal.
    fn intersects_triangle(&mut self, triangle: &Triangle, contained: bool) -> bool;
}

/// A spatial index over the triangles of a [`GeometryBuffer`].
///
/// Implementations own their node hierarchy; the sculpting core never
/// builds, refits or invalidates it.
pub trait SpatialIndex {
    /// Walk the index, pruning with the visitor's region test and offering
    /// surviving triangles to its primitive test.
    ///
    /// A triangle stored under several nodes (loose or straddling layouts)
    /// may be offered more than once; visitors must tolerate repeats.
    ///
    /// Returns `true` if the visitor stopped the traversal early.
    fn shapecast<V: ShapecastVisitor>(&self, geometry: &GeometryBuffer, visitor: &mut V) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::ZERO, Vec3::ONE)
    }

    #[test]
    fn test_classify_contained() {
        let sphere = Sphere::new(Vec3::splat(0.5), 1.0);
        assert_eq!(sphere.classify_aabb(&unit_box()), Containment::Contained);
    }

    #[test]
    fn test_classify_intersected() {
        // Center inside the box but the corners are out of reach.
        let sphere = Sphere::new(Vec3::splat(0.5), 0.6);
        assert_eq!(sphere.classify_aabb(&unit_box()), Containment::Intersected);

        // Center outside, touching one face.
        let sphere = Sphere::new(Vec3::new(1.5, 0.5, 0.5), 0.6);
        assert_eq!(sphere.classify_aabb(&unit_box()), Containment::Intersected);
    }

    #[test]
    fn test_classify_not_intersected() {
        // Near the corner (2,2,2) direction: distance to box is sqrt(3) > 1.5
        let sphere = Sphere::new(Vec3::splat(2.0), 1.5);
        assert_eq!(sphere.classify_aabb(&unit_box()), Containment::NotIntersected);
    }

    #[test]
    fn test_aabb_corners_and_bounds() {
        let bounds = Aabb::from_points([Vec3::new(-1.0, 2.0, 0.0), Vec3::new(1.0, -2.0, 3.0)]);
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 3.0));
        assert!(!bounds.is_empty());
        assert!(Aabb::empty().is_empty());

        let corners = bounds.corners();
        assert_eq!(corners[0], bounds.min);
        assert_eq!(corners[7], bounds.max);
        assert!(corners.iter().all(|&c| bounds.contains_point(c)));
    }

    #[test]
    fn test_closest_point_regions() {
        let a = Vec3::ZERO;
        let b = Vec3::X;
        let c = Vec3::Y;

        // Face interior
        let p = closest_point_on_triangle(Vec3::new(0.25, 0.25, 1.0), a, b, c);
        assert!(p.abs_diff_eq(Vec3::new(0.25, 0.25, 0.0), 1e-6));
        // Vertex regions
        assert_eq!(closest_point_on_triangle(Vec3::new(-1.0, -1.0, 0.0), a, b, c), a);
        assert_eq!(closest_point_on_triangle(Vec3::new(2.0, -0.5, 0.0), a, b, c), b);
        assert_eq!(closest_point_on_triangle(Vec3::new(-0.5, 2.0, 0.0), a, b, c), c);
        // Hypotenuse edge
        let p = closest_point_on_triangle(Vec3::new(1.0, 1.0, 0.0), a, b, c);
        assert!(p.abs_diff_eq(Vec3::new(0.5, 0.5, 0.0), 1e-6));
    }

    #[test]
    fn test_sphere_triangle_overlap() {
        let (a, b, c) = (Vec3::ZERO, Vec3::X, Vec3::Y);

        // Sphere above the face, reaching down to it
        assert!(Sphere::new(Vec3::new(0.2, 0.2, 0.5), 0.6).intersects_triangle(a, b, c));
        assert!(!Sphere::new(Vec3::new(0.2, 0.2, 0.5), 0.4).intersects_triangle(a, b, c));
        // Sphere covering the face but no vertex
        assert!(Sphere::new(Vec3::new(0.25, 0.25, 0.0), 0.1).intersects_triangle(a, b, c));
    }

    fn vec3_strategy(range: f32) -> impl Strategy<Value = Vec3> {
        (-range..range, -range..range, -range..range).prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    proptest! {
        #[test]
        fn prop_classification_matches_predicates(
            center in vec3_strategy(4.0),
            radius in 0.01f32..4.0,
            corner in vec3_strategy(3.0),
            extent in vec3_strategy(2.0),
        ) {
            let bounds = Aabb::from_points([corner, corner + extent]);
            let sphere = Sphere::new(center, radius);

            let all_corners_inside = bounds
                .corners()
                .iter()
                .all(|c| c.distance_squared(center) <= radius * radius);
            let box_distance = bounds.closest_point(center).distance(center);

            match sphere.classify_aabb(&bounds) {
                Containment::Contained => prop_assert!(all_corners_inside),
                Containment::NotIntersected => {
                    prop_assert!(box_distance > radius * (1.0 - 1e-5));
                }
                Containment::Intersected => {
                    prop_assert!(!all_corners_inside);
                    prop_assert!(box_distance <= radius * (1.0 + 1e-5));
                }
            }
        }

        #[test]
        fn prop_triangle_overlap_agrees_with_vertices(
            center in vec3_strategy(2.0),
            radius in 0.01f32..2.0,
            a in vec3_strategy(2.0),
            b in vec3_strategy(2.0),
            c in vec3_strategy(2.0),
        ) {
            // Slivers make the barycentric projection ill-conditioned.
            prop_assume!((b - a).cross(c - a).length() > 0.05);

            let sphere = Sphere::new(center, radius);
            // Any vertex well inside the sphere implies overlap.
            let inner = Sphere::new(center, radius * 0.99);
            if inner.contains_point(a) || inner.contains_point(b) || inner.contains_point(c) {
                prop_assert!(sphere.intersects_triangle(a, b, c));
            }
            // The closest point never lies farther than any vertex.
            let closest = closest_point_on_triangle(center, a, b, c);
            let nearest_vertex = [a, b, c]
                .iter()
                .map(|v| v.distance(center))
                .fold(f32::MAX, f32::min);
            prop_assert!(closest.distance(center) <= nearest_vertex + 1e-4);
        }
    }
}
