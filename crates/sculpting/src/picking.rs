//! Locating the brush on the surface.
//!
//! The host's picking collaborator reports at most one hit per frame, in world
//! space. This module converts such hits into mesh-local space and provides
//! a brute-force picker for hosts that don't have one: Moller-Trumbore
//! ray-triangle tests against every triangle of the geometry buffer.

use glam::{Affine3A, Vec3, Vec3A};

use crate::geometry::{GeometryBuffer, TriangleId};

/// Epsilon for floating point comparisons in ray intersection
const EPSILON: f32 = 1e-6;

/// A ray with origin and direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Direction, normalized for consistent `t` values
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// A surface hit in world space, as reported by a picking collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// Hit point
    pub point: Vec3,
    /// Normal of the hit triangle
    pub normal: Vec3,
}

/// A surface hit carried into mesh-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalHit {
    pub point: Vec3,
    /// Unit normal
    pub normal: Vec3,
}

impl PickHit {
    /// Express the hit in the local space of a mesh placed by `world_from_mesh`.
    ///
    /// The point goes through the inverse transform. The normal goes through
    /// the inverse-transpose of the inverse, i.e. the transpose of the linear
    /// part, so it stays perpendicular to the surface under non-uniform scale.
    pub fn to_mesh_space(&self, world_from_mesh: &Affine3A) -> LocalHit {
        let mesh_from_world = world_from_mesh.inverse();
        let normal = world_from_mesh.matrix3.transpose() * Vec3A::from(self.normal);
        LocalHit {
            point: mesh_from_world.transform_point3(self.point),
            normal: Vec3::from(normal).normalize_or_zero(),
        }
    }
}

/// Result of a ray-triangle intersection test
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Distance along the ray to the intersection point
    pub t: f32,
    /// Barycentric coordinate u (weight for vertex 1)
    pub u: f32,
    /// Barycentric coordinate v (weight for vertex 2)
    pub v: f32,
}

/// Moller-Trumbore ray-triangle intersection algorithm.
///
/// Both faces count as hits. Returns `None` for hits behind the origin.
pub fn ray_triangle_intersection(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let pvec = ray.direction.cross(edge2);
    let det = edge1.dot(pvec);

    // Ray parallel to the triangle plane
    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = ray.origin - v0;

    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray.direction.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    if t < EPSILON {
        return None;
    }

    Some(TriangleHit { t, u, v })
}

/// Closest triangle hit along a mesh-local ray.
pub fn raycast_local(geometry: &GeometryBuffer, ray: &Ray) -> Option<(TriangleId, TriangleHit)> {
    geometry
        .triangles()
        .filter_map(|tri| {
            let [a, b, c] = tri.positions;
            ray_triangle_intersection(ray, a, b, c).map(|hit| (tri.id, hit))
        })
        .min_by(|a, b| a.1.t.total_cmp(&b.1.t))
}

/// Cast a world-space ray at a mesh and return the closest hit in world space.
///
/// The reported normal is the geometric normal of the hit triangle, matching
/// what the stroke driver expects as the brush direction.
pub fn pick_mesh(geometry: &GeometryBuffer, world_from_mesh: &Affine3A, ray: &Ray) -> Option<PickHit> {
    let mesh_from_world = world_from_mesh.inverse();
    let local_ray = Ray::new(
        mesh_from_world.transform_point3(ray.origin),
        mesh_from_world.transform_vector3(ray.direction),
    );

    let (triangle, hit) = raycast_local(geometry, &local_ray)?;
    let local_point = local_ray.at(hit.t);
    let local_normal = geometry.face_normal(triangle);
    let world_normal = mesh_from_world.matrix3.transpose() * Vec3A::from(local_normal);

    Some(PickHit {
        point: world_from_mesh.transform_point3(local_point),
        normal: Vec3::from(world_normal).normalize_or_zero(),
    })
}
