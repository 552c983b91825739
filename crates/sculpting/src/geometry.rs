//! Flat triangle geometry mutated by sculpt strokes.
//!
//! The buffer is three parallel arrays: vertex positions, vertex normals and
//! a triangle index list. Vertex indices never change for the lifetime of the
//! buffer; strokes only overwrite positions and normals in place.
//!
//! All invariants are checked once at construction, so the per-frame stroke
//! passes can index into the arrays without further validation.

use glam::Vec3;
use std::collections::HashMap;

use crate::error::GeometryError;
use crate::normals::triangle_normal;
use crate::spatial::Aabb;

/// Identifier of a triangle: its position in the index list divided by 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriangleId(pub u32);

impl TriangleId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A triangle as offered to a spatial-index visitor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub id: TriangleId,
    /// Global vertex indices in winding order
    pub vertices: [u32; 3],
    /// Positions of the three vertices at the time of the query
    pub positions: [Vec3; 3],
}

/// Vertex positions, vertex normals and triangle indices for one mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryBuffer {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
}

impl GeometryBuffer {
    /// Build a buffer from existing positions, normals and indices.
    ///
    /// Fails if the index list is empty, its length is not a multiple of 3,
    /// any index is out of range, or the normal count differs from the
    /// position count.
    pub fn new(
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        indices: Vec<u32>,
    ) -> Result<Self, GeometryError> {
        if normals.len() != positions.len() {
            return Err(GeometryError::NormalCountMismatch {
                positions: positions.len(),
                normals: normals.len(),
            });
        }
        validate_indices(positions.len(), &indices)?;

        Ok(Self {
            positions,
            normals,
            indices,
        })
    }

    /// Build a buffer from positions and indices, computing smooth normals.
    pub fn from_triangles(positions: Vec<Vec3>, indices: Vec<u32>) -> Result<Self, GeometryError> {
        validate_indices(positions.len(), &indices)?;

        let mut buffer = Self {
            normals: vec![Vec3::ZERO; positions.len()],
            positions,
            indices,
        };
        buffer.recompute_normals();
        Ok(buffer)
    }

    /// Closed sphere centered on the origin, built by subdividing an
    /// icosahedron whose poles lie on the Z axis.
    ///
    /// Vertex 0 is always the north pole at `(0, 0, radius)`.
    pub fn icosphere(radius: f32, subdivisions: u32) -> Self {
        let (mut positions, mut indices) = icosahedron();

        for _ in 0..subdivisions {
            let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
            let mut next = Vec::with_capacity(indices.len() * 4);

            for tri in indices.chunks_exact(3) {
                let (a, b, c) = (tri[0], tri[1], tri[2]);
                let ab = midpoint(&mut positions, &mut midpoints, a, b);
                let bc = midpoint(&mut positions, &mut midpoints, b, c);
                let ca = midpoint(&mut positions, &mut midpoints, c, a);

                next.extend_from_slice(&[a, ab, ca]);
                next.extend_from_slice(&[b, bc, ab]);
                next.extend_from_slice(&[c, ca, bc]);
                next.extend_from_slice(&[ab, bc, ca]);
            }

            indices = next;
        }

        // Unit-sphere normals are the positions themselves.
        let normals = positions.clone();
        let positions = positions.into_iter().map(|p| p * radius).collect();

        Self {
            positions,
            normals,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn position(&self, vertex: u32) -> Vec3 {
        self.positions[vertex as usize]
    }

    #[inline]
    pub fn normal(&self, vertex: u32) -> Vec3 {
        self.normals[vertex as usize]
    }

    #[inline]
    pub(crate) fn set_position(&mut self, vertex: u32, position: Vec3) {
        self.positions[vertex as usize] = position;
    }

    #[inline]
    pub(crate) fn set_normal(&mut self, vertex: u32, normal: Vec3) {
        self.normals[vertex as usize] = normal;
    }

    /// Vertex indices of a triangle, in winding order.
    #[inline]
    pub fn triangle_vertices(&self, triangle: TriangleId) -> [u32; 3] {
        let base = triangle.index() * 3;
        [
            self.indices[base],
            self.indices[base + 1],
            self.indices[base + 2],
        ]
    }

    #[inline]
    pub fn triangle_positions(&self, triangle: TriangleId) -> [Vec3; 3] {
        self.triangle_vertices(triangle).map(|v| self.position(v))
    }

    /// Unit face normal from current positions (zero for degenerate triangles).
    pub fn face_normal(&self, triangle: TriangleId) -> Vec3 {
        let [a, b, c] = self.triangle_positions(triangle);
        triangle_normal(a, b, c)
    }

    pub fn triangle(&self, triangle: TriangleId) -> Triangle {
        let vertices = self.triangle_vertices(triangle);
        Triangle {
            id: triangle,
            vertices,
            positions: vertices.map(|v| self.position(v)),
        }
    }

    /// Iterate all triangles in index-list order.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangle_count() as u32).map(move |t| self.triangle(TriangleId(t)))
    }

    /// Bounds of every vertex referenced by a triangle.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.indices.iter().map(|&i| self.position(i)))
    }

    /// Recompute every vertex normal as the mean of its incident face normals.
    ///
    /// Vertices not referenced by any triangle keep their current normal.
    pub fn recompute_normals(&mut self) {
        let mut sums = vec![Vec3::ZERO; self.positions.len()];
        let mut counts = vec![0u32; self.positions.len()];

        for tri in self.triangles() {
            let [a, b, c] = tri.positions;
            let normal = triangle_normal(a, b, c);
            for v in tri.vertices {
                sums[v as usize] += normal;
                counts[v as usize] += 1;
            }
        }

        for (vertex, (sum, count)) in sums.into_iter().zip(counts).enumerate() {
            if count > 0 {
                self.normals[vertex] = sum / count as f32;
            }
        }
    }

    /// Raw bytes of the position array, laid out as packed `f32` triples.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw bytes of the normal array, laid out as packed `f32` triples.
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Raw bytes of the index list.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

fn validate_indices(vertex_count: usize, indices: &[u32]) -> Result<(), GeometryError> {
    if u32::try_from(vertex_count).is_err() {
        return Err(GeometryError::TooManyVertices(vertex_count));
    }
    if indices.is_empty() {
        return Err(GeometryError::NoTriangles);
    }
    if indices.len() % 3 != 0 {
        return Err(GeometryError::IndexCountNotTriangles(indices.len()));
    }

    if let Some((offset, &index)) = indices
        .iter()
        .enumerate()
        .find(|&(_, &i)| i as usize >= vertex_count)
    {
        return Err(GeometryError::IndexOutOfRange {
            triangle: (offset / 3) as u32,
            index,
            vertex_count,
        });
    }

    Ok(())
}

/// Unit icosahedron with a vertex at each pole of the Z axis.
fn icosahedron() -> (Vec<Vec3>, Vec<u32>) {
    let h = 1.0 / 5.0_f32.sqrt();
    let r = 2.0 * h;
    let step = std::f32::consts::TAU / 5.0;

    let mut positions = Vec::with_capacity(12);
    positions.push(Vec3::Z);
    for k in 0..5 {
        let angle = k as f32 * step;
        positions.push(Vec3::new(r * angle.cos(), r * angle.sin(), h));
    }
    for k in 0..5 {
        let angle = (k as f32 + 0.5) * step;
        positions.push(Vec3::new(r * angle.cos(), r * angle.sin(), -h));
    }
    positions.push(Vec3::NEG_Z);

    let mut indices = Vec::with_capacity(60);
    for k in 0..5u32 {
        let upper = 1 + k;
        let upper_next = 1 + (k + 1) % 5;
        let lower = 6 + k;
        let lower_next = 6 + (k + 1) % 5;

        indices.extend_from_slice(&[0, upper, upper_next]);
        indices.extend_from_slice(&[upper, lower, upper_next]);
        indices.extend_from_slice(&[upper_next, lower, lower_next]);
        indices.extend_from_slice(&[11, lower_next, lower]);
    }

    (positions, indices)
}

fn midpoint(
    positions: &mut Vec<Vec3>,
    cache: &mut HashMap<(u32, u32), u32>,
    a: u32,
    b: u32,
) -> u32 {
    let key = if a < b { (a, b) } else { (b, a) };
    *cache.entry(key).or_insert_with(|| {
        let p = (positions[a as usize] + positions[b as usize]).normalize();
        positions.push(p);
        (positions.len() - 1) as u32
    })
}
