//! Error types for geometry construction.

/// Errors raised when a geometry buffer is built from raw arrays.
///
/// These are precondition failures; once a [`GeometryBuffer`](crate::GeometryBuffer)
/// exists the per-frame stroke path cannot fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error("Mesh has no triangles")]
    NoTriangles,

    #[error("Index list length {0} is not a multiple of 3")]
    IndexCountNotTriangles(usize),

    #[error("Triangle {triangle} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: u32,
        index: u32,
        vertex_count: usize,
    },

    #[error("Mesh has {positions} positions but {normals} normals")]
    NormalCountMismatch { positions: usize, normals: usize },

    #[error("Mesh has too many vertices to address with u32 indices: {0}")]
    TooManyVertices(usize),

    #[error("Mesh has no position attribute")]
    NoPositions,

    #[error("Mesh has no indices")]
    NoIndices,

    #[error("Unsupported mesh layout: {0}")]
    UnsupportedLayout(String),
}
