//! Conversion between [`GeometryBuffer`] and Bevy's `Mesh`.

use bevy::mesh::{Indices, Mesh, PrimitiveTopology, VertexAttributeValues};
use glam::Vec3;
use tracing::debug;

use crate::error::GeometryError;
use crate::geometry::GeometryBuffer;

impl GeometryBuffer {
    /// Build a geometry buffer from an indexed triangle-list Bevy mesh.
    ///
    /// Normals are computed from the triangles when the mesh has none.
    pub fn from_bevy_mesh(mesh: &Mesh) -> Result<Self, GeometryError> {
        if mesh.primitive_topology() != PrimitiveTopology::TriangleList {
            return Err(GeometryError::UnsupportedLayout(format!(
                "{:?}",
                mesh.primitive_topology()
            )));
        }

        let positions: Vec<Vec3> = mesh
            .attribute(Mesh::ATTRIBUTE_POSITION)
            .and_then(VertexAttributeValues::as_float3)
            .ok_or(GeometryError::NoPositions)?
            .iter()
            .map(|&p| Vec3::from_array(p))
            .collect();

        let indices: Vec<u32> = match mesh.indices() {
            Some(Indices::U16(idx)) => idx.iter().map(|&i| u32::from(i)).collect(),
            Some(Indices::U32(idx)) => idx.to_vec(),
            None => return Err(GeometryError::NoIndices),
        };

        let normals = mesh
            .attribute(Mesh::ATTRIBUTE_NORMAL)
            .and_then(VertexAttributeValues::as_float3);

        match normals {
            Some(normals) => {
                let normals = normals.iter().map(|&n| Vec3::from_array(n)).collect();
                GeometryBuffer::new(positions, normals, indices)
            }
            None => {
                debug!("from_bevy_mesh: no normals, computing from {} triangles", indices.len() / 3);
                GeometryBuffer::from_triangles(positions, indices)
            }
        }
    }

    /// Write positions and normals back into `mesh`, replacing its attributes.
    ///
    /// Indices are left alone; strokes never change topology.
    pub fn write_to_bevy_mesh(&self, mesh: &mut Mesh) {
        let positions: Vec<[f32; 3]> = self.positions().iter().map(|p| p.to_array()).collect();
        let normals: Vec<[f32; 3]> = self.normals().iter().map(|n| n.to_array()).collect();
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    }

    /// Build a new Bevy mesh holding this buffer.
    pub fn to_bevy_mesh(&self) -> Mesh {
        let mut mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            bevy::asset::RenderAssetUsages::default(),
        );
        self.write_to_bevy_mesh(&mut mesh);
        mesh.insert_indices(Indices::U32(self.indices().to_vec()));
        mesh
    }
}
