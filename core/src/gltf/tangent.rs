//! MikkTSpace tangent generation for indexed triangle lists.

use super::error::GltfError;

/// Index-addressed triangle mesh exposed to the MikkTSpace algorithm.
///
/// `indices` must hold whole triangles whose values are all below the
/// vertex count; the assembler checks both before building one.
struct TriangleGeometry<'a> {
    positions: &'a [[f32; 3]],
    normals: &'a [[f32; 3]],
    tex_coords: &'a [[f32; 2]],
    indices: &'a [u32],
    flip_z: bool,
    tangents: Vec<[f32; 4]>,
}

impl TriangleGeometry<'_> {
    fn vertex(&self, face: usize, vert: usize) -> usize {
        self.indices[face * 3 + vert] as usize
    }

    fn oriented(&self, mut v: [f32; 3]) -> [f32; 3] {
        if self.flip_z {
            v[2] = -v[2];
        }
        v
    }
}

impl mikktspace::Geometry for TriangleGeometry<'_> {
    fn num_faces(&self) -> usize {
        self.indices.len() / 3
    }

    fn num_vertices_of_face(&self, _face: usize) -> usize {
        3
    }

    fn position(&self, face: usize, vert: usize) -> [f32; 3] {
        self.oriented(self.positions[self.vertex(face, vert)])
    }

    fn normal(&self, face: usize, vert: usize) -> [f32; 3] {
        self.oriented(self.normals[self.vertex(face, vert)])
    }

    fn tex_coord(&self, face: usize, vert: usize) -> [f32; 2] {
        self.tex_coords[self.vertex(face, vert)]
    }

    fn set_tangent_encoded(&mut self, tangent: [f32; 4], face: usize, vert: usize) {
        // Later faces overwrite earlier ones for a shared vertex.
        let index = self.vertex(face, vert);
        self.tangents[index] = tangent;
    }
}

/// Generate one tangent (xyz + handedness in w) per vertex.
///
/// With `flip_z` the positions and normals are read with Z negated, so the
/// result already lives in the converted coordinate system. Vertices not
/// referenced by any triangle keep `[0, 0, 0, 1]`.
pub(crate) fn generate_tangents(
    positions: &[[f32; 3]],
    normals: &[[f32; 3]],
    tex_coords: &[[f32; 2]],
    indices: &[u32],
    flip_z: bool,
) -> Result<Vec<[f32; 4]>, GltfError> {
    let mut geometry = TriangleGeometry {
        positions,
        normals,
        tex_coords,
        indices: &indices[..indices.len() - indices.len() % 3],
        flip_z,
        tangents: vec![[0.0, 0.0, 0.0, 1.0]; positions.len()],
    };

    if mikktspace::generate_tangents(&mut geometry) {
        Ok(geometry.tangents)
    } else {
        Err(GltfError::TangentGeneration)
    }
}
