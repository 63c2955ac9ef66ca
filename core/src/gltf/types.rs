//! Data types for glTF loading results.

use std::sync::Arc;

use crate::material::MaterialDescriptor;
use crate::mesh::{AssembledPrimitive, VertexLayout};
use crate::scene::Scene;
use crate::texture::CpuTexture;

/// A fully decoded glTF asset.
///
/// Primitives are stored flat in (mesh, primitive) document order and
/// referenced by index from [`GltfAsset::meshes`] and from every
/// [`SceneNode`](crate::scene::SceneNode) that owns a mesh. Materials and
/// textures are shared through `Arc`, so a texture used by several
/// materials is decoded once.
#[derive(Debug)]
pub struct GltfAsset {
    /// `asset.version` from the document.
    pub version: String,
    /// `asset.generator`, if present.
    pub generator: Option<String>,
    /// Every assembled primitive.
    pub primitives: Vec<AssembledPrimitive>,
    /// Mesh index to indices into `primitives`.
    pub meshes: Vec<Vec<usize>>,
    /// Resolved materials in document order.
    pub materials: Vec<Arc<MaterialDescriptor>>,
    /// Every image decoded during the load, in first-use order.
    pub textures: Vec<Arc<CpuTexture>>,
    /// All scenes in the document.
    pub scenes: Vec<Scene>,
    /// Index of the default scene, if any.
    pub default_scene: Option<usize>,
    /// Vertex layouts created during loading, one per distinct structure.
    pub new_layouts: Vec<Arc<VertexLayout>>,
}

impl GltfAsset {
    /// The default scene, if the document has one.
    pub fn scene(&self) -> Option<&Scene> {
        self.default_scene.and_then(|i| self.scenes.get(i))
    }

    /// Primitives belonging to mesh `mesh`.
    pub fn mesh_primitives(&self, mesh: usize) -> impl Iterator<Item = &AssembledPrimitive> {
        self.meshes
            .get(mesh)
            .into_iter()
            .flatten()
            .filter_map(|&i| self.primitives.get(i))
    }
}
