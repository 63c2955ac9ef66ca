//! Internal glTF loading logic.
//!
//! The [`LoadContext`] holds all state needed during loading: the validated
//! document, resolved buffer data, the layout cache, and the materials
//! resolved so far.

use std::borrow::Cow;
use std::sync::Arc;

use crate::material::MaterialDescriptor;
use crate::mesh::{AssembledPrimitive, VertexLayout};
use crate::scene::Scene;
use crate::texture::CpuTexture;

use super::LoadOptions;
use super::accessor::AccessorReader;
use super::document::{self, Document};
use super::error::GltfError;
use super::material::MaterialResolver;
use super::resource::ResourceReader;
use super::transform::{self, SceneBuilder};
use super::types::GltfAsset;
use super::vertex;

/// Internal loading context that holds resolved data during loading.
pub(crate) struct LoadContext<'a> {
    document: &'a Document,
    buffers: &'a [Cow<'a, [u8]>],
    reader: &'a dyn ResourceReader,
    options: &'a LoadOptions,

    /// Layouts passed in by the caller to share.
    shared_layouts: &'a [Arc<VertexLayout>],
    /// Layouts created during loading.
    new_layouts: Vec<Arc<VertexLayout>>,
    /// Resolved materials, indexed like the document's.
    materials: Vec<Arc<MaterialDescriptor>>,
    /// Decoded textures, filled by `load_materials`.
    textures: Vec<Arc<CpuTexture>>,
    /// Mapping from glTF mesh index to flat primitive indices.
    /// Populated by `load_meshes`, used by `load_scenes`.
    mesh_primitives: Vec<Vec<usize>>,
}

impl<'a> LoadContext<'a> {
    pub fn new(
        document: &'a Document,
        buffers: &'a [Cow<'a, [u8]>],
        reader: &'a dyn ResourceReader,
        options: &'a LoadOptions,
        shared_layouts: &'a [Arc<VertexLayout>],
    ) -> Self {
        Self {
            document,
            buffers,
            reader,
            options,
            shared_layouts,
            new_layouts: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            mesh_primitives: Vec::new(),
        }
    }

    fn accessors(&self) -> AccessorReader<'a> {
        AccessorReader::new(self.document, self.buffers)
    }

    /// Resolve every material and decode the textures they bind.
    pub fn load_materials(&mut self) -> Result<(), GltfError> {
        let mut resolver = MaterialResolver::new(self.document, self.buffers, self.reader);
        self.materials = (0..self.document.materials.len())
            .map(|i| resolver.resolve(i).map(Arc::new))
            .collect::<Result<_, _>>()?;
        self.textures = resolver.into_textures();
        log::debug!(
            "glTF: resolved {} materials, decoded {} textures",
            self.materials.len(),
            self.textures.len()
        );
        Ok(())
    }

    /// Assemble every primitive of every mesh.
    ///
    /// Returns a flat list in (mesh, primitive) order and records the
    /// mesh-to-primitive mapping for `load_scenes`. Must run after
    /// `load_materials`.
    pub fn load_meshes(&mut self) -> Result<Vec<AssembledPrimitive>, GltfError> {
        let reader = self.accessors();
        let mut result = Vec::new();
        let mut mesh_primitives = Vec::with_capacity(self.document.meshes.len());

        for (mesh_idx, mesh) in self.document.meshes.iter().enumerate() {
            let mut flat_indices = Vec::with_capacity(mesh.primitives.len());

            for (prim_idx, primitive) in mesh.primitives.iter().enumerate() {
                let mut assembled = vertex::assemble_primitive(
                    &reader,
                    primitive,
                    self.options,
                    self.shared_layouts,
                    &mut self.new_layouts,
                )
                .map_err(|e| e.in_primitive(mesh_idx, prim_idx))?;

                if let Some(material) = primitive.material.map(|m| m.value()) {
                    let descriptor = self
                        .materials
                        .get(material)
                        .ok_or_else(|| {
                            GltfError::dangling(
                                format!("mesh {mesh_idx} primitive {prim_idx}"),
                                "material",
                                material,
                                self.materials.len(),
                            )
                        })?;
                    assembled = assembled.with_material(material, Arc::clone(descriptor));
                }

                if let Some(name) = &mesh.name {
                    let label = if mesh.primitives.len() > 1 {
                        format!("{name}_prim{prim_idx}")
                    } else {
                        name.clone()
                    };
                    assembled = assembled.with_label(label);
                }

                flat_indices.push(result.len());
                result.push(assembled);
            }

            mesh_primitives.push(flat_indices);
        }

        log::debug!(
            "glTF: assembled {} primitives from {} meshes ({} layouts)",
            result.len(),
            mesh_primitives.len(),
            self.new_layouts.len()
        );
        self.mesh_primitives = mesh_primitives;
        Ok(result)
    }

    /// Build every scene tree. Must run after `load_meshes`.
    pub fn load_scenes(&self) -> Result<Vec<Scene>, GltfError> {
        let builder = SceneBuilder {
            document: self.document,
            mesh_primitives: &self.mesh_primitives,
            convert: self.options.convert_to_left_handed,
        };
        let reader = self.accessors();

        (0..self.document.scenes.len())
            .map(|index| {
                let root_scale = if self.options.auto_scale {
                    let extent = transform::scene_extent(self.document, &reader, index)?;
                    let factor = transform::auto_scale_factor(extent);
                    if let Some(factor) = factor {
                        log::info!("glTF: auto-scaling scene {index} by {factor}");
                    }
                    factor
                } else {
                    None
                };
                builder.build(index, root_scale)
            })
            .collect()
    }

    /// Consume the context into the final asset.
    pub fn finish(self, primitives: Vec<AssembledPrimitive>, scenes: Vec<Scene>) -> GltfAsset {
        GltfAsset {
            version: self.document.asset.version.clone(),
            generator: self.document.asset.generator.clone(),
            primitives,
            meshes: self.mesh_primitives,
            materials: self.materials,
            textures: self.textures,
            scenes,
            default_scene: document::default_scene(self.document),
            new_layouts: self.new_layouts,
        }
    }
}
