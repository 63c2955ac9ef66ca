//! glTF 2.0 loader.
//!
//! Loads `.gltf`/`.glb` data into CPU-side, renderer-ready structures:
//! interleaved vertex buffers with their layouts, normalized index buffers,
//! resolved materials with decoded textures, and scene trees with world
//! transforms.
//!
//! # Pipeline
//!
//! 1. [`container`] detects GLB vs JSON and splits out the BIN chunk.
//! 2. The document is validated (references, node hierarchy).
//! 3. [`resource`] resolves buffers from data URIs, the BIN chunk, or a
//!    [`ResourceReader`].
//! 4. Materials are resolved; images are decoded once each.
//! 5. Every primitive is assembled: accessors are de-interleaved, missing
//!    normals and tangents are synthesized, attributes are interleaved.
//! 6. Scene trees are composed, optionally converted to left-handed
//!    coordinates and auto-scaled into the unit cube.
//!
//! # Layout Sharing
//!
//! Primitives whose vertex layouts match structurally (ignoring labels)
//! share one `Arc<VertexLayout>`. Callers can pass layouts from earlier loads
//! to [`load_gltf_with_layouts`]; every distinct layout created by this load
//! is returned in [`GltfAsset::new_layouts`].
//!
//! # Example
//!
//! ```no_run
//! use lumen_core::gltf::{LoadOptions, load_gltf_file};
//!
//! let options = LoadOptions::default().with_auto_scale(false);
//! let asset = load_gltf_file("model.glb", &options)?;
//! println!("Primitives: {}", asset.primitives.len());
//! if let Some(scene) = asset.scene() {
//!     println!("Roots: {}", scene.nodes.len());
//! }
//! # Ok::<(), lumen_core::gltf::GltfError>(())
//! ```

pub mod accessor;
pub mod container;
pub mod document;
mod error;
mod loader;
pub mod material;
pub mod resource;
mod tangent;
#[cfg(test)]
mod tests;
pub mod transform;
pub mod types;
pub mod vertex;

pub use error::{ContainerError, ErrorKind, GltfError};
pub use resource::{FileResources, NoExternalResources, ResourceReader};
pub use types::*;

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::mesh::VertexLayout;

/// Options controlling post-processing during a load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Convert from glTF's right-handed convention to left-handed by
    /// mirroring Z.
    pub convert_to_left_handed: bool,
    /// Scale each scene so its largest absolute position component is 1.
    pub auto_scale: bool,
    /// Synthesize face-averaged normals for triangle primitives without them.
    pub generate_normals: bool,
    /// Synthesize MikkTSpace tangents for triangle primitives that have
    /// normals and texture coordinates but no tangents.
    pub generate_tangents: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            convert_to_left_handed: true,
            auto_scale: true,
            generate_normals: true,
            generate_tangents: true,
        }
    }
}

impl LoadOptions {
    /// Enable or disable the left-handed conversion.
    #[must_use]
    pub fn with_convert_to_left_handed(mut self, enabled: bool) -> Self {
        self.convert_to_left_handed = enabled;
        self
    }

    /// Enable or disable scene auto-scaling.
    #[must_use]
    pub fn with_auto_scale(mut self, enabled: bool) -> Self {
        self.auto_scale = enabled;
        self
    }

    /// Enable or disable normal synthesis.
    #[must_use]
    pub fn with_generate_normals(mut self, enabled: bool) -> Self {
        self.generate_normals = enabled;
        self
    }

    /// Enable or disable tangent synthesis.
    #[must_use]
    pub fn with_generate_tangents(mut self, enabled: bool) -> Self {
        self.generate_tangents = enabled;
        self
    }
}

/// Load a glTF asset whose resources are all embedded.
///
/// Buffers and images must come from data URIs or the GLB BIN chunk;
/// external URIs fail with [`ErrorKind::ResourceUnavailable`].
pub fn load_gltf(data: &[u8], options: &LoadOptions) -> Result<GltfAsset, GltfError> {
    load_gltf_with_resources(data, &NoExternalResources, options)
}

/// Load a glTF asset, reading external URIs through `resources`.
pub fn load_gltf_with_resources(
    data: &[u8],
    resources: &dyn ResourceReader,
    options: &LoadOptions,
) -> Result<GltfAsset, GltfError> {
    load_gltf_with_layouts(data, resources, &[], options)
}

/// Load a glTF asset, reusing caller-owned vertex layouts.
///
/// # Arguments
///
/// * `data` - Raw bytes of the `.glb` or `.gltf` file.
/// * `resources` - Reader for buffer and image URIs that are not data URIs.
/// * `shared_layouts` - Existing vertex layouts to share. Primitives whose
///   layout matches one structurally get that `Arc`, and it is not repeated
///   in [`GltfAsset::new_layouts`].
/// * `options` - Post-processing switches.
pub fn load_gltf_with_layouts(
    data: &[u8],
    resources: &dyn ResourceReader,
    shared_layouts: &[Arc<VertexLayout>],
    options: &LoadOptions,
) -> Result<GltfAsset, GltfError> {
    let container = container::parse_container(data)?;
    let document = container.document;
    document::validate(&document)?;

    let buffers = resource::resolve_buffers(&document, container.bin, resources)?;
    let mut ctx =
        loader::LoadContext::new(&document, &buffers, resources, options, shared_layouts);

    ctx.load_materials()?;
    let primitives = ctx.load_meshes()?;
    let scenes = ctx.load_scenes()?;
    let asset = ctx.finish(primitives, scenes);

    log::debug!(
        "glTF: loaded {} primitives, {} materials, {} scenes",
        asset.primitives.len(),
        asset.materials.len(),
        asset.scenes.len()
    );
    Ok(asset)
}

/// Load a `.gltf` or `.glb` file, resolving relative URIs against its
/// directory.
pub fn load_gltf_file(path: impl AsRef<Path>, options: &LoadOptions) -> Result<GltfAsset, GltfError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| GltfError::Resource {
        uri: path.display().to_string(),
        source,
    })?;
    load_gltf_with_resources(&data, &FileResources::for_asset(path), options)
}
