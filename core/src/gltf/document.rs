//! glTF 2.0 document model.
//!
//! The JSON schema is `gltf_json`'s [`Root`](gltf_json::Root). Unknown enum
//! values deserialize as [`Checked::Invalid`] rather than failing the parse,
//! so [`validate`] rejects them together with every out-of-range
//! cross-reference and a malformed node hierarchy, once, up front. The
//! helpers here give the later stages plain `usize` indices and known enums.

use gltf_json::material::AlphaMode;
use gltf_json::validation::Checked;

use super::error::GltfError;

pub use gltf_json::Root as Document;
pub use gltf_json::accessor::{ComponentType, Type as AccessorType};
pub use gltf_json::mesh::{Mode, Primitive, Semantic};
pub use gltf_json::texture::{MagFilter, MinFilter, Sampler, WrappingMode};
pub use gltf_json::{Accessor, Index, Material, Node};

/// Extensions this loader understands.
#[cfg(feature = "emissive-strength")]
pub const SUPPORTED_EXTENSIONS: &[&str] = &["KHR_materials_emissive_strength"];
/// Extensions this loader understands.
#[cfg(not(feature = "emissive-strength"))]
pub const SUPPORTED_EXTENSIONS: &[&str] = &[];

/// Accessor index of attribute `semantic`.
pub fn attribute(primitive: &Primitive, semantic: Semantic) -> Option<usize> {
    primitive
        .attributes
        .get(&Checked::Valid(semantic))
        .map(|accessor| accessor.value())
}

/// Component type and element shape of `accessor`, if both are known.
pub fn accessor_format(accessor: &Accessor) -> Option<(ComponentType, AccessorType)> {
    match (&accessor.component_type, &accessor.type_) {
        (Checked::Valid(component), Checked::Valid(kind)) => Some((component.0, *kind)),
        _ => None,
    }
}

/// Topology of `primitive`, if the mode is known.
pub fn primitive_mode(primitive: &Primitive) -> Option<Mode> {
    match primitive.mode {
        Checked::Valid(mode) => Some(mode),
        Checked::Invalid => None,
    }
}

/// A known enum value, or `None` for one the schema does not define.
pub(crate) fn known<T: Copy>(value: &Checked<T>) -> Option<T> {
    match value {
        Checked::Valid(v) => Some(*v),
        Checked::Invalid => None,
    }
}

/// Child indices of `node`.
pub fn children(node: &Node) -> impl Iterator<Item = usize> + '_ {
    node.children.iter().flatten().map(|child| child.value())
}

/// Index of the scene to present: `scene` if set, otherwise the first one.
pub fn default_scene(document: &Document) -> Option<usize> {
    document
        .scene
        .map(|scene| scene.value())
        .or_else(|| (!document.scenes.is_empty()).then_some(0))
}

/// Look up `items[index]`, reporting a dangling reference from `from`.
pub(crate) fn lookup<'a, T>(
    items: &'a [T],
    index: usize,
    from: impl FnOnce() -> String,
    target: &'static str,
) -> Result<&'a T, GltfError> {
    items
        .get(index)
        .ok_or_else(|| GltfError::dangling(from(), target, index, items.len()))
}

fn check(
    index: usize,
    len: usize,
    from: impl FnOnce() -> String,
    target: &'static str,
) -> Result<(), GltfError> {
    if index < len {
        Ok(())
    } else {
        Err(GltfError::dangling(from(), target, index, len))
    }
}

fn unknown(what: String) -> GltfError {
    GltfError::InvalidDocument(format!("{what} is not a glTF 2.0 value"))
}

/// Every texture index `material` references, with its slot name.
fn texture_refs(material: &Material) -> impl Iterator<Item = (&'static str, usize)> + '_ {
    let pbr = &material.pbr_metallic_roughness;
    [
        ("baseColorTexture", pbr.base_color_texture.as_ref().map(|t| t.index)),
        (
            "metallicRoughnessTexture",
            pbr.metallic_roughness_texture.as_ref().map(|t| t.index),
        ),
        ("normalTexture", material.normal_texture.as_ref().map(|t| t.index)),
        ("occlusionTexture", material.occlusion_texture.as_ref().map(|t| t.index)),
        ("emissiveTexture", material.emissive_texture.as_ref().map(|t| t.index)),
    ]
    .into_iter()
    .filter_map(|(slot, index)| index.map(|i| (slot, i.value())))
}

/// Check every cross-reference, enum value and the node hierarchy.
///
/// Unsupported entries of `extensionsRequired` are logged, not rejected.
pub fn validate(document: &Document) -> Result<(), GltfError> {
    for ext in &document.extensions_required {
        if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            log::warn!("glTF: required extension {ext} is not supported, ignoring");
        }
    }

    for (i, view) in document.buffer_views.iter().enumerate() {
        check(view.buffer.value(), document.buffers.len(), || format!("bufferView {i}"), "buffer")?;
    }
    for (i, accessor) in document.accessors.iter().enumerate() {
        if let Some(view) = accessor.buffer_view {
            check(view.value(), document.buffer_views.len(), || format!("accessor {i}"), "bufferView")?;
        }
        if accessor_format(accessor).is_none() {
            return Err(unknown(format!("accessor {i} componentType or type")));
        }
    }
    for (m, mesh) in document.meshes.iter().enumerate() {
        for (p, primitive) in mesh.primitives.iter().enumerate() {
            let from = || format!("mesh {m} primitive {p}");
            if primitive_mode(primitive).is_none() {
                return Err(unknown(format!("mesh {m} primitive {p} mode")));
            }
            for accessor in primitive.attributes.values() {
                check(accessor.value(), document.accessors.len(), from, "accessor")?;
            }
            if let Some(indices) = primitive.indices {
                check(indices.value(), document.accessors.len(), from, "accessor")?;
            }
            if let Some(material) = primitive.material {
                check(material.value(), document.materials.len(), from, "material")?;
            }
        }
    }
    for (i, material) in document.materials.iter().enumerate() {
        if known::<AlphaMode>(&material.alpha_mode).is_none() {
            return Err(unknown(format!("material {i} alphaMode")));
        }
        for (slot, texture) in texture_refs(material) {
            check(
                texture,
                document.textures.len(),
                || format!("material {i} {slot}"),
                "texture",
            )?;
        }
    }
    for (i, texture) in document.textures.iter().enumerate() {
        if let Some(sampler) = texture.sampler {
            check(sampler.value(), document.samplers.len(), || format!("texture {i}"), "sampler")?;
        }
        check(texture.source.value(), document.images.len(), || format!("texture {i}"), "image")?;
    }
    for (i, sampler) in document.samplers.iter().enumerate() {
        let filters_known = sampler.mag_filter.as_ref().is_none_or(|f| known(f).is_some())
            && sampler.min_filter.as_ref().is_none_or(|f| known(f).is_some());
        if !filters_known || known(&sampler.wrap_s).is_none() || known(&sampler.wrap_t).is_none() {
            return Err(unknown(format!("sampler {i} filter or wrap mode")));
        }
    }
    for (i, image) in document.images.iter().enumerate() {
        match (&image.uri, image.buffer_view) {
            (_, Some(view)) => {
                check(view.value(), document.buffer_views.len(), || format!("image {i}"), "bufferView")?
            }
            (Some(_), None) => {}
            (None, None) => {
                return Err(GltfError::InvalidDocument(format!(
                    "image {i} has neither uri nor bufferView"
                )));
            }
        }
    }
    if let Some(scene) = document.scene {
        check(scene.value(), document.scenes.len(), || "document".to_string(), "scene")?;
    }
    for (i, scene) in document.scenes.iter().enumerate() {
        for node in &scene.nodes {
            check(node.value(), document.nodes.len(), || format!("scene {i}"), "node")?;
        }
    }

    validate_nodes(document)
}

fn validate_nodes(document: &Document) -> Result<(), GltfError> {
    let nodes = &document.nodes;
    let mut parent: Vec<Option<usize>> = vec![None; nodes.len()];
    for (i, node) in nodes.iter().enumerate() {
        let has_trs = node.translation.is_some() || node.rotation.is_some() || node.scale.is_some();
        if node.matrix.is_some() && has_trs {
            return Err(GltfError::InvalidDocument(format!(
                "node {i} has both matrix and translation/rotation/scale"
            )));
        }
        if let Some(mesh) = node.mesh {
            check(mesh.value(), document.meshes.len(), || format!("node {i}"), "mesh")?;
        }
        for child in children(node) {
            check(child, nodes.len(), || format!("node {i}"), "node")?;
            if child == i {
                return Err(GltfError::InvalidDocument(format!(
                    "node {i} is its own child"
                )));
            }
            if let Some(existing) = parent[child] {
                return Err(GltfError::InvalidDocument(format!(
                    "node {child} has two parents ({existing} and {i})"
                )));
            }
            parent[child] = Some(i);
        }
    }

    // With at most one parent each, a cycle is a chain of parents that
    // never reaches a root.
    for start in 0..nodes.len() {
        let mut current = start;
        let mut steps = 0;
        while let Some(p) = parent[current] {
            current = p;
            steps += 1;
            if steps > nodes.len() {
                return Err(GltfError::InvalidDocument(format!(
                    "node {start} is part of a cycle"
                )));
            }
        }
    }
    Ok(())
}
