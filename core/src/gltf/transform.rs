//! Node transforms, handedness conversion, and scene tree composition.

use crate::math::{
    self, EPSILON, Mat4, Trs, Vec3, mat4_from_cols_array, mat4_from_uniform_scale,
};
use crate::scene::{Scene, SceneNode};

use super::accessor::AccessorReader;
use super::document::{self, Document, Node, Semantic, lookup};
use super::error::GltfError;

/// A node's local transform, in whichever form the document used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalTransform {
    /// Explicit column-major matrix.
    Matrix(Mat4),
    /// Translation, rotation and scale, each defaulting to identity.
    Trs(Trs),
}

impl LocalTransform {
    /// Read the local transform of `node`.
    ///
    /// Nodes carrying both forms are rejected during validation, so a
    /// present `matrix` is authoritative here.
    pub fn from_node(node: &Node) -> Self {
        if let Some(matrix) = &node.matrix {
            return Self::Matrix(mat4_from_cols_array(matrix));
        }
        let identity = Trs::identity();
        Self::Trs(Trs {
            translation: node.translation.map_or(identity.translation, Vec3::from),
            rotation: node
                .rotation
                .as_ref()
                .map_or(identity.rotation, |r| math::quat_from_array(r.0)),
            scale: node.scale.map_or(identity.scale, Vec3::from),
        })
    }

    /// The transform as a matrix.
    pub fn to_matrix(&self) -> Mat4 {
        match self {
            Self::Matrix(m) => *m,
            Self::Trs(trs) => trs.to_matrix(),
        }
    }

    /// The transform converted to the left-handed convention.
    ///
    /// Matrices are decomposed first (see [`Trs::from_matrix`]).
    pub fn to_left_handed(&self) -> Mat4 {
        let trs = match self {
            Self::Matrix(m) => Trs::from_matrix(m),
            Self::Trs(trs) => *trs,
        };
        flip_handedness(trs).to_matrix()
    }
}

/// Mirror a transform across the XY plane.
///
/// Negates translation Z and rotation X/Y; rotation Z/W and scale are kept.
pub fn flip_handedness(trs: Trs) -> Trs {
    let mut flipped = trs;
    flipped.translation.z = -trs.translation.z;
    flipped.rotation.coords.x = -trs.rotation.coords.x;
    flipped.rotation.coords.y = -trs.rotation.coords.y;
    flipped
}

/// Decompose, flip, and recompose a matrix.
pub fn convert_to_left_handed(m: &Mat4) -> Mat4 {
    flip_handedness(Trs::from_matrix(m)).to_matrix()
}

/// Local matrix of `node`, converted when requested.
pub fn local_matrix(node: &Node, convert: bool) -> Mat4 {
    let local = LocalTransform::from_node(node);
    if convert {
        local.to_left_handed()
    } else {
        local.to_matrix()
    }
}

/// Largest absolute POSITION component over every mesh reachable from scene
/// `scene`.
///
/// Uses the accessor's declared `min`/`max` and falls back to reading the
/// data when they are absent.
pub(crate) fn scene_extent(
    document: &Document,
    reader: &AccessorReader<'_>,
    scene: usize,
) -> Result<Option<f32>, GltfError> {
    let scene = lookup(&document.scenes, scene, || "document".to_string(), "scene")?;
    let mut stack: Vec<usize> = scene.nodes.iter().map(|node| node.value()).collect();
    let mut extent: Option<f32> = None;

    while let Some(index) = stack.pop() {
        let node = lookup(&document.nodes, index, || "scene".to_string(), "node")?;
        stack.extend(document::children(node));
        let Some(mesh) = node.mesh.map(|mesh| mesh.value()) else {
            continue;
        };
        let mesh = lookup(&document.meshes, mesh, || format!("node {index}"), "mesh")?;
        for primitive in &mesh.primitives {
            let Some(accessor) = document::attribute(primitive, Semantic::Positions) else {
                continue;
            };
            let a = reader.accessor(accessor)?;
            let local = match (bound(&a.min), bound(&a.max)) {
                (Some(min), Some(max)) => min.into_iter().chain(max).map(f32::abs).reduce(f32::max),
                _ => reader
                    .read_f32(accessor)?
                    .into_iter()
                    .map(f32::abs)
                    .reduce(f32::max),
            };
            if let Some(local) = local {
                extent = Some(extent.map_or(local, |e| e.max(local)));
            }
        }
    }
    Ok(extent)
}

/// Numeric components of an accessor `min`/`max` array.
fn bound(value: &Option<serde_json::Value>) -> Option<Vec<f32>> {
    value
        .as_ref()?
        .as_array()?
        .iter()
        .map(|v| v.as_f64().map(|v| v as f32))
        .collect()
}

/// Uniform scale that fits `extent` into the unit cube, if it is usable.
pub fn auto_scale_factor(extent: Option<f32>) -> Option<f32> {
    extent.filter(|e| e.is_finite() && *e > EPSILON).map(|e| 1.0 / e)
}

/// Inputs shared by every node of a scene walk.
pub(crate) struct SceneBuilder<'a> {
    pub document: &'a Document,
    /// Mesh index to flat primitive indices.
    pub mesh_primitives: &'a [Vec<usize>],
    pub convert: bool,
}

impl SceneBuilder<'_> {
    /// Build scene `index`, pre-multiplying every root by `root_scale`.
    pub fn build(&self, index: usize, root_scale: Option<f32>) -> Result<Scene, GltfError> {
        let scene = lookup(&self.document.scenes, index, || "document".to_string(), "scene")?;
        let root = root_scale.map(mat4_from_uniform_scale);

        let nodes = scene
            .nodes
            .iter()
            .map(|node| self.build_node(node.value(), &Mat4::identity(), root.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Scene {
            name: scene.name.clone(),
            nodes,
        })
    }

    fn build_node(
        &self,
        index: usize,
        parent_world: &Mat4,
        prefix: Option<&Mat4>,
    ) -> Result<SceneNode, GltfError> {
        let node = lookup(&self.document.nodes, index, || "scene".to_string(), "node")?;
        let mut local = local_matrix(node, self.convert);
        if let Some(prefix) = prefix {
            local = prefix * local;
        }
        let world = parent_world * local;

        let children = document::children(node)
            .map(|child| self.build_node(child, &world, None))
            .collect::<Result<Vec<_>, _>>()?;

        let name = node.name.clone().unwrap_or_else(|| format!("Node {index}"));
        let mut scene_node = SceneNode::new(index, name)
            .with_transforms(local, world)
            .with_children(children);
        if let Some(mesh) = node.mesh.map(|mesh| mesh.value()) {
            let primitives = lookup(self.mesh_primitives, mesh, || format!("node {index}"), "mesh")?;
            scene_node = scene_node.with_mesh(mesh, primitives.clone());
        }
        Ok(scene_node)
    }
}
