//! Scene graph data types.

use crate::math::Mat4;

/// A node in a scene graph tree.
///
/// Nodes form a recursive tree structure. Each node carries its local
/// transform and the accumulated root-to-node world transform, plus
/// references to the primitives it draws. Primitive indices point into the
/// loader's flat primitive list.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Index of the source node in the document.
    pub node: usize,
    /// Node name.
    pub name: String,
    /// Local transform relative to the parent.
    pub local: Mat4,
    /// World transform (`parent.world * local`).
    pub world: Mat4,
    /// Document mesh index, if the node carries a mesh.
    pub mesh: Option<usize>,
    /// Primitives drawn by this node. Empty if the node carries no mesh.
    pub primitives: Vec<usize>,
    /// Child nodes forming the sub-tree.
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Creates a new node with identity transforms and no attachments.
    pub fn new(node: usize, name: impl Into<String>) -> Self {
        Self {
            node,
            name: name.into(),
            local: Mat4::identity(),
            world: Mat4::identity(),
            mesh: None,
            primitives: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set the local and world transforms.
    #[must_use]
    pub fn with_transforms(mut self, local: Mat4, world: Mat4) -> Self {
        self.local = local;
        self.world = world;
        self
    }

    /// Attach a mesh and the primitives it expanded to.
    #[must_use]
    pub fn with_mesh(mut self, mesh: usize, primitives: Vec<usize>) -> Self {
        self.mesh = Some(mesh);
        self.primitives = primitives;
        self
    }

    /// Set the child nodes.
    #[must_use]
    pub fn with_children(mut self, children: Vec<SceneNode>) -> Self {
        self.children = children;
        self
    }

    /// Visit this node and all descendants in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a SceneNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// A scene: an ordered forest of root nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    /// Scene name, if any.
    pub name: Option<String>,
    /// Root nodes of the scene, in document order.
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    /// Creates a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scene name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the root nodes.
    #[must_use]
    pub fn with_nodes(mut self, nodes: Vec<SceneNode>) -> Self {
        self.nodes = nodes;
        self
    }

    /// All nodes in pre-order, roots first.
    pub fn flatten(&self) -> Vec<&SceneNode> {
        let mut out = Vec::new();
        for root in &self.nodes {
            root.walk(&mut |n| out.push(n));
        }
        out
    }

    /// Find the scene node built from document node `node`.
    pub fn find(&self, node: usize) -> Option<&SceneNode> {
        self.flatten().into_iter().find(|n| n.node == node)
    }
}
