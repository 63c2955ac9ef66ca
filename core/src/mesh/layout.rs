//! Interleaved vertex layout description.

/// What a vertex attribute represents.
///
/// Declaration order is the interleaving order used by the glTF assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VertexAttributeSemantic {
    /// Vertex position (`POSITION`).
    Position,
    /// Vertex normal (`NORMAL`).
    Normal,
    /// Tangent with handedness in `w` (`TANGENT`).
    Tangent,
    /// First texture coordinate set (`TEXCOORD_0`).
    TexCoord0,
    /// First vertex color set (`COLOR_0`).
    Color0,
}

impl VertexAttributeSemantic {
    /// The glTF attribute name.
    pub fn gltf_name(&self) -> &'static str {
        match self {
            Self::Position => "POSITION",
            Self::Normal => "NORMAL",
            Self::Tangent => "TANGENT",
            Self::TexCoord0 => "TEXCOORD_0",
            Self::Color0 => "COLOR_0",
        }
    }
}

/// Storage format of a single attribute inside the vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeFormat {
    /// Two 32-bit floats.
    Float2,
    /// Three 32-bit floats.
    Float3,
    /// Four 32-bit floats.
    Float4,
}

impl VertexAttributeFormat {
    /// Number of float components.
    pub fn component_count(&self) -> usize {
        match self {
            Self::Float2 => 2,
            Self::Float3 => 3,
            Self::Float4 => 4,
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.component_count() * std::mem::size_of::<f32>()
    }
}

/// One attribute in an interleaved vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// What the attribute represents.
    pub semantic: VertexAttributeSemantic,
    /// Storage format.
    pub format: VertexAttributeFormat,
    /// Byte offset from the start of the vertex.
    pub offset: u32,
}

impl VertexAttribute {
    /// Create a new attribute.
    pub fn new(semantic: VertexAttributeSemantic, format: VertexAttributeFormat, offset: u32) -> Self {
        Self {
            semantic,
            format,
            offset,
        }
    }
}

/// Layout of an interleaved vertex buffer.
///
/// Attributes are appended in order; the stride grows with each one.
#[derive(Debug, Clone, Default)]
pub struct VertexLayout {
    /// Attributes in buffer order.
    pub attributes: Vec<VertexAttribute>,
    /// Bytes per vertex.
    pub stride: u32,
    /// Optional label for debugging.
    pub label: Option<String>,
}

impl VertexLayout {
    /// Create an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute at the current end of the vertex.
    pub fn push(&mut self, semantic: VertexAttributeSemantic, format: VertexAttributeFormat) {
        self.attributes
            .push(VertexAttribute::new(semantic, format, self.stride));
        self.stride += format.size() as u32;
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn with_attribute(
        mut self,
        semantic: VertexAttributeSemantic,
        format: VertexAttributeFormat,
    ) -> Self {
        self.push(semantic, format);
        self
    }

    /// Set a debug label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Find the attribute with the given semantic.
    pub fn attribute(&self, semantic: VertexAttributeSemantic) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.semantic == semantic)
    }

    /// Whether the layout contains the given semantic.
    pub fn has(&self, semantic: VertexAttributeSemantic) -> bool {
        self.attribute(semantic).is_some()
    }

    /// Structural equality: same attributes, formats, offsets and stride.
    /// The label is ignored.
    pub fn structurally_equal(&self, other: &VertexLayout) -> bool {
        self.stride == other.stride && self.attributes == other.attributes
    }
}
