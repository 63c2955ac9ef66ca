//! Error types for glTF loading.

/// Coarse classification of a [`GltfError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad GLB magic, version, length or chunk layout.
    MalformedContainer,
    /// JSON that does not describe a valid glTF document.
    MalformedDocument,
    /// An index that points past the end of the array it refers to.
    DanglingReference,
    /// Accessor or buffer view arithmetic exceeds the underlying buffer.
    BufferOverrun,
    /// A component type / element shape combination with no defined mapping.
    UnsupportedEncoding,
    /// An external resource could not be read.
    ResourceUnavailable,
    /// Tangent generation failed for a primitive.
    GeometryAlgorithmFailure,
    /// Pixel data could not be decoded.
    ImageDecode,
}

/// Failures while splitting a GLB container into its chunks.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// Fewer bytes than the header needs.
    #[error("input is {len} bytes, need at least {needed}")]
    TooShort {
        /// Input length.
        len: usize,
        /// Bytes required.
        needed: usize,
    },
    /// The first four bytes are not `glTF`.
    #[error("bad magic {0:#010x}")]
    BadMagic(u32),
    /// Only version 2 is supported.
    #[error("unsupported GLB version {0}")]
    UnsupportedVersion(u32),
    /// Header length does not match the input length.
    #[error("header declares {declared} bytes but input has {actual}")]
    LengthMismatch {
        /// Length from the header.
        declared: u32,
        /// Actual input length.
        actual: usize,
    },
    /// No JSON chunk at all.
    #[error("missing JSON chunk")]
    MissingJsonChunk,
    /// The first chunk is something other than JSON.
    #[error("first chunk has type {chunk_type:#010x}, expected JSON")]
    JsonChunkNotFirst {
        /// Type of the first chunk.
        chunk_type: u32,
    },
    /// A second BIN chunk.
    #[error("second BIN chunk at offset {offset}")]
    DuplicateBinChunk {
        /// Byte offset of the chunk header.
        offset: usize,
    },
    /// A chunk header or payload runs past the end of the input.
    #[error("chunk at offset {offset} needs {length} bytes, {available} available")]
    ChunkOutOfBounds {
        /// Byte offset of the chunk header.
        offset: usize,
        /// Bytes the chunk needs.
        length: usize,
        /// Bytes left in the input.
        available: usize,
    },
    /// The JSON payload is not UTF-8.
    #[error("document is not UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Errors that can occur during glTF loading.
#[derive(Debug, thiserror::Error)]
pub enum GltfError {
    /// Container framing error.
    #[error("malformed container: {0}")]
    Container(#[from] ContainerError),

    /// JSON syntax or schema error.
    #[error("glTF parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Structurally invalid document (cycles, conflicting fields, bad URIs).
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// An index that points outside its target array.
    #[error("{from} references {target} {index}, but only {len} exist")]
    DanglingReference {
        /// Object holding the reference, e.g. `"accessor 3"`.
        from: String,
        /// Referenced array, e.g. `"bufferView"`.
        target: &'static str,
        /// Offending index.
        index: usize,
        /// Length of the referenced array.
        len: usize,
    },

    /// A primitive has no POSITION attribute.
    #[error("primitive has no POSITION attribute")]
    MissingPositions,

    /// An attribute count differs from the POSITION count.
    #[error("{attribute} has {actual} elements, POSITION has {expected}")]
    AttributeCountMismatch {
        /// Attribute name.
        attribute: &'static str,
        /// POSITION element count.
        expected: usize,
        /// Attribute element count.
        actual: usize,
    },

    /// A vertex index beyond the vertex count.
    #[error("accessor {accessor} holds index {index}, vertex count is {vertex_count}")]
    IndexOutOfRange {
        /// Index accessor.
        accessor: usize,
        /// Offending index value.
        index: u32,
        /// Number of vertices in the primitive.
        vertex_count: usize,
    },

    /// Accessor span exceeds its buffer view or buffer.
    #[error("accessor {accessor} needs bytes up to {required}, only {available} available")]
    AccessorOutOfBounds {
        /// Accessor index.
        accessor: usize,
        /// End offset the accessor needs.
        required: usize,
        /// Bytes available.
        available: usize,
    },

    /// Buffer view exceeds its buffer.
    #[error("bufferView {view} ends at {required}, buffer has {available} bytes")]
    BufferViewOutOfBounds {
        /// Buffer view index.
        view: usize,
        /// End offset of the view.
        required: usize,
        /// Length of the buffer.
        available: usize,
    },

    /// A resolved buffer is shorter than its declared `byteLength`.
    #[error("buffer {buffer} declares {declared} bytes but resolved to {actual}")]
    BufferTooShort {
        /// Buffer index.
        buffer: usize,
        /// Declared length.
        declared: usize,
        /// Resolved length.
        actual: usize,
    },

    /// Component type / shape combination that cannot be decoded here.
    #[error("accessor {accessor}: {detail}")]
    UnsupportedEncoding {
        /// Accessor index.
        accessor: usize,
        /// What is unsupported.
        detail: String,
    },

    /// A buffer with no URI outside a GLB container (or not buffer 0).
    #[error("buffer {buffer} has no data source")]
    MissingBufferData {
        /// Buffer index.
        buffer: usize,
    },

    /// A data URI payload that is not valid base64.
    #[error("invalid base64 in data URI: {0}")]
    DataUri(#[from] base64::DecodeError),

    /// An external resource could not be read.
    #[error("failed to read {uri}: {source}")]
    Resource {
        /// URI as written in the document.
        uri: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Image bytes could not be decoded.
    #[error("image {image} decode error: {source}")]
    ImageDecode {
        /// Image index.
        image: usize,
        /// Underlying codec error.
        #[source]
        source: image::ImageError,
    },

    /// Tangent generation reported failure.
    #[error("tangent generation failed")]
    TangentGeneration,

    /// Error while assembling a primitive.
    #[error("mesh {mesh} primitive {primitive}: {source}")]
    Primitive {
        /// Mesh index.
        mesh: usize,
        /// Primitive index within the mesh.
        primitive: usize,
        /// Underlying error.
        #[source]
        source: Box<GltfError>,
    },

    /// Error while resolving a material.
    #[error("material {material}: {source}")]
    Material {
        /// Material index.
        material: usize,
        /// Underlying error.
        #[source]
        source: Box<GltfError>,
    },
}

impl GltfError {
    /// Classify the error, looking through primitive and material context.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Container(_) => ErrorKind::MalformedContainer,
            Self::Parse(_)
            | Self::InvalidDocument(_)
            | Self::MissingPositions
            | Self::AttributeCountMismatch { .. }
            | Self::DataUri(_) => ErrorKind::MalformedDocument,
            Self::DanglingReference { .. } | Self::IndexOutOfRange { .. } => {
                ErrorKind::DanglingReference
            }
            Self::AccessorOutOfBounds { .. }
            | Self::BufferViewOutOfBounds { .. }
            | Self::BufferTooShort { .. } => ErrorKind::BufferOverrun,
            Self::UnsupportedEncoding { .. } => ErrorKind::UnsupportedEncoding,
            Self::MissingBufferData { .. } | Self::Resource { .. } => {
                ErrorKind::ResourceUnavailable
            }
            Self::ImageDecode { .. } => ErrorKind::ImageDecode,
            Self::TangentGeneration => ErrorKind::GeometryAlgorithmFailure,
            Self::Primitive { source, .. } | Self::Material { source, .. } => source.kind(),
        }
    }

    /// Wrap with the mesh/primitive that was being assembled.
    pub(crate) fn in_primitive(self, mesh: usize, primitive: usize) -> Self {
        Self::Primitive {
            mesh,
            primitive,
            source: Box::new(self),
        }
    }

    /// Wrap with the material that was being resolved.
    pub(crate) fn in_material(self, material: usize) -> Self {
        Self::Material {
            material,
            source: Box::new(self),
        }
    }

    pub(crate) fn dangling(
        from: impl Into<String>,
        target: &'static str,
        index: usize,
        len: usize,
    ) -> Self {
        Self::DanglingReference {
            from: from.into(),
            target,
            index,
            len,
        }
    }
}
