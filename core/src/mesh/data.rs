//! CPU-side mesh data structures.
//!
//! This module provides:
//! - [`PrimitiveTopology`] - How vertices are assembled into primitives
//! - [`IndexFormat`] - Index data format (u16 or u32)
//! - [`AssembledPrimitive`] - An interleaved vertex buffer plus index buffer

use std::sync::Arc;

use crate::material::MaterialDescriptor;

use super::layout::VertexLayout;

/// Primitive topology describing how vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Each vertex is a separate point.
    PointList,
    /// Every two vertices form a line.
    LineList,
    /// Vertices form a closed loop of lines.
    LineLoop,
    /// Vertices form a connected strip of lines.
    LineStrip,
    /// Every three vertices form a triangle.
    #[default]
    TriangleList,
    /// Vertices form a connected strip of triangles.
    TriangleStrip,
    /// Vertices form a fan of triangles around the first one.
    TriangleFan,
}

impl PrimitiveTopology {
    /// Get the number of vertices per primitive (for non-strip topologies).
    pub fn vertices_per_primitive(&self) -> Option<u32> {
        match self {
            Self::PointList => Some(1),
            Self::LineList => Some(2),
            Self::TriangleList => Some(3),
            Self::LineLoop | Self::LineStrip | Self::TriangleStrip | Self::TriangleFan => None,
        }
    }
}

/// Index format for indexed drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexFormat {
    /// 16-bit unsigned integers.
    #[default]
    Uint16,
    /// 32-bit unsigned integers.
    Uint32,
}

impl IndexFormat {
    /// Get the size in bytes of each index.
    pub fn size(&self) -> usize {
        match self {
            Self::Uint16 => 2,
            Self::Uint32 => 4,
        }
    }
}

/// A fully assembled primitive ready for upload.
///
/// Holds one interleaved vertex buffer described by [`layout`](Self::layout)
/// and one index buffer. Every attribute is stored as 32-bit floats in native
/// byte order. Immutable once produced.
#[derive(Clone)]
pub struct AssembledPrimitive {
    layout: Arc<VertexLayout>,
    topology: PrimitiveTopology,
    vertex_data: Vec<u8>,
    vertex_count: u32,
    index_data: Vec<u8>,
    index_format: IndexFormat,
    index_count: u32,
    material_index: Option<usize>,
    material: Option<Arc<MaterialDescriptor>>,
    label: Option<String>,
}

impl AssembledPrimitive {
    /// Create a primitive from vertex data laid out according to `layout`.
    ///
    /// Vertex count is inferred from the data length and stride.
    pub fn new(layout: Arc<VertexLayout>, vertex_data: Vec<u8>) -> Self {
        let stride = layout.stride as usize;
        let vertex_count = if stride > 0 {
            (vertex_data.len() / stride) as u32
        } else {
            0
        };
        Self {
            layout,
            topology: PrimitiveTopology::TriangleList,
            vertex_data,
            vertex_count,
            index_data: Vec::new(),
            index_format: IndexFormat::Uint32,
            index_count: 0,
            material_index: None,
            material: None,
            label: None,
        }
    }

    /// Set index data as u16 indices.
    pub fn with_indices_u16(mut self, indices: &[u16]) -> Self {
        self.index_data = bytemuck::cast_slice(indices).to_vec();
        self.index_format = IndexFormat::Uint16;
        self.index_count = indices.len() as u32;
        self
    }

    /// Set index data as u32 indices.
    pub fn with_indices_u32(mut self, indices: &[u32]) -> Self {
        self.index_data = bytemuck::cast_slice(indices).to_vec();
        self.index_format = IndexFormat::Uint32;
        self.index_count = indices.len() as u32;
        self
    }

    /// Set the primitive topology.
    pub fn with_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    /// Set the resolved material and its document index.
    pub fn with_material(mut self, index: usize, material: Arc<MaterialDescriptor>) -> Self {
        self.material_index = Some(index);
        self.material = Some(material);
        self
    }

    /// Set a debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the vertex layout.
    pub fn layout(&self) -> &Arc<VertexLayout> {
        &self.layout
    }

    /// Get the primitive topology.
    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    /// Raw interleaved vertex bytes.
    pub fn vertex_data(&self) -> &[u8] {
        &self.vertex_data
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Raw index bytes.
    pub fn index_data(&self) -> &[u8] {
        &self.index_data
    }

    /// Get the index format.
    pub fn index_format(&self) -> IndexFormat {
        self.index_format
    }

    /// Get the number of indices.
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Decode the index buffer into `u32` values.
    pub fn indices(&self) -> Vec<u32> {
        match self.index_format {
            IndexFormat::Uint16 => self
                .index_data
                .chunks_exact(2)
                .map(|b| u16::from_ne_bytes([b[0], b[1]]) as u32)
                .collect(),
            IndexFormat::Uint32 => self
                .index_data
                .chunks_exact(4)
                .map(|b| u32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
                .collect(),
        }
    }

    /// Read back the float components of one attribute for one vertex.
    ///
    /// Returns `None` if the layout lacks the attribute or the vertex is out
    /// of range.
    pub fn attribute_values(
        &self,
        semantic: super::VertexAttributeSemantic,
        vertex: usize,
    ) -> Option<Vec<f32>> {
        let attribute = self.layout.attribute(semantic)?;
        let start = vertex * self.layout.stride as usize + attribute.offset as usize;
        let bytes = self.vertex_data.get(start..start + attribute.format.size())?;
        Some(
            bytes
                .chunks_exact(4)
                .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
                .collect(),
        )
    }

    /// Document index of the material, if any.
    pub fn material_index(&self) -> Option<usize> {
        self.material_index
    }

    /// Get the material, if set.
    pub fn material(&self) -> Option<&Arc<MaterialDescriptor>> {
        self.material.as_ref()
    }

    /// Get the debug label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl std::fmt::Debug for AssembledPrimitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssembledPrimitive")
            .field("label", &self.label)
            .field("topology", &self.topology)
            .field("vertex_count", &self.vertex_count)
            .field("stride", &self.layout.stride)
            .field("index_format", &self.index_format)
            .field("index_count", &self.index_count)
            .field(
                "material",
                &self.material.as_ref().map(|m| m.name.as_deref()),
            )
            .finish()
    }
}
