//! CPU-side mesh types.
//!
//! This module provides GPU-agnostic mesh data structures:
//!
//! - [`VertexLayout`] - Describes the attributes of an interleaved vertex buffer
//! - [`AssembledPrimitive`] - Vertex bytes, index bytes, layout and material

mod data;
mod layout;

pub use data::{AssembledPrimitive, IndexFormat, PrimitiveTopology};
pub use layout::{VertexAttribute, VertexAttributeFormat, VertexAttributeSemantic, VertexLayout};
