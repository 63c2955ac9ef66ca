//! # Lumen Core
//!
//! Renderer-agnostic asset data for the Lumen engine: meshes, materials,
//! samplers, textures and scene graphs, plus the glTF 2.0 loader that
//! produces them.

#[cfg(feature = "gltf")]
pub mod gltf;
pub mod material;
pub mod math;
pub mod mesh;
pub mod sampler;
pub mod scene;
pub mod texture;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
