//! CPU-side material descriptors.
//!
//! - [`MaterialDescriptor`] - Engine-neutral PBR metallic-roughness material
//! - [`TextureBinding`] - Decoded texture + sampler + UV set
//! - [`AlphaMode`] - Alpha rendering mode (opaque, mask with cutoff, blend)

mod types;

pub use types::{AlphaMode, MaterialDescriptor, TextureBinding};
