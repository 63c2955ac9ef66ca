//! Material data types for CPU-side material definitions.
//!
//! A [`MaterialDescriptor`] carries fully resolved PBR metallic-roughness
//! values: every factor has its default applied, extension multipliers are
//! already folded in, and each texture slot holds the decoded pixels together
//! with the sampler that applies to it.

use std::sync::Arc;

use crate::sampler::CpuSampler;
use crate::texture::CpuTexture;

/// Alpha rendering mode.
///
/// Affects pipeline state (blend configuration), not shader bindings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AlphaMode {
    /// Fully opaque (alpha ignored).
    #[default]
    Opaque,
    /// Alpha masking with cutoff threshold.
    Mask,
    /// Full alpha blending.
    Blend,
}

/// A texture slot of a material.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureBinding {
    /// Index into the document's texture array.
    pub texture: usize,
    /// Name of the texture. The shared pixels carry the image's name.
    pub name: Option<String>,
    /// Index of the image the pixels were decoded from.
    pub image: usize,
    /// Texture coordinate set index (0, 1, ...).
    pub tex_coord: u32,
    /// Sampler with glTF defaults applied.
    pub sampler: CpuSampler,
    /// Decoded pixels, shared between every binding of the same image.
    pub pixels: Arc<CpuTexture>,
}

/// CPU-side material definition.
///
/// Pipeline state ([`alpha_mode`](Self::alpha_mode),
/// [`double_sided`](Self::double_sided)) lives next to the shading inputs.
///
/// # Example
///
/// ```
/// use lumen_core::material::MaterialDescriptor;
///
/// let mat = MaterialDescriptor::new()
///     .with_name("red_metal")
///     .with_base_color_factor([1.0, 0.0, 0.0, 1.0])
///     .with_metallic_factor(1.0);
/// assert_eq!(mat.roughness_factor, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDescriptor {
    /// Material name.
    pub name: Option<String>,
    /// Base color factor `[r, g, b, a]`.
    pub base_color_factor: [f32; 4],
    /// Base color texture.
    pub base_color_texture: Option<TextureBinding>,
    /// Metallic factor (0.0 to 1.0).
    pub metallic_factor: f32,
    /// Roughness factor (0.0 to 1.0).
    pub roughness_factor: f32,
    /// Metallic-roughness texture (B = metallic, G = roughness).
    pub metallic_roughness_texture: Option<TextureBinding>,
    /// Normal map texture.
    pub normal_texture: Option<TextureBinding>,
    /// Normal map scale.
    pub normal_scale: f32,
    /// Occlusion texture.
    pub occlusion_texture: Option<TextureBinding>,
    /// Occlusion strength (0.0 to 1.0).
    pub occlusion_strength: f32,
    /// Emissive factor `[r, g, b]`, already multiplied by any emissive strength.
    pub emissive_factor: [f32; 3],
    /// Emissive texture.
    pub emissive_texture: Option<TextureBinding>,
    /// Alpha rendering mode.
    pub alpha_mode: AlphaMode,
    /// Alpha cutoff threshold (for [`AlphaMode::Mask`]).
    pub alpha_cutoff: f32,
    /// Whether the material is double-sided.
    pub double_sided: bool,
}

impl MaterialDescriptor {
    /// Creates a material with every glTF default applied.
    pub fn new() -> Self {
        Self {
            name: None,
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness_texture: None,
            normal_texture: None,
            normal_scale: 1.0,
            occlusion_texture: None,
            occlusion_strength: 1.0,
            emissive_factor: [0.0, 0.0, 0.0],
            emissive_texture: None,
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
        }
    }

    /// Set the material name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the base color factor.
    #[must_use]
    pub fn with_base_color_factor(mut self, factor: [f32; 4]) -> Self {
        self.base_color_factor = factor;
        self
    }

    /// Set the metallic factor.
    #[must_use]
    pub fn with_metallic_factor(mut self, factor: f32) -> Self {
        self.metallic_factor = factor;
        self
    }

    /// Set the roughness factor.
    #[must_use]
    pub fn with_roughness_factor(mut self, factor: f32) -> Self {
        self.roughness_factor = factor;
        self
    }

    /// Set the emissive factor.
    #[must_use]
    pub fn with_emissive_factor(mut self, factor: [f32; 3]) -> Self {
        self.emissive_factor = factor;
        self
    }

    /// Set the alpha rendering mode.
    #[must_use]
    pub fn with_alpha_mode(mut self, alpha_mode: AlphaMode) -> Self {
        self.alpha_mode = alpha_mode;
        self
    }

    /// Set double-sided rendering.
    #[must_use]
    pub fn with_double_sided(mut self, double_sided: bool) -> Self {
        self.double_sided = double_sided;
        self
    }

    /// Iterate over every texture slot that is bound.
    pub fn textures(&self) -> impl Iterator<Item = &TextureBinding> {
        [
            &self.base_color_texture,
            &self.metallic_roughness_texture,
            &self.normal_texture,
            &self.occlusion_texture,
            &self.emissive_texture,
        ]
        .into_iter()
        .flatten()
    }
}

impl Default for MaterialDescriptor {
    fn default() -> Self {
        Self::new()
    }
}
