//! CPU-side sampler types and filter/address mode definitions.

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Nearest neighbor filtering.
    Nearest,
    /// Linear filtering.
    #[default]
    Linear,
}

/// Texture address mode (wrapping behavior).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    /// Clamp to edge.
    ClampToEdge,
    /// Repeat.
    #[default]
    Repeat,
    /// Mirrored repeat.
    MirrorRepeat,
}

/// CPU-side sampler configuration.
///
/// Describes how a texture is sampled: filtering and address modes. The
/// defaults are the ones glTF prescribes when a sampler omits a field
/// (linear filtering, repeat wrapping).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CpuSampler {
    /// Sampler name.
    pub name: Option<String>,
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Mipmap filter.
    pub mipmap_filter: FilterMode,
    /// Address mode for the S (U) coordinate.
    pub wrap_s: AddressMode,
    /// Address mode for the T (V) coordinate.
    pub wrap_t: AddressMode,
}

impl CpuSampler {
    /// Create a linear filtering, repeating sampler.
    pub fn linear() -> Self {
        Self::default()
    }

    /// Create a nearest neighbor filtering sampler.
    pub fn nearest() -> Self {
        Self {
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
            mipmap_filter: FilterMode::Nearest,
            ..Default::default()
        }
    }

    /// Set the sampler name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set address mode for both coordinates.
    #[must_use]
    pub fn with_address_mode(mut self, mode: AddressMode) -> Self {
        self.wrap_s = mode;
        self.wrap_t = mode;
        self
    }
}
