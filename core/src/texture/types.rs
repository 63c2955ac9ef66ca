//! CPU-side texture data.

/// Numeric encoding of one channel of a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelEncoding {
    /// 8-bit unsigned normalized.
    Uint8,
    /// 16-bit unsigned normalized.
    Uint16,
    /// 16-bit float.
    Float16,
    /// 32-bit float.
    Float32,
}

impl ChannelEncoding {
    /// Size in bytes of one channel.
    pub fn size(&self) -> usize {
        match self {
            Self::Uint8 => 1,
            Self::Uint16 | Self::Float16 => 2,
            Self::Float32 => 4,
        }
    }
}

/// Which corner the first row of [`CpuTexture::data`] corresponds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageOrigin {
    /// First row is the top of the image (glTF and most image codecs).
    #[default]
    TopLeft,
    /// First row is the bottom of the image.
    BottomLeft,
}

/// Decoded pixel data, ready to hand to a renderer.
///
/// Rows are tightly packed: `row_stride == width * channels * encoding.size()`.
/// Multi-byte channels are stored in native byte order.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuTexture {
    /// Texture name, if any.
    pub name: Option<String>,
    /// Index of the source image in the document, if loaded from one.
    pub image: Option<usize>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Channels per pixel (1 to 4).
    pub channels: u32,
    /// Encoding of each channel.
    pub encoding: ChannelEncoding,
    /// Bytes per row.
    pub row_stride: u32,
    /// Row order of [`data`](Self::data).
    pub origin: ImageOrigin,
    /// Raw pixel bytes.
    pub data: Vec<u8>,
}

impl CpuTexture {
    /// Create a texture with tightly packed rows and top-left origin.
    pub fn new(
        width: u32,
        height: u32,
        channels: u32,
        encoding: ChannelEncoding,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: None,
            image: None,
            width,
            height,
            channels,
            encoding,
            row_stride: width * channels * encoding.size() as u32,
            origin: ImageOrigin::TopLeft,
            data,
        }
    }

    /// Set the texture name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Record the source image index.
    #[must_use]
    pub fn with_image(mut self, image: usize) -> Self {
        self.image = Some(image);
        self
    }

    /// Bytes per pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        self.channels as usize * self.encoding.size()
    }

    /// Whether `data` holds exactly `row_stride * height` bytes.
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.row_stride as usize * self.height as usize
    }
}
