//! Material, texture and sampler resolution.
//!
//! Materials become [`MaterialDescriptor`]s with every glTF default applied
//! and, with the `emissive-strength` feature, `KHR_materials_emissive_strength`
//! folded into the emissive factor.
//! Images are decoded once and shared between every texture that uses them.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::material::{AlphaMode, MaterialDescriptor, TextureBinding};
use crate::sampler::{AddressMode, CpuSampler, FilterMode};
use crate::texture::{ChannelEncoding, CpuTexture};

use gltf_json::material::AlphaMode as SourceAlphaMode;

use super::document::{
    Document, MagFilter, Material, MinFilter, Sampler, WrappingMode, known, lookup,
};
use super::error::GltfError;
use super::resource::{ResourceReader, image_bytes};

fn map_mag_filter(filter: MagFilter) -> FilterMode {
    match filter {
        MagFilter::Nearest => FilterMode::Nearest,
        MagFilter::Linear => FilterMode::Linear,
    }
}

/// Split a glTF minification filter into (min, mipmap) filters.
fn map_min_filter(filter: MinFilter) -> (FilterMode, FilterMode) {
    use FilterMode::{Linear, Nearest};
    match filter {
        MinFilter::Nearest => (Nearest, Linear),
        MinFilter::Linear => (Linear, Linear),
        MinFilter::NearestMipmapNearest => (Nearest, Nearest),
        MinFilter::LinearMipmapNearest => (Linear, Nearest),
        MinFilter::NearestMipmapLinear => (Nearest, Linear),
        MinFilter::LinearMipmapLinear => (Linear, Linear),
    }
}

fn map_wrapping(mode: WrappingMode) -> AddressMode {
    match mode {
        WrappingMode::ClampToEdge => AddressMode::ClampToEdge,
        WrappingMode::MirroredRepeat => AddressMode::MirrorRepeat,
        WrappingMode::Repeat => AddressMode::Repeat,
    }
}

/// Resolve a sampler, applying glTF defaults to omitted fields.
///
/// `None` (a texture without a sampler) yields the all-default sampler.
pub fn resolve_sampler(sampler: Option<&Sampler>) -> CpuSampler {
    let Some(sampler) = sampler else {
        return CpuSampler::default();
    };
    let (min_filter, mipmap_filter) = sampler
        .min_filter
        .as_ref()
        .and_then(known)
        .map_or((FilterMode::Linear, FilterMode::Linear), map_min_filter);
    CpuSampler {
        name: sampler.name.clone(),
        mag_filter: sampler
            .mag_filter
            .as_ref()
            .and_then(known)
            .map_or(FilterMode::Linear, map_mag_filter),
        min_filter,
        mipmap_filter,
        wrap_s: known(&sampler.wrap_s).map_or(AddressMode::Repeat, map_wrapping),
        wrap_t: known(&sampler.wrap_t).map_or(AddressMode::Repeat, map_wrapping),
    }
}

fn map_alpha_mode(mode: SourceAlphaMode) -> AlphaMode {
    match mode {
        SourceAlphaMode::Opaque => AlphaMode::Opaque,
        SourceAlphaMode::Mask => AlphaMode::Mask,
        SourceAlphaMode::Blend => AlphaMode::Blend,
    }
}

/// `KHR_materials_emissive_strength` multiplier, 1 when absent.
#[cfg(feature = "emissive-strength")]
fn emissive_strength(material: &Material) -> f32 {
    material
        .extensions
        .as_ref()
        .and_then(|e| e.emissive_strength.as_ref())
        .map_or(1.0, |e| e.emissive_strength.0)
}

#[cfg(not(feature = "emissive-strength"))]
fn emissive_strength(_material: &Material) -> f32 {
    1.0
}

/// Decode encoded image bytes, keeping the source channel layout where a
/// renderer can consume it directly.
pub fn decode_image(
    bytes: &[u8],
    mime_type: Option<&str>,
    image: usize,
) -> Result<CpuTexture, GltfError> {
    let decoded = match mime_type.and_then(image::ImageFormat::from_mime_type) {
        Some(format) => image::load_from_memory_with_format(bytes, format),
        None => image::load_from_memory(bytes),
    }
    .map_err(|source| GltfError::ImageDecode { image, source })?;

    let (width, height) = (decoded.width(), decoded.height());
    let wide = |data: Vec<u16>| bytemuck::cast_slice::<u16, u8>(&data).to_vec();
    let float = |data: Vec<f32>| bytemuck::cast_slice::<f32, u8>(&data).to_vec();

    let (channels, encoding, data) = match decoded {
        image::DynamicImage::ImageLuma8(buf) => (1, ChannelEncoding::Uint8, buf.into_raw()),
        image::DynamicImage::ImageLumaA8(buf) => (2, ChannelEncoding::Uint8, buf.into_raw()),
        image::DynamicImage::ImageRgb8(buf) => (3, ChannelEncoding::Uint8, buf.into_raw()),
        image::DynamicImage::ImageRgba8(buf) => (4, ChannelEncoding::Uint8, buf.into_raw()),
        image::DynamicImage::ImageLuma16(buf) => (1, ChannelEncoding::Uint16, wide(buf.into_raw())),
        image::DynamicImage::ImageLumaA16(buf) => {
            (2, ChannelEncoding::Uint16, wide(buf.into_raw()))
        }
        image::DynamicImage::ImageRgb16(buf) => (3, ChannelEncoding::Uint16, wide(buf.into_raw())),
        image::DynamicImage::ImageRgba16(buf) => {
            (4, ChannelEncoding::Uint16, wide(buf.into_raw()))
        }
        image::DynamicImage::ImageRgb32F(buf) => {
            (3, ChannelEncoding::Float32, float(buf.into_raw()))
        }
        image::DynamicImage::ImageRgba32F(buf) => {
            (4, ChannelEncoding::Float32, float(buf.into_raw()))
        }
        other => (4, ChannelEncoding::Uint8, other.to_rgba8().into_raw()),
    };

    Ok(CpuTexture::new(width, height, channels, encoding, data).with_image(image))
}

/// Decoded images keyed by image index, in first-use order.
#[derive(Default)]
pub(crate) struct TextureCache {
    by_image: HashMap<usize, Arc<CpuTexture>>,
    order: Vec<Arc<CpuTexture>>,
}

impl TextureCache {
    fn get_or_insert_with(
        &mut self,
        image: usize,
        decode: impl FnOnce() -> Result<CpuTexture, GltfError>,
    ) -> Result<Arc<CpuTexture>, GltfError> {
        if let Some(texture) = self.by_image.get(&image) {
            return Ok(Arc::clone(texture));
        }
        let texture = Arc::new(decode()?);
        self.by_image.insert(image, Arc::clone(&texture));
        self.order.push(Arc::clone(&texture));
        Ok(texture)
    }

    /// Every decoded texture, in the order it was first needed.
    pub fn into_textures(self) -> Vec<Arc<CpuTexture>> {
        self.order
    }
}

/// Resolves document materials into descriptors.
pub(crate) struct MaterialResolver<'a> {
    document: &'a Document,
    buffers: &'a [Cow<'a, [u8]>],
    reader: &'a dyn ResourceReader,
    cache: TextureCache,
}

impl<'a> MaterialResolver<'a> {
    pub fn new(
        document: &'a Document,
        buffers: &'a [Cow<'a, [u8]>],
        reader: &'a dyn ResourceReader,
    ) -> Self {
        Self {
            document,
            buffers,
            reader,
            cache: TextureCache::default(),
        }
    }

    /// Resolve material `index`.
    pub fn resolve(&mut self, index: usize) -> Result<MaterialDescriptor, GltfError> {
        self.resolve_inner(index)
            .map_err(|e| e.in_material(index))
    }

    fn resolve_inner(&mut self, index: usize) -> Result<MaterialDescriptor, GltfError> {
        let document = self.document;
        let material = lookup(
            &document.materials,
            index,
            || "primitive".to_string(),
            "material",
        )?;
        let pbr = &material.pbr_metallic_roughness;
        let strength = emissive_strength(material);
        let [r, g, b] = material.emissive_factor.0;

        let mut descriptor = MaterialDescriptor::new()
            .with_base_color_factor(pbr.base_color_factor.0)
            .with_metallic_factor(pbr.metallic_factor.0)
            .with_roughness_factor(pbr.roughness_factor.0)
            .with_emissive_factor([r * strength, g * strength, b * strength])
            .with_alpha_mode(known(&material.alpha_mode).map_or(AlphaMode::Opaque, map_alpha_mode))
            .with_double_sided(material.double_sided);
        descriptor.name = material.name.clone();
        descriptor.alpha_cutoff = material.alpha_cutoff.map_or(0.5, |cutoff| cutoff.0);

        if let Some(info) = &pbr.base_color_texture {
            descriptor.base_color_texture = Some(self.binding(info.index.value(), info.tex_coord)?);
        }
        if let Some(info) = &pbr.metallic_roughness_texture {
            descriptor.metallic_roughness_texture =
                Some(self.binding(info.index.value(), info.tex_coord)?);
        }
        if let Some(info) = &material.normal_texture {
            descriptor.normal_texture = Some(self.binding(info.index.value(), info.tex_coord)?);
            descriptor.normal_scale = info.scale;
        }
        if let Some(info) = &material.occlusion_texture {
            descriptor.occlusion_texture = Some(self.binding(info.index.value(), info.tex_coord)?);
            descriptor.occlusion_strength = info.strength.0;
        }
        if let Some(info) = &material.emissive_texture {
            descriptor.emissive_texture = Some(self.binding(info.index.value(), info.tex_coord)?);
        }

        Ok(descriptor)
    }

    /// Bind texture `index`, decoding its image on first use.
    fn binding(&mut self, index: usize, tex_coord: u32) -> Result<TextureBinding, GltfError> {
        let (document, buffers, reader) = (self.document, self.buffers, self.reader);
        let texture = lookup(
            &document.textures,
            index,
            || "material".to_string(),
            "texture",
        )?;
        let image = texture.source.value();
        let sampler = match texture.sampler {
            Some(s) => Some(lookup(
                &document.samplers,
                s.value(),
                || format!("texture {index}"),
                "sampler",
            )?),
            None => None,
        };

        let pixels = self.cache.get_or_insert_with(image, || {
            let source = lookup(&document.images, image, || format!("texture {index}"), "image")?;
            let bytes = image_bytes(document, buffers, reader, image)?;
            let mime_type = source.mime_type.as_ref().map(|m| m.0.as_str());
            let mut decoded = decode_image(&bytes, mime_type, image)?;
            decoded.name = source.name.clone();
            log::debug!(
                "glTF: decoded image {image} ({}x{}, {} channels)",
                decoded.width,
                decoded.height,
                decoded.channels
            );
            Ok(decoded)
        })?;

        Ok(TextureBinding {
            texture: index,
            name: texture.name.clone(),
            image,
            tex_coord,
            sampler: resolve_sampler(sampler),
            pixels,
        })
    }

    /// Finish resolution and hand back every decoded texture.
    pub fn into_textures(self) -> Vec<Arc<CpuTexture>> {
        self.cache.into_textures()
    }
}
