//! Buffer and image byte resolution.
//!
//! Each resource is looked up in this order: a `data:` URI, the GLB BIN
//! chunk (buffer 0 without a URI, or an image stored in a buffer view), and
//! finally an external read through a [`ResourceReader`].

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use super::document::{Document, lookup};
use super::error::GltfError;

/// Source of bytes for URIs that are not embedded in the asset.
pub trait ResourceReader {
    /// Read the resource at `uri`, as written in the document.
    fn read(&self, uri: &str) -> std::io::Result<Vec<u8>>;
}

/// Reads external resources from the file system, relative to `base`.
#[derive(Debug, Clone)]
pub struct FileResources {
    /// Directory relative URIs are resolved against.
    pub base: PathBuf,
}

impl FileResources {
    /// Resolve URIs against `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Resolve URIs against the directory containing `asset`.
    pub fn for_asset(asset: impl AsRef<Path>) -> Self {
        let base = asset
            .as_ref()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self { base }
    }
}

impl ResourceReader for FileResources {
    fn read(&self, uri: &str) -> std::io::Result<Vec<u8>> {
        let path = self.base.join(uri);
        log::debug!("glTF: reading external resource {}", path.display());
        std::fs::read(path)
    }
}

/// Rejects every external read. Used when only embedded data is allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExternalResources;

impl ResourceReader for NoExternalResources {
    fn read(&self, uri: &str) -> std::io::Result<Vec<u8>> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            format!("external resource {uri} requested but external reads are disabled"),
        ))
    }
}

/// Decode a `data:` URI. Returns `None` for any other scheme.
pub fn decode_data_uri(uri: &str) -> Option<Result<Vec<u8>, GltfError>> {
    let rest = uri.strip_prefix("data:")?;
    Some(match rest.split_once(',') {
        Some((_, payload)) => STANDARD.decode(payload).map_err(GltfError::from),
        None => Err(GltfError::InvalidDocument(format!(
            "data URI without payload separator: {}",
            truncate(uri)
        ))),
    })
}

fn truncate(uri: &str) -> &str {
    match uri.char_indices().nth(48) {
        Some((i, _)) => &uri[..i],
        None => uri,
    }
}

fn read_external(reader: &dyn ResourceReader, uri: &str) -> Result<Vec<u8>, GltfError> {
    reader.read(uri).map_err(|source| GltfError::Resource {
        uri: uri.to_string(),
        source,
    })
}

/// Resolve every document buffer to its bytes.
///
/// A resolved buffer shorter than its declared `byteLength` is an error;
/// longer ones are kept as-is (GLB BIN chunks may carry trailing padding).
pub fn resolve_buffers<'a>(
    document: &Document,
    bin: Option<&'a [u8]>,
    reader: &dyn ResourceReader,
) -> Result<Vec<Cow<'a, [u8]>>, GltfError> {
    let mut buffers = Vec::with_capacity(document.buffers.len());
    for (index, buffer) in document.buffers.iter().enumerate() {
        let data: Cow<'a, [u8]> = match (&buffer.uri, bin) {
            (Some(uri), _) => match decode_data_uri(uri) {
                Some(decoded) => Cow::Owned(decoded?),
                None => Cow::Owned(read_external(reader, uri)?),
            },
            (None, Some(bin)) if index == 0 => Cow::Borrowed(bin),
            (None, _) => return Err(GltfError::MissingBufferData { buffer: index }),
        };
        let declared = usize::try_from(buffer.byte_length.0).unwrap_or(usize::MAX);
        if data.len() < declared {
            return Err(GltfError::BufferTooShort {
                buffer: index,
                declared,
                actual: data.len(),
            });
        }
        buffers.push(data);
    }
    log::debug!("glTF: resolved {} buffers", buffers.len());
    Ok(buffers)
}

/// Bytes covered by buffer view `view`, bounds-checked against its buffer.
pub fn buffer_view_bytes<'b>(
    document: &Document,
    buffers: &'b [Cow<'_, [u8]>],
    view: usize,
) -> Result<&'b [u8], GltfError> {
    let bv = lookup(&document.buffer_views, view, || "document".to_string(), "bufferView")?;
    let buffer = lookup(buffers, bv.buffer.value(), || format!("bufferView {view}"), "buffer")?;
    let start = usize::try_from(bv.byte_offset.map_or(0, |o| o.0)).ok();
    let length = usize::try_from(bv.byte_length.0).ok();
    let end = start.zip(length).and_then(|(start, length)| start.checked_add(length));
    start
        .zip(end)
        .and_then(|(start, end)| buffer.get(start..end))
        .ok_or(GltfError::BufferViewOutOfBounds {
            view,
            required: end.unwrap_or(usize::MAX),
            available: buffer.len(),
        })
}

/// Encoded bytes of image `index`.
pub fn image_bytes<'b>(
    document: &Document,
    buffers: &'b [Cow<'_, [u8]>],
    reader: &dyn ResourceReader,
    index: usize,
) -> Result<Cow<'b, [u8]>, GltfError> {
    let image = lookup(&document.images, index, || "document".to_string(), "image")?;
    if let Some(decoded) = image.uri.as_deref().and_then(decode_data_uri) {
        return Ok(Cow::Owned(decoded?));
    }
    if let Some(view) = image.buffer_view {
        return Ok(Cow::Borrowed(buffer_view_bytes(document, buffers, view.value())?));
    }
    match &image.uri {
        Some(uri) => Ok(Cow::Owned(read_external(reader, uri)?)),
        None => Err(GltfError::InvalidDocument(format!(
            "image {index} has neither uri nor bufferView"
        ))),
    }
}
