//! Text/binary container detection and GLB chunk parsing.
//!
//! A GLB file is a 12-byte header (`magic`, `version`, `length`, all
//! little-endian `u32`) followed by chunks of `length`, `type`, payload.
//! Anything that does not start with the `glTF` magic is treated as a JSON
//! document.

use super::document::Document;
use super::error::{ContainerError, GltfError};

/// `glTF` in little-endian.
pub const GLB_MAGIC: u32 = 0x4654_6C67;
/// Only GLB version accepted.
pub const GLB_VERSION: u32 = 2;
/// `JSON` chunk type.
pub const CHUNK_JSON: u32 = 0x4E4F_534A;
/// `BIN\0` chunk type.
pub const CHUNK_BIN: u32 = 0x004E_4942;

const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;
const MAGIC_LEN: usize = 4;

/// A parsed container: the document plus the optional BIN chunk.
#[derive(Debug, Clone)]
pub struct Container<'a> {
    /// Decoded JSON document.
    pub document: Document,
    /// Payload of the BIN chunk, if the input was GLB and had one.
    pub bin: Option<&'a [u8]>,
}

/// Whether `data` starts with the GLB magic.
pub fn is_binary_container(data: &[u8]) -> bool {
    data.len() >= MAGIC_LEN && read_u32(data, 0) == Some(GLB_MAGIC)
}

/// Split `data` into a document and an optional binary chunk.
///
/// Inputs shorter than the four-byte magic are rejected outright.
pub fn parse_container(data: &[u8]) -> Result<Container<'_>, GltfError> {
    if data.len() < MAGIC_LEN {
        return Err(ContainerError::TooShort {
            len: data.len(),
            needed: MAGIC_LEN,
        }
        .into());
    }

    if is_binary_container(data) {
        let (json, bin) = split_glb(data)?;
        log::debug!(
            "glTF: GLB container, {} byte JSON chunk, {} byte BIN chunk",
            json.len(),
            bin.map_or(0, <[u8]>::len)
        );
        Ok(Container {
            document: parse_json(json)?,
            bin,
        })
    } else {
        Ok(Container {
            document: parse_json(data)?,
            bin: None,
        })
    }
}

fn parse_json(bytes: &[u8]) -> Result<Document, GltfError> {
    let text = std::str::from_utf8(bytes).map_err(ContainerError::from)?;
    Ok(serde_json::from_str(text)?)
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Split a GLB byte stream into its JSON chunk and optional BIN chunk.
pub fn split_glb(data: &[u8]) -> Result<(&[u8], Option<&[u8]>), ContainerError> {
    let header = |offset| {
        read_u32(data, offset).ok_or(ContainerError::TooShort {
            len: data.len(),
            needed: HEADER_LEN,
        })
    };
    let magic = header(0)?;
    if magic != GLB_MAGIC {
        return Err(ContainerError::BadMagic(magic));
    }
    let version = header(4)?;
    if version != GLB_VERSION {
        return Err(ContainerError::UnsupportedVersion(version));
    }
    let declared = header(8)?;
    if declared as usize != data.len() {
        return Err(ContainerError::LengthMismatch {
            declared,
            actual: data.len(),
        });
    }

    let mut json = None;
    let mut bin = None;
    let mut offset = HEADER_LEN;
    let mut first = true;

    while offset < data.len() {
        let available = data.len() - offset;
        if available < CHUNK_HEADER_LEN {
            return Err(ContainerError::ChunkOutOfBounds {
                offset,
                length: CHUNK_HEADER_LEN,
                available,
            });
        }
        let length = read_u32(data, offset).unwrap_or(0) as usize;
        let chunk_type = read_u32(data, offset + 4).unwrap_or(0);
        let start = offset + CHUNK_HEADER_LEN;
        let payload = start
            .checked_add(length)
            .and_then(|end| data.get(start..end))
            .ok_or(ContainerError::ChunkOutOfBounds {
                offset,
                length: CHUNK_HEADER_LEN + length,
                available,
            })?;

        match chunk_type {
            CHUNK_JSON if first => json = Some(payload),
            _ if first => return Err(ContainerError::JsonChunkNotFirst { chunk_type }),
            CHUNK_BIN if bin.is_some() => {
                return Err(ContainerError::DuplicateBinChunk { offset });
            }
            CHUNK_BIN => bin = Some(payload),
            other => log::warn!("glTF: ignoring GLB chunk of type {other:#010x} at offset {offset}"),
        }

        first = false;
        // Producers pad payloads to 4 bytes; the declared length is exact.
        offset = start + length.next_multiple_of(4).min(data.len() - start);
    }

    let json = json.ok_or(ContainerError::MissingJsonChunk)?;
    Ok((json, bin))
}
