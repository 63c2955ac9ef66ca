//! Accessor decoding.
//!
//! [`AccessorReader`] turns an accessor index into tightly packed element
//! bytes, de-interleaving strided buffer views on the way. Tight views are
//! returned as borrowed slices without copying.

use std::borrow::Cow;

use super::document::{Accessor, AccessorType, ComponentType, Document, accessor_format, lookup};
use super::error::GltfError;
use super::resource::buffer_view_bytes;

/// Largest zero-filled accessor, in bytes, decoded without a buffer view.
pub const ZERO_FILL_LIMIT: usize = 1 << 30;

/// Reads accessor data out of resolved buffers.
#[derive(Clone, Copy)]
pub struct AccessorReader<'a> {
    document: &'a Document,
    buffers: &'a [Cow<'a, [u8]>],
}

impl<'a> AccessorReader<'a> {
    /// Create a reader over a document and its resolved buffers.
    pub fn new(document: &'a Document, buffers: &'a [Cow<'a, [u8]>]) -> Self {
        Self { document, buffers }
    }

    /// Look up accessor `index`.
    pub fn accessor(&self, index: usize) -> Result<&'a Accessor, GltfError> {
        lookup(
            &self.document.accessors,
            index,
            || "primitive".to_string(),
            "accessor",
        )
    }

    /// Component type and element shape of accessor `index`.
    pub fn format(&self, index: usize) -> Result<(ComponentType, AccessorType), GltfError> {
        accessor_format(self.accessor(index)?).ok_or_else(|| {
            GltfError::InvalidDocument(format!(
                "accessor {index} has an unknown componentType or type"
            ))
        })
    }

    /// Tightly packed bytes of every element of accessor `index`.
    ///
    /// The element stride is the view's `byteStride`, or the element size
    /// when absent. The accessor must fit inside its buffer view, which in
    /// turn must fit inside its buffer. Accessors without a buffer view
    /// decode as zeros, up to [`ZERO_FILL_LIMIT`] bytes.
    pub fn extract(&self, index: usize) -> Result<Cow<'a, [u8]>, GltfError> {
        let accessor = self.accessor(index)?;
        let (component_type, kind) = self.format(index)?;
        if accessor.sparse.is_some() {
            return Err(GltfError::UnsupportedEncoding {
                accessor: index,
                detail: "sparse accessors are not supported".to_string(),
            });
        }

        let out_of_bounds = |required: Option<usize>, available: usize| {
            GltfError::AccessorOutOfBounds {
                accessor: index,
                required: required.unwrap_or(usize::MAX),
                available,
            }
        };
        let element_size = component_type.size() * kind.multiplicity();
        let count = usize::try_from(accessor.count.0).ok();
        let byte_offset = usize::try_from(accessor.byte_offset.map_or(0, |o| o.0)).ok();

        let Some(view_index) = accessor.buffer_view.map(|view| view.value()) else {
            let len = count.and_then(|count| count.checked_mul(element_size));
            return match len {
                Some(len) if len <= ZERO_FILL_LIMIT => Ok(Cow::Owned(vec![0; len])),
                _ => Err(out_of_bounds(len, ZERO_FILL_LIMIT)),
            };
        };
        if count == Some(0) {
            return Ok(Cow::Borrowed(&[]));
        }

        let view = lookup(
            &self.document.buffer_views,
            view_index,
            || format!("accessor {index}"),
            "bufferView",
        )?;
        let stride = view.byte_stride.map_or(element_size, |stride| stride.0);
        if stride < element_size {
            return Err(GltfError::UnsupportedEncoding {
                accessor: index,
                detail: format!("byteStride {stride} is smaller than element size {element_size}"),
            });
        }

        // The last element only needs its own bytes, not a whole stride.
        let view_length = usize::try_from(view.byte_length.0).unwrap_or(usize::MAX);
        let end = count
            .and_then(|count| stride.checked_mul(count - 1))
            .and_then(|span| span.checked_add(element_size))
            .zip(byte_offset)
            .and_then(|(span, offset)| offset.checked_add(span));
        let (Some(start), Some(end)) = (byte_offset, end.filter(|&end| end <= view_length)) else {
            return Err(out_of_bounds(end, view_length));
        };

        let bytes = buffer_view_bytes(self.document, self.buffers, view_index)?;
        let data = &bytes[start..end];

        if stride == element_size {
            return Ok(Cow::Borrowed(data));
        }

        let mut packed = Vec::with_capacity(data.len() / stride * element_size + element_size);
        for element in data.chunks(stride) {
            packed.extend_from_slice(&element[..element_size]);
        }
        Ok(Cow::Owned(packed))
    }

    /// Decode an index accessor into `u32` values.
    ///
    /// Only unsigned 8, 16 and 32 bit scalars are valid index types.
    pub fn index_sequence(&self, index: usize) -> Result<Vec<u32>, GltfError> {
        let (component_type, kind) = self.format(index)?;
        if kind != AccessorType::Scalar {
            return Err(GltfError::UnsupportedEncoding {
                accessor: index,
                detail: format!("index accessor has type {kind:?}, expected SCALAR"),
            });
        }
        if !matches!(
            component_type,
            ComponentType::U8 | ComponentType::U16 | ComponentType::U32
        ) {
            return Err(GltfError::UnsupportedEncoding {
                accessor: index,
                detail: format!("{component_type:?} is not a valid index component type"),
            });
        }

        let bytes = self.extract(index)?;
        Ok(match component_type {
            ComponentType::U8 => bytes.iter().map(|&b| b as u32).collect(),
            ComponentType::U16 => bytes
                .chunks_exact(2)
                .map(|b| u16::from_le_bytes([b[0], b[1]]) as u32)
                .collect(),
            _ => bytes
                .chunks_exact(4)
                .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect(),
        })
    }

    /// Decode every component of accessor `index` into `f32`.
    ///
    /// Normalized integers map to `[0, 1]` or `[-1, 1]`; other integers are
    /// converted by value.
    pub fn read_f32(&self, index: usize) -> Result<Vec<f32>, GltfError> {
        let normalized = self.accessor(index)?.normalized;
        let (component_type, _) = self.format(index)?;
        let bytes = self.extract(index)?;
        Ok(decode_components(&bytes, component_type, normalized))
    }

    /// Decode a float accessor whose elements have `N` components.
    pub fn read_elements<const N: usize>(
        &self,
        index: usize,
    ) -> Result<Vec<[f32; N]>, GltfError> {
        let (_, kind) = self.format(index)?;
        if kind.multiplicity() != N {
            return Err(GltfError::UnsupportedEncoding {
                accessor: index,
                detail: format!("expected {N} components, accessor has type {kind:?}"),
            });
        }
        let flat = self.read_f32(index)?;
        Ok(flat
            .chunks_exact(N)
            .map(|c| std::array::from_fn(|i| c[i]))
            .collect())
    }
}

fn decode_components(bytes: &[u8], component_type: ComponentType, normalized: bool) -> Vec<f32> {
    match component_type {
        ComponentType::F32 => bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
        ComponentType::U8 => bytes
            .iter()
            .map(|&v| if normalized { v as f32 / 255.0 } else { v as f32 })
            .collect(),
        ComponentType::I8 => bytes
            .iter()
            .map(|&v| {
                let v = v as i8 as f32;
                if normalized { (v / 127.0).max(-1.0) } else { v }
            })
            .collect(),
        ComponentType::U16 => bytes
            .chunks_exact(2)
            .map(|b| {
                let v = u16::from_le_bytes([b[0], b[1]]) as f32;
                if normalized { v / 65535.0 } else { v }
            })
            .collect(),
        ComponentType::I16 => bytes
            .chunks_exact(2)
            .map(|b| {
                let v = i16::from_le_bytes([b[0], b[1]]) as f32;
                if normalized { (v / 32767.0).max(-1.0) } else { v }
            })
            .collect(),
        ComponentType::U32 => bytes
            .chunks_exact(4)
            .map(|b| {
                let v = u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f32;
                if normalized { v / u32::MAX as f32 } else { v }
            })
            .collect(),
    }
}
