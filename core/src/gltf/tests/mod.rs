//! Loader tests over programmatically built glTF and GLB fixtures.

use std::io::Cursor;

use base64::Engine as _;
use serde_json::{Value, json};

use crate::gltf::LoadOptions;

mod load_test;

/// Options with every coordinate post-process disabled, so values come back
/// as written.
fn raw_options() -> LoadOptions {
    LoadOptions::default()
        .with_convert_to_left_handed(false)
        .with_auto_scale(false)
}

fn assert_close(actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-5, "{actual:?} vs {expected:?}");
    }
}

fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn pad_to_four(bytes: &mut Vec<u8>, fill: u8) {
    while bytes.len() % 4 != 0 {
        bytes.push(fill);
    }
}

/// Frame a JSON document and optional BIN payload as GLB.
fn glb(document: &Value, bin: Option<&[u8]>) -> Vec<u8> {
    let mut json = serde_json::to_vec(document).unwrap();
    pad_to_four(&mut json, b' ');

    let mut out = Vec::new();
    out.extend_from_slice(&0x4654_6C67u32.to_le_bytes());
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(&0x4E4F_534Au32.to_le_bytes());
    out.extend_from_slice(&json);

    if let Some(bin) = bin {
        let mut bin = bin.to_vec();
        pad_to_four(&mut bin, 0);
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(&0x004E_4942u32.to_le_bytes());
        out.extend_from_slice(&bin);
    }

    let total = out.len() as u32;
    out[8..12].copy_from_slice(&total.to_le_bytes());
    out
}

/// Accumulates one binary buffer plus the views and accessors over it.
#[derive(Default)]
struct Fixture {
    bin: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
}

impl Fixture {
    fn new() -> Self {
        Self::default()
    }

    /// Append `bytes` as a new buffer view, aligned to four bytes.
    fn view(&mut self, bytes: &[u8], stride: Option<usize>) -> usize {
        pad_to_four(&mut self.bin, 0);
        let mut view = json!({
            "buffer": 0,
            "byteOffset": self.bin.len(),
            "byteLength": bytes.len(),
        });
        if let Some(stride) = stride {
            view["byteStride"] = json!(stride);
        }
        self.bin.extend_from_slice(bytes);
        self.views.push(view);
        self.views.len() - 1
    }

    /// Add an accessor over `view`; `fields` supplies everything else.
    fn accessor(&mut self, view: usize, mut fields: Value) -> usize {
        fields["bufferView"] = json!(view);
        self.accessors.push(fields);
        self.accessors.len() - 1
    }

    /// Float accessor with its own tightly packed view.
    fn floats<const N: usize>(&mut self, data: &[[f32; N]]) -> usize {
        let bytes: Vec<u8> = data.iter().flatten().flat_map(|f| f.to_le_bytes()).collect();
        let view = self.view(&bytes, None);
        let kind = match N {
            1 => "SCALAR",
            2 => "VEC2",
            3 => "VEC3",
            _ => "VEC4",
        };
        self.accessor(
            view,
            json!({"componentType": 5126, "count": data.len(), "type": kind}),
        )
    }

    fn indices_u8(&mut self, data: &[u8]) -> usize {
        let view = self.view(data, None);
        self.accessor(view, json!({"componentType": 5121, "count": data.len(), "type": "SCALAR"}))
    }

    fn indices_u16(&mut self, data: &[u16]) -> usize {
        let bytes: Vec<u8> = data.iter().flat_map(|i| i.to_le_bytes()).collect();
        let view = self.view(&bytes, None);
        self.accessor(view, json!({"componentType": 5123, "count": data.len(), "type": "SCALAR"}))
    }

    fn indices_u32(&mut self, data: &[u32]) -> usize {
        let bytes: Vec<u8> = data.iter().flat_map(|i| i.to_le_bytes()).collect();
        let view = self.view(&bytes, None);
        self.accessor(view, json!({"componentType": 5125, "count": data.len(), "type": "SCALAR"}))
    }

    fn with_tables(&self, mut document: Value, buffer: Value) -> Value {
        document["asset"] = json!({"version": "2.0", "generator": "fixture"});
        document["buffers"] = json!([buffer]);
        document["bufferViews"] = Value::Array(self.views.clone());
        document["accessors"] = Value::Array(self.accessors.clone());
        document
    }

    /// JSON glTF with the buffer embedded as a data URI.
    fn gltf(&self, document: Value) -> Vec<u8> {
        let buffer = json!({
            "byteLength": self.bin.len(),
            "uri": data_uri("application/octet-stream", &self.bin),
        });
        serde_json::to_vec(&self.with_tables(document, buffer)).unwrap()
    }

    /// JSON glTF whose buffer lives in an external file named `uri`.
    fn gltf_external(&self, document: Value, uri: &str) -> Vec<u8> {
        let buffer = json!({"byteLength": self.bin.len(), "uri": uri});
        serde_json::to_vec(&self.with_tables(document, buffer)).unwrap()
    }

    /// GLB with the buffer carried in the BIN chunk.
    fn glb(&self, document: Value) -> Vec<u8> {
        let buffer = json!({"byteLength": self.bin.len()});
        glb(&self.with_tables(document, buffer), Some(&self.bin))
    }
}

/// The triangle (0,0,0), (1,0,0), (0,1,0).
const TRIANGLE: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

/// Unit quad in the XY plane facing +Z.
const QUAD: [[f32; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
];
const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];
