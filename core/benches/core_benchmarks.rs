use std::borrow::Cow;

use base64::Engine as _;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;

use lumen_core::gltf::accessor::AccessorReader;
use lumen_core::gltf::vertex::generate_normals;
use lumen_core::gltf::{LoadOptions, NoExternalResources, container, load_gltf, resource};

/// Flat `n` x `n` grid in the XY plane with UVs and triangle indices.
struct Grid {
    positions: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
}

fn grid(n: u32) -> Grid {
    let mut positions = Vec::new();
    let mut uvs = Vec::new();
    for y in 0..=n {
        for x in 0..=n {
            let (u, v) = (x as f32 / n as f32, y as f32 / n as f32);
            // A little height so normals differ per vertex.
            positions.push([u, v, (u * 7.0).sin() * (v * 5.0).cos() * 0.1]);
            uvs.push([u, v]);
        }
    }
    let mut indices = Vec::new();
    let row = n + 1;
    for y in 0..n {
        for x in 0..n {
            let i = y * row + x;
            indices.extend_from_slice(&[i, i + 1, i + row + 1, i, i + row + 1, i + row]);
        }
    }
    Grid {
        positions,
        uvs,
        indices,
    }
}

/// Encode the grid as a JSON glTF with interleaved position/uv data.
fn grid_gltf(grid: &Grid) -> Vec<u8> {
    let mut bin = Vec::new();
    for (p, uv) in grid.positions.iter().zip(&grid.uvs) {
        for c in p.iter().chain(uv) {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    let vertex_len = bin.len();
    for i in &grid.indices {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    let count = grid.positions.len();

    let document = json!({
        "asset": {"version": "2.0"},
        "buffers": [{
            "byteLength": bin.len(),
            "uri": format!(
                "data:application/octet-stream;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(&bin)
            ),
        }],
        "bufferViews": [
            {"buffer": 0, "byteLength": vertex_len, "byteStride": 20},
            {"buffer": 0, "byteOffset": vertex_len, "byteLength": bin.len() - vertex_len},
        ],
        "accessors": [
            {"bufferView": 0, "componentType": 5126, "count": count, "type": "VEC3"},
            {"bufferView": 0, "byteOffset": 12, "componentType": 5126, "count": count, "type": "VEC2"},
            {"bufferView": 1, "componentType": 5125, "count": grid.indices.len(), "type": "SCALAR"},
        ],
        "meshes": [{"primitives": [{
            "attributes": {"POSITION": 0, "TEXCOORD_0": 1},
            "indices": 2,
        }]}],
        "nodes": [{"mesh": 0}],
        "scenes": [{"nodes": [0]}],
    });
    serde_json::to_vec(&document).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Accessor decoding
// ---------------------------------------------------------------------------

fn bench_deinterleave(c: &mut Criterion) {
    let data = grid_gltf(&grid(128));
    let parsed = container::parse_container(&data).unwrap();
    let buffers: Vec<Cow<[u8]>> =
        resource::resolve_buffers(&parsed.document, parsed.bin, &NoExternalResources).unwrap();
    let reader = AccessorReader::new(&parsed.document, &buffers);

    c.bench_function("deinterleave_positions_129x129", |b| {
        b.iter(|| black_box(reader.extract(black_box(0)).unwrap()));
    });
}

// ---------------------------------------------------------------------------
// Geometry synthesis
// ---------------------------------------------------------------------------

fn bench_generate_normals(c: &mut Criterion) {
    let grid = grid(128);
    c.bench_function("generate_normals_128x128", |b| {
        b.iter(|| generate_normals(black_box(&grid.positions), black_box(&grid.indices)));
    });
}

fn bench_load_without_tangents(c: &mut Criterion) {
    let data = grid_gltf(&grid(64));
    let options = LoadOptions::default().with_generate_tangents(false);
    c.bench_function("load_grid_64x64", |b| {
        b.iter(|| load_gltf(black_box(&data), &options).unwrap());
    });
}

fn bench_load_with_tangents(c: &mut Criterion) {
    let data = grid_gltf(&grid(64));
    let options = LoadOptions::default();
    c.bench_function("load_grid_64x64_tangents", |b| {
        b.iter(|| load_gltf(black_box(&data), &options).unwrap());
    });
}

criterion_group!(
    benches,
    bench_deinterleave,
    bench_generate_normals,
    bench_load_without_tangents,
    bench_load_with_tangents,
);

criterion_main!(benches);
