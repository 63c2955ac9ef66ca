//! End-to-end loads through the public entry points.

use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::gltf::{
    ErrorKind, GltfError, LoadOptions, NoExternalResources, load_gltf, load_gltf_file,
    load_gltf_with_layouts,
};
use crate::mesh::{IndexFormat, PrimitiveTopology, VertexAttributeSemantic as Semantic};
use crate::texture::ChannelEncoding;

fn single_mesh(primitive: serde_json::Value) -> serde_json::Value {
    json!({
        "meshes": [{"primitives": [primitive]}],
        "nodes": [{"mesh": 0}],
        "scenes": [{"nodes": [0]}],
    })
}

#[test]
fn test_single_triangle() {
    let mut f = Fixture::new();
    let positions = f.floats(&TRIANGLE);
    let indices = f.indices_u16(&[0, 1, 2]);
    let data = f.gltf(json!({
        "meshes": [{"primitives": [{"attributes": {"POSITION": positions}, "indices": indices}]}],
    }));

    let asset = load_gltf(&data, &raw_options()).unwrap();
    assert_eq!(asset.version, "2.0");
    assert_eq!(asset.generator.as_deref(), Some("fixture"));
    assert_eq!(asset.primitives.len(), 1);
    assert_eq!(asset.meshes, vec![vec![0]]);

    let prim = &asset.primitives[0];
    assert_eq!(prim.vertex_count(), 3);
    assert!(prim.material().is_none());
    assert_eq!(prim.material_index(), None);
    assert_eq!(prim.indices(), vec![0, 1, 2]);
    assert_eq!(prim.index_format(), IndexFormat::Uint16);
    assert_eq!(prim.topology(), PrimitiveTopology::TriangleList);
    assert!(asset.scenes.is_empty());
    assert_eq!(asset.default_scene, None);
}

#[test]
fn test_generated_normal_follows_conversion() {
    let mut f = Fixture::new();
    let positions = f.floats(&TRIANGLE);
    let data = f.gltf(json!({
        "meshes": [{"primitives": [{"attributes": {"POSITION": positions}}]}],
    }));

    let raw = load_gltf(&data, &raw_options()).unwrap();
    let converted = load_gltf(&data, &LoadOptions::default()).unwrap();
    for v in 0..3 {
        let n = raw.primitives[0].attribute_values(Semantic::Normal, v).unwrap();
        assert_close(&n, &[0.0, 0.0, 1.0]);
        let n = converted.primitives[0].attribute_values(Semantic::Normal, v).unwrap();
        assert_close(&n, &[0.0, 0.0, -1.0]);
    }
    // No texture coordinates, so no tangents.
    assert!(!raw.primitives[0].layout().has(Semantic::Tangent));
}

#[test]
fn test_glb_matches_json() {
    let mut f = Fixture::new();
    let positions = f.floats(&QUAD);
    let uvs = f.floats(&QUAD_UVS);
    let indices = f.indices_u16(&QUAD_INDICES);
    let doc = single_mesh(json!({
        "attributes": {"POSITION": positions, "TEXCOORD_0": uvs},
        "indices": indices,
    }));

    let from_json = load_gltf(&f.gltf(doc.clone()), &LoadOptions::default()).unwrap();
    let from_glb = load_gltf(&f.glb(doc), &LoadOptions::default()).unwrap();
    let (a, b) = (&from_json.primitives[0], &from_glb.primitives[0]);
    assert_eq!(a.vertex_data(), b.vertex_data());
    assert_eq!(a.index_data(), b.index_data());
    assert_eq!(from_json.scenes, from_glb.scenes);
}

#[test]
fn test_interleaved_view_is_deinterleaved() {
    let mut f = Fixture::new();
    let vertices: [[f32; 5]; 3] = [
        [0.0, 0.0, 0.0, 0.1, 0.2],
        [1.0, 0.0, 0.0, 0.3, 0.4],
        [0.0, 1.0, 0.0, 0.5, 0.6],
    ];
    let bytes: Vec<u8> = vertices.iter().flatten().flat_map(|v| v.to_le_bytes()).collect();
    let view = f.view(&bytes, Some(20));
    let positions = f.accessor(view, json!({"componentType": 5126, "count": 3, "type": "VEC3"}));
    let uvs = f.accessor(
        view,
        json!({"byteOffset": 12, "componentType": 5126, "count": 3, "type": "VEC2"}),
    );
    let data = f.gltf(json!({
        "meshes": [{"primitives": [{"attributes": {"POSITION": positions, "TEXCOORD_0": uvs}}]}],
    }));

    let asset = load_gltf(&data, &raw_options()).unwrap();
    let prim = &asset.primitives[0];
    for (v, expected) in vertices.iter().enumerate() {
        let p = prim.attribute_values(Semantic::Position, v).unwrap();
        assert_close(&p, &expected[..3]);
        let uv = prim.attribute_values(Semantic::TexCoord0, v).unwrap();
        assert_close(&uv, &expected[3..]);
    }
}

#[test]
fn test_index_widths_normalize() {
    let sequence = [0u32, 1, 2, 2, 3, 0];
    let mut f = Fixture::new();
    let positions = f.floats(&QUAD);
    let wide = f.indices_u32(&sequence);
    let narrow = f.indices_u16(&[0, 1, 2, 2, 3, 0]);
    let byte = f.indices_u8(&[0, 1, 2, 2, 3, 0]);
    let data = f.gltf(json!({
        "meshes": [{"primitives": [
            {"attributes": {"POSITION": positions}, "indices": wide},
            {"attributes": {"POSITION": positions}, "indices": narrow},
            {"attributes": {"POSITION": positions}, "indices": byte},
            {"attributes": {"POSITION": positions}},
        ]}],
    }));

    let asset = load_gltf(&data, &raw_options()).unwrap();
    let formats: Vec<_> = asset.primitives.iter().map(|p| p.index_format()).collect();
    assert_eq!(
        formats,
        vec![
            IndexFormat::Uint32,
            IndexFormat::Uint16,
            IndexFormat::Uint16,
            IndexFormat::Uint32
        ]
    );
    for prim in &asset.primitives[..3] {
        assert_eq!(prim.indices(), sequence.to_vec());
    }
    assert_eq!(asset.primitives[3].indices(), vec![0, 1, 2, 3]);
}

#[test]
fn test_identical_layouts_are_shared() {
    let mut f = Fixture::new();
    let positions = f.floats(&TRIANGLE);
    let other = f.floats(&TRIANGLE);
    let data = f.gltf(json!({
        "meshes": [
            {"name": "a", "primitives": [{"attributes": {"POSITION": positions}}]},
            {"name": "b", "primitives": [
                {"attributes": {"POSITION": other}},
                {"attributes": {"POSITION": other}, "mode": 1},
            ]},
        ],
    }));

    let asset = load_gltf(&data, &raw_options()).unwrap();
    assert_eq!(asset.meshes, vec![vec![0], vec![1, 2]]);
    let (a, b, lines) = (&asset.primitives[0], &asset.primitives[1], &asset.primitives[2]);
    assert!(Arc::ptr_eq(a.layout(), b.layout()));
    // Lines get no synthesized normals, so they need a second layout.
    assert!(!lines.layout().has(Semantic::Normal));
    assert_eq!(lines.topology(), PrimitiveTopology::LineList);
    assert_eq!(asset.new_layouts.len(), 2);
    assert_eq!(a.label(), Some("a"));
    assert_eq!(b.label(), Some("b_prim0"));
    assert_eq!(asset.mesh_primitives(1).count(), 2);
}

#[test]
fn test_layouts_from_an_earlier_load_are_reused() {
    let mut f = Fixture::new();
    let positions = f.floats(&TRIANGLE);
    let data = f.gltf(single_mesh(json!({"attributes": {"POSITION": positions}})));

    let first = load_gltf(&data, &raw_options()).unwrap();
    assert_eq!(first.new_layouts.len(), 1);
    let second =
        load_gltf_with_layouts(&data, &NoExternalResources, &first.new_layouts, &raw_options())
            .unwrap();
    assert!(Arc::ptr_eq(second.primitives[0].layout(), &first.new_layouts[0]));
    assert!(second.new_layouts.is_empty());
}

#[test]
fn test_empty_primitive_loads_without_tangents() {
    let mut f = Fixture::new();
    let positions = f.floats::<3>(&[]);
    let normals = f.floats::<3>(&[]);
    let uvs = f.floats::<2>(&[]);
    let data = f.gltf(single_mesh(json!({
        "attributes": {"POSITION": positions, "NORMAL": normals, "TEXCOORD_0": uvs},
    })));

    let asset = load_gltf(&data, &raw_options()).unwrap();
    let prim = &asset.primitives[0];
    assert_eq!(prim.vertex_count(), 0);
    assert!(prim.layout().has(Semantic::Normal));
    assert!(!prim.layout().has(Semantic::Tangent));
}

#[test]
fn test_huge_accessor_count_is_overrun() {
    let mut f = Fixture::new();
    let positions = f.floats(&TRIANGLE);
    f.accessors[positions]["count"] = json!(2305843009213693952u64);
    let data = f.gltf(single_mesh(json!({"attributes": {"POSITION": positions}})));
    let err = load_gltf(&data, &raw_options()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BufferOverrun);
    assert!(matches!(err, GltfError::Primitive { mesh: 0, primitive: 0, .. }));
}

#[test]
fn test_tangent_sign_depends_on_source() {
    let mut f = Fixture::new();
    let positions = f.floats(&QUAD);
    let normals = f.floats(&[[0.0f32, 0.0, 1.0]; 4]);
    let uvs = f.floats(&QUAD_UVS);
    let tangents = f.floats(&[[1.0f32, 0.0, 0.0, 1.0]; 4]);
    let indices = f.indices_u16(&QUAD_INDICES);
    let data = f.gltf(json!({
        "meshes": [{"primitives": [
            {
                "attributes": {"POSITION": positions, "NORMAL": normals, "TEXCOORD_0": uvs, "TANGENT": tangents},
                "indices": indices,
            },
            {
                "attributes": {"POSITION": positions, "NORMAL": normals, "TEXCOORD_0": uvs},
                "indices": indices,
            },
        ]}],
    }));

    let asset = load_gltf(&data, &LoadOptions::default().with_auto_scale(false)).unwrap();
    let (sourced, generated) = (&asset.primitives[0], &asset.primitives[1]);
    for v in 0..4 {
        let t = sourced.attribute_values(Semantic::Tangent, v).unwrap();
        assert_close(&t, &[-1.0, 0.0, 0.0, 1.0]);
        let t = generated.attribute_values(Semantic::Tangent, v).unwrap();
        assert!((t[0] - 1.0).abs() < 1e-4, "generated tangent {t:?}");
        let n = generated.attribute_values(Semantic::Normal, v).unwrap();
        assert_close(&n, &[0.0, 0.0, -1.0]);
    }
}

#[test]
fn test_color_expands_to_rgba() {
    let mut f = Fixture::new();
    let positions = f.floats(&TRIANGLE);
    let colors = f.floats(&[[0.5f32, 0.25, 1.0]; 3]);
    let data = f.gltf(json!({
        "meshes": [{"primitives": [{"attributes": {"POSITION": positions, "COLOR_0": colors}}]}],
    }));

    let asset = load_gltf(&data, &raw_options().with_generate_normals(false)).unwrap();
    let prim = &asset.primitives[0];
    assert_eq!(prim.layout().stride, 28);
    let c = prim.attribute_values(Semantic::Color0, 2).unwrap();
    assert_close(&c, &[0.5, 0.25, 1.0, 1.0]);
}

#[test]
#[cfg(feature = "emissive-strength")]
fn test_emissive_strength_reaches_primitive() {
    let mut f = Fixture::new();
    let positions = f.floats(&TRIANGLE);
    let data = f.gltf(json!({
        "extensionsUsed": ["KHR_materials_emissive_strength"],
        "materials": [{
            "name": "glow",
            "emissiveFactor": [1.0, 0.0, 0.0],
            "extensions": {"KHR_materials_emissive_strength": {"emissiveStrength": 3.0}},
        }],
        "meshes": [{"primitives": [{"attributes": {"POSITION": positions}, "material": 0}]}],
    }));

    let asset = load_gltf(&data, &raw_options()).unwrap();
    let material = asset.primitives[0].material().unwrap();
    assert_eq!(material.emissive_factor, [3.0, 0.0, 0.0]);
    assert_eq!(material.name.as_deref(), Some("glow"));
    assert_eq!(asset.primitives[0].material_index(), Some(0));
    assert!(Arc::ptr_eq(material, &asset.materials[0]));
}

#[test]
fn test_glb_embedded_texture() {
    let mut f = Fixture::new();
    let positions = f.floats(&TRIANGLE);
    let png = f.view(&png_bytes(4, 2, [200, 100, 50, 255]), None);
    let doc = json!({
        "images": [{"bufferView": png, "mimeType": "image/png"}],
        "samplers": [{"minFilter": 9987, "wrapS": 33648}],
        "textures": [{"source": 0, "sampler": 0, "name": "albedo"}],
        "materials": [{"pbrMetallicRoughness": {"baseColorTexture": {"index": 0}}}],
        "meshes": [{"primitives": [{"attributes": {"POSITION": positions}, "material": 0}]}],
    });

    let asset = load_gltf(&f.glb(doc), &raw_options()).unwrap();
    assert_eq!(asset.textures.len(), 1);
    let binding = asset.primitives[0]
        .material()
        .and_then(|m| m.base_color_texture.as_ref())
        .unwrap();
    let pixels = &binding.pixels;
    assert!(Arc::ptr_eq(pixels, &asset.textures[0]));
    assert_eq!((pixels.width, pixels.height, pixels.channels), (4, 2, 4));
    assert_eq!(pixels.encoding, ChannelEncoding::Uint8);
    assert_eq!(pixels.name.as_deref(), Some("albedo"));
    assert!(pixels.is_consistent());
    assert_eq!(&pixels.data[..4], &[200, 100, 50, 255]);
    assert_eq!(binding.sampler.wrap_s, crate::sampler::AddressMode::MirrorRepeat);
}

#[test]
fn test_auto_scale_uses_data_extent() {
    let mut f = Fixture::new();
    let positions = f.floats(&[[-4.0f32, 0.0, 0.0], [1.0, 2.0, 0.0], [0.0, 1.0, 3.0]]);
    let data = f.gltf(single_mesh(json!({"attributes": {"POSITION": positions}})));

    let scaled = load_gltf(&data, &LoadOptions::default()).unwrap();
    let root = &scaled.scene().unwrap().nodes[0];
    assert!((root.world[(0, 0)] - 0.25).abs() < 1e-6);
    assert!((root.world[(2, 2)] - 0.25).abs() < 1e-6);

    let unscaled = load_gltf(&data, &LoadOptions::default().with_auto_scale(false)).unwrap();
    let root = &unscaled.scene().unwrap().nodes[0];
    assert_eq!(root.world, crate::math::Mat4::identity());
}

#[test]
fn test_auto_scale_prefers_declared_bounds() {
    let mut f = Fixture::new();
    let positions = f.floats(&TRIANGLE);
    f.accessors[positions]["min"] = json!([-8.0, 0.0, 0.0]);
    f.accessors[positions]["max"] = json!([1.0, 1.0, 0.0]);
    let data = f.gltf(single_mesh(json!({"attributes": {"POSITION": positions}})));

    let asset = load_gltf(&data, &LoadOptions::default()).unwrap();
    let root = &asset.scene().unwrap().nodes[0];
    assert!((root.world[(1, 1)] - 0.125).abs() < 1e-6);
}

#[test]
fn test_scene_tree_and_default_scene() {
    let mut f = Fixture::new();
    let positions = f.floats(&TRIANGLE);
    let data = f.gltf(json!({
        "scene": 1,
        "scenes": [{"nodes": []}, {"name": "main", "nodes": [0]}],
        "nodes": [
            {"name": "root", "translation": [0.0, 0.0, 2.0], "children": [1]},
            {"mesh": 0},
        ],
        "meshes": [{"primitives": [{"attributes": {"POSITION": positions}}]}],
    }));

    let asset = load_gltf(&data, &LoadOptions::default().with_auto_scale(false)).unwrap();
    assert_eq!(asset.default_scene, Some(1));
    let scene = asset.scene().unwrap();
    assert_eq!(scene.name.as_deref(), Some("main"));
    let root = &scene.nodes[0];
    assert_eq!(root.name, "root");
    // Left-handed conversion mirrors the Z translation.
    assert!((root.world[(2, 3)] + 2.0).abs() < 1e-6);
    let child = &root.children[0];
    assert_eq!(child.name, "Node 1");
    assert_eq!(child.mesh, Some(0));
    assert_eq!(child.primitives, vec![0]);
    assert!((child.world[(2, 3)] + 2.0).abs() < 1e-6);
}

#[test]
fn test_external_buffer_from_file() {
    let mut f = Fixture::new();
    let positions = f.floats(&TRIANGLE);
    let dir = std::env::temp_dir().join(format!("lumen-gltf-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("triangle.bin"), &f.bin).unwrap();
    let path = dir.join("triangle.gltf");
    let doc = json!({"meshes": [{"primitives": [{"attributes": {"POSITION": positions}}]}]});
    std::fs::write(&path, f.gltf_external(doc.clone(), "triangle.bin")).unwrap();

    let from_file = load_gltf_file(&path, &raw_options());
    let embedded_only = load_gltf(&f.gltf_external(doc, "triangle.bin"), &raw_options());
    std::fs::remove_dir_all(&dir).unwrap();

    assert_eq!(from_file.unwrap().primitives[0].vertex_count(), 3);
    assert_eq!(embedded_only.unwrap_err().kind(), ErrorKind::ResourceUnavailable);
}

#[test]
fn test_error_kinds() {
    let _ = env_logger::builder().is_test(true).try_init();

    assert_eq!(
        load_gltf(b"glT", &raw_options()).unwrap_err().kind(),
        ErrorKind::MalformedContainer
    );

    let mut f = Fixture::new();
    let positions = f.floats(&TRIANGLE);
    let mut truncated = f.glb(json!({}));
    truncated.truncate(truncated.len() - 4);
    assert_eq!(
        load_gltf(&truncated, &raw_options()).unwrap_err().kind(),
        ErrorKind::MalformedContainer
    );

    let missing_positions = f.gltf(json!({"meshes": [{"primitives": [{"attributes": {}}]}]}));
    let err = load_gltf(&missing_positions, &raw_options()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedDocument);
    assert!(matches!(err, GltfError::Primitive { mesh: 0, primitive: 0, .. }));

    let dangling = f.gltf(json!({
        "meshes": [{"primitives": [{"attributes": {"POSITION": positions}, "material": 4}]}],
    }));
    assert_eq!(
        load_gltf(&dangling, &raw_options()).unwrap_err().kind(),
        ErrorKind::DanglingReference
    );

    let bad_index = f.indices_u16(&[0, 1, 7]);
    let out_of_range = f.gltf(json!({
        "meshes": [{"primitives": [{"attributes": {"POSITION": positions}, "indices": bad_index}]}],
    }));
    assert_eq!(
        load_gltf(&out_of_range, &raw_options()).unwrap_err().kind(),
        ErrorKind::DanglingReference
    );

    f.accessors[positions]["count"] = json!(4);
    let overrun = f.gltf(json!({"meshes": [{"primitives": [{"attributes": {"POSITION": positions}}]}]}));
    assert_eq!(
        load_gltf(&overrun, &raw_options()).unwrap_err().kind(),
        ErrorKind::BufferOverrun
    );
}
