//! Vertex attribute assembly, layout sharing, and data interleaving for glTF
//! primitives.

use std::sync::Arc;

use crate::math::{EPSILON, Vec3};
use crate::mesh::{
    AssembledPrimitive, PrimitiveTopology, VertexAttributeFormat, VertexAttributeSemantic,
    VertexLayout,
};

use super::LoadOptions;
use super::accessor::AccessorReader;
use super::document::{self, AccessorType, ComponentType, Mode, Primitive, Semantic};
use super::error::GltfError;
use super::tangent;

/// Map glTF primitive mode to our PrimitiveTopology.
pub(crate) fn map_topology(mode: Mode) -> PrimitiveTopology {
    match mode {
        Mode::Points => PrimitiveTopology::PointList,
        Mode::Lines => PrimitiveTopology::LineList,
        Mode::LineLoop => PrimitiveTopology::LineLoop,
        Mode::LineStrip => PrimitiveTopology::LineStrip,
        Mode::Triangles => PrimitiveTopology::TriangleList,
        Mode::TriangleStrip => PrimitiveTopology::TriangleStrip,
        Mode::TriangleFan => PrimitiveTopology::TriangleFan,
    }
}

/// Find or create a shared layout.
///
/// Searches `existing_layouts` for a structural match. If found, returns the
/// existing Arc. Otherwise, creates a new Arc and appends it to `new_layouts`.
pub(crate) fn find_or_create_layout(
    layout: VertexLayout,
    existing_layouts: &[Arc<VertexLayout>],
    new_layouts: &mut Vec<Arc<VertexLayout>>,
) -> Arc<VertexLayout> {
    if let Some(existing) = existing_layouts
        .iter()
        .chain(new_layouts.iter())
        .find(|l| l.structurally_equal(&layout))
    {
        return Arc::clone(existing);
    }
    let arc = Arc::new(layout);
    new_layouts.push(Arc::clone(&arc));
    arc
}

/// Face-averaged vertex normals.
///
/// Each triangle adds its unit face normal to its three vertices; the sums
/// are normalized at the end. Vertices that end up with a zero-length sum
/// (unreferenced, or only in degenerate triangles) get the zero vector.
pub fn generate_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut sums = vec![Vec3::zeros(); positions.len()];
    for tri in indices.chunks_exact(3) {
        let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (Some(p0), Some(p1), Some(p2)) =
            (positions.get(i0), positions.get(i1), positions.get(i2))
        else {
            continue;
        };
        let v0 = Vec3::from(*p0);
        let face = (Vec3::from(*p1) - v0).cross(&(Vec3::from(*p2) - v0));
        if let Some(n) = face.try_normalize(EPSILON) {
            sums[i0] += n;
            sums[i1] += n;
            sums[i2] += n;
        }
    }
    sums.into_iter()
        .map(|s| s.try_normalize(EPSILON).unwrap_or_else(Vec3::zeros).into())
        .collect()
}

fn check_count(
    attribute: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), GltfError> {
    if expected == actual {
        Ok(())
    } else {
        Err(GltfError::AttributeCountMismatch {
            attribute,
            expected,
            actual,
        })
    }
}

/// Index data as read from the source, before width selection.
enum SourceIndices {
    /// From an accessor with the given component type.
    Accessor(Vec<u32>, ComponentType),
    /// Synthesized `0..vertex_count`.
    Sequential(Vec<u32>),
}

impl SourceIndices {
    fn values(&self) -> &[u32] {
        match self {
            Self::Accessor(v, _) | Self::Sequential(v) => v,
        }
    }
}

fn read_indices(
    reader: &AccessorReader<'_>,
    primitive: &Primitive,
    vertex_count: usize,
) -> Result<SourceIndices, GltfError> {
    let Some(accessor) = primitive.indices.map(|i| i.value()) else {
        return Ok(SourceIndices::Sequential((0..vertex_count as u32).collect()));
    };
    let values = reader.index_sequence(accessor)?;
    if let Some(&index) = values.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(GltfError::IndexOutOfRange {
            accessor,
            index,
            vertex_count,
        });
    }
    let (component_type, _) = reader.format(accessor)?;
    Ok(SourceIndices::Accessor(values, component_type))
}

fn read_colors(
    reader: &AccessorReader<'_>,
    accessor: usize,
) -> Result<Vec<[f32; 4]>, GltfError> {
    match reader.format(accessor)?.1 {
        AccessorType::Vec4 => reader.read_elements::<4>(accessor),
        AccessorType::Vec3 => Ok(reader
            .read_elements::<3>(accessor)?
            .into_iter()
            .map(|[r, g, b]| [r, g, b, 1.0])
            .collect()),
        other => Err(GltfError::UnsupportedEncoding {
            accessor,
            detail: format!("COLOR_0 must be VEC3 or VEC4, found {other:?}"),
        }),
    }
}

/// Assemble one primitive into an interleaved vertex buffer plus indices.
///
/// Attribute order is position, normal, tangent, texcoord0, color0. Missing
/// normals and tangents are synthesized for triangle lists when the options
/// allow it. With `convert_to_left_handed`, positions and normals have Z
/// negated; source tangents have X negated while generated tangents are
/// already produced in the converted space.
pub(crate) fn assemble_primitive(
    reader: &AccessorReader<'_>,
    primitive: &Primitive,
    options: &LoadOptions,
    existing_layouts: &[Arc<VertexLayout>],
    new_layouts: &mut Vec<Arc<VertexLayout>>,
) -> Result<AssembledPrimitive, GltfError> {
    let mode = document::primitive_mode(primitive).ok_or_else(|| {
        GltfError::InvalidDocument("primitive mode is not a glTF 2.0 value".to_string())
    })?;
    let position_accessor = document::attribute(primitive, Semantic::Positions)
        .ok_or(GltfError::MissingPositions)?;
    let positions = reader.read_elements::<3>(position_accessor)?;
    let vertex_count = positions.len();

    let indices = read_indices(reader, primitive, vertex_count)?;
    let triangles = mode == Mode::Triangles;
    if triangles && indices.values().len() % 3 != 0 {
        log::warn!(
            "glTF: {} trailing indices do not form a triangle",
            indices.values().len() % 3
        );
    }

    let read_optional = |semantic: Semantic| document::attribute(primitive, semantic);

    let normals = match read_optional(Semantic::Normals) {
        Some(accessor) => {
            let normals = reader.read_elements::<3>(accessor)?;
            check_count("NORMAL", vertex_count, normals.len())?;
            Some(normals)
        }
        None if triangles && options.generate_normals => {
            log::info!("glTF: generating normals for {vertex_count} vertices");
            Some(generate_normals(&positions, indices.values()))
        }
        None => None,
    };

    let tex_coords = match read_optional(Semantic::TexCoords(0)) {
        Some(accessor) => {
            let uvs = reader.read_elements::<2>(accessor)?;
            check_count("TEXCOORD_0", vertex_count, uvs.len())?;
            Some(uvs)
        }
        None => None,
    };

    let colors = match read_optional(Semantic::Colors(0)) {
        Some(accessor) => {
            let colors = read_colors(reader, accessor)?;
            check_count("COLOR_0", vertex_count, colors.len())?;
            Some(colors)
        }
        None => None,
    };

    let flip = options.convert_to_left_handed;
    let has_faces = vertex_count > 0 && indices.values().len() >= 3;
    let tangents = match (read_optional(Semantic::Tangents), &normals, &tex_coords) {
        (Some(accessor), _, _) => {
            let mut tangents = reader.read_elements::<4>(accessor)?;
            check_count("TANGENT", vertex_count, tangents.len())?;
            if flip {
                for t in &mut tangents {
                    t[0] = -t[0];
                }
            }
            Some(tangents)
        }
        // MikkTSpace reports failure on meshes without a whole triangle.
        (None, Some(normals), Some(uvs))
            if triangles && options.generate_tangents && has_faces =>
        {
            log::info!("glTF: generating tangents for {vertex_count} vertices");
            Some(tangent::generate_tangents(
                &positions,
                normals,
                uvs,
                indices.values(),
                flip,
            )?)
        }
        (None, Some(_), Some(_)) if triangles && options.generate_tangents => {
            log::warn!("glTF: no whole triangle in {vertex_count} vertices, skipping tangents");
            None
        }
        _ => None,
    };

    let mut layout = VertexLayout::new();
    layout.push(VertexAttributeSemantic::Position, VertexAttributeFormat::Float3);
    if normals.is_some() {
        layout.push(VertexAttributeSemantic::Normal, VertexAttributeFormat::Float3);
    }
    if tangents.is_some() {
        layout.push(VertexAttributeSemantic::Tangent, VertexAttributeFormat::Float4);
    }
    if tex_coords.is_some() {
        layout.push(VertexAttributeSemantic::TexCoord0, VertexAttributeFormat::Float2);
    }
    if colors.is_some() {
        layout.push(VertexAttributeSemantic::Color0, VertexAttributeFormat::Float4);
    }

    let z_sign = if flip { -1.0 } else { 1.0 };
    let mut floats = Vec::with_capacity(vertex_count * layout.stride as usize / 4);
    for i in 0..vertex_count {
        let [x, y, z] = positions[i];
        floats.extend_from_slice(&[x, y, z * z_sign]);
        if let Some(normals) = &normals {
            let [x, y, z] = normals[i];
            floats.extend_from_slice(&[x, y, z * z_sign]);
        }
        if let Some(tangents) = &tangents {
            floats.extend_from_slice(&tangents[i]);
        }
        if let Some(uvs) = &tex_coords {
            floats.extend_from_slice(&uvs[i]);
        }
        if let Some(colors) = &colors {
            floats.extend_from_slice(&colors[i]);
        }
    }

    let layout = find_or_create_layout(layout, existing_layouts, new_layouts);
    let vertex_data = bytemuck::cast_slice::<f32, u8>(&floats).to_vec();
    let base = AssembledPrimitive::new(layout, vertex_data)
        .with_topology(map_topology(mode));

    // 8-bit sources widen to 16-bit; synthesized sequences are 32-bit.
    let assembled = match indices {
        SourceIndices::Accessor(values, ComponentType::U8 | ComponentType::U16) => {
            let narrow: Vec<u16> = values.iter().map(|&i| i as u16).collect();
            base.with_indices_u16(&narrow)
        }
        SourceIndices::Accessor(values, _) | SourceIndices::Sequential(values) => {
            base.with_indices_u32(&values)
        }
    };

    log::debug!(
        "glTF: assembled {} vertices, {} indices, stride {}",
        vertex_count,
        assembled.index_count(),
        assembled.layout().stride
    );
    Ok(assembled)
}
