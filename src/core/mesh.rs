// Copyright @yucwang 2026

use crate::core::tangent_space::DegenerateTriangle;
use crate::math::constants::{ Vector2f, Vector3f };

use std::fmt;
use std::sync::atomic::{ AtomicU64, Ordering };

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a unique default name for a mesh of the given kind.
pub fn generate_mesh_name(kind: &str) -> String {
    let seq = NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed);
    format!("{}_{}", kind, seq)
}

/// Structural violation of the mesh layout. Fatal for every operation that
/// walks the index buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidMeshError {
    IndexCount { count: usize },
    IndexOutOfRange { triangle: usize, index: u32, vertex_count: usize },
    AttributeLength { attribute: &'static str, expected: usize, found: usize },
}

impl fmt::Display for InvalidMeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidMeshError::IndexCount { count } =>
                write!(f, "index count {} is not a multiple of 3", count),
            InvalidMeshError::IndexOutOfRange { triangle, index, vertex_count } =>
                write!(f, "triangle {} references vertex {} but the mesh has {} vertices",
                       triangle, index, vertex_count),
            InvalidMeshError::AttributeLength { attribute, expected, found } =>
                write!(f, "{} stream has {} entries, expected {}", attribute, found, expected),
        }
    }
}

impl std::error::Error for InvalidMeshError {}

/// Indexed triangle mesh. Every attribute stream is indexed by vertex id;
/// `indices` holds CCW triangles. A present `tangents` stream marks the mesh
/// as already augmented, and `degenerate` lists the triangles that took the
/// fallback when those tangents were built.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<Vector3f>,
    pub normals: Vec<Vector3f>,
    pub uvs: Vec<Vector2f>,
    pub colors: Option<Vec<Vector3f>>,
    pub tangents: Option<Vec<Vector3f>>,
    pub degenerate: Vec<DegenerateTriangle>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(name: Option<String>,
               positions: Vec<Vector3f>,
               normals: Vec<Vector3f>,
               uvs: Vec<Vector2f>,
               indices: Vec<u32>) -> Self {
        Self {
            name: name.unwrap_or_else(|| generate_mesh_name("Mesh")),
            positions,
            normals,
            uvs,
            colors: None,
            tangents: None,
            degenerate: Vec::new(),
            indices,
        }
    }

    pub fn with_colors(mut self, colors: Vec<Vector3f>) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn with_tangents(mut self, tangents: Vec<Vector3f>) -> Self {
        self.tangents = Some(tangents);
        self
    }

    pub fn with_name(mut self, name: String) -> Self {
        self.name = name;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn has_tangents(&self) -> bool {
        self.tangents.is_some()
    }

    /// Drops the tangent stream so the next build recomputes it.
    pub fn strip_tangents(&mut self) {
        self.tangents = None;
        self.degenerate.clear();
    }

    pub fn triangle(&self, idx: usize) -> [usize; 3] {
        let base = idx * 3;
        [self.indices[base] as usize,
         self.indices[base + 1] as usize,
         self.indices[base + 2] as usize]
    }

    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
    }

    pub fn validate(&self) -> Result<(), InvalidMeshError> {
        let vertex_count = self.vertex_count();
        check_length("normal", vertex_count, self.normals.len())?;
        check_length("uv", vertex_count, self.uvs.len())?;
        if let Some(colors) = &self.colors {
            check_length("color", vertex_count, colors.len())?;
        }
        if let Some(tangents) = &self.tangents {
            check_length("tangent", vertex_count, tangents.len())?;
        }
        validate_indices(&self.indices, vertex_count)
    }

    /// Scales then translates positions. Normals follow the inverse-transpose
    /// of the scale and tangents the scale itself; both are renormalized.
    pub fn apply_transform(&mut self, scale: &Vector3f, translate: &Vector3f) {
        for p in &mut self.positions {
            *p = p.component_mul(scale) + translate;
        }

        let inv_scale = Vector3f::new(1.0 / scale.x, 1.0 / scale.y, 1.0 / scale.z);
        for n in &mut self.normals {
            *n = renormalize(n.component_mul(&inv_scale), *n);
        }
        if let Some(tangents) = &mut self.tangents {
            for t in tangents.iter_mut() {
                *t = renormalize(t.component_mul(scale), *t);
            }
        }

        // A mirroring scale flips the winding.
        if scale.x * scale.y * scale.z < 0.0 {
            for tri in self.indices.chunks_exact_mut(3) {
                tri.swap(1, 2);
            }
            for d in &mut self.degenerate {
                d.vertices.swap(1, 2);
            }
        }
    }
}

fn renormalize(v: Vector3f, fallback: Vector3f) -> Vector3f {
    let length = v.norm();
    if length > 0.0 && length.is_finite() {
        v / length
    } else {
        fallback
    }
}

fn check_length(attribute: &'static str, expected: usize, found: usize) -> Result<(), InvalidMeshError> {
    if expected != found {
        return Err(InvalidMeshError::AttributeLength { attribute, expected, found });
    }
    Ok(())
}

/// Checks that `indices` is a triangle list over `vertex_count` vertices.
pub fn validate_indices(indices: &[u32], vertex_count: usize) -> Result<(), InvalidMeshError> {
    if indices.len() % 3 != 0 {
        return Err(InvalidMeshError::IndexCount { count: indices.len() });
    }

    for (i, index) in indices.iter().enumerate() {
        if *index as usize >= vertex_count {
            return Err(InvalidMeshError::IndexOutOfRange {
                triangle: i / 3,
                index: *index,
                vertex_count,
            });
        }
    }
    Ok(())
}

/// Smooth per-vertex normals from area-weighted face normals. Vertices that
/// no triangle touches get `+Z`. Indices must already be validated.
pub fn vertex_normals(positions: &[Vector3f], indices: &[u32]) -> Vec<Vector3f> {
    let mut normals = vec![Vector3f::zeros(); positions.len()];
    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let p0 = positions[i0];
        // Unnormalized cross product carries twice the triangle area.
        let face_n = (positions[i1] - p0).cross(&(positions[i2] - p0));
        normals[i0] += face_n;
        normals[i1] += face_n;
        normals[i2] += face_n;
    }

    normals
        .into_iter()
        .map(|n| renormalize(n, Vector3f::new(0.0, 0.0, 1.0)))
        .collect()
}
