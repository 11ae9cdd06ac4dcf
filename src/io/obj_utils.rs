// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use wavefront_obj::{obj, ParseError};
use std::fmt;

use crate::core::mesh::{ generate_mesh_name, vertex_normals, InvalidMeshError, Mesh };
use crate::math::constants::{ Float, Vector2f, Vector3f };

#[derive(Debug)]
pub enum ObjLoadError {
    Io(std::io::Error),
    Parse(ParseError),
    InvalidMesh(InvalidMeshError),
}

impl From<std::io::Error> for ObjLoadError {
    fn from(err: std::io::Error) -> Self {
        ObjLoadError::Io(err)
    }
}

impl From<ParseError> for ObjLoadError {
    fn from(err: ParseError) -> Self {
        ObjLoadError::Parse(err)
    }
}

impl From<InvalidMeshError> for ObjLoadError {
    fn from(err: InvalidMeshError) -> Self {
        ObjLoadError::InvalidMesh(err)
    }
}

impl fmt::Display for ObjLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjLoadError::Io(err) => write!(f, "io error: {}", err),
            ObjLoadError::Parse(err) => write!(f, "parse error: {}", err),
            ObjLoadError::InvalidMesh(err) => write!(f, "invalid mesh: {}", err),
        }
    }
}

impl std::error::Error for ObjLoadError {}

pub fn load_obj_from_str<S: AsRef<str>>(input: S) -> Result<obj::ObjSet, ParseError> {
    let triangulated = triangulate_faces(input.as_ref());
    obj::parse(triangulated)
}

pub fn load_obj_from_file<P: AsRef<Path>>(path: P) -> Result<obj::ObjSet, ObjLoadError> {
    let data = fs::read_to_string(path)?;
    let obj_set = load_obj_from_str(data)?;
    Ok(obj_set)
}

/// Parses OBJ text into a single mesh. All objects are concatenated.
pub fn mesh_from_obj_str<S: AsRef<str>>(input: S, name: Option<String>) -> Result<Mesh, ObjLoadError> {
    let obj_set = load_obj_from_str(input)?;
    let name = name
        .or_else(|| obj_set.objects.first().map(|o| o.name.clone()).filter(|n| !n.is_empty()))
        .unwrap_or_else(|| generate_mesh_name("Obj"));
    mesh_from_obj_set(&obj_set, name)
}

pub fn load_mesh_from_obj<P: AsRef<Path>>(path: P) -> Result<Mesh, ObjLoadError> {
    let path = path.as_ref();
    log::info!("Starting reading OBJ mesh from: {}.", path.display());
    let data = fs::read_to_string(path)?;
    let name = path.file_stem().map(|s| s.to_string_lossy().to_string());
    let mesh = mesh_from_obj_str(data, name)?;
    log::info!("OBJ loaded, vertices = {}, triangles = {}.", mesh.vertex_count(), mesh.triangle_count());
    Ok(mesh)
}

/// Welds OBJ corners into single-indexed vertices: each distinct
/// `(position, uv, normal)` index triple becomes one vertex. Missing UVs
/// become `(0, 0)`; vertices without a normal get a generated smooth normal.
pub fn mesh_from_obj_set(obj_set: &obj::ObjSet, name: String) -> Result<Mesh, ObjLoadError> {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut missing_normal = Vec::new();
    let mut indices = Vec::new();

    for object in &obj_set.objects {
        let mut corner_map: HashMap<(usize, Option<usize>, Option<usize>), u32> = HashMap::new();

        for geom in &object.geometry {
            for shape in &geom.shapes {
                if let obj::Primitive::Triangle(a, b, c) = shape.primitive {
                    for corner in [a, b, c] {
                        if let Some(idx) = corner_map.get(&corner) {
                            indices.push(*idx);
                            continue;
                        }

                        let (v_idx, uv_idx, n_idx) = corner;
                        let v = object.vertices.get(v_idx).ok_or(InvalidMeshError::IndexOutOfRange {
                            triangle: indices.len() / 3,
                            index: v_idx as u32,
                            vertex_count: object.vertices.len(),
                        })?;
                        let uv = uv_idx
                            .and_then(|i| object.tex_vertices.get(i))
                            .map(|t| Vector2f::new(t.u as Float, t.v as Float))
                            .unwrap_or_else(|| Vector2f::new(0.0, 0.0));
                        // A zero-length normal counts as missing and gets regenerated.
                        let n = n_idx
                            .and_then(|i| object.normals.get(i))
                            .map(|n| Vector3f::new(n.x as Float, n.y as Float, n.z as Float))
                            .filter(|n| n.norm() > 0.0 && n.norm().is_finite());

                        let idx = positions.len() as u32;
                        positions.push(Vector3f::new(v.x as Float, v.y as Float, v.z as Float));
                        uvs.push(uv);
                        missing_normal.push(n.is_none());
                        normals.push(n.map(|n| n.normalize()).unwrap_or_else(Vector3f::zeros));
                        corner_map.insert(corner, idx);
                        indices.push(idx);
                    }
                }
            }
        }
    }

    if missing_normal.iter().any(|m| *m) {
        let generated = vertex_normals(&positions, &indices);
        for (i, missing) in missing_normal.iter().enumerate() {
            if *missing {
                normals[i] = generated[i];
            }
        }
    }

    let mesh = Mesh::new(Some(name), positions, normals, uvs, indices);
    mesh.validate()?;
    Ok(mesh)
}

fn triangulate_faces(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 4);
    for line in input.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("f ") || trimmed.starts_with("f\t") {
            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            if parts.len() > 4 {
                let base = parts[1];
                for i in 2..(parts.len() - 1) {
                    out.push_str("f ");
                    out.push_str(base);
                    out.push(' ');
                    out.push_str(parts[i]);
                    out.push(' ');
                    out.push_str(parts[i + 1]);
                    out.push('\n');
                }
                continue;
            }
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD_OBJ: &str = "\
o quad
v -1.0 -1.0 0.0
v 1.0 -1.0 0.0
v 1.0 1.0 0.0
v -1.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_load_obj_from_str_basic() {
        let input = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
";
        let obj_set = load_obj_from_str(input).expect("failed to parse obj");
        assert_eq!(obj_set.objects.len(), 1);
        let object = &obj_set.objects[0];
        assert_eq!(object.vertices.len(), 3);
        assert_eq!(object.geometry.len(), 1);
    }

    #[test]
    fn test_triangulate_quad_face() {
        assert_eq!(triangulate_faces("f 1 2 3 4"), "f 1 2 3\nf 1 3 4\n");
        assert_eq!(triangulate_faces("v 1 2 3"), "v 1 2 3\n");
    }

    #[test]
    fn test_quad_mesh_from_obj() {
        let mesh = mesh_from_obj_str(QUAD_OBJ, None).expect("failed to build mesh");
        assert_eq!(mesh.name, "quad");
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.uvs[2], Vector2f::new(1.0, 1.0));
        assert_eq!(mesh.normals[3], Vector3f::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_missing_normals_are_generated() {
        let input = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
";
        let mesh = mesh_from_obj_str(input, Some(String::from("tri"))).unwrap();
        assert_eq!(mesh.name, "tri");
        for n in &mesh.normals {
            assert!((n - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-6);
        }
        assert_eq!(mesh.uvs, vec![Vector2f::new(0.0, 0.0); 3]);
    }

    #[test]
    fn test_zero_normal_is_regenerated() {
        let input = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 0.0
f 1//1 2//1 3//1
";
        let mesh = mesh_from_obj_str(input, None).unwrap();
        for n in &mesh.normals {
            assert!(n.iter().all(|c| c.is_finite()));
            assert!((n - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-6);
        }
    }
}
