// Copyright @yucwang 2026

use std::fmt;
use std::fs::File;
use std::io::{ BufReader, BufWriter, Read, Write };
use std::path::Path;

use ply_rs_bw::parser::Parser;
use ply_rs_bw::ply::{ Addable, DefaultElement, ElementDef, Encoding, Ply, Property,
                      PropertyDef, PropertyType, ScalarType };
use ply_rs_bw::writer::Writer;

use crate::core::mesh::{ generate_mesh_name, vertex_normals, InvalidMeshError, Mesh };
use crate::math::constants::{ Float, Vector2f, Vector3f };

#[derive(Debug)]
pub enum PlyLoadError {
    Io(std::io::Error),
    Format(String),
    MissingProperty(&'static str),
    InvalidMesh(InvalidMeshError),
}

impl From<std::io::Error> for PlyLoadError {
    fn from(err: std::io::Error) -> Self {
        PlyLoadError::Io(err)
    }
}

impl From<InvalidMeshError> for PlyLoadError {
    fn from(err: InvalidMeshError) -> Self {
        PlyLoadError::InvalidMesh(err)
    }
}

impl fmt::Display for PlyLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlyLoadError::Io(err) => write!(f, "io error: {}", err),
            PlyLoadError::Format(msg) => write!(f, "format error: {}", msg),
            PlyLoadError::MissingProperty(name) => write!(f, "missing ply property: {}", name),
            PlyLoadError::InvalidMesh(err) => write!(f, "invalid mesh: {}", err),
        }
    }
}

impl std::error::Error for PlyLoadError {}

fn scalar(property: &Property) -> Option<Float> {
    match property {
        Property::Float(v) => Some(*v),
        Property::Double(v) => Some(*v as Float),
        Property::Int(v) => Some(*v as Float),
        Property::UInt(v) => Some(*v as Float),
        Property::Short(v) => Some(*v as Float),
        Property::UShort(v) => Some(*v as Float),
        Property::Char(v) => Some(*v as Float),
        Property::UChar(v) => Some(*v as Float),
        _ => None,
    }
}

// Color channels stored as bytes are rescaled to [0, 1].
fn color_channel(property: &Property) -> Option<Float> {
    match property {
        Property::UChar(v) => Some(*v as Float / 255.0),
        other => scalar(other),
    }
}

fn index_list(property: &Property) -> Option<Vec<u32>> {
    match property {
        Property::ListInt(v) => Some(v.iter().map(|i| *i as u32).collect()),
        Property::ListUInt(v) => Some(v.clone()),
        Property::ListShort(v) => Some(v.iter().map(|i| *i as u32).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|i| *i as u32).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|i| *i as u32).collect()),
        Property::ListChar(v) => Some(v.iter().map(|i| *i as u32).collect()),
        _ => None,
    }
}

fn first_of(element: &DefaultElement, names: &[&str], read: fn(&Property) -> Option<Float>) -> Option<Float> {
    names.iter().find_map(|n| element.get(*n).and_then(read))
}

fn vector3(element: &DefaultElement, names: [&str; 3], read: fn(&Property) -> Option<Float>) -> Option<Vector3f> {
    Some(Vector3f::new(first_of(element, &[names[0]], read)?,
                       first_of(element, &[names[1]], read)?,
                       first_of(element, &[names[2]], read)?))
}

pub fn mesh_from_ply_reader<R: Read>(reader: &mut R, name: String) -> Result<Mesh, PlyLoadError> {
    let parser = Parser::<DefaultElement>::new();
    let ply = parser.read_ply(reader)?;

    let vertices = ply.payload.get("vertex").ok_or(PlyLoadError::MissingProperty("vertex"))?;
    let faces = ply.payload.get("face").map(|f| f.as_slice()).unwrap_or(&[]);

    let mut positions = Vec::with_capacity(vertices.len());
    let mut normals = Vec::with_capacity(vertices.len());
    let mut uvs = Vec::with_capacity(vertices.len());
    let mut colors = Vec::with_capacity(vertices.len());
    let mut tangents = Vec::with_capacity(vertices.len());

    for v in vertices {
        positions.push(vector3(v, ["x", "y", "z"], scalar).ok_or(PlyLoadError::MissingProperty("x/y/z"))?);
        normals.push(vector3(v, ["nx", "ny", "nz"], scalar));
        let u = first_of(v, &["u", "s", "texture_u"], scalar);
        let t = first_of(v, &["v", "t", "texture_v"], scalar);
        uvs.push(Vector2f::new(u.unwrap_or(0.0), t.unwrap_or(0.0)));
        colors.push(vector3(v, ["red", "green", "blue"], color_channel));
        tangents.push(vector3(v, ["tx", "ty", "tz"], scalar));
    }

    let mut indices = Vec::with_capacity(3 * faces.len());
    for face in faces {
        let polygon = face.get("vertex_indices")
            .or_else(|| face.get("vertex_index"))
            .and_then(index_list)
            .ok_or_else(|| PlyLoadError::Format(String::from("face without a vertex index list")))?;
        // fan triangulation
        for i in 1..polygon.len().saturating_sub(1) {
            indices.extend_from_slice(&[polygon[0], polygon[i], polygon[i + 1]]);
        }
    }

    let normals = if normals.iter().all(|n| n.is_some()) {
        normals.into_iter().flatten().collect()
    } else {
        crate::core::mesh::validate_indices(&indices, positions.len())?;
        vertex_normals(&positions, &indices)
    };

    let mut mesh = Mesh::new(Some(name), positions, normals, uvs, indices);
    if colors.iter().all(|c| c.is_some()) && !colors.is_empty() {
        mesh = mesh.with_colors(colors.into_iter().flatten().collect());
    }
    if tangents.iter().all(|t| t.is_some()) && !tangents.is_empty() {
        mesh = mesh.with_tangents(tangents.into_iter().flatten().collect());
    }
    mesh.validate()?;
    Ok(mesh)
}

pub fn load_mesh_from_ply<P: AsRef<Path>>(path: P) -> Result<Mesh, PlyLoadError> {
    let path = path.as_ref();
    log::info!("Starting reading PLY mesh from: {}.", path.display());
    let mut reader = BufReader::new(File::open(path)?);
    let name = path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| generate_mesh_name("Ply"));
    let mesh = mesh_from_ply_reader(&mut reader, name)?;
    log::info!("PLY loaded, vertices = {}, triangles = {}.", mesh.vertex_count(), mesh.triangle_count());
    Ok(mesh)
}

fn add_scalar_properties(element: &mut ElementDef, names: &[&str]) {
    for name in names {
        element.properties.add(PropertyDef::new(name.to_string(), PropertyType::Scalar(ScalarType::Float)));
    }
}

fn to_byte(v: Float) -> u8 {
    (v.max(0.0).min(1.0) * 255.0).round() as u8
}

/// Writes an ASCII PLY with position, normal and UV properties, plus color
/// and tangent properties when the mesh carries them.
pub fn write_mesh_to_ply_writer<W: Write>(mesh: &Mesh, out: &mut W) -> Result<(), PlyLoadError> {
    mesh.validate()?;

    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = Encoding::Ascii;
    ply.header.comments.push(format!("mesh {}", mesh.name));

    let mut vertex_def = ElementDef::new("vertex".to_string());
    add_scalar_properties(&mut vertex_def, &["x", "y", "z", "nx", "ny", "nz", "u", "v"]);
    if mesh.colors.is_some() {
        for name in ["red", "green", "blue"] {
            vertex_def.properties.add(PropertyDef::new(name.to_string(), PropertyType::Scalar(ScalarType::UChar)));
        }
    }
    if mesh.tangents.is_some() {
        add_scalar_properties(&mut vertex_def, &["tx", "ty", "tz"]);
    }
    ply.header.elements.add(vertex_def);

    let mut face_def = ElementDef::new("face".to_string());
    face_def.properties.add(PropertyDef::new("vertex_indices".to_string(),
                                             PropertyType::List(ScalarType::UChar, ScalarType::Int)));
    ply.header.elements.add(face_def);

    let mut vertices = Vec::with_capacity(mesh.vertex_count());
    for i in 0..mesh.vertex_count() {
        let mut element = DefaultElement::new();
        let p = mesh.positions[i];
        let n = mesh.normals[i];
        let uv = mesh.uvs[i];
        for (key, value) in [("x", p.x), ("y", p.y), ("z", p.z),
                             ("nx", n.x), ("ny", n.y), ("nz", n.z),
                             ("u", uv.x), ("v", uv.y)] {
            element.insert(key.to_string(), Property::Float(value));
        }
        if let Some(colors) = &mesh.colors {
            let c = colors[i];
            element.insert("red".to_string(), Property::UChar(to_byte(c.x)));
            element.insert("green".to_string(), Property::UChar(to_byte(c.y)));
            element.insert("blue".to_string(), Property::UChar(to_byte(c.z)));
        }
        if let Some(tangents) = &mesh.tangents {
            let t = tangents[i];
            element.insert("tx".to_string(), Property::Float(t.x));
            element.insert("ty".to_string(), Property::Float(t.y));
            element.insert("tz".to_string(), Property::Float(t.z));
        }
        vertices.push(element);
    }

    let faces = mesh.indices
        .chunks_exact(3)
        .map(|tri| {
            let mut element = DefaultElement::new();
            element.insert("vertex_indices".to_string(),
                           Property::ListInt(tri.iter().map(|i| *i as i32).collect()));
            element
        })
        .collect();

    ply.payload.insert("vertex".to_string(), vertices);
    ply.payload.insert("face".to_string(), faces);
    ply.make_consistent().map_err(|e| PlyLoadError::Format(format!("{:?}", e)))?;

    let writer = Writer::new();
    writer.write_ply(out, &mut ply)?;
    Ok(())
}

pub fn write_mesh_to_ply<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<(), PlyLoadError> {
    let path = path.as_ref();
    log::info!("Starting writing PLY mesh: {}.", path.display());
    let mut out = BufWriter::new(File::create(path)?);
    write_mesh_to_ply_writer(mesh, &mut out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::quad;

    #[test]
    fn test_quad_survives_ply() {
        let mesh = quad();
        let mut buffer = Vec::new();
        write_mesh_to_ply_writer(&mesh, &mut buffer).expect("failed to write ply");

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("ply"));
        assert!(text.contains("property float tx"));

        let loaded = mesh_from_ply_reader(&mut buffer.as_slice(), String::from("quad")).expect("failed to read ply");
        assert_eq!(loaded.positions, mesh.positions);
        assert_eq!(loaded.indices, mesh.indices);
        assert_eq!(loaded.uvs, mesh.uvs);
        assert_eq!(loaded.tangents, mesh.tangents);
        assert_eq!(loaded.colors, mesh.colors);
    }

    #[test]
    fn test_polygon_faces_are_fanned() {
        let input = "ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
1 1 0
0 1 0
4 0 1 2 3
";
        let mesh = mesh_from_ply_reader(&mut input.as_bytes(), String::from("square")).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert!((mesh.normals[0] - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-6);
        assert!(!mesh.has_tangents());
        assert!(mesh.colors.is_none());
    }
}
