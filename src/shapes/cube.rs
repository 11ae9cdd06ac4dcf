// Copyright @yucwang 2026

use crate::core::mesh::{ generate_mesh_name, Mesh };
use crate::math::constants::{ Vector2f, Vector3f };

struct Face {
    corners: [[f32; 3]; 4],
    uvs: [[f32; 2]; 4],
    color: [f32; 3],
    normal: [f32; 3],
    tangent: [f32; 3],
}

const FACES: [Face; 6] = [
    // front, white
    Face {
        corners: [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]],
        uvs: [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        color: [1.0, 1.0, 1.0],
        normal: [0.0, 0.0, 1.0],
        tangent: [1.0, 0.0, 0.0],
    },
    // back, red
    Face {
        corners: [[-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, -1.0, -1.0]],
        uvs: [[1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]],
        color: [1.0, 0.0, 0.0],
        normal: [0.0, 0.0, -1.0],
        tangent: [-1.0, 0.0, 0.0],
    },
    // top, green
    Face {
        corners: [[-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]],
        uvs: [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
        color: [0.0, 1.0, 0.0],
        normal: [0.0, 1.0, 0.0],
        tangent: [1.0, 0.0, 0.0],
    },
    // bottom, blue
    Face {
        corners: [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]],
        uvs: [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        color: [0.0, 0.0, 1.0],
        normal: [0.0, -1.0, 0.0],
        tangent: [1.0, 0.0, 0.0],
    },
    // right, yellow
    Face {
        corners: [[1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]],
        uvs: [[1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]],
        color: [1.0, 1.0, 0.0],
        normal: [1.0, 0.0, 0.0],
        tangent: [0.0, 0.0, -1.0],
    },
    // left, purple
    Face {
        corners: [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]],
        uvs: [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        color: [1.0, 0.0, 1.0],
        normal: [-1.0, 0.0, 0.0],
        tangent: [0.0, 0.0, 1.0],
    },
];

/// Axis-aligned cube spanning `[-1, 1]^3`, four vertices per face so every
/// face keeps its own normal, UVs and tangent.
pub fn cube() -> Mesh {
    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut uvs = Vec::with_capacity(24);
    let mut colors = Vec::with_capacity(24);
    let mut tangents = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (f, face) in FACES.iter().enumerate() {
        let base = (4 * f) as u32;
        for (corner, uv) in face.corners.iter().zip(face.uvs.iter()) {
            positions.push(Vector3f::from(*corner));
            uvs.push(Vector2f::from(*uv));
            normals.push(Vector3f::from(face.normal));
            colors.push(Vector3f::from(face.color));
            tangents.push(Vector3f::from(face.tangent));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh::new(Some(generate_mesh_name("Cube")), positions, normals, uvs, indices)
        .with_colors(colors)
        .with_tangents(tangents)
}
