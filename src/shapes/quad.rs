// Copyright @yucwang 2026

use crate::core::mesh::{ generate_mesh_name, Mesh };
use crate::math::constants::{ Vector2f, Vector3f };

/// Unit quad in the XY plane facing `+Z`, with its tangents already set.
pub fn quad() -> Mesh {
    let positions = vec![
        Vector3f::new(-1.0, -1.0, 0.0),
        Vector3f::new( 1.0, -1.0, 0.0),
        Vector3f::new( 1.0,  1.0, 0.0),
        Vector3f::new(-1.0,  1.0, 0.0),
    ];
    // bottom left blue, bottom right green, top right red, top left yellow
    let colors = vec![
        Vector3f::new(0.0, 0.0, 1.0),
        Vector3f::new(0.0, 1.0, 0.0),
        Vector3f::new(1.0, 0.0, 0.0),
        Vector3f::new(1.0, 1.0, 0.0),
    ];
    let uvs = vec![
        Vector2f::new(0.0, 0.0),
        Vector2f::new(1.0, 0.0),
        Vector2f::new(1.0, 1.0),
        Vector2f::new(0.0, 1.0),
    ];

    Mesh::new(Some(generate_mesh_name("Quad")),
              positions,
              vec![Vector3f::new(0.0, 0.0, 1.0); 4],
              uvs,
              vec![0, 1, 2, 0, 2, 3])
        .with_colors(colors)
        .with_tangents(vec![Vector3f::new(1.0, 0.0, 0.0); 4])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_layout() {
        let mesh = quad();
        assert_eq!(mesh.validate(), Ok(()));
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.has_tangents());
        assert!(mesh.name.starts_with("Quad_"));
    }
}
