// Copyright @yucwang 2026

use crate::core::mesh::{ generate_mesh_name, Mesh };
use crate::math::color::hsv_to_rgb;
use crate::math::constants::{ Float, PI, Vector2f, Vector3f };

/// Triangle fan in the XY plane: a white center vertex plus `segments + 1`
/// ring vertices whose color walks the hue circle once. UVs map the disc
/// onto the unit square.
pub fn circle(segments: u32, radius: Float) -> Mesh {
    let segments = segments.max(3);
    let step = 2.0 * PI / segments as Float;

    let mut positions = vec![Vector3f::zeros()];
    let mut colors = vec![Vector3f::new(1.0, 1.0, 1.0)];
    let mut uvs = vec![Vector2f::new(0.5, 0.5)];

    for i in 0..=segments {
        let angle = i as Float * step;
        let (s, c) = angle.sin_cos();
        positions.push(Vector3f::new(radius * c, radius * s, 0.0));
        uvs.push(Vector2f::new(0.5 + 0.5 * c, 0.5 + 0.5 * s));
        let hue = i as Float / segments as Float;
        colors.push(hsv_to_rgb(&Vector3f::new(hue, 1.0, 1.0)));
    }

    let mut indices = Vec::with_capacity(3 * segments as usize);
    for i in 1..=segments {
        indices.extend_from_slice(&[0, i, i + 1]);
    }

    let vertex_count = positions.len();
    Mesh::new(Some(generate_mesh_name("Circle")),
              positions,
              vec![Vector3f::new(0.0, 0.0, 1.0); vertex_count],
              uvs,
              indices)
        .with_colors(colors)
}
