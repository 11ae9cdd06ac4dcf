// Copyright @yucwang 2026

use crate::core::mesh::{ generate_mesh_name, Mesh };
use crate::math::constants::{ Float, PI, Vector2f, Vector3f };

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SphereParams {
    pub height_segments: u32,
    pub width_segments: u32,
    pub radius: Float,
    /// Normals point inward and the winding is reversed, for viewing the
    /// sphere from inside.
    pub flip: bool,
}

impl Default for SphereParams {
    fn default() -> Self {
        Self { height_segments: 12, width_segments: 24, radius: 1.0, flip: false }
    }
}

/// UV sphere around the origin with the `+Y` axis through the poles. The
/// seam column and the pole rows are duplicated so every vertex has a
/// single UV.
pub fn sphere(params: &SphereParams) -> Mesh {
    let height_segments = params.height_segments.max(2);
    let width_segments = params.width_segments.max(3);
    let radius = params.radius;
    let sign: Float = if params.flip { -1.0 } else { 1.0 };

    let vertex_count = ((height_segments + 1) * (width_segments + 1)) as usize;
    let mut positions = Vec::with_capacity(vertex_count);
    let mut normals = Vec::with_capacity(vertex_count);
    let mut uvs = Vec::with_capacity(vertex_count);

    for y in 0..=height_segments {
        for x in 0..=width_segments {
            let u = x as Float / width_segments as Float;
            let v = y as Float / height_segments as Float;
            let theta = u * 2.0 * PI;
            let phi = v * PI;

            let dir = Vector3f::new(theta.cos() * phi.sin(), phi.cos(), theta.sin() * phi.sin());
            positions.push(dir * radius);
            normals.push(dir * sign);
            uvs.push(Vector2f::new(1.0 - u, 1.0 - v));
        }
    }

    let around = width_segments + 1;
    let mut indices = Vec::with_capacity((6 * height_segments * width_segments) as usize);
    for x in 0..width_segments {
        for y in 0..height_segments {
            let a = y * around + x;
            let b = y * around + x + 1;
            let c = (y + 1) * around + x;
            let d = (y + 1) * around + x + 1;
            if params.flip {
                indices.extend_from_slice(&[b, a, c, b, c, d]);
            } else {
                indices.extend_from_slice(&[a, b, c, c, b, d]);
            }
        }
    }

    Mesh::new(Some(generate_mesh_name("Sphere")), positions, normals, uvs, indices)
        .with_colors(vec![Vector3f::new(0.3, 0.3, 0.3); vertex_count])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_counts() {
        let mesh = sphere(&SphereParams::default());
        assert_eq!(mesh.validate(), Ok(()));
        assert_eq!(mesh.vertex_count(), 13 * 25);
        assert_eq!(mesh.triangle_count(), 2 * 12 * 24);
        assert!(!mesh.has_tangents());
    }

    #[test]
    fn test_sphere_radius_and_normals() {
        let params = SphereParams { radius: 2.5, ..SphereParams::default() };
        let mesh = sphere(&params);
        for (p, n) in mesh.positions.iter().zip(mesh.normals.iter()) {
            assert!((p.norm() - 2.5).abs() < 1e-4);
            assert!((n.norm() - 1.0).abs() < 1e-5);
            assert!(p.dot(n) > 0.0);
        }
    }

    #[test]
    fn test_flipped_sphere_faces_inward() {
        let params = SphereParams { flip: true, ..SphereParams::default() };
        let mesh = sphere(&params);
        for (p, n) in mesh.positions.iter().zip(mesh.normals.iter()) {
            assert!(p.dot(n) < 0.0);
        }
        // Second row, first quad: the winding faces the center.
        let [i0, i1, i2] = mesh.triangle(2);
        let p0 = mesh.positions[i0];
        let geo_n = (mesh.positions[i1] - p0).cross(&(mesh.positions[i2] - p0));
        assert!(geo_n.dot(&p0) < 0.0);
    }
}
