// Copyright @yucwang 2026

//! Per-vertex tangent frames for normal mapping.
//!
//! Every triangle solves the 2x2 system that maps its UV deltas onto its
//! position deltas, giving one (T, B) pair. That pair is added to each of
//! the three corners with equal weight, averaged per vertex, handedness
//! corrected against the vertex normal and finally orthogonalized.

use crate::core::lines::{ tangent_frame_lines, LineSet };
use crate::core::mesh::{ InvalidMeshError, Mesh };
use crate::math::constants::{ Float, UV_EPSILON, Vector2f, Vector3f };
use crate::math::frame::{ orthogonal_tangent, orthogonalize, TangentFrame };

use std::ops::Range;
use std::thread;

/// What a triangle with a singular UV Jacobian contributes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DegeneratePolicy {
    /// Zero tangent and bitangent. The triangle still counts toward the
    /// incidence of its corners.
    Skip,
    /// Each corner receives the arbitrary orthonormal basis of its own normal.
    NormalBasis,
}

impl Default for DegeneratePolicy {
    fn default() -> Self {
        DegeneratePolicy::Skip
    }
}

impl DegeneratePolicy {
    /// Accepts the names used on the command line and in batch files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "skip" => Some(DegeneratePolicy::Skip),
            "normal" | "normal_basis" => Some(DegeneratePolicy::NormalBasis),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DegeneratePolicy::Skip => "skip",
            DegeneratePolicy::NormalBasis => "normal",
        }
    }
}

/// A triangle that went through the degenerate fallback.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DegenerateTriangle {
    pub triangle: usize,
    pub vertices: [u32; 3],
    pub determinant: Float,
}

/// Result of a build: the augmented mesh, one frame per vertex and the
/// triangles that needed the fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct TangentSpace {
    pub mesh: Mesh,
    pub frames: Vec<TangentFrame>,
    pub degenerate: Vec<DegenerateTriangle>,
}

impl TangentSpace {
    pub fn tangents(&self) -> &[Vector3f] {
        self.mesh.tangents.as_deref().unwrap_or(&[])
    }

    pub fn bitangents(&self) -> Vec<Vector3f> {
        self.frames.iter().map(|f| f.bitangent).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.degenerate.is_empty()
    }

    /// Normal, tangent and bitangent segments for every vertex.
    pub fn frame_lines(&self, scale: Float) -> LineSet {
        tangent_frame_lines(&self.mesh.positions, &self.frames, scale)
    }
}

#[derive(Debug, Copy, Clone)]
struct Accumulator {
    tangent: Vector3f,
    bitangent: Vector3f,
    count: u32,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self { tangent: Vector3f::zeros(), bitangent: Vector3f::zeros(), count: 0 }
    }
}

impl Accumulator {
    fn add(&mut self, tangent: &Vector3f, bitangent: &Vector3f) {
        self.tangent += tangent;
        self.bitangent += bitangent;
        self.count += 1;
    }

    fn merge(&mut self, other: &Accumulator) {
        self.tangent += other.tangent;
        self.bitangent += other.bitangent;
        self.count += other.count;
    }
}

#[derive(Debug, Copy, Clone)]
pub struct TangentSpaceBuilder {
    epsilon: Float,
    policy: DegeneratePolicy,
    threads: usize,
}

impl Default for TangentSpaceBuilder {
    fn default() -> Self {
        Self { epsilon: UV_EPSILON, policy: DegeneratePolicy::Skip, threads: 1 }
    }
}

impl TangentSpaceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Triangles with `|det| <= epsilon` are degenerate. Negative values are
    /// clamped to zero, which only rejects exactly singular triangles.
    pub fn with_epsilon(mut self, epsilon: Float) -> Self {
        self.epsilon = epsilon.max(0.0);
        self
    }

    pub fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Worker count for the per-triangle pass. `0` is treated as `1`.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn epsilon(&self) -> Float {
        self.epsilon
    }

    pub fn degenerate_policy(&self) -> DegeneratePolicy {
        self.policy
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn build(&self, mesh: &Mesh) -> Result<TangentSpace, InvalidMeshError> {
        mesh.validate()?;

        if let Some(tangents) = &mesh.tangents {
            log::debug!("{} already has tangents, skipping the build.", mesh.name);
            let frames = mesh.normals.iter()
                .zip(tangents.iter())
                .map(|(n, t)| TangentFrame::from_normal_tangent(*n, *t))
                .collect();
            return Ok(TangentSpace { mesh: mesh.clone(), frames, degenerate: mesh.degenerate.clone() });
        }

        let (accumulators, degenerate) = self.accumulate_all(mesh);

        // Barrier: every triangle contribution is in before any vertex is finalized.
        let frames: Vec<TangentFrame> = accumulators.iter()
            .zip(mesh.normals.iter())
            .map(|(acc, n)| finalize_vertex(acc, n))
            .collect();

        if !degenerate.is_empty() {
            log::warn!("{}: {} of {} triangles have degenerate UVs, fallback {:?} applied.",
                       mesh.name, degenerate.len(), mesh.triangle_count(), self.policy);
        }
        log::debug!("{}: tangent space built for {} vertices.", mesh.name, frames.len());

        let mut augmented = mesh.clone();
        augmented.tangents = Some(frames.iter().map(|f| f.tangent).collect());
        augmented.degenerate = degenerate.clone();

        Ok(TangentSpace { mesh: augmented, frames, degenerate })
    }

    fn accumulate_all(&self, mesh: &Mesh) -> (Vec<Accumulator>, Vec<DegenerateTriangle>) {
        let triangle_count = mesh.triangle_count();
        let workers = self.threads.min(triangle_count).max(1);

        if workers == 1 {
            let mut accumulators = vec![Accumulator::default(); mesh.vertex_count()];
            let mut degenerate = Vec::new();
            self.accumulate(mesh, 0..triangle_count, &mut accumulators, &mut degenerate);
            return (accumulators, degenerate);
        }

        // Scatter into per-worker buffers, then gather in chunk order so the
        // sums only depend on the worker count.
        let chunk = (triangle_count + workers - 1) / workers;
        let partials: Vec<(Vec<Accumulator>, Vec<DegenerateTriangle>)> = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|w| {
                    let range = (w * chunk)..((w + 1) * chunk).min(triangle_count);
                    scope.spawn(move || {
                        let mut accumulators = vec![Accumulator::default(); mesh.vertex_count()];
                        let mut degenerate = Vec::new();
                        self.accumulate(mesh, range, &mut accumulators, &mut degenerate);
                        (accumulators, degenerate)
                    })
                })
                .collect();

            handles.into_iter()
                .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        });

        let mut accumulators = vec![Accumulator::default(); mesh.vertex_count()];
        let mut degenerate = Vec::new();
        for (partial, partial_degenerate) in partials {
            for (acc, p) in accumulators.iter_mut().zip(partial.iter()) {
                acc.merge(p);
            }
            degenerate.extend(partial_degenerate);
        }
        (accumulators, degenerate)
    }

    fn accumulate(&self,
                  mesh: &Mesh,
                  triangles: Range<usize>,
                  accumulators: &mut [Accumulator],
                  degenerate: &mut Vec<DegenerateTriangle>) {
        for tri_idx in triangles {
            let corners = mesh.triangle(tri_idx);
            let positions = corners.map(|i| mesh.positions[i]);
            let uvs = corners.map(|i| mesh.uvs[i]);

            match solve_triangle(&positions, &uvs, self.epsilon) {
                Ok((tangent, bitangent)) => {
                    for &i in corners.iter() {
                        accumulators[i].add(&tangent, &bitangent);
                    }
                }
                Err(determinant) => {
                    degenerate.push(DegenerateTriangle {
                        triangle: tri_idx,
                        vertices: corners.map(|i| i as u32),
                        determinant,
                    });
                    for &i in corners.iter() {
                        match self.policy {
                            DegeneratePolicy::Skip => {
                                accumulators[i].add(&Vector3f::zeros(), &Vector3f::zeros());
                            }
                            DegeneratePolicy::NormalBasis => {
                                let frame = TangentFrame::from_normal(mesh.normals[i]);
                                accumulators[i].add(&frame.tangent, &frame.bitangent);
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Builds with the default settings: single thread, `Skip` fallback.
pub fn build_tangent_space(mesh: &Mesh) -> Result<TangentSpace, InvalidMeshError> {
    TangentSpaceBuilder::default().build(mesh)
}

/// Unnormalized (T, B) of one triangle, or the offending determinant when the
/// UV Jacobian cannot be inverted.
fn solve_triangle(positions: &[Vector3f; 3],
                  uvs: &[Vector2f; 3],
                  epsilon: Float) -> Result<(Vector3f, Vector3f), Float> {
    let dx1 = positions[1] - positions[0];
    let dx2 = positions[2] - positions[0];
    let du1 = uvs[1] - uvs[0];
    let du2 = uvs[2] - uvs[0];

    let det = du1.x * du2.y - du1.y * du2.x;
    if !det.is_finite() || det.abs() <= epsilon {
        return Err(det);
    }

    let r = 1.0 / det;
    let tangent = (dx1 * du2.y - dx2 * du1.y) * r;
    let bitangent = (dx2 * du1.x - dx1 * du2.x) * r;
    if !is_finite(&tangent) || !is_finite(&bitangent) {
        return Err(det);
    }
    Ok((tangent, bitangent))
}

fn finalize_vertex(acc: &Accumulator, normal: &Vector3f) -> TangentFrame {
    if acc.count == 0 {
        return TangentFrame::from_normal(*normal);
    }

    let inv_count = 1.0 / acc.count as Float;
    let tangent = acc.tangent * inv_count;
    let bitangent = acc.bitangent * inv_count;

    // Keep the pair whose cross product agrees with the normal.
    let (first, second) = if tangent.cross(&bitangent).dot(normal) > 0.0 {
        (tangent, bitangent)
    } else {
        (bitangent, tangent)
    };

    let axis = first.cross(&second).normalize();
    if !is_finite(&axis) {
        return TangentFrame::from_normal(*normal);
    }

    match orthogonalize(&first, normal) {
        Some(t) => TangentFrame::from_normal_tangent(*normal, t),
        None => TangentFrame::from_normal(*normal),
    }
}

fn is_finite(v: &Vector3f) -> bool {
    v.iter().all(|c| c.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_quad() -> Mesh {
        Mesh::new(
            Some(String::from("quad")),
            vec![Vector3f::new(-1.0, -1.0, 0.0), Vector3f::new(1.0, -1.0, 0.0),
                 Vector3f::new(1.0, 1.0, 0.0), Vector3f::new(-1.0, 1.0, 0.0)],
            vec![Vector3f::new(0.0, 0.0, 1.0); 4],
            vec![Vector2f::new(0.0, 0.0), Vector2f::new(1.0, 0.0),
                 Vector2f::new(1.0, 1.0), Vector2f::new(0.0, 1.0)],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    fn assert_vec_close(a: &Vector3f, b: &Vector3f) {
        assert!((a - b).norm() < 1e-5, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_solve_triangle_axis_aligned() {
        let positions = [Vector3f::new(-1.0, -1.0, 0.0), Vector3f::new(1.0, -1.0, 0.0), Vector3f::new(1.0, 1.0, 0.0)];
        let uvs = [Vector2f::new(0.0, 0.0), Vector2f::new(1.0, 0.0), Vector2f::new(1.0, 1.0)];
        let (t, b) = solve_triangle(&positions, &uvs, UV_EPSILON).unwrap();
        assert_vec_close(&t, &Vector3f::new(2.0, 0.0, 0.0));
        assert_vec_close(&b, &Vector3f::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_solve_triangle_singular() {
        let positions = [Vector3f::new(0.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0), Vector3f::new(0.0, 1.0, 0.0)];
        let uvs = [Vector2f::new(0.5, 0.5); 3];
        assert_eq!(solve_triangle(&positions, &uvs, UV_EPSILON), Err(0.0));
    }

    #[test]
    fn test_unit_quad() {
        let result = build_tangent_space(&unit_quad()).unwrap();
        assert!(result.is_clean());
        for frame in &result.frames {
            assert_vec_close(&frame.tangent, &Vector3f::new(1.0, 0.0, 0.0));
            assert_vec_close(&frame.bitangent, &Vector3f::new(0.0, 1.0, 0.0));
            assert_eq!(frame.normal, Vector3f::new(0.0, 0.0, 1.0));
        }
        assert_eq!(result.tangents().len(), 4);
    }

    #[test]
    fn test_mirrored_uvs_keep_right_handed_frames() {
        let mut mesh = unit_quad();
        for uv in &mut mesh.uvs {
            uv.x = 1.0 - uv.x;
        }
        let result = build_tangent_space(&mesh).unwrap();
        for frame in &result.frames {
            // T = (-1,0,0), B = (0,1,0) points away from the normal, so the
            // roles swap and the bitangent direction becomes the tangent.
            assert_vec_close(&frame.tangent, &Vector3f::new(0.0, 1.0, 0.0));
            assert_eq!(frame.handedness(), 1.0);
        }
    }

    #[test]
    fn test_degenerate_triangle_skip() {
        let mut mesh = unit_quad();
        mesh.indices = vec![0, 1, 2];
        mesh.uvs = vec![Vector2f::new(0.25, 0.25); 4];
        let result = build_tangent_space(&mesh).unwrap();

        assert_eq!(result.degenerate.len(), 1);
        assert_eq!(result.degenerate[0].triangle, 0);
        assert_eq!(result.degenerate[0].vertices, [0, 1, 2]);
        let expected = orthogonal_tangent(&Vector3f::new(0.0, 0.0, 1.0));
        for t in result.tangents() {
            assert!(t.iter().all(|c| c.is_finite()));
            assert_vec_close(t, &expected);
        }
    }

    #[test]
    fn test_degenerate_triangle_normal_basis() {
        let mut mesh = unit_quad();
        mesh.uvs[3] = mesh.uvs[0];
        mesh.uvs[1] = mesh.uvs[0];
        let result = TangentSpaceBuilder::new()
            .with_degenerate_policy(DegeneratePolicy::NormalBasis)
            .build(&mesh)
            .unwrap();
        // Both triangles collapse in UV space.
        assert_eq!(result.degenerate.len(), 2);
        for frame in &result.frames {
            assert!((frame.tangent.norm() - 1.0).abs() < 1e-5);
            assert!(frame.tangent.dot(&frame.normal).abs() < 1e-5);
        }
    }

    #[test]
    fn test_unreferenced_vertex_gets_default() {
        let mut mesh = unit_quad();
        mesh.positions.push(Vector3f::new(3.0, 3.0, 3.0));
        mesh.normals.push(Vector3f::new(0.0, 1.0, 0.0));
        mesh.uvs.push(Vector2f::new(0.0, 0.0));
        let result = build_tangent_space(&mesh).unwrap();
        assert_vec_close(&result.tangents()[4], &orthogonal_tangent(&Vector3f::new(0.0, 1.0, 0.0)));
        assert!(result.is_clean());
    }

    #[test]
    fn test_invalid_mesh_fails() {
        let mut mesh = unit_quad();
        mesh.indices.push(1);
        assert_eq!(build_tangent_space(&mesh).unwrap_err(), InvalidMeshError::IndexCount { count: 7 });

        let mut mesh = unit_quad();
        mesh.indices[5] = 9;
        assert!(matches!(build_tangent_space(&mesh),
                         Err(InvalidMeshError::IndexOutOfRange { triangle: 1, index: 9, .. })));
    }

    #[test]
    fn test_idempotent() {
        let once = build_tangent_space(&unit_quad()).unwrap();
        let twice = build_tangent_space(&once.mesh).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_idempotent_keeps_diagnostics() {
        let mut mesh = unit_quad();
        mesh.uvs[1] = mesh.uvs[0];
        let once = build_tangent_space(&mesh).unwrap();
        assert_eq!(once.degenerate.len(), 1);
        assert_eq!(once.mesh.degenerate, once.degenerate);

        let twice = build_tangent_space(&once.mesh).unwrap();
        assert_eq!(once, twice);

        let mut stripped = once.mesh.clone();
        stripped.strip_tangents();
        assert!(stripped.degenerate.is_empty());
        assert_eq!(build_tangent_space(&stripped).unwrap(), once);
    }

    #[test]
    fn test_frame_lines() {
        let result = build_tangent_space(&unit_quad()).unwrap();
        let lines = result.frame_lines(0.5);
        assert_eq!(lines.segment_count(), 3 * 4);
        assert_eq!(lines.indices.len(), 2 * 3 * 4);
        // Vertex 0 emits normal, tangent, bitangent in that order.
        let p = result.mesh.positions[0];
        assert_vec_close(&lines.positions[0], &p);
        assert_vec_close(&lines.positions[1], &(p + Vector3f::new(0.0, 0.0, 0.5)));
        assert_vec_close(&lines.positions[3], &(p + Vector3f::new(0.5, 0.0, 0.0)));
        assert_vec_close(&lines.positions[5], &(p + Vector3f::new(0.0, 0.5, 0.0)));
    }

    #[test]
    fn test_input_passes_through() {
        let mesh = unit_quad().with_colors(vec![Vector3f::new(0.1, 0.2, 0.3); 4]);
        let result = build_tangent_space(&mesh).unwrap();
        assert_eq!(result.mesh.positions, mesh.positions);
        assert_eq!(result.mesh.normals, mesh.normals);
        assert_eq!(result.mesh.uvs, mesh.uvs);
        assert_eq!(result.mesh.colors, mesh.colors);
        assert_eq!(result.mesh.indices, mesh.indices);
        assert!(!mesh.has_tangents());
    }

    #[test]
    fn test_threads_clamped_to_triangle_count() {
        let result = TangentSpaceBuilder::new().with_threads(16).build(&unit_quad()).unwrap();
        for t in result.tangents() {
            assert_vec_close(t, &Vector3f::new(1.0, 0.0, 0.0));
        }
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(DegeneratePolicy::from_name("Skip"), Some(DegeneratePolicy::Skip));
        assert_eq!(DegeneratePolicy::from_name("normal"), Some(DegeneratePolicy::NormalBasis));
        assert_eq!(DegeneratePolicy::from_name("weighted"), None);
        assert_eq!(DegeneratePolicy::from_name(DegeneratePolicy::NormalBasis.name()),
                   Some(DegeneratePolicy::NormalBasis));
    }
}
