// Copyright @yucwang 2026

use crate::math::constants::{ Float, Vector3f };
use crate::math::frame::TangentFrame;

pub const FRAME_LINE_SCALE: Float = 0.051;

/// Colored line-list geometry. `indices` holds pairs of vertex ids.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSet {
    pub positions: Vec<Vector3f>,
    pub colors: Vec<Vector3f>,
    pub indices: Vec<u32>,
}

impl LineSet {
    pub fn new() -> Self {
        Self { positions: Vec::new(), colors: Vec::new(), indices: Vec::new() }
    }

    pub fn with_capacity(segments: usize) -> Self {
        Self {
            positions: Vec::with_capacity(2 * segments),
            colors: Vec::with_capacity(2 * segments),
            indices: Vec::with_capacity(2 * segments),
        }
    }

    pub fn push_segment(&mut self, from: Vector3f, to: Vector3f, color: Vector3f) {
        let base = self.positions.len() as u32;
        self.positions.push(from);
        self.positions.push(to);
        self.colors.push(color);
        self.colors.push(color);
        self.indices.push(base);
        self.indices.push(base + 1);
    }

    pub fn segment_count(&self) -> usize {
        self.indices.len() / 2
    }
}

impl Default for LineSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Three segments per vertex starting at its position: normal in blue,
/// tangent in red, bitangent in green, each `scale` long for unit axes.
pub fn tangent_frame_lines(positions: &[Vector3f], frames: &[TangentFrame], scale: Float) -> LineSet {
    let blue = Vector3f::new(0.0, 0.0, 1.0);
    let red = Vector3f::new(1.0, 0.0, 0.0);
    let green = Vector3f::new(0.0, 1.0, 0.0);

    let mut lines = LineSet::with_capacity(3 * positions.len().min(frames.len()));
    for (p, frame) in positions.iter().zip(frames.iter()) {
        lines.push_segment(*p, p + frame.normal * scale, blue);
        lines.push_segment(*p, p + frame.tangent * scale, red);
        lines.push_segment(*p, p + frame.bitangent * scale, green);
    }
    lines
}
