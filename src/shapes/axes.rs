// Copyright @yucwang 2026

use crate::core::lines::LineSet;
use crate::math::constants::Vector3f;

/// The three coordinate axes as colored segments from `-0.25` to `1`.
pub fn coordinate_frame() -> LineSet {
    let mut lines = LineSet::with_capacity(3);
    for axis in 0..3 {
        let mut from = Vector3f::zeros();
        let mut to = Vector3f::zeros();
        let mut color = Vector3f::zeros();
        from[axis] = -0.25;
        to[axis] = 1.0;
        color[axis] = 1.0;
        lines.push_segment(from, to, color);
    }
    lines
}
