// Copyright @yucwang 2023

use crate::math::constants::{ EPSILON, Float, Vector3f };

/// Per-vertex tangent basis. `normal` is the input vertex normal and is
/// never recomputed; `tangent` and `bitangent` are unit length.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TangentFrame {
    pub tangent: Vector3f,
    pub bitangent: Vector3f,
    pub normal: Vector3f
}

impl Default for TangentFrame {
    fn default() -> Self {
        TangentFrame {
            tangent: Vector3f::new(1.0, 0.0, 0.0),
            bitangent: Vector3f::new(0.0, 1.0, 0.0),
            normal: Vector3f::new(0.0, 0.0, 1.0)
        }
    }
}

impl TangentFrame {
    pub fn new(tangent: Vector3f, bitangent: Vector3f, normal: Vector3f) -> TangentFrame {
        TangentFrame {
            tangent,
            bitangent,
            normal
        }
    }

    /// Completes a frame from a normal and a unit tangent orthogonal to it.
    /// The bitangent is `normalize(cross(n, t))`, so the frame is always
    /// right-handed with respect to `normal`.
    pub fn from_normal_tangent(normal: Vector3f, tangent: Vector3f) -> TangentFrame {
        let bitangent = normal.cross(&tangent);
        let bitangent = if bitangent.norm() > 0.0 {
            bitangent.normalize()
        } else {
            tangent.cross(&orthogonal_tangent(&tangent)).normalize()
        };
        TangentFrame {
            tangent,
            bitangent,
            normal
        }
    }

    /// Frame built only from a normal, using the arbitrary helper axis.
    pub fn from_normal(normal: Vector3f) -> TangentFrame {
        TangentFrame::from_normal_tangent(normal, orthogonal_tangent(&normal))
    }

    /// Sign of `dot(cross(t, b), n)`: `1.0` for right-handed frames.
    pub fn handedness(&self) -> Float {
        if self.tangent.cross(&self.bitangent).dot(&self.normal) < 0.0 {
            -1.0
        } else {
            1.0
        }
    }

    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.tangent), v.dot(&self.bitangent), v.dot(&self.normal))
    }

    pub fn from_local(&self, v: &Vector3f) -> Vector3f {
        v.x * self.tangent + v.y * self.bitangent + v.z * self.normal
    }
}

/// Deterministic unit vector orthogonal to `n`. The helper axis is `+Z`
/// unless `n` is nearly parallel to it, in which case `+X` is used. A zero
/// or non-finite `n` yields `+X`.
pub fn orthogonal_tangent(n: &Vector3f) -> Vector3f {
    let length = n.norm();
    if !length.is_finite() || length < EPSILON {
        return Vector3f::new(1.0, 0.0, 0.0);
    }

    let n = n / length;
    let up = if n.z.abs() < 0.999 {
        Vector3f::new(0.0, 0.0, 1.0)
    } else {
        Vector3f::new(1.0, 0.0, 0.0)
    };
    n.cross(&up).normalize()
}

/// Removes the `n` component from `v` and normalizes the rest. Returns `None`
/// when nothing usable is left.
pub fn orthogonalize(v: &Vector3f, n: &Vector3f) -> Option<Vector3f> {
    let n_length = n.norm();
    let projected = if n_length > 0.0 && n_length.is_finite() {
        let n = n / n_length;
        v - n * n.dot(v)
    } else {
        *v
    };

    let length = projected.norm();
    if length.is_finite() && length > EPSILON * EPSILON {
        Some(projected / length)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orthogonal_tangent_is_orthogonal() {
        let normals = [
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 1.0, 0.0),
            Vector3f::new(1.0, 2.0, 3.0),
            Vector3f::new(0.0, 0.0, -5.0),
        ];
        for n in normals.iter() {
            let t = orthogonal_tangent(n);
            assert!((t.norm() - 1.0).abs() < 1e-5);
            assert!(t.dot(&n.normalize()).abs() < 1e-5);
        }
    }

    #[test]
    fn test_orthogonal_tangent_zero_normal() {
        assert_eq!(orthogonal_tangent(&Vector3f::zeros()), Vector3f::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_frame_local_round_trip() {
        let frame = TangentFrame::from_normal(Vector3f::new(0.3, -0.2, 0.9).normalize());
        let v = Vector3f::new(0.5, 1.5, -2.0);
        let back = frame.from_local(&frame.to_local(&v));
        assert!((back - v).norm() < 1e-5);
        assert_eq!(frame.handedness(), 1.0);
    }

    #[test]
    fn test_orthogonalize_parallel_vector() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        assert!(orthogonalize(&Vector3f::new(0.0, 0.0, 3.0), &n).is_none());
        let t = orthogonalize(&Vector3f::new(2.0, 0.0, 1.0), &n).unwrap();
        assert!((t - Vector3f::new(1.0, 0.0, 0.0)).norm() < 1e-6);
    }
}
