/* Copyright 2020 @Yuchen Wong */

use nalgebra as na;

pub type Float = f32;

pub type Vector2f = na::Vector2<Float>;
pub type Vector3f = na::Vector3<Float>;
pub type Vector4f = na::Vector4<Float>;
pub type Matrix4f = na::Matrix4<Float>;

pub const EPSILON: Float = 1e-4;
// Below this |det| the UV Jacobian of a triangle is treated as singular.
pub const UV_EPSILON: Float = 1e-12;
pub const PI: Float = std::f32::consts::PI;
