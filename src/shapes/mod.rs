// Copyright @yucwang 2026

pub mod axes;
pub mod circle;
pub mod cube;
pub mod quad;
pub mod sphere;

pub use axes::coordinate_frame;
pub use circle::circle;
pub use cube::cube;
pub use quad::quad;
pub use sphere::{ sphere, SphereParams };
