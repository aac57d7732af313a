//! Geometry primitives: vectors, matrices and bounding boxes.
//!
//! Everything in here is plain `Copy` data with no state. Matrices follow the
//! column-vector convention (`M * v`), so `A * B` applies `B` first.

pub mod bounds;
pub mod mat3;
pub mod mat4;
pub mod vec2;
pub mod vec3;
pub mod vec4;

pub use bounds::{Aabb2, Aabb3, Obb};
pub use mat3::{invert_affine, Mat3};
pub use mat4::Mat4;
pub use vec2::Vec2;
pub use vec3::Vec3;
pub use vec4::Vec4;
