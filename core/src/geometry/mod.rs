//! Geometry

mod bounds;
mod common;
mod frame;
mod matrix4x4;
mod normal3;
mod point2;
mod point3;
mod ray;
mod shape;
mod transform;
mod vector3;

// Re-export
pub use bounds::*;
pub use common::*;
pub use frame::*;
pub use matrix4x4::*;
pub use normal3::*;
pub use point2::*;
pub use point3::*;
pub use ray::*;
pub use shape::*;
pub use transform::*;
pub use vector3::*;
