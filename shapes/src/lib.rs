//! Shapes

#[macro_use]
extern crate log;

mod quad;
mod sphere;
mod triangle;

// Re-export.
pub use quad::*;
pub use sphere::*;
pub use triangle::*;
