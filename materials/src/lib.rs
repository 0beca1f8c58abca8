//! Materials

#[macro_use]
extern crate log;

mod common;
mod conductor;
mod dielectric;
mod glass;
mod mirror;
mod plastic;

// Re-export
pub use conductor::*;
pub use dielectric::*;
pub use glass::*;
pub use mirror::*;
pub use plastic::*;
