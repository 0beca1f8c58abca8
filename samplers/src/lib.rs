//! Samplers

#[macro_use]
extern crate log;

mod random;

// Re-export.
pub use random::*;
