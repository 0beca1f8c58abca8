//! Ray intersection acceleration data structures.

#[macro_use]
extern crate log;

mod linear;

// Re-export
pub use linear::*;
