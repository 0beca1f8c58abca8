//! Integrators

#[macro_use]
extern crate log;

mod bdpt;
mod common;
mod integrator;
mod light_tracer;
mod path;
mod renderer;
#[cfg(test)]
mod test_scenes;
mod volpath;

// Re-export.
pub use bdpt::*;
pub use common::*;
pub use integrator::*;
pub use light_tracer::*;
pub use path::*;
pub use renderer::*;
pub use volpath::*;
