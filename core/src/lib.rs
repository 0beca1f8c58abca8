//! Core

#[macro_use]
extern crate hexf;
#[macro_use]
extern crate log;

// Re-export.
pub mod base;
pub mod camera;
pub mod error;
pub mod film;
pub mod geometry;
pub mod interaction;
pub mod light;
pub mod medium;
pub mod microfacet;
pub mod options;
pub mod primitives;
pub mod reflection;
pub mod rng;
pub mod sampler;
pub mod sampling;
pub mod scene;
pub mod spectrum;
