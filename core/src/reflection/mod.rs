//! Reflection and surface scattering models

use crate::base::*;
use crate::geometry::*;
use crate::spectrum::*;

mod bsdf;
mod bsdf_sample;
mod bxdf_type;
mod common;
mod diffuse;
mod fresnel;

// Re-export
pub use bsdf::*;
pub use bsdf_sample::*;
pub use bxdf_type::*;
pub use common::*;
pub use diffuse::*;
pub use fresnel::*;
