//! BSDF Sample

use crate::base::*;
use crate::geometry::*;
use crate::spectrum::*;
use super::BxDFType;

/// Result of sampling a BSDF.
#[derive(Copy, Clone, Debug, Default)]
pub struct BSDFSample {
    /// Sampled direction in the shading frame.
    pub wo: Vector3f,

    /// Probability density of `wo`; 1 or the lobe selection probability for
    /// delta lobes.
    pub pdf: Float,

    /// Relative index of refraction along `wo`; 1 for reflection.
    pub eta: Float,

    /// Lobe that was sampled.
    pub sampled_type: BxDFType,

    /// Cosine-weighted BSDF value `f(wi, wo)·|cos θo|`.
    pub f: Spectrum,
}

impl BSDFSample {
    /// Create a new `BSDFSample`.
    ///
    /// * `wo`           - Sampled direction.
    /// * `pdf`          - Probability density of `wo`.
    /// * `eta`          - Relative index of refraction.
    /// * `sampled_type` - Lobe that was sampled.
    /// * `f`            - Cosine-weighted BSDF value.
    pub fn new(wo: Vector3f, pdf: Float, eta: Float, sampled_type: BxDFType, f: Spectrum) -> Self {
        Self {
            wo,
            pdf,
            eta,
            sampled_type,
            f,
        }
    }

    /// Returns true if the sample carries no energy.
    pub fn is_invalid(&self) -> bool {
        !(self.pdf > 0.0) || self.f.is_black()
    }

    /// Returns the throughput weight `f / pdf`.
    pub fn weight(&self) -> Spectrum {
        if self.pdf > 0.0 {
            self.f / self.pdf
        } else {
            Spectrum::ZERO
        }
    }
}
