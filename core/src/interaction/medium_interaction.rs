//! Medium Interactions

use super::Hit;
use crate::base::*;
use crate::geometry::*;
use crate::medium::*;
use crate::spectrum::*;

/// MediumInteraction represents an interaction point in a scattering medium.
#[derive(Clone)]
pub struct MediumInteraction {
    /// The common interaction data.
    pub hit: Hit,

    /// The medium containing the point.
    pub medium: Option<ArcMedium>,

    /// The phase function.
    pub phase: PhaseFunction,

    /// Frame around `wo`.
    pub frame: Frame,

    /// Absorption coefficient at the point.
    pub sigma_a: Spectrum,

    /// Scattering coefficient at the point.
    pub sigma_s: Spectrum,

    /// Null-collision coefficient at the point.
    pub sigma_n: Spectrum,

    /// Extinction coefficient at the point.
    pub sigma_t: Spectrum,
}

impl MediumInteraction {
    /// Create a new medium interaction.
    ///
    /// * `p`      - The point of interaction.
    /// * `wo`     - The negative ray direction.
    /// * `time`   - Time when interaction occurred.
    /// * `medium` - The medium.
    /// * `phase`  - The phase function.
    /// * `props`  - Coefficients at `p`.
    pub fn new(
        p: Point3f,
        wo: Vector3f,
        time: Float,
        medium: Option<ArcMedium>,
        phase: PhaseFunction,
        props: MediumProperties,
    ) -> Self {
        Self {
            hit: Hit::new(p, time, wo, Normal3f::ZERO, MediumInterface::from(medium.clone())),
            medium,
            phase,
            frame: Frame::from_normal(&Normal3f::from(wo)),
            sigma_a: props.sigma_a,
            sigma_s: props.sigma_s,
            sigma_n: props.sigma_n,
            sigma_t: props.sigma_t(),
        }
    }

    /// Returns the phase function value for a world space direction.
    ///
    /// * `wi` - The direction.
    pub fn eval_phase(&self, wi: &Vector3f) -> Float {
        self.phase.p(&self.hit.wo, wi)
    }

    /// Sample the phase function; returns the value (equal to the pdf) and the
    /// world space direction.
    ///
    /// * `u` - Sample value.
    pub fn sample_phase(&self, u: &Point2f) -> (Float, Vector3f) {
        self.phase.sample_p(&self.hit.wo, u)
    }
}
