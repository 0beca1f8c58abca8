//! Homogeneous Medium

use rad_core::base::*;
use rad_core::error::*;
use rad_core::geometry::*;
use rad_core::medium::*;
use rad_core::spectrum::*;

/// Implements a homogeneous medium representing a region of space with constant
/// σa and σs values throughout its extent.
#[derive(Clone, Debug)]
pub struct HomogeneousMedium {
    /// Absorption cross section `σa` is the probability density that light is
    /// absorbed per unit distance traveled in the medium
    sigma_a: Spectrum,

    /// Scattering coefficient `σs` is the probability of an out-scattering
    /// event occurring per unit distance
    sigma_s: Spectrum,

    /// Total reduction in radiance due to absorption and out-scattering
    /// `σt = σs + σa`.
    sigma_t: Spectrum,

    /// The phase function.
    phase: PhaseFunction,
}

impl HomogeneousMedium {
    /// Create a new `HomogeneousMedium`.
    ///
    /// * `sigma_a` - Absorption cross section `σa`.
    /// * `sigma_s` - Scattering coefficient `σs`.
    /// * `scale`   - Scale applied to both coefficients.
    /// * `g`       - The asymmetry parameter for Henyey-Greenstein phase
    ///               function.
    pub fn new(sigma_a: Spectrum, sigma_s: Spectrum, scale: Float, g: Float) -> Result<Self> {
        let sigma_a = sigma_a * scale;
        let sigma_s = sigma_s * scale;
        if !sigma_a.is_finite() || !sigma_s.is_finite() {
            return Err(Error::InvalidArgument("medium coefficients must be finite".to_string()));
        }
        if sigma_a.min_component_value() < 0.0 || sigma_s.min_component_value() < 0.0 {
            return Err(Error::InvalidArgument("medium coefficients must be non-negative".to_string()));
        }
        if !(g > -1.0 && g < 1.0) {
            return Err(Error::InvalidArgument(format!("phase asymmetry {g} outside (-1, 1)")));
        }
        Ok(Self {
            sigma_a,
            sigma_s,
            sigma_t: sigma_a + sigma_s,
            phase: PhaseFunction::new(g),
        })
    }
}

impl Medium for HomogeneousMedium {
    fn phase(&self) -> &PhaseFunction {
        &self.phase
    }

    fn is_homogeneous(&self) -> bool {
        true
    }

    /// The medium fills the whole ray segment.
    fn intersect_bounds(&self, ray: &Ray) -> Option<(Float, Float)> {
        Some((ray.t_min, ray.t_max))
    }

    fn majorant(&self, _ray: &Ray) -> Spectrum {
        self.sigma_t
    }

    fn properties(&self, _p: &Point3f) -> MediumProperties {
        MediumProperties::new(self.sigma_a, self.sigma_s, Spectrum::ZERO)
    }

    fn get_type(&self) -> &'static str {
        "homogeneous"
    }
}
