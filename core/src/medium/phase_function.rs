//! Phase Function

use crate::base::*;
use crate::geometry::*;
use std::fmt;

/// Models scattering properties in volumetric media. Directions are in world
/// space and `wo` points back along the incoming path.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PhaseFunction {
    /// Scatters equally in all directions.
    Isotropic,

    /// Henyey-Greenstein lobe with asymmetry parameter `g` in (-1, 1).
    HenyeyGreenstein(Float),
}

impl PhaseFunction {
    /// Returns a Henyey-Greenstein phase function, or the isotropic one when
    /// `g` is zero.
    ///
    /// * `g` - The asymmetry parameter.
    pub fn new(g: Float) -> Self {
        if g == 0.0 {
            Self::Isotropic
        } else {
            Self::HenyeyGreenstein(clamp(g, -0.999, 0.999))
        }
    }

    /// Returns the value of the phase function for the given pair of directions.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn p(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        match self {
            Self::Isotropic => INV_FOUR_PI,
            Self::HenyeyGreenstein(g) => phase_hg(wo.dot(wi), *g),
        }
    }

    /// Returns the phase function value (equal to its pdf) and a sampled
    /// incident direction.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - Sample value in [0, 1)^2.
    pub fn sample_p(&self, wo: &Vector3f, u: &Point2f) -> (Float, Vector3f) {
        let g = match self {
            Self::Isotropic => 0.0,
            Self::HenyeyGreenstein(g) => *g,
        };

        // Cosine between `wo` and `wi`.
        let cos_theta = if abs(g) < 1e-3 {
            1.0 - 2.0 * u[0]
        } else {
            let sqr_term = (1.0 - g * g) / (1.0 + g - 2.0 * g * u[0]);
            -(1.0 + g * g - sqr_term * sqr_term) / (2.0 * g)
        };

        let sin_theta = safe_sqrt(1.0 - cos_theta * cos_theta);
        let phi = TWO_PI * u[1];
        let frame = Frame::from_normal(&Normal3f::from(*wo));
        let wi = frame.to_world(&spherical_direction(sin_theta, cos_theta, phi));
        (self.p(wo, &wi), wi)
    }
}

impl fmt::Display for PhaseFunction {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Isotropic => write!(f, "[PhaseFunction isotropic]"),
            Self::HenyeyGreenstein(g) => write!(f, "[PhaseFunction hg g: {g}]"),
        }
    }
}

/// Computes the Henyey-Greenstein phase function.
///
/// * `cos_theta` - Cosine of the angle between `wo` and `wi`.
/// * `g`         - Asymmetry parameter.
#[inline]
pub fn phase_hg(cos_theta: Float, g: Float) -> Float {
    let denom = 1.0 + g * g + 2.0 * g * cos_theta;
    INV_FOUR_PI * (1.0 - g * g) / (denom * denom.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn hg_integrates_to_one() {
        for g in [-0.7, 0.0, 0.3, 0.9] {
            let n = 20000;
            let sum: Float = (0..n)
                .map(|i| {
                    let mu = -1.0 + 2.0 * (i as Float + 0.5) / n as Float;
                    phase_hg(mu, g) * TWO_PI * 2.0 / n as Float
                })
                .sum();
            assert!(approx_eq!(Float, sum, 1.0, epsilon = 1e-3), "g={g} sum={sum}");
        }
    }

    #[test]
    fn forward_scattering_continues_the_path() {
        let phase = PhaseFunction::new(0.9);
        let wo = Vector3f::new(0.0, 0.0, -1.0);
        // `wi` pointing away from `wo` keeps the ray going.
        assert!(phase.p(&wo, &Vector3f::new(0.0, 0.0, 1.0)) > phase.p(&wo, &wo));
    }

    proptest! {
        #[test]
        fn sampled_value_matches_p(u0 in 0.0..1.0f32, u1 in 0.0..1.0f32, g in -0.9..0.9f32) {
            let phase = PhaseFunction::new(g);
            let wo = Vector3f::new(0.3, -0.5, 0.8).normalize();
            let (p, wi) = phase.sample_p(&wo, &Point2f::new(u0, u1));
            prop_assert!(p > 0.0);
            prop_assert!(approx_eq!(Float, wi.length(), 1.0, epsilon = 1e-4));
            prop_assert!(approx_eq!(Float, p, phase.p(&wo, &wi), epsilon = 1e-2 * p.max(1.0)));
        }
    }
}
