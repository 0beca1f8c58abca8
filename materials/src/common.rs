//! Common

use rad_core::base::*;
use rad_core::error::*;
use rad_core::geometry::*;

/// Returns the half vector for a pair of directions on the same side of the
/// surface, oriented to the upper hemisphere.
///
/// * `wi` - Incident direction.
/// * `wo` - Outgoing direction.
pub(crate) fn reflection_half_vector(wi: &Vector3f, wo: &Vector3f) -> Option<Vector3f> {
    let wh = *wi + *wo;
    if wh.length_squared() == 0.0 {
        return None;
    }
    let wh = wh.normalize();
    Some(if wh.z < 0.0 { -wh } else { wh })
}

/// Returns the generalized half vector for a refracted pair of directions,
/// oriented to the upper hemisphere.
///
/// * `wi`  - Incident direction.
/// * `wo`  - Outgoing direction on the other side.
/// * `eta` - Index of refraction on the side of `wo` relative to `wi`.
pub(crate) fn refraction_half_vector(wi: &Vector3f, wo: &Vector3f, eta: Float) -> Option<Vector3f> {
    let wh = *wi + *wo * eta;
    if wh.length_squared() == 0.0 {
        return None;
    }
    let wh = wh.normalize();
    Some(if wh.z < 0.0 { -wh } else { wh })
}

/// Returns true if both directions see the front of the microfacet, taking
/// the side of the macro surface into account.
///
/// * `wh` - Microfacet normal in the upper hemisphere.
/// * `wi` - Incident direction.
/// * `wo` - Outgoing direction.
pub(crate) fn microfacet_visible(wh: &Vector3f, wi: &Vector3f, wo: &Vector3f) -> bool {
    wh.dot(wi) * wi.z > 0.0 && wh.dot(wo) * wo.z > 0.0
}

/// Validates a relative index of refraction.
///
/// * `eta` - Index of refraction.
pub(crate) fn check_eta(eta: Float) -> Result<Float> {
    if eta > 0.0 && eta.is_finite() {
        Ok(eta)
    } else {
        Err(Error::InvalidArgument(format!("invalid index of refraction {eta}")))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rad_core::interaction::SurfaceInteraction;

    /// Returns an interaction whose incoming direction is `wi`.
    pub fn interaction(wi: Vector3f) -> SurfaceInteraction {
        let mut si = SurfaceInteraction::default();
        si.wi = wi.normalize();
        si
    }

    /// ∫ f(θ, φ) sin θ dθ dφ over the sphere with the midpoint rule.
    pub fn integrate_sphere<F: Fn(&Vector3f) -> Float>(f: F) -> Float {
        let (nt, np) = (1024, 256);
        let dt = PI / nt as Float;
        let dp = TWO_PI / np as Float;
        let mut sum = 0.0_f64;
        for i in 0..nt {
            let theta = (i as Float + 0.5) * dt;
            for j in 0..np {
                let phi = (j as Float + 0.5) * dp;
                let w = spherical_direction(theta.sin(), theta.cos(), phi);
                sum += (f(&w) * theta.sin() * dt * dp) as f64;
            }
        }
        sum as Float
    }

    #[test]
    fn half_vectors_point_up() {
        let wi = Vector3f::new(0.3, 0.0, -0.9).normalize();
        let wo = Vector3f::new(-0.3, 0.0, -0.9).normalize();
        let wh = reflection_half_vector(&wi, &wo).unwrap();
        assert!(wh.z > 0.0);
        assert!(reflection_half_vector(&wi, &-wi).is_none());
        assert!(check_eta(0.0).is_err());
    }
}
