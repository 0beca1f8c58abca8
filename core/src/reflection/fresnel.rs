//! Fresnel

use crate::base::*;
use crate::spectrum::*;
use std::mem::swap;

/// Returns the fresnel reflection for dielectric materials and unpolarized light.
///
/// * `cos_theta_i` - cos(θi) for angle between incident direction and geometric
///                   surface normal.
/// * `eta_i`       - index of refraction for medium that incident ray is in.
/// * `eta_t`       - index of refraction for medium that incident ray is entering.
pub fn fr_dielectric(cos_theta_i: Float, eta_i: Float, eta_t: Float) -> Float {
    let mut cos_theta_i = clamp(cos_theta_i, -1.0, 1.0);
    let mut eta_i = eta_i;
    let mut eta_t = eta_t;

    // Potentially swap indices of refraction.
    let entering = cos_theta_i > 0.0;
    if !entering {
        swap(&mut eta_i, &mut eta_t);
        cos_theta_i = abs(cos_theta_i);
    }

    // Compute _cosThetaT_ using Snell's law.
    let sin_theta_i = max(0.0, 1.0 - cos_theta_i * cos_theta_i).sqrt();
    let sin_theta_t = eta_i / eta_t * sin_theta_i;

    // Handle total internal reflection.
    if sin_theta_t >= 1.0 {
        1.0
    } else {
        let cos_theta_t = max(0.0, 1.0 - sin_theta_t * sin_theta_t).sqrt();
        let r_parl = ((eta_t * cos_theta_i) - (eta_i * cos_theta_t))
            / ((eta_t * cos_theta_i) + (eta_i * cos_theta_t));
        let r_perp = ((eta_i * cos_theta_i) - (eta_t * cos_theta_t))
            / ((eta_i * cos_theta_i) + (eta_t * cos_theta_t));
        (r_parl * r_parl + r_perp * r_perp) / 2.0
    }
}

/// Returns the Fresnel reflection at the boundary between a conductor and
/// dielectric medium for unpolarized light.
///
/// * `cos_theta_i` - cos(θi) for angle between incident direction and geometric
///                   surface normal on the same side as incident direction `wi`.
/// * `eta_i`       - Index of refraction for medium that incident ray is in.
/// * `eta_t`       - Index of refraction for medium that incident ray is entering.
/// * `k`           - The absorption coefficient.
pub fn fr_conductor(cos_theta_i: Float, eta_i: Spectrum, eta_t: Spectrum, k: Spectrum) -> Spectrum {
    let cos_theta_i = clamp(cos_theta_i, -1.0, 1.0);
    let eta = eta_t / eta_i;
    let eta_k = k / eta_i;

    let cos_theta_i_2 = cos_theta_i * cos_theta_i;
    let sin_theta_i_2 = 1.0 - cos_theta_i_2;
    let eta_2 = eta * eta;
    let eta_k_2 = eta_k * eta_k;

    let t0 = eta_2 - eta_k_2 - Spectrum::new(sin_theta_i_2);
    let a2_plus_b2 = (t0 * t0 + 4.0 * eta_2 * eta_k_2).sqrt();
    let t1 = a2_plus_b2 + Spectrum::new(cos_theta_i_2);
    let a = (0.5 * (a2_plus_b2 + t0)).sqrt();
    let t2 = 2.0 * cos_theta_i * a;
    let rs = (t1 - t2) / (t1 + t2);

    let t3 = cos_theta_i_2 * a2_plus_b2 + Spectrum::new(sin_theta_i_2 * sin_theta_i_2);
    let t4 = t2 * sin_theta_i_2;
    let rp = rs * (t3 - t4) / (t3 + t4);

    0.5 * (rp + rs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn dielectric_normal_incidence() {
        // ((1 - 1.5) / (1 + 1.5))^2
        assert!(approx_eq!(Float, fr_dielectric(1.0, 1.0, 1.5), 0.04, epsilon = 1e-6));
        assert!(approx_eq!(Float, fr_dielectric(-1.0, 1.0, 1.5), 0.04, epsilon = 1e-6));
    }

    #[test]
    fn total_internal_reflection() {
        assert_eq!(fr_dielectric(-0.1, 1.0, 1.5), 1.0);
    }

    #[test]
    fn conductor_normal_incidence() {
        let eta = Spectrum::new(0.2);
        let k = Spectrum::new(3.0);
        let f = fr_conductor(1.0, Spectrum::ONE, eta, k);
        // ((n - 1)^2 + k^2) / ((n + 1)^2 + k^2)
        let expected = (0.64 + 9.0) / (1.44 + 9.0);
        assert!(approx_eq!(Float, f[0], expected, epsilon = 1e-4));
    }

    proptest! {
        #[test]
        fn dielectric_in_unit_interval(c in -1.0..1.0f32, eta in 1.0..3.0f32) {
            let f = fr_dielectric(c, 1.0, eta);
            prop_assert!((0.0..=1.0).contains(&f));
        }
    }
}
