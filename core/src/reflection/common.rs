//! Common

use crate::base::*;
use crate::geometry::*;

/// Returns cos(θ) of a direction in the shading frame.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn cos_theta(w: &Vector3f) -> Float {
    w.z
}

/// Returns cos²(θ) of a direction in the shading frame.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn cos_2_theta(w: &Vector3f) -> Float {
    w.z * w.z
}

/// Returns |cos(θ)| of a direction in the shading frame.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn abs_cos_theta(w: &Vector3f) -> Float {
    abs(w.z)
}

/// Returns sin²(θ) of a direction in the shading frame.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn sin_2_theta(w: &Vector3f) -> Float {
    max(0.0, 1.0 - cos_2_theta(w))
}

/// Returns sin(θ) of a direction in the shading frame.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn sin_theta(w: &Vector3f) -> Float {
    sin_2_theta(w).sqrt()
}

/// Returns tan(θ) of a direction in the shading frame.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn tan_theta(w: &Vector3f) -> Float {
    sin_theta(w) / cos_theta(w)
}

/// Returns tan²(θ) of a direction in the shading frame.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn tan_2_theta(w: &Vector3f) -> Float {
    sin_2_theta(w) / cos_2_theta(w)
}

/// Returns cos(φ) of a direction in the shading frame.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn cos_phi(w: &Vector3f) -> Float {
    let sin_theta = sin_theta(w);
    if sin_theta == 0.0 {
        1.0
    } else {
        clamp(w.x / sin_theta, -1.0, 1.0)
    }
}

/// Returns sin(φ) of a direction in the shading frame.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn sin_phi(w: &Vector3f) -> Float {
    let sin_theta = sin_theta(w);
    if sin_theta == 0.0 {
        0.0
    } else {
        clamp(w.y / sin_theta, -1.0, 1.0)
    }
}

/// Returns cos²(φ) of a direction in the shading frame.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn cos_2_phi(w: &Vector3f) -> Float {
    cos_phi(w) * cos_phi(w)
}

/// Returns sin²(φ) of a direction in the shading frame.
///
/// * `w` - The direction vector.
#[inline(always)]
pub fn sin_2_phi(w: &Vector3f) -> Float {
    sin_phi(w) * sin_phi(w)
}

/// Returns true if two directions are in the same hemisphere of the shading frame.
///
/// * `w`  - First direction.
/// * `wp` - Second direction.
#[inline(always)]
pub fn same_hemisphere(w: &Vector3f, wp: &Vector3f) -> bool {
    w.z * wp.z > 0.0
}

/// Reflect a direction about a normal.
///
/// * `wo` - Direction to reflect.
/// * `n`  - The normal.
#[inline(always)]
pub fn reflect(wo: &Vector3f, n: &Vector3f) -> Vector3f {
    -(*wo) + *n * (2.0 * wo.dot(n))
}

/// Refract a direction through a normal; returns `None` on total internal
/// reflection.
///
/// * `wi`  - Incident direction.
/// * `n`   - Normal on the same side as `wi`.
/// * `eta` - Ratio of indices of refraction `eta_i / eta_t`.
pub fn refract(wi: &Vector3f, n: &Vector3f, eta: Float) -> Option<Vector3f> {
    let cos_theta_i = n.dot(wi);
    let sin2_theta_i = max(0.0, 1.0 - cos_theta_i * cos_theta_i);
    let sin2_theta_t = eta * eta * sin2_theta_i;
    if sin2_theta_t >= 1.0 {
        return None;
    }
    let cos_theta_t = (1.0 - sin2_theta_t).sqrt();
    Some(-(*wi) * eta + *n * (eta * cos_theta_i - cos_theta_t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn refract_obeys_snell() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let wi = Vector3f::new(0.6, 0.0, 0.8);
        let wt = refract(&wi, &n, 1.0 / 1.5).unwrap();
        assert!(approx_eq!(Float, wt.length(), 1.0, epsilon = 1e-5));
        assert!(approx_eq!(Float, sin_theta(&wt) * 1.5, sin_theta(&wi), epsilon = 1e-5));
        assert!(wt.z < 0.0);

        // Grazing from the dense side is totally reflected.
        assert!(refract(&wi, &n, 1.5).is_none());
    }

    #[test]
    fn reflect_keeps_angle() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let wo = Vector3f::new(0.3, -0.4, 0.866).normalize();
        let wr = reflect(&wo, &n);
        assert!(approx_eq!(Float, wr.z, wo.z, epsilon = 1e-6));
        assert!(approx_eq!(Float, wr.x, -wo.x, epsilon = 1e-6));
    }
}
