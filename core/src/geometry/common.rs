//! Common geometry functions

use super::{Normal3, Normal3f, Vector3, Vector3f};
use crate::base::*;

/// Dot product.
pub trait Dot<V> {
    /// Output type of the product.
    type Output;

    /// Returns the dot product.
    ///
    /// * `other` - The other operand.
    fn dot(&self, other: &V) -> Self::Output;

    /// Returns the absolute value of the dot product.
    ///
    /// * `other` - The other operand.
    fn abs_dot(&self, other: &V) -> Self::Output;
}

macro_rules! impl_dot {
    ($a: ident, $b: ident) => {
        impl<T: num_traits::Float> Dot<$b<T>> for $a<T> {
            type Output = T;

            fn dot(&self, other: &$b<T>) -> T {
                self.x * other.x + self.y * other.y + self.z * other.z
            }

            fn abs_dot(&self, other: &$b<T>) -> T {
                self.dot(other).abs()
            }
        }
    };
}

impl_dot!(Vector3, Vector3);
impl_dot!(Vector3, Normal3);
impl_dot!(Normal3, Vector3);
impl_dot!(Normal3, Normal3);

/// Construct an orthonormal basis from a single unit vector and returns the
/// two other vectors.
///
/// * `v1` - The unit vector.
pub fn coordinate_system(v1: &Vector3f) -> (Vector3f, Vector3f) {
    let v2 = if v1.x.abs() > v1.y.abs() {
        Vector3f::new(-v1.z, 0.0, v1.x) / (v1.x * v1.x + v1.z * v1.z).sqrt()
    } else {
        Vector3f::new(0.0, v1.z, -v1.y) / (v1.y * v1.y + v1.z * v1.z).sqrt()
    };
    let v3 = v1.cross(&v2);
    (v2, v3)
}

/// Converts a pair of spherical angles to a unit direction (z-up).
///
/// * `sin_theta` - Sine of the polar angle.
/// * `cos_theta` - Cosine of the polar angle.
/// * `phi`       - The azimuth.
#[inline(always)]
pub fn spherical_direction(sin_theta: Float, cos_theta: Float, phi: Float) -> Vector3f {
    Vector3f::new(
        clamp(sin_theta, -1.0, 1.0) * phi.cos(),
        clamp(sin_theta, -1.0, 1.0) * phi.sin(),
        clamp(cos_theta, -1.0, 1.0),
    )
}

/// Returns the polar angle of a unit vector.
///
/// * `v` - The vector.
#[inline(always)]
pub fn spherical_theta(v: &Vector3f) -> Float {
    safe_acos(v.z)
}

/// Returns the azimuth of a vector in `[0, 2π)`.
///
/// * `v` - The vector.
#[inline(always)]
pub fn spherical_phi(v: &Vector3f) -> Float {
    let p = v.y.atan2(v.x);
    if p < 0.0 {
        p + TWO_PI
    } else {
        p
    }
}

/// Flips a normal into the hemisphere of a vector.
///
/// * `n` - The normal.
/// * `v` - The vector.
#[inline(always)]
pub fn face_forward(n: &Normal3f, v: &Vector3f) -> Normal3f {
    n.face_forward(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn coordinate_system_is_orthonormal(
            x in -1.0..1.0f32, y in -1.0..1.0f32, z in -1.0..1.0f32,
        ) {
            let v = Vector3f::new(x, y, z);
            prop_assume!(v.length() > 0.01);
            let v1 = v.normalize();
            let (v2, v3) = coordinate_system(&v1);
            prop_assert!(approx_eq!(Float, v1.dot(&v2), 0.0, epsilon = 1e-5));
            prop_assert!(approx_eq!(Float, v1.dot(&v3), 0.0, epsilon = 1e-5));
            prop_assert!(approx_eq!(Float, v2.dot(&v3), 0.0, epsilon = 1e-5));
            prop_assert!(approx_eq!(Float, v2.length(), 1.0, epsilon = 1e-5));
            prop_assert!(approx_eq!(Float, v3.length(), 1.0, epsilon = 1e-5));
        }

        #[test]
        fn spherical_round_trip(theta in 0.01..3.1f32, phi in 0.01..6.2f32) {
            let v = spherical_direction(theta.sin(), theta.cos(), phi);
            prop_assert!(approx_eq!(Float, spherical_theta(&v), theta, epsilon = 1e-3));
            prop_assert!(approx_eq!(Float, spherical_phi(&v), phi, epsilon = 1e-3));
        }
    }
}
