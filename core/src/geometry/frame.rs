//! Orthonormal Frames

use super::*;
use crate::base::*;

/// An orthonormal basis used to move directions between world space and a
/// local shading space where `n` is the +z axis.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Frame {
    /// First tangent.
    pub s: Vector3f,

    /// Second tangent.
    pub t: Vector3f,

    /// Normal.
    pub n: Vector3f,
}

impl Frame {
    /// Create a frame from three orthonormal vectors.
    ///
    /// * `s` - First tangent.
    /// * `t` - Second tangent.
    /// * `n` - Normal.
    pub fn new(s: Vector3f, t: Vector3f, n: Vector3f) -> Self {
        Self { s, t, n }
    }

    /// Create a frame around a unit normal with arbitrary tangents.
    ///
    /// * `n` - The unit normal.
    pub fn from_normal(n: &Normal3f) -> Self {
        let n = Vector3f::from(*n);
        let (s, t) = coordinate_system(&n);
        Self { s, t, n }
    }

    /// Create a frame around a unit normal whose first tangent follows `dpdu`
    /// as closely as possible.
    ///
    /// * `n`    - The unit normal.
    /// * `dpdu` - Surface tangent.
    pub fn from_normal_tangent(n: &Normal3f, dpdu: &Vector3f) -> Self {
        let nv = Vector3f::from(*n);
        let s = *dpdu - nv * nv.dot(dpdu);
        if s.length_squared() < 1e-12 || s.has_nans() {
            Self::from_normal(n)
        } else {
            let s = s.normalize();
            let t = nv.cross(&s);
            Self { s, t, n: nv }
        }
    }

    /// Convert a world space direction into the local frame.
    ///
    /// * `v` - World space direction.
    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.s), v.dot(&self.t), v.dot(&self.n))
    }

    /// Convert a local direction into world space.
    ///
    /// * `v` - Local direction.
    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        self.s * v.x + self.t * v.y + self.n * v.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn local_world_round_trip() {
        let n = Normal3f::new(1.0, 2.0, -0.5).normalize();
        let frame = Frame::from_normal_tangent(&n, &Vector3f::new(1.0, 0.0, 0.0));
        let v = Vector3f::new(0.3, -0.2, 0.9).normalize();
        let local = frame.to_local(&v);
        let back = frame.to_world(&local);
        assert!(approx_eq!(Float, back.x, v.x, epsilon = 1e-5));
        assert!(approx_eq!(Float, back.y, v.y, epsilon = 1e-5));
        assert!(approx_eq!(Float, back.z, v.z, epsilon = 1e-5));
        assert!(approx_eq!(Float, frame.to_local(&Vector3f::from(n)).z, 1.0, epsilon = 1e-5));
    }
}
