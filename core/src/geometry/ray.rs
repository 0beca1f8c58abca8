//! Rays

use super::*;
use crate::base::*;
use crate::medium::ArcMedium;
use std::fmt;

/// Auxiliary rays offset by one pixel in x and y on the film plane.
#[derive(Copy, Clone, Debug, Default)]
pub struct RayDifferential {
    /// Origin of ray offset in x-direction.
    pub rx_origin: Point3f,

    /// Origin of ray offset in y-direction.
    pub ry_origin: Point3f,

    /// Direction of ray offset in x-direction.
    pub rx_direction: Vector3f,

    /// Direction of ray offset in y-direction.
    pub ry_direction: Vector3f,
}

impl RayDifferential {
    /// Create a new ray differential.
    ///
    /// * `rx_origin`    - Origin of ray offset in x-direction.
    /// * `ry_origin`    - Origin of ray offset in y-direction.
    /// * `rx_direction` - Direction of ray offset in x-direction.
    /// * `ry_direction` - Direction of ray offset in y-direction.
    pub fn new(
        rx_origin: Point3f,
        ry_origin: Point3f,
        rx_direction: Vector3f,
        ry_direction: Vector3f,
    ) -> Self {
        Self {
            rx_origin,
            ry_origin,
            rx_direction,
            ry_direction,
        }
    }
}

/// A semi-infinite line restricted to the parametric interval `[t_min, t_max]`.
#[derive(Clone, Default)]
pub struct Ray {
    /// Origin.
    pub o: Point3f,

    /// Direction (unit length for rays spawned by the renderer).
    pub d: Vector3f,

    /// Start of the valid parametric range.
    pub t_min: Float,

    /// End of the valid parametric range.
    pub t_max: Float,

    /// Time value.
    pub time: Float,

    /// The medium containing the ray origin.
    pub medium: Option<ArcMedium>,

    /// Optional differentials; used for texture filtering only.
    pub differentials: Option<RayDifferential>,
}

impl Ray {
    /// Create a new ray starting at `t = 0`.
    ///
    /// * `o`      - Origin.
    /// * `d`      - Direction.
    /// * `t_max`  - Maximum extent of the ray.
    /// * `time`   - Time value.
    /// * `medium` - The medium containing the ray origin.
    pub fn new(o: Point3f, d: Vector3f, t_max: Float, time: Float, medium: Option<ArcMedium>) -> Self {
        Self {
            o,
            d,
            t_min: 0.0,
            t_max,
            time,
            medium,
            differentials: None,
        }
    }

    /// Returns the position along the ray at parameter `t`.
    ///
    /// * `t` - The parameter.
    pub fn at(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }

    /// Returns `true` if the valid interval is empty; such rays never hit
    /// anything.
    pub fn is_degenerate(&self) -> bool {
        !(self.t_min < self.t_max)
    }

    /// Scale the differential rays by a given amount.
    ///
    /// * `s` - The scale factor.
    pub fn scale_differentials(&mut self, s: Float) {
        if let Some(rd) = self.differentials.as_mut() {
            rd.rx_origin = self.o + (rd.rx_origin - self.o) * s;
            rd.ry_origin = self.o + (rd.ry_origin - self.o) * s;
            rd.rx_direction = self.d + (rd.rx_direction - self.d) * s;
            rd.ry_direction = self.d + (rd.ry_direction - self.d) * s;
        }
    }
}

impl fmt::Display for Ray {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[o={}, d={}, t=[{}, {}], time={}]",
            self.o, self.d, self.t_min, self.t_max, self.time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_interval() {
        let mut ray = Ray::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), 1.0, 0.0, None);
        assert!(!ray.is_degenerate());
        ray.t_min = 1.0;
        assert!(ray.is_degenerate());
        ray.t_max = Float::NAN;
        assert!(ray.is_degenerate());
    }

    #[test]
    fn at_moves_along_direction() {
        let ray = Ray::new(Point3f::new(1.0, 2.0, 3.0), Vector3f::new(0.0, 1.0, 0.0), INFINITY, 0.0, None);
        assert_eq!(ray.at(2.0), Point3f::new(1.0, 4.0, 3.0));
    }
}
