//! Transformations

use super::*;
use crate::base::*;
use crate::error::*;
use std::ops::Mul;

/// An affine or projective transformation along with its inverse.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Transform {
    /// The transformation matrix.
    pub m: Matrix4x4,

    /// The inverse of the transformation matrix.
    pub m_inv: Matrix4x4,
}

impl Transform {
    /// Create a transformation from a matrix; fails if the matrix is singular.
    ///
    /// * `m` - The matrix.
    pub fn new(m: Matrix4x4) -> Result<Self> {
        let m_inv = m
            .inverse()
            .ok_or_else(|| Error::InvalidArgument(format!("singular transformation matrix {m:?}")))?;
        Ok(Self { m, m_inv })
    }

    /// Create a transformation from a matrix and its known inverse.
    ///
    /// * `m`     - The matrix.
    /// * `m_inv` - Its inverse.
    pub fn from_matrices(m: Matrix4x4, m_inv: Matrix4x4) -> Self {
        Self { m, m_inv }
    }

    /// Returns the identity transformation.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Returns the inverse transformation.
    pub fn inverse(&self) -> Self {
        Self {
            m: self.m_inv,
            m_inv: self.m,
        }
    }

    /// Returns a translation.
    ///
    /// * `delta` - Displacement.
    #[rustfmt::skip]
    pub fn translate(delta: &Vector3f) -> Self {
        let m = Matrix4x4::new([
            [1.0, 0.0, 0.0, delta.x],
            [0.0, 1.0, 0.0, delta.y],
            [0.0, 0.0, 1.0, delta.z],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let m_inv = Matrix4x4::new([
            [1.0, 0.0, 0.0, -delta.x],
            [0.0, 1.0, 0.0, -delta.y],
            [0.0, 0.0, 1.0, -delta.z],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        Self { m, m_inv }
    }

    /// Returns a scale; fails if any factor is zero.
    ///
    /// * `x` - Scale along x.
    /// * `y` - Scale along y.
    /// * `z` - Scale along z.
    #[rustfmt::skip]
    pub fn scale(x: Float, y: Float, z: Float) -> Result<Self> {
        if x == 0.0 || y == 0.0 || z == 0.0 {
            return Err(Error::InvalidArgument(format!("degenerate scale ({x}, {y}, {z})")));
        }
        let m = Matrix4x4::new([
            [x,   0.0, 0.0, 0.0],
            [0.0, y,   0.0, 0.0],
            [0.0, 0.0, z,   0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let m_inv = Matrix4x4::new([
            [1.0 / x, 0.0,     0.0,     0.0],
            [0.0,     1.0 / y, 0.0,     0.0],
            [0.0,     0.0,     1.0 / z, 0.0],
            [0.0,     0.0,     0.0,     1.0],
        ]);
        Ok(Self { m, m_inv })
    }

    /// Returns a rotation of `theta` degrees about an axis.
    ///
    /// * `theta` - Angle in degrees.
    /// * `axis`  - Rotation axis.
    pub fn rotate(theta: Float, axis: &Vector3f) -> Self {
        let a = axis.normalize();
        let sin_theta = radians(theta).sin();
        let cos_theta = radians(theta).cos();

        let mut m = IDENTITY_MATRIX;
        m.m[0][0] = a.x * a.x + (1.0 - a.x * a.x) * cos_theta;
        m.m[0][1] = a.x * a.y * (1.0 - cos_theta) - a.z * sin_theta;
        m.m[0][2] = a.x * a.z * (1.0 - cos_theta) + a.y * sin_theta;
        m.m[1][0] = a.x * a.y * (1.0 - cos_theta) + a.z * sin_theta;
        m.m[1][1] = a.y * a.y + (1.0 - a.y * a.y) * cos_theta;
        m.m[1][2] = a.y * a.z * (1.0 - cos_theta) - a.x * sin_theta;
        m.m[2][0] = a.x * a.z * (1.0 - cos_theta) - a.y * sin_theta;
        m.m[2][1] = a.y * a.z * (1.0 - cos_theta) + a.x * sin_theta;
        m.m[2][2] = a.z * a.z + (1.0 - a.z * a.z) * cos_theta;

        Self {
            m,
            m_inv: m.transpose(),
        }
    }

    /// Returns the left-handed world-to-camera transformation for a viewer
    /// at `pos` looking at `look`.
    ///
    /// * `pos`  - Camera position.
    /// * `look` - Point the camera looks at.
    /// * `up`   - Up vector.
    pub fn look_at(pos: &Point3f, look: &Point3f, up: &Vector3f) -> Result<Self> {
        let dir = (*look - *pos).normalize();
        let right = up.normalize().cross(&dir);
        if right.length() == 0.0 || right.has_nans() {
            return Err(Error::InvalidArgument(format!(
                "up vector {up} and viewing direction {dir} passed to look_at are pointing in the same direction"
            )));
        }
        let right = right.normalize();
        let new_up = dir.cross(&right);

        let camera_to_world = Matrix4x4::new([
            [right.x, new_up.x, dir.x, pos.x],
            [right.y, new_up.y, dir.y, pos.y],
            [right.z, new_up.z, dir.z, pos.z],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let world_to_camera = camera_to_world
            .inverse()
            .ok_or_else(|| Error::InvalidArgument("singular look_at matrix".to_string()))?;
        Ok(Self::from_matrices(world_to_camera, camera_to_world))
    }

    /// Returns a perspective projection with the given field of view.
    ///
    /// * `fov` - Field of view in degrees.
    /// * `n`   - Near plane distance.
    /// * `f`   - Far plane distance.
    pub fn perspective(fov: Float, n: Float, f: Float) -> Result<Self> {
        let persp = Matrix4x4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, f / (f - n), -f * n / (f - n)],
            [0.0, 0.0, 1.0, 0.0],
        ]);
        let inv_tan_ang = 1.0 / (radians(fov) / 2.0).tan();
        Ok(Self::scale(inv_tan_ang, inv_tan_ang, 1.0)? * Self::new(persp)?)
    }

    /// Apply the transformation to a point.
    ///
    /// * `p` - The point.
    pub fn transform_point(&self, p: &Point3f) -> Point3f {
        let m = &self.m.m;
        let xp = m[0][0] * p.x + m[0][1] * p.y + m[0][2] * p.z + m[0][3];
        let yp = m[1][0] * p.x + m[1][1] * p.y + m[1][2] * p.z + m[1][3];
        let zp = m[2][0] * p.x + m[2][1] * p.y + m[2][2] * p.z + m[2][3];
        let wp = m[3][0] * p.x + m[3][1] * p.y + m[3][2] * p.z + m[3][3];
        if wp == 1.0 {
            Point3f::new(xp, yp, zp)
        } else {
            Point3f::new(xp, yp, zp) / wp
        }
    }

    /// Apply the transformation to a vector.
    ///
    /// * `v` - The vector.
    pub fn transform_vector(&self, v: &Vector3f) -> Vector3f {
        let m = &self.m.m;
        Vector3f::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    /// Apply the transformation to a normal using the inverse transpose.
    ///
    /// * `n` - The normal.
    pub fn transform_normal(&self, n: &Normal3f) -> Normal3f {
        let mi = &self.m_inv.m;
        Normal3f::new(
            mi[0][0] * n.x + mi[1][0] * n.y + mi[2][0] * n.z,
            mi[0][1] * n.x + mi[1][1] * n.y + mi[2][1] * n.z,
            mi[0][2] * n.x + mi[1][2] * n.y + mi[2][2] * n.z,
        )
    }

    /// Apply the transformation to a ray; the parametric range is kept.
    ///
    /// * `r` - The ray.
    pub fn transform_ray(&self, r: &Ray) -> Ray {
        let mut ray = r.clone();
        ray.o = self.transform_point(&r.o);
        ray.d = self.transform_vector(&r.d);
        if let Some(rd) = r.differentials {
            ray.differentials = Some(RayDifferential::new(
                self.transform_point(&rd.rx_origin),
                self.transform_point(&rd.ry_origin),
                self.transform_vector(&rd.rx_direction),
                self.transform_vector(&rd.ry_direction),
            ));
        }
        ray
    }

    /// Returns true if the transformation flips coordinate system handedness.
    pub fn swaps_handedness(&self) -> bool {
        let m = &self.m.m;
        let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);
        det < 0.0
    }
}

impl Mul for Transform {
    type Output = Transform;

    /// Compose two transformations; `a * b` applies `b` first.
    ///
    /// * `other` - The transformation applied first.
    fn mul(self, other: Self) -> Self::Output {
        Transform {
            m: self.m * other.m,
            m_inv: other.m_inv * self.m_inv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn singular_matrix_is_rejected() {
        let mut m = IDENTITY_MATRIX;
        m.m[2][2] = 0.0;
        assert!(matches!(Transform::new(m), Err(Error::InvalidArgument(_))));
        assert!(Transform::scale(1.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn look_at_is_left_handed() {
        let pos = Point3f::new(0.0, 0.0, -5.0);
        let t = Transform::look_at(&pos, &Point3f::ZERO, &Vector3f::new(0.0, 1.0, 0.0)).unwrap();
        let camera_to_world = t.inverse();

        // Camera +z looks at the target, +x is to the right of the viewer.
        let d = camera_to_world.transform_vector(&Vector3f::new(0.0, 0.0, 1.0));
        assert!(approx_eq!(Float, d.z, 1.0, epsilon = 1e-6));
        let x = camera_to_world.transform_vector(&Vector3f::new(1.0, 0.0, 0.0));
        assert!(approx_eq!(Float, x.x, 1.0, epsilon = 1e-6));
        let o = camera_to_world.transform_point(&Point3f::ZERO);
        assert!(approx_eq!(Float, o.z, -5.0, epsilon = 1e-6));
    }

    #[test]
    fn look_at_rejects_parallel_up() {
        let r = Transform::look_at(&Point3f::ZERO, &Point3f::new(0.0, 1.0, 0.0), &Vector3f::new(0.0, 1.0, 0.0));
        assert!(r.is_err());
    }

    #[test]
    fn normals_stay_perpendicular() {
        let t = Transform::scale(2.0, 1.0, 0.5).unwrap() * Transform::rotate(30.0, &Vector3f::new(1.0, 1.0, 0.0));
        let v = Vector3f::new(1.0, -1.0, 0.0);
        let n = Normal3f::new(0.0, 0.0, 1.0);
        assert!(approx_eq!(Float, Vector3f::from(n).dot(&v), 0.0, epsilon = 1e-6));
        let tv = t.transform_vector(&v);
        let tn = t.transform_normal(&n);
        assert!(approx_eq!(Float, tn.dot(&tv), 0.0, epsilon = 1e-5));
    }
}
