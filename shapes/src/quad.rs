//! Quads

use rad_core::base::*;
use rad_core::error::*;
use rad_core::geometry::*;
use rad_core::interaction::*;
use rad_core::medium::MediumInterface;

/// A parallelogram spanned by two edges from a corner.
#[derive(Clone, Debug)]
pub struct Quad {
    /// Corner at uv = (0, 0).
    pub origin: Point3f,

    /// Edge along u.
    pub edge_u: Vector3f,

    /// Edge along v.
    pub edge_v: Vector3f,

    /// Unit normal; `edge_u × edge_v` unless reversed.
    pub n: Normal3f,

    /// Cached `edge_u × edge_v`.
    cross: Vector3f,
}

impl Quad {
    /// Create a new quad.
    ///
    /// * `origin`              - Corner at uv = (0, 0).
    /// * `edge_u`              - Edge along u.
    /// * `edge_v`              - Edge along v.
    /// * `reverse_orientation` - Flip the normal.
    pub fn new(origin: Point3f, edge_u: Vector3f, edge_v: Vector3f, reverse_orientation: bool) -> Result<Self> {
        let cross = edge_u.cross(&edge_v);
        if !(cross.length_squared() > 0.0) {
            return Err(Error::InvalidArgument("quad edges are parallel".to_string()));
        }
        let n = Normal3f::from(cross.normalize());
        Ok(Self {
            origin,
            edge_u,
            edge_v,
            n: if reverse_orientation { -n } else { n },
            cross,
        })
    }

    /// Returns the ray parameter and surface coordinates of a hit.
    fn hit_uv(&self, ray: &Ray) -> Option<(Float, Point2f)> {
        let denom = self.cross.dot(&ray.d);
        if denom == 0.0 {
            return None;
        }
        let t = self.cross.dot(&(self.origin - ray.o)) / denom;
        if !(t > ray.t_min && t < ray.t_max) {
            return None;
        }

        // Solve for the parallelogram coordinates of the plane hit.
        let w = ray.at(t) - self.origin;
        let inv = 1.0 / self.cross.length_squared();
        let u = w.cross(&self.edge_v).dot(&self.cross) * inv;
        let v = self.edge_u.cross(&w).dot(&self.cross) * inv;
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return None;
        }
        Some((t, Point2f::new(u, v)))
    }
}

impl Shape for Quad {
    fn get_type(&self) -> &'static str {
        "quad"
    }

    fn world_bound(&self) -> Bounds3f {
        Bounds3f::new(self.origin, self.origin + self.edge_u)
            .union_point(&(self.origin + self.edge_v))
            .union_point(&(self.origin + self.edge_u + self.edge_v))
    }

    fn intersect(&self, ray: &Ray) -> Option<SurfaceInteraction> {
        let (t, uv) = self.hit_uv(ray)?;
        let p = self.origin + self.edge_u * uv.x + self.edge_v * uv.y;
        let mut si = SurfaceInteraction::new(p, self.n, uv, -ray.d, self.edge_u, self.edge_v, ray.time);
        si.hit.t = t;
        Some(si)
    }

    fn intersect_p(&self, ray: &Ray) -> bool {
        self.hit_uv(ray).is_some()
    }

    fn area(&self) -> Float {
        self.cross.length()
    }

    fn sample_area(&self, u: &Point2f) -> ShapeSample {
        let p = self.origin + self.edge_u * u.x + self.edge_v * u.y;
        ShapeSample {
            hit: Hit::new(p, 0.0, Vector3f::ZERO, self.n, MediumInterface::vacuum()),
            uv: *u,
            pdf: 1.0 / self.area(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn floor() -> Quad {
        Quad::new(
            Point3f::new(-1.0, -1.0, 0.0),
            Vector3f::new(2.0, 0.0, 0.0),
            Vector3f::new(0.0, 2.0, 0.0),
            false,
        )
        .unwrap()
    }

    #[test]
    fn parallel_edges_are_rejected() {
        let e = Vector3f::new(1.0, 0.0, 0.0);
        assert!(Quad::new(Point3f::ZERO, e, e * 2.0, false).is_err());
    }

    #[test]
    fn hit_inside_and_miss_outside() {
        let quad = floor();
        let ray = Ray::new(Point3f::new(0.5, 0.25, 2.0), Vector3f::new(0.0, 0.0, -1.0), INFINITY, 0.0, None);
        let si = quad.intersect(&ray).unwrap();
        assert!(approx_eq!(Float, si.hit.t, 2.0, epsilon = 1e-6));
        assert!(approx_eq!(Float, si.uv.x, 0.75, epsilon = 1e-6));
        assert!(approx_eq!(Float, si.uv.y, 0.625, epsilon = 1e-6));
        assert!(approx_eq!(Float, si.hit.n.z, 1.0, epsilon = 1e-6));

        let ray = Ray::new(Point3f::new(1.5, 0.0, 2.0), Vector3f::new(0.0, 0.0, -1.0), INFINITY, 0.0, None);
        assert!(!quad.intersect_p(&ray));
    }

    #[test]
    fn area_and_bounds() {
        let quad = floor();
        assert!(approx_eq!(Float, quad.area(), 4.0, epsilon = 1e-6));
        let b = quad.world_bound();
        assert_eq!(b.p_min, Point3f::new(-1.0, -1.0, 0.0));
        assert_eq!(b.p_max, Point3f::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn reversed_quad_points_down() {
        let quad = Quad::new(
            Point3f::ZERO,
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            true,
        )
        .unwrap();
        assert_eq!(quad.sample_area(&Point2f::new(0.5, 0.5)).hit.n.z, -1.0);
    }
}
