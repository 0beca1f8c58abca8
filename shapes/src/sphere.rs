//! Spheres

use rad_core::base::*;
use rad_core::error::*;
use rad_core::geometry::*;
use rad_core::interaction::*;
use rad_core::medium::MediumInterface;
use rad_core::sampling::*;

/// Solid angles below this use a Taylor expansion when sampling the cone of
/// directions subtended by the sphere.
const SMALL_SIN2_THETA_MAX: Float = 0.00068523;

/// A full sphere in world space.
#[derive(Clone, Debug)]
pub struct Sphere {
    /// Center of the sphere.
    pub center: Point3f,

    /// Radius of sphere.
    pub radius: Float,

    /// Indicates whether surface normals point inwards.
    pub reverse_orientation: bool,
}

impl Sphere {
    /// Create a new sphere.
    ///
    /// * `center`              - Center of the sphere.
    /// * `radius`              - Radius of sphere.
    /// * `reverse_orientation` - Indicates whether their surface normal directions
    ///                           should be reversed from the default
    pub fn new(center: Point3f, radius: Float, reverse_orientation: bool) -> Result<Self> {
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(Error::InvalidArgument(format!("invalid sphere radius {radius}")));
        }
        Ok(Self {
            center,
            radius,
            reverse_orientation,
        })
    }

    /// Returns the outward (or reversed) unit normal at a point on the surface.
    fn normal_at(&self, p: &Point3f) -> Normal3f {
        let n = Normal3f::from((*p - self.center) / self.radius);
        if self.reverse_orientation {
            -n
        } else {
            n
        }
    }

    /// Returns the nearest root of the ray-sphere quadratic inside the ray's
    /// parametric range.
    fn hit_distance(&self, ray: &Ray) -> Option<Float> {
        let oc = ray.o - self.center;
        let a = ray.d.length_squared();
        let half_b = oc.dot(&ray.d);
        let c = oc.length_squared() - self.radius * self.radius;

        // Solve quadratic equation for t values.
        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 || a == 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        let q = if half_b < 0.0 { -half_b + root } else { -half_b - root };
        let (mut t0, mut t1) = (q / a, if q != 0.0 { c / q } else { q / a });
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        if t0 > ray.t_min && t0 < ray.t_max {
            Some(t0)
        } else if t1 > ray.t_min && t1 < ray.t_max {
            Some(t1)
        } else {
            None
        }
    }
}

impl Shape for Sphere {
    fn get_type(&self) -> &'static str {
        "sphere"
    }

    fn world_bound(&self) -> Bounds3f {
        let r = Vector3f::new(self.radius, self.radius, self.radius);
        Bounds3f::new(self.center - r, self.center + r)
    }

    fn intersect(&self, ray: &Ray) -> Option<SurfaceInteraction> {
        let t = self.hit_distance(ray)?;

        // Refine sphere intersection point.
        let mut local = ray.at(t) - self.center;
        local = local * (self.radius / local.length());
        if local.x == 0.0 && local.y == 0.0 {
            local.x = 1e-5 * self.radius;
        }
        let p = self.center + local;

        // Find parametric representation of sphere hit.
        let phi = spherical_phi(&local);
        let theta = safe_acos(local.z / self.radius);
        let uv = Point2f::new(phi * INV_TWO_PI, theta * INV_PI);

        // Compute sphere dpdu and dpdv.
        let z_radius = (local.x * local.x + local.y * local.y).sqrt();
        let cos_phi = local.x / z_radius;
        let sin_phi = local.y / z_radius;
        let dpdu = Vector3f::new(-TWO_PI * local.y, TWO_PI * local.x, 0.0);
        let dpdv = Vector3f::new(local.z * cos_phi, local.z * sin_phi, -self.radius * theta.sin()) * PI;

        let mut si = SurfaceInteraction::new(p, self.normal_at(&p), uv, -ray.d, dpdu, dpdv, ray.time);
        si.hit.t = t;
        Some(si)
    }

    fn intersect_p(&self, ray: &Ray) -> bool {
        self.hit_distance(ray).is_some()
    }

    fn area(&self) -> Float {
        FOUR_PI * self.radius * self.radius
    }

    fn sample_area(&self, u: &Point2f) -> ShapeSample {
        let d = uniform_sample_sphere(u);
        let p = self.center + d * self.radius;
        let uv = Point2f::new(spherical_phi(&d) * INV_TWO_PI, spherical_theta(&d) * INV_PI);
        ShapeSample {
            hit: Hit::new(p, 0.0, Vector3f::ZERO, self.normal_at(&p), MediumInterface::vacuum()),
            uv,
            pdf: 1.0 / self.area(),
        }
    }

    /// Samples the cone of directions subtended by the sphere when the
    /// reference point is outside; falls back to area sampling otherwise.
    fn sample_solid_angle(&self, hit: &Hit, u: &Point2f) -> ShapeSample {
        let dc2 = hit.p.distance_squared(self.center);
        if dc2 <= self.radius * self.radius {
            return sample_solid_angle_by_area(self, hit, u);
        }

        // Compute coordinate system for sphere sampling.
        let dc = dc2.sqrt();
        let wc = (self.center - hit.p) / dc;
        let (wc_x, wc_y) = coordinate_system(&wc);

        // Compute θ and φ values for sample in cone.
        let sin_theta_max = self.radius / dc;
        let sin2_theta_max = sin_theta_max * sin_theta_max;
        let cos_theta_max = safe_sqrt(1.0 - sin2_theta_max);
        let mut cos_theta = (cos_theta_max - 1.0) * u[0] + 1.0;
        let mut sin2_theta = 1.0 - cos_theta * cos_theta;
        if sin2_theta_max < SMALL_SIN2_THETA_MAX {
            sin2_theta = sin2_theta_max * u[0];
            cos_theta = (1.0 - sin2_theta).sqrt();
        }

        // Compute angle α from center of sphere to sampled point on surface.
        let cos_alpha = sin2_theta / sin_theta_max + cos_theta * safe_sqrt(1.0 - sin2_theta / sin2_theta_max);
        let sin_alpha = safe_sqrt(1.0 - cos_alpha * cos_alpha);
        let phi = u[1] * TWO_PI;

        // Compute surface normal and sampled point on sphere.
        let d = -(wc_x * (sin_alpha * phi.cos()) + wc_y * (sin_alpha * phi.sin()) + wc * cos_alpha);
        let p = self.center + d * self.radius;
        let uv = Point2f::new(spherical_phi(&d) * INV_TWO_PI, spherical_theta(&d) * INV_PI);

        ShapeSample {
            hit: Hit::new(p, hit.time, Vector3f::ZERO, self.normal_at(&p), MediumInterface::vacuum()),
            uv,
            pdf: uniform_cone_pdf(cos_theta_max),
        }
    }

    fn pdf_solid_angle(&self, hit: &Hit, wi: &Vector3f) -> Float {
        let dc2 = hit.p.distance_squared(self.center);
        if dc2 <= self.radius * self.radius {
            return pdf_solid_angle_by_area(self, hit, wi);
        }

        // Directions outside the cone cannot be sampled.
        let ray = hit.spawn_ray(wi);
        if !self.intersect_p(&ray) {
            return 0.0;
        }
        let sin2_theta_max = self.radius * self.radius / dc2;
        uniform_cone_pdf(safe_sqrt(1.0 - sin2_theta_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn unit_sphere() -> Sphere {
        Sphere::new(Point3f::new(0.0, 0.0, 5.0), 1.0, false).unwrap()
    }

    #[test]
    fn invalid_radius_is_rejected() {
        assert!(Sphere::new(Point3f::ZERO, 0.0, false).is_err());
        assert!(Sphere::new(Point3f::ZERO, -1.0, false).is_err());
    }

    #[test]
    fn ray_hits_front_of_sphere() {
        let sphere = unit_sphere();
        let ray = Ray::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), INFINITY, 0.0, None);
        let si = sphere.intersect(&ray).unwrap();
        assert!(approx_eq!(Float, si.hit.t, 4.0, epsilon = 1e-5));
        assert!(approx_eq!(Float, si.hit.n.z, -1.0, epsilon = 1e-5));
        assert!(si.wi.z > 0.0);
    }

    #[test]
    fn ray_range_limits_hits() {
        let sphere = unit_sphere();
        let ray = Ray::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), 3.0, 0.0, None);
        assert!(sphere.intersect(&ray).is_none());
        assert!(!sphere.intersect_p(&ray));

        // Starting inside hits the far side.
        let ray = Ray::new(Point3f::new(0.0, 0.0, 5.0), Vector3f::new(1.0, 0.0, 0.0), INFINITY, 0.0, None);
        let si = sphere.intersect(&ray).unwrap();
        assert!(approx_eq!(Float, si.hit.t, 1.0, epsilon = 1e-5));
    }

    #[test]
    fn cone_pdf_integrates_to_one() {
        let sphere = unit_sphere();
        let hit = Hit::new(Point3f::ZERO, 0.0, Vector3f::ZERO, Normal3f::ZERO, MediumInterface::vacuum());
        let pdf = sphere.pdf_solid_angle(&hit, &Vector3f::new(0.0, 0.0, 1.0));
        let solid_angle = TWO_PI * (1.0 - (1.0 - 1.0 / 25.0 as Float).sqrt());
        assert!(approx_eq!(Float, pdf * solid_angle, 1.0, epsilon = 1e-3));
        assert_eq!(sphere.pdf_solid_angle(&hit, &Vector3f::new(0.0, 1.0, 0.0)), 0.0);
    }

    proptest! {
        #[test]
        fn cone_samples_lie_on_visible_surface(u0 in 0.0..1.0f32, u1 in 0.0..1.0f32) {
            let sphere = unit_sphere();
            let hit = Hit::new(Point3f::ZERO, 0.0, Vector3f::ZERO, Normal3f::ZERO, MediumInterface::vacuum());
            let ss = sphere.sample_solid_angle(&hit, &Point2f::new(u0, u1));
            prop_assert!(approx_eq!(Float, ss.hit.p.distance(sphere.center), 1.0, epsilon = 1e-3));
            let wi = (ss.hit.p - hit.p).normalize();
            prop_assert!(ss.hit.n.dot(&wi) <= 1e-3);
            prop_assert!(ss.pdf > 0.0);
        }

        #[test]
        fn area_samples_match_area_pdf(u0 in 0.0..1.0f32, u1 in 0.0..1.0f32) {
            let sphere = unit_sphere();
            let ss = sphere.sample_area(&Point2f::new(u0, u1));
            prop_assert!(approx_eq!(Float, ss.pdf, sphere.pdf_area(&ss.hit.p), epsilon = 1e-6));
            prop_assert!(approx_eq!(Float, ss.hit.n.length(), 1.0, epsilon = 1e-4));
        }
    }
}
