//! Linear Accelerator.

use rad_core::geometry::*;
use rad_core::interaction::*;
use rad_core::primitives::*;

/// Tests every primitive against each ray. The reference implementation of
/// the ray query contract.
#[derive(Clone)]
pub struct LinearAccel {
    /// The primitives.
    pub primitives: Vec<ArcPrimitive>,

    /// Union of the primitive bounds.
    bounds: Bounds3f,
}

impl LinearAccel {
    /// Create a new linear accelerator.
    ///
    /// * `primitives` - The primitives.
    pub fn new(primitives: Vec<ArcPrimitive>) -> Self {
        let bounds = primitives
            .iter()
            .fold(Bounds3f::empty(), |b, p| b.union(&p.world_bound()));
        info!("Linear accelerator over {} primitives", primitives.len());
        Self { primitives, bounds }
    }
}

impl Accel for LinearAccel {
    fn world_bound(&self) -> Bounds3f {
        self.bounds
    }

    /// Each hit shrinks `ray.t_max`, so the last hit found is the closest.
    fn intersect(&self, ray: &mut Ray) -> Option<SurfaceInteraction> {
        if self.primitives.is_empty() || self.bounds.intersect_p(ray).is_none() {
            return None;
        }
        let mut closest = None;
        for primitive in self.primitives.iter() {
            if let Some(si) = primitive.intersect(ray) {
                closest = Some(si);
            }
        }
        closest
    }

    fn intersect_p(&self, ray: &Ray) -> bool {
        if self.primitives.is_empty() || self.bounds.intersect_p(ray).is_none() {
            return false;
        }
        self.primitives.iter().any(|p| p.intersect_p(ray))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use rad_core::base::*;
    use rad_core::medium::MediumInterface;
    use rad_shapes::Sphere;
    use std::sync::Arc;

    fn sphere_at(z: Float) -> ArcPrimitive {
        let shape = Arc::new(Sphere::new(Point3f::new(0.0, 0.0, z), 1.0, false).unwrap());
        Arc::new(GeometricPrimitive::new(shape, None, None, MediumInterface::vacuum()))
    }

    #[test]
    fn closest_hit_wins_regardless_of_order() {
        let accel = LinearAccel::new(vec![sphere_at(10.0), sphere_at(4.0), sphere_at(7.0)]);
        let mut ray = Ray::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), INFINITY, 0.0, None);
        let si = accel.intersect(&mut ray).unwrap();
        assert!(approx_eq!(Float, si.hit.t, 3.0, epsilon = 1e-5));
        assert!(approx_eq!(Float, ray.t_max, 3.0, epsilon = 1e-5));
    }

    #[test]
    fn occlusion_respects_ray_extent() {
        let accel = LinearAccel::new(vec![sphere_at(4.0)]);
        let short = Ray::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), 2.5, 0.0, None);
        assert!(!accel.intersect_p(&short));
        let long = Ray::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), 3.5, 0.0, None);
        assert!(accel.intersect_p(&long));
    }

    #[test]
    fn empty_accel_never_hits() {
        let accel = LinearAccel::new(vec![]);
        let mut ray = Ray::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), INFINITY, 0.0, None);
        assert!(accel.intersect(&mut ray).is_none());
        assert!(accel.world_bound().is_empty());
    }
}
