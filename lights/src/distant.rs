//! Distant Source

use crate::common::*;
use rad_core::base::*;
use rad_core::error::*;
use rad_core::geometry::*;
use rad_core::interaction::*;
use rad_core::light::*;
use rad_core::medium::*;
use rad_core::sampling::*;
use rad_core::spectrum::*;

/// Implements a directional light source that deposits illumination from the
/// same direction at every point in space.
#[derive(Clone)]
pub struct DistantLight {
    /// The emitted radiance `L`.
    pub emitted_radiance: Spectrum,

    /// Unit direction pointing towards the light.
    pub w_light: Vector3f,

    /// Bounding sphere of the scene; calculated in `preprocess()`.
    world: WorldSphere,
}

impl DistantLight {
    /// Returns a new `DistantLight`.
    ///
    /// * `w_light`          - Direction pointing towards the light.
    /// * `emitted_radiance` - The emitted radiance.
    pub fn new(w_light: Vector3f, emitted_radiance: Spectrum) -> Result<Self> {
        if w_light.length_squared() == 0.0 || w_light.has_nans() {
            return Err(Error::InvalidArgument("distant light direction is degenerate".to_string()));
        }
        Ok(Self {
            emitted_radiance,
            w_light: w_light.normalize(),
            world: WorldSphere::default(),
        })
    }
}

impl Light for DistantLight {
    fn get_type(&self) -> LightType {
        LightType::DELTA_DIRECTION_LIGHT
    }

    fn get_name(&self) -> &'static str {
        "distant"
    }

    fn preprocess(&self, world_bound: &Bounds3f) {
        self.world.set(world_bound);
    }

    fn power(&self) -> Spectrum {
        let (_, world_radius) = self.world.get();
        self.emitted_radiance * PI * world_radius * world_radius
    }

    fn sample_direction(&self, hit: &Hit, _u: &Point2f) -> DirectionSample {
        let (_, world_radius) = self.world.get();
        let p_outside = hit.p + self.w_light * (2.0 * world_radius);
        let p1 = Hit::new(p_outside, hit.time, -self.w_light, Normal3f::ZERO, MediumInterface::vacuum());
        DirectionSample {
            wi: self.w_light,
            pdf: 1.0,
            p: p_outside,
            is_delta: true,
            visibility: Some(VisibilityTester::new(hit.clone(), p1)),
            value: self.emitted_radiance,
            ..Default::default()
        }
    }

    fn pdf_direction(&self, _hit: &Hit, _wi: &Vector3f) -> Float {
        0.0
    }

    fn sample_le(&self, u1: &Point2f, _u2: &Point2f, time: Float) -> Result<Le> {
        let (world_center, world_radius) = self.world.get();

        // Choose a point on the disk facing the scene, outside its bounds.
        let (v1, v2) = coordinate_system(&self.w_light);
        let cd = concentric_sample_disk(u1);
        let p_disk = world_center + (v1 * cd.x + v2 * cd.y) * world_radius;
        let origin = p_disk + self.w_light * world_radius;

        let ray = Ray::new(origin, -self.w_light, INFINITY, time, None);
        Ok(Le::new(
            ray,
            Normal3f::from(-self.w_light),
            1.0 / (PI * world_radius * world_radius),
            1.0,
            self.emitted_radiance,
        ))
    }

    fn pdf_le(&self, _ray: &Ray, _n_light: &Normal3f) -> Result<Pdf> {
        let (_, world_radius) = self.world.get();
        Ok(Pdf::new(1.0 / (PI * world_radius * world_radius), 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn preprocess_sizes_emission_disk() {
        let light = DistantLight::new(Vector3f::new(0.0, 0.0, 3.0), Spectrum::ONE).unwrap();
        light.preprocess(&Bounds3f::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 1.0, 1.0)));
        let r2 = 3.0;
        assert!(approx_eq!(Float, light.power()[0], PI * r2, epsilon = 1e-4));

        let le = light.sample_le(&Point2f::new(0.2, 0.7), &Point2f::new(0.5, 0.5), 0.0).unwrap();
        assert!(approx_eq!(Float, le.ray.d.z, -1.0, epsilon = 1e-6));
        assert!(approx_eq!(Float, le.pdf_pos, 1.0 / (PI * r2), epsilon = 1e-5));
        assert!(le.ray.o.z > 1.0);
    }

    #[test]
    fn shadow_endpoint_lies_outside_scene() {
        let light = DistantLight::new(Vector3f::new(1.0, 0.0, 0.0), Spectrum::new(2.0)).unwrap();
        let hit = Hit::new(Point3f::ZERO, 0.0, Vector3f::ZERO, Normal3f::new(1.0, 0.0, 0.0), MediumInterface::vacuum());
        let ls = light.sample_direction(&hit, &Point2f::new(0.5, 0.5));
        assert_eq!(ls.wi, Vector3f::new(1.0, 0.0, 0.0));
        assert!(approx_eq!(Float, ls.p.x, 2.0, epsilon = 1e-6));
        assert_eq!(ls.value, Spectrum::new(2.0));
    }

    #[test]
    fn rejects_zero_direction() {
        assert!(DistantLight::new(Vector3f::ZERO, Spectrum::ONE).is_err());
    }
}
