//! Point Light Source

use rad_core::base::*;
use rad_core::error::*;
use rad_core::geometry::*;
use rad_core::interaction::*;
use rad_core::light::*;
use rad_core::medium::*;
use rad_core::sampling::*;
use rad_core::spectrum::*;

/// Implements an isotropic point light source that emits the same amount of
/// light in all directions.
#[derive(Clone)]
pub struct PointLight {
    /// Participating medium.
    pub medium_interface: MediumInterface,

    /// Position.
    pub p_light: Point3f,

    /// Intensity.
    pub intensity: Spectrum,
}

impl PointLight {
    /// Returns a new `PointLight`.
    ///
    /// * `p_light`   - Position.
    /// * `intensity` - Intensity.
    /// * `medium`    - Participating medium around the light.
    pub fn new(p_light: Point3f, intensity: Spectrum, medium: Option<ArcMedium>) -> Self {
        Self {
            medium_interface: MediumInterface::from(medium),
            p_light,
            intensity,
        }
    }
}

impl Light for PointLight {
    fn get_type(&self) -> LightType {
        LightType::DELTA_POSITION_LIGHT
    }

    fn get_name(&self) -> &'static str {
        "point"
    }

    /// Return the total emitted power.
    fn power(&self) -> Spectrum {
        FOUR_PI * self.intensity
    }

    fn sample_direction(&self, hit: &Hit, _u: &Point2f) -> DirectionSample {
        let dist_sq = self.p_light.distance_squared(hit.p);
        if dist_sq == 0.0 {
            return DirectionSample::default();
        }
        let wi = (self.p_light - hit.p) / dist_sq.sqrt();

        let p1 = Hit::new(self.p_light, hit.time, -wi, Normal3f::ZERO, self.medium_interface.clone());
        DirectionSample {
            wi,
            pdf: 1.0,
            p: self.p_light,
            is_delta: true,
            visibility: Some(VisibilityTester::new(hit.clone(), p1)),
            value: self.intensity / dist_sq,
            ..Default::default()
        }
    }

    fn pdf_direction(&self, _hit: &Hit, _wi: &Vector3f) -> Float {
        0.0
    }

    fn sample_position(&self, _u: &Point2f) -> Result<PositionSample> {
        Ok(PositionSample {
            p: self.p_light,
            pdf: 1.0,
            ..Default::default()
        })
    }

    fn sample_le(&self, u1: &Point2f, _u2: &Point2f, time: Float) -> Result<Le> {
        let dir = uniform_sample_sphere(u1);
        let ray = Ray::new(self.p_light, dir, INFINITY, time, self.medium_interface.inside.clone());
        Ok(Le::new(ray, Normal3f::from(dir), 1.0, uniform_sphere_pdf(), self.intensity))
    }

    fn pdf_le(&self, _ray: &Ray, _n_light: &Normal3f) -> Result<Pdf> {
        Ok(Pdf::new(0.0, uniform_sphere_pdf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn inverse_square_falloff() {
        let light = PointLight::new(Point3f::new(0.0, 0.0, 2.0), Spectrum::new(8.0), None);
        let hit = Hit::new(Point3f::ZERO, 0.0, Vector3f::ZERO, Normal3f::new(0.0, 0.0, 1.0), MediumInterface::vacuum());
        let ls = light.sample_direction(&hit, &Point2f::new(0.5, 0.5));
        assert!(ls.is_delta);
        assert_eq!(ls.pdf, 1.0);
        assert!(approx_eq!(Float, ls.value[0], 2.0, epsilon = 1e-6));
        assert!(approx_eq!(Float, ls.wi.z, 1.0, epsilon = 1e-6));
        assert_eq!(light.pdf_direction(&hit, &ls.wi), 0.0);
        assert!(light.is_delta_light());
    }

    #[test]
    fn coincident_point_has_no_contribution() {
        let light = PointLight::new(Point3f::ZERO, Spectrum::ONE, None);
        let hit = Hit::new(Point3f::ZERO, 0.0, Vector3f::ZERO, Normal3f::ZERO, MediumInterface::vacuum());
        assert!(light.sample_direction(&hit, &Point2f::new(0.5, 0.5)).is_invalid());
    }

    #[test]
    fn emission_is_uniform_over_sphere() {
        let light = PointLight::new(Point3f::ZERO, Spectrum::ONE, None);
        let le = light.sample_le(&Point2f::new(0.3, 0.6), &Point2f::new(0.5, 0.5), 0.0).unwrap();
        assert!(approx_eq!(Float, le.pdf_dir, INV_FOUR_PI, epsilon = 1e-6));
        let pdf = light.pdf_le(&le.ray, &le.n_light).unwrap();
        assert!(approx_eq!(Float, pdf.pdf_dir, le.pdf_dir, epsilon = 1e-6));
        assert!(approx_eq!(Float, light.power()[0], FOUR_PI, epsilon = 1e-5));
    }
}
