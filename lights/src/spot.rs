//! Spot Light Source

use rad_core::base::*;
use rad_core::error::*;
use rad_core::geometry::*;
use rad_core::interaction::*;
use rad_core::light::*;
use rad_core::medium::*;
use rad_core::reflection::cos_theta;
use rad_core::sampling::*;
use rad_core::spectrum::*;

/// Implements a spot light source that emits light in a cone of directions
/// from its position.
///
/// The light's local frame has the cone axis along +z.
#[derive(Clone)]
pub struct SpotLight {
    /// Participating medium.
    pub medium_interface: MediumInterface,

    /// Local frame around the cone axis.
    pub frame: Frame,

    /// Position.
    pub p_light: Point3f,

    /// Intensity.
    pub intensity: Spectrum,

    /// Cosine of overall angular width of the cone.
    cos_total_width: Float,

    /// Cosine of angle at which falloff starts.
    cos_falloff_start: Float,
}

impl SpotLight {
    /// Returns a new `SpotLight`.
    ///
    /// * `from`          - Position.
    /// * `to`            - Point the cone axis passes through.
    /// * `intensity`     - Intensity.
    /// * `total_width`   - Overall angular width of the cone in degrees.
    /// * `falloff_start` - Angle at which falloff starts in degrees.
    /// * `medium`        - Participating medium around the light.
    pub fn new(
        from: Point3f,
        to: Point3f,
        intensity: Spectrum,
        total_width: Float,
        falloff_start: Float,
        medium: Option<ArcMedium>,
    ) -> Result<Self> {
        let axis = to - from;
        if axis.length_squared() == 0.0 {
            return Err(Error::InvalidArgument("spot light axis has zero length".to_string()));
        }
        if !(total_width > 0.0 && total_width <= 180.0) || falloff_start < 0.0 || falloff_start > total_width {
            return Err(Error::InvalidArgument(format!(
                "spot light angles {falloff_start}/{total_width} out of range"
            )));
        }

        let frame = Frame::from_normal(&Normal3f::from(axis.normalize()));
        Ok(Self {
            medium_interface: MediumInterface::from(medium),
            frame,
            p_light: from,
            intensity,
            cos_total_width: radians(total_width).cos(),
            cos_falloff_start: radians(falloff_start).cos(),
        })
    }

    /// Returns the distribution of light accounting for the spotlight cone.
    ///
    /// * `wl` - Unit direction leaving the light in the local frame.
    fn falloff(&self, wl: &Vector3f) -> Float {
        let cos_theta = wl.z;
        if cos_theta < self.cos_total_width {
            return 0.0;
        }
        if cos_theta >= self.cos_falloff_start {
            return 1.0;
        }

        // Compute falloff inside spotlight cone.
        let delta = (cos_theta - self.cos_total_width) / (self.cos_falloff_start - self.cos_total_width);
        (delta * delta) * (delta * delta)
    }
}

impl Light for SpotLight {
    fn get_type(&self) -> LightType {
        LightType::DELTA_POSITION_LIGHT
    }

    fn get_name(&self) -> &'static str {
        "spot"
    }

    fn power(&self) -> Spectrum {
        self.intensity * TWO_PI * (1.0 - 0.5 * (self.cos_falloff_start + self.cos_total_width))
    }

    fn sample_direction(&self, hit: &Hit, _u: &Point2f) -> DirectionSample {
        let dist_sq = self.p_light.distance_squared(hit.p);
        if dist_sq == 0.0 {
            return DirectionSample::default();
        }
        let wi = (self.p_light - hit.p) / dist_sq.sqrt();
        let value = self.intensity * self.falloff(&self.frame.to_local(&-wi)) / dist_sq;

        let p1 = Hit::new(self.p_light, hit.time, -wi, Normal3f::ZERO, self.medium_interface.clone());
        DirectionSample {
            wi,
            pdf: 1.0,
            p: self.p_light,
            is_delta: true,
            visibility: Some(VisibilityTester::new(hit.clone(), p1)),
            value,
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
        let w = uniform_sample_cone(u1, self.cos_total_width);
        let d = self.frame.to_world(&w);
        let ray = Ray::new(self.p_light, d, INFINITY, time, self.medium_interface.inside.clone());
        Ok(Le::new(
            ray,
            Normal3f::from(d),
            1.0,
            uniform_cone_pdf(self.cos_total_width),
            self.intensity * self.falloff(&w),
        ))
    }

    fn pdf_le(&self, ray: &Ray, _n_light: &Normal3f) -> Result<Pdf> {
        let pdf_dir = if cos_theta(&self.frame.to_local(&ray.d.normalize())) >= self.cos_total_width {
            uniform_cone_pdf(self.cos_total_width)
        } else {
            0.0
        };
        Ok(Pdf::new(0.0, pdf_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn spot() -> SpotLight {
        SpotLight::new(Point3f::new(0.0, 0.0, 1.0), Point3f::ZERO, Spectrum::ONE, 30.0, 20.0, None).unwrap()
    }

    fn hit_at(p: Point3f) -> Hit {
        Hit::new(p, 0.0, Vector3f::ZERO, Normal3f::new(0.0, 0.0, 1.0), MediumInterface::vacuum())
    }

    #[test]
    fn rejects_bad_angles() {
        assert!(SpotLight::new(Point3f::ZERO, Point3f::new(0.0, 0.0, 1.0), Spectrum::ONE, 10.0, 20.0, None).is_err());
        assert!(SpotLight::new(Point3f::ZERO, Point3f::ZERO, Spectrum::ONE, 30.0, 20.0, None).is_err());
    }

    #[test]
    fn full_intensity_on_axis() {
        let ls = spot().sample_direction(&hit_at(Point3f::ZERO), &Point2f::new(0.5, 0.5));
        assert!(approx_eq!(Float, ls.value[1], 1.0, epsilon = 1e-5));
        assert!(ls.is_delta);
    }

    #[test]
    fn dark_outside_cone() {
        let ls = spot().sample_direction(&hit_at(Point3f::new(5.0, 0.0, 0.0)), &Point2f::new(0.5, 0.5));
        assert!(ls.value.is_black());
    }

    #[test]
    fn emitted_rays_stay_inside_cone() {
        let light = spot();
        let cos_total = radians(30.0).cos();
        for &(a, b) in &[(0.1, 0.2), (0.9, 0.7), (0.5, 0.99)] {
            let le = light.sample_le(&Point2f::new(a, b), &Point2f::new(0.5, 0.5), 0.0).unwrap();
            assert!(-le.ray.d.z >= cos_total - 1e-5);
            let pdf = light.pdf_le(&le.ray, &le.n_light).unwrap();
            assert!(approx_eq!(Float, pdf.pdf_dir, le.pdf_dir, epsilon = 1e-4));
        }
    }
}
