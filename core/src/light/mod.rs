//! Light

use crate::base::*;
use crate::error::*;
use crate::geometry::*;
use crate::interaction::*;
use crate::spectrum::*;
use std::sync::Arc;

mod light_distrib;
mod light_type;
mod visibility_tester;

// Re-export
pub use light_distrib::*;
pub use light_type::*;
pub use visibility_tester::*;

/// Return value for `Light::sample_direction()`.
#[derive(Clone, Default)]
pub struct DirectionSample {
    /// Unit direction from the reference point towards the light.
    pub wi: Vector3f,

    /// Solid angle density of `wi`; 1 for delta lights, 0 for a failed sample.
    pub pdf: Float,

    /// Sampled position on the light.
    pub p: Point3f,

    /// Surface normal at `p`; zero for point lights.
    pub n: Normal3f,

    /// Surface parameterization at `p`.
    pub uv: Point2f,

    /// The sample came from a delta distribution.
    pub is_delta: bool,

    /// Visibility tester between the reference point and `p`.
    pub visibility: Option<VisibilityTester>,

    /// Radiance arriving at the reference point, ignoring occlusion.
    pub value: Spectrum,
}

impl DirectionSample {
    /// Returns true if the sample carries no energy.
    pub fn is_invalid(&self) -> bool {
        !(self.pdf > 0.0) || self.value.is_black()
    }
}

/// Return value for `Light::sample_position()`.
#[derive(Copy, Clone, Debug, Default)]
pub struct PositionSample {
    /// Sampled position.
    pub p: Point3f,

    /// Surface normal at `p`.
    pub n: Normal3f,

    /// Surface parameterization at `p`.
    pub uv: Point2f,

    /// Area density of `p`; 1 for delta positions.
    pub pdf: Float,
}

/// Return value for `Light::sample_le()`.
#[derive(Clone)]
pub struct Le {
    /// Ray leaving the light source.
    pub ray: Ray,

    /// Surface normal at the point on the light source.
    pub n_light: Normal3f,

    /// The ray origin's probability density with respect to surface area on the
    /// light.
    pub pdf_pos: Float,

    /// The ray directions's probability density with respect to solid angle.
    pub pdf_dir: Float,

    /// Emitted radiance value.
    pub value: Spectrum,
}

impl Le {
    /// Return a new `Le`.
    ///
    /// * `ray`     - Ray leaving the light source.
    /// * `n_light` - Surface normal at the point on the light source.
    /// * `pdf_pos` - The ray origin's probability density with respect to surface
    ///               area on the light.
    /// * `pdf_dir` - The ray directions's probability density with respect to
    ///               solid angle.
    /// * `value`   - Emitted radiance value.
    pub fn new(ray: Ray, n_light: Normal3f, pdf_pos: Float, pdf_dir: Float, value: Spectrum) -> Self {
        Self {
            ray,
            n_light,
            pdf_pos,
            pdf_dir,
            value,
        }
    }
}

/// Return value for `Light::pdf_le()`.
#[derive(Copy, Clone, Debug, Default)]
pub struct Pdf {
    /// The ray origin's probability density with respect to surface area on the
    /// light.
    pub pdf_pos: Float,

    /// The ray directions's probability density with respect to solid angle.
    pub pdf_dir: Float,
}

impl Pdf {
    /// Return a new `Pdf`.
    ///
    /// * `pdf_pos` - The ray origin's probability density with respect to
    ///               surface area on the light.
    /// * `pdf_dir` - The ray directions's probability density with respect to
    ///               solid angle.
    pub fn new(pdf_pos: Float, pdf_dir: Float) -> Self {
        Self { pdf_pos, pdf_dir }
    }
}

/// Light trait provides common behavior.
pub trait Light {
    /// Returns the type of light.
    fn get_type(&self) -> LightType;

    /// Returns the name used in log output.
    fn get_name(&self) -> &'static str;

    /// Initialize the light source before rendering begins.
    ///
    /// * `_world_bound` - Bounds of the scene geometry.
    fn preprocess(&self, _world_bound: &Bounds3f) {}

    /// Return the total emitted power.
    fn power(&self) -> Spectrum;

    /// Returns radiance emitted from a point on the light's surface.
    ///
    /// * `_hit` - Point on the surface.
    /// * `_w`   - Direction leaving the surface.
    fn l(&self, _hit: &Hit, _w: &Vector3f) -> Spectrum {
        Spectrum::ZERO
    }

    /// Returns emitted radiance due to that light along a ray that escapes the
    /// scene bounds.
    ///
    /// * `_ray` - The ray.
    fn le(&self, _ray: &Ray) -> Spectrum {
        Spectrum::ZERO
    }

    /// Sample a direction from a reference point towards the light.
    ///
    /// * `hit` - The reference point.
    /// * `u`   - Sample value for Monte Carlo integration.
    fn sample_direction(&self, hit: &Hit, u: &Point2f) -> DirectionSample;

    /// Returns the probability density with respect to solid angle for the
    /// light’s `sample_direction()`; 0 for delta lights.
    ///
    /// * `hit` - The reference point.
    /// * `wi`  - The incident direction.
    fn pdf_direction(&self, hit: &Hit, wi: &Vector3f) -> Float;

    /// Sample a position on the light.
    ///
    /// * `_u` - Sample value for Monte Carlo integration.
    fn sample_position(&self, _u: &Point2f) -> Result<PositionSample> {
        Err(Error::NotImplemented(format!("{} light cannot sample positions", self.get_name())))
    }

    /// Returns the area density of `sample_position()`.
    ///
    /// * `_p` - Point on the light.
    fn pdf_position(&self, _p: &Point3f) -> Float {
        0.0
    }

    /// Returns a sampled light-carrying ray leaving the light source.
    ///
    /// * `_u1`   - Sample values for Monte Carlo.
    /// * `_u2`   - Sample values for Monte Carlo.
    /// * `_time` - Time to use for the ray.
    fn sample_le(&self, _u1: &Point2f, _u2: &Point2f, _time: Float) -> Result<Le> {
        Err(Error::NotImplemented(format!("{} light cannot sample emission", self.get_name())))
    }

    /// Returns the probability density for the light’s `sample_le()`.
    ///
    /// * `_ray`     - The ray.
    /// * `_n_light` - The normal.
    fn pdf_le(&self, _ray: &Ray, _n_light: &Normal3f) -> Result<Pdf> {
        Err(Error::NotImplemented(format!("{} light cannot evaluate emission pdf", self.get_name())))
    }

    /// Returns whether light source is a delta light.
    fn is_delta_light(&self) -> bool {
        self.get_type().is_delta_light()
    }
}

/// Atomic reference counted `Light`.
pub type ArcLight = Arc<dyn Light + Send + Sync>;
