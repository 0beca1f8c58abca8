//! Camera

use crate::base::*;
use crate::geometry::*;
use crate::interaction::*;
use crate::light::VisibilityTester;
use crate::medium::*;
use crate::spectrum::*;
use std::sync::Arc;

/// Holds all of the sample values needed to specify a camera ray.
#[derive(Copy, Clone, Debug, Default)]
pub struct CameraSample {
    /// Point on the film in raster coordinates.
    pub p_film: Point2f,

    /// Point on the lens in [0, 1)^2.
    pub p_lens: Point2f,

    /// Time in [0, 1).
    pub time: Float,
}

impl CameraSample {
    /// Create a new camera sample.
    ///
    /// * `p_film` - Point on the film in raster coordinates.
    /// * `p_lens` - Point on the lens.
    /// * `time`   - Time.
    pub fn new(p_film: Point2f, p_lens: Point2f, time: Float) -> Self {
        Self { p_film, p_lens, time }
    }
}

/// Return value of `Camera::sample_wi()`.
#[derive(Clone)]
pub struct CameraWiSample {
    /// Unit direction from the reference point towards the lens.
    pub wi: Vector3f,

    /// Solid angle density of `wi` at the reference point.
    pub pdf: Float,

    /// Raster position the importance arrives at.
    pub p_raster: Point2f,

    /// Visibility tester between the reference point and the lens point.
    pub visibility: VisibilityTester,

    /// Importance arriving along `-wi`.
    pub value: Spectrum,
}

/// Camera interface.
pub trait Camera {
    /// Returns the name used in log output.
    fn get_type(&self) -> &'static str;

    /// Returns the image resolution.
    fn resolution(&self) -> Point2i;

    /// Returns the medium the camera lies in.
    fn medium(&self) -> Option<ArcMedium>;

    /// Returns a ray corresponding to a given sample. It also returns, a floating
    /// point value that affects how much the radiance arriving at the film plane
    /// will contribute to final image.
    ///
    /// * `sample` - The sample.
    fn generate_ray(&self, sample: &CameraSample) -> (Ray, Float);

    /// Returns a main ray and rays shifted one pixel in x and y directions on
    /// the film plane.
    ///
    /// * `sample` - The sample.
    fn generate_ray_differential(&self, sample: &CameraSample) -> (Ray, Float);

    /// Returns the importance carried by a ray leaving the camera and the
    /// raster position it corresponds to, if it lands on the film.
    ///
    /// * `ray` - The ray.
    fn we(&self, ray: &Ray) -> (Spectrum, Option<Point2f>);

    /// Returns the spatial and directional densities of generating a ray.
    ///
    /// * `ray` - The ray.
    fn pdf_we(&self, ray: &Ray) -> (Float, Float);

    /// Sample a point on the lens as seen from a reference point.
    ///
    /// * `hit` - The reference point.
    /// * `u`   - Sample value.
    fn sample_wi(&self, hit: &Hit, u: &Point2f) -> Option<CameraWiSample>;
}

/// Atomic reference counted `Camera`.
pub type ArcCamera = Arc<dyn Camera + Send + Sync>;
