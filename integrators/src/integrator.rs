//! Integrator

use rad_core::base::*;
use rad_core::camera::*;
use rad_core::error::*;
use rad_core::film::*;
use rad_core::geometry::*;
use rad_core::sampler::*;
use rad_core::scene::*;
use rad_core::spectrum::*;

/// Integrator interface. An integrator estimates the measurement of one
/// camera sample at a time; the renderer decides which samples are taken.
pub trait Integrator: Send + Sync {
    /// Returns the name used in log output.
    fn get_type(&self) -> &'static str;

    /// Validate and prepare for rendering a scene. Returns
    /// `Error::Incompatible` if the integrator cannot render it.
    ///
    /// * `_scene` - The scene.
    fn preprocess(&mut self, _scene: &Scene) -> Result<()> {
        Ok(())
    }

    /// Returns the radiance estimate for a film position. Contributions that
    /// land on other pixels are added to `splats`.
    ///
    /// * `scene`   - The scene.
    /// * `p_film`  - Raster position of the sample.
    /// * `sampler` - Sampler positioned at the pixel sample.
    /// * `splats`  - Buffer receiving splatted contributions.
    fn render_sample(
        &self,
        scene: &Scene,
        p_film: &Point2f,
        sampler: &mut dyn Sampler,
        splats: &mut FrameBuffer,
    ) -> Result<Spectrum>;
}

/// Integrators that compute the radiance arriving along camera rays.
pub trait SamplerIntegrator: Send + Sync {
    /// Returns the name used in log output.
    fn get_type(&self) -> &'static str;

    /// Validate and prepare for rendering a scene.
    ///
    /// * `_scene` - The scene.
    fn preprocess(&mut self, _scene: &Scene) -> Result<()> {
        Ok(())
    }

    /// Returns the incident radiance at the origin of a ray.
    ///
    /// * `ray`     - The ray.
    /// * `scene`   - The scene.
    /// * `sampler` - The sampler.
    fn li(&self, ray: &mut Ray, scene: &Scene, sampler: &mut dyn Sampler) -> Spectrum;
}

impl<T: SamplerIntegrator> Integrator for T {
    fn get_type(&self) -> &'static str {
        SamplerIntegrator::get_type(self)
    }

    fn preprocess(&mut self, scene: &Scene) -> Result<()> {
        SamplerIntegrator::preprocess(self, scene)
    }

    /// Generate a camera ray for the sample and weigh its radiance.
    fn render_sample(
        &self,
        scene: &Scene,
        p_film: &Point2f,
        sampler: &mut dyn Sampler,
        _splats: &mut FrameBuffer,
    ) -> Result<Spectrum> {
        let camera_sample = get_camera_sample(p_film, sampler);
        let (mut ray, ray_weight) = scene.generate_camera_ray(&camera_sample);
        ray.scale_differentials(1.0 / (sampler.samples_per_pixel() as Float).sqrt());

        if ray_weight > 0.0 {
            let l = self.li(&mut ray, scene, sampler);
            debug!("Camera sample {p_film} -> ray: {ray}, ray weight {ray_weight} -> L = {l}");
            Ok(ray_weight * l)
        } else {
            Ok(Spectrum::ZERO)
        }
    }
}

/// Returns a camera sample for a film position, drawing the lens position and
/// time from the sampler.
///
/// * `p_film`  - Raster position.
/// * `sampler` - The sampler.
pub fn get_camera_sample(p_film: &Point2f, sampler: &mut dyn Sampler) -> CameraSample {
    let p_lens = sampler.get_2d();
    let time = sampler.get_1d();
    CameraSample::new(*p_film, p_lens, time)
}
