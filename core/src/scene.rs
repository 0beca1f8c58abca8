//! Scene

use crate::base::*;
use crate::camera::*;
use crate::error::*;
use crate::geometry::*;
use crate::interaction::*;
use crate::light::*;
use crate::medium::*;
use crate::primitives::*;
use crate::sampler::*;
use crate::sampling::*;
use crate::spectrum::*;

/// Upper bound on the number of index-matched boundaries skipped by one
/// transmittance query or one path segment of an integrator.
pub const MAX_NULL_BOUNDARIES: usize = 256;

/// A light picked by `Scene::sample_light_direction()`.
#[derive(Clone)]
pub struct LightSample {
    /// Index of the light in `Scene::lights`.
    pub light: usize,

    /// The sample; its pdf includes the light selection probability.
    pub sample: DirectionSample,
}

/// A ray leaving a light picked by `Scene::sample_light_emission()`.
#[derive(Clone)]
pub struct EmissionSample {
    /// Index of the light in `Scene::lights`.
    pub light: usize,

    /// Light selection probability.
    pub pmf: Float,

    /// The emitted ray.
    pub le: Le,
}

/// Scene.
///
/// The scene owns every light, medium and primitive; interactions refer to
/// lights by index and never outlive the scene that produced them.
pub struct Scene {
    /// An aggregate of all primitives in the scene.
    pub accel: ArcAccel,

    /// The camera.
    pub camera: ArcCamera,

    /// All light sources in the scene.
    pub lights: Vec<ArcLight>,

    /// Media referenced by primitives, lights or the camera.
    pub media: Vec<ArcMedium>,

    /// Medium filling the scene where nothing else is specified.
    pub medium: Option<ArcMedium>,

    /// The bounding box of the scene geometry.
    pub world_bound: Bounds3f,

    /// Light selection distribution.
    light_distribution: Distribution1D,

    /// Index of the environment light.
    environment: Option<usize>,
}

impl Scene {
    /// Creates a new `Scene` and preprocesses its lights.
    ///
    /// * `accel`    - An aggregate of all primitives in the scene.
    /// * `camera`   - The camera.
    /// * `lights`   - All light sources in the scene.
    /// * `media`    - All media in the scene.
    /// * `medium`   - Medium filling the scene.
    /// * `strategy` - Light selection strategy.
    pub fn new(
        accel: ArcAccel,
        camera: ArcCamera,
        lights: Vec<ArcLight>,
        media: Vec<ArcMedium>,
        medium: Option<ArcMedium>,
        strategy: LightSampleStrategy,
    ) -> Result<Self> {
        let world_bound = accel.world_bound();

        let mut environment = None;
        for (i, light) in lights.iter().enumerate() {
            light.preprocess(&world_bound);
            if light.get_type().is_infinite_light() {
                if environment.is_some() {
                    return Err(Error::InvalidArgument(
                        "a scene can hold at most one environment light".to_string(),
                    ));
                }
                environment = Some(i);
            }
        }

        let light_distribution = create_light_sample_distribution(strategy, &lights);
        info!(
            "Scene has {} lights ({} selection), {} media",
            lights.len(),
            strategy,
            media.len()
        );

        Ok(Self {
            accel,
            camera,
            lights,
            media,
            medium,
            world_bound,
            light_distribution,
            environment,
        })
    }

    /// Traces the ray into the scene and returns the `SurfaceInteraction` if
    /// an intersection occurred. Degenerate rays never hit anything.
    ///
    /// * `ray` - The ray to trace.
    pub fn intersect(&self, ray: &mut Ray) -> Option<SurfaceInteraction> {
        if ray.is_degenerate() {
            return None;
        }
        self.accel.intersect(ray)
    }

    /// Traces the ray into the scene and returns whether or not an intersection
    /// occurred.
    ///
    /// * `ray` - The ray to trace.
    pub fn intersect_p(&self, ray: &Ray) -> bool {
        !ray.is_degenerate() && self.accel.intersect_p(ray)
    }

    /// Returns true if anything blocks the segment between two points.
    ///
    /// * `p0` - First endpoint.
    /// * `p1` - Second endpoint.
    pub fn is_occluded(&self, p0: &Hit, p1: &Hit) -> bool {
        self.intersect_p(&p0.spawn_ray_to_hit(p1))
    }

    /// Traces the ray into the scene and returns the first intersection with a
    /// light scattering surface along the given ray and the beam transmittance
    /// up to that point. Surfaces without a BSDF are passed through.
    ///
    /// * `ray`     - The ray to trace.
    /// * `sampler` - Sampler.
    pub fn intersect_tr(&self, ray: &Ray, sampler: &mut dyn Sampler) -> (Option<SurfaceInteraction>, Spectrum) {
        let mut tr = Spectrum::ONE;
        let mut r = ray.clone();
        let mut remaining = ray.t_max;

        for _ in 0..MAX_NULL_BOUNDARIES {
            let hit_surface = self.intersect(&mut r);

            // Accumulate beam transmittance for ray segment.
            if let Some(medium) = r.medium.as_ref() {
                if !r.is_degenerate() {
                    tr *= medium.tr(&r, sampler);
                }
            }
            if tr.is_black() {
                return (None, Spectrum::ZERO);
            }

            // Initialize next ray segment or terminate transmittance computation.
            match hit_surface {
                Some(si) if si.bsdf.is_some() => return (Some(si), tr),
                Some(si) => {
                    remaining -= si.hit.t;
                    let mut next = si.hit.spawn_ray(&r.d);
                    next.t_max = remaining;
                    r = next;
                }
                None => return (None, tr),
            }
        }

        warn!("Transmittance query crossed more than {MAX_NULL_BOUNDARIES} boundaries");
        (None, tr)
    }

    /// Returns the transmittance between two points; zero if a scattering
    /// surface lies between them.
    ///
    /// * `p0`      - First endpoint.
    /// * `p1`      - Second endpoint.
    /// * `sampler` - Sampler.
    pub fn transmittance(&self, p0: &Hit, p1: &Hit, sampler: &mut dyn Sampler) -> Spectrum {
        match self.intersect_tr(&p0.spawn_ray_to_hit(p1), sampler) {
            (Some(_), _) => Spectrum::ZERO,
            (None, tr) => tr,
        }
    }

    /// Returns the probability of selecting a light.
    ///
    /// * `light` - Index of the light.
    pub fn light_pmf(&self, light: usize) -> Float {
        if self.lights.is_empty() {
            0.0
        } else {
            self.light_distribution.discrete_pdf(light)
        }
    }

    /// Pick a light and sample a direction towards it. Returns `None` if the
    /// scene has no lights or the sample carries no energy.
    ///
    /// * `hit`     - Reference point.
    /// * `u_light` - Sample used to select a light.
    /// * `u`       - Sample used by the light.
    pub fn sample_light_direction(&self, hit: &Hit, u_light: Float, u: &Point2f) -> Option<LightSample> {
        if self.lights.is_empty() {
            return None;
        }
        let (light, pmf, _) = self.light_distribution.sample_discrete(u_light);
        if pmf == 0.0 {
            return None;
        }
        let mut sample = self.lights[light].sample_direction(hit, u);
        if sample.is_invalid() {
            return None;
        }
        sample.pdf *= pmf;
        Some(LightSample { light, sample })
    }

    /// Returns the density of `sample_light_direction()` choosing `light` and
    /// direction `wi`; 0 for delta lights.
    ///
    /// * `light` - Index of the light.
    /// * `hit`   - Reference point.
    /// * `wi`    - Direction towards the light.
    pub fn pdf_light_direction(&self, light: usize, hit: &Hit, wi: &Vector3f) -> Float {
        let l = &self.lights[light];
        if l.is_delta_light() {
            return 0.0;
        }
        self.light_pmf(light) * l.pdf_direction(hit, wi)
    }

    /// Pick a light and sample a ray leaving it. Returns `Ok(None)` if the
    /// scene has no lights.
    ///
    /// * `u_light` - Sample used to select a light.
    /// * `u1`      - Sample used for the position.
    /// * `u2`      - Sample used for the direction.
    /// * `time`    - Time for the ray.
    pub fn sample_light_emission(
        &self,
        u_light: Float,
        u1: &Point2f,
        u2: &Point2f,
        time: Float,
    ) -> Result<Option<EmissionSample>> {
        if self.lights.is_empty() {
            return Ok(None);
        }
        let (light, pmf, _) = self.light_distribution.sample_discrete(u_light);
        let mut le = self.lights[light].sample_le(u1, u2, time)?;
        if le.ray.medium.is_none() {
            le.ray.medium = self.medium.clone();
        }
        Ok(Some(EmissionSample { light, pmf, le }))
    }

    /// Returns the environment light, if any.
    pub fn environment(&self) -> Option<&ArcLight> {
        self.environment.map(|i| &self.lights[i])
    }

    /// Returns the index of the environment light, if any.
    pub fn environment_index(&self) -> Option<usize> {
        self.environment
    }

    /// Returns radiance arriving along a ray that escaped the scene.
    ///
    /// * `ray` - The ray.
    pub fn escaped_le(&self, ray: &Ray) -> Spectrum {
        self.environment().map_or(Spectrum::ZERO, |light| light.le(ray))
    }

    /// Returns radiance emitted by the surface at an interaction.
    ///
    /// * `si` - The surface interaction.
    /// * `w`  - Direction leaving the surface.
    pub fn surface_le(&self, si: &SurfaceInteraction, w: &Vector3f) -> Spectrum {
        si.light.map_or(Spectrum::ZERO, |i| self.lights[i].l(&si.hit, w))
    }

    /// Returns a camera ray for a sample, starting in the scene medium when the
    /// camera does not specify one.
    ///
    /// * `sample` - The camera sample.
    pub fn generate_camera_ray(&self, sample: &CameraSample) -> (Ray, Float) {
        let (mut ray, weight) = self.camera.generate_ray_differential(sample);
        if ray.medium.is_none() {
            ray.medium = self.medium.clone();
        }
        (ray, weight)
    }
}
