//! Light Tracer

use crate::common::*;
use crate::integrator::*;
use rad_core::base::*;
use rad_core::error::*;
use rad_core::film::*;
use rad_core::geometry::*;
use rad_core::interaction::*;
use rad_core::light::*;
use rad_core::medium::*;
use rad_core::options::*;
use rad_core::reflection::*;
use rad_core::sampler::*;
use rad_core::scene::*;
use rad_core::spectrum::*;

/// Implements particle tracing. Paths start on the lights and every vertex
/// that can be evaluated is connected to the camera; the contributions are
/// splatted onto the film. Camera rays are not traced, so emitters seen
/// directly through an environment light do not appear in the image.
pub struct LightTracerIntegrator {
    /// Maximum number of scattering events along a path.
    max_depth: usize,

    /// Depth after which Russian roulette is played.
    rr_depth: usize,
}

impl LightTracerIntegrator {
    /// Create a new `LightTracerIntegrator`.
    ///
    /// * `max_depth` - Maximum number of scattering events.
    /// * `rr_depth`  - Depth after which Russian roulette is played.
    pub fn new(max_depth: usize, rr_depth: usize) -> Self {
        Self { max_depth, rr_depth }
    }

    /// Create a new `LightTracerIntegrator` from render options.
    ///
    /// * `options` - Render options.
    pub fn from_options(options: &RenderOptions) -> Self {
        Self::new(options.max_depth, options.rr_depth)
    }

    /// Connect a point on an area light to the camera.
    ///
    /// * `scene`   - The scene.
    /// * `light`   - The light.
    /// * `hit`     - Point on the light.
    /// * `weight`  - Inverse of the light selection and position densities.
    /// * `sampler` - The sampler.
    /// * `splats`  - Splat buffer.
    fn connect_light_endpoint(
        &self,
        scene: &Scene,
        light: &ArcLight,
        hit: &Hit,
        weight: Float,
        sampler: &mut dyn Sampler,
        splats: &mut FrameBuffer,
    ) {
        let u = sampler.get_2d();
        if let Some(cs) = scene.camera.sample_wi(hit, &u) {
            if !(cs.pdf > 0.0) || cs.value.is_black() {
                return;
            }
            let le = light.l(hit, &cs.wi);
            let contrib = le * cs.value * (hit.n.abs_dot(&cs.wi) * weight / cs.pdf);
            if !contrib.is_black() {
                add_splat(splats, &cs.p_raster, contrib * cs.visibility.tr(scene, sampler));
            }
        }
    }

    /// Connect a path vertex to the camera.
    ///
    /// * `scene`   - The scene.
    /// * `hit`     - The path vertex.
    /// * `f`       - Returns the scattering value at the vertex towards a
    ///               world space direction.
    /// * `beta`    - Path throughput up to the vertex.
    /// * `sampler` - The sampler.
    /// * `splats`  - Splat buffer.
    fn connect_to_camera<F>(
        &self,
        scene: &Scene,
        hit: &Hit,
        f: F,
        beta: Spectrum,
        sampler: &mut dyn Sampler,
        splats: &mut FrameBuffer,
    ) where
        F: Fn(&Vector3f) -> Spectrum,
    {
        let u = sampler.get_2d();
        let cs = match scene.camera.sample_wi(hit, &u) {
            Some(cs) if cs.pdf > 0.0 && !cs.value.is_black() => cs,
            _ => return,
        };

        let contrib = beta * f(&cs.wi) * cs.value / cs.pdf;
        if !contrib.is_black() {
            trace!("Light path connects to camera at {}: {contrib}", cs.p_raster);
            add_splat(splats, &cs.p_raster, contrib * cs.visibility.tr(scene, sampler));
        }
    }
}

impl Integrator for LightTracerIntegrator {
    /// Returns the name used in log output.
    fn get_type(&self) -> &'static str {
        "lighttracer"
    }

    /// Reject scenes with lights that cannot sample emitted rays.
    ///
    /// * `scene` - The scene.
    fn preprocess(&mut self, scene: &Scene) -> Result<()> {
        check_emission_sampling(scene, "light tracer")
    }

    /// Trace one path from a light and splat its camera connections. The
    /// returned radiance is always zero.
    ///
    /// * `scene`   - The scene.
    /// * `_p_film` - Unused; contributions land where the camera sees them.
    /// * `sampler` - The sampler.
    /// * `splats`  - Splat buffer.
    fn render_sample(
        &self,
        scene: &Scene,
        _p_film: &Point2f,
        sampler: &mut dyn Sampler,
        splats: &mut FrameBuffer,
    ) -> Result<Spectrum> {
        let time = sampler.get_1d();
        let u_light = sampler.get_1d();
        let u1 = sampler.get_2d();
        let u2 = sampler.get_2d();
        let es = match scene.sample_light_emission(u_light, &u1, &u2, time)? {
            Some(es) => es,
            None => return Ok(Spectrum::ZERO),
        };
        let light = &scene.lights[es.light];
        let Le {
            mut ray,
            n_light,
            pdf_pos,
            pdf_dir,
            value,
        } = es.le;
        if !(pdf_pos > 0.0) || !(pdf_dir > 0.0) || !(es.pmf > 0.0) || value.is_black() {
            return Ok(Spectrum::ZERO);
        }

        // Emitters with a surface are seen by the camera directly.
        if light.get_type().contains(LightType::AREA_LIGHT) {
            let hit = Hit::new(ray.o, time, Vector3f::ZERO, n_light, MediumInterface::from(ray.medium.clone()));
            self.connect_light_endpoint(scene, light, &hit, 1.0 / (es.pmf * pdf_pos), sampler, splats);
        }

        let mut beta = value * (n_light.abs_dot(&ray.d) / (es.pmf * pdf_pos * pdf_dir));
        let mut depth = 0;
        let mut eta_scale = 1.0;
        let mut null_crossings = 0;
        debug!("Starting light path from {}: ray {ray}, beta {beta}", light.get_name());

        loop {
            let found = scene.intersect(&mut ray);
            let mut mi = None;
            if let Some(medium) = ray.medium.clone() {
                let (weight, interaction) = medium.sample(&ray, sampler);
                beta *= weight;
                mi = interaction;
            }
            if beta.is_black() {
                break;
            }

            if let Some(mi) = mi {
                if depth == self.max_depth {
                    break;
                }
                depth += 1;

                let phase = |wi: &Vector3f| Spectrum::new(mi.eval_phase(wi));
                self.connect_to_camera(scene, &mi.hit, phase, beta, sampler, splats);

                let (p, wi) = mi.sample_phase(&sampler.get_2d());
                if !(p > 0.0) {
                    break;
                }
                ray = mi.hit.spawn_ray(&wi);
            } else {
                let si = match found {
                    Some(si) => si,
                    None => break,
                };

                if si.bsdf.is_none() {
                    null_crossings += 1;
                    if null_crossings > MAX_NULL_BOUNDARIES {
                        warn!("Light path crossed more than {MAX_NULL_BOUNDARIES} boundaries; terminating");
                        break;
                    }
                    ray = si.hit.spawn_ray(&ray.d);
                    continue;
                }

                if depth == self.max_depth {
                    break;
                }
                depth += 1;

                if has_non_specular(&si) {
                    let ctx = BSDFContext::non_specular(TransportMode::Importance);
                    let bsdf = |wi: &Vector3f| {
                        si.bsdf_eval(&ctx, wi) * correct_shading_normal(&si, &si.hit.wo, wi, TransportMode::Importance)
                    };
                    self.connect_to_camera(scene, &si.hit, bsdf, beta, sampler, splats);
                }

                // Continue the path carrying importance.
                let ctx = BSDFContext::new(TransportMode::Importance);
                let u_lobe = sampler.get_1d();
                let u = sampler.get_2d();
                let (bs, wi) = match si.sample_bsdf(&ctx, u_lobe, &u) {
                    Some(sample) => sample,
                    None => break,
                };
                beta *= bs.weight() * correct_shading_normal(&si, &si.hit.wo, &wi, TransportMode::Importance);
                if bs.sampled_type.contains(BxDFType::TRANSMISSION) {
                    eta_scale *= sqr(bs.eta);
                }
                ray = si.hit.spawn_ray(&wi);
            }

            if beta.is_black() {
                break;
            }
            if !russian_roulette(&mut beta, eta_scale, depth, self.rr_depth, sampler) {
                break;
            }
        }

        Ok(Spectrum::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_scenes::*;
    use rad_samplers::RandomSampler;
    use std::sync::Arc;

    /// A light that only supports direction sampling.
    struct DirectionOnlyLight;

    impl Light for DirectionOnlyLight {
        fn get_type(&self) -> LightType {
            LightType::DELTA_POSITION_LIGHT
        }

        fn get_name(&self) -> &'static str {
            "direction_only"
        }

        fn power(&self) -> Spectrum {
            Spectrum::ONE
        }

        fn sample_direction(&self, _hit: &Hit, _u: &Point2f) -> DirectionSample {
            DirectionSample::default()
        }

        fn pdf_direction(&self, _hit: &Hit, _wi: &Vector3f) -> Float {
            0.0
        }
    }

    #[test]
    fn rejects_lights_without_emission_sampling() {
        let scene = floor_scene(vec![Arc::new(DirectionOnlyLight)], None);
        let mut integrator = LightTracerIntegrator::new(5, 3);
        assert!(matches!(
            Integrator::preprocess(&mut integrator, &scene),
            Err(Error::Incompatible(_))
        ));
    }

    #[test]
    fn splats_reach_the_film() {
        let scene = floor_with_point_light(4.0, 2.0);
        let mut integrator = LightTracerIntegrator::new(1, 3);
        assert!(Integrator::preprocess(&mut integrator, &scene).is_ok());

        let mut sampler = RandomSampler::new(64, Some(2)).expect("sampler");
        sampler.start_pixel(&Point2i::new(0, 0));
        let mut splats = FrameBuffer::new(Point2i::new(1, 1)).expect("frame buffer");
        for _ in 0..64 {
            let l = integrator
                .render_sample(&scene, &Point2f::new(0.5, 0.5), &mut sampler, &mut splats)
                .expect("render sample");
            assert!(l.is_black());
            sampler.start_next_sample();
        }
        // The pixel sees a tiny patch of the floor; only some paths land on it
        // but every splat must be finite.
        splats.add_sample(0, 0, Spectrum::ZERO);
        assert!(splats.get(0, 0).is_finite());
    }
}
