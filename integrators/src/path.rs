//! Path Integrator

use crate::common::*;
use crate::integrator::*;
use rad_core::base::*;
use rad_core::geometry::*;
use rad_core::interaction::*;
use rad_core::options::*;
use rad_core::reflection::*;
use rad_core::sampler::*;
use rad_core::scene::*;
use rad_core::spectrum::*;

/// Implements path tracing with next event estimation. Participating media
/// are ignored; use `VolPathIntegrator` for scenes with media.
pub struct PathIntegrator {
    /// Maximum number of scattering events along a path.
    max_depth: usize,

    /// Depth after which Russian roulette is played.
    rr_depth: usize,
}

impl PathIntegrator {
    /// Create a new `PathIntegrator`.
    ///
    /// * `max_depth` - Maximum number of scattering events.
    /// * `rr_depth`  - Depth after which Russian roulette is played.
    pub fn new(max_depth: usize, rr_depth: usize) -> Self {
        Self { max_depth, rr_depth }
    }

    /// Create a new `PathIntegrator` from render options.
    ///
    /// * `options` - Render options.
    pub fn from_options(options: &RenderOptions) -> Self {
        Self::new(options.max_depth, options.rr_depth)
    }
}

impl SamplerIntegrator for PathIntegrator {
    /// Returns the name used in log output.
    fn get_type(&self) -> &'static str {
        "path"
    }

    /// Returns the incident radiance at the origin of a ray.
    ///
    /// * `ray`     - The ray.
    /// * `scene`   - The scene.
    /// * `sampler` - The sampler.
    fn li(&self, ray: &mut Ray, scene: &Scene, sampler: &mut dyn Sampler) -> Spectrum {
        let mut l = Spectrum::ZERO;
        let mut beta = Spectrum::ONE;
        let mut specular_bounce = false;
        let mut depth = 0;
        let mut eta_scale = 1.0;

        // Vertex the current ray left and the density of its direction.
        let mut prev_hit = Hit::default();
        let mut prev_pdf = 1.0;
        let mut null_crossings = 0;

        loop {
            debug!("Path bounce {depth}, beta {beta}, L {l}");

            let si = match scene.intersect(ray) {
                Some(si) => si,
                None => {
                    // Add emission from the environment for escaped rays.
                    if let Some(env) = scene.environment_index() {
                        let le = scene.lights[env].le(ray);
                        if !le.is_black() {
                            let weight = if depth == 0 || specular_bounce {
                                1.0
                            } else {
                                emission_mis_weight(scene, env, &prev_hit, &ray.d, prev_pdf)
                            };
                            l += beta * le * weight;
                        }
                    }
                    break;
                }
            };

            // Add emission from an area light that was hit.
            if let Some(light) = si.light {
                let le = scene.lights[light].l(&si.hit, &si.hit.wo);
                if !le.is_black() {
                    let weight = if depth == 0 || specular_bounce {
                        1.0
                    } else {
                        emission_mis_weight(scene, light, &prev_hit, &ray.d, prev_pdf)
                    };
                    l += beta * le * weight;
                }
            }

            // Skip over boundaries without a BSDF.
            if si.bsdf.is_none() {
                null_crossings += 1;
                if null_crossings > MAX_NULL_BOUNDARIES {
                    warn!("Path crossed more than {MAX_NULL_BOUNDARIES} boundaries; terminating");
                    break;
                }
                *ray = si.hit.spawn_ray(&ray.d);
                continue;
            }

            if depth == self.max_depth {
                break;
            }
            depth += 1;

            // Sample illumination from lights to find path contribution.
            if has_non_specular(&si) {
                l += beta * sample_one_light(&si, scene, sampler, false);
            }

            // Sample BSDF to get new path direction.
            let ctx = BSDFContext::new(TransportMode::Radiance);
            let u_lobe = sampler.get_1d();
            let u = sampler.get_2d();
            let (bs, wi) = match si.sample_bsdf(&ctx, u_lobe, &u) {
                Some(sample) => sample,
                None => break,
            };
            debug!("Sampled BSDF, f = {}, pdf = {}, type {:?}", bs.f, bs.pdf, bs.sampled_type);

            beta *= bs.weight();
            specular_bounce = bs.sampled_type.is_specular();
            if bs.sampled_type.contains(BxDFType::TRANSMISSION) {
                eta_scale *= sqr(bs.eta);
            }
            prev_pdf = bs.pdf;
            *ray = si.hit.spawn_ray(&wi);
            prev_hit = si.hit;

            if beta.is_black() {
                break;
            }

            // Possibly terminate the path with Russian roulette.
            if !russian_roulette(&mut beta, eta_scale, depth, self.rr_depth, sampler) {
                break;
            }
        }

        l
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_scenes::*;
    use float_cmp::approx_eq;
    use rad_core::film::FrameBuffer;
    use rad_samplers::RandomSampler;

    fn render_center(integrator: &PathIntegrator, scene: &Scene) -> Spectrum {
        let mut sampler = RandomSampler::new(1, Some(5)).expect("sampler");
        sampler.start_pixel(&Point2i::new(0, 0));
        let mut splats = FrameBuffer::new(Point2i::new(1, 1)).expect("frame buffer");
        integrator
            .render_sample(scene, &Point2f::new(0.5, 0.5), &mut sampler, &mut splats)
            .expect("render sample")
    }

    #[test]
    fn direct_light_from_point_light() {
        let scene = floor_with_point_light(4.0, 2.0);
        let l = render_center(&PathIntegrator::new(1, 3), &scene);
        // ρ/π · I / h²
        assert!(approx_eq!(Float, l[0], 0.5 * INV_PI, epsilon = 1e-4));
    }

    #[test]
    fn zero_depth_sees_only_emission() {
        let scene = floor_with_point_light(4.0, 2.0);
        assert!(render_center(&PathIntegrator::new(0, 3), &scene).is_black());
    }

    #[test]
    fn no_lights_is_black() {
        let scene = floor_without_lights();
        assert!(render_center(&PathIntegrator::new(5, 3), &scene).is_black());
    }
}
