//! Volumetric Path Integrator

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

/// Implements path tracing through participating media. Collisions are
/// sampled with delta tracking and shadow rays estimate transmittance with
/// ratio tracking.
pub struct VolPathIntegrator {
    /// Maximum number of scattering events along a path.
    max_depth: usize,

    /// Depth after which Russian roulette is played.
    rr_depth: usize,
}

impl VolPathIntegrator {
    /// Create a new `VolPathIntegrator`.
    ///
    /// * `max_depth` - Maximum number of scattering events.
    /// * `rr_depth`  - Depth after which Russian roulette is played.
    pub fn new(max_depth: usize, rr_depth: usize) -> Self {
        Self { max_depth, rr_depth }
    }

    /// Create a new `VolPathIntegrator` from render options.
    ///
    /// * `options` - Render options.
    pub fn from_options(options: &RenderOptions) -> Self {
        Self::new(options.max_depth, options.rr_depth)
    }
}

impl SamplerIntegrator for VolPathIntegrator {
    /// Returns the name used in log output.
    fn get_type(&self) -> &'static str {
        "volpath"
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

        let mut prev_hit = Hit::default();
        let mut prev_pdf = 1.0;
        let mut null_crossings = 0;

        loop {
            debug!("Volpath bounce {depth}, beta {beta}, L {l}, ray {ray}");

            // Intersect `ray` with scene and sample the medium up to the hit.
            let found = scene.intersect(ray);
            let mut mi = None;
            if let Some(medium) = ray.medium.clone() {
                let (weight, interaction) = medium.sample(ray, sampler);
                beta *= weight;
                mi = interaction;
            }
            if beta.is_black() {
                break;
            }

            if let Some(mi) = mi {
                // Handle scattering at a point in the medium.
                if depth == self.max_depth {
                    break;
                }
                depth += 1;

                l += beta * sample_one_light(&mi, scene, sampler, true);

                let (p, wi) = mi.sample_phase(&sampler.get_2d());
                if !(p > 0.0) {
                    break;
                }
                specular_bounce = false;
                prev_pdf = p;
                *ray = mi.hit.spawn_ray(&wi);
                prev_hit = mi.hit;
            } else {
                // Handle scattering at a point on a surface.
                let si = match found {
                    Some(si) => si,
                    None => {
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

                // Medium boundaries without a BSDF only change the current medium.
                if si.bsdf.is_none() {
                    null_crossings += 1;
                    if null_crossings > MAX_NULL_BOUNDARIES {
                        warn!("Volumetric path crossed more than {MAX_NULL_BOUNDARIES} boundaries; terminating");
                        break;
                    }
                    *ray = si.hit.spawn_ray(&ray.d);
                    continue;
                }

                if depth == self.max_depth {
                    break;
                }
                depth += 1;

                if has_non_specular(&si) {
                    l += beta * sample_one_light(&si, scene, sampler, true);
                }

                let ctx = BSDFContext::new(TransportMode::Radiance);
                let u_lobe = sampler.get_1d();
                let u = sampler.get_2d();
                let (bs, wi) = match si.sample_bsdf(&ctx, u_lobe, &u) {
                    Some(sample) => sample,
                    None => break,
                };

                beta *= bs.weight();
                specular_bounce = bs.sampled_type.is_specular();
                if bs.sampled_type.contains(BxDFType::TRANSMISSION) {
                    eta_scale *= sqr(bs.eta);
                }
                prev_pdf = bs.pdf;
                *ray = si.hit.spawn_ray(&wi);
                prev_hit = si.hit;
            }

            if beta.is_black() {
                break;
            }
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
    use rad_core::light::ArcLight;
    use rad_core::medium::ArcMedium;
    use rad_lights::PointLight;
    use rad_media::HomogeneousMedium;
    use rad_samplers::RandomSampler;
    use std::sync::Arc;

    fn scene_in_medium(sigma_a: Float) -> Scene {
        let medium: ArcMedium =
            Arc::new(HomogeneousMedium::new(Spectrum::new(sigma_a), Spectrum::ZERO, 1.0, 0.0).expect("medium"));
        let light: ArcLight = Arc::new(PointLight::new(Point3f::new(0.0, 2.0, 0.0), Spectrum::new(4.0), None));
        floor_scene(vec![light], Some(medium))
    }

    fn mean_center(integrator: &VolPathIntegrator, scene: &Scene, n: usize) -> Float {
        let mut sampler = RandomSampler::new(n, Some(9)).expect("sampler");
        sampler.start_pixel(&Point2i::new(0, 0));
        let mut splats = FrameBuffer::new(Point2i::new(1, 1)).expect("frame buffer");
        let mut sum = 0.0;
        for _ in 0..n {
            let l = integrator
                .render_sample(scene, &Point2f::new(0.5, 0.5), &mut sampler, &mut splats)
                .expect("render sample");
            sum += l[0];
            sampler.start_next_sample();
        }
        sum / n as Float
    }

    #[test]
    fn vacuum_medium_matches_direct_light() {
        let scene = scene_in_medium(0.0);
        let l = mean_center(&VolPathIntegrator::new(1, 3), &scene, 4);
        assert!(approx_eq!(Float, l, 0.5 * INV_PI, epsilon = 1e-4));
    }

    #[test]
    fn absorbing_medium_attenuates_both_segments() {
        // Camera ray travels 3 units, the shadow ray 2.
        let scene = scene_in_medium(0.1);
        let l = mean_center(&VolPathIntegrator::new(1, 3), &scene, 8000);
        let expected = 0.5 * INV_PI * (-0.5 as Float).exp();
        assert!(approx_eq!(Float, l, expected, epsilon = 0.04 * expected));
    }
}
