//! Bi-directional Path Tracer

use crate::common::{add_splat, check_emission_sampling, correct_shading_normal};
use crate::integrator::*;
use rad_core::base::*;
use rad_core::error::*;
use rad_core::film::*;
use rad_core::geometry::*;
use rad_core::light::*;
use rad_core::options::*;
use rad_core::reflection::*;
use rad_core::sampler::*;
use rad_core::scene::*;
use rad_core::spectrum::*;
use std::mem;

mod common;
mod vertex;

use common::*;
use vertex::*;

/// Implements bi-directional path tracing. Every pixel sample traces a camera
/// and a light subpath and combines all connection strategies with the
/// balance heuristic. Strategies that hit the camera directly are splatted.
pub struct BDPTIntegrator {
    /// Maximum path depth.
    max_depth: usize,
}

impl BDPTIntegrator {
    /// Create a new `BDPTIntegrator`.
    ///
    /// * `max_depth` - Maximum path depth.
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Create a new `BDPTIntegrator` from render options.
    ///
    /// * `options` - Render options.
    pub fn from_options(options: &RenderOptions) -> Self {
        Self::new(options.max_depth)
    }
}

impl Integrator for BDPTIntegrator {
    /// Returns the name used in log output.
    fn get_type(&self) -> &'static str {
        "bdpt"
    }

    /// Reject scenes with lights that cannot sample emitted rays.
    ///
    /// * `scene` - The scene.
    fn preprocess(&mut self, scene: &Scene) -> Result<()> {
        check_emission_sampling(scene, "bidirectional path tracer")
    }

    /// Generate a single sample using BDPT.
    ///
    /// * `scene`   - The scene.
    /// * `p_film`  - Film position of the sample.
    /// * `sampler` - The sampler.
    /// * `splats`  - Splat buffer.
    fn render_sample(
        &self,
        scene: &Scene,
        p_film: &Point2f,
        sampler: &mut dyn Sampler,
        splats: &mut FrameBuffer,
    ) -> Result<Spectrum> {
        // Trace the camera and light subpaths.
        let mut camera_vertices = generate_camera_subpath(scene, sampler, self.max_depth + 2, p_film);
        let time = camera_vertices[0].time();
        let mut light_vertices = generate_light_subpath(scene, sampler, self.max_depth + 1, time)?;

        // Execute all BDPT connection strategies.
        let mut l = Spectrum::ZERO;
        for t in 1..=camera_vertices.len() {
            for s in 0..=light_vertices.len() {
                let depth = s as isize + t as isize - 2;
                if (s == 1 && t == 1) || depth < 0 || depth > self.max_depth as isize {
                    continue;
                }

                let (l_path, p_raster) = connect_bdpt(scene, &mut light_vertices, &mut camera_vertices, s, t, sampler);
                trace!("Connect bdpt s: {s}, t: {t}, l_path: {l_path}");
                if t != 1 {
                    l += l_path;
                } else if let Some(p_raster) = p_raster {
                    add_splat(splats, &p_raster, l_path);
                }
            }
        }

        debug!("Add film sample p_film: {p_film}, L: {l}");
        Ok(l)
    }
}

/// Generate the camera subpath; it always holds at least the camera vertex.
///
/// * `scene`        - The scene.
/// * `sampler`      - The sampler.
/// * `max_vertices` - Maximum number of vertices.
/// * `p_film`       - The point on camera film.
fn generate_camera_subpath(scene: &Scene, sampler: &mut dyn Sampler, max_vertices: usize, p_film: &Point2f) -> Vec<Vertex> {
    let camera_sample = get_camera_sample(p_film, sampler);
    let (mut ray, weight) = scene.generate_camera_ray(&camera_sample);
    ray.scale_differentials(1.0 / (sampler.samples_per_pixel() as Float).sqrt());
    let beta = Spectrum::new(weight);

    // Generate first vertex on camera subpath and start random walk.
    let mut path = Vec::with_capacity(max_vertices);
    path.push(Vertex::camera_from_ray(&ray, beta));
    let (pdf_pos, pdf_dir) = scene.camera.pdf_we(&ray);
    debug!("Starting camera subpath. Ray: {ray}, beta {beta}, pdf_pos {pdf_pos}, pdf_dir {pdf_dir}");

    random_walk(
        scene,
        ray,
        sampler,
        beta,
        pdf_dir,
        max_vertices - 1,
        TransportMode::Radiance,
        &mut path,
    );
    path
}

/// Generate the light subpath; it is empty when the sampled light emits
/// nothing.
///
/// * `scene`        - The scene.
/// * `sampler`      - The sampler.
/// * `max_vertices` - Maximum number of vertices.
/// * `time`         - Time for the emitted ray.
fn generate_light_subpath(
    scene: &Scene,
    sampler: &mut dyn Sampler,
    max_vertices: usize,
    time: Float,
) -> Result<Vec<Vertex>> {
    let mut path = Vec::with_capacity(max_vertices);
    if max_vertices == 0 {
        return Ok(path);
    }

    // Sample initial ray for light subpath.
    let u_light = sampler.get_1d();
    let u1 = sampler.get_2d();
    let u2 = sampler.get_2d();
    let es = match scene.sample_light_emission(u_light, &u1, &u2, time)? {
        Some(es) => es,
        None => return Ok(path),
    };
    let Le {
        ray,
        n_light,
        pdf_pos,
        pdf_dir,
        value: le,
    } = es.le;
    if pdf_pos == 0.0 || pdf_dir == 0.0 || es.pmf == 0.0 || le.is_black() {
        return Ok(path);
    }

    // Generate first vertex on light subpath and start random walk.
    let flags = scene.lights[es.light].get_type();
    path.push(Vertex::light_from_le(es.light, flags, &ray, n_light, le, pdf_pos * es.pmf));
    let beta = le * n_light.abs_dot(&ray.d) / (es.pmf * pdf_pos * pdf_dir);
    debug!("Starting light subpath. Ray: {ray}, le {le}, beta {beta}, pdf_pos {pdf_pos}, pdf_dir {pdf_dir}");

    let d = ray.d;
    random_walk(
        scene,
        ray,
        sampler,
        beta,
        pdf_dir,
        max_vertices - 1,
        TransportMode::Importance,
        &mut path,
    );

    // Correct subpath sampling densities for infinite lights.
    if path[0].is_infinite_light() {
        if path.len() > 1 {
            path[1].pdf_fwd = pdf_pos;
            if path[1].is_on_surface() {
                path[1].pdf_fwd *= d.abs_dot(&path[1].ng());
            }
        }
        path[0].pdf_fwd = infinite_light_density(scene, &d);
    }

    Ok(path)
}

/// Appends up to `max_vertices` scattering vertices to a subpath whose first
/// vertex is already in `path`.
///
/// * `scene`        - The scene.
/// * `ray`          - The ray leaving the last vertex.
/// * `sampler`      - The sampler.
/// * `beta`         - Path throughput weight.
/// * `pdf`          - Solid angle density of `ray.d`.
/// * `max_vertices` - Maximum number of vertices to add.
/// * `mode`         - The light transport mode.
/// * `path`         - The path.
#[allow(clippy::too_many_arguments)]
fn random_walk(
    scene: &Scene,
    mut ray: Ray,
    sampler: &mut dyn Sampler,
    mut beta: Spectrum,
    pdf: Float,
    max_vertices: usize,
    mode: TransportMode,
    path: &mut Vec<Vertex>,
) {
    if max_vertices == 0 {
        return;
    }

    let mut bounces = 0;
    let mut null_crossings = 0;
    let mut pdf_fwd = pdf;
    let mut pdf_rev;

    loop {
        trace!("Random walk. Bounces {bounces}, beta {beta}, pdf_fwd {pdf_fwd}");

        // Trace a ray and sample the medium, if any.
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

        let prev = path.len() - 1;
        if let Some(mi) = mi {
            // Record medium interaction and compute forward density.
            let v = Vertex::medium(mi, beta, pdf_fwd, &path[prev]);
            path.push(v);
            bounces += 1;
            if bounces >= max_vertices {
                break;
            }

            // Sample direction and compute reverse density at preceding vertex.
            let hit = path[prev + 1].hit().clone();
            let (p, wi) = match &path[prev + 1].kind {
                VertexKind::Medium { mi } => mi.sample_phase(&sampler.get_2d()),
                _ => break,
            };
            if !(p > 0.0) {
                break;
            }
            pdf_fwd = p;
            pdf_rev = p;
            ray = hit.spawn_ray(&wi);
        } else {
            let si = match found {
                Some(si) => si,
                None => {
                    // Capture escaped rays when tracing from the camera.
                    if mode == TransportMode::Radiance {
                        path.push(Vertex::escaped(&ray, beta, pdf_fwd));
                    }
                    break;
                }
            };

            // Skip over medium boundaries.
            if si.bsdf.is_none() {
                null_crossings += 1;
                if null_crossings > MAX_NULL_BOUNDARIES {
                    warn!("Subpath crossed more than {MAX_NULL_BOUNDARIES} boundaries; terminating");
                    break;
                }
                ray = si.hit.spawn_ray(&ray.d);
                continue;
            }

            let v = Vertex::surface(si, beta, pdf_fwd, &path[prev]);
            path.push(v);
            bounces += 1;
            if bounces >= max_vertices {
                break;
            }

            // Sample BSDF at current vertex and compute reverse probability.
            let sampled = match &path[prev + 1].kind {
                VertexKind::Surface { si } => {
                    let ctx = BSDFContext::new(mode);
                    let u_lobe = sampler.get_1d();
                    let u = sampler.get_2d();
                    si.sample_bsdf(&ctx, u_lobe, &u).map(|(bs, wi)| {
                        let wo = si.hit.wo;
                        let rev = bsdf_pdf_between(si, &wi, &wo);
                        let correction = correct_shading_normal(si, &wo, &wi, mode);
                        (bs, wi, rev, correction, si.hit.spawn_ray(&wi))
                    })
                }
                _ => None,
            };
            let (bs, wi, rev, correction, next_ray) = match sampled {
                Some(sampled) => sampled,
                None => break,
            };
            trace!("Random walk sampled dir {wi} f: {}, pdf: {}", bs.f, bs.pdf);

            beta *= bs.weight() * correction;
            pdf_fwd = bs.pdf;
            pdf_rev = rev;
            if bs.sampled_type.is_specular() {
                path[prev + 1].delta = true;
                pdf_rev = 0.0;
                pdf_fwd = 0.0;
            }
            ray = next_ray;
        }

        // Compute reverse area density at preceding vertex.
        let rev = path[prev + 1].convert_density(pdf_rev, &path[prev]);
        path[prev].pdf_rev = rev;
    }
}

/// Returns the balance heuristic weight of the strategy that connects `s`
/// light and `t` camera vertices, by evaluating the densities every other
/// strategy would have produced the same path with.
///
/// * `scene`           - The scene.
/// * `light_vertices`  - The vertices in the light subpath.
/// * `camera_vertices` - The vertices in the camera subpath.
/// * `sampled`         - The vertex sampled by the `s = 1` or `t = 1`
///                       strategies.
/// * `s`               - Number of light subpath vertices.
/// * `t`               - Number of camera subpath vertices.
fn mis_weight(
    scene: &Scene,
    light_vertices: &mut [Vertex],
    camera_vertices: &mut [Vertex],
    sampled: Option<&Vertex>,
    s: usize,
    t: usize,
) -> Float {
    if s + t == 2 {
        return 1.0;
    }

    // Lookup connection vertices and predecessors.
    let qs = s.checked_sub(1);
    let pt = t.checked_sub(1);
    let qs_minus = s.checked_sub(2);
    let pt_minus = t.checked_sub(2);

    // Vertices are modified in place and restored afterwards in reverse order.

    // Update sampled vertex for `s = 1` or `t = 1` strategy.
    let mut backup_qs = None;
    let mut backup_pt = None;
    if let (1, Some(qs), Some(v)) = (s, qs, sampled) {
        backup_qs = Some(mem::replace(&mut light_vertices[qs], v.clone()));
    } else if let (1, Some(pt), Some(v)) = (t, pt, sampled) {
        backup_pt = Some(mem::replace(&mut camera_vertices[pt], v.clone()));
    }

    // Mark connection vertices as non-degenerate.
    let backup_pt_delta = pt.map(|pt| mem::replace(&mut camera_vertices[pt].delta, false));
    let backup_qs_delta = qs.map(|qs| mem::replace(&mut light_vertices[qs].delta, false));

    // Update reverse density of vertex `pt_{t-1}`.
    let mut backup_pt_pdf_rev = None;
    if let Some(pt) = pt {
        let pdf_rev = match (qs, pt_minus) {
            (Some(qs), _) => light_vertices[qs].pdf(
                scene,
                qs_minus.map(|i| &light_vertices[i]),
                &camera_vertices[pt],
            ),
            (None, Some(pt_minus)) => camera_vertices[pt].pdf_light_origin(scene, &camera_vertices[pt_minus]),
            (None, None) => 0.0,
        };
        backup_pt_pdf_rev = Some(mem::replace(&mut camera_vertices[pt].pdf_rev, pdf_rev));
    }

    // Update reverse density of vertex `pt_{t-2}`.
    let mut backup_pt_minus_pdf_rev = None;
    if let (Some(pt), Some(pt_minus)) = (pt, pt_minus) {
        let pdf_rev = match qs {
            Some(qs) => camera_vertices[pt].pdf(scene, Some(&light_vertices[qs]), &camera_vertices[pt_minus]),
            None => camera_vertices[pt].pdf_light(scene, &camera_vertices[pt_minus]),
        };
        backup_pt_minus_pdf_rev = Some(mem::replace(&mut camera_vertices[pt_minus].pdf_rev, pdf_rev));
    }

    // Update reverse densities of vertices `qs_{s-1}` and `qs_{s-2}`.
    let mut backup_qs_pdf_rev = None;
    if let (Some(qs), Some(pt)) = (qs, pt) {
        let pdf_rev = camera_vertices[pt].pdf(
            scene,
            pt_minus.map(|i| &camera_vertices[i]),
            &light_vertices[qs],
        );
        backup_qs_pdf_rev = Some(mem::replace(&mut light_vertices[qs].pdf_rev, pdf_rev));
    }

    let mut backup_qs_minus_pdf_rev = None;
    if let (Some(qs), Some(qs_minus)) = (qs, qs_minus) {
        let pdf_rev = light_vertices[qs].pdf(scene, pt.map(|i| &camera_vertices[i]), &light_vertices[qs_minus]);
        backup_qs_minus_pdf_rev = Some(mem::replace(&mut light_vertices[qs_minus].pdf_rev, pdf_rev));
    }

    let mut sum_ri = 0.0;

    // Consider hypothetical connection strategies along the camera subpath.
    let mut ri = 1.0;
    for i in (1..t).rev() {
        ri *= remap0(camera_vertices[i].pdf_rev) / remap0(camera_vertices[i].pdf_fwd);
        if !camera_vertices[i].delta && !camera_vertices[i - 1].delta {
            sum_ri += ri;
        }
    }

    // Consider hypothetical connection strategies along the light subpath.
    ri = 1.0;
    for i in (0..s).rev() {
        ri *= remap0(light_vertices[i].pdf_rev) / remap0(light_vertices[i].pdf_fwd);
        let delta_light_vertex = if i > 0 {
            light_vertices[i - 1].delta
        } else {
            light_vertices[0].is_delta_light()
        };
        if !light_vertices[i].delta && !delta_light_vertex {
            sum_ri += ri;
        }
    }

    // Restore in reverse order of backups.
    if let (Some(v), Some(i)) = (backup_qs_minus_pdf_rev, qs_minus) {
        light_vertices[i].pdf_rev = v;
    }
    if let (Some(v), Some(i)) = (backup_qs_pdf_rev, qs) {
        light_vertices[i].pdf_rev = v;
    }
    if let (Some(v), Some(i)) = (backup_pt_minus_pdf_rev, pt_minus) {
        camera_vertices[i].pdf_rev = v;
    }
    if let (Some(v), Some(i)) = (backup_pt_pdf_rev, pt) {
        camera_vertices[i].pdf_rev = v;
    }
    if let (Some(v), Some(i)) = (backup_qs_delta, qs) {
        light_vertices[i].delta = v;
    }
    if let (Some(v), Some(i)) = (backup_pt_delta, pt) {
        camera_vertices[i].delta = v;
    }
    if let (Some(v), Some(i)) = (backup_pt, pt) {
        camera_vertices[i] = v;
    }
    if let (Some(v), Some(i)) = (backup_qs, qs) {
        light_vertices[i] = v;
    }

    1.0 / (1.0 + sum_ri)
}

/// Connects the first `s` light and `t` camera subpath vertices and returns
/// the MIS weighted contribution of the resulting path, with the raster
/// position for `t = 1` strategies.
///
/// * `scene`           - The scene.
/// * `light_vertices`  - The vertices in the light subpath.
/// * `camera_vertices` - The vertices in the camera subpath.
/// * `s`               - Number of light subpath vertices.
/// * `t`               - Number of camera subpath vertices.
/// * `sampler`         - The sampler.
fn connect_bdpt(
    scene: &Scene,
    light_vertices: &mut [Vertex],
    camera_vertices: &mut [Vertex],
    s: usize,
    t: usize,
    sampler: &mut dyn Sampler,
) -> (Spectrum, Option<Point2f>) {
    let mut l = Spectrum::ZERO;
    let mut p_raster = None;

    // Escaped camera rays are only complete paths on their own.
    if t > 1 && s != 0 && matches!(camera_vertices[t - 1].kind, VertexKind::Light { .. }) {
        return (l, p_raster);
    }

    let mut sampled = None;
    if s == 0 {
        // Interpret the camera subpath as a complete path.
        let pt = &camera_vertices[t - 1];
        if pt.is_light() && t >= 2 {
            l = pt.le(scene, &camera_vertices[t - 2]) * pt.beta;
        }
    } else if t == 1 {
        // Sample a point on the camera and connect it to the light subpath.
        let qs = &light_vertices[s - 1];
        if qs.is_connectible() {
            let u = sampler.get_2d();
            if let Some(cs) = scene.camera.sample_wi(qs.hit(), &u) {
                if cs.pdf > 0.0 && !cs.value.is_black() {
                    p_raster = Some(cs.p_raster);
                    let camera = Vertex::camera_from_hit(cs.visibility.p1.clone(), cs.value / cs.pdf);
                    l = qs.beta * qs.f(&camera, TransportMode::Importance) * camera.beta;
                    if qs.is_on_surface() {
                        l *= cs.wi.abs_dot(&qs.ns());
                    }

                    // Only check visibility after we know that the path would make a non-zero contribution.
                    if !l.is_black() {
                        l *= cs.visibility.tr(scene, sampler);
                    }
                    sampled = Some(camera);
                }
            }
        }
    } else if s == 1 {
        // Sample a point on a light and connect it to the camera subpath.
        let pt = &camera_vertices[t - 1];
        if pt.is_connectible() {
            let u_light = sampler.get_1d();
            let u = sampler.get_2d();
            if let Some(ls) = scene.sample_light_direction(pt.hit(), u_light, &u) {
                if let Some(vis) = ls.sample.visibility.as_ref() {
                    let flags = scene.lights[ls.light].get_type();
                    let mut light =
                        Vertex::light_from_sample(ls.light, flags, vis.p1.clone(), ls.sample.value / ls.sample.pdf);
                    light.pdf_fwd = light.pdf_light_origin(scene, pt);

                    l = pt.beta * pt.f(&light, TransportMode::Radiance) * light.beta;
                    if pt.is_on_surface() {
                        l *= ls.sample.wi.abs_dot(&pt.ns());
                    }

                    // Only check visibility if the path would carry radiance.
                    if !l.is_black() {
                        l *= vis.tr(scene, sampler);
                    }
                    sampled = Some(light);
                }
            }
        }
    } else {
        // Handle all other bidirectional connection cases.
        let qs = &light_vertices[s - 1];
        let pt = &camera_vertices[t - 1];
        if qs.is_connectible() && pt.is_connectible() {
            l = qs.beta * qs.f(pt, TransportMode::Importance) * pt.f(qs, TransportMode::Radiance) * pt.beta;
            if !l.is_black() {
                l *= g(scene, sampler, qs, pt);
            }
            trace!("General connect s: {s}, t: {t}, qs: {qs}, pt: {pt}, L: {l}");
        }
    }

    // Compute MIS weight for connection strategy.
    let mis_wt = if l.is_black() {
        0.0
    } else {
        mis_weight(scene, light_vertices, camera_vertices, sampled.as_ref(), s, t)
    };
    trace!("MIS weight for (s, t) = ({s}, {t}) connection: {mis_wt}");

    (l * mis_wt, p_raster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_scenes::*;
    use float_cmp::approx_eq;
    use rad_core::interaction::Hit;
    use rad_lights::InfiniteAreaLight;
    use rad_samplers::RandomSampler;
    use std::sync::Arc;

    /// Returns the pixel value of a 1x1 render of `n` samples.
    fn render_pixel(integrator: &BDPTIntegrator, scene: &Scene, n: usize) -> Spectrum {
        let mut sampler = RandomSampler::new(n, Some(17)).expect("sampler");
        sampler.start_pixel(&Point2i::new(0, 0));
        let mut film = FrameBuffer::new(Point2i::new(1, 1)).expect("frame buffer");
        for _ in 0..n {
            let l = integrator
                .render_sample(scene, &Point2f::new(0.5, 0.5), &mut sampler, &mut film)
                .expect("render sample");
            film.add_sample(0, 0, l);
            sampler.start_next_sample();
        }
        film.get(0, 0)
    }

    #[test]
    fn point_light_direct_illumination() {
        let scene = floor_with_point_light(4.0, 2.0);
        let l = render_pixel(&BDPTIntegrator::new(1), &scene, 256);
        // ρ/π · I / h²
        assert!(approx_eq!(Float, l[0], 0.5 * INV_PI, epsilon = 0.02 * 0.5 * INV_PI));
    }

    #[test]
    fn environment_lit_floor() {
        // Everything above an infinite diffuse floor is the environment, so
        // the reflected radiance is ρ · Le.
        let env: ArcLight = Arc::new(InfiniteAreaLight::new(Spectrum::new(2.0)).expect("environment"));
        let scene = floor_scene(vec![env], None);
        let l = render_pixel(&BDPTIntegrator::new(1), &scene, 4000);
        assert!(approx_eq!(Float, l[1], 1.0, epsilon = 0.05));
    }

    #[test]
    fn zero_depth_sees_only_emitters() {
        let scene = floor_with_point_light(4.0, 2.0);
        assert!(render_pixel(&BDPTIntegrator::new(0), &scene, 16).is_black());
    }

    #[test]
    fn subpaths_respect_vertex_limits() {
        let scene = floor_with_point_light(4.0, 2.0);
        let mut sampler = RandomSampler::new(1, Some(3)).expect("sampler");
        sampler.start_pixel(&Point2i::new(0, 0));

        let camera = generate_camera_subpath(&scene, &mut sampler, 3, &Point2f::new(0.5, 0.5));
        assert!(matches!(camera[0].kind, VertexKind::Camera { .. }));
        assert!(camera.len() <= 3);
        assert!(matches!(camera[1].kind, VertexKind::Surface { .. }));

        let light = generate_light_subpath(&scene, &mut sampler, 2, 0.0).expect("light subpath");
        assert!(light.len() <= 2);
        assert!(light[0].is_delta_light());
    }

    #[test]
    fn rejects_lights_without_emission_sampling() {
        struct NoEmission;
        impl Light for NoEmission {
            fn get_type(&self) -> LightType {
                LightType::AREA_LIGHT
            }
            fn get_name(&self) -> &'static str {
                "no_emission"
            }
            fn power(&self) -> Spectrum {
                Spectrum::ZERO
            }
            fn sample_direction(&self, _hit: &Hit, _u: &Point2f) -> DirectionSample {
                DirectionSample::default()
            }
            fn pdf_direction(&self, _hit: &Hit, _wi: &Vector3f) -> Float {
                0.0
            }
        }

        let scene = floor_scene(vec![Arc::new(NoEmission)], None);
        let mut integrator = BDPTIntegrator::new(5);
        assert!(matches!(
            Integrator::preprocess(&mut integrator, &scene),
            Err(Error::Incompatible(_))
        ));
    }
}
