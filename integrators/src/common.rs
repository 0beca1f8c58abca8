//! Common

use rad_core::base::*;
use rad_core::error::*;
use rad_core::film::*;
use rad_core::geometry::*;
use rad_core::interaction::*;
use rad_core::reflection::*;
use rad_core::sampler::*;
use rad_core::sampling::*;
use rad_core::scene::*;
use rad_core::spectrum::*;

/// A path vertex that scatters light: a surface point with a BSDF or a point
/// inside a participating medium.
pub trait ScatteringPoint {
    /// Returns the interaction point.
    fn hit(&self) -> &Hit;

    /// Returns the cosine-weighted scattering value towards `wi` for radiance
    /// arriving from the previous vertex, and the density with which the
    /// point's own sampling routine picks `wi`. Delta lobes are excluded.
    ///
    /// * `wi` - World space direction towards the light.
    fn scatter(&self, wi: &Vector3f) -> (Spectrum, Float);
}

impl ScatteringPoint for SurfaceInteraction {
    fn hit(&self) -> &Hit {
        &self.hit
    }

    fn scatter(&self, wi: &Vector3f) -> (Spectrum, Float) {
        let ctx = BSDFContext::non_specular(TransportMode::Radiance);
        (self.bsdf_eval(&ctx, wi), self.bsdf_pdf(&ctx, wi))
    }
}

impl ScatteringPoint for MediumInteraction {
    fn hit(&self) -> &Hit {
        &self.hit
    }

    fn scatter(&self, wi: &Vector3f) -> (Spectrum, Float) {
        let p = self.eval_phase(wi);
        (Spectrum::new(p), p)
    }
}

/// Returns the light-sampling half of a next event estimate with multiple
/// importance sampling. The matching BSDF or phase sampled half is counted
/// when a path continued from `point` hits the light; see
/// `emission_mis_weight()`.
///
/// * `point`        - The scattering point.
/// * `ls`           - The light sample; its pdf includes the light selection
///                    probability.
/// * `scene`        - The scene.
/// * `sampler`      - The sampler.
/// * `handle_media` - Compute transmittance through media instead of a binary
///                    visibility test.
pub fn estimate_direct<P: ScatteringPoint + ?Sized>(
    point: &P,
    ls: &LightSample,
    scene: &Scene,
    sampler: &mut dyn Sampler,
    handle_media: bool,
) -> Spectrum {
    let sample = &ls.sample;
    if sample.is_invalid() {
        return Spectrum::ZERO;
    }

    let (f, scattering_pdf) = point.scatter(&sample.wi);
    if f.is_black() {
        return Spectrum::ZERO;
    }

    let visibility = match sample.visibility.as_ref() {
        Some(visibility) => visibility,
        None => return Spectrum::ZERO,
    };
    let tr = if handle_media {
        visibility.tr(scene, sampler)
    } else if visibility.unoccluded(scene) {
        Spectrum::ONE
    } else {
        Spectrum::ZERO
    };
    if tr.is_black() {
        return Spectrum::ZERO;
    }

    let weight = if sample.is_delta {
        1.0
    } else {
        power_heuristic(1, sample.pdf, 1, scattering_pdf)
    };
    trace!(
        "Direct light {}: wi {}, f {f}, pdf {}, scattering pdf {scattering_pdf}, weight {weight}",
        ls.light,
        sample.wi,
        sample.pdf
    );
    f * sample.value * tr * (weight / sample.pdf)
}

/// Pick one light and return its next event estimate at a scattering point.
///
/// * `point`        - The scattering point.
/// * `scene`        - The scene.
/// * `sampler`      - The sampler.
/// * `handle_media` - Compute transmittance through media.
pub fn sample_one_light<P: ScatteringPoint + ?Sized>(
    point: &P,
    scene: &Scene,
    sampler: &mut dyn Sampler,
    handle_media: bool,
) -> Spectrum {
    let u_light = sampler.get_1d();
    let u = sampler.get_2d();
    match scene.sample_light_direction(point.hit(), u_light, &u) {
        Some(ls) => estimate_direct(point, &ls, scene, sampler, handle_media),
        None => Spectrum::ZERO,
    }
}

/// Returns the MIS weight of emission found by continuing a path in direction
/// `wi` from `prev`, against the density of sampling the light directly.
///
/// * `scene`    - The scene.
/// * `light`    - Index of the light that was hit.
/// * `prev`     - The vertex the path continued from.
/// * `wi`       - Direction of the continuation.
/// * `prev_pdf` - Density of the continuation direction.
pub fn emission_mis_weight(scene: &Scene, light: usize, prev: &Hit, wi: &Vector3f, prev_pdf: Float) -> Float {
    let light_pdf = scene.pdf_light_direction(light, prev, wi);
    power_heuristic(1, prev_pdf, 1, light_pdf)
}

/// Russian roulette. Returns `false` if the path is terminated; otherwise the
/// throughput is divided by the survival probability.
///
/// * `beta`      - Path throughput.
/// * `eta_scale` - Accumulated squared relative index of refraction.
/// * `depth`     - Current path depth.
/// * `rr_depth`  - Depth after which the roulette is played.
/// * `sampler`   - The sampler.
pub fn russian_roulette(
    beta: &mut Spectrum,
    eta_scale: Float,
    depth: usize,
    rr_depth: usize,
    sampler: &mut dyn Sampler,
) -> bool {
    if depth <= rr_depth {
        return true;
    }
    let survival = min((*beta * eta_scale).max_component_value(), 0.95);
    if !(survival > 0.0) || sampler.get_1d() >= survival {
        return false;
    }
    *beta /= survival;
    true
}

/// Returns the correction for the asymmetry shading normals introduce when
/// importance is transported.
///
/// * `si`   - The surface interaction.
/// * `wo`   - Direction towards the previous vertex.
/// * `wi`   - Sampled direction.
/// * `mode` - Transport mode.
pub(crate) fn correct_shading_normal(
    si: &SurfaceInteraction,
    wo: &Vector3f,
    wi: &Vector3f,
    mode: TransportMode,
) -> Float {
    match mode {
        TransportMode::Importance => {
            let num = wo.abs_dot(&si.shading.n) * wi.abs_dot(&si.hit.n);
            let denom = wo.abs_dot(&si.hit.n) * wi.abs_dot(&si.shading.n);

            // wi is occasionally perpendicular to the shading normal; keep the
            // result finite.
            if denom == 0.0 {
                0.0
            } else {
                num / denom
            }
        }
        TransportMode::Radiance => 1.0,
    }
}

/// Returns true if the BSDF at a surface can be evaluated for a pair of
/// directions, i.e. next event estimation is useful there.
///
/// * `si` - The surface interaction.
pub(crate) fn has_non_specular(si: &SurfaceInteraction) -> bool {
    si.bsdf.as_ref().map_or(false, |bsdf| bsdf.flags().has_non_specular())
}

/// Add a contribution to the splat buffer, dropping values that are not
/// finite or are negative.
///
/// * `splats`   - The splat buffer.
/// * `p_raster` - Raster position.
/// * `v`        - The contribution.
pub(crate) fn add_splat(splats: &mut FrameBuffer, p_raster: &Point2f, v: Spectrum) {
    if v.is_black() {
        return;
    }
    if !v.is_finite() || v.min_component_value() < 0.0 {
        warn!("Dropping invalid splat {v} at {p_raster}");
        return;
    }
    splats.add_splat(p_raster, v);
}

/// Returns `Error::Incompatible` if a light in the scene cannot sample
/// emitted rays.
///
/// * `scene`      - The scene.
/// * `integrator` - Name of the integrator used in the error message.
pub(crate) fn check_emission_sampling(scene: &Scene, integrator: &str) -> Result<()> {
    let u = Point2f::new(0.5, 0.5);
    for light in scene.lights.iter() {
        match light.sample_le(&u, &u, 0.0) {
            Ok(_) => {}
            Err(Error::NotImplemented(msg)) => {
                return Err(Error::Incompatible(format!(
                    "{integrator} requires lights that sample emission: {msg}"
                )));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
