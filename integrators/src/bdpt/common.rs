//! Common

use super::vertex::*;
use rad_core::base::*;
use rad_core::geometry::*;
use rad_core::interaction::*;
use rad_core::light::*;
use rad_core::reflection::*;
use rad_core::sampler::*;
use rad_core::scene::*;
use rad_core::spectrum::*;

/// Returns the spatial density of an infinite light endpoint expressed per
/// unit solid angle, including the probability of selecting the environment
/// light.
///
/// * `scene` - The scene.
/// * `w`     - Direction the light path travels in.
pub(crate) fn infinite_light_density(scene: &Scene, w: &Vector3f) -> Float {
    match scene.environment_index() {
        Some(env) => scene.light_pmf(env) * scene.lights[env].pdf_direction(&Hit::default(), &-*w),
        None => 0.0,
    }
}

/// Returns the BSDF sampling density of `wn` at a surface reached from the
/// direction `wp`.
///
/// * `si` - The surface interaction.
/// * `wp` - World space direction towards the previous vertex.
/// * `wn` - World space direction towards the next vertex.
pub(crate) fn bsdf_pdf_between(si: &SurfaceInteraction, wp: &Vector3f, wn: &Vector3f) -> Float {
    let mut si = si.clone();
    si.hit.wo = *wp;
    si.wi = si.to_local(wp);
    si.bsdf_pdf(&BSDFContext::new(TransportMode::Radiance), wn)
}

/// Computes the generalized geometric term between two vertices including
/// the transmittance between them.
///
/// * `scene`   - The scene.
/// * `sampler` - The sampler.
/// * `v0`      - First vertex.
/// * `v1`      - Second vertex.
pub(crate) fn g(scene: &Scene, sampler: &mut dyn Sampler, v0: &Vertex, v1: &Vertex) -> Spectrum {
    let d = v0.p() - v1.p();
    let dist2 = d.length_squared();
    if dist2 == 0.0 {
        return Spectrum::ZERO;
    }
    let mut g = 1.0 / dist2;
    let d = d * g.sqrt();

    if v0.is_on_surface() {
        g *= v0.ns().abs_dot(&d);
    }
    if v1.is_on_surface() {
        g *= v1.ns().abs_dot(&d);
    }

    let vis = VisibilityTester::new(v0.hit().clone(), v1.hit().clone());
    vis.tr(scene, sampler) * g
}

/// Maps a zero density to 1. Delta distributions have a continuous density
/// of zero and drop out of the MIS ratios.
///
/// * `f` - The value to remap.
#[inline]
pub(crate) fn remap0(f: Float) -> Float {
    if f != 0.0 {
        f
    } else {
        1.0
    }
}
