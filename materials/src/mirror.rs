//! Mirror

use rad_core::base::*;
use rad_core::geometry::*;
use rad_core::interaction::SurfaceInteraction;
use rad_core::reflection::*;
use rad_core::spectrum::*;

/// Implements a simple mirror, modeled with perfect specular reflection.
#[derive(Clone, Debug)]
pub struct MirrorBSDF {
    /// Reflectivity of the mirror.
    r: Spectrum,
}

impl MirrorBSDF {
    /// Create a new `MirrorBSDF`.
    ///
    /// * `r` - Reflectivity of the mirror.
    pub fn new(r: Spectrum) -> Self {
        Self { r }
    }
}

impl BSDF for MirrorBSDF {
    fn flags(&self) -> BxDFType {
        BxDFType::REFLECTION | BxDFType::SPECULAR
    }

    fn sample(&self, ctx: &BSDFContext, si: &SurfaceInteraction, _u_lobe: Float, _u: &Point2f) -> BSDFSample {
        if !ctx.is_enabled(self.flags()) || cos_theta(&si.wi) == 0.0 {
            return BSDFSample::default();
        }
        let wo = Vector3f::new(-si.wi.x, -si.wi.y, si.wi.z);
        BSDFSample::new(wo, 1.0, 1.0, self.flags(), self.r)
    }

    fn eval(&self, _ctx: &BSDFContext, _si: &SurfaceInteraction, _wo: &Vector3f) -> Spectrum {
        Spectrum::ZERO
    }

    fn pdf(&self, _ctx: &BSDFContext, _si: &SurfaceInteraction, _wo: &Vector3f) -> Float {
        0.0
    }

    fn get_type(&self) -> &'static str {
        "mirror"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::tests::*;

    #[test]
    fn reflects_about_normal() {
        let bsdf = MirrorBSDF::new(Spectrum::new(0.9));
        let ctx = BSDFContext::default();
        let si = interaction(Vector3f::new(0.6, 0.0, 0.8));
        let bs = bsdf.sample(&ctx, &si, 0.3, &Point2f::new(0.1, 0.2));
        assert_eq!(bs.wo, Vector3f::new(-si.wi.x, -si.wi.y, si.wi.z));
        assert_eq!(bs.pdf, 1.0);
        assert!(bs.sampled_type.is_specular());
        assert_eq!(bs.weight(), Spectrum::new(0.9));
        assert!(bsdf.eval(&ctx, &si, &bs.wo).is_black());
        assert_eq!(bsdf.pdf(&ctx, &si, &bs.wo), 0.0);
    }

    #[test]
    fn next_event_context_skips_mirror() {
        let bsdf = MirrorBSDF::new(Spectrum::ONE);
        let ctx = BSDFContext::non_specular(TransportMode::Radiance);
        let si = interaction(Vector3f::new(0.0, 0.0, 1.0));
        assert!(bsdf.sample(&ctx, &si, 0.5, &Point2f::new(0.5, 0.5)).is_invalid());
    }
}
