//! Diffuse BSDF

use super::*;
use crate::interaction::SurfaceInteraction;
use crate::sampling::*;

/// Reflectance used when an emitter is created without a BSDF.
pub const DEFAULT_DIFFUSE_REFLECTANCE: Float = 0.5;

/// Lambertian reflector; scatters incident illumination equally in all
/// directions on the side it was hit from.
#[derive(Clone, Debug)]
pub struct DiffuseBSDF {
    /// Fraction of incident light that is scattered.
    r: Spectrum,
}

impl DiffuseBSDF {
    /// Create a new instance of `DiffuseBSDF`.
    ///
    /// * `r` - Reflectance spectrum.
    pub fn new(r: Spectrum) -> Self {
        Self { r }
    }

    /// Returns the reflectance.
    pub fn reflectance(&self) -> Spectrum {
        self.r
    }
}

impl Default for DiffuseBSDF {
    /// Returns a grey diffuse BSDF.
    fn default() -> Self {
        Self::new(Spectrum::new(DEFAULT_DIFFUSE_REFLECTANCE))
    }
}

impl BSDF for DiffuseBSDF {
    fn flags(&self) -> BxDFType {
        BxDFType::REFLECTION | BxDFType::DIFFUSE
    }

    fn sample(&self, ctx: &BSDFContext, si: &SurfaceInteraction, _u_lobe: Float, u: &Point2f) -> BSDFSample {
        let cos_i = cos_theta(&si.wi);
        if !ctx.is_enabled(self.flags()) || cos_i == 0.0 {
            return BSDFSample::default();
        }

        let mut wo = cosine_sample_hemisphere(u);
        if cos_i < 0.0 {
            wo.z = -wo.z;
        }
        let pdf = cosine_hemisphere_pdf(abs_cos_theta(&wo));
        if pdf == 0.0 {
            return BSDFSample::default();
        }
        BSDFSample::new(wo, pdf, 1.0, self.flags(), self.r * (INV_PI * abs_cos_theta(&wo)))
    }

    fn eval(&self, ctx: &BSDFContext, si: &SurfaceInteraction, wo: &Vector3f) -> Spectrum {
        if !ctx.is_enabled(self.flags()) || !same_hemisphere(&si.wi, wo) {
            return Spectrum::ZERO;
        }
        self.r * (INV_PI * abs_cos_theta(wo))
    }

    fn pdf(&self, ctx: &BSDFContext, si: &SurfaceInteraction, wo: &Vector3f) -> Float {
        if !ctx.is_enabled(self.flags()) || !same_hemisphere(&si.wi, wo) {
            return 0.0;
        }
        cosine_hemisphere_pdf(abs_cos_theta(wo))
    }

    fn get_type(&self) -> &'static str {
        "diffuse"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn interaction(wi: Vector3f) -> SurfaceInteraction {
        let mut si = SurfaceInteraction::default();
        si.wi = wi.normalize();
        si
    }

    proptest! {
        #[test]
        fn sample_matches_eval_and_pdf(
            x in -0.9..0.9f32, z in 0.1..1.0f32, u0 in 0.0..1.0f32, u1 in 0.0..1.0f32
        ) {
            let bsdf = DiffuseBSDF::new(Spectrum::from_rgb(0.2, 0.5, 0.8));
            let ctx = BSDFContext::default();
            let si = interaction(Vector3f::new(x, 0.0, z));
            let bs = bsdf.sample(&ctx, &si, 0.5, &Point2f::new(u0, u1));
            if bs.pdf > 0.0 {
                prop_assert!(bs.wo.z > 0.0);
                prop_assert!(approx_eq!(Float, bs.pdf, bsdf.pdf(&ctx, &si, &bs.wo), epsilon = 1e-4));
                let f = bsdf.eval(&ctx, &si, &bs.wo);
                prop_assert!(approx_eq!(Float, bs.f[1], f[1], epsilon = 1e-4));
                // Throughput weight is the albedo.
                prop_assert!(approx_eq!(Float, bs.weight()[2], 0.8, epsilon = 1e-3));
            }
        }

        #[test]
        fn reciprocal(a in -0.9..0.9f32, b in -0.9..0.9f32) {
            let bsdf = DiffuseBSDF::default();
            let ctx = BSDFContext::default();
            let w1 = Vector3f::new(a, 0.2, 0.5).normalize();
            let w2 = Vector3f::new(0.1, b, 0.7).normalize();
            let f12 = bsdf.eval(&ctx, &interaction(w1), &w2)[0] / abs_cos_theta(&w2);
            let f21 = bsdf.eval(&ctx, &interaction(w2), &w1)[0] / abs_cos_theta(&w1);
            prop_assert!(approx_eq!(Float, f12, f21, epsilon = 1e-5));
        }
    }

    #[test]
    fn lower_hemisphere_is_black() {
        let bsdf = DiffuseBSDF::default();
        let ctx = BSDFContext::default();
        let si = interaction(Vector3f::new(0.0, 0.0, 1.0));
        let wo = Vector3f::new(0.0, 0.6, -0.8);
        assert!(bsdf.eval(&ctx, &si, &wo).is_black());
        assert_eq!(bsdf.pdf(&ctx, &si, &wo), 0.0);
    }

    #[test]
    fn disabled_lobe_is_black() {
        let bsdf = DiffuseBSDF::default();
        let ctx = BSDFContext::with_lobes(TransportMode::Radiance, BxDFType::GLOSSY | BxDFType::REFLECTION);
        let si = interaction(Vector3f::new(0.0, 0.0, 1.0));
        let bs = bsdf.sample(&ctx, &si, 0.5, &Point2f::new(0.3, 0.3));
        assert!(bs.is_invalid());
    }
}
