//! Smooth Dielectric

use crate::common::*;
use rad_core::base::*;
use rad_core::error::*;
use rad_core::geometry::*;
use rad_core::interaction::SurfaceInteraction;
use rad_core::reflection::*;
use rad_core::spectrum::*;

/// Perfectly smooth glass-like interface; Fresnel-weighted specular
/// reflection and refraction. The surface normal points towards the exterior.
#[derive(Clone, Debug)]
pub struct SmoothDielectricBSDF {
    /// Interior index of refraction relative to the exterior.
    eta: Float,

    /// Scale applied to the reflected colour.
    r: Spectrum,

    /// Scale applied to the transmitted colour.
    t: Spectrum,
}

impl SmoothDielectricBSDF {
    /// Create a new `SmoothDielectricBSDF`.
    ///
    /// * `eta` - Interior index of refraction relative to the exterior.
    /// * `r`   - Scale applied to the reflected colour.
    /// * `t`   - Scale applied to the transmitted colour.
    pub fn new(eta: Float, r: Spectrum, t: Spectrum) -> Result<Self> {
        Ok(Self {
            eta: check_eta(eta)?,
            r,
            t,
        })
    }

    fn reflection(&self) -> BxDFType {
        BxDFType::REFLECTION | BxDFType::SPECULAR
    }

    fn transmission(&self) -> BxDFType {
        BxDFType::TRANSMISSION | BxDFType::SPECULAR
    }
}

impl BSDF for SmoothDielectricBSDF {
    fn flags(&self) -> BxDFType {
        self.reflection() | self.transmission()
    }

    fn sample(&self, ctx: &BSDFContext, si: &SurfaceInteraction, u_lobe: Float, _u: &Point2f) -> BSDFSample {
        let wi = si.wi;
        let cos_i = cos_theta(&wi);
        if cos_i == 0.0 {
            return BSDFSample::default();
        }

        let fresnel = fr_dielectric(cos_i, 1.0, self.eta);
        let pr = if ctx.is_enabled(self.reflection()) { fresnel } else { 0.0 };
        let pt = if ctx.is_enabled(self.transmission()) { 1.0 - fresnel } else { 0.0 };
        if pr + pt <= 0.0 {
            return BSDFSample::default();
        }

        if u_lobe < pr / (pr + pt) {
            let wo = Vector3f::new(-wi.x, -wi.y, wi.z);
            return BSDFSample::new(wo, pr / (pr + pt), 1.0, self.reflection(), self.r * fresnel);
        }

        // Refract through the normal on the side of `wi`.
        let (n, eta) = if cos_i > 0.0 {
            (Vector3f::new(0.0, 0.0, 1.0), self.eta)
        } else {
            (Vector3f::new(0.0, 0.0, -1.0), 1.0 / self.eta)
        };
        let wo = match refract(&wi, &n, 1.0 / eta) {
            Some(wo) => wo,
            None => return BSDFSample::default(),
        };

        let mut f = self.t * (1.0 - fresnel);
        if ctx.mode == TransportMode::Radiance {
            f = f / (eta * eta);
        }
        BSDFSample::new(wo, pt / (pr + pt), eta, self.transmission(), f)
    }

    fn eval(&self, _ctx: &BSDFContext, _si: &SurfaceInteraction, _wo: &Vector3f) -> Spectrum {
        Spectrum::ZERO
    }

    fn pdf(&self, _ctx: &BSDFContext, _si: &SurfaceInteraction, _wo: &Vector3f) -> Float {
        0.0
    }

    fn get_type(&self) -> &'static str {
        "smooth_dielectric"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::tests::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn glass() -> SmoothDielectricBSDF {
        SmoothDielectricBSDF::new(1.5, Spectrum::ONE, Spectrum::ONE).unwrap()
    }

    #[test]
    fn normal_incidence_splits_energy() {
        let bsdf = glass();
        let ctx = BSDFContext::new(TransportMode::Importance);
        let si = interaction(Vector3f::new(0.0, 0.0, 1.0));

        let r = bsdf.sample(&ctx, &si, 0.01, &Point2f::new(0.5, 0.5));
        assert!(r.sampled_type.contains(BxDFType::REFLECTION));
        assert!(approx_eq!(Float, r.pdf, 0.04, epsilon = 1e-5));
        assert!(approx_eq!(Float, r.weight()[0], 1.0, epsilon = 1e-5));

        let t = bsdf.sample(&ctx, &si, 0.5, &Point2f::new(0.5, 0.5));
        assert!(t.sampled_type.contains(BxDFType::TRANSMISSION));
        assert!(approx_eq!(Float, t.wo.z, -1.0, epsilon = 1e-5));
        assert!(approx_eq!(Float, t.eta, 1.5, epsilon = 1e-6));
        assert!(approx_eq!(Float, t.weight()[0], 1.0, epsilon = 1e-5));
    }

    #[test]
    fn radiance_is_compressed_entering_glass() {
        let bsdf = glass();
        let ctx = BSDFContext::new(TransportMode::Radiance);
        let si = interaction(Vector3f::new(0.0, 0.0, 1.0));
        let t = bsdf.sample(&ctx, &si, 0.5, &Point2f::new(0.5, 0.5));
        assert!(approx_eq!(Float, t.weight()[1], 1.0 / 2.25, epsilon = 1e-5));
    }

    #[test]
    fn total_internal_reflection() {
        let bsdf = glass();
        let ctx = BSDFContext::default();
        let si = interaction(Vector3f::new(0.9, 0.0, -0.3));
        let bs = bsdf.sample(&ctx, &si, 0.999, &Point2f::new(0.5, 0.5));
        assert!(bs.sampled_type.contains(BxDFType::REFLECTION));
        assert!(bs.wo.z < 0.0);
        assert_eq!(bs.pdf, 1.0);
    }

    proptest! {
        #[test]
        fn refraction_obeys_snell(x in -0.9..0.9f32, z in 0.1..1.0f32, inside in any::<bool>()) {
            let bsdf = glass();
            let ctx = BSDFContext::with_lobes(TransportMode::Importance, BxDFType::TRANSMISSION | BxDFType::SPECULAR);
            let si = interaction(Vector3f::new(x, 0.0, if inside { -z } else { z }));
            let bs = bsdf.sample(&ctx, &si, 0.5, &Point2f::new(0.5, 0.5));
            if !bs.is_invalid() {
                let (eta_i, eta_t) = if inside { (1.5, 1.0) } else { (1.0, 1.5) };
                prop_assert!(approx_eq!(Float, eta_i * sin_theta(&si.wi), eta_t * sin_theta(&bs.wo), epsilon = 1e-4));
                prop_assert!(bs.wo.z * si.wi.z < 0.0);
            }
        }
    }
}
