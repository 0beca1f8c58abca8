//! Rough Dielectric

use crate::common::*;
use rad_core::base::*;
use rad_core::error::*;
use rad_core::geometry::*;
use rad_core::interaction::SurfaceInteraction;
use rad_core::microfacet::*;
use rad_core::reflection::*;
use rad_core::spectrum::*;

/// Microfacet model for rough glass-like interfaces with both reflection and
/// transmission. The surface normal points towards the exterior.
#[derive(Clone, Debug)]
pub struct RoughDielectricBSDF {
    /// Microfacet normal distribution.
    distribution: MicrofacetDistribution,

    /// Interior index of refraction relative to the exterior.
    eta: Float,

    /// Scale applied to the reflected colour.
    r: Spectrum,

    /// Scale applied to the transmitted colour.
    t: Spectrum,
}

/// Geometry shared by `eval()` and `pdf()` for one pair of directions.
struct Configuration {
    /// Microfacet normal in the upper hemisphere.
    wh: Vector3f,

    /// Relative index of refraction across the interface along the path;
    /// 1 for reflection.
    eta: Float,

    /// Fresnel reflectance at the microfacet.
    fresnel: Float,

    /// Both directions are on the same side.
    reflect: bool,
}

impl RoughDielectricBSDF {
    /// Create a new `RoughDielectricBSDF`.
    ///
    /// * `distribution` - Microfacet normal distribution.
    /// * `eta`          - Interior index of refraction relative to the exterior.
    /// * `r`            - Scale applied to the reflected colour.
    /// * `t`            - Scale applied to the transmitted colour.
    pub fn new(distribution: MicrofacetDistribution, eta: Float, r: Spectrum, t: Spectrum) -> Result<Self> {
        let eta = check_eta(eta)?;
        debug!("Rough dielectric eta {eta}, {:?}", distribution.get_type());
        Ok(Self { distribution, eta, r, t })
    }

    fn reflection(&self) -> BxDFType {
        BxDFType::REFLECTION | BxDFType::GLOSSY
    }

    fn transmission(&self) -> BxDFType {
        BxDFType::TRANSMISSION | BxDFType::GLOSSY
    }

    /// Returns the relative index of refraction for a path arriving from `wi`
    /// and crossing the interface.
    fn eta_across(&self, wi: &Vector3f) -> Float {
        if cos_theta(wi) > 0.0 {
            self.eta
        } else {
            1.0 / self.eta
        }
    }

    /// Returns the probabilities of choosing reflection and transmission.
    fn lobe_probabilities(&self, ctx: &BSDFContext, fresnel: Float) -> (Float, Float) {
        let pr = if ctx.is_enabled(self.reflection()) { fresnel } else { 0.0 };
        let pt = if ctx.is_enabled(self.transmission()) { 1.0 - fresnel } else { 0.0 };
        (pr, pt)
    }

    fn configuration(&self, wi: &Vector3f, wo: &Vector3f) -> Option<Configuration> {
        let (cos_i, cos_o) = (cos_theta(wi), cos_theta(wo));
        if cos_i == 0.0 || cos_o == 0.0 {
            return None;
        }
        let reflect = cos_i * cos_o > 0.0;
        let eta = if reflect { 1.0 } else { self.eta_across(wi) };
        let wh = if reflect {
            reflection_half_vector(wi, wo)?
        } else {
            refraction_half_vector(wi, wo, eta)?
        };

        // Discard back-facing microfacets.
        if !microfacet_visible(&wh, wi, wo) {
            return None;
        }
        Some(Configuration {
            wh,
            eta,
            fresnel: fr_dielectric(wi.dot(&wh), 1.0, self.eta),
            reflect,
        })
    }
}

impl BSDF for RoughDielectricBSDF {
    fn flags(&self) -> BxDFType {
        self.reflection() | self.transmission()
    }

    fn sample(&self, ctx: &BSDFContext, si: &SurfaceInteraction, u_lobe: Float, u: &Point2f) -> BSDFSample {
        let wi = si.wi;
        if cos_theta(&wi) == 0.0 {
            return BSDFSample::default();
        }

        // Sample a microfacet facing `wi`.
        let wh = self.distribution.sample_wh(&wi, u);
        let cos_h = wi.dot(&wh);
        if cos_h <= 0.0 {
            return BSDFSample::default();
        }

        let fresnel = fr_dielectric(if wh.z < 0.0 { -cos_h } else { cos_h }, 1.0, self.eta);
        let (pr, pt) = self.lobe_probabilities(ctx, fresnel);
        if pr + pt <= 0.0 {
            return BSDFSample::default();
        }

        let (wo, eta, sampled_type) = if u_lobe < pr / (pr + pt) {
            (reflect(&wi, &wh), 1.0, self.reflection())
        } else {
            let eta = self.eta_across(&wi);
            match refract(&wi, &wh, 1.0 / eta) {
                Some(wo) => (wo.normalize(), eta, self.transmission()),
                None => return BSDFSample::default(),
            }
        };
        if same_hemisphere(&wi, &wo) != (sampled_type == self.reflection()) {
            return BSDFSample::default();
        }

        let pdf = self.pdf(ctx, si, &wo);
        if pdf == 0.0 {
            return BSDFSample::default();
        }
        BSDFSample::new(wo, pdf, eta, sampled_type, self.eval(ctx, si, &wo))
    }

    fn eval(&self, ctx: &BSDFContext, si: &SurfaceInteraction, wo: &Vector3f) -> Spectrum {
        let wi = &si.wi;
        let c = match self.configuration(wi, wo) {
            Some(c) => c,
            None => return Spectrum::ZERO,
        };
        let (cos_i, cos_o) = (abs_cos_theta(wi), abs_cos_theta(wo));
        let dg = self.distribution.d(&c.wh) * self.distribution.g(wi, wo);

        if c.reflect {
            if !ctx.is_enabled(self.reflection()) {
                return Spectrum::ZERO;
            }
            return self.r * (c.fresnel * dg / (4.0 * cos_i));
        }

        if !ctx.is_enabled(self.transmission()) {
            return Spectrum::ZERO;
        }
        let denom = wi.dot(&c.wh) + c.eta * wo.dot(&c.wh);
        if denom == 0.0 {
            return Spectrum::ZERO;
        }

        // Radiance is compressed by η² when it enters the denser medium.
        let factor = match ctx.mode {
            TransportMode::Radiance => 1.0 / c.eta,
            TransportMode::Importance => 1.0,
        };
        let value = (1.0 - c.fresnel)
            * abs(dg * c.eta * c.eta * wo.dot(&c.wh) * wi.dot(&c.wh) * factor * factor / (cos_i * cos_o * denom * denom))
            * cos_o;
        self.t * value
    }

    fn pdf(&self, ctx: &BSDFContext, si: &SurfaceInteraction, wo: &Vector3f) -> Float {
        let wi = &si.wi;
        let c = match self.configuration(wi, wo) {
            Some(c) => c,
            None => return 0.0,
        };
        let (pr, pt) = self.lobe_probabilities(ctx, c.fresnel);
        if pr + pt <= 0.0 {
            return 0.0;
        }

        // Microfacet density as sampled from `wi`.
        let wh_i = if same_hemisphere(wi, &c.wh) { c.wh } else { -c.wh };
        let pdf_wh = self.distribution.pdf(wi, &wh_i);

        let pdf = if c.reflect {
            pdf_wh / (4.0 * wi.abs_dot(&c.wh)) * pr / (pr + pt)
        } else {
            let denom = wi.dot(&c.wh) + c.eta * wo.dot(&c.wh);
            let dwh_dwo = abs(c.eta * c.eta * wo.dot(&c.wh)) / (denom * denom);
            pdf_wh * dwh_dwo * pt / (pr + pt)
        };
        if pdf.is_finite() {
            pdf
        } else {
            0.0
        }
    }

    fn get_type(&self) -> &'static str {
        "rough_dielectric"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::tests::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn glass(alpha: Float, visible: bool) -> RoughDielectricBSDF {
        RoughDielectricBSDF::new(
            MicrofacetDistribution::new(MicrofacetType::Beckmann, alpha, alpha, visible),
            1.5,
            Spectrum::ONE,
            Spectrum::ONE,
        )
        .unwrap()
    }

    #[test]
    fn rejects_bad_eta() {
        let d = MicrofacetDistribution::new(MicrofacetType::Beckmann, 0.1, 0.1, true);
        assert!(RoughDielectricBSDF::new(d, -1.0, Spectrum::ONE, Spectrum::ONE).is_err());
    }

    #[test]
    fn pdf_integrates_to_at_most_one() {
        let bsdf = glass(0.3, true);
        let ctx = BSDFContext::default();
        for wi in [Vector3f::new(0.3, 0.0, 0.9), Vector3f::new(0.4, 0.2, -0.8)] {
            let si = interaction(wi);
            let total = integrate_sphere(|w| bsdf.pdf(&ctx, &si, w));
            assert!(total > 0.9 && total < 1.02, "{total}");
        }
    }

    #[test]
    fn only_enabled_lobe_is_sampled() {
        let bsdf = glass(0.2, true);
        let ctx = BSDFContext::with_lobes(TransportMode::Radiance, BxDFType::TRANSMISSION | BxDFType::GLOSSY);
        let si = interaction(Vector3f::new(0.2, 0.1, 0.9));
        for &u_lobe in &[0.0, 0.5, 0.999] {
            let bs = bsdf.sample(&ctx, &si, u_lobe, &Point2f::new(0.4, 0.6));
            assert!(!bs.is_invalid());
            assert!(bs.wo.z < 0.0);
            assert!(approx_eq!(Float, bs.eta, 1.5, epsilon = 1e-6));
        }
    }

    proptest! {
        #[test]
        fn sample_matches_eval_and_pdf(
            x in -0.9..0.9f32, z in -1.0..1.0f32, u_lobe in 0.0..1.0f32, u0 in 0.0..0.99f32, u1 in 0.0..1.0f32,
            radiance: bool
        ) {
            prop_assume!(abs(z) > 0.1);
            let bsdf = glass(0.3, true);
            let mode = if radiance { TransportMode::Radiance } else { TransportMode::Importance };
            let ctx = BSDFContext::new(mode);
            let si = interaction(Vector3f::new(x, 0.1, z));
            let bs = bsdf.sample(&ctx, &si, u_lobe, &Point2f::new(u0, u1));
            if !bs.is_invalid() {
                let pdf = bsdf.pdf(&ctx, &si, &bs.wo);
                prop_assert!(approx_eq!(Float, bs.pdf, pdf, epsilon = 1e-3 * bs.pdf));
                let f = bsdf.eval(&ctx, &si, &bs.wo);
                prop_assert!(approx_eq!(Float, bs.f[0], f[0], epsilon = 1e-3 * bs.f[0]));
                prop_assert_eq!(bs.sampled_type.contains(BxDFType::TRANSMISSION), bs.wo.z * si.wi.z < 0.0);
            }
        }

        #[test]
        fn adjoint_reciprocity(a in -0.8..0.8f32, b in -0.8..0.8f32, flip: bool) {
            // Radiance transport from w1 to w2 equals importance transport from w2 to w1.
            let bsdf = glass(0.4, false);
            let w1 = Vector3f::new(a, 0.2, 0.6).normalize();
            let w2 = Vector3f::new(0.1, b, if flip { 0.7 } else { -0.7 }).normalize();
            let radiance = BSDFContext::new(TransportMode::Radiance);
            let importance = BSDFContext::new(TransportMode::Importance);
            let f12 = bsdf.eval(&radiance, &interaction(w1), &w2)[0] / abs_cos_theta(&w2);
            let f21 = bsdf.eval(&importance, &interaction(w2), &w1)[0] / abs_cos_theta(&w1);
            prop_assert!(approx_eq!(Float, f12, f21, epsilon = 1e-3 * max(f12, 1.0)));
        }
    }
}
