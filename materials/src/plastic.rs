//! Rough Plastic

use crate::common::*;
use rad_core::base::*;
use rad_core::error::*;
use rad_core::geometry::*;
use rad_core::interaction::SurfaceInteraction;
use rad_core::microfacet::*;
use rad_core::reflection::*;
use rad_core::sampling::*;
use rad_core::spectrum::*;

/// Diffuse base under a rough dielectric coating. The diffuse lobe is
/// attenuated by the light transmitted through the coating in both
/// directions and the coating adds a glossy microfacet highlight.
#[derive(Clone, Debug)]
pub struct RoughPlasticBSDF {
    /// Microfacet distribution of the coating.
    distribution: MicrofacetDistribution,

    /// Diffuse reflectance of the base.
    kd: Spectrum,

    /// Specular reflectance of the coating.
    ks: Spectrum,

    /// Index of refraction of the coating.
    eta: Float,

    /// Share of the specular lobe before the Fresnel adjustment.
    specular_weight: Float,
}

impl RoughPlasticBSDF {
    /// Create a new `RoughPlasticBSDF`.
    ///
    /// * `distribution` - Microfacet distribution of the coating.
    /// * `kd`           - Diffuse reflectance of the base.
    /// * `ks`           - Specular reflectance of the coating.
    /// * `eta`          - Index of refraction of the coating.
    pub fn new(distribution: MicrofacetDistribution, kd: Spectrum, ks: Spectrum, eta: Float) -> Result<Self> {
        let eta = check_eta(eta)?;
        if !kd.is_finite() || !ks.is_finite() || kd.min_component_value() < 0.0 || ks.min_component_value() < 0.0 {
            return Err(Error::InvalidArgument(format!("invalid plastic reflectance kd={kd} ks={ks}")));
        }

        let total = kd.avg() + ks.avg();
        let specular_weight = if total > 0.0 { ks.avg() / total } else { 0.5 };
        Ok(Self {
            distribution,
            kd,
            ks,
            eta,
            specular_weight,
        })
    }

    fn diffuse_lobe(&self) -> BxDFType {
        BxDFType::REFLECTION | BxDFType::DIFFUSE
    }

    fn glossy_lobe(&self) -> BxDFType {
        BxDFType::REFLECTION | BxDFType::GLOSSY
    }

    /// Returns the probability of sampling the glossy lobe for the incident
    /// direction, honouring the enabled lobes.
    ///
    /// * `ctx`   - Query context.
    /// * `cos_i` - Absolute cosine of the incident direction.
    fn specular_probability(&self, ctx: &BSDFContext, cos_i: Float) -> Option<Float> {
        let diffuse = ctx.is_enabled(self.diffuse_lobe());
        let glossy = ctx.is_enabled(self.glossy_lobe());
        match (diffuse, glossy) {
            (false, false) => None,
            (true, false) => Some(0.0),
            (false, true) => Some(1.0),
            (true, true) => {
                let f = fr_dielectric(cos_i, 1.0, self.eta);
                let s = f * self.specular_weight;
                let d = (1.0 - f) * (1.0 - self.specular_weight);
                Some(if s + d > 0.0 { s / (s + d) } else { 0.0 })
            }
        }
    }
}

impl BSDF for RoughPlasticBSDF {
    fn flags(&self) -> BxDFType {
        self.diffuse_lobe() | self.glossy_lobe()
    }

    fn sample(&self, ctx: &BSDFContext, si: &SurfaceInteraction, u_lobe: Float, u: &Point2f) -> BSDFSample {
        let wi = si.wi;
        let cos_i = abs_cos_theta(&wi);
        if cos_i == 0.0 {
            return BSDFSample::default();
        }
        let ps = match self.specular_probability(ctx, cos_i) {
            Some(ps) => ps,
            None => return BSDFSample::default(),
        };

        let (wo, lobe) = if u_lobe < ps {
            let wh = self.distribution.sample_wh(&wi, u);
            if wi.dot(&wh) <= 0.0 {
                return BSDFSample::default();
            }
            (reflect(&wi, &wh), self.glossy_lobe())
        } else {
            let mut wo = cosine_sample_hemisphere(u);
            if wi.z < 0.0 {
                wo.z = -wo.z;
            }
            (wo, self.diffuse_lobe())
        };
        if !same_hemisphere(&wi, &wo) {
            return BSDFSample::default();
        }

        let pdf = self.pdf(ctx, si, &wo);
        if pdf == 0.0 {
            return BSDFSample::default();
        }
        BSDFSample::new(wo, pdf, 1.0, lobe, self.eval(ctx, si, &wo))
    }

    fn eval(&self, ctx: &BSDFContext, si: &SurfaceInteraction, wo: &Vector3f) -> Spectrum {
        let wi = &si.wi;
        if !same_hemisphere(wi, wo) {
            return Spectrum::ZERO;
        }
        let cos_i = abs_cos_theta(wi);
        let cos_o = abs_cos_theta(wo);
        if cos_i == 0.0 || cos_o == 0.0 {
            return Spectrum::ZERO;
        }

        let mut f = Spectrum::ZERO;
        if ctx.is_enabled(self.glossy_lobe()) {
            if let Some(wh) = reflection_half_vector(wi, wo) {
                let fresnel = fr_dielectric(wi.abs_dot(&wh), 1.0, self.eta);
                let dg = self.distribution.d(&wh) * self.distribution.g(wi, wo);
                f += self.ks * (fresnel * dg / (4.0 * cos_i));
            }
        }
        if ctx.is_enabled(self.diffuse_lobe()) {
            let fi = fr_dielectric(cos_i, 1.0, self.eta);
            let fo = fr_dielectric(cos_o, 1.0, self.eta);
            f += self.kd * (INV_PI * (1.0 - fi) * (1.0 - fo) * cos_o);
        }
        f
    }

    fn pdf(&self, ctx: &BSDFContext, si: &SurfaceInteraction, wo: &Vector3f) -> Float {
        let wi = &si.wi;
        if !same_hemisphere(wi, wo) {
            return 0.0;
        }
        let cos_i = abs_cos_theta(wi);
        if cos_i == 0.0 {
            return 0.0;
        }
        let ps = match self.specular_probability(ctx, cos_i) {
            Some(ps) => ps,
            None => return 0.0,
        };

        let mut pdf = (1.0 - ps) * cosine_hemisphere_pdf(abs_cos_theta(wo));
        if ps > 0.0 {
            if let Some(wh) = reflection_half_vector(wi, wo) {
                let wh = if same_hemisphere(wi, &wh) { wh } else { -wh };
                let specular = self.distribution.pdf(wi, &wh) / (4.0 * wi.abs_dot(&wh));
                if specular.is_finite() {
                    pdf += ps * specular;
                }
            }
        }
        pdf
    }

    fn get_type(&self) -> &'static str {
        "rough_plastic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::tests::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn plastic(alpha: Float) -> RoughPlasticBSDF {
        RoughPlasticBSDF::new(
            MicrofacetDistribution::new(MicrofacetType::TrowbridgeReitz, alpha, alpha, true),
            Spectrum::from_rgb(0.5, 0.3, 0.1),
            Spectrum::ONE,
            1.5,
        )
        .unwrap()
    }

    #[test]
    fn rejects_bad_parameters() {
        let d = MicrofacetDistribution::new(MicrofacetType::Beckmann, 0.1, 0.1, false);
        assert!(RoughPlasticBSDF::new(d, Spectrum::new(-0.1), Spectrum::ONE, 1.5).is_err());
        assert!(RoughPlasticBSDF::new(d, Spectrum::ONE, Spectrum::ONE, 0.0).is_err());
    }

    #[test]
    fn albedo_matches_quadrature() {
        let bsdf = plastic(0.3);
        let ctx = BSDFContext::default();
        let si = interaction(Vector3f::new(0.3, 0.1, 0.8));

        let quadrature = integrate_sphere(|w| bsdf.eval(&ctx, &si, w)[0]);

        let n = 256;
        let mut estimate = 0.0_f64;
        for i in 0..n {
            for j in 0..n {
                let u = Point2f::new((i as Float + 0.5) / n as Float, (j as Float + 0.5) / n as Float);
                let u_lobe = ((i * n + j) as Float * 0.618_034).fract();
                let bs = bsdf.sample(&ctx, &si, u_lobe, &u);
                if !bs.is_invalid() {
                    estimate += bs.weight()[0] as f64;
                }
            }
        }
        let estimate = (estimate / (n * n) as f64) as Float;
        assert!(quadrature > 0.3 && quadrature < 1.0, "{quadrature}");
        assert!(approx_eq!(Float, estimate, quadrature, epsilon = 0.03), "{estimate} vs {quadrature}");
    }

    #[test]
    fn diffuse_only_context() {
        let bsdf = plastic(0.2);
        let ctx = BSDFContext::with_lobes(TransportMode::Radiance, BxDFType::REFLECTION | BxDFType::DIFFUSE);
        let si = interaction(Vector3f::new(0.0, 0.0, 1.0));
        let bs = bsdf.sample(&ctx, &si, 0.0, &Point2f::new(0.3, 0.7));
        assert!(bs.sampled_type.contains(BxDFType::DIFFUSE));
        assert!(approx_eq!(Float, bs.pdf, cosine_hemisphere_pdf(bs.wo.z), epsilon = 1e-5));

        // Normal incidence on both sides: (1 - 0.04)² / π.
        let f = bsdf.eval(&ctx, &si, &Vector3f::new(0.0, 0.0, 1.0));
        assert!(approx_eq!(Float, f[0], 0.5 * 0.96 * 0.96 * INV_PI, epsilon = 1e-5));
    }

    #[test]
    fn works_from_below() {
        let bsdf = plastic(0.2);
        let ctx = BSDFContext::default();
        let si = interaction(Vector3f::new(0.2, 0.0, -0.9));
        let bs = bsdf.sample(&ctx, &si, 0.9, &Point2f::new(0.4, 0.4));
        assert!(!bs.is_invalid());
        assert!(bs.wo.z < 0.0);
    }

    proptest! {
        #[test]
        fn sample_matches_eval_and_pdf(
            x in -0.9..0.9f32, z in 0.1..1.0f32, u_lobe in 0.0..1.0f32, u0 in 0.0..0.99f32, u1 in 0.0..1.0f32
        ) {
            let bsdf = plastic(0.3);
            let ctx = BSDFContext::default();
            let si = interaction(Vector3f::new(x, -0.1, z));
            let bs = bsdf.sample(&ctx, &si, u_lobe, &Point2f::new(u0, u1));
            if !bs.is_invalid() {
                prop_assert!(bs.wo.z > 0.0);
                prop_assert!(approx_eq!(Float, bs.pdf, bsdf.pdf(&ctx, &si, &bs.wo), epsilon = 1e-3 * bs.pdf));
                prop_assert!(approx_eq!(Float, bs.f[0], bsdf.eval(&ctx, &si, &bs.wo)[0], epsilon = 1e-3 * bs.f[0]));
            }
        }

        #[test]
        fn reciprocal(a in -0.9..0.9f32, b in -0.9..0.9f32) {
            let bsdf = plastic(0.3);
            let ctx = BSDFContext::default();
            let w1 = Vector3f::new(a, 0.2, 0.5).normalize();
            let w2 = Vector3f::new(0.1, b, 0.7).normalize();
            let f12 = bsdf.eval(&ctx, &interaction(w1), &w2)[1] / abs_cos_theta(&w2);
            let f21 = bsdf.eval(&ctx, &interaction(w2), &w1)[1] / abs_cos_theta(&w1);
            prop_assert!(approx_eq!(Float, f12, f21, epsilon = 1e-4 * max(f12, 1.0)));
        }
    }
}
