//! Rough Conductor

use crate::common::*;
use rad_core::base::*;
use rad_core::geometry::*;
use rad_core::interaction::SurfaceInteraction;
use rad_core::microfacet::*;
use rad_core::reflection::*;
use rad_core::spectrum::*;

/// Torrance-Sparrow microfacet reflection off a conductor.
#[derive(Clone, Debug)]
pub struct RoughConductorBSDF {
    /// Microfacet normal distribution.
    distribution: MicrofacetDistribution,

    /// Index of refraction of the conductor.
    eta: Spectrum,

    /// Absorption coefficient.
    k: Spectrum,

    /// Scale applied to the reflected colour.
    r: Spectrum,
}

impl RoughConductorBSDF {
    /// Create a new `RoughConductorBSDF`.
    ///
    /// * `distribution` - Microfacet normal distribution.
    /// * `eta`          - Index of refraction of the conductor.
    /// * `k`            - Absorption coefficient.
    /// * `r`            - Scale applied to the reflected colour.
    pub fn new(distribution: MicrofacetDistribution, eta: Spectrum, k: Spectrum, r: Spectrum) -> Self {
        Self { distribution, eta, k, r }
    }

    fn lobe(&self) -> BxDFType {
        BxDFType::REFLECTION | BxDFType::GLOSSY
    }
}

impl BSDF for RoughConductorBSDF {
    fn flags(&self) -> BxDFType {
        self.lobe()
    }

    fn sample(&self, ctx: &BSDFContext, si: &SurfaceInteraction, _u_lobe: Float, u: &Point2f) -> BSDFSample {
        let wi = si.wi;
        if !ctx.is_enabled(self.lobe()) || cos_theta(&wi) == 0.0 {
            return BSDFSample::default();
        }

        // Sample microfacet orientation and reflected direction.
        let wh = self.distribution.sample_wh(&wi, u);
        if wi.dot(&wh) <= 0.0 {
            return BSDFSample::default();
        }
        let wo = reflect(&wi, &wh);
        if !same_hemisphere(&wi, &wo) {
            return BSDFSample::default();
        }

        let pdf = self.pdf(ctx, si, &wo);
        if pdf == 0.0 {
            return BSDFSample::default();
        }
        BSDFSample::new(wo, pdf, 1.0, self.lobe(), self.eval(ctx, si, &wo))
    }

    fn eval(&self, ctx: &BSDFContext, si: &SurfaceInteraction, wo: &Vector3f) -> Spectrum {
        let wi = &si.wi;
        if !ctx.is_enabled(self.lobe()) || !same_hemisphere(wi, wo) {
            return Spectrum::ZERO;
        }
        let cos_i = abs_cos_theta(wi);
        if cos_i == 0.0 || abs_cos_theta(wo) == 0.0 {
            return Spectrum::ZERO;
        }
        let wh = match reflection_half_vector(wi, wo) {
            Some(wh) => wh,
            None => return Spectrum::ZERO,
        };

        let f = fr_conductor(wi.abs_dot(&wh), Spectrum::ONE, self.eta, self.k);
        self.r * f * (self.distribution.d(&wh) * self.distribution.g(wi, wo) / (4.0 * cos_i))
    }

    fn pdf(&self, ctx: &BSDFContext, si: &SurfaceInteraction, wo: &Vector3f) -> Float {
        let wi = &si.wi;
        if !ctx.is_enabled(self.lobe()) || !same_hemisphere(wi, wo) {
            return 0.0;
        }
        let wh = match reflection_half_vector(wi, wo) {
            Some(wh) => wh,
            None => return 0.0,
        };
        let wh = if same_hemisphere(wi, &wh) { wh } else { -wh };
        let pdf = self.distribution.pdf(wi, &wh) / (4.0 * wi.abs_dot(&wh));
        if pdf.is_finite() {
            pdf
        } else {
            0.0
        }
    }

    fn get_type(&self) -> &'static str {
        "rough_conductor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::tests::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn gold(alpha: Float, visible: bool) -> RoughConductorBSDF {
        RoughConductorBSDF::new(
            MicrofacetDistribution::new(MicrofacetType::TrowbridgeReitz, alpha, alpha, visible),
            Spectrum::from_rgb(0.143, 0.374, 1.442),
            Spectrum::from_rgb(3.983, 2.385, 1.603),
            Spectrum::ONE,
        )
    }

    #[test]
    fn albedo_matches_quadrature() {
        let bsdf = gold(0.3, true);
        let ctx = BSDFContext::default();
        let si = interaction(Vector3f::new(0.5, 0.2, 0.7));

        let quadrature = integrate_sphere(|w| bsdf.eval(&ctx, &si, w)[0]);

        let n = 256;
        let mut estimate = 0.0_f64;
        for i in 0..n {
            for j in 0..n {
                let u = Point2f::new((i as Float + 0.5) / n as Float, (j as Float + 0.5) / n as Float);
                let bs = bsdf.sample(&ctx, &si, 0.5, &u);
                if !bs.is_invalid() {
                    estimate += bs.weight()[0] as f64;
                }
            }
        }
        let estimate = (estimate / (n * n) as f64) as Float;
        assert!(quadrature > 0.5 && quadrature <= 1.0, "{quadrature}");
        assert!(approx_eq!(Float, estimate, quadrature, epsilon = 0.03), "{estimate} vs {quadrature}");
    }

    #[test]
    fn transmission_is_black() {
        let bsdf = gold(0.2, false);
        let ctx = BSDFContext::default();
        let si = interaction(Vector3f::new(0.0, 0.0, 1.0));
        let wo = Vector3f::new(0.0, 0.0, -1.0);
        assert!(bsdf.eval(&ctx, &si, &wo).is_black());
        assert_eq!(bsdf.pdf(&ctx, &si, &wo), 0.0);
    }

    proptest! {
        #[test]
        fn sample_matches_eval_and_pdf(
            x in -0.9..0.9f32, z in 0.1..1.0f32, u0 in 0.0..0.99f32, u1 in 0.0..1.0f32, visible: bool
        ) {
            let bsdf = gold(0.4, visible);
            let ctx = BSDFContext::default();
            let si = interaction(Vector3f::new(x, 0.1, z));
            let bs = bsdf.sample(&ctx, &si, 0.5, &Point2f::new(u0, u1));
            if !bs.is_invalid() {
                prop_assert!(bs.wo.z > 0.0);
                prop_assert!(approx_eq!(Float, bs.pdf, bsdf.pdf(&ctx, &si, &bs.wo), epsilon = 1e-3 * bs.pdf));
                prop_assert!(approx_eq!(Float, bs.f[1], bsdf.eval(&ctx, &si, &bs.wo)[1], epsilon = 1e-3 * bs.f[1]));
            }
        }

        #[test]
        fn reciprocal(a in -0.9..0.9f32, b in -0.9..0.9f32) {
            let bsdf = gold(0.3, false);
            let ctx = BSDFContext::default();
            let w1 = Vector3f::new(a, 0.2, 0.5).normalize();
            let w2 = Vector3f::new(0.1, b, 0.7).normalize();
            let f12 = bsdf.eval(&ctx, &interaction(w1), &w2)[2] / abs_cos_theta(&w2);
            let f21 = bsdf.eval(&ctx, &interaction(w2), &w1)[2] / abs_cos_theta(&w1);
            prop_assert!(approx_eq!(Float, f12, f21, epsilon = 1e-4 * max(f12, 1.0)));
        }
    }
}
