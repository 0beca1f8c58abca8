//! Beckmann Distribution

use crate::base::*;
use crate::geometry::*;
use crate::reflection::*;

/// 1 / sqrt(π).
const SQRT_PI_INV: Float = 0.564_189_6;

/// Anisotropic Beckmann-Spizzichino distribution.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BeckmannDistribution {
    /// Roughness along the tangent direction.
    pub alpha_x: Float,

    /// Roughness along the bitangent direction.
    pub alpha_y: Float,
}

impl BeckmannDistribution {
    /// Create a new `BeckmannDistribution`.
    ///
    /// * `alpha_x` - Roughness along the tangent direction.
    /// * `alpha_y` - Roughness along the bitangent direction.
    pub fn new(alpha_x: Float, alpha_y: Float) -> Self {
        Self {
            alpha_x: max(0.001, alpha_x),
            alpha_y: max(0.001, alpha_y),
        }
    }

    /// Return the differential area of microfacets oriented with `wh`.
    ///
    /// * `wh` - Microfacet normal.
    pub fn d(&self, wh: &Vector3f) -> Float {
        let tan2_theta = tan_2_theta(wh);
        if tan2_theta.is_infinite() || tan2_theta.is_nan() {
            return 0.0;
        }
        let cos4_theta = cos_2_theta(wh) * cos_2_theta(wh);
        let e = tan2_theta
            * (cos_2_phi(wh) / (self.alpha_x * self.alpha_x)
                + sin_2_phi(wh) / (self.alpha_y * self.alpha_y));
        (-e).exp() / (PI * self.alpha_x * self.alpha_y * cos4_theta)
    }

    /// Returns the invisible masked microfacet area per visible microfacet
    /// area using the rational approximation of Smith's lambda.
    ///
    /// * `w` - The direction.
    pub fn lambda(&self, w: &Vector3f) -> Float {
        let abs_tan_theta = abs(tan_theta(w));
        if abs_tan_theta.is_infinite() || abs_tan_theta.is_nan() {
            return 0.0;
        }
        let alpha = (cos_2_phi(w) * self.alpha_x * self.alpha_x
            + sin_2_phi(w) * self.alpha_y * self.alpha_y)
            .sqrt();
        let a = 1.0 / (alpha * abs_tan_theta);
        if a >= 1.6 {
            0.0
        } else {
            (1.0 - 1.259 * a + 0.396 * a * a) / (3.535 * a + 2.181 * a * a)
        }
    }

    /// Sample a microfacet normal proportional to `D(wh)·|cos θh|`.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - The 2D uniform random values.
    pub fn sample_wh_all(&self, wo: &Vector3f, u: &Point2f) -> Vector3f {
        let log_sample = (1.0 - u[0]).ln();
        let (tan2_theta, phi) = if self.alpha_x == self.alpha_y {
            (-self.alpha_x * self.alpha_x * log_sample, u[1] * TWO_PI)
        } else {
            let mut phi = (self.alpha_y / self.alpha_x * (TWO_PI * u[1] + 0.5 * PI).tan()).atan();
            if u[1] > 0.5 {
                phi += PI;
            }
            let (sin_phi, cos_phi) = phi.sin_cos();
            let alphax2 = self.alpha_x * self.alpha_x;
            let alphay2 = self.alpha_y * self.alpha_y;
            (-log_sample / (cos_phi * cos_phi / alphax2 + sin_phi * sin_phi / alphay2), phi)
        };
        let cos_theta = 1.0 / (1.0 + tan2_theta).sqrt();
        let sin_theta = max(0.0, 1.0 - cos_theta * cos_theta).sqrt();
        let wh = spherical_direction(sin_theta, cos_theta, phi);
        if same_hemisphere(wo, &wh) {
            wh
        } else {
            -wh
        }
    }

    /// Sample a microfacet normal from the distribution of normals visible
    /// from `wo`.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - The 2D uniform random values.
    pub fn sample_wh_visible(&self, wo: &Vector3f, u: &Point2f) -> Vector3f {
        let flip = wo.z < 0.0;
        let wo = if flip { -(*wo) } else { *wo };

        // Stretch, sample the unit-roughness slope distribution, rotate and
        // unstretch.
        let wo_stretched = Vector3f::new(self.alpha_x * wo.x, self.alpha_y * wo.y, wo.z).normalize();
        let (sx, sy) = beckmann_sample_11(cos_theta(&wo_stretched), u[0], u[1]);
        let (cp, sp) = (cos_phi(&wo_stretched), sin_phi(&wo_stretched));
        let slope_x = self.alpha_x * (cp * sx - sp * sy);
        let slope_y = self.alpha_y * (sp * sx + cp * sy);

        let wh = Vector3f::new(-slope_x, -slope_y, 1.0).normalize();
        if flip {
            -wh
        } else {
            wh
        }
    }
}

/// Sample slopes of the visible normal distribution for unit roughness.
///
/// * `cos_theta_i` - Cosine of the stretched incident direction.
/// * `u1`          - The uniform random value.
/// * `u2`          - The uniform random value.
fn beckmann_sample_11(cos_theta_i: Float, u1: Float, u2: Float) -> (Float, Float) {
    // Normal incidence.
    if cos_theta_i > 0.9999 {
        let r = (-(1.0 - u1).ln()).sqrt();
        let (sin_phi, cos_phi) = (TWO_PI * u2).sin_cos();
        return (r * cos_phi, r * sin_phi);
    }

    let sin_theta_i = max(0.0, 1.0 - cos_theta_i * cos_theta_i).sqrt();
    let tan_theta_i = sin_theta_i / cos_theta_i;
    let cot_theta_i = 1.0 / tan_theta_i;

    // Search interval for the inverted CDF of the slope.
    let mut a = -1.0;
    let mut c = erf(cot_theta_i);
    let sample_x = max(u1, 1e-6);

    // Initial guess from a polynomial fit of the CDF.
    let theta_i = cos_theta_i.acos();
    let fit = 1.0 + theta_i * (-0.876 + theta_i * (0.4265 - 0.0594 * theta_i));
    let mut b = c - (1.0 + c) * (1.0 - sample_x).powf(fit);

    let normalization =
        1.0 / (1.0 + c + SQRT_PI_INV * tan_theta_i * (-cot_theta_i * cot_theta_i).exp());

    for _ in 0..9 {
        // Bisection fallback when Newton leaves the bracket.
        if !(b >= a && b <= c) {
            b = 0.5 * (a + c);
        }

        let inv_erf = erf_inv(b);
        let value = normalization
            * (1.0 + b + SQRT_PI_INV * tan_theta_i * (-inv_erf * inv_erf).exp())
            - sample_x;
        let derivative = normalization * (1.0 - inv_erf * tan_theta_i);
        if abs(value) < 1e-5 {
            break;
        }

        if value > 0.0 {
            c = b;
        } else {
            a = b;
        }
        b -= value / derivative;
    }

    (erf_inv(b), erf_inv(2.0 * max(u2, 1e-6) - 1.0))
}
