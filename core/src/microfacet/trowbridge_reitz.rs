//! Trowbridge-Reitz Distribution

use crate::base::*;
use crate::geometry::*;
use crate::reflection::*;

/// Anisotropic Trowbridge-Reitz (GGX) distribution.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrowbridgeReitzDistribution {
    /// Roughness along the tangent direction.
    pub alpha_x: Float,

    /// Roughness along the bitangent direction.
    pub alpha_y: Float,
}

impl TrowbridgeReitzDistribution {
    /// Create a new `TrowbridgeReitzDistribution`.
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
    #[rustfmt::skip]
    pub fn d(&self, wh: &Vector3f) -> Float {
        let tan2_theta = tan_2_theta(wh);
        if tan2_theta.is_infinite() || tan2_theta.is_nan() {
            0.0
        } else {
            let cos4_theta = cos_2_theta(wh) * cos_2_theta(wh);
            let e =
                (cos_2_phi(wh) / (self.alpha_x * self.alpha_x) +
                 sin_2_phi(wh) / (self.alpha_y * self.alpha_y)) *
                tan2_theta;
            1.0 / (PI * self.alpha_x * self.alpha_y * cos4_theta * (1.0 + e) * (1.0 + e))
        }
    }

    /// Returns the invisible masked microfacet area per visible microfacet area.
    ///
    /// * `w` - The direction.
    #[rustfmt::skip]
    pub fn lambda(&self, w: &Vector3f) -> Float {
        let abs_tan_theta = abs(tan_theta(w));
        if abs_tan_theta.is_infinite() || abs_tan_theta.is_nan() {
            0.0
        } else {
            let alpha = (cos_2_phi(w) * self.alpha_x * self.alpha_x +
                         sin_2_phi(w) * self.alpha_y * self.alpha_y).sqrt();
            let alpha2_tan2_theta = (alpha * abs_tan_theta) * (alpha * abs_tan_theta);
            (-1.0 + (1.0 + alpha2_tan2_theta).sqrt()) / 2.0
        }
    }

    /// Sample a microfacet normal proportional to `D(wh)·|cos θh|`.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - The 2D uniform random values.
    pub fn sample_wh_all(&self, wo: &Vector3f, u: &Point2f) -> Vector3f {
        let mut phi = TWO_PI * u[1];
        let cos_theta = if self.alpha_x == self.alpha_y {
            let tan_theta2 = self.alpha_x * self.alpha_x * u[0] / (1.0 - u[0]);
            1.0 / (1.0 + tan_theta2).sqrt()
        } else {
            phi = (self.alpha_y / self.alpha_x * (TWO_PI * u[1] + 0.5 * PI).tan()).atan();
            if u[1] > 0.5 {
                phi += PI;
            }
            let (sin_phi, cos_phi) = phi.sin_cos();
            let alphax2 = self.alpha_x * self.alpha_x;
            let alphay2 = self.alpha_y * self.alpha_y;
            let alpha2 = 1.0 / (cos_phi * cos_phi / alphax2 + sin_phi * sin_phi / alphay2);
            let tan_theta2 = alpha2 * u[0] / (1.0 - u[0]);
            1.0 / (1.0 + tan_theta2).sqrt()
        };
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
        let wh = trowbridge_reitz_sample(&wo, self.alpha_x, self.alpha_y, u[0], u[1]);
        if flip {
            -wh
        } else {
            wh
        }
    }
}

/// Helper function for sampling visible area of normals.
///
/// * `cos_theta` - Cosine of the angle θ measured from the incident direction
///                 to the z-axis.
/// * `u1`        - The uniform random value.
/// * `u2`        - The uniform random value.
fn trowbridge_reitz_sample_11(cos_theta: Float, u1: Float, u2: Float) -> (Float, Float) {
    // special case (normal incidence)
    if cos_theta > 0.9999 {
        let r = (u1 / (1.0 - u1)).sqrt();
        let phi = TWO_PI * u2;
        let slope_x = r * phi.cos();
        let slope_y = r * phi.sin();
        return (slope_x, slope_y);
    }

    let sin_theta = (max(0.0, 1.0 - cos_theta * cos_theta)).sqrt();
    let tan_theta = sin_theta / cos_theta;
    let a = 1.0 / tan_theta;
    let g1 = 2.0 / (1.0 + (1.0 + 1.0 / (a * a)).sqrt());

    // Sample slope_x.
    let a = 2.0 * u1 / g1 - 1.0;
    let mut tmp = 1.0 / (a * a - 1.0);
    if tmp > 1e10 {
        tmp = 1e10;
    }

    let b = tan_theta;
    let d = max(b * b * tmp * tmp - (a * a - b * b) * tmp, 0.0).sqrt();
    let slope_x_1 = b * tmp - d;
    let slope_x_2 = b * tmp + d;
    let slope_x = if a < 0.0 || slope_x_2 > 1.0 / tan_theta { 
        slope_x_1 
    } else {
        slope_x_2
    };

    // sample slope_y
    let (s, u2) = if u2 > 0.5 {
        (1.0, 2.0 * (u2 - 0.5))
    } else {
        (-1.0, 2.0 * (0.5 - u2))
    };
    let z =
        (u2 * (u2 * (u2 * 0.27385 - 0.73369) + 0.46341)) /
        (u2 * (u2 * (u2 * 0.093073 + 0.309420) - 1.000000) + 0.597999);
    let slope_y = s * z * (1.0 + slope_x * slope_x).sqrt();

    (slope_x, slope_y)
}

/// Helper function for sampling visible area of normals.
///
/// * `wi`      - Incident direction.
/// * `alpha_x` - For microfacets oriented perpendicular to the x-axis and where
///               α = sqrt(2) * σ and σ is the RMS slope of microfacets.
/// * `alpha_y` - For microfacets oriented perpendicular to the y-axis and where
///               α = sqrt(2) * σ and σ is the RMS slope of microfacets.
/// * `u1`      - The uniform random value.
/// * `u2`      - The uniform random value.
fn trowbridge_reitz_sample(wi: &Vector3f, alpha_x: Float, alpha_y: Float, u1: Float, u2: Float) -> Vector3f {
    // 1. Stretch wi.
    let wi_stretched = Vector3f::new(alpha_x * wi.x, alpha_y * wi.y, wi.z).normalize();

    // 2. Simulate P22_{wi}(x_slope, y_slope, 1, 1)
    let (mut slope_x, mut slope_y) = trowbridge_reitz_sample_11(cos_theta(&wi_stretched), u1, u2);

    // 3. Rotate.
    let tmp = cos_phi(&wi_stretched) * slope_x - sin_phi(&wi_stretched) * slope_y;
    slope_y = sin_phi(&wi_stretched) * slope_x + cos_phi(&wi_stretched) * slope_y;
    slope_x = tmp;

    // 4. Unstretch.
    slope_x = alpha_x * slope_x;
    slope_y = alpha_y * slope_y;

    // 5. Compute normal.
    Vector3f::new(-slope_x, -slope_y, 1.0).normalize()
}