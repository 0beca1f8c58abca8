//! Microfacet Distribution Models

use crate::base::*;
use crate::geometry::*;
use crate::reflection::*;

mod beckmann;
mod trowbridge_reitz;

// Re-exports
pub use beckmann::*;
pub use trowbridge_reitz::*;

/// Maps a scalar roughness in [0, 1] to a distribution alpha; values close to
/// 0 are near-perfect specular reflection.
///
/// * `roughness` - Roughness parameter value.
pub fn roughness_to_alpha(roughness: Float) -> Float {
    let roughness = max(roughness, 1e-3);
    let x = roughness.ln();
    1.62142 + 0.819955 * x + 0.1734 * x * x + 0.0171201 * x * x * x + 0.000640711 * x * x * x * x
}

/// Kind of microfacet normal distribution.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MicrofacetType {
    /// Trowbridge-Reitz (GGX).
    TrowbridgeReitz,

    /// Beckmann-Spizzichino.
    Beckmann,
}

/// Microfacet normal distribution with Smith shadowing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MicrofacetDistribution {
    /// The distribution.
    model: MicrofacetModel,

    /// Sample only normals visible from the outgoing direction.
    sample_visible_area: bool,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum MicrofacetModel {
    TrowbridgeReitz(TrowbridgeReitzDistribution),
    Beckmann(BeckmannDistribution),
}

impl MicrofacetDistribution {
    /// Create a new distribution.
    ///
    /// * `mtype`               - Kind of distribution.
    /// * `alpha_x`             - Roughness along the tangent direction.
    /// * `alpha_y`             - Roughness along the bitangent direction.
    /// * `sample_visible_area` - Sample only visible normals.
    pub fn new(mtype: MicrofacetType, alpha_x: Float, alpha_y: Float, sample_visible_area: bool) -> Self {
        let model = match mtype {
            MicrofacetType::TrowbridgeReitz => {
                MicrofacetModel::TrowbridgeReitz(TrowbridgeReitzDistribution::new(alpha_x, alpha_y))
            }
            MicrofacetType::Beckmann => MicrofacetModel::Beckmann(BeckmannDistribution::new(alpha_x, alpha_y)),
        };
        Self {
            model,
            sample_visible_area,
        }
    }

    /// Returns the kind of distribution.
    pub fn get_type(&self) -> MicrofacetType {
        match self.model {
            MicrofacetModel::TrowbridgeReitz(_) => MicrofacetType::TrowbridgeReitz,
            MicrofacetModel::Beckmann(_) => MicrofacetType::Beckmann,
        }
    }

    /// Returns whether only visible normals are sampled.
    pub fn sample_visible_area(&self) -> bool {
        self.sample_visible_area
    }

    /// Return the differential area of microfacets oriented with `wh`.
    ///
    /// * `wh` - Microfacet normal.
    pub fn d(&self, wh: &Vector3f) -> Float {
        match &self.model {
            MicrofacetModel::TrowbridgeReitz(m) => m.d(wh),
            MicrofacetModel::Beckmann(m) => m.d(wh),
        }
    }

    /// Returns the invisible masked microfacet area per visible microfacet area.
    ///
    /// * `w` - The direction.
    pub fn lambda(&self, w: &Vector3f) -> Float {
        match &self.model {
            MicrofacetModel::TrowbridgeReitz(m) => m.lambda(w),
            MicrofacetModel::Beckmann(m) => m.lambda(w),
        }
    }

    /// Smith's masking function; the fraction of microfacets visible from `w`.
    ///
    /// * `w` - The direction.
    pub fn g1(&self, w: &Vector3f) -> Float {
        1.0 / (1.0 + self.lambda(w))
    }

    /// Separable masking-shadowing for a pair of directions.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn g(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        self.g1(wo) * self.g1(wi)
    }

    /// Returns a sampled microfacet normal.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - The 2D uniform random values.
    pub fn sample_wh(&self, wo: &Vector3f, u: &Point2f) -> Vector3f {
        match (&self.model, self.sample_visible_area) {
            (MicrofacetModel::TrowbridgeReitz(m), true) => m.sample_wh_visible(wo, u),
            (MicrofacetModel::TrowbridgeReitz(m), false) => m.sample_wh_all(wo, u),
            (MicrofacetModel::Beckmann(m), true) => m.sample_wh_visible(wo, u),
            (MicrofacetModel::Beckmann(m), false) => m.sample_wh_all(wo, u),
        }
    }

    /// Returns the density of `sample_wh()` producing `wh`.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wh` - Microfacet normal.
    pub fn pdf(&self, wo: &Vector3f, wh: &Vector3f) -> Float {
        if self.sample_visible_area {
            let cos_o = abs_cos_theta(wo);
            if cos_o == 0.0 {
                return 0.0;
            }
            self.d(wh) * self.g1(wo) * wo.abs_dot(wh) / cos_o
        } else {
            self.d(wh) * abs_cos_theta(wh)
        }
    }
}
