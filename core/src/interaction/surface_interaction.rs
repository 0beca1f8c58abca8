//! Surface Interactions

use super::Hit;
use crate::base::*;
use crate::geometry::*;
use crate::medium::*;
use crate::reflection::*;
use crate::spectrum::*;

/// SurfaceInteraction represents geometry of a particular point on a surface.
#[derive(Clone, Default)]
pub struct SurfaceInteraction {
    /// The common interaction data.
    pub hit: Hit,

    /// The uv coordinates from surface parametrization.
    pub uv: Point2f,

    /// Parametric partial derivative of the point ∂p/∂u.
    pub dpdu: Vector3f,

    /// Parametric partial derivative of the point ∂p/∂v.
    pub dpdv: Vector3f,

    /// Differential change ∂n/∂u in surface normal as we move along u.
    pub dndu: Normal3f,

    /// Differential change ∂n/∂v in surface normal as we move along v.
    pub dndv: Normal3f,

    /// Shading frame.
    pub shading: Frame,

    /// Direction towards the previous path vertex in the shading frame.
    pub wi: Vector3f,

    /// The BSDF at the hit point.
    pub bsdf: Option<ArcBSDF>,

    /// Index of the area light attached to the surface in the scene's lights.
    pub light: Option<usize>,
}

impl SurfaceInteraction {
    /// Create a new surface interaction.
    ///
    /// * `p`    - Point of interaction.
    /// * `n`    - Unit geometric normal.
    /// * `uv`   - The uv coordinates from surface parametrization.
    /// * `wo`   - The negative ray direction.
    /// * `dpdu` - Parametric partial derivative of the point ∂p/∂u.
    /// * `dpdv` - Parametric partial derivative of the point ∂p/∂v.
    /// * `time` - Time when interaction occurred.
    pub fn new(
        p: Point3f,
        n: Normal3f,
        uv: Point2f,
        wo: Vector3f,
        dpdu: Vector3f,
        dpdv: Vector3f,
        time: Float,
    ) -> Self {
        let shading = Frame::from_normal_tangent(&n, &dpdu);
        Self {
            hit: Hit::new(p, time, wo, n, MediumInterface::vacuum()),
            uv,
            dpdu,
            dpdv,
            dndu: Normal3f::ZERO,
            dndv: Normal3f::ZERO,
            shading,
            wi: shading.to_local(&wo),
            bsdf: None,
            light: None,
        }
    }

    /// Replace the shading frame, keeping `wi` consistent with it.
    ///
    /// * `shading` - The new frame.
    pub fn set_shading(&mut self, shading: Frame) {
        self.shading = shading;
        self.wi = shading.to_local(&self.hit.wo);
    }

    /// Convert a world space direction into the shading frame.
    ///
    /// * `v` - World space direction.
    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        self.shading.to_local(v)
    }

    /// Convert a shading frame direction into world space.
    ///
    /// * `v` - Shading frame direction.
    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        self.shading.to_world(v)
    }

    /// Returns `true` if a world space direction lies on the side of the
    /// geometric surface its shading frame direction claims.
    ///
    /// * `w`     - World space direction.
    /// * `local` - The same direction in the shading frame.
    fn is_consistent(&self, w: &Vector3f, local: &Vector3f) -> bool {
        w.dot(&self.hit.n) * cos_theta(local) > 0.0
    }

    /// Returns the cosine-weighted BSDF value for a world space direction.
    ///
    /// * `ctx` - Query context.
    /// * `wo`  - World space outgoing direction.
    pub fn bsdf_eval(&self, ctx: &BSDFContext, wo: &Vector3f) -> Spectrum {
        match self.bsdf.as_ref() {
            Some(bsdf) => {
                let local = self.to_local(wo);
                if self.is_consistent(wo, &local) {
                    bsdf.eval(ctx, self, &local)
                } else {
                    Spectrum::ZERO
                }
            }
            None => Spectrum::ZERO,
        }
    }

    /// Returns the BSDF sampling density for a world space direction.
    ///
    /// * `ctx` - Query context.
    /// * `wo`  - World space outgoing direction.
    pub fn bsdf_pdf(&self, ctx: &BSDFContext, wo: &Vector3f) -> Float {
        match self.bsdf.as_ref() {
            Some(bsdf) => {
                let local = self.to_local(wo);
                if self.is_consistent(wo, &local) {
                    bsdf.pdf(ctx, self, &local)
                } else {
                    0.0
                }
            }
            None => 0.0,
        }
    }

    /// Sample the BSDF and return the sample together with the world space
    /// direction. Returns `None` when the sample carries no energy.
    ///
    /// * `ctx`    - Query context.
    /// * `u_lobe` - Sample used to pick a lobe.
    /// * `u`      - Sample used to pick a direction.
    pub fn sample_bsdf(&self, ctx: &BSDFContext, u_lobe: Float, u: &Point2f) -> Option<(BSDFSample, Vector3f)> {
        let bsdf = self.bsdf.as_ref()?;
        let bs = bsdf.sample(ctx, self, u_lobe, u);
        if bs.is_invalid() {
            return None;
        }
        let wo = self.to_world(&bs.wo);
        if !self.is_consistent(&wo, &bs.wo) {
            return None;
        }
        Some((bs, wo))
    }
}
