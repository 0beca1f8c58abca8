//! Geometric Primitives

use super::Primitive;
use crate::geometry::*;
use crate::interaction::*;
use crate::medium::*;
use crate::reflection::*;
use std::sync::Arc;

/// GeometricPrimitive represents a single shape in a scene.
#[derive(Clone)]
pub struct GeometricPrimitive {
    /// The shape.
    pub shape: ArcShape,

    /// The BSDF; `None` marks an index-matched medium boundary.
    pub bsdf: Option<ArcBSDF>,

    /// Index of the area light in the scene's lights if the primitive emits.
    pub area_light: Option<usize>,

    /// Information about the participating media on the inside and outside
    /// the primitive.
    pub medium_interface: MediumInterface,
}

impl GeometricPrimitive {
    /// Create a new geometric primitive. Emitters without a BSDF get a grey
    /// diffuse one.
    ///
    /// * `shape`            - The shape.
    /// * `bsdf`             - The BSDF.
    /// * `area_light`       - Index of the area light in the scene's lights.
    /// * `medium_interface` - Information about the participating media on the
    ///                        inside and outside the primitive.
    pub fn new(
        shape: ArcShape,
        bsdf: Option<ArcBSDF>,
        area_light: Option<usize>,
        medium_interface: MediumInterface,
    ) -> Self {
        let bsdf = match (bsdf, area_light) {
            (None, Some(_)) => Some(Arc::new(DiffuseBSDF::default()) as ArcBSDF),
            (bsdf, _) => bsdf,
        };
        Self {
            shape,
            bsdf,
            area_light,
            medium_interface,
        }
    }
}

impl Primitive for GeometricPrimitive {
    fn world_bound(&self) -> Bounds3f {
        self.shape.world_bound()
    }

    fn intersect(&self, ray: &mut Ray) -> Option<SurfaceInteraction> {
        let mut si = self.shape.intersect(ray)?;
        ray.t_max = si.hit.t;
        si.bsdf = self.bsdf.clone();
        si.light = self.area_light;

        // Initialize the medium interface after shape intersection.
        si.hit.medium_interface = if self.medium_interface.is_medium_transition() {
            self.medium_interface.clone()
        } else {
            MediumInterface::from(ray.medium.clone())
        };
        Some(si)
    }

    fn intersect_p(&self, ray: &Ray) -> bool {
        self.shape.intersect_p(ray)
    }
}
