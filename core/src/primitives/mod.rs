//! Primitives

use crate::geometry::*;
use crate::interaction::*;
use std::sync::Arc;

mod geometric_primitive;

// Re-export
pub use geometric_primitive::*;

/// Bridges shapes and the shading system.
pub trait Primitive {
    /// Returns a bounding box in the world space.
    fn world_bound(&self) -> Bounds3f;

    /// Returns geometric details if a ray intersects the primitive and updates
    /// the t_max parameter of the ray. If there is no intersection, `None` is
    /// returned.
    ///
    /// * `ray` - The ray.
    fn intersect(&self, ray: &mut Ray) -> Option<SurfaceInteraction>;

    /// Returns `true` if a ray-primitive intersection succeeds; otherwise `false`.
    ///
    /// * `ray` - The ray.
    fn intersect_p(&self, ray: &Ray) -> bool;
}

/// Atomic reference counted `Primitive`.
pub type ArcPrimitive = Arc<dyn Primitive + Send + Sync>;

/// Ray query contract for an aggregate of primitives.
pub trait Accel {
    /// Returns a bounding box in the world space.
    fn world_bound(&self) -> Bounds3f;

    /// Returns the closest intersection and shrinks `ray.t_max` to it.
    ///
    /// * `ray` - The ray.
    fn intersect(&self, ray: &mut Ray) -> Option<SurfaceInteraction>;

    /// Returns `true` if anything intersects the ray.
    ///
    /// * `ray` - The ray.
    fn intersect_p(&self, ray: &Ray) -> bool;
}

/// Atomic reference counted `Accel`.
pub type ArcAccel = Arc<dyn Accel + Send + Sync>;
