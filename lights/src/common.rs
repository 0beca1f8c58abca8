//! Common

use rad_core::base::*;
use rad_core::geometry::*;
use std::sync::RwLock;

/// Bounding sphere of the scene, filled in by `Light::preprocess()` for
/// lights that sit outside the scene.
#[derive(Debug)]
pub struct WorldSphere {
    /// Center and radius.
    sphere: RwLock<(Point3f, Float)>,
}

impl Default for WorldSphere {
    /// Returns a unit sphere at the origin.
    fn default() -> Self {
        Self {
            sphere: RwLock::new((Point3f::ZERO, 1.0)),
        }
    }
}

impl WorldSphere {
    /// Store the bounding sphere of the scene bounds. An empty scene keeps a
    /// unit sphere so densities stay finite.
    ///
    /// * `world_bound` - Bounds of the scene geometry.
    pub fn set(&self, world_bound: &Bounds3f) {
        let (center, radius) = world_bound.bounding_sphere();
        let radius = if radius > 0.0 && radius.is_finite() { radius } else { 1.0 };
        match self.sphere.write() {
            Ok(mut guard) => *guard = (center, radius),
            Err(poisoned) => *poisoned.into_inner() = (center, radius),
        }
    }

    /// Returns the center and radius.
    pub fn get(&self) -> (Point3f, Float) {
        match self.sphere.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl Clone for WorldSphere {
    fn clone(&self) -> Self {
        Self {
            sphere: RwLock::new(self.get()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scene_keeps_unit_sphere() {
        let ws = WorldSphere::default();
        ws.set(&Bounds3f::empty());
        assert_eq!(ws.get(), (Point3f::ZERO, 1.0));

        ws.set(&Bounds3f::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 1.0, 1.0)));
        let (c, r) = ws.get();
        assert_eq!(c, Point3f::ZERO);
        assert!((r - (3.0 as Float).sqrt()).abs() < 1e-5);
    }
}
