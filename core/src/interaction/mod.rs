//! Interactions

use crate::base::*;
use crate::geometry::*;
use crate::medium::*;

mod medium_interaction;
mod surface_interaction;

pub use medium_interaction::*;
pub use surface_interaction::*;

/// Interaction enumeration.
#[derive(Clone)]
pub enum Interaction {
    /// Represents geometry of a particular point on a surface.
    Surface { si: SurfaceInteraction },

    /// Represents an interaction point in a scattering medium.
    Medium { mi: MediumInteraction },
}

impl Interaction {
    /// Returns the interaction hit point.
    pub fn get_hit(&self) -> &Hit {
        match self {
            Self::Surface { si } => &si.hit,
            Self::Medium { mi } => &mi.hit,
        }
    }
}

/// Hit provides common data shared by surface and medium interactions.
#[derive(Clone, Default)]
pub struct Hit {
    /// Ray parameter of the intersection.
    pub t: Float,

    /// Point of interaction.
    pub p: Point3f,

    /// Time when interaction occurred.
    pub time: Float,

    /// The negative ray direction (outgoing direction used when computing
    /// lighting at points).
    pub wo: Vector3f,

    /// Geometric normal at the point `p`; zero for medium interactions.
    pub n: Normal3f,

    /// The medium interface used for scattering media.
    pub medium_interface: MediumInterface,
}

impl Hit {
    /// Create a new hit.
    ///
    /// `p`                - Point of interaction.
    /// `time`             - Time when interaction occurred.
    /// `wo`               - The negative ray direction.
    /// `n`                - Geometric normal at the point `p`.
    /// `medium_interface` - The medium interface used for scattering media.
    pub fn new(p: Point3f, time: Float, wo: Vector3f, n: Normal3f, medium_interface: MediumInterface) -> Self {
        Self {
            t: 0.0,
            p,
            time,
            wo,
            n,
            medium_interface,
        }
    }

    /// Returns `true` if this is a surface interaction.
    pub fn is_surface_interaction(&self) -> bool {
        self.n != Normal3f::ZERO
    }

    /// Returns the minimum parametric distance for rays leaving `p`.
    pub fn ray_epsilon(&self) -> Float {
        RAY_EPSILON * (1.0 + self.p.max_abs_component())
    }

    /// Spawn's a new ray in the given direction.
    ///
    /// * `d` - The new direction.
    pub fn spawn_ray(&self, d: &Vector3f) -> Ray {
        let mut ray = Ray::new(self.p, d.normalize(), INFINITY, self.time, self.get_medium_in_direction(d));
        ray.t_min = self.ray_epsilon();
        ray
    }

    /// Spawn's a new ray towards another point. The ray stops just short of
    /// the target; coincident points give a degenerate ray.
    ///
    /// * `p` - The target point.
    pub fn spawn_ray_to(&self, p: &Point3f) -> Ray {
        let d = *p - self.p;
        let dist = d.length();
        let (d, t_max) = if dist > 0.0 {
            (d / dist, dist * (1.0 - SHADOW_EPSILON))
        } else {
            (Vector3f::new(0.0, 0.0, 1.0), 0.0)
        };
        let mut ray = Ray::new(self.p, d, t_max, self.time, self.get_medium_in_direction(&d));
        ray.t_min = self.ray_epsilon();
        ray
    }

    /// Spawn's a new ray towards another interaction.
    ///
    /// * `hit` - The interaction.
    pub fn spawn_ray_to_hit(&self, hit: &Hit) -> Ray {
        self.spawn_ray_to(&hit.p)
    }

    /// Returns the medium towards a direction.
    ///
    /// * `w` - The direction.
    pub fn get_medium_in_direction(&self, w: &Vector3f) -> Option<ArcMedium> {
        if w.dot(&self.n) > 0.0 {
            self.medium_interface.outside.clone()
        } else {
            self.medium_interface.inside.clone()
        }
    }

    /// Returns the medium when interior and exterior are the same.
    pub fn get_medium(&self) -> Option<ArcMedium> {
        if self.medium_interface.is_medium_transition() {
            None
        } else {
            self.medium_interface.inside.clone()
        }
    }
}
