//! BSDF

use super::*;
use crate::interaction::SurfaceInteraction;
use std::fmt;
use std::sync::Arc;

/// Direction of the quantity carried along a path.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransportMode {
    /// Paths from the camera carrying radiance.
    Radiance,

    /// Paths from lights carrying importance.
    Importance,
}

impl TransportMode {
    /// Returns the opposite mode.
    pub fn flip(self) -> Self {
        match self {
            Self::Radiance => Self::Importance,
            Self::Importance => Self::Radiance,
        }
    }
}

impl fmt::Display for TransportMode {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Radiance => write!(f, "Radiance"),
            Self::Importance => write!(f, "Importance"),
        }
    }
}

/// Selects the transport mode and the lobes a BSDF query may use.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BSDFContext {
    /// Transport mode.
    pub mode: TransportMode,

    /// Enabled lobes.
    pub lobes: BxDFType,
}

impl Default for BSDFContext {
    /// Radiance transport with every lobe enabled.
    fn default() -> Self {
        Self::new(TransportMode::Radiance)
    }
}

impl BSDFContext {
    /// Create a context with every lobe enabled.
    ///
    /// * `mode` - Transport mode.
    pub fn new(mode: TransportMode) -> Self {
        Self {
            mode,
            lobes: BxDFType::all(),
        }
    }

    /// Create a context restricted to the given lobes.
    ///
    /// * `mode`  - Transport mode.
    /// * `lobes` - Enabled lobes.
    pub fn with_lobes(mode: TransportMode, lobes: BxDFType) -> Self {
        Self { mode, lobes }
    }

    /// Create a context that excludes delta lobes; used for next event estimation.
    ///
    /// * `mode` - Transport mode.
    pub fn non_specular(mode: TransportMode) -> Self {
        Self::with_lobes(mode, BxDFType::all() & !BxDFType::SPECULAR)
    }

    /// Returns true if a lobe with the given flags is enabled.
    ///
    /// * `lobe` - Lobe flags; the lobe kind and its reflection/transmission side.
    pub fn is_enabled(&self, lobe: BxDFType) -> bool {
        self.lobes.contains(lobe)
    }
}

/// Surface scattering model. All directions are in the local shading frame of
/// `si` and `si.wi` is the direction towards the previous path vertex.
pub trait BSDF {
    /// Returns the union of the lobes this BSDF provides.
    fn flags(&self) -> BxDFType;

    /// Sample an outgoing direction.
    ///
    /// * `ctx`    - Query context.
    /// * `si`     - The surface interaction.
    /// * `u_lobe` - Sample used to pick a lobe.
    /// * `u`      - Sample used to pick a direction.
    fn sample(&self, ctx: &BSDFContext, si: &SurfaceInteraction, u_lobe: Float, u: &Point2f) -> BSDFSample;

    /// Returns `f(wi, wo)·|cos θo|`; zero for delta lobes.
    ///
    /// * `ctx` - Query context.
    /// * `si`  - The surface interaction.
    /// * `wo`  - Outgoing direction.
    fn eval(&self, ctx: &BSDFContext, si: &SurfaceInteraction, wo: &Vector3f) -> Spectrum;

    /// Returns the solid angle density of sampling `wo`; zero for delta lobes.
    ///
    /// * `ctx` - Query context.
    /// * `si`  - The surface interaction.
    /// * `wo`  - Outgoing direction.
    fn pdf(&self, ctx: &BSDFContext, si: &SurfaceInteraction, wo: &Vector3f) -> Float;

    /// Returns the name used in log output.
    fn get_type(&self) -> &'static str;
}

/// Atomic reference counted `BSDF`.
pub type ArcBSDF = Arc<dyn BSDF + Send + Sync>;
