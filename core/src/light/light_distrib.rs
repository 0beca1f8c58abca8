//! Light Selection

use super::ArcLight;
use crate::base::*;
use crate::sampling::*;
use std::fmt;

/// Light sampling strategy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LightSampleStrategy {
    /// Sample all light sources uniformly.
    Uniform,

    /// Samples light sources according to their emitted power.
    Power,
}

impl From<&str> for LightSampleStrategy {
    /// Returns a `LightSampleStrategy` given a string name.
    fn from(name: &str) -> Self {
        match name {
            "uniform" => Self::Uniform,
            "power" => Self::Power,
            _ => {
                warn!("Light sample distribution type '{}' unknown. Using 'power'.", name);
                Self::Power
            }
        }
    }
}

impl fmt::Display for LightSampleStrategy {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform => write!(f, "uniform"),
            Self::Power => write!(f, "power"),
        }
    }
}

/// Returns the distribution used to pick a light. Power based selection falls
/// back to uniform when every light reports zero power.
///
/// * `strategy` - The strategy to use for light sampling.
/// * `lights`   - The lights.
pub fn create_light_sample_distribution(strategy: LightSampleStrategy, lights: &[ArcLight]) -> Distribution1D {
    let weights: Vec<Float> = match strategy {
        LightSampleStrategy::Uniform => vec![1.0; lights.len()],
        LightSampleStrategy::Power => lights.iter().map(|light| light.power().y()).collect(),
    };
    Distribution1D::new(weights)
}
