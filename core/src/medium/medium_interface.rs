//! Medium Interface

use super::ArcMedium;
use std::sync::Arc;

/// Boundary between the media on the two sides of a surface.
#[derive(Clone, Default)]
pub struct MediumInterface {
    /// Medium on the side opposite to the surface normal.
    pub inside: Option<ArcMedium>,

    /// Medium on the side the surface normal points to.
    pub outside: Option<ArcMedium>,
}

impl MediumInterface {
    /// Create a medium interface between two media.
    ///
    /// * `inside`  - The interior medium.
    /// * `outside` - The exterior medium.
    pub fn new(inside: Option<ArcMedium>, outside: Option<ArcMedium>) -> Self {
        Self { inside, outside }
    }

    /// Create a medium interface that represents a vacuum.
    pub fn vacuum() -> Self {
        Self::default()
    }

    /// Returns `true` if the two sides hold different media.
    pub fn is_medium_transition(&self) -> bool {
        match (&self.inside, &self.outside) {
            (Some(inside), Some(outside)) => !Arc::ptr_eq(inside, outside),
            (None, None) => false,
            _ => true,
        }
    }
}

impl From<Option<ArcMedium>> for MediumInterface {
    /// Create a medium interface with the same medium on either side.
    ///
    /// * `medium` - The medium.
    fn from(medium: Option<ArcMedium>) -> Self {
        Self {
            inside: medium.clone(),
            outside: medium,
        }
    }
}
