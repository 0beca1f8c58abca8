//! BxDF Type

use bitflags::bitflags;

bitflags! {
    /// Stores combinations of scattering lobes.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct BxDFType: u8 {
        const REFLECTION = 0b00000001;
        const TRANSMISSION = 0b00000010;
        const DIFFUSE = 0b00000100;
        const GLOSSY = 0b00001000;
        const SPECULAR = 0b00010000;
    }
}

impl Default for BxDFType {
    /// Returns the empty set of lobes.
    fn default() -> Self {
        Self::empty()
    }
}

impl BxDFType {
    /// Returns true if any lobe can be evaluated for a pair of directions.
    pub fn has_non_specular(&self) -> bool {
        self.intersects(Self::DIFFUSE | Self::GLOSSY)
    }

    /// Returns true if this is a specular lobe.
    pub fn is_specular(&self) -> bool {
        self.contains(Self::SPECULAR)
    }
}
