//! RGB Spectrum

use crate::base::*;
use std::fmt;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign,
};

/// Number of samples in an `RGBSpectrum`.
pub const RGB_SAMPLES: usize = 3;

/// Stores a spectral distribution as red, green and blue components.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RGBSpectrum {
    /// The RGB components.
    pub c: [Float; RGB_SAMPLES],
}

impl RGBSpectrum {
    /// Zero everywhere.
    pub const ZERO: Self = Self { c: [0.0; RGB_SAMPLES] };

    /// One everywhere.
    pub const ONE: Self = Self { c: [1.0; RGB_SAMPLES] };

    /// Create a spectrum with a constant value.
    ///
    /// * `v` - The value.
    pub const fn new(v: Float) -> Self {
        Self { c: [v; RGB_SAMPLES] }
    }

    /// Create a spectrum from RGB components.
    ///
    /// * `r` - Red.
    /// * `g` - Green.
    /// * `b` - Blue.
    pub const fn from_rgb(r: Float, g: Float, b: Float) -> Self {
        Self { c: [r, g, b] }
    }

    /// Returns the RGB components.
    pub fn to_rgb(&self) -> [Float; 3] {
        self.c
    }

    /// Returns true if any component is NaN.
    pub fn has_nans(&self) -> bool {
        self.c.iter().any(|v| v.is_nan())
    }

    /// Returns true if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.c.iter().all(|v| v.is_finite())
    }

    /// Returns true if the values are zero everywhere.
    pub fn is_black(&self) -> bool {
        self.c.iter().all(|v| *v == 0.0)
    }

    /// Returns the maximum component.
    pub fn max_component_value(&self) -> Float {
        self.c[1..].iter().fold(self.c[0], |m, v| max(m, *v))
    }

    /// Returns the minimum component.
    pub fn min_component_value(&self) -> Float {
        self.c[1..].iter().fold(self.c[0], |m, v| min(m, *v))
    }

    /// Returns the arithmetic mean of the components.
    pub fn avg(&self) -> Float {
        self.c.iter().sum::<Float>() / RGB_SAMPLES as Float
    }

    /// Returns the luminance (y-coefficient of XYZ colour).
    pub fn y(&self) -> Float {
        0.212671 * self.c[0] + 0.715160 * self.c[1] + 0.072169 * self.c[2]
    }

    /// Returns `e^v` for each component `v`.
    pub fn exp(&self) -> Self {
        Self {
            c: self.c.map(|v| v.exp()),
        }
    }

    /// Returns the square root of each component.
    pub fn sqrt(&self) -> Self {
        Self {
            c: self.c.map(|v| v.sqrt()),
        }
    }

    /// Clamps each component to `[low, high]`.
    ///
    /// * `low`  - Lower bound.
    /// * `high` - Upper bound.
    pub fn clamp(&self, low: Float, high: Float) -> Self {
        Self {
            c: self.c.map(|v| clamp(v, low, high)),
        }
    }

    /// Component-wise division where a zero denominator yields zero.
    ///
    /// * `other` - The denominator.
    pub fn safe_div(&self, other: &Self) -> Self {
        let mut r = Self::ZERO;
        for i in 0..RGB_SAMPLES {
            if other.c[i] != 0.0 {
                r.c[i] = self.c[i] / other.c[i];
            }
        }
        r
    }
}

impl Add for RGBSpectrum {
    type Output = Self;

    /// Adds the given spectrum.
    ///
    /// * `other` - The other spectrum.
    fn add(self, other: Self) -> Self::Output {
        let mut c = self.c;
        for i in 0..RGB_SAMPLES {
            c[i] += other.c[i];
        }
        Self { c }
    }
}

impl AddAssign for RGBSpectrum {
    /// Performs the `+=` operation.
    ///
    /// * `other` - The other spectrum.
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for RGBSpectrum {
    type Output = Self;

    /// Subtracts the given spectrum.
    ///
    /// * `other` - The other spectrum.
    fn sub(self, other: Self) -> Self::Output {
        let mut c = self.c;
        for i in 0..RGB_SAMPLES {
            c[i] -= other.c[i];
        }
        Self { c }
    }
}

impl SubAssign for RGBSpectrum {
    /// Performs the `-=` operation.
    ///
    /// * `other` - The other spectrum.
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Mul for RGBSpectrum {
    type Output = Self;

    /// Multiplies component-wise.
    ///
    /// * `other` - The other spectrum.
    fn mul(self, other: Self) -> Self::Output {
        let mut c = self.c;
        for i in 0..RGB_SAMPLES {
            c[i] *= other.c[i];
        }
        Self { c }
    }
}

impl MulAssign for RGBSpectrum {
    /// Performs the `*=` operation.
    ///
    /// * `other` - The other spectrum.
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}

impl Mul<Float> for RGBSpectrum {
    type Output = Self;

    /// Scales by a constant.
    ///
    /// * `f` - The scale factor.
    fn mul(self, f: Float) -> Self::Output {
        Self {
            c: self.c.map(|v| v * f),
        }
    }
}

impl MulAssign<Float> for RGBSpectrum {
    /// Performs the `*=` operation.
    ///
    /// * `f` - The scale factor.
    fn mul_assign(&mut self, f: Float) {
        *self = *self * f;
    }
}

impl Mul<RGBSpectrum> for Float {
    type Output = RGBSpectrum;

    /// Scales a spectrum.
    ///
    /// * `s` - The spectrum.
    fn mul(self, s: RGBSpectrum) -> Self::Output {
        s * self
    }
}

impl Div for RGBSpectrum {
    type Output = Self;

    /// Divides component-wise.
    ///
    /// * `other` - The denominator.
    fn div(self, other: Self) -> Self::Output {
        let mut c = self.c;
        for i in 0..RGB_SAMPLES {
            c[i] /= other.c[i];
        }
        Self { c }
    }
}

impl Div<Float> for RGBSpectrum {
    type Output = Self;

    /// Divides by a constant.
    ///
    /// * `f` - The denominator.
    fn div(self, f: Float) -> Self::Output {
        debug_assert!(f != 0.0);
        let inv = 1.0 / f;
        self * inv
    }
}

impl DivAssign<Float> for RGBSpectrum {
    /// Performs the `/=` operation.
    ///
    /// * `f` - The denominator.
    fn div_assign(&mut self, f: Float) {
        *self = *self / f;
    }
}

impl Neg for RGBSpectrum {
    type Output = Self;

    /// Negates each component.
    fn neg(self) -> Self::Output {
        Self {
            c: self.c.map(|v| -v),
        }
    }
}

impl Index<usize> for RGBSpectrum {
    type Output = Float;

    /// Index the spectrum.
    ///
    /// * `i` - Component index.
    fn index(&self, i: usize) -> &Self::Output {
        &self.c[i]
    }
}

impl IndexMut<usize> for RGBSpectrum {
    /// Index the spectrum mutably.
    ///
    /// * `i` - Component index.
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        &mut self.c[i]
    }
}

impl From<Float> for RGBSpectrum {
    /// Converts a constant to a spectrum.
    ///
    /// * `v` - The value.
    fn from(v: Float) -> Self {
        Self::new(v)
    }
}

impl fmt::Display for RGBSpectrum {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.c[0], self.c[1], self.c[2])
    }
}
