//! 2-D Points and Vectors

use crate::base::*;
use num_traits::Num;
use std::fmt;
use std::ops::{Add, Index, IndexMut, Mul, Sub};

/// A 2-D point containing numeric values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point2<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,
}

/// 2-D point containing `Float` values.
pub type Point2f = Point2<Float>;

/// 2-D point containing `Int` values.
pub type Point2i = Point2<Int>;

/// A 2-D vector containing numeric values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vector2<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,
}

/// 2-D vector containing `Float` values.
pub type Vector2f = Vector2<Float>;

/// 2-D vector containing `Int` values.
pub type Vector2i = Vector2<Int>;

impl<T: Num + Copy> Point2<T> {
    /// Creates a new 2-D point.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    /// Creates a new 2-D zero point.
    pub fn zero() -> Self {
        Self::new(T::zero(), T::zero())
    }
}

impl<T: Num + Copy> Vector2<T> {
    /// Creates a new 2-D vector.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: Num + Copy> Add<Vector2<T>> for Point2<T> {
    type Output = Point2<T>;

    /// Offsets the point by a vector.
    ///
    /// * `other` - The vector.
    fn add(self, other: Vector2<T>) -> Self::Output {
        Point2::new(self.x + other.x, self.y + other.y)
    }
}

impl<T: Num + Copy> Add for Point2<T> {
    type Output = Point2<T>;

    /// Adds two points component-wise.
    ///
    /// * `other` - The other point.
    fn add(self, other: Self) -> Self::Output {
        Point2::new(self.x + other.x, self.y + other.y)
    }
}

impl<T: Num + Copy> Sub for Point2<T> {
    type Output = Vector2<T>;

    /// Returns the vector between two points.
    ///
    /// * `other` - The other point.
    fn sub(self, other: Self) -> Self::Output {
        Vector2::new(self.x - other.x, self.y - other.y)
    }
}

impl<T: Num + Copy> Mul<T> for Point2<T> {
    type Output = Point2<T>;

    /// Scales the point.
    ///
    /// * `f` - The scaling factor.
    fn mul(self, f: T) -> Self::Output {
        Point2::new(self.x * f, self.y * f)
    }
}

impl Mul<Point2f> for Float {
    type Output = Point2f;

    /// Scales the point.
    ///
    /// * `p` - The point.
    fn mul(self, p: Point2f) -> Self::Output {
        Point2f::new(self * p.x, self * p.y)
    }
}

impl<T> Index<usize> for Point2<T> {
    type Output = T;

    /// Index the point by an axis to get the immutable coordinate value.
    ///
    /// * `axis` - A 2-D coordinate axis (0 or 1).
    fn index(&self, axis: usize) -> &Self::Output {
        match axis {
            0 => &self.x,
            _ => &self.y,
        }
    }
}

impl<T> IndexMut<usize> for Point2<T> {
    /// Index the point by an axis to get a mutable coordinate value.
    ///
    /// * `axis` - A 2-D coordinate axis (0 or 1).
    fn index_mut(&mut self, axis: usize) -> &mut Self::Output {
        match axis {
            0 => &mut self.x,
            _ => &mut self.y,
        }
    }
}

impl From<Point2i> for Point2f {
    /// Convert an integer point to a floating point one.
    ///
    /// * `p` - The integer point.
    fn from(p: Point2i) -> Self {
        Self::new(p.x as Float, p.y as Float)
    }
}

impl<T: fmt::Display> fmt::Display for Point2<T> {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}
