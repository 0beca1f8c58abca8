//! Bounding boxes

use super::*;
use crate::base::*;

/// 2-D integer bounds used for pixel ranges; `p_max` is exclusive.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Bounds2i {
    /// Minimum bounds.
    pub p_min: Point2i,

    /// Maximum bounds (exclusive).
    pub p_max: Point2i,
}

impl Bounds2i {
    /// Create new bounds from two corner points.
    ///
    /// * `p1` - First corner.
    /// * `p2` - Second corner.
    pub fn new(p1: Point2i, p2: Point2i) -> Self {
        Self {
            p_min: Point2i::new(min(p1.x, p2.x), min(p1.y, p2.y)),
            p_max: Point2i::new(max(p1.x, p2.x), max(p1.y, p2.y)),
        }
    }

    /// Returns the number of pixels covered.
    pub fn area(&self) -> usize {
        ((self.p_max.x - self.p_min.x) * (self.p_max.y - self.p_min.y)) as usize
    }

    /// Returns true if a point lies inside; the upper bounds are exclusive.
    ///
    /// * `p` - The point.
    pub fn contains_exclusive(&self, p: &Point2i) -> bool {
        p.x >= self.p_min.x && p.x < self.p_max.x && p.y >= self.p_min.y && p.y < self.p_max.y
    }

    /// Returns bounds grown to include a pixel.
    ///
    /// * `p` - The pixel.
    pub fn union_pixel(&self, p: &Point2i) -> Self {
        Self {
            p_min: Point2i::new(min(self.p_min.x, p.x), min(self.p_min.y, p.y)),
            p_max: Point2i::new(max(self.p_max.x, p.x + 1), max(self.p_max.y, p.y + 1)),
        }
    }

    /// Returns the union with another bounds.
    ///
    /// * `other` - The other bounds.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            p_min: Point2i::new(min(self.p_min.x, other.p_min.x), min(self.p_min.y, other.p_min.y)),
            p_max: Point2i::new(max(self.p_max.x, other.p_max.x), max(self.p_max.y, other.p_max.y)),
        }
    }

    /// Returns the intersection with another bounds.
    ///
    /// * `other` - The other bounds.
    pub fn intersect(&self, other: &Self) -> Self {
        let p_min = Point2i::new(max(self.p_min.x, other.p_min.x), max(self.p_min.y, other.p_min.y));
        let p_max = Point2i::new(min(self.p_max.x, other.p_max.x), min(self.p_max.y, other.p_max.y));
        Self {
            p_min,
            p_max: Point2i::new(max(p_min.x, p_max.x), max(p_min.y, p_max.y)),
        }
    }
}

impl IntoIterator for Bounds2i {
    type Item = Point2i;
    type IntoIter = Bounds2iIterator;

    /// Returns an iterator over the pixels in scanline order.
    fn into_iter(self) -> Self::IntoIter {
        Bounds2iIterator {
            bounds: self,
            p: self.p_min,
        }
    }
}

/// Iterator over the pixels of a `Bounds2i`.
pub struct Bounds2iIterator {
    /// The bounds.
    bounds: Bounds2i,

    /// Next point.
    p: Point2i,
}

impl Iterator for Bounds2iIterator {
    type Item = Point2i;

    /// Returns the next pixel.
    fn next(&mut self) -> Option<Self::Item> {
        if self.bounds.p_min.x >= self.bounds.p_max.x || self.p.y >= self.bounds.p_max.y {
            return None;
        }
        let p = self.p;
        self.p.x += 1;
        if self.p.x == self.bounds.p_max.x {
            self.p.x = self.bounds.p_min.x;
            self.p.y += 1;
        }
        Some(p)
    }
}

/// 3-D axis aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds3f {
    /// Minimum bounds.
    pub p_min: Point3f,

    /// Maximum bounds.
    pub p_max: Point3f,
}

impl Default for Bounds3f {
    /// Returns an empty bounding box.
    fn default() -> Self {
        Self::empty()
    }
}

impl Bounds3f {
    /// Create new bounds from two corner points.
    ///
    /// * `p1` - First corner.
    /// * `p2` - Second corner.
    pub fn new(p1: Point3f, p2: Point3f) -> Self {
        Self {
            p_min: p1.min(&p2),
            p_max: p1.max(&p2),
        }
    }

    /// Returns an empty bounding box that any union overrides.
    pub fn empty() -> Self {
        Self {
            p_min: Point3f::new(INFINITY, INFINITY, INFINITY),
            p_max: Point3f::new(-INFINITY, -INFINITY, -INFINITY),
        }
    }

    /// Returns true if the box contains no volume.
    pub fn is_empty(&self) -> bool {
        self.p_min.x > self.p_max.x || self.p_min.y > self.p_max.y || self.p_min.z > self.p_max.z
    }

    /// Returns the union with a point.
    ///
    /// * `p` - The point.
    pub fn union_point(&self, p: &Point3f) -> Self {
        Self {
            p_min: self.p_min.min(p),
            p_max: self.p_max.max(p),
        }
    }

    /// Returns the union with another box.
    ///
    /// * `other` - The other box.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            p_min: self.p_min.min(&other.p_min),
            p_max: self.p_max.max(&other.p_max),
        }
    }

    /// Returns true if the point lies inside the box (inclusive).
    ///
    /// * `p` - The point.
    pub fn inside(&self, p: &Point3f) -> bool {
        p.x >= self.p_min.x
            && p.x <= self.p_max.x
            && p.y >= self.p_min.y
            && p.y <= self.p_max.y
            && p.z >= self.p_min.z
            && p.z <= self.p_max.z
    }

    /// Returns the position of a point relative to the corners, where
    /// `p_min` maps to (0, 0, 0) and `p_max` maps to (1, 1, 1).
    ///
    /// * `p` - The point.
    pub fn offset(&self, p: &Point3f) -> Vector3f {
        let mut o = *p - self.p_min;
        for axis in 0..3 {
            if self.p_max[axis] > self.p_min[axis] {
                o[axis] /= self.p_max[axis] - self.p_min[axis];
            }
        }
        o
    }

    /// Returns the center and radius of a sphere enclosing the box.
    pub fn bounding_sphere(&self) -> (Point3f, Float) {
        if self.is_empty() {
            return (Point3f::ZERO, 0.0);
        }
        let center = (self.p_min + self.p_max) / 2.0;
        let radius = center.distance(self.p_max);
        (center, radius)
    }

    /// Returns the parametric range `(t0, t1)` where a ray overlaps the box,
    /// restricted to the ray's own `[t_min, t_max]` interval.
    ///
    /// * `ray` - The ray.
    pub fn intersect_p(&self, ray: &Ray) -> Option<(Float, Float)> {
        let mut t0 = ray.t_min;
        let mut t1 = ray.t_max;
        for axis in 0..3 {
            // Update interval for the slab of this axis.
            let inv_ray_dir = 1.0 / ray.d[axis];
            let mut t_near = (self.p_min[axis] - ray.o[axis]) * inv_ray_dir;
            let mut t_far = (self.p_max[axis] - ray.o[axis]) * inv_ray_dir;
            if t_near > t_far {
                std::mem::swap(&mut t_near, &mut t_far);
            }

            // Update `t_far` to ensure robust ray-bounds intersection.
            t_far *= 1.0 + 2.0 * gamma(3);

            // NaNs from 0 * inf leave the interval untouched.
            if t_near > t0 {
                t0 = t_near;
            }
            if t_far < t1 {
                t1 = t_far;
            }
            if t0 > t1 {
                return None;
            }
        }
        Some((t0, t1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_iteration_covers_bounds() {
        let b = Bounds2i::new(Point2i::new(1, 2), Point2i::new(3, 4));
        let pixels: Vec<Point2i> = b.into_iter().collect();
        assert_eq!(pixels.len(), b.area());
        assert_eq!(pixels[0], Point2i::new(1, 2));
        assert_eq!(pixels[3], Point2i::new(2, 3));
    }

    #[test]
    fn empty_pixel_bounds_iterate_nothing() {
        let b = Bounds2i::new(Point2i::new(1, 2), Point2i::new(1, 4));
        assert_eq!(b.into_iter().count(), 0);
    }

    #[test]
    fn growing_pixel_bounds() {
        let p = Point2i::new(3, 1);
        let b = Bounds2i::new(p, p).union_pixel(&p);
        assert_eq!(b.area(), 1);
        let b = b.union_pixel(&Point2i::new(0, 4));
        assert_eq!(b, Bounds2i::new(Point2i::new(0, 1), Point2i::new(4, 5)));
        let c = Bounds2i::new(Point2i::new(6, 0), Point2i::new(7, 2));
        assert_eq!(b.union(&c), Bounds2i::new(Point2i::new(0, 0), Point2i::new(7, 5)));
    }

    #[test]
    fn ray_box_overlap() {
        let b = Bounds3f::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Point3f::new(0.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 1.0), INFINITY, 0.0, None);
        let (t0, t1) = b.intersect_p(&ray).unwrap();
        assert!((t0 - 4.0).abs() < 1e-4);
        assert!((t1 - 6.0).abs() < 1e-3);

        let miss = Ray::new(Point3f::new(3.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 1.0), INFINITY, 0.0, None);
        assert!(b.intersect_p(&miss).is_none());
    }
}
