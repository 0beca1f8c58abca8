//! Shapes

use super::*;
use crate::base::*;
use crate::interaction::*;
use std::sync::Arc;

/// A point sampled on the surface of a shape.
#[derive(Clone, Default)]
pub struct ShapeSample {
    /// Sampled position and surface normal.
    pub hit: Hit,

    /// Surface parameterization at the sampled point.
    pub uv: Point2f,

    /// Density of the sample; area measure for `sample_area()` and solid angle
    /// measure for `sample_solid_angle()`.
    pub pdf: Float,
}

/// Shape common functions. Shapes are defined in world space.
pub trait Shape {
    /// Returns the shape type. Usually these are behind ArcShape and harder to
    /// debug. So this will be helpful.
    fn get_type(&self) -> &'static str;

    /// Returns a bounding box in the world space.
    fn world_bound(&self) -> Bounds3f;

    /// Returns geometric details of the closest intersection inside the ray's
    /// parametric range, with `hit.t` set to the ray parameter. If there is no
    /// intersection, `None` is returned.
    ///
    /// * `ray` - The ray.
    fn intersect(&self, ray: &Ray) -> Option<SurfaceInteraction>;

    /// Returns `true` if a ray-shape intersection succeeds; otherwise `false`.
    ///
    /// * `ray` - The ray.
    fn intersect_p(&self, ray: &Ray) -> bool {
        self.intersect(ray).is_some()
    }

    /// Returns the surface area of the shape.
    fn area(&self) -> Float;

    /// Sample a point uniformly by area on the surface.
    ///
    /// * `u` - Sample value to use.
    fn sample_area(&self, u: &Point2f) -> ShapeSample;

    /// Returns the area density of `sample_area()` at a point on the surface.
    ///
    /// * `_p` - Point on the surface.
    fn pdf_area(&self, _p: &Point3f) -> Float {
        let area = self.area();
        if area > 0.0 {
            1.0 / area
        } else {
            0.0
        }
    }

    /// Sample a point on the shape as seen from a reference point and return
    /// the PDF with respect to solid angle at the reference point.
    ///
    /// * `hit` - Reference point.
    /// * `u`   - Sample value to use.
    fn sample_solid_angle(&self, hit: &Hit, u: &Point2f) -> ShapeSample {
        sample_solid_angle_by_area(self, hit, u)
    }

    /// Returns the solid angle density of `sample_solid_angle()` for a
    /// direction leaving the reference point.
    ///
    /// * `hit` - Reference point.
    /// * `wi`  - The direction.
    fn pdf_solid_angle(&self, hit: &Hit, wi: &Vector3f) -> Float {
        pdf_solid_angle_by_area(self, hit, wi)
    }
}

/// Samples a shape by area and converts the density to solid angle measure at
/// the reference point.
///
/// * `shape` - The shape.
/// * `hit`   - Reference point.
/// * `u`     - Sample value to use.
pub fn sample_solid_angle_by_area<S: Shape + ?Sized>(shape: &S, hit: &Hit, u: &Point2f) -> ShapeSample {
    let mut ss = shape.sample_area(u);
    let wi = ss.hit.p - hit.p;
    let dist_sq = wi.length_squared();
    if dist_sq == 0.0 || ss.pdf == 0.0 {
        ss.pdf = 0.0;
        return ss;
    }

    // Convert from area measure to solid angle measure.
    let wi = wi / dist_sq.sqrt();
    let cos_light = ss.hit.n.abs_dot(&wi);
    ss.pdf = if cos_light > 0.0 {
        ss.pdf * dist_sq / cos_light
    } else {
        0.0
    };
    if !ss.pdf.is_finite() {
        ss.pdf = 0.0;
    }
    ss
}

/// Returns the solid angle density of `sample_solid_angle_by_area()` by
/// tracing a ray against the shape.
///
/// * `shape` - The shape.
/// * `hit`   - Reference point.
/// * `wi`    - The direction.
pub fn pdf_solid_angle_by_area<S: Shape + ?Sized>(shape: &S, hit: &Hit, wi: &Vector3f) -> Float {
    let ray = hit.spawn_ray(wi);
    match shape.intersect(&ray) {
        Some(si) => {
            let cos_light = si.hit.n.abs_dot(&ray.d);
            let pdf = hit.p.distance_squared(si.hit.p) * shape.pdf_area(&si.hit.p) / cos_light;
            if pdf.is_finite() {
                pdf
            } else {
                0.0
            }
        }
        None => 0.0,
    }
}

/// Atomic reference counted `Shape`.
pub type ArcShape = Arc<dyn Shape + Send + Sync>;
