//! Diffuse Area Light Source

use rad_core::base::*;
use rad_core::error::*;
use rad_core::geometry::*;
use rad_core::interaction::*;
use rad_core::light::*;
use rad_core::medium::*;
use rad_core::rng::ONE_MINUS_EPSILON;
use rad_core::sampling::*;
use rad_core::spectrum::*;

/// Implements a basic area light source with uniform spatial and directional
/// radiance distribution.
#[derive(Clone)]
pub struct DiffuseAreaLight {
    /// Participating media on either side of the surface.
    pub medium_interface: MediumInterface,

    /// Emitted radiance.
    pub l_emit: Spectrum,

    /// Shape describing surface of the light source.
    pub shape: ArcShape,

    /// Surface area of the shape.
    pub area: Float,

    /// Indicates whether light source 2-sided.
    pub two_sided: bool,
}

impl DiffuseAreaLight {
    /// Returns a new `DiffuseAreaLight`.
    ///
    /// * `shape`            - Shape describing surface of the light source.
    /// * `l_emit`           - Emitted radiance.
    /// * `two_sided`        - Indicates whether light source 2-sided.
    /// * `medium_interface` - Participating media on either side.
    pub fn new(shape: ArcShape, l_emit: Spectrum, two_sided: bool, medium_interface: MediumInterface) -> Result<Self> {
        let area = shape.area();
        if !(area > 0.0) {
            return Err(Error::InvalidArgument(format!("area light on {} has no area", shape.get_type())));
        }
        Ok(Self {
            medium_interface,
            l_emit,
            shape,
            area,
            two_sided,
        })
    }

    /// Returns the emitted radiance for a surface normal and outgoing
    /// direction.
    ///
    /// * `n` - Surface normal.
    /// * `w` - Outgoing direction.
    fn emitted(&self, n: &Normal3f, w: &Vector3f) -> Spectrum {
        if self.two_sided || n.dot(w) > 0.0 {
            self.l_emit
        } else {
            Spectrum::ZERO
        }
    }
}

impl Light for DiffuseAreaLight {
    fn get_type(&self) -> LightType {
        LightType::AREA_LIGHT
    }

    fn get_name(&self) -> &'static str {
        "diffuse_area"
    }

    fn power(&self) -> Spectrum {
        let sides = if self.two_sided { 2.0 } else { 1.0 };
        sides * self.l_emit * self.area * PI
    }

    fn l(&self, hit: &Hit, w: &Vector3f) -> Spectrum {
        self.emitted(&hit.n, w)
    }

    fn sample_direction(&self, hit: &Hit, u: &Point2f) -> DirectionSample {
        let ss = self.shape.sample_solid_angle(hit, u);
        let d = ss.hit.p - hit.p;
        if ss.pdf == 0.0 || d.length_squared() == 0.0 {
            return DirectionSample::default();
        }
        let wi = d.normalize();

        let mut p1 = ss.hit.clone();
        p1.time = hit.time;
        p1.medium_interface = self.medium_interface.clone();
        DirectionSample {
            wi,
            pdf: ss.pdf,
            p: ss.hit.p,
            n: ss.hit.n,
            uv: ss.uv,
            is_delta: false,
            visibility: Some(VisibilityTester::new(hit.clone(), p1)),
            value: self.emitted(&ss.hit.n, &-wi),
        }
    }

    fn pdf_direction(&self, hit: &Hit, wi: &Vector3f) -> Float {
        self.shape.pdf_solid_angle(hit, wi)
    }

    fn sample_position(&self, u: &Point2f) -> Result<PositionSample> {
        let ss = self.shape.sample_area(u);
        Ok(PositionSample {
            p: ss.hit.p,
            n: ss.hit.n,
            uv: ss.uv,
            pdf: ss.pdf,
        })
    }

    fn pdf_position(&self, p: &Point3f) -> Float {
        self.shape.pdf_area(p)
    }

    fn sample_le(&self, u1: &Point2f, u2: &Point2f, time: Float) -> Result<Le> {
        // Sample a point on the area light's shape.
        let ss = self.shape.sample_area(u1);
        let n_light = ss.hit.n;

        // Sample a cosine-weighted outgoing direction for area light.
        let (w, pdf_dir) = if self.two_sided {
            let (u, flip) = if u2.x < 0.5 {
                (Point2f::new(min(u2.x * 2.0, ONE_MINUS_EPSILON), u2.y), false)
            } else {
                (Point2f::new(min((u2.x - 0.5) * 2.0, ONE_MINUS_EPSILON), u2.y), true)
            };
            let mut w = cosine_sample_hemisphere(&u);
            if flip {
                w.z = -w.z;
            }
            (w, 0.5 * cosine_hemisphere_pdf(abs(w.z)))
        } else {
            let w = cosine_sample_hemisphere(u2);
            (w, cosine_hemisphere_pdf(w.z))
        };

        let frame = Frame::from_normal(&n_light);
        let d = frame.to_world(&w);

        let mut hit = ss.hit;
        hit.time = time;
        hit.medium_interface = self.medium_interface.clone();
        let ray = hit.spawn_ray(&d);
        let value = self.emitted(&n_light, &d);
        Ok(Le::new(ray, n_light, ss.pdf, pdf_dir, value))
    }

    fn pdf_le(&self, ray: &Ray, n_light: &Normal3f) -> Result<Pdf> {
        let cos = n_light.dot(&ray.d);
        let pdf_dir = if self.two_sided {
            0.5 * cosine_hemisphere_pdf(abs(cos))
        } else {
            cosine_hemisphere_pdf(max(cos, 0.0))
        };
        Ok(Pdf::new(self.shape.pdf_area(&ray.o), pdf_dir))
    }
}
