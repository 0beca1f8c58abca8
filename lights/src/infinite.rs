//! Infinite Area Light Source

use crate::common::*;
use rad_core::base::*;
use rad_core::error::*;
use rad_core::geometry::*;
use rad_core::interaction::*;
use rad_core::light::*;
use rad_core::medium::*;
use rad_core::sampling::*;
use rad_core::spectrum::*;

/// Implements an infinite area light source surrounding the scene, with
/// either constant radiance or a latitude-longitude radiance map.
#[derive(Clone)]
pub struct InfiniteAreaLight {
    /// Transformation from light coordinate system to world coordinate system.
    pub light_to_world: Transform,

    /// Transformation from world coordinate system to light coordinate system.
    pub world_to_light: Transform,

    /// Radiance map texels, row-major with `v` (polar angle) along rows.
    l_map: Vec<Spectrum>,

    /// Radiance map resolution `(width, height)`.
    resolution: (usize, usize),

    /// Distribution for importance sampling the radiance map.
    distribution: Distribution2D,

    /// Bounding sphere of the scene; calculated in `preprocess()`.
    world: WorldSphere,
}

impl InfiniteAreaLight {
    /// Returns an `InfiniteAreaLight` with the same radiance from every
    /// direction.
    ///
    /// * `l` - Radiance.
    pub fn new(l: Spectrum) -> Result<Self> {
        Self::new_image(Spectrum::ONE, vec![l], 1, 1, Transform::identity())
    }

    /// Returns an `InfiniteAreaLight` driven by a latitude-longitude radiance
    /// map.
    ///
    /// * `scale`          - Scale applied to every texel.
    /// * `texels`         - Row-major texels; `width * height` entries.
    /// * `width`          - Number of columns (azimuth).
    /// * `height`         - Number of rows (polar angle).
    /// * `light_to_world` - Transformation from light coordinate system to
    ///                      world coordinate system.
    pub fn new_image(
        scale: Spectrum,
        texels: Vec<Spectrum>,
        width: usize,
        height: usize,
        light_to_world: Transform,
    ) -> Result<Self> {
        if width == 0 || height == 0 || texels.len() != width * height {
            return Err(Error::InvalidArgument(format!(
                "radiance map of {width}x{height} with {} texels",
                texels.len()
            )));
        }
        let l_map: Vec<Spectrum> = texels.into_iter().map(|t| t * scale).collect();
        if let Some(t) = l_map.iter().find(|t| !t.is_finite() || t.min_component_value() < 0.0) {
            return Err(Error::InvalidArgument(format!("invalid radiance map texel {t}")));
        }

        // Weight luminance by sin(θ) to undo the lat-long stretching at the poles.
        let img: Vec<Float> = (0..height)
            .flat_map(|v| {
                let sin_theta = (PI * (v as Float + 0.5) / height as Float).sin();
                let l_map = &l_map;
                (0..width).map(move |u| l_map[v * width + u].y() * sin_theta)
            })
            .collect();
        let distribution = Distribution2D::new(&img, width, height)?;

        debug!("Infinite light radiance map {width}x{height}");
        Ok(Self {
            light_to_world,
            world_to_light: light_to_world.inverse(),
            l_map,
            resolution: (width, height),
            distribution,
            world: WorldSphere::default(),
        })
    }

    /// Returns the radiance stored for a map coordinate.
    ///
    /// * `uv` - Map coordinates in [0, 1]^2.
    fn lookup(&self, uv: &Point2f) -> Spectrum {
        let (width, height) = self.resolution;
        let u = clamp((uv.x * width as Float) as isize, 0, width as isize - 1) as usize;
        let v = clamp((uv.y * height as Float) as isize, 0, height as isize - 1) as usize;
        self.l_map[v * width + u]
    }

    /// Converts a world direction towards the environment into map
    /// coordinates and returns them with sin(θ).
    ///
    /// * `w` - World space direction.
    fn direction_to_uv(&self, w: &Vector3f) -> (Point2f, Float) {
        let wl = self.world_to_light.transform_vector(w).normalize();
        let theta = spherical_theta(&wl);
        let uv = Point2f::new(spherical_phi(&wl) * INV_TWO_PI, theta * INV_PI);
        (uv, theta.sin())
    }

    /// Converts map coordinates into a world direction towards the
    /// environment and returns it with sin(θ).
    ///
    /// * `uv` - Map coordinates.
    fn uv_to_direction(&self, uv: &Point2f) -> (Vector3f, Float) {
        let theta = uv.y * PI;
        let phi = uv.x * TWO_PI;
        let sin_theta = theta.sin();
        let wl = spherical_direction(sin_theta, theta.cos(), phi);
        (self.light_to_world.transform_vector(&wl).normalize(), sin_theta)
    }

    /// Converts a map density to a solid angle density.
    fn map_pdf_to_solid_angle(map_pdf: Float, sin_theta: Float) -> Float {
        if sin_theta <= 0.0 {
            0.0
        } else {
            map_pdf / (TWO_PI * PI * sin_theta)
        }
    }
}

impl Light for InfiniteAreaLight {
    fn get_type(&self) -> LightType {
        LightType::INFINITE_LIGHT
    }

    fn get_name(&self) -> &'static str {
        "infinite"
    }

    fn preprocess(&self, world_bound: &Bounds3f) {
        self.world.set(world_bound);
    }

    fn power(&self) -> Spectrum {
        let (_, world_radius) = self.world.get();
        let mut avg = Spectrum::ZERO;
        for t in self.l_map.iter() {
            avg += *t;
        }
        avg /= self.l_map.len() as Float;
        PI * world_radius * world_radius * avg
    }

    fn le(&self, ray: &Ray) -> Spectrum {
        let (uv, _) = self.direction_to_uv(&ray.d);
        self.lookup(&uv)
    }

    fn sample_direction(&self, hit: &Hit, u: &Point2f) -> DirectionSample {
        // Find `(u,v)` sample coordinates in infinite light texture.
        let (uv, map_pdf) = self.distribution.sample_continuous(u);
        if map_pdf == 0.0 {
            return DirectionSample::default();
        }

        let (wi, sin_theta) = self.uv_to_direction(&uv);
        let pdf = Self::map_pdf_to_solid_angle(map_pdf, sin_theta);
        if pdf == 0.0 {
            return DirectionSample::default();
        }

        let (_, world_radius) = self.world.get();
        let p_outside = hit.p + wi * (2.0 * world_radius);
        let p1 = Hit::new(p_outside, hit.time, -wi, Normal3f::ZERO, MediumInterface::vacuum());
        DirectionSample {
            wi,
            pdf,
            p: p_outside,
            uv,
            is_delta: false,
            visibility: Some(VisibilityTester::new(hit.clone(), p1)),
            value: self.lookup(&uv),
            ..Default::default()
        }
    }

    fn pdf_direction(&self, _hit: &Hit, wi: &Vector3f) -> Float {
        let (uv, sin_theta) = self.direction_to_uv(wi);
        Self::map_pdf_to_solid_angle(self.distribution.pdf(&uv), sin_theta)
    }

    fn sample_le(&self, u1: &Point2f, u2: &Point2f, time: Float) -> Result<Le> {
        let (world_center, world_radius) = self.world.get();

        // Compute direction for infinite light sample ray.
        let (uv, map_pdf) = self.distribution.sample_continuous(u1);
        let (w, sin_theta) = self.uv_to_direction(&uv);
        let pdf_dir = Self::map_pdf_to_solid_angle(map_pdf, sin_theta);
        let d = -w;

        // Compute origin for infinite light sample ray.
        let (v1, v2) = coordinate_system(&w);
        let cd = concentric_sample_disk(u2);
        let p_disk = world_center + (v1 * cd.x + v2 * cd.y) * world_radius;
        let ray = Ray::new(p_disk + w * world_radius, d, INFINITY, time, None);

        let pdf_pos = 1.0 / (PI * world_radius * world_radius);
        let value = if pdf_dir > 0.0 { self.lookup(&uv) } else { Spectrum::ZERO };
        Ok(Le::new(ray, Normal3f::from(d), pdf_pos, pdf_dir, value))
    }

    fn pdf_le(&self, ray: &Ray, _n_light: &Normal3f) -> Result<Pdf> {
        let (_, world_radius) = self.world.get();
        let (uv, sin_theta) = self.direction_to_uv(&-ray.d);
        let pdf_dir = Self::map_pdf_to_solid_angle(self.distribution.pdf(&uv), sin_theta);
        Ok(Pdf::new(1.0 / (PI * world_radius * world_radius), pdf_dir))
    }
}
