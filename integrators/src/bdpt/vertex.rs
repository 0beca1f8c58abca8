//! Path Vertices

use super::common::*;
use crate::common::correct_shading_normal;
use rad_core::base::*;
use rad_core::geometry::*;
use rad_core::interaction::*;
use rad_core::light::*;
use rad_core::medium::*;
use rad_core::reflection::*;
use rad_core::scene::*;
use rad_core::spectrum::*;
use std::fmt;

/// The kind of point a path vertex lies on.
#[derive(Clone)]
pub(crate) enum VertexKind {
    /// A point on the camera lens.
    Camera { hit: Hit },

    /// A point on a light. `light` is `None` for camera rays that escaped the
    /// scene; those stand for the environment.
    Light {
        hit: Hit,
        light: Option<usize>,
        flags: LightType,
    },

    /// A scattering surface.
    Surface { si: SurfaceInteraction },

    /// A scattering point in a medium.
    Medium { mi: MediumInteraction },
}

/// A vertex of a camera or light subpath.
#[derive(Clone)]
pub(crate) struct Vertex {
    /// The point the vertex lies on.
    pub kind: VertexKind,

    /// Product of the BSDF or phase function values, transmittances and
    /// cosines divided by their sampling densities from the start of the
    /// subpath up to this vertex.
    pub beta: Spectrum,

    /// Area density of sampling this vertex from its predecessor.
    pub pdf_fwd: Float,

    /// Area density of sampling this vertex in the reverse direction.
    pub pdf_rev: Float,

    /// The vertex was sampled from a delta distribution.
    pub delta: bool,
}

impl Vertex {
    fn new(kind: VertexKind, beta: Spectrum, pdf_fwd: Float) -> Self {
        Self {
            kind,
            beta,
            pdf_fwd,
            pdf_rev: 0.0,
            delta: false,
        }
    }

    /// Create the first vertex of a camera subpath at the origin of a camera
    /// ray.
    ///
    /// * `ray`  - The camera ray.
    /// * `beta` - Camera ray weight.
    pub fn camera_from_ray(ray: &Ray, beta: Spectrum) -> Self {
        let hit = Hit::new(
            ray.o,
            ray.time,
            Vector3f::ZERO,
            Normal3f::ZERO,
            MediumInterface::from(ray.medium.clone()),
        );
        Self::new(VertexKind::Camera { hit }, beta, 0.0)
    }

    /// Create a camera vertex at a sampled lens point.
    ///
    /// * `hit`  - The lens point.
    /// * `beta` - Importance divided by the sampling density.
    pub fn camera_from_hit(hit: Hit, beta: Spectrum) -> Self {
        Self::new(VertexKind::Camera { hit }, beta, 0.0)
    }

    /// Create the first vertex of a light subpath at the origin of an
    /// emitted ray.
    ///
    /// * `light`   - Index of the light.
    /// * `flags`   - Light type flags.
    /// * `ray`     - The emitted ray.
    /// * `n_light` - Surface normal at the ray origin.
    /// * `le`      - Emitted radiance.
    /// * `pdf`     - Area density of the origin including the light selection
    ///               probability.
    pub fn light_from_le(light: usize, flags: LightType, ray: &Ray, n_light: Normal3f, le: Spectrum, pdf: Float) -> Self {
        let hit = Hit::new(
            ray.o,
            ray.time,
            Vector3f::ZERO,
            n_light,
            MediumInterface::from(ray.medium.clone()),
        );
        let kind = VertexKind::Light {
            hit,
            light: Some(light),
            flags,
        };
        Self::new(kind, le, pdf)
    }

    /// Create a light vertex at a point sampled towards a reference point.
    ///
    /// * `light` - Index of the light.
    /// * `flags` - Light type flags.
    /// * `hit`   - Point on the light.
    /// * `beta`  - Radiance divided by the sampling density.
    pub fn light_from_sample(light: usize, flags: LightType, hit: Hit, beta: Spectrum) -> Self {
        let kind = VertexKind::Light {
            hit,
            light: Some(light),
            flags,
        };
        Self::new(kind, beta, 0.0)
    }

    /// Create a vertex for a camera ray that left the scene.
    ///
    /// * `ray`     - The escaped ray.
    /// * `beta`    - Path throughput.
    /// * `pdf_fwd` - Solid angle density of the ray direction.
    pub fn escaped(ray: &Ray, beta: Spectrum, pdf_fwd: Float) -> Self {
        let hit = Hit::new(
            ray.at(1.0),
            ray.time,
            Vector3f::ZERO,
            Normal3f::from(-ray.d),
            MediumInterface::vacuum(),
        );
        let kind = VertexKind::Light {
            hit,
            light: None,
            flags: LightType::INFINITE_LIGHT,
        };
        Self::new(kind, beta, pdf_fwd)
    }

    /// Create a surface vertex.
    ///
    /// * `si`    - The surface interaction.
    /// * `beta`  - Path throughput.
    /// * `pdf`   - Solid angle density of the direction from `prev`.
    /// * `prev`  - The preceding vertex.
    pub fn surface(si: SurfaceInteraction, beta: Spectrum, pdf: Float, prev: &Vertex) -> Self {
        let mut v = Self::new(VertexKind::Surface { si }, beta, 0.0);
        v.pdf_fwd = prev.convert_density(pdf, &v);
        v
    }

    /// Create a medium vertex.
    ///
    /// * `mi`    - The medium interaction.
    /// * `beta`  - Path throughput.
    /// * `pdf`   - Solid angle density of the direction from `prev`.
    /// * `prev`  - The preceding vertex.
    pub fn medium(mi: MediumInteraction, beta: Spectrum, pdf: Float, prev: &Vertex) -> Self {
        let mut v = Self::new(VertexKind::Medium { mi }, beta, 0.0);
        v.pdf_fwd = prev.convert_density(pdf, &v);
        v
    }

    /// Returns the interaction point.
    pub fn hit(&self) -> &Hit {
        match &self.kind {
            VertexKind::Camera { hit } | VertexKind::Light { hit, .. } => hit,
            VertexKind::Surface { si } => &si.hit,
            VertexKind::Medium { mi } => &mi.hit,
        }
    }

    /// Returns the position.
    pub fn p(&self) -> Point3f {
        self.hit().p
    }

    /// Returns the time.
    pub fn time(&self) -> Float {
        self.hit().time
    }

    /// Returns the geometric normal; zero for points that are not on a
    /// surface.
    pub fn ng(&self) -> Normal3f {
        self.hit().n
    }

    /// Returns the shading normal.
    pub fn ns(&self) -> Vector3f {
        match &self.kind {
            VertexKind::Surface { si } => si.shading.n,
            _ => Vector3f::from(self.ng()),
        }
    }

    /// Returns true if the vertex lies on a surface.
    pub fn is_on_surface(&self) -> bool {
        self.ng() != Normal3f::ZERO
    }

    /// Returns the BSDF or phase function value for light travelling between
    /// `next` and the vertex's predecessor. The cosine at the vertex is not
    /// included.
    ///
    /// * `next` - The next vertex.
    /// * `mode` - Transport mode.
    pub fn f(&self, next: &Vertex, mode: TransportMode) -> Spectrum {
        let wi = next.p() - self.p();
        if wi.length_squared() == 0.0 {
            return Spectrum::ZERO;
        }
        let wi = wi.normalize();
        match &self.kind {
            VertexKind::Surface { si } => {
                let cos = wi.abs_dot(&si.shading.n);
                if cos == 0.0 {
                    return Spectrum::ZERO;
                }
                let f = si.bsdf_eval(&BSDFContext::new(mode), &wi) / cos;
                f * correct_shading_normal(si, &si.hit.wo, &wi, mode)
            }
            VertexKind::Medium { mi } => Spectrum::new(mi.eval_phase(&wi)),
            _ => Spectrum::ZERO,
        }
    }

    /// Returns true if deterministic connections to the vertex are possible.
    pub fn is_connectible(&self) -> bool {
        match &self.kind {
            VertexKind::Medium { .. } | VertexKind::Camera { .. } => true,
            VertexKind::Light { flags, .. } => !flags.contains(LightType::DELTA_DIRECTION_LIGHT),
            VertexKind::Surface { si } => si.bsdf.as_ref().map_or(false, |b| b.flags().has_non_specular()),
        }
    }

    /// Returns true if the vertex is on a light or an emitting surface.
    pub fn is_light(&self) -> bool {
        match &self.kind {
            VertexKind::Light { .. } => true,
            VertexKind::Surface { si } => si.light.is_some(),
            _ => false,
        }
    }

    /// Returns true if the vertex is on a light described by a delta
    /// distribution.
    pub fn is_delta_light(&self) -> bool {
        matches!(&self.kind, VertexKind::Light { flags, .. } if flags.is_delta_light())
    }

    /// Returns true if the vertex stands for a light at infinity.
    pub fn is_infinite_light(&self) -> bool {
        matches!(
            &self.kind,
            VertexKind::Light { flags, .. }
                if flags.intersects(LightType::INFINITE_LIGHT | LightType::DELTA_DIRECTION_LIGHT)
        )
    }

    /// Returns the index of the light at the vertex.
    fn light_index(&self) -> Option<usize> {
        match &self.kind {
            VertexKind::Light { light, .. } => *light,
            VertexKind::Surface { si } => si.light,
            _ => None,
        }
    }

    /// Returns the radiance emitted from the vertex towards `v`.
    ///
    /// * `scene` - The scene.
    /// * `v`     - The receiving vertex.
    pub fn le(&self, scene: &Scene, v: &Vertex) -> Spectrum {
        if !self.is_light() {
            return Spectrum::ZERO;
        }
        let w = v.p() - self.p();
        if w.length_squared() == 0.0 {
            return Spectrum::ZERO;
        }
        let w = w.normalize();

        if self.is_infinite_light() {
            let ray = Ray::new(self.p(), -w, INFINITY, self.time(), None);
            return scene.escaped_le(&ray);
        }
        match &self.kind {
            VertexKind::Surface { si } => scene.surface_le(si, &w),
            VertexKind::Light { hit, light: Some(light), .. } => scene.lights[*light].l(hit, &w),
            _ => Spectrum::ZERO,
        }
    }

    /// Converts a solid angle density at this vertex into an area density at
    /// `next`.
    ///
    /// * `pdf`  - Solid angle density.
    /// * `next` - The vertex the density is converted for.
    pub fn convert_density(&self, pdf: Float, next: &Vertex) -> Float {
        // Infinite lights are parameterized by direction.
        if next.is_infinite_light() {
            return pdf;
        }
        let w = next.p() - self.p();
        let dist2 = w.length_squared();
        if dist2 == 0.0 {
            return 0.0;
        }
        let inv_dist2 = 1.0 / dist2;
        let mut pdf = pdf * inv_dist2;
        if next.is_on_surface() {
            pdf *= next.ng().abs_dot(&(w * inv_dist2.sqrt()));
        }
        pdf
    }

    /// Returns the area density at `next` of sampling it from this vertex
    /// when the path arrived from `prev`.
    ///
    /// * `scene` - The scene.
    /// * `prev`  - The preceding vertex; `None` at a subpath's first vertex.
    /// * `next`  - The next vertex.
    pub fn pdf(&self, scene: &Scene, prev: Option<&Vertex>, next: &Vertex) -> Float {
        if let VertexKind::Light { .. } = self.kind {
            return self.pdf_light(scene, next);
        }

        let wn = next.p() - self.p();
        if wn.length_squared() == 0.0 {
            return 0.0;
        }
        let wn = wn.normalize();
        let wp = match prev {
            Some(prev) => {
                let wp = prev.p() - self.p();
                if wp.length_squared() == 0.0 {
                    return 0.0;
                }
                Some(wp.normalize())
            }
            None => None,
        };

        let pdf = match (&self.kind, wp) {
            (VertexKind::Camera { hit }, _) => {
                let ray = Ray::new(hit.p, wn, INFINITY, hit.time, None);
                scene.camera.pdf_we(&ray).1
            }
            (VertexKind::Surface { si }, Some(wp)) => bsdf_pdf_between(si, &wp, &wn),
            (VertexKind::Medium { mi }, Some(wp)) => mi.phase.p(&wp, &wn),
            _ => 0.0,
        };
        self.convert_density(pdf, next)
    }

    /// Returns the area density at `v` of a ray emitted from this light
    /// vertex.
    ///
    /// * `scene` - The scene.
    /// * `v`     - The receiving vertex.
    pub fn pdf_light(&self, scene: &Scene, v: &Vertex) -> Float {
        let w = v.p() - self.p();
        let dist2 = w.length_squared();
        if dist2 == 0.0 {
            return 0.0;
        }
        let w = w / dist2.sqrt();

        let mut pdf = if self.is_infinite_light() {
            // Rays leave an infinite light through a disk covering the scene.
            let (_, world_radius) = scene.world_bound.bounding_sphere();
            1.0 / (PI * world_radius * world_radius)
        } else {
            let light = match self.light_index() {
                Some(light) => light,
                None => return 0.0,
            };
            let ray = Ray::new(self.p(), w, INFINITY, self.time(), None);
            match scene.lights[light].pdf_le(&ray, &self.ng()) {
                Ok(pdf) => pdf.pdf_dir / dist2,
                Err(_) => 0.0,
            }
        };
        if v.is_on_surface() {
            pdf *= v.ng().abs_dot(&w);
        }
        pdf
    }

    /// Returns the density of choosing this vertex as the origin of a light
    /// subpath.
    ///
    /// * `scene` - The scene.
    /// * `v`     - The vertex the light path continues to.
    pub fn pdf_light_origin(&self, scene: &Scene, v: &Vertex) -> Float {
        let w = v.p() - self.p();
        if w.length_squared() == 0.0 {
            return 0.0;
        }
        let w = w.normalize();

        if self.is_infinite_light() {
            return infinite_light_density(scene, &w);
        }
        let light = match self.light_index() {
            Some(light) => light,
            None => return 0.0,
        };
        let pmf = scene.light_pmf(light);
        let ray = Ray::new(self.p(), w, INFINITY, self.time(), None);
        match scene.lights[light].pdf_le(&ray, &self.ng()) {
            Ok(pdf) => pdf.pdf_pos * pmf,
            Err(_) => 0.0,
        }
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            VertexKind::Camera { .. } => "camera",
            VertexKind::Light { .. } => "light",
            VertexKind::Surface { .. } => "surface",
            VertexKind::Medium { .. } => "medium",
        };
        write!(
            f,
            "[{kind} p: {}, beta: {}, pdf_fwd: {}, pdf_rev: {}, delta: {}]",
            self.p(),
            self.beta,
            self.pdf_fwd,
            self.pdf_rev,
            self.delta
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_scenes::*;
    use float_cmp::approx_eq;

    fn above_floor(scene: &Scene) -> (Vertex, Vertex) {
        let si = floor_hit(scene, Point3f::new(0.0, 0.0, 0.0));
        let camera = Vertex::camera_from_hit(
            Hit::new(
                Point3f::new(0.0, 1.0, 0.0),
                0.0,
                Vector3f::ZERO,
                Normal3f::ZERO,
                MediumInterface::vacuum(),
            ),
            Spectrum::ONE,
        );
        let surface = Vertex::surface(si, Spectrum::ONE, 1.0, &camera);
        (camera, surface)
    }

    #[test]
    fn density_conversion_uses_distance_and_cosine() {
        let scene = floor_without_lights();
        let (camera, surface) = above_floor(&scene);
        assert!(approx_eq!(Float, surface.pdf_fwd, 1.0, epsilon = 1e-5));

        let si = floor_hit(&scene, Point3f::new(0.0, 0.0, 2.0));
        let far = Vertex::surface(si, Spectrum::ONE, 1.0, &camera);
        // 1 / 5 · cos = 1 / 5 · 1 / √5
        assert!(approx_eq!(Float, far.pdf_fwd, 1.0 / (5.0 * (5.0 as Float).sqrt()), epsilon = 1e-5));
    }

    #[test]
    fn diffuse_vertex_value_excludes_cosine() {
        let scene = floor_without_lights();
        let (camera, surface) = above_floor(&scene);
        let f = surface.f(&camera, TransportMode::Radiance);
        assert!(approx_eq!(Float, f[0], 0.5 * INV_PI, epsilon = 1e-5));
        assert!(surface.is_connectible());
        assert!(!surface.is_light());
    }

    #[test]
    fn escaped_rays_are_infinite_lights() {
        let ray = Ray::new(Point3f::ZERO, Vector3f::new(0.0, 1.0, 0.0), INFINITY, 0.0, None);
        let v = Vertex::escaped(&ray, Spectrum::ONE, 0.5);
        assert!(v.is_light());
        assert!(v.is_infinite_light());
        assert!(!v.is_delta_light());
        // Densities towards infinite lights stay in solid angle measure.
        let scene = floor_without_lights();
        let (camera, _) = above_floor(&scene);
        assert_eq!(camera.convert_density(0.25, &v), 0.25);
    }
}
