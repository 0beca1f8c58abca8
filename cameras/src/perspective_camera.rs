//! Perspective Camera

use rad_core::base::*;
use rad_core::camera::*;
use rad_core::error::*;
use rad_core::geometry::*;
use rad_core::interaction::*;
use rad_core::light::VisibilityTester;
use rad_core::medium::*;
use rad_core::sampling::*;
use rad_core::spectrum::*;

/// Perspective camera with an optional thin lens. Raster x grows to the right
/// and raster y grows downwards.
#[derive(Clone)]
pub struct PerspectiveCamera {
    /// Camera to world transformation.
    pub camera_to_world: Transform,

    /// World to camera transformation.
    pub world_to_camera: Transform,

    /// Image resolution.
    pub resolution: Point2i,

    /// Radius of camera lens; 0 for a pinhole.
    pub lens_radius: Float,

    /// Distance to the plane of focus.
    pub focal_distance: Float,

    /// Scattering medium the camera lies in.
    pub medium: Option<ArcMedium>,

    /// Half extents of the image plane at z = 1.
    half_extent: Vector2f,

    /// Area covered by the image plane bounds at z = 1.
    a: Float,

    /// Viewing direction in world space.
    forward: Vector3f,
}

impl PerspectiveCamera {
    /// Create a new perspective camera.
    ///
    /// * `world_to_camera` - Left-handed world to camera transformation as
    ///                       returned by `Transform::look_at()`.
    /// * `fov`             - The field-of-view angle in degrees along the
    ///                       shorter image axis.
    /// * `resolution`      - Image resolution.
    /// * `lens_radius`     - Radius of camera lens.
    /// * `focal_distance`  - Focal distance.
    /// * `medium`          - Scattering medium the camera lies in.
    pub fn new(
        world_to_camera: Transform,
        fov: Float,
        resolution: Point2i,
        lens_radius: Float,
        focal_distance: Float,
        medium: Option<ArcMedium>,
    ) -> Result<Self> {
        if resolution.x <= 0 || resolution.y <= 0 {
            return Err(Error::InvalidArgument(format!(
                "invalid camera resolution {}x{}",
                resolution.x, resolution.y
            )));
        }
        if !(fov > 0.0 && fov < 180.0) {
            return Err(Error::InvalidArgument(format!("invalid field of view {fov}")));
        }
        if lens_radius < 0.0 || (lens_radius > 0.0 && !(focal_distance > 0.0)) {
            return Err(Error::InvalidArgument(format!(
                "invalid lens radius {lens_radius} or focal distance {focal_distance}"
            )));
        }

        // Compute image plane bounds at z = 1.
        let tan_half = (radians(fov) / 2.0).tan();
        let aspect = resolution.x as Float / resolution.y as Float;
        let half_extent = if aspect > 1.0 {
            Vector2f::new(aspect * tan_half, tan_half)
        } else {
            Vector2f::new(tan_half, tan_half / aspect)
        };
        let a = 4.0 * half_extent.x * half_extent.y;

        let camera_to_world = world_to_camera.inverse();
        let forward = camera_to_world
            .transform_vector(&Vector3f::new(0.0, 0.0, 1.0))
            .normalize();
        debug!("Perspective camera {}x{} fov {fov}", resolution.x, resolution.y);

        Ok(Self {
            camera_to_world,
            world_to_camera,
            resolution,
            lens_radius,
            focal_distance,
            medium,
            half_extent,
            a,
            forward,
        })
    }

    /// Returns the area of the lens; 1 for a pinhole.
    fn lens_area(&self) -> Float {
        if self.lens_radius > 0.0 {
            PI * self.lens_radius * self.lens_radius
        } else {
            1.0
        }
    }

    /// Returns the camera space point on the z = 1 plane for a raster position.
    ///
    /// * `p_film` - Raster position.
    fn raster_to_camera(&self, p_film: &Point2f) -> Point3f {
        let sx = 2.0 * p_film.x / self.resolution.x as Float - 1.0;
        let sy = 1.0 - 2.0 * p_film.y / self.resolution.y as Float;
        Point3f::new(sx * self.half_extent.x, sy * self.half_extent.y, 1.0)
    }

    /// Returns the raster position of a camera space point, if it lies on the
    /// film.
    ///
    /// * `p` - Camera space point in front of the camera.
    fn camera_to_raster(&self, p: &Point3f) -> Option<Point2f> {
        let x = p.x / p.z / self.half_extent.x;
        let y = p.y / p.z / self.half_extent.y;
        let p_raster = Point2f::new(
            (x + 1.0) * 0.5 * self.resolution.x as Float,
            (1.0 - y) * 0.5 * self.resolution.y as Float,
        );
        let inside = p_raster.x >= 0.0
            && p_raster.x < self.resolution.x as Float
            && p_raster.y >= 0.0
            && p_raster.y < self.resolution.y as Float;
        inside.then_some(p_raster)
    }

    /// Returns the camera space ray for a film position and lens sample.
    fn camera_ray(&self, p_film: &Point2f, p_lens: &Point2f) -> (Point3f, Vector3f) {
        let p_camera = self.raster_to_camera(p_film);
        let dir = Vector3f::from(p_camera).normalize();
        if self.lens_radius > 0.0 {
            // Compute point on plane of focus and refocus through the lens.
            let p_lens = concentric_sample_disk(p_lens) * self.lens_radius;
            let ft = self.focal_distance / dir.z;
            let p_focus = Point3f::from(dir * ft);
            let o = Point3f::new(p_lens.x, p_lens.y, 0.0);
            (o, (p_focus - o).normalize())
        } else {
            (Point3f::ZERO, dir)
        }
    }

    /// Returns the cosine between a world space direction and the view axis.
    fn cos_theta(&self, d: &Vector3f) -> Float {
        d.dot(&self.forward)
    }

    /// Returns the raster position a ray leaving the lens corresponds to.
    fn ray_raster(&self, ray: &Ray, cos_theta: Float) -> Option<Point2f> {
        let t = if self.lens_radius > 0.0 {
            self.focal_distance / cos_theta
        } else {
            1.0 / cos_theta
        };
        let p_focus = self.world_to_camera.transform_point(&ray.at(t));
        self.camera_to_raster(&p_focus)
    }
}

impl Camera for PerspectiveCamera {
    fn get_type(&self) -> &'static str {
        "perspective"
    }

    fn resolution(&self) -> Point2i {
        self.resolution
    }

    fn medium(&self) -> Option<ArcMedium> {
        self.medium.clone()
    }

    fn generate_ray(&self, sample: &CameraSample) -> (Ray, Float) {
        let (o, d) = self.camera_ray(&sample.p_film, &sample.p_lens);
        let ray = Ray::new(
            self.camera_to_world.transform_point(&o),
            self.camera_to_world.transform_vector(&d).normalize(),
            INFINITY,
            sample.time,
            self.medium.clone(),
        );
        (ray, 1.0)
    }

    fn generate_ray_differential(&self, sample: &CameraSample) -> (Ray, Float) {
        let (mut ray, weight) = self.generate_ray(sample);

        // Offset rays by one pixel on the film, sharing the lens sample.
        let (ox, dx) = self.camera_ray(&(sample.p_film + Vector2f::new(1.0, 0.0)), &sample.p_lens);
        let (oy, dy) = self.camera_ray(&(sample.p_film + Vector2f::new(0.0, 1.0)), &sample.p_lens);
        ray.differentials = Some(RayDifferential::new(
            self.camera_to_world.transform_point(&ox),
            self.camera_to_world.transform_point(&oy),
            self.camera_to_world.transform_vector(&dx).normalize(),
            self.camera_to_world.transform_vector(&dy).normalize(),
        ));
        (ray, weight)
    }

    fn we(&self, ray: &Ray) -> (Spectrum, Option<Point2f>) {
        let cos_theta = self.cos_theta(&ray.d);
        if cos_theta <= 0.0 {
            return (Spectrum::ZERO, None);
        }
        match self.ray_raster(ray, cos_theta) {
            Some(p_raster) => {
                let cos2_theta = cos_theta * cos_theta;
                let we = 1.0 / (self.a * self.lens_area() * cos2_theta * cos2_theta);
                (Spectrum::new(we), Some(p_raster))
            }
            None => (Spectrum::ZERO, None),
        }
    }

    fn pdf_we(&self, ray: &Ray) -> (Float, Float) {
        let cos_theta = self.cos_theta(&ray.d);
        if cos_theta <= 0.0 || self.ray_raster(ray, cos_theta).is_none() {
            return (0.0, 0.0);
        }
        (
            1.0 / self.lens_area(),
            1.0 / (self.a * cos_theta * cos_theta * cos_theta),
        )
    }

    fn sample_wi(&self, hit: &Hit, u: &Point2f) -> Option<CameraWiSample> {
        // Uniformly sample a lens interaction.
        let p_lens = concentric_sample_disk(u) * self.lens_radius;
        let p_lens_world = self
            .camera_to_world
            .transform_point(&Point3f::new(p_lens.x, p_lens.y, 0.0));
        let lens = Hit::new(
            p_lens_world,
            hit.time,
            Vector3f::ZERO,
            Normal3f::from(self.forward),
            MediumInterface::from(self.medium.clone()),
        );

        // Populate arguments and compute the importance value.
        let wi = p_lens_world - hit.p;
        let dist = wi.length();
        if dist == 0.0 {
            return None;
        }
        let wi = wi / dist;
        let cos_lens = self.forward.abs_dot(&wi);
        if cos_lens == 0.0 {
            return None;
        }
        let pdf = dist * dist / (cos_lens * self.lens_area());

        let mut ray = Ray::new(p_lens_world, -wi, INFINITY, hit.time, self.medium.clone());
        ray.t_min = 0.0;
        let (value, p_raster) = self.we(&ray);
        let p_raster = p_raster?;
        Some(CameraWiSample {
            wi,
            pdf,
            p_raster,
            visibility: VisibilityTester::new(hit.clone(), lens),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn camera(w: Int, h: Int) -> PerspectiveCamera {
        let look_at = Transform::look_at(
            &Point3f::new(0.0, 0.0, -5.0),
            &Point3f::ZERO,
            &Vector3f::new(0.0, 1.0, 0.0),
        )
        .unwrap();
        PerspectiveCamera::new(look_at, 45.0, Point2i::new(w, h), 0.0, 1.0, None).unwrap()
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let t = Transform::identity();
        assert!(PerspectiveCamera::new(t, 45.0, Point2i::new(0, 4), 0.0, 1.0, None).is_err());
        assert!(PerspectiveCamera::new(t, 0.0, Point2i::new(4, 4), 0.0, 1.0, None).is_err());
        assert!(PerspectiveCamera::new(t, 45.0, Point2i::new(4, 4), 0.1, 0.0, None).is_err());
    }

    #[test]
    fn center_ray_looks_forward() {
        let camera = camera(4, 4);
        let (ray, weight) = camera.generate_ray(&CameraSample::new(Point2f::new(2.0, 2.0), Point2f::new(0.5, 0.5), 0.0));
        assert_eq!(weight, 1.0);
        assert!(approx_eq!(Float, ray.d.z, 1.0, epsilon = 1e-6));
        assert!(approx_eq!(Float, ray.o.z, -5.0, epsilon = 1e-6));
    }

    #[test]
    fn raster_axes_point_right_and_down() {
        let camera = camera(4, 4);
        let (ray, _) = camera.generate_ray(&CameraSample::new(Point2f::new(3.5, 0.5), Point2f::default(), 0.0));
        // Right of the image is +x for a left-handed look-at with +y up.
        assert!(ray.d.x > 0.0);
        assert!(ray.d.y > 0.0);
    }

    #[test]
    fn importance_integrates_to_one_over_the_film() {
        // ∫ We cos θ dω over the film is 1 for a pinhole; dω = cos³θ dA on
        // the z = 1 plane.
        let camera = camera(8, 6);
        let n = 64;
        let d_a = camera.a / (n * n) as Float;
        let mut sum = 0.0_f64;
        for i in 0..n {
            for j in 0..n {
                let p_film = Point2f::new(
                    (i as Float + 0.5) / n as Float * 8.0,
                    (j as Float + 0.5) / n as Float * 6.0,
                );
                let (ray, _) = camera.generate_ray(&CameraSample::new(p_film, Point2f::default(), 0.0));
                let cos_theta = ray.d.z;
                let (we, _) = camera.we(&ray);
                sum += (we[0] * cos_theta.powi(4) * d_a) as f64;

                let (pdf_pos, pdf_dir) = camera.pdf_we(&ray);
                assert_eq!(pdf_pos, 1.0);
                assert!(approx_eq!(Float, pdf_dir * cos_theta.powi(3) * camera.a, 1.0, epsilon = 1e-4));
            }
        }
        assert!(approx_eq!(f64, sum, 1.0, epsilon = 1e-3));
    }

    proptest! {
        #[test]
        fn we_recovers_raster_position(x in 0.01..7.99f32, y in 0.01..5.99f32) {
            let camera = camera(8, 6);
            let (ray, _) = camera.generate_ray(&CameraSample::new(Point2f::new(x, y), Point2f::default(), 0.0));
            let (we, p_raster) = camera.we(&ray);
            prop_assert!(!we.is_black());
            let p_raster = p_raster.unwrap();
            prop_assert!(approx_eq!(Float, p_raster.x, x, epsilon = 1e-3));
            prop_assert!(approx_eq!(Float, p_raster.y, y, epsilon = 1e-3));
        }

        #[test]
        fn sample_wi_points_at_lens(x in -1.0..1.0f32, y in -1.0..1.0f32) {
            let camera = camera(8, 8);
            let hit = Hit::new(Point3f::new(x, y, 0.0), 0.0, Vector3f::ZERO, Normal3f::ZERO, MediumInterface::vacuum());
            let s = camera.sample_wi(&hit, &Point2f::new(0.5, 0.5)).unwrap();
            prop_assert!(s.pdf > 0.0);
            prop_assert!(s.wi.z < 0.0);
            prop_assert!(approx_eq!(Float, s.visibility.p1.p.z, -5.0, epsilon = 1e-5));
        }
    }
}
