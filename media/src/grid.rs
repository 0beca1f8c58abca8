//! Grid Density Media

use rad_core::base::*;
use rad_core::error::*;
use rad_core::geometry::*;
use rad_core::medium::*;
use rad_core::spectrum::*;

/// Implements medium densities at a regular 3D grid of positions in the unit
/// cube of medium space. Densities between grid points are trilinearly
/// interpolated and scale the base coefficients.
#[derive(Clone, Debug)]
pub struct GridDensityMedium {
    /// Absorption coefficient at density 1.
    sigma_a: Spectrum,

    /// Scattering coefficient at density 1.
    sigma_s: Spectrum,

    /// The phase function.
    phase: PhaseFunction,

    /// Grid size in x-direction.
    nx: usize,

    /// Grid size in y-direction.
    ny: usize,

    /// Grid size in z-direction.
    nz: usize,

    /// Transformaton from world-space to medium-space.
    world_to_medium: Transform,

    /// Density values in the grid, x varying fastest.
    density: Vec<Float>,

    /// Extinction at the maximum density.
    majorant: Spectrum,
}

impl GridDensityMedium {
    /// Create a new `GridDensityMedium`.
    ///
    /// * `sigma_a`         - Absorption coefficient `σa`.
    /// * `sigma_s`         - Scattering coefficient `σs`.
    /// * `g`               - The asymmetry parameter for Henyey-Greenstein phase
    ///                       function.
    /// * `nx`              - Grid size in x-direction.
    /// * `ny`              - Grid size in y-direction.
    /// * `nz`              - Grid size in z-direction.
    /// * `medium_to_world` - Medium-space to world-space transformation.
    /// * `density`         - Density values in the grid.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sigma_a: Spectrum,
        sigma_s: Spectrum,
        g: Float,
        nx: usize,
        ny: usize,
        nz: usize,
        medium_to_world: Transform,
        density: Vec<Float>,
    ) -> Result<Self> {
        if nx == 0 || ny == 0 || nz == 0 || density.len() != nx * ny * nz {
            return Err(Error::InvalidArgument(format!(
                "density grid {nx}x{ny}x{nz} with {} values",
                density.len()
            )));
        }
        if let Some(d) = density.iter().find(|d| !d.is_finite() || **d < 0.0) {
            return Err(Error::InvalidArgument(format!("invalid grid density {d}")));
        }
        if sigma_a.min_component_value() < 0.0 || sigma_s.min_component_value() < 0.0 {
            return Err(Error::InvalidArgument("medium coefficients must be non-negative".to_string()));
        }
        if !(g > -1.0 && g < 1.0) {
            return Err(Error::InvalidArgument(format!("phase asymmetry {g} outside (-1, 1)")));
        }

        let max_density = density.iter().fold(0.0, |a, &x| max(a, x));
        debug!("Grid medium {nx}x{ny}x{nz}, max density {max_density}");
        Ok(Self {
            sigma_a,
            sigma_s,
            phase: PhaseFunction::new(g),
            nx,
            ny,
            nz,
            world_to_medium: medium_to_world.inverse(),
            density,
            majorant: (sigma_a + sigma_s) * max_density,
        })
    }

    /// Reconstruct the volume density function at a medium space position.
    ///
    /// * `p` - Sample position.
    fn density(&self, p: &Point3f) -> Float {
        // Compute voxel coordinates and offsets for `p`.
        let (x, dx) = Self::voxel(p.x, self.nx);
        let (y, dy) = Self::voxel(p.y, self.ny);
        let (z, dz) = Self::voxel(p.z, self.nz);

        // Trilinearly interpolate density values to compute local density.
        let d00 = lerp(dx, self.d(x, y, z), self.d(x + 1, y, z));
        let d10 = lerp(dx, self.d(x, y + 1, z), self.d(x + 1, y + 1, z));
        let d01 = lerp(dx, self.d(x, y, z + 1), self.d(x + 1, y, z + 1));
        let d11 = lerp(dx, self.d(x, y + 1, z + 1), self.d(x + 1, y + 1, z + 1));
        let d0 = lerp(dy, d00, d10);
        let d1 = lerp(dy, d01, d11);
        lerp(dz, d0, d1)
    }

    /// Returns the lower voxel index along one axis and the offset from it.
    fn voxel(c: Float, n: usize) -> (isize, Float) {
        let s = c * n as Float - 0.5;
        let i = s.floor();
        (i as isize, s - i)
    }

    /// Returns the density at an integer sample position; positions outside
    /// the grid take the value of the nearest edge sample.
    fn d(&self, x: isize, y: isize, z: isize) -> Float {
        let x = clamp(x, 0, self.nx as isize - 1) as usize;
        let y = clamp(y, 0, self.ny as isize - 1) as usize;
        let z = clamp(z, 0, self.nz as isize - 1) as usize;
        self.density[(z * self.ny + y) * self.nx + x]
    }
}

impl Medium for GridDensityMedium {
    fn phase(&self) -> &PhaseFunction {
        &self.phase
    }

    fn is_homogeneous(&self) -> bool {
        false
    }

    fn intersect_bounds(&self, ray: &Ray) -> Option<(Float, Float)> {
        // Affine transforms keep the ray parameter.
        let ray_medium = self.world_to_medium.transform_ray(ray);
        let b = Bounds3f::new(Point3f::ZERO, Point3f::new(1.0, 1.0, 1.0));
        b.intersect_p(&ray_medium)
    }

    fn majorant(&self, _ray: &Ray) -> Spectrum {
        self.majorant
    }

    fn properties(&self, p: &Point3f) -> MediumProperties {
        let d = self.density(&self.world_to_medium.transform_point(p));
        let sigma_a = self.sigma_a * d;
        let sigma_s = self.sigma_s * d;
        let sigma_n = (self.majorant - sigma_a - sigma_s).clamp(0.0, INFINITY);
        MediumProperties::new(sigma_a, sigma_s, sigma_n)
    }

    fn get_type(&self) -> &'static str {
        "grid"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;
    use rad_samplers::*;

    fn ramp() -> GridDensityMedium {
        GridDensityMedium::new(
            Spectrum::new(0.5),
            Spectrum::new(0.5),
            0.0,
            2,
            1,
            1,
            Transform::identity(),
            vec![0.25, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn rejects_mismatched_grid() {
        let r = GridDensityMedium::new(Spectrum::ONE, Spectrum::ONE, 0.0, 2, 2, 2, Transform::identity(), vec![1.0; 7]);
        assert!(r.is_err());
    }

    #[test]
    fn density_is_interpolated_and_clamped() {
        let medium = ramp();
        let at = |x: Float| medium.properties(&Point3f::new(x, 0.5, 0.5)).sigma_t()[0];
        assert!(approx_eq!(Float, at(0.1), 0.25, epsilon = 1e-5));
        assert!(approx_eq!(Float, at(0.5), 0.625, epsilon = 1e-5));
        assert!(approx_eq!(Float, at(0.9), 1.0, epsilon = 1e-5));
        // Majorant bounds extinction everywhere.
        let props = medium.properties(&Point3f::new(0.3, 0.5, 0.5));
        assert!(approx_eq!(Float, (props.sigma_t() + props.sigma_n)[1], 1.0, epsilon = 1e-5));
    }

    #[test]
    fn rays_missing_the_grid_are_unattenuated() {
        let medium = ramp();
        let mut sampler = RandomSampler::new(1, Some(2)).unwrap();
        let ray = Ray::new(Point3f::new(0.0, 5.0, 0.5), Vector3f::new(1.0, 0.0, 0.0), INFINITY, 0.0, None);
        assert_eq!(medium.tr(&ray, &mut sampler), Spectrum::ONE);
    }

    #[test]
    fn ratio_tracking_matches_optical_depth() {
        // Optical depth across the ramp is 0.25·0.25 + 0.625·0.5 + 1·0.25.
        let medium = ramp();
        let mut sampler = RandomSampler::new(1, Some(7)).unwrap();
        let ray = Ray::new(Point3f::new(-1.0, 0.5, 0.5), Vector3f::new(1.0, 0.0, 0.0), 3.0, 0.0, None);
        let n = 20_000;
        let mut sum = 0.0;
        for _ in 0..n {
            sum += medium.tr(&ray, &mut sampler)[0];
        }
        let expected = (-0.625 as Float).exp();
        assert!(approx_eq!(Float, sum / n as Float, expected, epsilon = 0.02));
    }

    #[test]
    fn delta_tracking_collisions_stay_inside_grid() {
        let medium = ramp();
        let mut sampler = RandomSampler::new(1, Some(9)).unwrap();
        let ray = Ray::new(Point3f::new(-1.0, 0.5, 0.5), Vector3f::new(1.0, 0.0, 0.0), 3.0, 0.0, None);
        for _ in 0..500 {
            let (weight, mi) = medium.sample(&ray, &mut sampler);
            if let Some(mi) = mi {
                assert!(mi.hit.p.x >= 0.0 && mi.hit.p.x <= 1.0 + 1e-4);
                // Albedo is 0.5 everywhere.
                assert!(approx_eq!(Float, weight[0], 0.5, epsilon = 1e-4));
            } else {
                assert!(approx_eq!(Float, weight[0], 1.0, epsilon = 1e-4));
            }
        }
    }

    proptest! {
        #[test]
        fn ratio_tracking_stays_in_unit_interval(
            y in 0.0..1.0f32, z in 0.0..1.0f32, dy in -0.5..0.5f32, seed in 0..1000u64
        ) {
            let medium = ramp();
            let mut sampler = RandomSampler::new(1, Some(seed)).unwrap();
            let d = Vector3f::new(1.0, dy, 0.0).normalize();
            let ray = Ray::new(Point3f::new(-1.0, y, z), d, 4.0, 0.0, None);
            let tr = medium.tr(&ray, &mut sampler);
            prop_assert!(tr.is_finite());
            prop_assert!(tr.min_component_value() >= 0.0);
            prop_assert!(tr.max_component_value() <= 1.0 + 1e-5);
        }
    }
}
