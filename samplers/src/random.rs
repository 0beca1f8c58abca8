//! Random Sampler.

use rad_core::base::*;
use rad_core::error::*;
use rad_core::geometry::*;
use rad_core::rng::*;
use rad_core::sampler::*;

/// Implements a sampler that uses a PRNG to generate uniformly random samples.
#[derive(Clone, Debug)]
pub struct RandomSampler {
    /// The common sampler data.
    pub data: SamplerData,

    /// The random number generator.
    pub rng: RNG,
}

impl RandomSampler {
    /// Create a new `RandomSampler`.
    ///
    /// * `samples_per_pixel` - Number of samples to generate for each pixel.
    /// * `seed`              - Optional seed for the random number generator.
    pub fn new(samples_per_pixel: usize, seed: Option<u64>) -> Result<Self> {
        if samples_per_pixel == 0 {
            return Err(Error::InvalidArgument(
                "sampler needs at least one sample per pixel".to_string(),
            ));
        }
        debug!("Random sampler with {samples_per_pixel} samples per pixel");
        Ok(Self::with_rng(samples_per_pixel, seed))
    }

    fn with_rng(samples_per_pixel: usize, seed: Option<u64>) -> Self {
        Self {
            data: SamplerData::new(samples_per_pixel),
            rng: match seed {
                Some(s) => RNG::new(s),
                None => RNG::default(),
            },
        }
    }
}

impl Sampler for RandomSampler {
    /// Returns a shared reference underlying `SamplerData`.
    fn get_data(&self) -> &SamplerData {
        &self.data
    }

    /// Returns a mutable reference to underlying `SamplerData`.
    fn get_data_mut(&mut self) -> &mut SamplerData {
        &mut self.data
    }

    /// Generates a new instance of an initial `Sampler` for use by a rendering thread.
    ///
    /// * `seed` - The seed for the random number generator.
    fn clone_sampler(&self, seed: u64) -> Box<dyn Sampler> {
        Box::new(Self::with_rng(self.data.samples_per_pixel, Some(seed)))
    }

    /// Returns the sample value for the next dimension of the current sample vector.
    fn get_1d(&mut self) -> Float {
        self.rng.uniform_float()
    }

    /// Returns the sample value for the next two dimensions of the current sample vector.
    fn get_2d(&mut self) -> Point2f {
        Point2f::new(self.rng.uniform_float(), self.rng.uniform_float())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn zero_samples_is_rejected() {
        assert!(RandomSampler::new(0, None).is_err());
    }

    #[test]
    fn pixel_sample_loop_runs_samples_per_pixel_times() {
        let mut sampler = RandomSampler::new(4, Some(1)).unwrap();
        sampler.start_pixel(&Point2i::new(3, 2));
        let mut n = 1;
        while sampler.start_next_sample() {
            n += 1;
        }
        assert_eq!(n, 4);
        assert_eq!(sampler.get_data().current_pixel, Point2i::new(3, 2));
    }

    #[test]
    fn clones_are_independent_streams() {
        let master = RandomSampler::new(1, Some(0)).unwrap();
        let mut a = master.clone_sampler(1);
        let mut b = master.clone_sampler(2);
        let mut c = master.clone_sampler(1);
        let va: Vec<Float> = (0..16).map(|_| a.get_1d()).collect();
        let vb: Vec<Float> = (0..16).map(|_| b.get_1d()).collect();
        let vc: Vec<Float> = (0..16).map(|_| c.get_1d()).collect();
        assert_ne!(va, vb);
        assert_eq!(va, vc);
    }

    #[test]
    fn mean_is_one_half() {
        let mut sampler = RandomSampler::new(1, Some(42)).unwrap();
        let n = 100_000;
        let sum: f64 = (0..n).map(|_| sampler.get_1d() as f64).sum();
        assert!(approx_eq!(f64, sum / n as f64, 0.5, epsilon = 0.01));
    }

    proptest! {
        #[test]
        fn samples_are_in_unit_interval(seed in 0..10_000u64) {
            let mut sampler = RandomSampler::new(1, Some(seed)).unwrap();
            for _ in 0..64 {
                let u = sampler.get_1d();
                prop_assert!((0.0..1.0).contains(&u));
                let p = sampler.get_2d();
                prop_assert!((0.0..1.0).contains(&p.x) && (0.0..1.0).contains(&p.y));
            }
        }
    }
}
