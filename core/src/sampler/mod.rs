//! Sampler

mod common;

use crate::base::*;
use crate::geometry::*;

// Re-export
pub use common::*;

/// Sampler interface. A sampler is owned by one thread; workers obtain their
/// own via `clone_sampler()`.
pub trait Sampler: Send {
    /// Returns a shared reference underlying `SamplerData`.
    fn get_data(&self) -> &SamplerData;

    /// Returns a mutable reference to underlying `SamplerData`.
    fn get_data_mut(&mut self) -> &mut SamplerData;

    /// Generates a new sampler with an independent stream.
    ///
    /// * `seed` - The seed for the random number generator.
    fn clone_sampler(&self, seed: u64) -> Box<dyn Sampler>;

    /// Returns the number of samples taken per pixel.
    fn samples_per_pixel(&self) -> usize {
        self.get_data().samples_per_pixel
    }

    /// This should be called when the rendering algorithm is ready to start
    /// working on a given pixel.
    ///
    /// * `p` - The pixel.
    fn start_pixel(&mut self, p: &Point2i) {
        self.get_data_mut().start_pixel(p);
    }

    /// Returns the sample value for the next dimension of the current sample vector.
    fn get_1d(&mut self) -> Float;

    /// Returns the sample value for the next two dimensions of the current sample vector.
    fn get_2d(&mut self) -> Point2f;

    /// Returns `true` while the current pixel has samples left.
    fn start_next_sample(&mut self) -> bool {
        self.get_data_mut().start_next_sample()
    }
}

impl<S: Sampler + ?Sized> Sampler for Box<S> {
    #[inline]
    fn get_data(&self) -> &SamplerData {
        (**self).get_data()
    }

    #[inline]
    fn get_data_mut(&mut self) -> &mut SamplerData {
        (**self).get_data_mut()
    }

    #[inline]
    fn clone_sampler(&self, seed: u64) -> Box<dyn Sampler> {
        (**self).clone_sampler(seed)
    }

    #[inline]
    fn samples_per_pixel(&self) -> usize {
        (**self).samples_per_pixel()
    }

    #[inline]
    fn start_pixel(&mut self, p: &Point2i) {
        (**self).start_pixel(p);
    }

    #[inline]
    fn get_1d(&mut self) -> Float {
        (**self).get_1d()
    }

    #[inline]
    fn get_2d(&mut self) -> Point2f {
        (**self).get_2d()
    }

    #[inline]
    fn start_next_sample(&mut self) -> bool {
        (**self).start_next_sample()
    }
}
