//! Render Options

use crate::light::LightSampleStrategy;

/// Settings shared by the integrators and the renderer.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Number of worker threads; 0 uses the available parallelism.
    pub threads: usize,

    /// Width and height of the square pixel blocks handed to workers.
    pub block_size: usize,

    /// Master seed used to derive per-block sampler streams.
    pub seed: u64,

    /// Number of samples taken per pixel.
    pub samples_per_pixel: usize,

    /// Maximum path depth.
    pub max_depth: usize,

    /// Path depth after which Russian roulette termination starts.
    pub rr_depth: usize,

    /// Strategy used to build the light selection distribution.
    pub light_strategy: LightSampleStrategy,

    /// Display a progress bar while rendering.
    pub progress: bool,
}

impl Default for RenderOptions {
    /// Returns the "default value" for `RenderOptions`.
    fn default() -> Self {
        Self {
            threads: 0,
            block_size: 16,
            seed: 0,
            samples_per_pixel: 16,
            max_depth: 5,
            rr_depth: 3,
            light_strategy: LightSampleStrategy::Power,
            progress: false,
        }
    }
}

impl RenderOptions {
    /// Set the number of worker threads.
    ///
    /// * `threads` - Thread count (0 = all available cores).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the block size.
    ///
    /// * `block_size` - Block width/height in pixels.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set the master seed.
    ///
    /// * `seed` - The seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of samples per pixel.
    ///
    /// * `spp` - Samples per pixel.
    pub fn with_samples_per_pixel(mut self, spp: usize) -> Self {
        self.samples_per_pixel = spp;
        self
    }

    /// Set the maximum path depth.
    ///
    /// * `max_depth` - Maximum depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the depth at which Russian roulette begins.
    ///
    /// * `rr_depth` - Russian roulette depth.
    pub fn with_rr_depth(mut self, rr_depth: usize) -> Self {
        self.rr_depth = rr_depth;
        self
    }

    /// Set the light sampling strategy.
    ///
    /// * `light_strategy` - The strategy.
    pub fn with_light_strategy(mut self, light_strategy: LightSampleStrategy) -> Self {
        self.light_strategy = light_strategy;
        self
    }

    /// Enable or disable the progress bar.
    ///
    /// * `progress` - Show progress.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Returns the number of worker threads to spawn.
    pub fn thread_count(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            std::thread::available_parallelism().map_or(1, |n| n.get())
        }
    }
}
