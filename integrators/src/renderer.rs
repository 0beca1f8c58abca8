//! Sample Renderer

use crate::integrator::*;
use crossbeam_channel::Receiver;
use indicatif::{ProgressBar, ProgressStyle};
use rad_core::base::*;
use rad_core::error::*;
use rad_core::film::*;
use rad_core::geometry::*;
use rad_core::options::*;
use rad_core::sampler::*;
use rad_core::scene::*;
use rad_core::spectrum::*;
use std::cmp::min;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Start and end times of a render. Only the coordinator thread writes the
/// end time.
#[derive(Clone, Copy, Debug, Default)]
struct Stopwatch {
    start: Option<Instant>,
    end: Option<Instant>,
}

impl Stopwatch {
    fn elapsed(&self) -> Duration {
        match (self.start, self.end) {
            (Some(start), Some(end)) => end - start,
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }
}

/// State shared between the renderer, its coordinator and the workers.
struct Shared {
    scene: Arc<Scene>,
    integrator: Arc<dyn Integrator>,
    options: RenderOptions,
    frame_buffer: Mutex<FrameBuffer>,
    completed: AtomicUsize,
    stop: AtomicBool,
    stopwatch: Mutex<Stopwatch>,
    blocks_x: usize,
    block_count: usize,
}

/// Lock a mutex, recovering the data if a worker panicked while holding it.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Renders an image by distributing square pixel blocks over a pool of
/// worker threads. Each block gets its own sampler stream derived from the
/// master sampler and the block index, so a fixed seed gives the same noise
/// pattern for any thread count.
pub struct SampleRenderer {
    shared: Arc<Shared>,

    /// Master sampler; handed to the coordinator on `start()`.
    sampler: Option<Box<dyn Sampler>>,

    /// The coordinator thread while a render is in flight.
    handle: Option<JoinHandle<()>>,
}

impl SampleRenderer {
    /// Create a new `SampleRenderer`. The integrator is prepared for the
    /// scene here; a scene it cannot render is reported as an error.
    ///
    /// * `scene`      - The scene.
    /// * `integrator` - The integrator.
    /// * `sampler`    - Master sampler; its sample count sets the samples
    ///                  per pixel.
    /// * `options`    - Render options.
    pub fn new(
        scene: Arc<Scene>,
        mut integrator: Box<dyn Integrator>,
        sampler: Box<dyn Sampler>,
        options: RenderOptions,
    ) -> Result<Self> {
        if options.block_size == 0 {
            return Err(Error::InvalidArgument("block size must be positive".to_string()));
        }
        if sampler.samples_per_pixel() != options.samples_per_pixel {
            warn!(
                "Sampler takes {} samples per pixel; ignoring samples_per_pixel = {}",
                sampler.samples_per_pixel(),
                options.samples_per_pixel
            );
        }

        integrator.preprocess(&scene)?;

        let frame_buffer = FrameBuffer::new(scene.camera.resolution())?;
        let blocks_x = (frame_buffer.width() + options.block_size - 1) / options.block_size;
        let blocks_y = (frame_buffer.height() + options.block_size - 1) / options.block_size;
        info!(
            "Renderer for {}x{} image with the {} integrator: {} blocks",
            frame_buffer.width(),
            frame_buffer.height(),
            integrator.get_type(),
            blocks_x * blocks_y
        );

        Ok(Self {
            shared: Arc::new(Shared {
                scene,
                integrator: Arc::from(integrator),
                options,
                frame_buffer: Mutex::new(frame_buffer),
                completed: AtomicUsize::new(0),
                stop: AtomicBool::new(false),
                stopwatch: Mutex::new(Stopwatch::default()),
                blocks_x,
                block_count: blocks_x * blocks_y,
            }),
            sampler: Some(sampler),
            handle: None,
        })
    }

    /// Start rendering in the background. A renderer can only be started
    /// once.
    pub fn start(&mut self) -> Result<()> {
        let sampler = self
            .sampler
            .take()
            .ok_or_else(|| Error::Render("renderer was already started".to_string()))?;

        lock(&self.shared.stopwatch).start = Some(Instant::now());

        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("render-coordinator".to_string())
            .spawn(move || coordinate(&shared, sampler))?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Block until the render completes or, after `stop()`, until the workers
    /// have wound down.
    pub fn wait(&mut self) -> Result<()> {
        if self.sampler.is_some() {
            return Err(Error::Render("renderer was not started".to_string()));
        }
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| Error::Render("render coordinator panicked".to_string())),
            None => Ok(()),
        }
    }

    /// Ask the workers to stop. Samples already taken stay in the frame
    /// buffer.
    pub fn stop(&self) {
        info!("Stopping render");
        self.shared.stop.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once every block has been rendered.
    pub fn is_complete(&self) -> bool {
        self.completed_task_count() == self.all_task_count()
    }

    /// Returns the number of blocks in the image.
    pub fn all_task_count(&self) -> usize {
        self.shared.block_count
    }

    /// Returns the number of blocks rendered so far.
    pub fn completed_task_count(&self) -> usize {
        self.shared.completed.load(Ordering::SeqCst)
    }

    /// Returns the time spent rendering; the clock stops when the render
    /// completes or is stopped.
    pub fn elapsed_time(&self) -> Duration {
        lock(&self.shared.stopwatch).elapsed()
    }

    /// Returns a snapshot of the frame buffer.
    pub fn frame_buffer(&self) -> FrameBuffer {
        lock(&self.shared.frame_buffer).clone()
    }

    /// Write the image once the render is complete or has been stopped.
    ///
    /// * `location` - Output location.
    pub fn save_result(&mut self, location: &LocationResolver) -> Result<()> {
        let finished = self.handle.as_ref().map_or(true, |h| h.is_finished());
        let stopped = self.shared.stop.load(Ordering::SeqCst);
        if self.sampler.is_some() || !(finished || stopped) {
            return Err(Error::Render(
                "the image can only be saved after the render completed or was stopped".to_string(),
            ));
        }
        self.wait()?;
        lock(&self.shared.frame_buffer).save_result(location)
    }
}

impl Drop for SampleRenderer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.shared.stop.store(true, Ordering::SeqCst);
            if handle.join().is_err() {
                error!("Render coordinator panicked");
            }
        }
    }
}

/// Returns a progress bar for the blocks of a render; hidden unless enabled
/// in the options.
///
/// * `options` - Render options.
/// * `len`     - Number of blocks.
fn progress_bar(options: &RenderOptions, len: usize) -> ProgressBar {
    if !options.progress {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{elapsed_precise} [{bar:40}] {pos}/{len} blocks ({eta})") {
        bar.set_style(style);
    }
    bar
}

/// Feed blocks to a scoped pool of workers until every block is rendered or
/// the render is stopped.
///
/// * `shared`  - Renderer state.
/// * `sampler` - Master sampler.
fn coordinate(shared: &Shared, sampler: Box<dyn Sampler>) {
    let n_threads = shared.options.thread_count();
    let bar = progress_bar(&shared.options, shared.block_count);
    info!("Rendering {} blocks on {n_threads} threads", shared.block_count);

    let res = crossbeam::scope(|scope| {
        let (tx, rx) = crossbeam_channel::bounded::<(usize, Box<dyn Sampler>)>(n_threads);

        for _ in 0..n_threads {
            let rxc = rx.clone();
            let bar = bar.clone();
            scope.spawn(move |_| work(shared, rxc, &bar));
        }
        drop(rx);

        for block in 0..shared.block_count {
            if shared.stop.load(Ordering::SeqCst) {
                break;
            }
            let block_sampler = sampler.clone_sampler(shared.options.seed.wrapping_add(block as u64));
            if tx.send((block, block_sampler)).is_err() {
                break;
            }
        }
    });
    if res.is_err() {
        error!("Render worker panicked");
    }

    lock(&shared.stopwatch).end = Some(Instant::now());
    bar.finish_and_clear();
    let completed = shared.completed.load(Ordering::SeqCst);
    if completed == shared.block_count {
        info!("Render complete");
    } else {
        info!("Render stopped after {completed} of {} blocks", shared.block_count);
    }
}

/// Render blocks from the queue into a thread-local buffer. Samples are
/// merged into the shared buffer after every block, touching only the block's
/// pixels. Splats can land anywhere in the image, so they are merged once the
/// worker has taken about one sample per pixel since the last splat merge,
/// and when the queue is drained.
///
/// * `shared` - Renderer state.
/// * `rx`     - Block queue.
/// * `bar`    - Progress bar.
fn work(shared: &Shared, rx: Receiver<(usize, Box<dyn Sampler>)>, bar: &ProgressBar) {
    let mut local = match FrameBuffer::new(lock(&shared.frame_buffer).resolution()) {
        Ok(fb) => fb,
        Err(e) => {
            error!("Unable to create worker frame buffer: {e}");
            return;
        }
    };
    let pixel_count = (local.width() * local.height()) as u64;
    let mut unmerged_splat_samples = 0;

    for (block, mut block_sampler) in rx.iter() {
        let done = run_block(shared, block, block_sampler.as_mut(), &mut local);

        unmerged_splat_samples += local.sample_count();
        let flush_splats = unmerged_splat_samples >= pixel_count;
        let mut frame_buffer = lock(&shared.frame_buffer);
        frame_buffer.merge_samples(&local);
        if flush_splats {
            frame_buffer.merge_splats(&local);
        }
        drop(frame_buffer);
        local.reset_samples();
        if flush_splats {
            local.reset_splats();
            unmerged_splat_samples = 0;
        }

        if done {
            shared.completed.fetch_add(1, Ordering::SeqCst);
            bar.inc(1);
        }
    }

    lock(&shared.frame_buffer).merge_splats(&local);
}

/// Render a block, catching errors and panics. Returns `false` only if the
/// block was cut short by a stop request; failed blocks count as done.
///
/// * `shared`  - Renderer state.
/// * `block`   - Block index.
/// * `sampler` - Sampler for the block.
/// * `local`   - Thread-local accumulation buffer.
fn run_block(shared: &Shared, block: usize, sampler: &mut dyn Sampler, local: &mut FrameBuffer) -> bool {
    match catch_unwind(AssertUnwindSafe(|| render_block(shared, block, sampler, local))) {
        Ok(Ok(done)) => done,
        Ok(Err(e)) => {
            error!("Block {block} failed: {e}");
            true
        }
        Err(_) => {
            error!("Block {block} panicked");
            true
        }
    }
}

/// Take every pixel sample of a block. Returns `false` if a stop request was
/// observed.
///
/// * `shared`  - Renderer state.
/// * `block`   - Block index.
/// * `sampler` - Sampler for the block.
/// * `local`   - Thread-local accumulation buffer.
fn render_block(shared: &Shared, block: usize, sampler: &mut dyn Sampler, local: &mut FrameBuffer) -> Result<bool> {
    let bs = shared.options.block_size;
    let x0 = (block % shared.blocks_x) * bs;
    let y0 = (block / shared.blocks_x) * bs;
    let x1 = min(x0 + bs, local.width());
    let y1 = min(y0 + bs, local.height());
    debug!("Starting block {block}: ({x0}, {y0}) - ({x1}, {y1})");

    for y in y0..y1 {
        for x in x0..x1 {
            sampler.start_pixel(&Point2i::new(x as i32, y as i32));
            loop {
                if shared.stop.load(Ordering::Relaxed) {
                    return Ok(false);
                }

                let u = sampler.get_2d();
                let p_film = Point2f::new(x as Float + u.x, y as Float + u.y);
                let mut l = shared
                    .integrator
                    .render_sample(&shared.scene, &p_film, sampler, local)?;
                if !l.is_finite() {
                    warn!("Non-finite radiance {l} for pixel ({x}, {y}); setting to black");
                    l = Spectrum::ZERO;
                } else if l.min_component_value() < 0.0 {
                    warn!("Negative radiance {l} for pixel ({x}, {y}); setting to black");
                    l = Spectrum::ZERO;
                }
                local.add_sample(x, y, l);

                if !sampler.start_next_sample() {
                    break;
                }
            }
        }
    }

    debug!("Finished block {block}");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::*;
    use crate::test_scenes::*;
    use float_cmp::approx_eq;
    use rad_samplers::RandomSampler;

    /// Returns the same radiance for every sample and panics on request.
    struct ConstantIntegrator {
        value: Spectrum,
        panic: bool,
    }

    impl Integrator for ConstantIntegrator {
        fn get_type(&self) -> &'static str {
            "constant"
        }

        fn render_sample(
            &self,
            _scene: &Scene,
            _p_film: &Point2f,
            _sampler: &mut dyn Sampler,
            _splats: &mut FrameBuffer,
        ) -> Result<Spectrum> {
            if self.panic {
                panic!("integrator failure");
            }
            Ok(self.value)
        }
    }

    fn renderer(value: Spectrum, panic: bool, spp: usize) -> SampleRenderer {
        let scene = Arc::new(floor_without_lights());
        let sampler = Box::new(RandomSampler::new(spp, Some(1)).expect("sampler"));
        let options = RenderOptions::default().with_threads(2).with_samples_per_pixel(spp);
        SampleRenderer::new(scene, Box::new(ConstantIntegrator { value, panic }), sampler, options).expect("renderer")
    }

    #[test]
    fn renders_every_block() {
        let mut r = renderer(Spectrum::new(0.25), false, 4);
        r.start().expect("start");
        r.wait().expect("wait");
        assert!(r.is_complete());
        assert_eq!(r.all_task_count(), 1);
        let fb = r.frame_buffer();
        assert_eq!(fb.pixel_sample_count(0, 0), 4);
        assert_eq!(fb.get(0, 0), Spectrum::new(0.25));
    }

    #[test]
    fn invalid_samples_become_black() {
        let mut r = renderer(Spectrum::new(Float::NAN), false, 2);
        r.start().expect("start");
        r.wait().expect("wait");
        assert_eq!(r.frame_buffer().get(0, 0), Spectrum::ZERO);

        let mut r = renderer(Spectrum::new(-1.0), false, 2);
        r.start().expect("start");
        r.wait().expect("wait");
        assert_eq!(r.frame_buffer().get(0, 0), Spectrum::ZERO);
    }

    #[test]
    fn panicking_blocks_are_counted() {
        let mut r = renderer(Spectrum::ONE, true, 2);
        r.start().expect("start");
        r.wait().expect("wait");
        assert!(r.is_complete());
        assert_eq!(r.frame_buffer().sample_count(), 0);
    }

    #[test]
    fn lifecycle_misuse_is_an_error() {
        let mut r = renderer(Spectrum::ONE, false, 1);
        assert!(matches!(r.wait(), Err(Error::Render(_))));
        let path = std::env::temp_dir().join("rad_renderer_unstarted.pfm");
        let location = LocationResolver::new(&path).expect("location");
        assert!(matches!(r.save_result(&location), Err(Error::Render(_))));

        r.start().expect("start");
        assert!(matches!(r.start(), Err(Error::Render(_))));
        r.wait().expect("wait");
        assert!(r.elapsed_time() > Duration::ZERO);
    }

    /// Splats its value at the film position and returns no radiance.
    struct SplattingIntegrator {
        value: Spectrum,
    }

    impl Integrator for SplattingIntegrator {
        fn get_type(&self) -> &'static str {
            "splatting"
        }

        fn render_sample(
            &self,
            _scene: &Scene,
            p_film: &Point2f,
            _sampler: &mut dyn Sampler,
            splats: &mut FrameBuffer,
        ) -> Result<Spectrum> {
            splats.add_splat(p_film, self.value);
            Ok(Spectrum::ZERO)
        }
    }

    fn render_at(resolution: Point2i, block_size: usize, spp: usize, integrator: Box<dyn Integrator>) -> SampleRenderer {
        let scene = Arc::new(unlit_floor_at(resolution));
        let sampler = Box::new(RandomSampler::new(spp, Some(7)).expect("sampler"));
        let options = RenderOptions::default()
            .with_threads(4)
            .with_block_size(block_size)
            .with_samples_per_pixel(spp);
        let mut r = SampleRenderer::new(scene, integrator, sampler, options).expect("renderer");
        r.start().expect("start");
        r.wait().expect("wait");
        r
    }

    #[test]
    fn single_pixel_blocks_fill_large_image() {
        let res = Point2i::new(96, 80);
        let value = Spectrum::new(0.75);
        let r = render_at(res, 1, 2, Box::new(ConstantIntegrator { value, panic: false }));
        assert!(r.is_complete());
        assert_eq!(r.all_task_count(), 96 * 80);

        let fb = r.frame_buffer();
        assert_eq!(fb.sample_count(), 2 * 96 * 80);
        assert_eq!(fb.sample_region(), Some(Bounds2i::new(Point2i::new(0, 0), res)));
        for x in 0..96 {
            for y in 0..80 {
                assert_eq!(fb.pixel_sample_count(x, y), 2);
                assert_eq!(fb.get(x, y), value);
            }
        }
    }

    #[test]
    fn splats_from_every_worker_reach_the_image() {
        let value = Spectrum::new(0.5);
        let r = render_at(Point2i::new(40, 24), 3, 4, Box::new(SplattingIntegrator { value }));
        assert!(r.is_complete());

        let fb = r.frame_buffer();
        assert_eq!(fb.sample_count(), 4 * 40 * 24);
        // Four splats per pixel scaled by pixels over samples.
        for x in 0..40 {
            for y in 0..24 {
                assert!(approx_eq!(Float, fb.get(x, y)[0], 0.5, epsilon = 1e-5));
            }
        }
    }

    #[test]
    fn rejects_zero_block_size() {
        let scene = Arc::new(floor_without_lights());
        let sampler = Box::new(RandomSampler::new(1, Some(1)).expect("sampler"));
        let options = RenderOptions::default().with_block_size(0);
        let integrator = Box::new(PathIntegrator::from_options(&options));
        assert!(matches!(
            SampleRenderer::new(scene, integrator, sampler, options),
            Err(Error::InvalidArgument(_))
        ));
    }
}
