//! Film

use crate::base::*;
use crate::error::*;
use crate::geometry::*;
use crate::spectrum::*;

mod image_io;
mod location;

// Re-export.
pub use image_io::*;
pub use location::*;

/// Accumulates pixel samples and light splats for an image. Pixel storage is
/// indexed by `x` first; `get(x, y)` addresses row `x` and column `y` of that
/// storage, i.e. raster column `x` and raster row `y`.
///
/// The buffer tracks the pixel regions written since the last reset so that
/// merging and clearing a mostly empty buffer only touches those pixels.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    /// Image resolution in pixels.
    resolution: Point2i,

    /// Sum of radiance samples per pixel.
    sums: Vec<Spectrum>,

    /// Number of completed samples per pixel.
    counts: Vec<u64>,

    /// Sum of splatted contributions per pixel.
    splats: Vec<Spectrum>,

    /// Total number of completed samples.
    total: u64,

    /// Pixels holding samples.
    sample_region: Option<Bounds2i>,

    /// Pixels holding splats.
    splat_region: Option<Bounds2i>,
}

/// Returns `region` grown to include a pixel.
fn grow(region: Option<Bounds2i>, x: usize, y: usize) -> Option<Bounds2i> {
    let p = Point2i::new(x as i32, y as i32);
    Some(match region {
        Some(b) => b.union_pixel(&p),
        None => Bounds2i::new(p, p).union_pixel(&p),
    })
}

/// Returns the union of two optional regions.
fn union(a: Option<Bounds2i>, b: Option<Bounds2i>) -> Option<Bounds2i> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.union(&b)),
        (a, None) => a,
        (None, b) => b,
    }
}

impl FrameBuffer {
    /// Create an empty frame buffer.
    ///
    /// * `resolution` - Image resolution; both extents must be positive.
    pub fn new(resolution: Point2i) -> Result<Self> {
        if resolution.x <= 0 || resolution.y <= 0 {
            return Err(Error::InvalidArgument(format!("Invalid resolution {resolution}")));
        }
        let n = resolution.x as usize * resolution.y as usize;
        Ok(Self {
            resolution,
            sums: vec![Spectrum::ZERO; n],
            counts: vec![0; n],
            splats: vec![Spectrum::ZERO; n],
            total: 0,
            sample_region: None,
            splat_region: None,
        })
    }

    /// Returns the image resolution.
    pub fn resolution(&self) -> Point2i {
        self.resolution
    }

    /// Returns the width of the image.
    pub fn width(&self) -> usize {
        self.resolution.x as usize
    }

    /// Returns the height of the image.
    pub fn height(&self) -> usize {
        self.resolution.y as usize
    }

    fn index(&self, x: usize, y: usize) -> usize {
        x * self.height() + y
    }

    /// Add a radiance sample to a pixel.
    ///
    /// * `x` - Raster column.
    /// * `y` - Raster row.
    /// * `l` - Radiance.
    pub fn add_sample(&mut self, x: usize, y: usize, l: Spectrum) {
        let i = self.index(x, y);
        self.sums[i] += l;
        self.counts[i] += 1;
        self.total += 1;
        self.sample_region = grow(self.sample_region, x, y);
    }

    /// Add a contribution at a continuous raster position; positions outside
    /// the image are ignored.
    ///
    /// * `p_raster` - Raster position.
    /// * `v`        - The contribution.
    pub fn add_splat(&mut self, p_raster: &Point2f, v: Spectrum) {
        if !(p_raster.x >= 0.0 && p_raster.y >= 0.0) {
            return;
        }
        let (x, y) = (p_raster.x as usize, p_raster.y as usize);
        if x < self.width() && y < self.height() {
            let i = self.index(x, y);
            self.splats[i] += v;
            self.splat_region = grow(self.splat_region, x, y);
        }
    }

    /// Returns the pixels holding samples, if any.
    pub fn sample_region(&self) -> Option<Bounds2i> {
        self.sample_region
    }

    /// Returns the pixels holding splats, if any.
    pub fn splat_region(&self) -> Option<Bounds2i> {
        self.splat_region
    }

    /// Add the contents of another frame buffer of the same resolution.
    ///
    /// * `other` - The other buffer.
    pub fn merge(&mut self, other: &FrameBuffer) {
        self.merge_samples(other);
        self.merge_splats(other);
    }

    /// Add the pixel samples of another frame buffer of the same resolution.
    /// Only the other buffer's sample region is visited.
    ///
    /// * `other` - The other buffer.
    pub fn merge_samples(&mut self, other: &FrameBuffer) {
        debug_assert_eq!(self.resolution, other.resolution);
        if let Some(region) = other.sample_region {
            for p in region {
                let i = self.index(p.x as usize, p.y as usize);
                self.sums[i] += other.sums[i];
                self.counts[i] += other.counts[i];
            }
            self.total += other.total;
            self.sample_region = union(self.sample_region, other.sample_region);
        }
    }

    /// Add the splats of another frame buffer of the same resolution. Only
    /// the other buffer's splat region is visited.
    ///
    /// * `other` - The other buffer.
    pub fn merge_splats(&mut self, other: &FrameBuffer) {
        debug_assert_eq!(self.resolution, other.resolution);
        if let Some(region) = other.splat_region {
            for p in region {
                let i = self.index(p.x as usize, p.y as usize);
                self.splats[i] += other.splats[i];
            }
            self.splat_region = union(self.splat_region, other.splat_region);
        }
    }

    /// Clear all accumulated values.
    pub fn reset(&mut self) {
        self.reset_samples();
        self.reset_splats();
    }

    /// Clear the pixel samples.
    pub fn reset_samples(&mut self) {
        if let Some(region) = self.sample_region.take() {
            for p in region {
                let i = self.index(p.x as usize, p.y as usize);
                self.sums[i] = Spectrum::ZERO;
                self.counts[i] = 0;
            }
        }
        self.total = 0;
    }

    /// Clear the splats.
    pub fn reset_splats(&mut self) {
        if let Some(region) = self.splat_region.take() {
            for p in region {
                let i = self.index(p.x as usize, p.y as usize);
                self.splats[i] = Spectrum::ZERO;
            }
        }
    }

    /// Returns the total number of completed samples.
    pub fn sample_count(&self) -> u64 {
        self.total
    }

    /// Returns the number of completed samples of a pixel.
    ///
    /// * `x` - Raster column.
    /// * `y` - Raster row.
    pub fn pixel_sample_count(&self, x: usize, y: usize) -> u64 {
        self.counts[self.index(x, y)]
    }

    fn splat_scale(&self) -> Float {
        if self.total == 0 {
            0.0
        } else {
            self.sums.len() as Float / self.total as Float
        }
    }

    fn value(&self, i: usize, splat_scale: Float) -> Spectrum {
        let mean = if self.counts[i] > 0 {
            self.sums[i] / self.counts[i] as Float
        } else {
            Spectrum::ZERO
        };
        mean + self.splats[i] * splat_scale
    }

    /// Returns the pixel value: the mean of its samples plus its splats
    /// scaled by pixel count over the total number of completed samples.
    ///
    /// * `x` - Raster column.
    /// * `y` - Raster row.
    pub fn get(&self, x: usize, y: usize) -> Spectrum {
        self.value(self.index(x, y), self.splat_scale())
    }

    /// Returns RGB pixel values in scanline order.
    pub fn to_rgb(&self) -> Vec<Float> {
        let scale = self.splat_scale();
        let mut rgb = Vec::with_capacity(3 * self.sums.len());
        for y in 0..self.height() {
            for x in 0..self.width() {
                rgb.extend_from_slice(&self.value(self.index(x, y), scale).to_rgb());
            }
        }
        rgb
    }

    /// Write the image.
    ///
    /// * `location` - Output location; its extension selects the format.
    pub fn save_result(&self, location: &LocationResolver) -> Result<()> {
        let rgb = self.to_rgb();
        match location.format() {
            OutputFormat::Exr => write_exr(location.path(), &rgb, self.width(), self.height()),
            OutputFormat::Pfm => write_pfm(location.path(), &rgb, self.width(), self.height()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn zero_resolution_is_rejected() {
        assert!(FrameBuffer::new(Point2i::new(0, 4)).is_err());
    }

    #[test]
    fn pixel_mean_and_splats() {
        let mut fb = FrameBuffer::new(Point2i::new(2, 1)).expect("frame buffer");
        fb.add_sample(0, 0, Spectrum::new(1.0));
        fb.add_sample(0, 0, Spectrum::new(3.0));
        fb.add_sample(1, 0, Spectrum::new(0.0));
        fb.add_sample(1, 0, Spectrum::new(0.0));
        fb.add_splat(&Point2f::new(1.5, 0.5), Spectrum::new(4.0));
        fb.add_splat(&Point2f::new(-1.0, 0.5), Spectrum::new(100.0));

        assert!(approx_eq!(Float, fb.get(0, 0)[0], 2.0, ulps = 2));
        // 4 * 2 pixels / 4 samples
        assert!(approx_eq!(Float, fb.get(1, 0)[1], 2.0, ulps = 2));
    }

    #[test]
    fn merge_and_reset() {
        let mut a = FrameBuffer::new(Point2i::new(1, 2)).expect("frame buffer");
        let mut b = a.clone();
        b.add_sample(0, 1, Spectrum::new(2.0));
        a.merge(&b);
        assert_eq!(a.pixel_sample_count(0, 1), 1);
        assert_eq!(a.get(0, 1), Spectrum::new(2.0));
        b.reset();
        assert_eq!(b.sample_count(), 0);
    }

    #[test]
    fn reset_clears_only_written_region() {
        let mut fb = FrameBuffer::new(Point2i::new(64, 64)).expect("frame buffer");
        fb.add_sample(3, 5, Spectrum::new(1.0));
        fb.add_sample(4, 6, Spectrum::new(1.0));
        fb.add_splat(&Point2f::new(10.5, 20.5), Spectrum::new(1.0));
        assert_eq!(fb.sample_region(), Some(Bounds2i::new(Point2i::new(3, 5), Point2i::new(5, 7))));
        assert_eq!(fb.splat_region().map(|b| b.area()), Some(1));

        fb.reset_samples();
        assert_eq!(fb.sample_region(), None);
        assert_eq!(fb.sample_count(), 0);
        assert_eq!(fb.pixel_sample_count(3, 5), 0);
        assert!(fb.splat_region().is_some());

        fb.reset_splats();
        assert_eq!(fb.splat_region(), None);
        assert!(fb.to_rgb().iter().all(|&c| c == 0.0));
    }

    #[test]
    fn region_merge_matches_full_accumulation() {
        let res = Point2i::new(8, 6);
        let mut direct = FrameBuffer::new(res).expect("frame buffer");
        let mut merged = FrameBuffer::new(res).expect("frame buffer");
        let mut local = FrameBuffer::new(res).expect("frame buffer");
        for block in 0..4 {
            for x in 2 * block..2 * block + 2 {
                for y in 0..res.y as usize {
                    let l = Spectrum::new((x * 7 + y) as Float);
                    direct.add_sample(x, y, l);
                    local.add_sample(x, y, l);
                }
            }
            let p = Point2f::new(block as Float + 0.5, 5.5);
            direct.add_splat(&p, Spectrum::new(3.0));
            local.add_splat(&p, Spectrum::new(3.0));
            merged.merge_samples(&local);
            local.reset_samples();
        }
        merged.merge_splats(&local);
        local.reset_splats();

        assert_eq!(merged.sample_count(), direct.sample_count());
        assert_eq!(merged.to_rgb(), direct.to_rgb());
        assert_eq!(local.sample_region(), None);
        assert_eq!(local.splat_region(), None);
    }

    #[test]
    fn rgb_is_scanline_ordered() {
        let mut fb = FrameBuffer::new(Point2i::new(2, 2)).expect("frame buffer");
        fb.add_sample(1, 0, Spectrum::from_rgb(1.0, 2.0, 3.0));
        let rgb = fb.to_rgb();
        assert_eq!(&rgb[3..6], &[1.0, 2.0, 3.0]);
    }
}
