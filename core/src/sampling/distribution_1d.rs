//! 1D Distribution.

use crate::base::*;
use crate::error::*;

/// Represents a piecewise-constant 1D function's PDF and CDF and provides
/// methods to perform this sampling efficiently.
#[derive(Clone, Debug)]
pub struct Distribution1D {
    /// Piecewise-constant function.
    pub func: Vec<Float>,

    /// CDF for `func`; `count() + 1` entries.
    pub cdf: Vec<Float>,

    /// Integral of `func`.
    pub func_int: Float,
}

impl Distribution1D {
    /// Returns a new `Distribution1D`; fails for empty or invalid weights.
    ///
    /// * `f` - Non-negative piecewise-constant function values.
    pub fn try_new(f: Vec<Float>) -> Result<Self> {
        if f.is_empty() {
            return Err(Error::InvalidArgument("empty distribution".to_string()));
        }
        if let Some(w) = f.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(Error::InvalidArgument(format!("invalid distribution weight {w}")));
        }
        Ok(Self::build(f))
    }

    /// Returns a new `Distribution1D`. Invalid weights are treated as zero and
    /// an empty function becomes a single zero bucket.
    ///
    /// * `f` - Piecewise-constant function values.
    pub fn new(f: Vec<Float>) -> Self {
        let mut f: Vec<Float> = f
            .into_iter()
            .map(|w| if w.is_finite() && w > 0.0 { w } else { 0.0 })
            .collect();
        if f.is_empty() {
            f.push(0.0);
        }
        Self::build(f)
    }

    fn build(f: Vec<Float>) -> Self {
        let n = f.len();

        // Compute integral of step function at `x_i`.
        let mut cdf: Vec<Float> = Vec::with_capacity(n + 1);
        cdf.push(0.0);
        for i in 1..n + 1 {
            cdf.push(cdf[i - 1] + f[i - 1] / n as Float);
        }

        // Transform step function integral into CDF; all-zero becomes uniform.
        let func_int = cdf[n];
        if func_int == 0.0 {
            for (i, v) in cdf.iter_mut().enumerate().skip(1) {
                *v = i as Float / n as Float;
            }
        } else {
            for v in cdf.iter_mut().skip(1) {
                *v /= func_int;
            }
        }
        cdf[n] = 1.0;

        Self { func: f, cdf, func_int }
    }

    /// Returns the number of buckets.
    pub fn count(&self) -> usize {
        self.func.len()
    }

    /// Returns the CDF value at the start of bucket `i`; `cdf(count())` is 1.
    ///
    /// * `i` - Bucket index.
    pub fn cdf(&self, i: usize) -> Float {
        self.cdf[i]
    }

    fn find(&self, u: Float) -> usize {
        find_interval(self.cdf.len(), |index| self.cdf[index] <= u)
    }

    /// Return a sample in [0, 1), its PDF and the bucket offset.
    ///
    /// * `u` - The random sample.
    pub fn sample_continuous(&self, u: Float) -> (Float, Float, usize) {
        let offset = self.find(u);

        // Compute offset along CDF segment.
        let mut du = u - self.cdf[offset];
        let width = self.cdf[offset + 1] - self.cdf[offset];
        if width > 0.0 {
            du /= width;
        }

        let pdf = if self.func_int > 0.0 {
            self.func[offset] / self.func_int
        } else {
            1.0
        };

        ((offset as Float + du) / self.count() as Float, pdf, offset)
    }

    /// Return a bucket index, its probability and the sample remapped to
    /// [0, 1) within the chosen bucket.
    ///
    /// * `u` - The random sample.
    pub fn sample_discrete(&self, u: Float) -> (usize, Float, Float) {
        let offset = self.find(u);
        let pmf = self.discrete_pdf(offset);
        let width = self.cdf[offset + 1] - self.cdf[offset];
        let u_remapped = if width > 0.0 {
            clamp((u - self.cdf[offset]) / width, 0.0, crate::rng::ONE_MINUS_EPSILON)
        } else {
            0.0
        };
        (offset, pmf, u_remapped)
    }

    /// Return the probability of sampling the given bucket.
    ///
    /// * `index` - Bucket index.
    pub fn discrete_pdf(&self, index: usize) -> Float {
        if index >= self.count() {
            0.0
        } else if self.func_int > 0.0 {
            self.func[index] / (self.func_int * self.count() as Float)
        } else {
            1.0 / self.count() as Float
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn empty_is_rejected() {
        assert!(matches!(Distribution1D::try_new(vec![]), Err(Error::InvalidArgument(_))));
        assert!(Distribution1D::try_new(vec![1.0, -1.0]).is_err());
    }

    #[test]
    fn pmf_matches_weights() {
        let w = vec![1.0, 0.0, 3.0, 4.0];
        let d = Distribution1D::try_new(w.clone()).unwrap();
        let total: Float = w.iter().sum();
        for (i, wi) in w.iter().enumerate() {
            assert!(approx_eq!(Float, d.discrete_pdf(i), wi / total, epsilon = 1e-6));
        }
    }

    #[test]
    fn sample_before_cdf_boundary_selects_bucket() {
        let d = Distribution1D::new(vec![2.0, 0.0, 1.0, 5.0]);
        for i in [0, 2, 3] {
            let (idx, pmf, remapped) = d.sample_discrete(d.cdf(i + 1) - 1e-4);
            assert_eq!(idx, i);
            assert!(pmf > 0.0);
            assert!((0.0..1.0).contains(&remapped));
        }
    }

    #[test]
    fn all_zero_is_uniform() {
        let d = Distribution1D::new(vec![0.0; 4]);
        let (idx, pmf, _) = d.sample_discrete(0.6);
        assert_eq!(idx, 2);
        assert!(approx_eq!(Float, pmf, 0.25));
        let (x, pdf, _) = d.sample_continuous(0.3);
        assert!(approx_eq!(Float, x, 0.3, epsilon = 1e-6));
        assert!(approx_eq!(Float, pdf, 1.0));
    }

    #[test]
    fn remapped_sample_is_uniform_within_bucket() {
        let d = Distribution1D::new(vec![2.0, 0.0, 1.0, 5.0]);
        let n = 8000;
        let bins = 10;
        let mut hist = vec![vec![0usize; bins]; d.count()];
        for i in 0..n {
            let u = (i as Float + 0.5) / n as Float;
            let (idx, _, remapped) = d.sample_discrete(u);
            hist[idx][min((remapped * bins as Float) as usize, bins - 1)] += 1;
        }
        for (idx, h) in hist.iter().enumerate() {
            let total: usize = h.iter().sum();
            assert!(approx_eq!(Float, total as Float / n as Float, d.discrete_pdf(idx), epsilon = 1e-3));
            if total == 0 {
                continue;
            }
            for count in h {
                let fraction = *count as Float / total as Float;
                assert!(approx_eq!(Float, fraction, 1.0 / bins as Float, epsilon = 0.01), "bucket {idx}: {fraction}");
            }
        }
    }

    proptest! {
        #[test]
        fn sampled_buckets_have_positive_pmf(u in 0.0..1.0f32) {
            let d = Distribution1D::new(vec![0.0, 1.0, 0.0, 2.0, 0.0]);
            let (idx, pmf, remapped) = d.sample_discrete(u);
            prop_assert!(idx == 1 || idx == 3);
            prop_assert!(approx_eq!(Float, pmf, d.func[idx] / 3.0, epsilon = 1e-6));
            prop_assert!((0.0..1.0).contains(&remapped));
        }

        #[test]
        fn continuous_pdf_matches_function(u in 0.0..1.0f32) {
            let d = Distribution1D::new(vec![1.0, 3.0]);
            let (x, pdf, offset) = d.sample_continuous(u);
            prop_assert!((0.0..=1.0).contains(&x));
            prop_assert!(approx_eq!(Float, pdf, d.func[offset] / d.func_int, epsilon = 1e-6));
        }
    }
}
