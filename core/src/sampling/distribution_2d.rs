//! 2D Distribution.

use super::Distribution1D;
use crate::base::*;
use crate::error::*;
use crate::geometry::*;

/// Represents a piecewise-constant 2D function's PDF and CDF and provides
/// methods to perform this sampling efficiently.
#[derive(Clone, Debug)]
pub struct Distribution2D {
    /// 1D conditional sampling density `p[u|v]` for each row `v`.
    p_conditional_v: Vec<Distribution1D>,

    /// Marginal sampling density `p[v]`.
    p_marginal: Distribution1D,
}

impl Distribution2D {
    /// Returns a new `Distribution2D` for a row-major function.
    ///
    /// * `func` - Function values; `nu * nv` entries.
    /// * `nu`   - Number of columns.
    /// * `nv`   - Number of rows.
    pub fn new(func: &[Float], nu: usize, nv: usize) -> Result<Self> {
        if nu == 0 || nv == 0 || func.len() != nu * nv {
            return Err(Error::InvalidArgument(format!(
                "2D distribution of {nu}x{nv} with {} values",
                func.len()
            )));
        }
        let p_conditional_v = func
            .chunks(nu)
            .map(|row| Distribution1D::try_new(row.to_vec()))
            .collect::<Result<Vec<_>>>()?;
        let marginal_func: Vec<Float> = p_conditional_v.iter().map(|pcv| pcv.func_int).collect();
        let p_marginal = Distribution1D::try_new(marginal_func)?;
        Ok(Self {
            p_conditional_v,
            p_marginal,
        })
    }

    /// Return a sample point in [0, 1)^2 and its PDF.
    ///
    /// * `u` - The random sample.
    pub fn sample_continuous(&self, u: &Point2f) -> (Point2f, Float) {
        let (d1, pdf1, v) = self.p_marginal.sample_continuous(u[1]);
        let (d0, pdf0, _) = self.p_conditional_v[v].sample_continuous(u[0]);
        (Point2f::new(d0, d1), pdf0 * pdf1)
    }

    /// Return the PDF value for a given point.
    ///
    /// * `p` - Point in [0, 1)^2.
    pub fn pdf(&self, p: &Point2f) -> Float {
        let nu = self.p_conditional_v[0].count();
        let nv = self.p_marginal.count();
        let iu = clamp((p[0] * nu as Float) as isize, 0, nu as isize - 1) as usize;
        let iv = clamp((p[1] * nv as Float) as isize, 0, nv as isize - 1) as usize;
        if self.p_marginal.func_int == 0.0 {
            1.0
        } else {
            self.p_conditional_v[iv].func[iu] / self.p_marginal.func_int
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn size_mismatch_is_rejected() {
        assert!(Distribution2D::new(&[1.0, 2.0, 3.0], 2, 2).is_err());
    }

    proptest! {
        #[test]
        fn sample_pdf_matches_pdf_query(u0 in 0.0..1.0f32, u1 in 0.0..1.0f32) {
            let d = Distribution2D::new(&[1.0, 2.0, 0.5, 0.0, 4.0, 1.0], 3, 2).unwrap();
            let (p, pdf) = d.sample_continuous(&Point2f::new(u0, u1));
            prop_assert!(pdf > 0.0);
            prop_assert!(approx_eq!(Float, pdf, d.pdf(&p), epsilon = 1e-3));
        }
    }
}
