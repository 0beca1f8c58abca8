//! 4x4 Matrix

use crate::base::*;
use std::ops::Mul;

/// A 4x4 row-major matrix containing `Float` values.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Matrix4x4 {
    /// Stores a 2-D array of Float
    pub m: [[Float; 4]; 4],
}

/// Identity matrix.
pub const IDENTITY_MATRIX: Matrix4x4 = Matrix4x4 {
    m: [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ],
};

impl Default for Matrix4x4 {
    /// Returns the identity matrix.
    fn default() -> Self {
        IDENTITY_MATRIX
    }
}

impl Matrix4x4 {
    /// Create a matrix from rows.
    ///
    /// * `m` - The rows.
    pub fn new(m: [[Float; 4]; 4]) -> Self {
        Self { m }
    }

    /// Returns the transposed matrix.
    pub fn transpose(&self) -> Self {
        let mut t = [[0.0; 4]; 4];
        for (i, row) in t.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = self.m[j][i];
            }
        }
        Self { m: t }
    }

    /// Returns the inverse using Gauss-Jordan elimination with full pivoting,
    /// or `None` if the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        let mut indxc = [0; 4];
        let mut indxr = [0; 4];
        let mut ipiv = [0; 4];
        let mut minv = self.m;

        for i in 0..4 {
            let mut irow = 0;
            let mut icol = 0;
            let mut big: Float = 0.0;

            // Choose pivot.
            for j in 0..4 {
                if ipiv[j] != 1 {
                    for k in 0..4 {
                        if ipiv[k] == 0 {
                            let abs_minv = abs(minv[j][k]);
                            if abs_minv >= big {
                                big = abs_minv;
                                irow = j;
                                icol = k;
                            }
                        } else if ipiv[k] > 1 {
                            return None;
                        }
                    }
                }
            }

            ipiv[icol] += 1;

            // Swap rows `irow` and `icol` for pivot.
            if irow != icol {
                minv.swap(irow, icol);
            }

            indxr[i] = irow;
            indxc[i] = icol;
            if minv[icol][icol] == 0.0 {
                return None;
            }

            // Set `m[icol][icol]` to one by scaling row `icol` appropriately.
            let pivinv = 1.0 / minv[icol][icol];
            minv[icol][icol] = 1.0;
            for j in 0..4 {
                minv[icol][j] *= pivinv;
            }

            // Subtract this row from others to zero out their columns.
            for j in 0..4 {
                if j != icol {
                    let save = minv[j][icol];
                    minv[j][icol] = 0.0;
                    for k in 0..4 {
                        minv[j][k] -= minv[icol][k] * save;
                    }
                }
            }
        }

        // Swap columns to reflect permutation.
        for j in (0..4).rev() {
            if indxr[j] != indxc[j] {
                for row in minv.iter_mut() {
                    row.swap(indxr[j], indxc[j]);
                }
            }
        }

        if minv.iter().flatten().any(|v| !v.is_finite()) {
            None
        } else {
            Some(Self { m: minv })
        }
    }
}

impl Mul for Matrix4x4 {
    type Output = Matrix4x4;

    /// Multiply two matrices.
    ///
    /// * `other` - The right hand side.
    fn mul(self, other: Self) -> Self::Output {
        let mut r = [[0.0; 4]; 4];
        for (i, row) in r.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = self.m[i][0] * other.m[0][j]
                    + self.m[i][1] * other.m[1][j]
                    + self.m[i][2] * other.m[2][j]
                    + self.m[i][3] * other.m[3][j];
            }
        }
        Matrix4x4 { m: r }
    }
}
