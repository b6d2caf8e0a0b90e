use super::Matrix;
use std::fmt;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Lower-triangular Cholesky factor `L` of a symmetric positive-definite
/// matrix `K`, such that `L Lᵗ = K`.
///
/// # Example
///
/// ```
/// use kernelgen::linalg::{Cholesky, Matrix};
///
/// let k = Matrix::from_rows(&[[4.0, 2.0], [2.0, 3.0]]).unwrap();
/// let chol = Cholesky::new(&k).unwrap();
///
/// // K x = b
/// let x = chol.solve(&[2.0, 1.0]).unwrap();
/// assert!((x[0] - 0.5).abs() < 1E-12);
/// assert!(x[1].abs() < 1E-12);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Cholesky {
    l: Matrix,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum CholeskyError {
    /// Only square matrices can be factored
    NotSquare { rows: usize, columns: usize },
    /// A non-positive (or NaN) radicand appeared on the diagonal
    NotPositiveDefinite { row: usize, column: usize, value: f64 },
    /// The right-hand side does not match the factor's size
    DimensionMismatch { expected: usize, found: usize },
}

impl Cholesky {
    /// Factor `k` with the Cholesky–Banachiewicz scheme.
    ///
    /// Only the lower triangle of `k` is read. No jitter is added here; the
    /// caller regularizes the diagonal beforehand if needed.
    pub fn new(k: &Matrix) -> Result<Self, CholeskyError> {
        if !k.is_square() {
            return Err(CholeskyError::NotSquare {
                rows: k.nrows(),
                columns: k.ncols(),
            });
        }

        let n = k.nrows();
        tracing::trace!(n, "cholesky factorization");
        let mut l = Matrix::zeros(n, n);

        for i in 0..n {
            for j in 0..=i {
                let sum: f64 = (0..j).map(|p| l[(i, p)] * l[(j, p)]).sum();
                if i == j {
                    let radicand = k[(j, j)] - sum;
                    // also catches NaN
                    if !(radicand > 0.0) {
                        return Err(CholeskyError::NotPositiveDefinite {
                            row: i,
                            column: j,
                            value: radicand,
                        });
                    }
                    l[(i, j)] = radicand.sqrt();
                } else {
                    l[(i, j)] = (k[(i, j)] - sum) / l[(j, j)];
                }
            }
        }

        Ok(Self { l })
    }

    /// The lower-triangular factor
    pub fn l(&self) -> &Matrix {
        &self.l
    }

    /// Consume and return the lower-triangular factor
    pub fn into_l(self) -> Matrix {
        self.l
    }

    /// Size of the factored matrix
    pub fn dim(&self) -> usize {
        self.l.nrows()
    }

    /// Solve `L z = b` for `z`
    pub fn forward_substitution(
        &self,
        b: &[f64],
    ) -> Result<Vec<f64>, CholeskyError> {
        forward_substitution(&self.l, b)
    }

    /// Solve `Lᵗ x = z` for `x`
    pub fn back_substitution(
        &self,
        z: &[f64],
    ) -> Result<Vec<f64>, CholeskyError> {
        back_substitution(&self.l, z)
    }

    /// Solve `L Lᵗ x = b` for `x`
    pub fn solve(&self, b: &[f64]) -> Result<Vec<f64>, CholeskyError> {
        let z = self.forward_substitution(b)?;
        self.back_substitution(&z)
    }

    /// Σ ln(L[i, i]), which is half the log determinant of `K`
    pub fn sum_ln_diag(&self) -> f64 {
        self.l.diagonal().iter().map(|x| x.ln()).sum()
    }

    /// `L z` for a vector of independent draws `z`, i.e. a zero-mean
    /// correlated draw with covariance `K`
    pub fn correlate(&self, z: &[f64]) -> Result<Vec<f64>, CholeskyError> {
        self.l
            .mul_vec(z)
            .map_err(|_| CholeskyError::DimensionMismatch {
                expected: self.dim(),
                found: z.len(),
            })
    }
}

/// Solve `L z = b` for lower-triangular `L`
pub fn forward_substitution(
    l: &Matrix,
    b: &[f64],
) -> Result<Vec<f64>, CholeskyError> {
    let n = l.nrows();
    if b.len() != n {
        return Err(CholeskyError::DimensionMismatch {
            expected: n,
            found: b.len(),
        });
    }
    let mut z = vec![0.0; n];
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[(i, j)] * z[j]).sum();
        z[i] = (b[i] - sum) / l[(i, i)];
    }
    Ok(z)
}

/// Solve `Lᵗ x = z` for lower-triangular `L`
pub fn back_substitution(
    l: &Matrix,
    z: &[f64],
) -> Result<Vec<f64>, CholeskyError> {
    let n = l.nrows();
    if z.len() != n {
        return Err(CholeskyError::DimensionMismatch {
            expected: n,
            found: z.len(),
        });
    }
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum: f64 = (i + 1..n).map(|j| l[(j, i)] * x[j]).sum();
        x[i] = (z[i] - sum) / l[(i, i)];
    }
    Ok(x)
}

impl std::error::Error for CholeskyError {}

impl fmt::Display for CholeskyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSquare { rows, columns } => {
                write!(f, "cannot factor a non-square {rows}x{columns} matrix")
            }
            Self::NotPositiveDefinite { row, column, value } => write!(
                f,
                "matrix is not positive definite: radicand {value} at ({row}, {column})"
            ),
            Self::DimensionMismatch { expected, found } => write!(
                f,
                "expected a vector of length {expected}, found {found}"
            ),
        }
    }
}
