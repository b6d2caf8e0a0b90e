//! Dense row-major matrices and the Cholesky machinery built on them
use std::fmt;
use std::ops::{Index, IndexMut};

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

mod cholesky;
pub use cholesky::*;

/// A dense, row-major matrix of `f64`.
///
/// The shape is fixed at construction; the contents are mutable. Every row
/// has exactly `ncols` elements.
///
/// # Example
///
/// ```
/// use kernelgen::linalg::Matrix;
///
/// let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
/// let t = m.transpose();
///
/// assert_eq!(t.get(0, 1), Ok(3.0));
/// assert_eq!(m.get(0, 1), Ok(2.0));
/// assert!(m.get(2, 0).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct Matrix {
    nrows: usize,
    ncols: usize,
    data: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum MatrixError {
    /// A row or column index lies outside the matrix
    IndexOutOfBounds {
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
    },
    /// A row of the input has a different length than the first row
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// Two operands have incompatible shapes
    DimensionMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
    /// A flat buffer does not hold `rows * columns` elements
    DataLength { expected: usize, found: usize },
}

impl Matrix {
    /// Create an `nrows` x `ncols` matrix filled with zeros
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            data: vec![0.0; nrows * ncols],
        }
    }

    /// The `n` x `n` identity
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    /// Copy a nested row structure into a matrix.
    ///
    /// Fails with [`MatrixError::RaggedRows`] if the rows differ in length.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, MatrixError> {
        let ncols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * ncols);
        for (ix, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != ncols {
                return Err(MatrixError::RaggedRows {
                    row: ix,
                    expected: ncols,
                    found: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            nrows: rows.len(),
            ncols,
            data,
        })
    }

    /// Build a matrix from a flat buffer laid out row by row
    pub fn from_row_slice(
        nrows: usize,
        ncols: usize,
        data: &[f64],
    ) -> Result<Self, MatrixError> {
        if data.len() != nrows * ncols {
            Err(MatrixError::DataLength {
                expected: nrows * ncols,
                found: data.len(),
            })
        } else {
            Ok(Self {
                nrows,
                ncols,
                data: data.to_vec(),
            })
        }
    }

    /// Promote a 1-D set of points to an `n` x 1 matrix
    pub fn from_column(xs: &[f64]) -> Self {
        Self {
            nrows: xs.len(),
            ncols: 1,
            data: xs.to_vec(),
        }
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// `(rows, columns)`
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    fn check_bounds(&self, row: usize, column: usize) -> Result<(), MatrixError> {
        if row < self.nrows && column < self.ncols {
            Ok(())
        } else {
            Err(MatrixError::IndexOutOfBounds {
                row,
                column,
                rows: self.nrows,
                columns: self.ncols,
            })
        }
    }

    /// Bounds-checked element read
    pub fn get(&self, row: usize, column: usize) -> Result<f64, MatrixError> {
        self.check_bounds(row, column)?;
        Ok(self.data[row * self.ncols + column])
    }

    /// Bounds-checked element write
    pub fn set(
        &mut self,
        row: usize,
        column: usize,
        value: f64,
    ) -> Result<(), MatrixError> {
        self.check_bounds(row, column)?;
        self.data[row * self.ncols + column] = value;
        Ok(())
    }

    /// Borrow row `row`
    pub fn row(&self, row: usize) -> Result<&[f64], MatrixError> {
        if row >= self.nrows {
            return Err(MatrixError::IndexOutOfBounds {
                row,
                column: 0,
                rows: self.nrows,
                columns: self.ncols,
            });
        }
        let start = row * self.ncols;
        Ok(&self.data[start..start + self.ncols])
    }

    /// Copy out column `column`
    pub fn column(&self, column: usize) -> Result<Vec<f64>, MatrixError> {
        if column >= self.ncols {
            return Err(MatrixError::IndexOutOfBounds {
                row: 0,
                column,
                rows: self.nrows,
                columns: self.ncols,
            });
        }
        Ok((0..self.nrows).map(|i| self[(i, column)]).collect())
    }

    /// Iterate over the rows
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.nrows).map(move |i| {
            let start = i * self.ncols;
            &self.data[start..start + self.ncols]
        })
    }

    /// The main diagonal
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.nrows.min(self.ncols))
            .map(|i| self[(i, i)])
            .collect()
    }

    /// A new matrix with rows and columns swapped. The receiver is untouched.
    pub fn transpose(&self) -> Self {
        let mut t = Self::zeros(self.ncols, self.nrows);
        for i in 0..self.nrows {
            for j in 0..self.ncols {
                t[(j, i)] = self[(i, j)];
            }
        }
        t
    }

    /// Add `value` to every diagonal entry in place
    pub fn add_to_diagonal(&mut self, value: f64) {
        for i in 0..self.nrows.min(self.ncols) {
            self[(i, i)] += value;
        }
    }

    /// Matrix product `self * rhs`
    pub fn matmul(&self, rhs: &Matrix) -> Result<Matrix, MatrixError> {
        if self.ncols != rhs.nrows {
            return Err(MatrixError::DimensionMismatch {
                left: self.shape(),
                right: rhs.shape(),
            });
        }
        let mut out = Matrix::zeros(self.nrows, rhs.ncols);
        for i in 0..self.nrows {
            for k in 0..self.ncols {
                let a = self[(i, k)];
                if a == 0.0 {
                    continue;
                }
                for j in 0..rhs.ncols {
                    out[(i, j)] += a * rhs[(k, j)];
                }
            }
        }
        Ok(out)
    }

    /// Matrix-vector product `self * v`
    pub fn mul_vec(&self, v: &[f64]) -> Result<Vec<f64>, MatrixError> {
        if self.ncols != v.len() {
            return Err(MatrixError::DimensionMismatch {
                left: self.shape(),
                right: (v.len(), 1),
            });
        }
        Ok(self
            .rows()
            .map(|row| row.iter().zip(v).map(|(a, b)| a * b).sum())
            .collect())
    }

    /// The row-major backing buffer
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    /// # Panics
    /// Panics if the index is out of bounds. Use [`Matrix::get`] for a
    /// checked read.
    fn index(&self, (row, column): (usize, usize)) -> &f64 {
        assert!(
            row < self.nrows && column < self.ncols,
            "index ({row}, {column}) out of bounds for {}x{} matrix",
            self.nrows,
            self.ncols
        );
        &self.data[row * self.ncols + column]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, column): (usize, usize)) -> &mut f64 {
        assert!(
            row < self.nrows && column < self.ncols,
            "index ({row}, {column}) out of bounds for {}x{} matrix",
            self.nrows,
            self.ncols
        );
        &mut self.data[row * self.ncols + column]
    }
}

impl From<Vec<f64>> for Matrix {
    fn from(xs: Vec<f64>) -> Self {
        Self {
            nrows: xs.len(),
            ncols: 1,
            data: xs,
        }
    }
}

impl From<&[f64]> for Matrix {
    fn from(xs: &[f64]) -> Self {
        Self::from_column(xs)
    }
}

impl From<&Matrix> for Matrix {
    fn from(m: &Matrix) -> Self {
        m.clone()
    }
}

#[cfg(feature = "nalgebra")]
impl From<nalgebra::DMatrix<f64>> for Matrix {
    fn from(m: nalgebra::DMatrix<f64>) -> Self {
        let (nrows, ncols) = m.shape();
        let data = (0..nrows)
            .flat_map(|i| (0..ncols).map(move |j| (i, j)))
            .map(|ix| m[ix])
            .collect();
        Self { nrows, ncols, data }
    }
}

#[cfg(feature = "nalgebra")]
impl From<Matrix> for nalgebra::DMatrix<f64> {
    fn from(m: Matrix) -> Self {
        nalgebra::DMatrix::from_row_slice(m.nrows, m.ncols, &m.data)
    }
}

impl std::error::Error for MatrixError {}

impl fmt::Display for MatrixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfBounds {
                row,
                column,
                rows,
                columns,
            } => write!(
                f,
                "index ({row}, {column}) out of bounds for {rows}x{columns} matrix"
            ),
            Self::RaggedRows {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {row} has {found} elements, expected {expected}"
            ),
            Self::DimensionMismatch { left, right } => write!(
                f,
                "incompatible shapes {}x{} and {}x{}",
                left.0, left.1, right.0, right.1
            ),
            Self::DataLength { expected, found } => write!(
                f,
                "expected {expected} elements for the given shape, found {found}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_basic_impls;

    test_basic_impls!(Matrix::identity(3));

    #[test]
    fn zeros_has_requested_shape() {
        let m = Matrix::zeros(3, 2);
        assert_eq!(m.shape(), (3, 2));
        assert!(m.as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert_eq!(
            Matrix::from_rows(&rows),
            Err(MatrixError::RaggedRows {
                row: 1,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn from_rows_of_nothing_is_empty() {
        let rows: Vec<Vec<f64>> = vec![];
        let m = Matrix::from_rows(&rows).unwrap();
        assert_eq!(m.shape(), (0, 0));
    }

    #[test]
    fn get_and_set_are_bounds_checked() {
        let mut m = Matrix::zeros(2, 3);
        assert!(m.set(1, 2, 4.5).is_ok());
        assert_eq!(m.get(1, 2), Ok(4.5));

        assert_eq!(
            m.get(2, 0),
            Err(MatrixError::IndexOutOfBounds {
                row: 2,
                column: 0,
                rows: 2,
                columns: 3
            })
        );
        assert!(m.set(0, 3, 1.0).is_err());
    }

    #[test]
    #[should_panic]
    fn index_out_of_bounds_panics() {
        let m = Matrix::zeros(2, 2);
        let _x = m[(0, 2)];
    }

    #[test]
    fn row_and_column_extraction() {
        let m = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.row(1).unwrap(), &[4.0, 5.0, 6.0]);
        assert_eq!(m.column(2).unwrap(), vec![3.0, 6.0]);
        assert!(m.row(2).is_err());
        assert!(m.column(3).is_err());
    }

    #[test]
    fn transpose_does_not_mutate_receiver() {
        let m = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
        let t = m.transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.row(0).unwrap(), &[1.0, 4.0]);
        assert_eq!(m.row(0).unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(t.transpose(), m);
    }

    #[test]
    fn clone_owns_its_storage() {
        let m = Matrix::identity(2);
        let mut c = m.clone();
        c.set(0, 1, 7.0).unwrap();
        assert_eq!(m.get(0, 1), Ok(0.0));
        assert_eq!(c.get(0, 1), Ok(7.0));
    }

    #[test]
    fn matmul_and_mul_vec() {
        let a = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let b = Matrix::from_rows(&[[0.0, 1.0], [1.0, 0.0]]).unwrap();
        let ab = a.matmul(&b).unwrap();
        assert_eq!(ab.as_slice(), &[2.0, 1.0, 4.0, 3.0]);

        assert_eq!(a.mul_vec(&[1.0, 1.0]).unwrap(), vec![3.0, 7.0]);
        assert!(a.mul_vec(&[1.0]).is_err());
        assert!(a.matmul(&Matrix::zeros(3, 1)).is_err());
    }

    #[test]
    fn column_promotion() {
        let m: Matrix = vec![0.0, 1.0, 2.0].into();
        assert_eq!(m.shape(), (3, 1));
        assert_eq!(m.column(0).unwrap(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn add_to_diagonal_only_touches_diagonal() {
        let mut m = Matrix::zeros(2, 2);
        m.add_to_diagonal(0.5);
        assert_eq!(m.as_slice(), &[0.5, 0.0, 0.0, 0.5]);
        assert_eq!(m.diagonal(), vec![0.5, 0.5]);
    }
}
