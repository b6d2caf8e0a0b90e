//! Covariance kernels
use std::collections::BTreeMap;
use std::f64;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::linalg::{Matrix, MatrixError};

mod misc;
pub use self::misc::*;

mod constant_kernel;
pub use self::constant_kernel::*;

mod ops;
pub use self::ops::*;

mod rbf;
pub use self::rbf::*;
mod white_kernel;
pub use self::white_kernel::*;
mod rational_quadratic;
pub use self::rational_quadratic::*;
mod exp_sin_squared;
pub use self::exp_sin_squared::*;

/// Named hyper-parameters of a kernel, e.g. `length_scale` or `variance`
pub type KernelParameters = BTreeMap<String, f64>;

/// Kernel Function
///
/// Implementors supply [`Kernel::compute`] for a single pair of points; the
/// pairwise covariance builders are shared.
pub trait Kernel: std::fmt::Debug + Clone + PartialEq {
    /// Covariance between two points
    fn compute(&self, x1: &[f64], x2: &[f64]) -> f64;

    /// Reports if the given kernel function is stationary.
    fn is_stationary(&self) -> bool;

    /// Return the hyper-parameters by name
    fn parameters(&self) -> KernelParameters;

    /// Set a single hyper-parameter by name
    fn set_parameter(&mut self, name: &str, value: f64)
        -> Result<(), KernelError>;

    /// Look up a single hyper-parameter by name
    fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters().get(name).copied()
    }

    /// Set every hyper-parameter in `params`. Stops at the first failure.
    fn set_parameters(
        &mut self,
        params: &KernelParameters,
    ) -> Result<(), KernelError> {
        params
            .iter()
            .try_for_each(|(name, &value)| self.set_parameter(name, value))
    }

    /// Pairwise covariance: cell `(i, j)` is `compute(x1[i], x2[j])`
    fn covariance(
        &self,
        x1: &Matrix,
        x2: &Matrix,
    ) -> Result<Matrix, KernelError> {
        if x1.ncols() != x2.ncols() {
            return Err(KernelError::Matrix(MatrixError::DimensionMismatch {
                left: x1.shape(),
                right: x2.shape(),
            }));
        }

        let mut cov = Matrix::zeros(x1.nrows(), x2.nrows());
        for (i, a) in x1.rows().enumerate() {
            for (j, b) in x2.rows().enumerate() {
                cov[(i, j)] = self.compute(a, b);
            }
        }
        Ok(cov)
    }

    /// Covariance of a point set with itself. The result is exactly
    /// symmetric: only the lower triangle is evaluated.
    fn covariance_sym(&self, x: &Matrix) -> Matrix {
        let n = x.nrows();
        let rows: Vec<&[f64]> = x.rows().collect();
        let mut cov = Matrix::zeros(n, n);
        for i in 0..n {
            for j in 0..=i {
                let k = self.compute(rows[i], rows[j]);
                cov[(i, j)] = k;
                cov[(j, i)] = k;
            }
        }
        cov
    }

    /// Returns the diagonal of the kernel(x, x)
    fn diag(&self, x: &Matrix) -> Vec<f64> {
        x.rows().map(|r| self.compute(r, r)).collect()
    }

    fn add<B: Kernel>(self, other: B) -> AddKernel<Self, B> {
        AddKernel::new(self, other)
    }

    fn mul<B: Kernel>(self, other: B) -> ProductKernel<Self, B> {
        ProductKernel::new(self, other)
    }
}

/// Errors from Kernel construction and evaluation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum KernelError {
    /// Parameter Out of Bounds
    ParameterOutOfBounds {
        /// Name of parameter
        name: String,
        /// Value given
        given: f64,
        /// Lower and upper bounds on value
        bounds: (f64, f64),
    },
    /// The kernel has no parameter with this name
    UnknownParameter(String),
    /// The point sets have different dimensions
    Matrix(MatrixError),
}

impl KernelError {
    pub(crate) fn positive(name: &str, given: f64) -> Self {
        Self::ParameterOutOfBounds {
            name: name.to_string(),
            given,
            bounds: (0.0, f64::INFINITY),
        }
    }
}

/// Fails unless `value` is finite and strictly positive
pub(crate) fn check_positive(name: &str, value: f64) -> Result<f64, KernelError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(KernelError::positive(name, value))
    }
}

impl std::error::Error for KernelError {}

impl std::fmt::Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParameterOutOfBounds {
                name,
                given,
                bounds,
            } => write!(
                f,
                "Parameter {} is out of bounds ({}, {}), given: {}",
                name, bounds.0, bounds.1, given
            ),
            Self::UnknownParameter(name) => {
                write!(f, "Unknown kernel parameter: {}", name)
            }
            Self::Matrix(e) => {
                write!(f, "Covariance couldn't be computed: {}", e)
            }
        }
    }
}

impl From<MatrixError> for KernelError {
    fn from(e: MatrixError) -> Self {
        Self::Matrix(e)
    }
}

macro_rules! impl_mul_add {
    ($type: ty) => {
        impl<B> std::ops::Mul<B> for $type
        where
            B: Kernel,
        {
            type Output = ProductKernel<$type, B>;

            fn mul(self, rhs: B) -> Self::Output {
                ProductKernel::new(self, rhs)
            }
        }

        impl<B> std::ops::Add<B> for $type
        where
            B: Kernel,
        {
            type Output = AddKernel<$type, B>;

            fn add(self, rhs: B) -> Self::Output {
                AddKernel::new(self, rhs)
            }
        }
    };
}

impl_mul_add!(ConstantKernel);
impl_mul_add!(RBFKernel);
impl_mul_add!(ExpSineSquaredKernel);
impl_mul_add!(RationalQuadratic);
impl_mul_add!(WhiteKernel);
