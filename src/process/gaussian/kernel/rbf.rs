use super::{check_positive, e2_norm, Kernel, KernelError, KernelParameters};
use std::f64;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Radial-basis function (RBF), or squared-exponential, kernel.
/// The distance metric here is L2 (Euclidean).
///
/// ```math
///     K(\mathbf{x}, \mathbf{x'}) = \sigma^2 \exp\left(-\frac{\|\mathbf{x} - \mathbf{x'}\|^2}{2l^2}\right)
/// ```
///
/// # Parameters
/// * `length_scale` - Length scale, `l`.
/// * `variance` - Signal variance, `σ²`.
///
/// # Example
///
/// ```
/// use kernelgen::process::gaussian::kernel::{Kernel, RBFKernel};
///
/// let kernel = RBFKernel::new(2.0, 1.0).unwrap();
/// assert_eq!(kernel.compute(&[3.0], &[3.0]), 1.0);
/// assert!(kernel.compute(&[0.0], &[1.0]) > kernel.compute(&[0.0], &[2.0]));
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct RBFKernel {
    length_scale: f64,
    variance: f64,
}

impl RBFKernel {
    /// Create a new rbf kernel with the given length scale and variance
    pub fn new(length_scale: f64, variance: f64) -> Result<Self, KernelError> {
        Ok(Self {
            length_scale: check_positive("length_scale", length_scale)?,
            variance: check_positive("variance", variance)?,
        })
    }

    /// Create a new `RBFKernel` without checking parameters.
    ///
    /// Both parameters must be strictly positive for the kernel to produce
    /// a valid covariance.
    #[must_use]
    pub fn new_unchecked(length_scale: f64, variance: f64) -> Self {
        Self {
            length_scale,
            variance,
        }
    }

    pub fn length_scale(&self) -> f64 {
        self.length_scale
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }
}

impl Default for RBFKernel {
    fn default() -> Self {
        Self {
            length_scale: 1.0,
            variance: 1.0,
        }
    }
}

impl Kernel for RBFKernel {
    fn compute(&self, x1: &[f64], x2: &[f64]) -> f64 {
        self.variance * (-0.5 * e2_norm(x1, x2, self.length_scale)).exp()
    }

    fn is_stationary(&self) -> bool {
        true
    }

    fn parameters(&self) -> KernelParameters {
        KernelParameters::from([
            ("length_scale".to_string(), self.length_scale),
            ("variance".to_string(), self.variance),
        ])
    }

    fn set_parameter(
        &mut self,
        name: &str,
        value: f64,
    ) -> Result<(), KernelError> {
        match name {
            "length_scale" => {
                self.length_scale = check_positive(name, value)?;
            }
            "variance" => {
                self.variance = check_positive(name, value)?;
            }
            _ => return Err(KernelError::UnknownParameter(name.to_string())),
        }
        Ok(())
    }
}
