use super::{check_positive, e2_norm, Kernel, KernelError, KernelParameters};
use std::f64;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Rational Quadratic Kernel, a scale mixture of RBF kernels
///
/// ```math
///     K(x, x') = \sigma^2 \left(1 + \frac{d(x, x')^2}{2 \alpha l^2}\right)^{-\alpha}
/// ```
///
/// # Parameters
/// `length_scale` -- Length scale
/// `mixture` -- Mixture Scale, α
/// `variance` -- Signal variance
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct RationalQuadratic {
    length_scale: f64,
    mixture: f64,
    variance: f64,
}

impl RationalQuadratic {
    /// Create a new RationalQuadratic kernel with unit variance
    pub fn new(length_scale: f64, mixture: f64) -> Result<Self, KernelError> {
        Ok(Self {
            length_scale: check_positive("length_scale", length_scale)?,
            mixture: check_positive("mixture", mixture)?,
            variance: 1.0,
        })
    }

    /// Set the signal variance
    pub fn with_variance(self, variance: f64) -> Result<Self, KernelError> {
        Ok(Self {
            variance: check_positive("variance", variance)?,
            ..self
        })
    }

    /// Create a new RationalQuadratic without checking values
    pub fn new_unchecked(length_scale: f64, mixture: f64, variance: f64) -> Self {
        Self {
            length_scale,
            mixture,
            variance,
        }
    }
}

impl Kernel for RationalQuadratic {
    fn compute(&self, x1: &[f64], x2: &[f64]) -> f64 {
        let d = (2.0 * self.mixture).sqrt() * self.length_scale;
        let t = e2_norm(x1, x2, d);
        self.variance * (1.0 + t).powf(-self.mixture)
    }

    fn is_stationary(&self) -> bool {
        true
    }

    fn parameters(&self) -> KernelParameters {
        KernelParameters::from([
            ("length_scale".to_string(), self.length_scale),
            ("mixture".to_string(), self.mixture),
            ("variance".to_string(), self.variance),
        ])
    }

    fn set_parameter(
        &mut self,
        name: &str,
        value: f64,
    ) -> Result<(), KernelError> {
        let slot = match name {
            "length_scale" => &mut self.length_scale,
            "mixture" => &mut self.mixture,
            "variance" => &mut self.variance,
            _ => return Err(KernelError::UnknownParameter(name.to_string())),
        };
        *slot = check_positive(name, value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::Matrix;
    use crate::process::gaussian::kernel::RBFKernel;

    #[test]
    fn rational_quadratic_values() {
        let kernel = RationalQuadratic::new(3.0, 5.0).unwrap();
        let x = Matrix::from_column(&[-4.0, -3.0, -2.0, -1.0, 1.0]);
        let cov = kernel.covariance_sym(&x);

        // (1 + 1 / 90)^-5
        assert::close(cov[(0, 1)], 0.946_249_331_283_046_7, 1E-9);
        // (1 + 25 / 90)^-5
        assert::close(cov[(0, 4)], 0.293_577_890_426_287_2, 1E-9);
        assert_eq!(kernel.diag(&x), vec![1.0; 5]);
    }

    #[test]
    fn large_mixture_approaches_rbf() {
        let rq = RationalQuadratic::new(1.5, 1E6)
            .unwrap()
            .with_variance(2.0)
            .unwrap();
        let rbf = RBFKernel::new(1.5, 2.0).unwrap();
        for d in [0.0, 0.5, 1.0, 2.0, 3.0] {
            assert::close(rq.compute(&[0.0], &[d]), rbf.compute(&[0.0], &[d]), 1E-5);
        }
    }

    #[test]
    fn rejects_bad_mixture() {
        assert!(RationalQuadratic::new(1.0, 0.0).is_err());
        let mut kernel = RationalQuadratic::new(1.0, 1.0).unwrap();
        assert!(kernel.set_parameter("mixture", -1.0).is_err());
        kernel.set_parameter("mixture", 2.0).unwrap();
        assert_eq!(kernel.parameter("mixture"), Some(2.0));
    }
}
