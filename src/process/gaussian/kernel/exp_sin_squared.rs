use super::{check_positive, euclidean_distance, Kernel, KernelError, KernelParameters};
use std::f64;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Exp Sine^2 (periodic) Kernel
/// k(x_i, x_j) = variance * exp(-2 (sin(pi / periodicity * d(x_i, x_j)) / length_scale) ^ 2)
///
/// Produces sequences that repeat every `periodicity` steps, which makes it
/// the natural choice for ostinato-like material.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct ExpSineSquaredKernel {
    length_scale: f64,
    periodicity: f64,
    variance: f64,
}

impl ExpSineSquaredKernel {
    /// Create a new ExpSineSquaredKernel with unit variance
    pub fn new(periodicity: f64, length_scale: f64) -> Result<Self, KernelError> {
        Ok(Self {
            length_scale: check_positive("length_scale", length_scale)?,
            periodicity: check_positive("periodicity", periodicity)?,
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

    pub fn periodicity(&self) -> f64 {
        self.periodicity
    }
}

impl Kernel for ExpSineSquaredKernel {
    fn compute(&self, x1: &[f64], x2: &[f64]) -> f64 {
        const PI: f64 = std::f64::consts::PI;
        let d = euclidean_distance(x1, x2);
        let s = (PI * d / self.periodicity).sin() / self.length_scale;
        self.variance * (-2.0 * s * s).exp()
    }

    fn is_stationary(&self) -> bool {
        true
    }

    fn parameters(&self) -> KernelParameters {
        KernelParameters::from([
            ("length_scale".to_string(), self.length_scale),
            ("periodicity".to_string(), self.periodicity),
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
            "periodicity" => &mut self.periodicity,
            "variance" => &mut self.variance,
            _ => return Err(KernelError::UnknownParameter(name.to_string())),
        };
        *slot = check_positive(name, value)?;
        Ok(())
    }
}
