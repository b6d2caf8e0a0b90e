use super::{check_positive, Kernel, KernelError, KernelParameters};
use std::f64;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// White Noise Kernel
///
/// `k(x, x') = noise_level` when the two points coincide, zero otherwise.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct WhiteKernel {
    /// Level of the noise
    noise_level: f64,
}

impl WhiteKernel {
    /// Create a new WhiteKernel with the given level of noise
    pub fn new(noise_level: f64) -> Result<Self, KernelError> {
        Ok(Self {
            noise_level: check_positive("noise_level", noise_level)?,
        })
    }

    /// Create a new WhiteKernel without check the parameters
    pub fn new_unchecked(noise_level: f64) -> Self {
        Self { noise_level }
    }

    pub fn noise_level(&self) -> f64 {
        self.noise_level
    }
}

impl Kernel for WhiteKernel {
    fn compute(&self, x1: &[f64], x2: &[f64]) -> f64 {
        if x1 == x2 {
            self.noise_level
        } else {
            0.0
        }
    }

    fn is_stationary(&self) -> bool {
        true
    }

    fn parameters(&self) -> KernelParameters {
        KernelParameters::from([("noise_level".to_string(), self.noise_level)])
    }

    fn set_parameter(
        &mut self,
        name: &str,
        value: f64,
    ) -> Result<(), KernelError> {
        if name == "noise_level" {
            self.noise_level = check_positive(name, value)?;
            Ok(())
        } else {
            Err(KernelError::UnknownParameter(name.to_string()))
        }
    }
}
