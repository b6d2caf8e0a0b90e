use super::{Kernel, KernelError, KernelParameters};
use std::f64;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Constant kernel, `k(x, x') = c`.
///
/// Mostly useful as a scale factor in a product, e.g.
/// `ConstantKernel::new(2.0)? * RBFKernel::default()`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct ConstantKernel {
    value: f64,
}

impl ConstantKernel {
    pub fn new(value: f64) -> Result<Self, KernelError> {
        if value < 0.0 || !value.is_finite() {
            Err(KernelError::ParameterOutOfBounds {
                name: "value".to_string(),
                given: value,
                bounds: (0.0, f64::INFINITY),
            })
        } else {
            Ok(Self { value })
        }
    }

    pub fn new_unchecked(value: f64) -> Self {
        Self { value }
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl Kernel for ConstantKernel {
    fn compute(&self, _x1: &[f64], _x2: &[f64]) -> f64 {
        self.value
    }

    fn is_stationary(&self) -> bool {
        true
    }

    fn parameters(&self) -> KernelParameters {
        KernelParameters::from([("value".to_string(), self.value)])
    }

    fn set_parameter(
        &mut self,
        name: &str,
        value: f64,
    ) -> Result<(), KernelError> {
        if name == "value" {
            *self = Self::new(value)?;
            Ok(())
        } else {
            Err(KernelError::UnknownParameter(name.to_string()))
        }
    }
}
