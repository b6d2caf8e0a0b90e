use crate::consts::DEFAULT_JITTER;
use crate::linalg::Matrix;

use super::GaussianProcessError;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Model of noise to use in Gaussian Process
///
/// The noise is added to the diagonal of the training covariance before it
/// is factored. It is never increased automatically: if the factorization
/// fails, the caller decides whether to retry with more regularization.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum NoiseModel {
    /// The same jitter is added to every diagonal entry
    Uniform(f64),
    /// A separate value is added for each training point
    PerPoint(Vec<f64>),
}

impl Default for NoiseModel {
    fn default() -> Self {
        NoiseModel::Uniform(DEFAULT_JITTER)
    }
}

impl NoiseModel {
    /// Enact the given noise model onto the given covariance matrix
    pub fn add_noise_to_kernel(
        &self,
        cov: &mut Matrix,
    ) -> Result<(), GaussianProcessError> {
        match self {
            NoiseModel::Uniform(noise) => {
                cov.add_to_diagonal(*noise);
                Ok(())
            }
            NoiseModel::PerPoint(sigma) => {
                if cov.nrows() != sigma.len() {
                    return Err(GaussianProcessError::NoiseModel {
                        expected: cov.nrows(),
                        found: sigma.len(),
                    });
                }
                for (i, s) in sigma.iter().enumerate() {
                    cov[(i, i)] += s;
                }
                Ok(())
            }
        }
    }
}
