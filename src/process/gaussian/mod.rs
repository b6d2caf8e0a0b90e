//! Gaussian Processes
use std::fmt;

use rand::Rng;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::consts::HALF_LN_2PI;
use crate::linalg::{Cholesky, CholeskyError, Matrix};
use crate::misc::{standard_normal, standard_normals};

pub mod kernel;
use kernel::{Kernel, KernelError};

mod noise_model;
pub use noise_model::*;

/// Errors from fitting or querying a [`GaussianProcess`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum GaussianProcessError {
    /// `predict`, `sample_y` or `ln_m` was called before a successful `fit`
    NotFitted,
    /// The number of training inputs and targets differ
    LengthMismatch { x_rows: usize, y_len: usize },
    /// The regularized training covariance could not be factored
    FitFailed(CholeskyError),
    /// A posterior covariance could not be factored for joint sampling
    Cholesky(CholeskyError),
    /// Per-point noise does not match the training set
    NoiseModel { expected: usize, found: usize },
    /// The kernel could not evaluate the given points
    Kernel(KernelError),
}

/// Everything computed by a successful fit. Either all of it exists or none.
#[derive(Clone, Debug, PartialEq)]
struct Fitted {
    /// x values used in training
    x_train: Matrix,
    /// y values used in training
    y_train: Vec<f64>,
    /// Cholesky Decomposition of the regularized K
    l: Cholesky,
    /// Dual coefficients of training data in kernel space.
    alpha: Vec<f64>,
}

/// Gaussian Process regressor over a kernel `K`.
///
/// A new regressor is unfitted. [`GaussianProcess::fit`] moves it to the
/// fitted state; fitting again replaces the training state.
///
/// # Example
///
/// ```
/// use kernelgen::process::gaussian::{GaussianProcess, NoiseModel};
/// use kernelgen::process::gaussian::kernel::RBFKernel;
///
/// let mut gp = GaussianProcess::new(RBFKernel::default(), NoiseModel::default());
/// gp.fit(vec![0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]).unwrap();
///
/// let mean = gp.predict(vec![1.0]).unwrap();
/// assert!((mean[0] - 1.0).abs() < 1E-6);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianProcess<K>
where
    K: Kernel,
{
    /// Covariance Kernel
    kernel: K,
    /// Diagonal regularization of the training covariance
    noise_model: NoiseModel,
    fitted: Option<Fitted>,
}

impl<K> GaussianProcess<K>
where
    K: Kernel,
{
    /// Create an unfitted Gaussian Process
    pub fn new(kernel: K, noise_model: NoiseModel) -> Self {
        Self {
            kernel,
            noise_model,
            fitted: None,
        }
    }

    /// Train a Gaussian Process on the given data points
    ///
    /// # Arguments
    /// * `kernel` - Kernel to use to determine covariance
    /// * `x_train` - Values to use for input into `f`
    /// * `y_train` - Known values for `f(x)`
    /// * `noise_model` - Noise model to use for fitting
    pub fn train<X: Into<Matrix>>(
        kernel: K,
        x_train: X,
        y_train: &[f64],
        noise_model: NoiseModel,
    ) -> Result<Self, GaussianProcessError> {
        let mut gp = Self::new(kernel, noise_model);
        gp.fit(x_train, y_train)?;
        Ok(gp)
    }

    /// Fit to training inputs `x` (one point per row; a plain `Vec<f64>`
    /// is promoted to a single-feature column) and targets `y`.
    ///
    /// On failure the previous state, fitted or not, is left untouched.
    pub fn fit<X: Into<Matrix>>(
        &mut self,
        x: X,
        y: &[f64],
    ) -> Result<(), GaussianProcessError> {
        let x_train: Matrix = x.into();
        if x_train.nrows() != y.len() {
            return Err(GaussianProcessError::LengthMismatch {
                x_rows: x_train.nrows(),
                y_len: y.len(),
            });
        }
        tracing::debug!(n = y.len(), "fitting gaussian process");

        let mut k = self.kernel.covariance_sym(&x_train);
        self.noise_model.add_noise_to_kernel(&mut k)?;

        let l = Cholesky::new(&k).map_err(GaussianProcessError::FitFailed)?;
        let alpha = l.solve(y).map_err(GaussianProcessError::FitFailed)?;

        self.fitted = Some(Fitted {
            x_train,
            y_train: y.to_vec(),
            l,
            alpha,
        });
        Ok(())
    }

    fn fitted(&self) -> Result<&Fitted, GaussianProcessError> {
        self.fitted.as_ref().ok_or(GaussianProcessError::NotFitted)
    }

    /// Return the kernel being used in this GP
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Mutable access to the kernel. Changes take effect on the next `fit`.
    pub fn kernel_mut(&mut self) -> &mut K {
        &mut self.kernel
    }

    pub fn noise_model(&self) -> &NoiseModel {
        &self.noise_model
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Number of training points, if fitted
    pub fn n_train(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.y_train.len())
    }

    /// Return the Cholesky decomposition of K
    pub fn cholesky(&self) -> Result<&Cholesky, GaussianProcessError> {
        self.fitted().map(|f| &f.l)
    }

    /// Dual coefficients, the solution of `K alpha = y_train`
    pub fn alpha(&self) -> Result<&[f64], GaussianProcessError> {
        self.fitted().map(|f| f.alpha.as_slice())
    }

    /// Posterior mean at the points `x`
    pub fn predict<X: Into<Matrix>>(
        &self,
        x: X,
    ) -> Result<Vec<f64>, GaussianProcessError> {
        let fitted = self.fitted()?;
        let k_cross = self.kernel.covariance(&fitted.x_train, &x.into())?;
        Ok(posterior_mean(&k_cross, &fitted.alpha))
    }

    /// Posterior mean and standard deviation at the points `x`.
    ///
    /// Variances that come out slightly negative through round-off are
    /// clamped to zero.
    pub fn predict_with_std<X: Into<Matrix>>(
        &self,
        x: X,
    ) -> Result<(Vec<f64>, Vec<f64>), GaussianProcessError> {
        let fitted = self.fitted()?;
        let xs: Matrix = x.into();
        let k_cross = self.kernel.covariance(&fitted.x_train, &xs)?;
        let mean = posterior_mean(&k_cross, &fitted.alpha);
        let prior_var = self.kernel.diag(&xs);

        let std = prior_var
            .iter()
            .enumerate()
            .map(|(i, k_ii)| {
                let k_star = k_cross.column(i)?;
                let v = fitted.l.forward_substitution(&k_star)?;
                let vv: f64 = v.iter().map(|x| x * x).sum();
                Ok((k_ii - vv).max(0.0).sqrt())
            })
            .collect::<Result<Vec<f64>, GaussianProcessError>>()?;

        Ok((mean, std))
    }

    /// Posterior mean and full covariance at the points `x`
    pub fn predict_cov<X: Into<Matrix>>(
        &self,
        x: X,
    ) -> Result<(Vec<f64>, Matrix), GaussianProcessError> {
        let fitted = self.fitted()?;
        let xs: Matrix = x.into();
        let k_cross = self.kernel.covariance(&fitted.x_train, &xs)?;
        let mean = posterior_mean(&k_cross, &fitted.alpha);

        // V = L⁻¹ K(X_train, xs), one query point per column
        let m = xs.nrows();
        let vs = (0..m)
            .map(|i| {
                let k_star = k_cross.column(i)?;
                Ok(fitted.l.forward_substitution(&k_star)?)
            })
            .collect::<Result<Vec<Vec<f64>>, GaussianProcessError>>()?;

        let mut cov = self.kernel.covariance_sym(&xs);
        for i in 0..m {
            for j in 0..=i {
                let vv: f64 = vs[i].iter().zip(&vs[j]).map(|(a, b)| a * b).sum();
                cov[(i, j)] -= vv;
                if i != j {
                    cov[(j, i)] -= vv;
                }
            }
        }
        Ok((mean, cov))
    }

    /// Draw `n_samples` functions at `x`, each point independently from its
    /// posterior marginal `N(mean[i], std[i]²)`.
    ///
    /// Correlations between query points are ignored; see
    /// [`GaussianProcess::sample_y_joint`] for the exact joint draw.
    pub fn sample_y<X: Into<Matrix>, R: Rng>(
        &self,
        x: X,
        n_samples: usize,
        rng: &mut R,
    ) -> Result<Vec<Vec<f64>>, GaussianProcessError> {
        let (mean, std) = self.predict_with_std(x)?;
        Ok((0..n_samples)
            .map(|_| {
                mean.iter()
                    .zip(&std)
                    .map(|(m, s)| m + s * standard_normal(rng))
                    .collect()
            })
            .collect())
    }

    /// Draw `n_samples` functions at `x` from the joint posterior.
    ///
    /// `jitter` is added to the diagonal of the posterior covariance before
    /// it is factored.
    pub fn sample_y_joint<X: Into<Matrix>, R: Rng>(
        &self,
        x: X,
        n_samples: usize,
        jitter: f64,
        rng: &mut R,
    ) -> Result<Vec<Vec<f64>>, GaussianProcessError> {
        let (mean, mut cov) = self.predict_cov(x)?;
        cov.add_to_diagonal(jitter);
        let l = Cholesky::new(&cov).map_err(GaussianProcessError::Cholesky)?;

        (0..n_samples)
            .map(|_| {
                let z = standard_normals(mean.len(), rng);
                let lz = l.correlate(&z)?;
                Ok(mean.iter().zip(lz).map(|(m, d)| m + d).collect())
            })
            .collect()
    }

    /// Return the log marginal likelihood of the training data
    pub fn ln_m(&self) -> Result<f64, GaussianProcessError> {
        let fitted = self.fitted()?;
        let n = fitted.y_train.len() as f64;
        let y_alpha: f64 = fitted
            .y_train
            .iter()
            .zip(&fitted.alpha)
            .map(|(y, a)| y * a)
            .sum();
        Ok(-0.5 * y_alpha - fitted.l.sum_ln_diag() - n * HALF_LN_2PI)
    }
}

/// `mean[i] = Σ_j K_cross[j, i] alpha[j]`
fn posterior_mean(k_cross: &Matrix, alpha: &[f64]) -> Vec<f64> {
    (0..k_cross.ncols())
        .map(|i| {
            alpha
                .iter()
                .enumerate()
                .map(|(j, a)| k_cross[(j, i)] * a)
                .sum()
        })
        .collect()
}

impl From<KernelError> for GaussianProcessError {
    fn from(e: KernelError) -> Self {
        Self::Kernel(e)
    }
}

impl From<crate::linalg::MatrixError> for GaussianProcessError {
    fn from(e: crate::linalg::MatrixError) -> Self {
        Self::Kernel(KernelError::Matrix(e))
    }
}

impl From<CholeskyError> for GaussianProcessError {
    fn from(e: CholeskyError) -> Self {
        Self::Cholesky(e)
    }
}

impl std::error::Error for GaussianProcessError {}

impl fmt::Display for GaussianProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFitted => {
                write!(f, "the gaussian process has not been fit")
            }
            Self::LengthMismatch { x_rows, y_len } => write!(
                f,
                "{x_rows} training inputs but {y_len} training targets"
            ),
            Self::FitFailed(e) => write!(f, "fit failed: {e}"),
            Self::Cholesky(e) => {
                write!(f, "posterior covariance could not be factored: {e}")
            }
            Self::NoiseModel { expected, found } => write!(
                f,
                "per point noise must be the same size as y_train \
                 (expected: {expected}, got: {found})"
            ),
            Self::Kernel(e) => write!(f, "{e}"),
        }
    }
}
