//! Sequence generation from Gaussian process priors and posteriors
use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_NOISE;
use crate::linalg::{Cholesky, CholeskyError, Matrix};
use crate::misc::standard_normals;
use crate::process::gaussian::kernel::{Kernel, KernelError};
use crate::process::gaussian::{
    GaussianProcess, GaussianProcessError, NoiseModel,
};

mod notes;
mod options;
mod time;

pub use notes::*;
pub use options::*;
pub use time::*;

/// Errors from configuring or running a [`KernelGenerator`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum GeneratorError {
    /// Requested a sequence of length zero
    ZeroLength,
    /// Requested zero samples
    ZeroSampleCount,
    /// No durations to assign to notes
    EmptyDurations,
    /// A duration is negative or not finite
    InvalidDuration { duration: f64 },
    /// The discrete scale has no degrees
    EmptyScale,
    /// The pitch range is empty or not finite
    InvalidRange { low: f64, high: f64 },
    /// Explicit note times do not match the number of values
    TimeAxisLength { expected: usize, found: usize },
    /// Noise is negative or not finite
    InvalidNoise { noise: f64 },
    /// The prior mean offset is not finite
    InvalidMeanOffset { offset: f64 },
    /// A training time string could not be parsed
    TimeFormat(TimeFormatError),
    /// The kernel could not evaluate the index axis
    Kernel(KernelError),
    /// The prior covariance could not be factored
    Cholesky(CholeskyError),
    /// Fitting or sampling the conditioned process failed
    Process(GaussianProcessError),
}

/// Numeric output of one generation call
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Trace {
    /// Index (time) axis shared by every sample
    pub index: Vec<f64>,
    /// One sequence per requested sample, each `index.len()` long
    pub samples: Vec<Vec<f64>>,
    /// Whether the samples come from the conditioned posterior
    pub conditioned: bool,
}

impl Trace {
    /// The first sample
    pub fn first(&self) -> Option<&[f64]> {
        self.samples.first().map(|s| s.as_slice())
    }

    /// Number of points in each sample
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Draws sequences from a Gaussian process over a 1-D index axis.
///
/// Without training data the generator samples the prior jointly through
/// the Cholesky factor of the axis covariance. With training data it fits a
/// [`GaussianProcess`] and samples its posterior over a uniform axis that
/// spans the training indices.
///
/// # Example
///
/// ```
/// use kernelgen::generate::{GeneratorOptions, KernelGenerator};
/// use kernelgen::process::gaussian::kernel::RBFKernel;
///
/// let kernel = RBFKernel::new(2.0, 1.0).unwrap();
/// let mut gen = KernelGenerator::seeded(kernel, 1337).with_noise(0.01).unwrap();
///
/// let trace = gen.generate(&GeneratorOptions::new(10)).unwrap();
/// assert_eq!(trace.len(), 10);
/// assert!(trace.first().unwrap().iter().all(|v| v.is_finite()));
/// ```
#[derive(Debug)]
pub struct KernelGenerator<K, R = SmallRng>
where
    K: Kernel,
{
    kernel: K,
    /// Ordered `(index, value)` observations
    training: Option<Vec<(f64, f64)>>,
    /// Diagonal regularization of every covariance this generator factors
    noise: f64,
    /// Constant shift of the prior mean
    mean_offset: f64,
    rng: R,
    time_format: Box<dyn TimeFormat>,
}

impl<K: Kernel> KernelGenerator<K, SmallRng> {
    /// Generator seeded from system entropy
    pub fn new(kernel: K) -> Self {
        Self::with_rng(kernel, SmallRng::from_entropy())
    }

    /// Generator with a fixed seed
    pub fn seeded(kernel: K, seed: u64) -> Self {
        Self::with_rng(kernel, SmallRng::seed_from_u64(seed))
    }
}

impl<K, R> KernelGenerator<K, R>
where
    K: Kernel,
    R: Rng + SeedableRng,
{
    /// Generator drawing from the given RNG
    pub fn with_rng(kernel: K, rng: R) -> Self {
        Self {
            kernel,
            training: None,
            noise: DEFAULT_NOISE,
            mean_offset: 0.0,
            rng,
            time_format: Box::<BarsBeatsTicks>::default(),
        }
    }

    /// Condition on `(index, value)` pairs. An empty set leaves the
    /// generator unconditioned.
    pub fn with_training(self, training: Vec<(f64, f64)>) -> Self {
        Self {
            training: if training.is_empty() {
                None
            } else {
                Some(training)
            },
            ..self
        }
    }

    /// Condition on `(time string, value)` pairs parsed by the generator's
    /// time format
    pub fn with_timed_training<S: AsRef<str>>(
        self,
        training: &[(S, f64)],
    ) -> Result<Self, GeneratorError> {
        let pairs = training
            .iter()
            .map(|(t, v)| {
                self.time_format
                    .time_to_offset(t.as_ref())
                    .map(|offset| (offset, *v))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.with_training(pairs))
    }

    /// Set the diagonal noise. Must be finite and non-negative.
    pub fn with_noise(self, noise: f64) -> Result<Self, GeneratorError> {
        if noise >= 0.0 && noise.is_finite() {
            Ok(Self { noise, ..self })
        } else {
            Err(GeneratorError::InvalidNoise { noise })
        }
    }

    /// Shift the prior mean by a constant. Must be finite.
    pub fn with_mean_offset(
        self,
        mean_offset: f64,
    ) -> Result<Self, GeneratorError> {
        if mean_offset.is_finite() {
            Ok(Self {
                mean_offset,
                ..self
            })
        } else {
            Err(GeneratorError::InvalidMeanOffset {
                offset: mean_offset,
            })
        }
    }

    pub fn with_time_format<T: TimeFormat + 'static>(
        self,
        time_format: T,
    ) -> Self {
        Self {
            time_format: Box::new(time_format),
            ..self
        }
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn training(&self) -> Option<&[(f64, f64)]> {
        self.training.as_deref()
    }

    pub fn noise(&self) -> f64 {
        self.noise
    }

    pub fn is_conditioned(&self) -> bool {
        self.training.is_some()
    }

    /// Draw `opts.sample_count` sequences of `opts.length` points.
    ///
    /// When `opts.seed` is set the RNG is reseeded first, so equal options
    /// give equal output.
    pub fn generate(
        &mut self,
        opts: &GeneratorOptions,
    ) -> Result<Trace, GeneratorError> {
        opts.validate()?;
        if let Some(seed) = opts.seed {
            self.rng = R::seed_from_u64(seed);
        }

        match self.training.take() {
            None => self.sample_prior(opts.length, opts.sample_count),
            Some(training) => {
                let res = self.sample_posterior(
                    &training,
                    opts.length,
                    opts.sample_count,
                    opts.joint_posterior,
                );
                self.training = Some(training);
                res
            }
        }
    }

    /// Generate and map every sample to notes.
    ///
    /// Prior samples are placed sequentially; posterior samples take their
    /// onsets from the query axis.
    pub fn generate_notes(
        &mut self,
        opts: &GeneratorOptions,
    ) -> Result<Vec<Vec<Note>>, GeneratorError> {
        let trace = self.generate(opts)?;
        let times = trace.conditioned.then_some(trace.index.as_slice());
        trace
            .samples
            .iter()
            .map(|s| to_notes(s, times, opts, self.time_format.as_ref()))
            .collect()
    }

    /// Joint draws from the prior over the axis `0..length`
    pub fn sample_prior(
        &mut self,
        length: usize,
        n_samples: usize,
    ) -> Result<Trace, GeneratorError> {
        tracing::debug!(length, n_samples, "sampling prior");
        let index: Vec<f64> = (0..length).map(|i| i as f64).collect();
        let mut cov = self.kernel.covariance_sym(&Matrix::from_column(&index));
        cov.add_to_diagonal(self.noise);
        let l = Cholesky::new(&cov)?;

        let samples = (0..n_samples)
            .map(|_| {
                let z = standard_normals(length, &mut self.rng);
                let lz = l.correlate(&z)?;
                Ok(lz.into_iter().map(|d| self.mean_offset + d).collect())
            })
            .collect::<Result<Vec<Vec<f64>>, CholeskyError>>()?;

        Ok(Trace {
            index,
            samples,
            conditioned: false,
        })
    }

    /// Draws from the posterior given `training`, over `length` evenly
    /// spaced points from the smallest to the largest training index
    pub fn sample_posterior(
        &mut self,
        training: &[(f64, f64)],
        length: usize,
        n_samples: usize,
        joint: bool,
    ) -> Result<Trace, GeneratorError> {
        tracing::debug!(
            n_train = training.len(),
            length,
            n_samples,
            joint,
            "sampling posterior"
        );
        let (xs, ys): (Vec<f64>, Vec<f64>) = training.iter().copied().unzip();
        let gp = GaussianProcess::train(
            self.kernel.clone(),
            xs.clone(),
            &ys,
            NoiseModel::Uniform(self.noise),
        )?;

        let index = uniform_axis(&xs, length);
        let samples = if joint {
            gp.sample_y_joint(index.clone(), n_samples, self.noise, &mut self.rng)?
        } else {
            gp.sample_y(index.clone(), n_samples, &mut self.rng)?
        };

        Ok(Trace {
            index,
            samples,
            conditioned: true,
        })
    }
}

/// `length` evenly spaced points from `min(xs)` to `max(xs)` inclusive
fn uniform_axis(xs: &[f64], length: usize) -> Vec<f64> {
    let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    match length {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (length - 1) as f64;
            (0..length).map(|i| lo + step * i as f64).collect()
        }
    }
}

impl From<TimeFormatError> for GeneratorError {
    fn from(e: TimeFormatError) -> Self {
        Self::TimeFormat(e)
    }
}

impl From<KernelError> for GeneratorError {
    fn from(e: KernelError) -> Self {
        Self::Kernel(e)
    }
}

impl From<CholeskyError> for GeneratorError {
    fn from(e: CholeskyError) -> Self {
        Self::Cholesky(e)
    }
}

impl From<GaussianProcessError> for GeneratorError {
    fn from(e: GaussianProcessError) -> Self {
        Self::Process(e)
    }
}

impl std::error::Error for GeneratorError {}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroLength => write!(f, "sequence length must be at least 1"),
            Self::ZeroSampleCount => {
                write!(f, "sample count must be at least 1")
            }
            Self::EmptyDurations => write!(f, "durations must not be empty"),
            Self::InvalidDuration { duration } => write!(
                f,
                "durations must be finite and non-negative, given: {duration}"
            ),
            Self::EmptyScale => write!(f, "scale must have at least one degree"),
            Self::InvalidRange { low, high } => {
                write!(f, "invalid pitch range ({low}, {high})")
            }
            Self::TimeAxisLength { expected, found } => write!(
                f,
                "expected {expected} note times but got {found}"
            ),
            Self::InvalidNoise { noise } => write!(
                f,
                "noise must be finite and non-negative, given: {noise}"
            ),
            Self::InvalidMeanOffset { offset } => {
                write!(f, "mean offset must be finite, given: {offset}")
            }
            Self::TimeFormat(e) => write!(f, "{e}"),
            Self::Kernel(e) => write!(f, "{e}"),
            Self::Cholesky(e) => {
                write!(f, "prior covariance could not be factored: {e}")
            }
            Self::Process(e) => write!(f, "{e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::gaussian::kernel::RBFKernel;
    use rand_xoshiro::Xoshiro256Plus;

    fn rbf(length_scale: f64) -> RBFKernel {
        RBFKernel::new(length_scale, 1.0).unwrap()
    }

    #[test]
    fn prior_shape() {
        let mut gen = KernelGenerator::seeded(rbf(2.0), 7);
        let trace = gen
            .generate(&GeneratorOptions::new(12).with_sample_count(3))
            .unwrap();
        assert!(!trace.conditioned);
        assert_eq!(trace.index, (0..12).map(f64::from).collect::<Vec<_>>());
        assert_eq!(trace.samples.len(), 3);
        assert!(trace
            .samples
            .iter()
            .all(|s| s.len() == 12 && s.iter().all(|v| v.is_finite())));
    }

    #[test]
    fn seed_option_makes_output_reproducible() {
        let opts = GeneratorOptions::new(8).with_seed(99);
        let mut gen = KernelGenerator::new(rbf(1.5));
        let a = gen.generate(&opts).unwrap();
        let b = gen.generate(&opts).unwrap();
        assert_eq!(a, b);

        let c = gen.generate(&opts.clone().with_seed(100)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn custom_rng() {
        let opts = GeneratorOptions::new(5);
        let mut a = KernelGenerator::with_rng(
            rbf(1.0),
            Xoshiro256Plus::seed_from_u64(3),
        );
        let mut b = KernelGenerator::with_rng(
            rbf(1.0),
            Xoshiro256Plus::seed_from_u64(3),
        );
        assert_eq!(a.generate(&opts).unwrap(), b.generate(&opts).unwrap());
    }

    #[test]
    fn prior_samples_are_smooth() {
        // a long length scale makes neighbours nearly equal
        let mut gen = KernelGenerator::seeded(rbf(20.0), 11);
        let trace = gen.generate(&GeneratorOptions::new(16)).unwrap();
        let s = trace.first().unwrap();
        assert!(s.windows(2).all(|w| (w[0] - w[1]).abs() < 0.5));
    }

    #[test]
    fn mean_offset_shifts_prior() {
        let opts = GeneratorOptions::new(6).with_seed(5);
        let base = KernelGenerator::seeded(rbf(2.0), 0)
            .generate(&opts)
            .unwrap();
        let shifted = KernelGenerator::seeded(rbf(2.0), 0)
            .with_mean_offset(10.0)
            .unwrap()
            .generate(&opts)
            .unwrap();
        let diffs: Vec<f64> = shifted.samples[0]
            .iter()
            .zip(&base.samples[0])
            .map(|(a, b)| a - b)
            .collect();
        assert::close(diffs, vec![10.0; 6], 1E-10);
    }

    #[test]
    fn prior_without_noise_can_fail_to_factor() {
        // every entry of K rounds to exactly 1
        let mut gen = KernelGenerator::seeded(rbf(1E9), 0).with_noise(0.0).unwrap();
        let res = gen.generate(&GeneratorOptions::new(4));
        assert!(matches!(
            res,
            Err(GeneratorError::Cholesky(
                CholeskyError::NotPositiveDefinite { row: 1, column: 1, .. }
            ))
        ));
    }

    #[test]
    fn rejects_invalid_noise_and_options() {
        assert!(matches!(
            KernelGenerator::seeded(rbf(1.0), 0).with_noise(-1.0),
            Err(GeneratorError::InvalidNoise { .. })
        ));
        for offset in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                KernelGenerator::seeded(rbf(1.0), 0).with_mean_offset(offset),
                Err(GeneratorError::InvalidMeanOffset { .. })
            ));
        }
        let mut gen = KernelGenerator::seeded(rbf(1.0), 0);
        assert_eq!(
            gen.generate(&GeneratorOptions::new(0)),
            Err(GeneratorError::ZeroLength)
        );
    }

    #[test]
    fn posterior_follows_training_data() {
        let training = vec![(0.0, 60.0), (4.0, 64.0), (8.0, 67.0)];
        let mut gen = KernelGenerator::seeded(rbf(2.0), 21)
            .with_noise(1E-8)
            .unwrap()
            .with_mean_offset(100.0)
            .unwrap()
            .with_training(training);
        assert!(gen.is_conditioned());

        let trace = gen.generate(&GeneratorOptions::new(9)).unwrap();
        assert!(trace.conditioned);
        assert_eq!(trace.index, (0..9).map(f64::from).collect::<Vec<_>>());

        let s = trace.first().unwrap();
        assert::close(s[0], 60.0, 1E-2);
        assert::close(s[4], 64.0, 1E-2);
        assert::close(s[8], 67.0, 1E-2);
        // training is kept for the next call
        assert_eq!(gen.training().map(|t| t.len()), Some(3));
    }

    #[test]
    fn joint_posterior_passes_through_training() {
        let training = vec![(0.0, 1.0), (2.0, -1.0), (4.0, 0.5)];
        let mut gen = KernelGenerator::seeded(rbf(1.0), 8)
            .with_noise(1E-8)
            .unwrap()
            .with_training(training);
        let trace = gen
            .generate(
                &GeneratorOptions::new(5)
                    .with_sample_count(4)
                    .with_joint_posterior(true),
            )
            .unwrap();
        for s in &trace.samples {
            assert::close(s[0], 1.0, 1E-2);
            assert::close(s[2], -1.0, 1E-2);
            assert::close(s[4], 0.5, 1E-2);
        }
    }

    #[test]
    fn duplicate_training_without_noise_fails() {
        let mut gen = KernelGenerator::seeded(rbf(1.0), 0)
            .with_noise(0.0)
            .unwrap()
            .with_training(vec![(1.0, 0.0), (1.0, 1.0)]);
        assert!(matches!(
            gen.generate(&GeneratorOptions::new(4)),
            Err(GeneratorError::Process(GaussianProcessError::FitFailed(_)))
        ));
    }

    #[test]
    fn empty_training_is_unconditioned() {
        let gen = KernelGenerator::seeded(rbf(1.0), 0).with_training(vec![]);
        assert!(!gen.is_conditioned());
    }

    #[test]
    fn timed_training_parses_time_strings() {
        let gen = KernelGenerator::seeded(rbf(1.0), 0)
            .with_timed_training(&[("0:0:0", 60.0), ("1:0:240", 62.0)])
            .unwrap();
        assert_eq!(gen.training(), Some(&[(0.0, 60.0), (4.5, 62.0)][..]));

        let res = KernelGenerator::seeded(rbf(1.0), 0)
            .with_timed_training(&[("bar one", 60.0)]);
        assert!(matches!(res, Err(GeneratorError::TimeFormat(_))));

        // rejected up front rather than as a failed fit
        let res = KernelGenerator::seeded(rbf(1.0), 0)
            .with_timed_training(&[("NaN:0:0", 1.0), ("0:1:0", 2.0)]);
        assert_eq!(
            res.err(),
            Some(GeneratorError::TimeFormat(TimeFormatError::Malformed {
                time: "NaN:0:0".to_string()
            }))
        );
    }

    #[test]
    fn posterior_notes_take_times_from_axis() {
        let mut gen = KernelGenerator::seeded(rbf(2.0), 4)
            .with_noise(1E-6)
            .unwrap()
            .with_training(vec![(0.0, 0.0), (2.0, 1.0), (6.0, -1.0)]);
        let opts = GeneratorOptions::new(4).with_scale_range(60.0, 72.0);
        let notes = gen.generate_notes(&opts).unwrap();
        assert_eq!(notes.len(), 1);
        let times: Vec<f64> =
            notes[0].iter().filter_map(|n| n.time.beats()).collect();
        assert_eq!(times, vec![0.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn uniform_axis_spans_training_range() {
        assert_eq!(uniform_axis(&[3.0, 1.0, 2.0], 5), vec![1.0, 1.5, 2.0, 2.5, 3.0]);
        assert_eq!(uniform_axis(&[3.0, 1.0], 1), vec![1.0]);
    }
}
