//! Gaussian-process sequence generation.
//!
//! `kernelgen` builds covariance matrices from a [`Kernel`], factors them
//! with a [`Cholesky`] decomposition and draws correlated sequences from
//! either a Gaussian process prior or a posterior conditioned on training
//! observations. Generated traces can then be mapped onto pitches and note
//! onsets.
//!
//! # Example
//!
//! ```
//! use kernelgen::generate::{GeneratorOptions, KernelGenerator};
//! use kernelgen::process::gaussian::kernel::RBFKernel;
//!
//! let kernel = RBFKernel::new(2.0, 1.0).unwrap();
//! let mut gen = KernelGenerator::seeded(kernel, 42).with_noise(0.01).unwrap();
//!
//! let opts = GeneratorOptions::new(10).with_scale_range(60.0, 72.0);
//! let notes = gen.generate_notes(&opts).unwrap();
//!
//! assert_eq!(notes[0].len(), 10);
//! assert!(notes[0].iter().all(|n| (60.0..=72.0).contains(&n.pitch)));
//! ```
//!
//! [`Kernel`]: process::gaussian::kernel::Kernel
//! [`Cholesky`]: linalg::Cholesky

pub mod consts;
pub mod generate;
pub mod linalg;
pub mod misc;
pub mod process;
