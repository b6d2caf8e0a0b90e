//! Stochastic processes
pub mod gaussian;
