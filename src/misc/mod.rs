//! Random utilities
mod normal;

pub use normal::*;
