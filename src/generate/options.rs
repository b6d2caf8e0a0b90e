use crate::consts::{MIDI_PITCH_MAX, MIDI_PITCH_MIN};

use super::GeneratorError;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Options for a single generation call
///
/// # Example
///
/// ```
/// use kernelgen::generate::GeneratorOptions;
///
/// let opts = GeneratorOptions::new(32)
///     .with_seed(7)
///     .with_scale_range(60.0, 72.0)
///     .with_durations(vec![0.5, 0.5, 1.0]);
///
/// assert_eq!(opts.length, 32);
/// assert!(opts.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case", default))]
pub struct GeneratorOptions {
    /// Number of points in each generated sequence
    pub length: usize,
    /// Number of sequences to draw
    pub sample_count: usize,
    /// Reseed the generator before drawing
    pub seed: Option<u64>,
    /// Snap pitches to this discrete scale instead of `scale_range`
    pub map_to_scale: Option<Vec<f64>>,
    /// Inclusive `(low, high)` pitch range
    pub scale_range: (f64, f64),
    /// Note durations in beats, assigned cyclically
    pub durations: Vec<f64>,
    /// Round mapped pitches to the nearest integer
    pub quantize: bool,
    /// Emit `bars:beats:ticks` strings instead of numeric beat offsets
    pub use_string_time: bool,
    /// Sample the conditioned posterior jointly rather than point by point
    pub joint_posterior: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            length: 16,
            sample_count: 1,
            seed: None,
            map_to_scale: None,
            scale_range: (MIDI_PITCH_MIN, MIDI_PITCH_MAX),
            durations: vec![1.0],
            quantize: false,
            use_string_time: false,
            joint_posterior: false,
        }
    }
}

impl GeneratorOptions {
    /// Default options for sequences of `length` points
    pub fn new(length: usize) -> Self {
        Self {
            length,
            ..Self::default()
        }
    }

    pub fn with_sample_count(self, sample_count: usize) -> Self {
        Self {
            sample_count,
            ..self
        }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    pub fn with_scale(self, scale: Vec<f64>) -> Self {
        Self {
            map_to_scale: Some(scale),
            ..self
        }
    }

    pub fn with_scale_range(self, low: f64, high: f64) -> Self {
        Self {
            scale_range: (low, high),
            ..self
        }
    }

    pub fn with_durations(self, durations: Vec<f64>) -> Self {
        Self { durations, ..self }
    }

    pub fn with_quantize(self, quantize: bool) -> Self {
        Self { quantize, ..self }
    }

    pub fn with_string_time(self, use_string_time: bool) -> Self {
        Self {
            use_string_time,
            ..self
        }
    }

    pub fn with_joint_posterior(self, joint_posterior: bool) -> Self {
        Self {
            joint_posterior,
            ..self
        }
    }

    /// Check the options for values no generation can use
    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.length == 0 {
            return Err(GeneratorError::ZeroLength);
        }
        if self.sample_count == 0 {
            return Err(GeneratorError::ZeroSampleCount);
        }
        self.validate_mapping()
    }

    /// Check only the fields used by note mapping
    pub fn validate_mapping(&self) -> Result<(), GeneratorError> {
        if self.durations.is_empty() {
            return Err(GeneratorError::EmptyDurations);
        }
        if let Some(d) = self.durations.iter().find(|d| !(**d >= 0.0) || !d.is_finite()) {
            return Err(GeneratorError::InvalidDuration { duration: *d });
        }
        if matches!(&self.map_to_scale, Some(scale) if scale.is_empty()) {
            return Err(GeneratorError::EmptyScale);
        }
        let (low, high) = self.scale_range;
        if !(low.is_finite() && high.is_finite() && low <= high) {
            return Err(GeneratorError::InvalidRange { low, high });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = GeneratorOptions::default();
        assert_eq!(opts.sample_count, 1);
        assert_eq!(opts.scale_range, (0.0, 127.0));
        assert_eq!(opts.durations, vec![1.0]);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn validation_failures() {
        assert_eq!(
            GeneratorOptions::new(0).validate(),
            Err(GeneratorError::ZeroLength)
        );
        assert_eq!(
            GeneratorOptions::new(4).with_sample_count(0).validate(),
            Err(GeneratorError::ZeroSampleCount)
        );
        assert_eq!(
            GeneratorOptions::new(4).with_durations(vec![]).validate(),
            Err(GeneratorError::EmptyDurations)
        );
        assert_eq!(
            GeneratorOptions::new(4).with_durations(vec![1.0, -0.5]).validate(),
            Err(GeneratorError::InvalidDuration { duration: -0.5 })
        );
        assert_eq!(
            GeneratorOptions::new(4).with_scale(vec![]).validate(),
            Err(GeneratorError::EmptyScale)
        );
        assert_eq!(
            GeneratorOptions::new(4).with_scale_range(72.0, 60.0).validate(),
            Err(GeneratorError::InvalidRange {
                low: 72.0,
                high: 60.0
            })
        );
    }

    #[cfg(feature = "serde1")]
    #[test]
    fn partial_json_fills_defaults() {
        let opts: GeneratorOptions =
            serde_json::from_str(r#"{"length": 8, "scale_range": [60, 72]}"#)
                .unwrap();
        assert_eq!(opts.length, 8);
        assert_eq!(opts.scale_range, (60.0, 72.0));
        assert_eq!(opts.durations, vec![1.0]);
    }
}
