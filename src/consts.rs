//! Mathematical constants and engine defaults

/// 0.5 ln(2π)
pub const HALF_LN_2PI: f64 = 0.918_938_533_204_672_7;
/// ln(2π)
pub const LN_2PI: f64 = 1.837_877_066_409_345_3;

/// Diagonal jitter added to a training covariance when none is given
pub const DEFAULT_JITTER: f64 = 1E-10;

/// Lowest MIDI pitch
pub const MIDI_PITCH_MIN: f64 = 0.0;
/// Highest MIDI pitch
pub const MIDI_PITCH_MAX: f64 = 127.0;

/// Diagonal noise added to a generator's covariance when none is given
pub const DEFAULT_NOISE: f64 = 1E-6;
