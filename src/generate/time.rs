//! Conversion between beat offsets and `bars:beats:ticks` strings
use std::fmt;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// A pair of pure conversions between a numeric offset in beats and a
/// musical time string.
pub trait TimeFormat: fmt::Debug {
    /// Render an offset (in beats) as a time string
    fn offset_to_time(&self, beats: f64) -> String;

    /// Parse a time string back into an offset in beats
    fn time_to_offset(&self, time: &str) -> Result<f64, TimeFormatError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum TimeFormatError {
    /// The string does not have the `bars:beats:ticks` shape
    Malformed { time: String },
}

/// Zero-based `bars:beats:ticks` time strings.
///
/// # Example
///
/// ```
/// use kernelgen::generate::{BarsBeatsTicks, TimeFormat};
///
/// let fmt = BarsBeatsTicks::default();
/// assert_eq!(fmt.offset_to_time(5.5), "1:1:240");
/// assert_eq!(fmt.time_to_offset("1:1:240"), Ok(5.5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct BarsBeatsTicks {
    pub beats_per_bar: u32,
    pub ticks_per_beat: u32,
}

impl Default for BarsBeatsTicks {
    fn default() -> Self {
        Self {
            beats_per_bar: 4,
            ticks_per_beat: 480,
        }
    }
}

impl TimeFormat for BarsBeatsTicks {
    fn offset_to_time(&self, beats: f64) -> String {
        let tpb = u64::from(self.ticks_per_beat.max(1));
        let bpb = u64::from(self.beats_per_bar.max(1));
        // negative offsets clamp to the downbeat
        let total_ticks = (beats.max(0.0) * tpb as f64).round() as u64;
        let total_beats = total_ticks / tpb;
        let ticks = total_ticks % tpb;
        format!("{}:{}:{}", total_beats / bpb, total_beats % bpb, ticks)
    }

    fn time_to_offset(&self, time: &str) -> Result<f64, TimeFormatError> {
        let malformed = || TimeFormatError::Malformed {
            time: time.to_string(),
        };
        // fields are non-negative integers, as written by `offset_to_time`
        let parts = time
            .trim()
            .split(':')
            .map(|p| p.trim().parse::<u32>().map_err(|_| malformed()))
            .collect::<Result<Vec<u32>, _>>()?;

        match parts.as_slice() {
            [bars, beats, ticks] => Ok(f64::from(*bars)
                * f64::from(self.beats_per_bar)
                + f64::from(*beats)
                + f64::from(*ticks) / f64::from(self.ticks_per_beat.max(1))),
            _ => Err(malformed()),
        }
    }
}

impl std::error::Error for TimeFormatError {}

impl fmt::Display for TimeFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { time } => {
                write!(f, "malformed bars:beats:ticks time: {time:?}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_beats() {
        let fmt = BarsBeatsTicks::default();
        assert_eq!(fmt.offset_to_time(0.0), "0:0:0");
        assert_eq!(fmt.offset_to_time(3.0), "0:3:0");
        assert_eq!(fmt.offset_to_time(4.0), "1:0:0");
        assert_eq!(fmt.offset_to_time(9.0), "2:1:0");
    }

    #[test]
    fn fractional_beats_round_to_ticks() {
        let fmt = BarsBeatsTicks::default();
        assert_eq!(fmt.offset_to_time(0.25), "0:0:120");
        // 3.9999999 rounds up to the next bar rather than 480 ticks
        assert_eq!(fmt.offset_to_time(3.999_999_9), "1:0:0");
        assert_eq!(fmt.offset_to_time(-2.0), "0:0:0");
    }

    #[test]
    fn parse_time_strings() {
        let fmt = BarsBeatsTicks {
            beats_per_bar: 3,
            ticks_per_beat: 96,
        };
        assert_eq!(fmt.time_to_offset("2:1:48"), Ok(7.5));
        assert_eq!(fmt.time_to_offset(" 0:0:0 "), Ok(0.0));
        assert_eq!(
            fmt.time_to_offset("1:2"),
            Err(TimeFormatError::Malformed {
                time: "1:2".to_string()
            })
        );
        assert!(fmt.time_to_offset("a:b:c").is_err());
    }

    #[test]
    fn non_finite_and_negative_fields_are_malformed() {
        let fmt = BarsBeatsTicks::default();
        for time in ["NaN:0:0", "inf:0:0", "-1:0:0", "0:-1:0", "0:0:1.5"] {
            assert_eq!(
                fmt.time_to_offset(time),
                Err(TimeFormatError::Malformed {
                    time: time.to_string()
                })
            );
        }
    }
}
