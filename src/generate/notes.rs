//! Mapping numeric traces to note records
use itertools::{Itertools, MinMaxResult};

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use super::{GeneratorError, GeneratorOptions, TimeFormat};

/// Onset of a note, either in beats or as a formatted time string
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(untagged))]
pub enum NoteTime {
    Beats(f64),
    BarsBeatsTicks(String),
}

impl NoteTime {
    /// The onset in beats, if the time is numeric
    pub fn beats(&self) -> Option<f64> {
        match self {
            Self::Beats(b) => Some(*b),
            Self::BarsBeatsTicks(_) => None,
        }
    }
}

/// A single note. `duration` is in beats.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Note {
    pub pitch: f64,
    pub duration: f64,
    pub time: NoteTime,
}

/// Rescale `values` into pitches.
///
/// The trace is normalized against its own minimum and maximum, then either
/// stretched over `opts.scale_range` or snapped to the nearest degree of
/// `opts.map_to_scale`. A constant trace maps every value to the middle of
/// the target.
pub fn map_pitches(
    values: &[f64],
    opts: &GeneratorOptions,
) -> Result<Vec<f64>, GeneratorError> {
    opts.validate_mapping()?;

    let normalized: Vec<f64> = match values.iter().minmax() {
        MinMaxResult::NoElements => return Ok(Vec::new()),
        MinMaxResult::MinMax(&min, &max) if max > min => values
            .iter()
            .map(|v| ((v - min) / (max - min)).clamp(0.0, 1.0))
            .collect(),
        _ => {
            tracing::warn!(
                n = values.len(),
                "constant trace; mapping to the middle of the range"
            );
            vec![0.5; values.len()]
        }
    };

    let (low, high) = opts.scale_range;
    let pitches = normalized.into_iter().map(|t| {
        let pitch = match &opts.map_to_scale {
            Some(scale) => {
                let ix = (t * (scale.len() - 1) as f64).round() as usize;
                scale[ix.min(scale.len() - 1)]
            }
            None => low + t * (high - low),
        };
        if opts.quantize {
            pitch.round()
        } else {
            pitch
        }
    });

    Ok(pitches.collect())
}

/// Onsets for `n` notes placed back to back with durations cycled from
/// `durations`
pub fn sequential_times(n: usize, durations: &[f64]) -> Vec<f64> {
    durations
        .iter()
        .cycle()
        .take(n)
        .scan(0.0, |t, d| {
            let onset = *t;
            *t += d;
            Some(onset)
        })
        .collect()
}

/// Convert a numeric trace into notes.
///
/// With `times` the onsets are copied from it (it must have one entry per
/// value); otherwise notes are placed sequentially. Durations are assigned
/// cyclically from `opts.durations`.
///
/// # Example
///
/// ```
/// use kernelgen::generate::{to_notes, BarsBeatsTicks, GeneratorOptions, NoteTime};
///
/// let opts = GeneratorOptions::new(3).with_scale_range(60.0, 72.0);
/// let notes = to_notes(&[0.0, 1.0, 0.5], None, &opts, &BarsBeatsTicks::default()).unwrap();
///
/// assert_eq!(notes[0].pitch, 60.0);
/// assert_eq!(notes[1].pitch, 72.0);
/// assert_eq!(notes[2].pitch, 66.0);
/// assert_eq!(notes[2].time, NoteTime::Beats(2.0));
/// ```
pub fn to_notes(
    values: &[f64],
    times: Option<&[f64]>,
    opts: &GeneratorOptions,
    time_format: &dyn TimeFormat,
) -> Result<Vec<Note>, GeneratorError> {
    let pitches = map_pitches(values, opts)?;

    let onsets = match times {
        Some(ts) if ts.len() != values.len() => {
            return Err(GeneratorError::TimeAxisLength {
                expected: values.len(),
                found: ts.len(),
            })
        }
        Some(ts) => ts.to_vec(),
        None => sequential_times(values.len(), &opts.durations),
    };

    let notes = pitches
        .into_iter()
        .zip(onsets)
        .zip(opts.durations.iter().cycle())
        .map(|((pitch, onset), &duration)| {
            let time = if opts.use_string_time {
                NoteTime::BarsBeatsTicks(time_format.offset_to_time(onset))
            } else {
                NoteTime::Beats(onset)
            };
            Note {
                pitch,
                duration,
                time,
            }
        })
        .collect();

    Ok(notes)
}
