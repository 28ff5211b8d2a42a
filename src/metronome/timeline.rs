// Timeline - Musical time parameters
// Tempo and time signature value types shared by the bar builder and the UI

use crate::metronome::{MetronomeError, MetronomeResult};
use std::fmt;

/// Time signature (numerator/denominator)
/// Example: 4/4 time = TimeSignature { numerator: 4, denominator: 4 }
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    pub numerator: u8,   // Beats per bar (typically 3, 4, 5, 6, 7)
    pub denominator: u8, // Note value (4 = quarter note, 8 = eighth note)
}

impl TimeSignature {
    /// Creates a new time signature
    ///
    /// The numerator must be positive and the denominator a power of two.
    pub fn new(numerator: u8, denominator: u8) -> MetronomeResult<Self> {
        if numerator == 0 {
            return Err(MetronomeError::InvalidParameter(
                "time signature numerator must be > 0".to_string(),
            ));
        }
        if !denominator.is_power_of_two() {
            return Err(MetronomeError::InvalidParameter(format!(
                "time signature denominator must be a power of two, got {}",
                denominator
            )));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Common 4/4 time signature
    pub fn four_four() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }

    /// Common 3/4 time signature (waltz)
    pub fn three_four() -> Self {
        Self {
            numerator: 3,
            denominator: 4,
        }
    }

    /// Common 6/8 time signature
    pub fn six_eight() -> Self {
        Self {
            numerator: 6,
            denominator: 8,
        }
    }

    /// Number of beat slots in one bar
    pub fn beats_per_bar(&self) -> usize {
        self.numerator as usize
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::four_four()
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Tempo in BPM (Beats Per Minute)
///
/// Any strictly positive value is accepted, integer or not; the UI narrows
/// the range to what its slider can express.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tempo {
    bpm: f64,
}

impl Tempo {
    /// Creates a new tempo, rejecting non-positive or non-finite values
    pub fn new(bpm: f64) -> MetronomeResult<Self> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(MetronomeError::InvalidParameter(format!(
                "tempo must be strictly positive, got {}",
                bpm
            )));
        }
        Ok(Self { bpm })
    }

    /// Get BPM value
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Duration of one beat in seconds
    pub fn beat_duration_seconds(&self) -> f64 {
        60.0 / self.bpm
    }

    /// Real-valued number of samples in one beat at the given sample rate
    ///
    /// The integer part is the nominal per-beat step of the bar buffer; the
    /// fractional part is the per-beat drift contribution.
    pub fn samples_per_beat(&self, sample_rate: u32) -> f64 {
        sample_rate as f64 * 60.0 / self.bpm
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self { bpm: 120.0 }
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} BPM", self.bpm)
    }
}
