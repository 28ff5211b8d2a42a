// Drift tracker - fractional-sample error accumulation and correction
//
// Representing one beat with an integer number of samples discards the
// fractional part of samples_per_beat. That remainder is accumulated once
// per beat, and whenever it leaves [-0.5, 0.5] the next beat is stretched
// or shrunk by exactly one sample. Cumulative timing error therefore never
// exceeds half a sample.

/// What happens to accumulated drift when the tempo changes mid-playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriftPolicy {
    /// Keep the accumulated phase error across tempo changes
    #[default]
    CarryAcrossTempoChanges,
    /// Start every new tempo with a clean accumulator
    ResetOnTempoChange,
}

/// Per-beat drift accounting
#[derive(Debug, Clone)]
pub struct DriftTracker {
    accumulator: f64,
    beat_fraction: f64,
    policy: DriftPolicy,
}

impl DriftTracker {
    /// Create a tracker for a tempo whose samples_per_beat has the given
    /// fractional part
    pub fn new(beat_fraction: f64, policy: DriftPolicy) -> Self {
        Self {
            accumulator: 0.0,
            beat_fraction,
            policy,
        }
    }

    /// Cross one beat boundary and return the corrected step for the next
    /// beat
    ///
    /// `nominal_step` is floor(samples_per_beat); the result differs from it
    /// by at most one sample, and after the call the accumulator is back in
    /// [-0.5, 0.5].
    pub fn advance_beat(&mut self, nominal_step: usize) -> usize {
        self.accumulator += self.beat_fraction;

        if self.accumulator > 0.5 {
            self.accumulator -= 1.0;
            nominal_step + 1
        } else if self.accumulator < -0.5 {
            self.accumulator += 1.0;
            // A beat can never shrink to zero samples
            nominal_step.saturating_sub(1).max(1)
        } else {
            nominal_step
        }
    }

    /// Install the per-beat fraction of a new tempo
    ///
    /// The accumulator survives or resets according to the policy chosen at
    /// construction.
    pub fn set_beat_fraction(&mut self, beat_fraction: f64) {
        self.beat_fraction = beat_fraction;
        if self.policy == DriftPolicy::ResetOnTempoChange {
            self.accumulator = 0.0;
        }
    }

    /// Clear accumulated error (playback restarting from the top of a bar)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    /// Current accumulated error in samples
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn policy(&self) -> DriftPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drift_sequence_145_bpm_16khz() {
        // samples_per_beat = 16000 * 60 / 145 = 6620.6896...
        let spb: f64 = 16000.0 * 60.0 / 145.0;
        let nominal = spb.floor() as usize;
        let mut tracker = DriftTracker::new(spb.fract(), DriftPolicy::default());
        assert_eq!(nominal, 6620);

        // First beat: 0.6896 > 0.5, so the step grows by one and the
        // accumulator drops to -0.3103
        let step = tracker.advance_beat(nominal);
        assert_eq!(step, 6621);
        assert!((tracker.accumulator() - (-0.310_344_827_586)).abs() < 1e-9);

        // Second beat: -0.3103 + 0.6896 = 0.3793, no correction
        let step = tracker.advance_beat(nominal);
        assert_eq!(step, 6620);
        assert!((tracker.accumulator() - 0.379_310_344_827).abs() < 1e-9);
    }

    #[test]
    fn test_accumulator_always_bounded() {
        // Any sequence of tempos must leave the accumulator in [-0.5, 0.5]
        // after every advance
        let tempos = [145.0, 97.3, 200.0, 61.7, 300.0, 45.9, 120.0];
        let mut tracker = DriftTracker::new(0.0, DriftPolicy::default());

        for &bpm in &tempos {
            let spb: f64 = 48000.0 * 60.0 / bpm;
            tracker.set_beat_fraction(spb.fract());
            for _ in 0..1000 {
                let step = tracker.advance_beat(spb.floor() as usize);
                assert!(tracker.accumulator() >= -0.5);
                assert!(tracker.accumulator() <= 0.5);
                assert!((step as f64 - spb.floor()).abs() <= 1.0);
            }
        }
    }

    #[test]
    fn test_long_run_average_matches_true_beat_length() {
        let spb: f64 = 16000.0 * 60.0 / 145.0;
        let nominal = spb.floor() as usize;
        let mut tracker = DriftTracker::new(spb.fract(), DriftPolicy::default());

        let beats = 10_000u64;
        let total: u64 = (0..beats).map(|_| tracker.advance_beat(nominal) as u64).sum();

        // The emitted sample count may differ from the ideal only by the
        // residual accumulator, i.e. at most half a sample overall
        let ideal = spb * beats as f64;
        assert!((total as f64 - ideal).abs() <= 0.5);
    }

    #[test]
    fn test_integer_tempo_needs_no_correction() {
        // 120 BPM at 48kHz is exactly 24000 samples per beat
        let spb: f64 = 48000.0 * 60.0 / 120.0;
        let mut tracker = DriftTracker::new(spb.fract(), DriftPolicy::default());

        for _ in 0..100 {
            assert_eq!(tracker.advance_beat(24000), 24000);
            assert_eq!(tracker.accumulator(), 0.0);
        }
    }

    #[test]
    fn test_carry_policy_preserves_accumulator() {
        let mut tracker = DriftTracker::new(0.6897, DriftPolicy::CarryAcrossTempoChanges);
        tracker.advance_beat(6620);
        let acc = tracker.accumulator();
        assert!(acc != 0.0);

        tracker.set_beat_fraction(0.25);
        assert_eq!(tracker.accumulator(), acc);
    }

    #[test]
    fn test_reset_policy_clears_accumulator() {
        let mut tracker = DriftTracker::new(0.6897, DriftPolicy::ResetOnTempoChange);
        tracker.advance_beat(6620);
        assert!(tracker.accumulator() != 0.0);

        tracker.set_beat_fraction(0.25);
        assert_eq!(tracker.accumulator(), 0.0);
    }

    #[test]
    fn test_reset_clears_accumulator() {
        let mut tracker = DriftTracker::new(0.6897, DriftPolicy::default());
        tracker.advance_beat(6620);
        tracker.reset();
        assert_eq!(tracker.accumulator(), 0.0);
    }
}
