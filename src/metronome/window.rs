// Window generator - sliding window over the looping bar buffer
//
// Owns the current bar and the read cursor, the single source of truth for
// where in the bar playback is. pull() copies frames into a caller buffer,
// wrapping across the bar end indefinitely. At each beat boundary the drift
// tracker supplies a corrected step: a stretched beat holds the last sample
// of its slot one sample longer, a shrunk beat leaves the slot one sample
// early, so the click transient at the next slot start is never duplicated
// or cut short. The pull path never allocates; the buffer is replaced only
// through install(), off the audio thread's back.

use crate::metronome::bar::ClickTrack;
use crate::metronome::drift::{DriftPolicy, DriftTracker};

#[derive(Debug, Clone)]
pub struct WindowGenerator {
    track: ClickTrack,
    drift: DriftTracker,
    cursor: usize,
    beat_index: usize,
    beat_remaining: usize,
    bars_elapsed: u64,
}

impl WindowGenerator {
    /// Start a generator at the top of the bar
    pub fn new(track: ClickTrack, policy: DriftPolicy) -> Self {
        let drift = DriftTracker::new(track.beat_fraction(), policy);
        let beat_remaining = track.nominal_step();
        Self {
            track,
            drift,
            cursor: 0,
            beat_index: 0,
            beat_remaining,
            bars_elapsed: 0,
        }
    }

    /// Fill `out` with the next frames of the click track
    ///
    /// Runs on the audio thread: no allocation, no locking, exact output
    /// length. Splitting a request into several smaller ones yields the same
    /// sample sequence.
    pub fn pull(&mut self, out: &mut [f32]) {
        let step = self.track.nominal_step();

        for frame in out.iter_mut() {
            *frame = self.track.samples()[self.cursor];

            self.beat_remaining -= 1;
            if self.beat_remaining == 0 {
                self.enter_next_beat();
            } else {
                // Hold the slot's last sample while a stretched beat plays out
                let slot_last = (self.beat_index + 1) * step - 1;
                if self.cursor < slot_last {
                    self.cursor += 1;
                }
            }
        }
    }

    fn enter_next_beat(&mut self) {
        self.beat_index += 1;
        if self.beat_index == self.track.beats_per_bar() {
            self.beat_index = 0;
            self.bars_elapsed += 1;
        }
        self.cursor = self.beat_index * self.track.nominal_step();
        self.beat_remaining = self.drift.advance_beat(self.track.nominal_step());
    }

    /// Replace the bar, keeping the fractional position within it
    ///
    /// The cursor is remapped to `round(fraction * new_len)`, so a listener
    /// hears the new tempo continue from the equivalent point of the bar
    /// instead of restarting on the downbeat. The partial beat in progress
    /// finishes at its nominal length; drift correction resumes at the next
    /// boundary.
    pub fn install(&mut self, track: ClickTrack) {
        let fraction = self.cursor as f64 / self.track.len() as f64;
        let mut cursor = (fraction * track.len() as f64).round() as usize;
        if cursor >= track.len() {
            // Rounding up past the bar end lands on the next downbeat
            cursor = 0;
        }

        self.drift.set_beat_fraction(track.beat_fraction());
        self.beat_index = cursor / track.nominal_step();
        self.beat_remaining = (self.beat_index + 1) * track.nominal_step() - cursor;
        self.cursor = cursor;
        self.track = track;
    }

    /// Rewind to the top of the bar and clear drift state
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.beat_index = 0;
        self.beat_remaining = self.track.nominal_step();
        self.bars_elapsed = 0;
        self.drift.reset();
    }

    /// Current sample index into the bar buffer
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Fractional progress through the bar, in [0, 1)
    pub fn bar_fraction(&self) -> f64 {
        self.cursor as f64 / self.track.len() as f64
    }

    /// Beat currently sounding, 0-based within the bar
    pub fn beat_index(&self) -> usize {
        self.beat_index
    }

    /// Bars completed since the last reset
    pub fn bars_elapsed(&self) -> u64 {
        self.bars_elapsed
    }

    pub fn track(&self) -> &ClickTrack {
        &self.track
    }

    pub fn drift(&self) -> &DriftTracker {
        &self.drift
    }
}
