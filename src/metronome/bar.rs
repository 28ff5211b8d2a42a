// Bar builder - one bar of click audio at a fixed tempo
//
// Each beat occupies floor(samples_per_beat) samples in the buffer: the
// click transient at slot offset 0, silence for the rest. The fractional
// remainder of samples_per_beat is not baked into the buffer; it travels
// with the track and is realized at playback time by the drift tracker.

use crate::metronome::sounds::ClickSounds;
use crate::metronome::timeline::{Tempo, TimeSignature};
use crate::metronome::{MetronomeError, MetronomeResult};

/// One bar of click audio plus the playback metadata derived from it
///
/// Immutable once built. Construction happens on the control thread; the
/// finished track is handed to the audio side wholesale, never mutated in
/// place.
#[derive(Debug, Clone)]
pub struct ClickTrack {
    samples: Vec<f32>,
    nominal_step: usize,
    beats_per_bar: usize,
    beat_fraction: f64,
}

impl ClickTrack {
    /// Build one bar of samples for the given tempo and meter
    ///
    /// Pure function: no shared state, safe to call while a previous bar is
    /// playing. Click waveforms longer than a beat slot are truncated to the
    /// slot.
    pub fn build(
        tempo: Tempo,
        time_signature: TimeSignature,
        sample_rate: u32,
        sounds: &ClickSounds,
    ) -> MetronomeResult<Self> {
        if sample_rate == 0 {
            return Err(MetronomeError::InvalidParameter(
                "sample rate must be > 0".to_string(),
            ));
        }

        let samples_per_beat = tempo.samples_per_beat(sample_rate);
        let nominal_step = samples_per_beat.floor() as usize;
        if nominal_step == 0 {
            return Err(MetronomeError::InvalidParameter(format!(
                "{} leaves no room for a beat at {} Hz",
                tempo, sample_rate
            )));
        }

        let beats_per_bar = time_signature.beats_per_bar();
        let mut samples = vec![0.0f32; nominal_step * beats_per_bar];

        for beat in 0..beats_per_bar {
            let click = if beat == 0 {
                sounds.accent()
            } else {
                sounds.regular()
            };
            let slot = &mut samples[beat * nominal_step..(beat + 1) * nominal_step];
            let len = click.len().min(slot.len());
            slot[..len].copy_from_slice(&click[..len]);
        }

        Ok(Self {
            samples,
            nominal_step,
            beats_per_bar,
            beat_fraction: samples_per_beat.fract(),
        })
    }

    /// The bar's sample data
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Bar length in samples (`nominal_step * beats_per_bar`)
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Integer per-beat step, `floor(samples_per_beat)`
    pub fn nominal_step(&self) -> usize {
        self.nominal_step
    }

    pub fn beats_per_bar(&self) -> usize {
        self.beats_per_bar
    }

    /// Fractional part of samples_per_beat, the per-beat drift contribution
    pub fn beat_fraction(&self) -> f64 {
        self.beat_fraction
    }
}
