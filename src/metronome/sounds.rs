// Click sounds - pre-rendered accent and regular click waveforms
//
// By default both clicks are synthesized (short sine burst with an
// exponential decay, the accent pitched higher and louder). A hi/lo pair of
// WAV files can be loaded instead; anything mis-shaped falls back to
// synthesis at the call site.

use crate::audio::format::i16_to_f32;
use crate::metronome::{MetronomeError, MetronomeResult};
use std::f32::consts::PI;
use std::path::Path;

/// Pre-rendered click waveform pair used to build the bar buffer
#[derive(Debug, Clone)]
pub struct ClickSounds {
    accent: Vec<f32>,
    regular: Vec<f32>,
}

impl ClickSounds {
    /// Duration of a synthesized click
    const CLICK_DURATION_MS: f32 = 10.0;

    /// Synthesize the default click pair at the given sample rate
    pub fn synthesized(sample_rate: u32) -> Self {
        let num_samples =
            ((Self::CLICK_DURATION_MS / 1000.0) * sample_rate as f32) as usize;

        Self {
            accent: render_click(sample_rate, num_samples, 1200.0, 0.6),
            regular: render_click(sample_rate, num_samples, 800.0, 0.4),
        }
    }

    /// Wrap caller-provided waveforms, validating both
    pub fn from_waveforms(accent: Vec<f32>, regular: Vec<f32>) -> MetronomeResult<Self> {
        validate_waveform("accent", &accent)?;
        validate_waveform("regular", &regular)?;
        Ok(Self { accent, regular })
    }

    /// Load the accent (hi) and regular (lo) clicks from WAV files
    ///
    /// Multi-channel files are folded to mono. Files must already be at the
    /// stream's sample rate; there is no resampling here.
    pub fn from_wav_files(
        hi_path: impl AsRef<Path>,
        lo_path: impl AsRef<Path>,
        sample_rate: u32,
    ) -> MetronomeResult<Self> {
        let accent = load_wav(hi_path.as_ref(), sample_rate)?;
        let regular = load_wav(lo_path.as_ref(), sample_rate)?;
        Self::from_waveforms(accent, regular)
    }

    /// Waveform placed at the start of beat 1 of each bar
    pub fn accent(&self) -> &[f32] {
        &self.accent
    }

    /// Waveform placed at the start of every other beat
    pub fn regular(&self) -> &[f32] {
        &self.regular
    }
}

/// Render a short click: sine oscillator under an exponential decay envelope
fn render_click(sample_rate: u32, num_samples: usize, frequency: f32, amplitude: f32) -> Vec<f32> {
    let mut samples = Vec::with_capacity(num_samples);
    let phase_increment = 2.0 * PI * frequency / sample_rate as f32;

    for i in 0..num_samples {
        let t = i as f32 / num_samples as f32;
        let envelope = (-t * 8.0).exp();

        let phase = i as f32 * phase_increment;
        samples.push(phase.sin() * envelope * amplitude);
    }

    samples
}

/// A waveform is usable if it has at least one sample and every sample is a
/// finite number
fn validate_waveform(name: &str, samples: &[f32]) -> MetronomeResult<()> {
    if samples.is_empty() {
        return Err(MetronomeError::InvalidParameter(format!(
            "{} click waveform is empty",
            name
        )));
    }
    if samples.iter().any(|s| !s.is_finite()) {
        return Err(MetronomeError::InvalidParameter(format!(
            "{} click waveform contains non-finite samples",
            name
        )));
    }
    Ok(())
}

/// Decode a WAV file into mono f32 samples
fn load_wav(path: &Path, sample_rate: u32) -> MetronomeResult<Vec<f32>> {
    let mut reader = hound::WavReader::open(path).map_err(|e| {
        MetronomeError::InvalidParameter(format!("cannot open {}: {}", path.display(), e))
    })?;
    let spec = reader.spec();

    if spec.sample_rate != sample_rate {
        return Err(MetronomeError::InvalidParameter(format!(
            "{} is {} Hz but the stream runs at {} Hz",
            path.display(),
            spec.sample_rate,
            sample_rate
        )));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| {
                MetronomeError::InvalidParameter(format!(
                    "cannot decode {}: {}",
                    path.display(),
                    e
                ))
            })?,
        hound::SampleFormat::Int => reader
            .samples::<i16>()
            .map(|s| s.map(i16_to_f32))
            .collect::<Result<_, _>>()
            .map_err(|e| {
                MetronomeError::InvalidParameter(format!(
                    "cannot decode {}: {}",
                    path.display(),
                    e
                ))
            })?,
    };

    let channels = spec.channels as usize;
    if channels <= 1 {
        return Ok(interleaved);
    }

    // Fold interleaved channels down to mono
    let mono = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();
    Ok(mono)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesized_click_pair() {
        let sounds = ClickSounds::synthesized(48000);

        // 10ms at 48kHz = 480 samples, same length for both clicks
        assert_eq!(sounds.accent().len(), 480);
        assert_eq!(sounds.regular().len(), 480);

        // Accent should be louder (higher peak amplitude)
        let accent_peak = sounds.accent().iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        let regular_peak = sounds
            .regular()
            .iter()
            .map(|s| s.abs())
            .fold(0.0f32, f32::max);
        assert!(accent_peak > regular_peak);

        // Everything must be finite and within amplitude bounds
        for &s in sounds.accent().iter().chain(sounds.regular()) {
            assert!(s.is_finite());
            assert!(s.abs() <= 1.0);
        }
    }

    #[test]
    fn test_waveform_validation() {
        // Empty waveform rejected
        assert!(ClickSounds::from_waveforms(vec![], vec![0.5]).is_err());
        assert!(ClickSounds::from_waveforms(vec![0.5], vec![]).is_err());

        // Non-finite samples rejected
        assert!(ClickSounds::from_waveforms(vec![f32::NAN], vec![0.5]).is_err());
        assert!(ClickSounds::from_waveforms(vec![0.5], vec![f32::INFINITY]).is_err());

        // Plain short waveforms accepted
        let sounds = ClickSounds::from_waveforms(vec![1.0, 0.5], vec![0.8, 0.4]).unwrap();
        assert_eq!(sounds.accent(), &[1.0, 0.5]);
        assert_eq!(sounds.regular(), &[0.8, 0.4]);
    }

    #[test]
    fn test_wav_loading_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let hi = dir.path().join("hi.wav");
        let lo = dir.path().join("lo.wav");

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&hi, spec).unwrap();
        for s in [0.9f32, 0.3, 0.1] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let mut writer = hound::WavWriter::create(&lo, spec).unwrap();
        for s in [0.5f32, 0.2] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let sounds = ClickSounds::from_wav_files(&hi, &lo, 16000).unwrap();
        assert_eq!(sounds.accent().len(), 3);
        assert_eq!(sounds.regular().len(), 2);
        assert!((sounds.accent()[0] - 0.9).abs() < 1e-6);

        // A sample-rate mismatch is rejected, not resampled
        assert!(ClickSounds::from_wav_files(&hi, &lo, 48000).is_err());
    }

    #[test]
    fn test_wav_loading_stereo_fold() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");

        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 16000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        // Two frames: (1.0, 0.0) and (0.5, 0.5)
        for s in [1.0f32, 0.0, 0.5, 0.5] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let sounds = ClickSounds::from_wav_files(&path, &path, 16000).unwrap();
        assert_eq!(sounds.accent().len(), 2);
        assert!((sounds.accent()[0] - 0.5).abs() < 1e-6);
        assert!((sounds.accent()[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_missing_wav_file() {
        let err = ClickSounds::from_wav_files("/nonexistent/hi.wav", "/nonexistent/lo.wav", 48000);
        assert!(err.is_err());
    }
}
