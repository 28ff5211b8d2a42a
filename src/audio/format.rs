// Sample format conversion for CPAL streams and WAV import
//
// Internal processing is mono f32; conversion to the device format happens
// while writing the output buffer, without allocation.

use cpal::{FromSample, Sample};

/// Write one mono f32 sample to every channel of an interleaved output frame
#[inline]
pub fn write_mono_frame<T>(sample: f32, output_frame: &mut [T])
where
    T: Sample + FromSample<f32>,
{
    for channel_sample in output_frame.iter_mut() {
        *channel_sample = T::from_sample(sample);
    }
}

/// Convert an i16 sample to f32 in [-1.0, 1.0] (WAV import path)
#[inline]
pub fn i16_to_f32(sample: i16) -> f32 {
    if sample >= 0 {
        sample as f32 / i16::MAX as f32
    } else {
        sample as f32 / -(i16::MIN as f32)
    }
}
