// Small real-time DSP helpers for the output path

/// Flush near-zero values to exactly zero
///
/// Denormal floats are slow on some CPUs; the smoother state can decay into
/// that range between clicks.
#[inline]
pub fn flush_denormals_to_zero(x: f32) -> f32 {
    if x.abs() < 1e-15 { 0.0 } else { x }
}

/// Clamp the output into [-1, 1]
///
/// Click waveforms are pre-scaled, so this only guards against extreme
/// volume settings.
#[inline]
pub fn clip_guard(x: f32) -> f32 {
    x.clamp(-1.0, 1.0)
}

/// One-pole low-pass smoother for parameter changes
///
/// y[n] = y[n-1] + α * (x[n] - y[n-1]); keeps volume moves from clicking.
pub struct OnePoleSmoother {
    current: f32,
    coefficient: f32,
}

impl OnePoleSmoother {
    /// `time_constant_ms` is the time to cover ~63% of a step change
    pub fn new(initial_value: f32, time_constant_ms: f32, sample_rate: f32) -> Self {
        let time_constant_samples = time_constant_ms * 0.001 * sample_rate;
        Self {
            current: initial_value,
            coefficient: (1.0 / time_constant_samples).min(1.0),
        }
    }

    #[inline]
    pub fn process(&mut self, target: f32) -> f32 {
        self.current += self.coefficient * (target - self.current);
        self.current = flush_denormals_to_zero(self.current);
        self.current
    }

    #[inline]
    pub fn reset(&mut self, value: f32) {
        self.current = value;
    }
}
