//! Output mixing configuration.

/// How the analysed source is mixed back with the synthesized voices
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Gain applied to the source before mixing
    pub source_gain: f32,

    /// Delay applied to the source so it lines up with the voices (seconds)
    pub source_delay_s: f32,

    /// Hard clip level on the final mix
    pub limiter: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            source_gain: 0.1,
            source_delay_s: 0.15,
            limiter: 0.98,
        }
    }
}

impl PlaybackConfig {
    /// Source delay in whole samples at `sample_rate_hz`
    pub fn delay_samples(&self, sample_rate_hz: f32) -> usize {
        (self.source_delay_s.max(0.0) * sample_rate_hz).round() as usize
    }
}
