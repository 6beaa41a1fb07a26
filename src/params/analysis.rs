//! Spectrum analysis configuration.

use crate::error::ConfigError;

/// Analysis configuration: FFT window, byte scaling and tick cadence
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Audio sample rate (Hz)
    pub sample_rate_hz: f32,

    /// FFT window size (must be power of 2)
    /// 32768 @ 48kHz gives ~1.5 Hz bins, fine enough to split most low semitones
    pub fft_size: usize,

    /// Control tick rate (Hz), ~60 matches a display refresh
    pub tick_rate_hz: f32,

    /// Magnitude mapped to byte 0 (dBFS)
    pub min_decibels: f32,

    /// Magnitude mapped to byte 255 (dBFS)
    pub max_decibels: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 48_000.0,
            fft_size: 32_768,
            tick_rate_hz: 60.0,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalysisConfig {
    /// Number of spectrum bins handed to the detector each tick
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Width of one bin (Hz): the FFT resolution, `sample_rate / fft_size`
    pub fn bin_size_hz(&self) -> f32 {
        self.sample_rate_hz / self.fft_size as f32
    }

    /// Samples between two ticks
    pub fn hop_samples(&self) -> usize {
        ((self.sample_rate_hz / self.tick_rate_hz).round() as usize).max(1)
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 32 {
            return Err(ConfigError::FftSize(self.fft_size));
        }
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(ConfigError::SampleRate(self.sample_rate_hz));
        }
        if !self.tick_rate_hz.is_finite() || self.tick_rate_hz <= 0.0 {
            return Err(ConfigError::TickRate(self.tick_rate_hz));
        }
        if !(self.min_decibels < self.max_decibels) {
            return Err(ConfigError::DecibelRange {
                min: self.min_decibels,
                max: self.max_decibels,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_geometry() {
        let config = AnalysisConfig::default();

        // 48000 Hz over a 32768-point FFT ≈ 1.46 Hz per bin
        assert_eq!(config.bin_count(), 16_384);
        assert!((config.bin_size_hz() - 1.4648).abs() < 0.001);
        // the last bin sits just under Nyquist
        let top = config.bin_size_hz() * (config.bin_count() - 1) as f32;
        assert!(top < config.sample_rate_hz / 2.0);
        assert_eq!(config.hop_samples(), 800);
    }

    #[test]
    fn test_validate() {
        assert!(AnalysisConfig::default().validate().is_ok());

        let odd = AnalysisConfig {
            fft_size: 1000,
            ..Default::default()
        };
        assert_eq!(odd.validate(), Err(ConfigError::FftSize(1000)));

        let silent = AnalysisConfig {
            tick_rate_hz: 0.0,
            ..Default::default()
        };
        assert!(silent.validate().is_err());
    }
}
