//! Byte magnitude spectrum analysis.
//!
//! Produces the 0–255 per-bin readings the detector consumes: Blackman
//! window, forward FFT, magnitude normalized by the window length, decibel
//! conversion and linear mapping of `[min_decibels, max_decibels]` onto the
//! byte range. No smoothing between frames.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::params::AnalysisConfig;

/// Byte spectrum analyzer over a fixed FFT window
pub struct SpectrumAnalyzer {
    config: AnalysisConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
}

impl SpectrumAnalyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let window = (0..config.fft_size)
            .map(|i| blackman_window(i, config.fft_size))
            .collect();
        let buffer = vec![Complex::new(0.0, 0.0); config.fft_size];

        Ok(Self {
            config,
            fft,
            window,
            buffer,
        })
    }

    pub fn bin_count(&self) -> usize {
        self.config.bin_count()
    }

    /// Analyze the most recent `fft_size` samples of `samples`.
    ///
    /// A shorter history is zero-padded at the front, as at stream start.
    /// `out` is filled up to `bin_count` entries.
    pub fn byte_frequency_data(&mut self, samples: &[f32], out: &mut [u8]) {
        let size = self.config.fft_size;
        let recent = &samples[samples.len().saturating_sub(size)..];
        let padding = size - recent.len();

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < padding { 0.0 } else { recent[i - padding] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);

        let scale = 1.0 / size as f32;
        for (slot, bin) in out.iter_mut().zip(&self.buffer[..self.bin_count()]) {
            *slot = magnitude_to_byte(
                bin.norm() * scale,
                self.config.min_decibels,
                self.config.max_decibels,
            );
        }
    }
}

/// Blackman window (alpha = 0.16) for FFT analysis
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let x = index as f32 / size as f32;
    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
}

/// Map a linear magnitude onto 0–255 across the decibel window.
pub fn magnitude_to_byte(magnitude: f32, min_decibels: f32, max_decibels: f32) -> u8 {
    if magnitude <= 0.0 {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = 255.0 * (db - min_decibels) / (max_decibels - min_decibels);
    scaled.floor().clamp(0.0, 255.0) as u8
}
