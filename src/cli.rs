//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

use crate::notes::NOTE_COUNT;
use crate::params::{AnalysisConfig, DetectorSettings, PlaybackConfig};
use crate::range::FilterRange;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "unison")]
#[command(about = "Detects sounding notes in audio and plays them back on a voice bank", long_about = None)]
pub struct Args {
    /// Input WAV file to analyse
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Write the mixed result to this WAV file
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Play the mixed result on the default output device
    #[arg(long)]
    pub play: bool,

    /// Sharpening exponent on the normalized ratio
    #[arg(long, value_name = "F", default_value = "16")]
    pub factor_power: f32,

    /// Attack/release threshold on the adjusted ratio, 0..1
    #[arg(long, value_name = "F", default_value = "0.8")]
    pub factor_attack: f32,

    /// Confidence needed before a note counts as detected
    #[arg(long, value_name = "F", default_value = "5")]
    pub confidence_threshold: f32,

    /// Lowest monitored note index (C0 = 0)
    #[arg(long, value_name = "INDEX", default_value = "0")]
    pub filter_low: usize,

    /// One past the highest monitored note index
    #[arg(long, value_name = "INDEX", default_value_t = NOTE_COUNT)]
    pub filter_high: usize,

    /// Control ticks per second
    #[arg(long, value_name = "HZ", default_value = "60")]
    pub tick_rate: f32,

    /// FFT window size (power of 2)
    #[arg(long, value_name = "N", default_value = "32768")]
    pub fft_size: usize,

    /// Gain of the original audio in the mix
    #[arg(long, value_name = "G", default_value = "0.1")]
    pub source_gain: f32,
}

impl Args {
    pub fn detector_settings(&self) -> DetectorSettings {
        DetectorSettings {
            factor_power: self.factor_power,
            factor_attack: self.factor_attack,
            confidence_threshold: self.confidence_threshold,
        }
    }

    pub fn filter_range(&self) -> FilterRange {
        FilterRange {
            low: self.filter_low,
            high: self.filter_high,
        }
    }

    /// Analysis configuration for a clip recorded at `sample_rate`
    pub fn analysis_config(&self, sample_rate: u32) -> AnalysisConfig {
        AnalysisConfig {
            sample_rate_hz: sample_rate as f32,
            fft_size: self.fft_size,
            tick_rate_hz: self.tick_rate,
            ..Default::default()
        }
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            source_gain: self.source_gain,
            ..Default::default()
        }
    }
}
