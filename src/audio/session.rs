//! Offline driver: analyse a clip tick by tick and render the voices.
//!
//! Each tick at time `t` sees the spectrum of the audio just before `t`,
//! runs the control loop, hands the resulting commands to the synthesizer
//! and renders audio up to the next tick. The clip running out ends the
//! session; there is no retry.

use std::collections::BTreeMap;

use log::{debug, info};

use super::fft::SpectrumAnalyzer;
use super::synthesis::Synthesizer;
use crate::error::ConfigError;
use crate::params::{AnalysisConfig, DetectorSettings, PlaybackConfig};
use crate::range::FilterRange;
use crate::system::UnisonSystem;

/// Summary of a finished session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionReport {
    pub ticks: usize,
    pub attacks: usize,
    pub releases: usize,
    /// Ticks each note label spent detected
    pub detections: BTreeMap<String, usize>,
}

/// Offline analysis and rendering of one clip
pub struct Session {
    analysis: AnalysisConfig,
    playback: PlaybackConfig,
    system: UnisonSystem,
    analyzer: SpectrumAnalyzer,
    synth: Synthesizer,
    spectrum: Vec<u8>,
}

impl Session {
    pub fn new(
        analysis: AnalysisConfig,
        playback: PlaybackConfig,
        settings: DetectorSettings,
        range: FilterRange,
    ) -> Result<Self, ConfigError> {
        let analyzer = SpectrumAnalyzer::new(analysis.clone())?;
        let mut system = UnisonSystem::new(analysis.bin_size_hz(), analysis.bin_count())?;
        system.set_settings(settings)?;
        system.set_range(range.low, range.high, 0.0)?;

        let frequencies: Vec<f32> = system
            .table()
            .entries()
            .iter()
            .map(|entry| entry.frequency)
            .collect();
        let synth = Synthesizer::new(analysis.sample_rate_hz, &frequencies);
        let spectrum = vec![0; analysis.bin_count()];

        Ok(Self {
            analysis,
            playback,
            system,
            analyzer,
            synth,
            spectrum,
        })
    }

    pub fn system(&self) -> &UnisonSystem {
        &self.system
    }

    /// Process `source` end to end, returning the mixed output and a report.
    pub fn run(&mut self, source: &[f32]) -> (Vec<f32>, SessionReport) {
        let sample_rate = self.analysis.sample_rate_hz;
        let hop = self.analysis.hop_samples();
        let mut output = vec![0.0; source.len()];
        let mut report = SessionReport::default();

        for start in (0..source.len()).step_by(hop) {
            let end = (start + hop).min(source.len());
            let now = self.synth.now();

            self.analyzer.byte_frequency_data(&source[..start], &mut self.spectrum);
            let result = self.system.tick(&self.spectrum, now);
            self.synth.schedule(self.system.drain_commands());
            self.synth.render(&mut output[start..end]);

            report.ticks += 1;
            report.attacks += result.attacks;
            report.releases += result.releases;
            if !result.detected.is_empty() {
                let labels = result.labels();
                debug!("{:>8.3}s {}", now, labels.join(" "));
                for label in labels {
                    *report.detections.entry(label).or_default() += 1;
                }
            }
        }

        self.mix_source(source, &mut output);

        info!(
            "{} ticks at {} Hz, {} attacks, {} releases, {} notes detected",
            report.ticks,
            self.analysis.tick_rate_hz,
            report.attacks,
            report.releases,
            report.detections.len()
        );
        debug!("output length {:.2}s", output.len() as f32 / sample_rate);

        (output, report)
    }

    /// Add the delayed, attenuated source and clip to the limiter.
    fn mix_source(&self, source: &[f32], output: &mut [f32]) {
        let delay = self.playback.delay_samples(self.analysis.sample_rate_hz);
        let gain = self.playback.source_gain;
        let limit = self.playback.limiter;

        for (i, slot) in output.iter_mut().enumerate() {
            if let Some(sample) = i.checked_sub(delay).and_then(|j| source.get(j)) {
                *slot += sample * gain;
            }
            *slot = slot.clamp(-limit, limit);
        }
    }
}
