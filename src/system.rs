//! Detection and voice control loop.
//!
//! [`UnisonSystem::tick`] is the whole per-frame update: it runs to
//! completion, never waits on the audio engine, and leaves its audio side
//! effects as timestamped commands in an internal queue for the engine to
//! drain.

use log::debug;

use crate::bank::OscillatorBank;
use crate::commands::{AudioCommand, CommandQueue, RampPlan};
use crate::detector::{HistoryState, NoteDetector};
use crate::envelope::{EnvelopeController, Transition};
use crate::error::ConfigError;
use crate::notes::{self, FrequencyTable};
use crate::params::DetectorSettings;
use crate::range::FilterRange;

/// What one tick produced for display
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickResult {
    /// Adjusted ratio per table index (0 outside the filter range)
    pub ratios: Vec<f32>,
    /// Detected indices, ascending, recomputed every tick
    pub detected: Vec<usize>,
    /// Transient voices started this tick
    pub attacks: usize,
    /// Transient voices released this tick
    pub releases: usize,
}

impl TickResult {
    /// Note labels of the detected indices
    pub fn labels(&self) -> Vec<String> {
        self.detected.iter().map(|&index| notes::label(index)).collect()
    }
}

/// Control loop from byte spectrum to voice commands
pub struct UnisonSystem {
    table: FrequencyTable,
    detector: NoteDetector,
    envelope: EnvelopeController,
    bank: OscillatorBank,
    range: FilterRange,
    settings: DetectorSettings,
    staged: Option<DetectorSettings>,
    queue: CommandQueue,
}

impl UnisonSystem {
    /// Build the chromatic table for a spectrum of `bin_count` bins, each
    /// `bin_size_hz` wide.
    ///
    /// The bin width is the analyzer's frequency resolution
    /// (`sample_rate / fft_size`), not the sample rate spread over the bins.
    pub fn new(bin_size_hz: f32, bin_count: usize) -> Result<Self, ConfigError> {
        Ok(Self::with_table(chromatic_table(bin_size_hz, bin_count)?))
    }

    /// Build around an existing table with default settings and full range.
    pub fn with_table(table: FrequencyTable) -> Self {
        let len = table.len();
        Self {
            detector: NoteDetector::new(len),
            envelope: EnvelopeController::new(RampPlan::default()),
            bank: OscillatorBank::new(len),
            range: FilterRange::full(len),
            settings: DetectorSettings::default(),
            staged: None,
            queue: CommandQueue::new(),
            table,
        }
    }

    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }

    pub fn history(&self) -> &[HistoryState] {
        self.detector.history()
    }

    pub fn continuous_gains(&self) -> &[f32] {
        self.bank.gains()
    }

    pub fn range(&self) -> FilterRange {
        self.range
    }

    /// Settings in effect for the current tick
    pub fn settings(&self) -> DetectorSettings {
        self.settings
    }

    /// Validate and stage new settings; they take effect on the next tick.
    pub fn set_settings(&mut self, settings: DetectorSettings) -> Result<(), ConfigError> {
        settings.validate()?;
        self.staged = Some(settings);
        Ok(())
    }

    /// Change the filter window.
    ///
    /// Every index outside the new window has its transient voice released
    /// and its continuous voice silenced at `now`. Detection history is left
    /// alone so an index re-entering the window resumes where it left off.
    pub fn set_range(&mut self, low: usize, high: usize, now: f64) -> Result<(), ConfigError> {
        let range = FilterRange { low, high };
        range.validate(self.table.len())?;
        self.range = range;

        for index in range.excluded(self.table.len()) {
            if let Some(state) = self.detector.state_mut(index) {
                self.envelope.release(state, now, &mut self.queue);
            }
            self.bank.mute(index, now, &mut self.queue);
        }
        debug!("filter range now {:?}", range.active());
        Ok(())
    }

    /// Rebuild the table for a new spectrum geometry and discard all history.
    ///
    /// Voices owned by the old history are released and the continuous
    /// voices silenced before the reset.
    pub fn reinitialize(
        &mut self,
        bin_size_hz: f32,
        bin_count: usize,
        now: f64,
    ) -> Result<(), ConfigError> {
        let table = chromatic_table(bin_size_hz, bin_count)?;

        for index in 0..self.table.len() {
            if let Some(state) = self.detector.state_mut(index) {
                self.envelope.release(state, now, &mut self.queue);
            }
            self.bank.mute(index, now, &mut self.queue);
        }

        let len = table.len();
        self.detector = NoteDetector::new(len);
        self.bank = OscillatorBank::new(len);
        if self.range.validate(len).is_err() {
            self.range = FilterRange::full(len);
        }
        self.table = table;
        debug!(
            "reinitialized: {} notes, bin size {:.3} Hz",
            len,
            self.table.bin_size_hz()
        );
        Ok(())
    }

    /// Run one control tick over `spectrum` at engine time `now` (seconds).
    pub fn tick(&mut self, spectrum: &[u8], now: f64) -> TickResult {
        if let Some(staged) = self.staged.take() {
            self.settings = staged;
        }
        let settings = self.settings;
        let active = self.range.active();

        let frame = self
            .detector
            .analyze(&self.table, spectrum, active.clone(), &settings);

        let mut attacks = 0;
        let mut releases = 0;
        for index in active {
            let (Some(entry), Some(state)) =
                (self.table.entry(index), self.detector.state_mut(index))
            else {
                continue;
            };
            let ratio = frame.ratios[index];

            match self.envelope.update(
                entry,
                state,
                ratio,
                settings.factor_attack,
                now,
                &mut self.queue,
            ) {
                Transition::Attack => attacks += 1,
                Transition::Release => releases += 1,
                Transition::Unchanged => {}
            }
            self.bank.follow(index, ratio, now, &mut self.queue);
        }

        TickResult {
            ratios: frame.ratios,
            detected: frame.detected,
            attacks,
            releases,
        }
    }

    /// Commands queued since the last drain
    pub fn pending_commands(&self) -> &[AudioCommand] {
        self.queue.pending()
    }

    /// Hand queued commands to the audio engine.
    pub fn drain_commands(&mut self) -> Vec<AudioCommand> {
        self.queue.drain()
    }
}

fn chromatic_table(bin_size_hz: f32, bin_count: usize) -> Result<FrequencyTable, ConfigError> {
    if !bin_size_hz.is_finite() || bin_size_hz <= 0.0 {
        return Err(ConfigError::BinSize(bin_size_hz));
    }
    if bin_count == 0 {
        return Err(ConfigError::BinCount(bin_count));
    }
    Ok(FrequencyTable::chromatic(bin_size_hz, bin_count))
}
