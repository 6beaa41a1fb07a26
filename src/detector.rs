//! Per-tick note detection over a byte magnitude spectrum.
//!
//! For each monitored frequency the detector measures how much its bin
//! stands out against the bins of its neighbouring notes, normalizes that
//! against the loudest monitored bin of the frame, sharpens it with a power
//! curve, and accumulates confidence while the reading keeps rising.

use std::ops::Range;

use crate::commands::VoiceHandle;
use crate::notes::FrequencyTable;
use crate::params::detector_constants::{DECAY, PROMINENCE_WEIGHT};
use crate::params::DetectorSettings;

/// Detection history of one monitored frequency
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryState {
    /// Reading of the previous tick this entry was processed
    pub previous_value: u8,
    /// Loudest rising reading seen so far
    pub max_value: u8,
    /// Accumulated confidence, never negative
    pub confidence: f32,
    /// Transient voice currently owned by this entry
    pub active_voice: Option<VoiceHandle>,
}

impl HistoryState {
    /// Fold one reading into the confidence accumulator.
    ///
    /// A rising reading adds the adjusted ratio; anything else decays the
    /// accumulator multiplicatively.
    pub fn accumulate(&mut self, value: u8, adjusted_ratio: f32) {
        if value > self.previous_value {
            self.confidence += adjusted_ratio;
            self.max_value = self.max_value.max(value);
        } else {
            self.confidence *= DECAY;
        }
        self.previous_value = value;
    }
}

/// Prominence-weighted value of a bin against its two neighbours.
///
/// Never exceeds `value`: peaks keep their raw reading, non-peaks are pulled
/// down toward 75% of it.
pub fn relative_value(value: u8, value_a: u8, value_z: u8) -> f32 {
    let value = value as f32;
    let area_volume = value + value_a as f32 + value_z as f32;
    let prominence = if area_volume > 0.0 {
        value / (area_volume / 3.0)
    } else {
        0.0
    };
    let blended = value * prominence * PROMINENCE_WEIGHT + value * (1.0 - PROMINENCE_WEIGHT);
    value.min(blended)
}

/// Normalize against the frame maximum and apply the sharpening curve.
pub fn adjusted_ratio(relative: f32, frame_max: f32, factor_power: f32) -> f32 {
    let safe_ratio = (relative / frame_max.max(1.0)).clamp(0.0, 1.0);
    safe_ratio.powf(factor_power)
}

/// What the detector saw on one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectorFrame {
    /// Adjusted ratio per table index; 0 for indices outside the range
    pub ratios: Vec<f32>,
    /// Indices whose confidence is above the threshold, ascending
    pub detected: Vec<usize>,
    /// Loudest monitored reading of the frame, floored at 1
    pub frame_max: f32,
}

/// Note detector owning the history of every monitored frequency
#[derive(Debug, Clone)]
pub struct NoteDetector {
    history: Vec<HistoryState>,
}

impl NoteDetector {
    /// Zeroed history for `len` monitored frequencies
    pub fn new(len: usize) -> Self {
        Self {
            history: vec![HistoryState::default(); len],
        }
    }

    pub fn history(&self) -> &[HistoryState] {
        &self.history
    }

    pub fn state_mut(&mut self, index: usize) -> Option<&mut HistoryState> {
        self.history.get_mut(index)
    }

    /// Run one detection pass over `range` of the table.
    ///
    /// # Arguments
    /// * `table` - Monitored frequencies and their bins
    /// * `spectrum` - Byte magnitudes, one per bin (missing bins read as 0)
    /// * `range` - Half-open index window to process
    /// * `settings` - Settings snapshot for this tick
    pub fn analyze(
        &mut self,
        table: &FrequencyTable,
        spectrum: &[u8],
        range: Range<usize>,
        settings: &DetectorSettings,
    ) -> DetectorFrame {
        let count = table.len().min(self.history.len());
        let range = range.start.min(count)..range.end.min(count);
        let read = |index: usize| -> u8 {
            spectrum
                .get(table.index_to_bin(index))
                .copied()
                .unwrap_or(0)
        };

        let frame_max = range
            .clone()
            .map(read)
            .max()
            .map_or(1.0, |max| (max as f32).max(1.0));

        let mut ratios = vec![0.0; count];
        let mut detected = Vec::new();

        for index in range {
            let value = read(index);
            let value_a = read(index.saturating_sub(1));
            let value_z = read((index + 1).min(count - 1));

            let relative = relative_value(value, value_a, value_z);
            let ratio = adjusted_ratio(relative, frame_max, settings.factor_power);
            ratios[index] = ratio;

            let state = &mut self.history[index];
            state.accumulate(value, ratio);
            if state.confidence > settings.confidence_threshold {
                detected.push(index);
            }
        }

        DetectorFrame {
            ratios,
            detected,
            frame_max,
        }
    }
}
