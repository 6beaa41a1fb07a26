//! Continuous voices: one per monitored frequency, gain follows the ratio.

use crate::commands::{AudioCommand, CommandQueue};
use crate::params::detector_constants::CONTINUOUS_VOLUME;

/// Gains of the continuous voices, one per table entry
pub struct OscillatorBank {
    gains: Vec<f32>,
}

impl OscillatorBank {
    /// Silent bank with `len` voices
    pub fn new(len: usize) -> Self {
        Self {
            gains: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.gains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gains.is_empty()
    }

    /// Last gain written to each voice
    pub fn gains(&self) -> &[f32] {
        &self.gains
    }

    /// Mirror the adjusted ratio onto voice `index`, effective at `now`.
    pub fn follow(
        &mut self,
        index: usize,
        adjusted_ratio: f32,
        now: f64,
        queue: &mut CommandQueue,
    ) {
        self.set_gain(index, adjusted_ratio * CONTINUOUS_VOLUME, now, queue);
    }

    /// Silence voice `index` at `now`.
    pub fn mute(&mut self, index: usize, now: f64, queue: &mut CommandQueue) {
        self.set_gain(index, 0.0, now, queue);
    }

    fn set_gain(&mut self, index: usize, gain: f32, now: f64, queue: &mut CommandQueue) {
        if let Some(slot) = self.gains.get_mut(index) {
            *slot = gain;
            queue.push(AudioCommand::SetContinuousGain {
                index,
                gain,
                at: now,
            });
        }
    }
}
