//! Transient voice gating driven by the adjusted ratio.
//!
//! Attack and release share one threshold: a ratio hovering around
//! `factor_attack` starts and releases a voice on every crossing.

use log::trace;

use crate::commands::{AudioCommand, CommandQueue, RampPlan};
use crate::detector::HistoryState;
use crate::notes::FrequencyEntry;
use crate::params::detector_constants::RELEASE_RAMP_S;

/// Outcome of one envelope update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Attack,
    Release,
    Unchanged,
}

/// Starts and releases transient voices as the ratio crosses the threshold
#[derive(Debug, Clone, Default)]
pub struct EnvelopeController {
    plan: RampPlan,
}

impl EnvelopeController {
    pub fn new(plan: RampPlan) -> Self {
        Self { plan }
    }

    /// Apply the threshold rule for one entry.
    pub fn update(
        &self,
        entry: &FrequencyEntry,
        state: &mut HistoryState,
        adjusted_ratio: f32,
        factor_attack: f32,
        now: f64,
        queue: &mut CommandQueue,
    ) -> Transition {
        if adjusted_ratio > factor_attack {
            if self.attack(entry, state, now, queue) {
                return Transition::Attack;
            }
        } else if self.release(state, now, queue) {
            return Transition::Release;
        }
        Transition::Unchanged
    }

    /// Start a transient voice unless one is already owned. Returns whether
    /// a voice was started.
    pub fn attack(
        &self,
        entry: &FrequencyEntry,
        state: &mut HistoryState,
        now: f64,
        queue: &mut CommandQueue,
    ) -> bool {
        if state.active_voice.is_some() {
            return false;
        }
        let voice = queue.allocate_voice();
        queue.push(AudioCommand::StartTransient {
            voice,
            index: entry.index,
            frequency: entry.frequency,
            plan: self.plan,
            at: now,
        });
        state.active_voice = Some(voice);
        trace!("attack index={} voice={}", entry.index, voice.id());
        true
    }

    /// Schedule an early release of the owned voice, if any, and forget the
    /// handle right away. Returns whether a release was issued.
    pub fn release(&self, state: &mut HistoryState, now: f64, queue: &mut CommandQueue) -> bool {
        let Some(voice) = state.active_voice.take() else {
            return false;
        };
        queue.push(AudioCommand::StopTransient {
            voice,
            at: now,
            ramp_s: RELEASE_RAMP_S,
        });
        trace!("release voice={}", voice.id());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> FrequencyEntry {
        FrequencyEntry {
            frequency: 440.0,
            index: 57,
            bin_index: 150,
        }
    }

    #[test]
    fn test_attack_is_idempotent() {
        let controller = EnvelopeController::default();
        let mut state = HistoryState::default();
        let mut queue = CommandQueue::new();

        assert!(controller.attack(&entry(), &mut state, 0.0, &mut queue));
        assert!(!controller.attack(&entry(), &mut state, 0.1, &mut queue));

        assert_eq!(queue.len(), 1);
        assert!(state.active_voice.is_some());
        match &queue.pending()[0] {
            AudioCommand::StartTransient {
                index,
                frequency,
                at,
                ..
            } => {
                assert_eq!(*index, 57);
                assert_eq!(*frequency, 440.0);
                assert_eq!(*at, 0.0);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_release_is_idempotent() {
        let controller = EnvelopeController::default();
        let mut state = HistoryState::default();
        let mut queue = CommandQueue::new();

        controller.attack(&entry(), &mut state, 0.0, &mut queue);
        queue.drain();
        let voice = state.active_voice.unwrap();

        assert!(controller.release(&mut state, 1.0, &mut queue));
        assert!(!controller.release(&mut state, 1.1, &mut queue));

        assert!(state.active_voice.is_none());
        assert_eq!(
            queue.drain(),
            vec![AudioCommand::StopTransient {
                voice,
                at: 1.0,
                ramp_s: 0.5,
            }]
        );
    }

    #[test]
    fn test_update_uses_a_single_threshold() {
        let controller = EnvelopeController::default();
        let mut state = HistoryState::default();
        let mut queue = CommandQueue::new();

        assert_eq!(
            controller.update(&entry(), &mut state, 0.8, 0.8, 0.0, &mut queue),
            Transition::Unchanged
        );
        assert_eq!(
            controller.update(&entry(), &mut state, 0.81, 0.8, 0.0, &mut queue),
            Transition::Attack
        );
        assert_eq!(
            controller.update(&entry(), &mut state, 0.8, 0.8, 0.1, &mut queue),
            Transition::Release
        );
    }
}
