//! Timestamped commands for the audio engine.
//!
//! The control loop never calls into the audio graph directly. Every gain
//! write or voice start/stop becomes an [`AudioCommand`] carrying the time
//! (in the engine's clock, seconds) at which it takes effect. The engine
//! drains the queue and executes the commands in its own time domain.

use crate::params::detector_constants::{ATTACK_RAMP_S, RELEASE_RAMP_S, TRANSIENT_PEAK_GAIN};

/// Opaque reference to a transient voice living in the audio engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceHandle(u64);

impl VoiceHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Gain shape of a freshly started transient voice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampPlan {
    /// Gain reached at the end of the attack ramp
    pub peak_gain: f32,
    /// Linear ramp 0 → peak (seconds)
    pub attack_s: f64,
    /// Linear ramp peak → 0 (seconds); the voice stops when it completes
    pub release_s: f64,
}

impl Default for RampPlan {
    fn default() -> Self {
        Self {
            peak_gain: TRANSIENT_PEAK_GAIN,
            attack_s: ATTACK_RAMP_S,
            release_s: RELEASE_RAMP_S,
        }
    }
}

impl RampPlan {
    /// Total lifetime of an unreleased voice (seconds)
    pub fn duration_s(&self) -> f64 {
        self.attack_s + self.release_s
    }

    /// Gain breakpoints `(time, value)` for a voice starting at `start`
    pub fn breakpoints(&self, start: f64) -> [(f64, f32); 3] {
        [
            (start, 0.0),
            (start + self.attack_s, self.peak_gain),
            (start + self.duration_s(), 0.0),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    /// Set a continuous voice's gain immediately at `at`
    SetContinuousGain { index: usize, gain: f32, at: f64 },
    /// Start a transient voice at `at` following `plan`
    StartTransient {
        voice: VoiceHandle,
        index: usize,
        frequency: f32,
        plan: RampPlan,
        at: f64,
    },
    /// Ramp a transient voice from its current gain to 0 over `ramp_s`
    /// starting at `at`, then stop it
    StopTransient {
        voice: VoiceHandle,
        at: f64,
        ramp_s: f64,
    },
}

impl AudioCommand {
    /// Time at which the command takes effect
    pub fn at(&self) -> f64 {
        match self {
            AudioCommand::SetContinuousGain { at, .. }
            | AudioCommand::StartTransient { at, .. }
            | AudioCommand::StopTransient { at, .. } => *at,
        }
    }
}

/// Output queue of commands plus the voice handle allocator
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: Vec<AudioCommand>,
    next_voice: u64,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: AudioCommand) {
        self.pending.push(command);
    }

    /// Allocate a handle that has never been issued by this queue
    pub fn allocate_voice(&mut self) -> VoiceHandle {
        let handle = VoiceHandle(self.next_voice);
        self.next_voice += 1;
        handle
    }

    /// Commands queued since the last drain, oldest first
    pub fn pending(&self) -> &[AudioCommand] {
        &self.pending
    }

    pub fn drain(&mut self) -> Vec<AudioCommand> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ramp_plan() {
        let plan = RampPlan::default();
        assert_eq!(plan.peak_gain, 0.05);
        assert!((plan.duration_s() - 0.51).abs() < 1e-9);

        let points = plan.breakpoints(2.0);
        assert_eq!(points[0], (2.0, 0.0));
        assert!((points[1].0 - 2.01).abs() < 1e-9);
        assert!((points[2].0 - 2.51).abs() < 1e-9);
        assert_eq!(points[2].1, 0.0);
    }

    #[test]
    fn test_handles_are_unique_and_drain_empties() {
        let mut queue = CommandQueue::new();
        let a = queue.allocate_voice();
        let b = queue.allocate_voice();
        assert_ne!(a, b);

        queue.push(AudioCommand::StopTransient {
            voice: a,
            at: 1.0,
            ramp_s: 0.5,
        });
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain()[0].at(), 1.0);
        assert!(queue.is_empty());
    }
}
