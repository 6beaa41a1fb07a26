//! Voice renderer executing timestamped audio commands.
//!
//! Holds one square-wave continuous voice per monitored frequency plus any
//! number of transient voices. Commands are applied at the first sample at
//! or after their timestamp, so envelope timing follows the command clock
//! rather than the tick rate.

use std::collections::BTreeMap;

use crate::commands::{AudioCommand, VoiceHandle};

/// Linear gain automation defined by `(time, value)` breakpoints
#[derive(Debug, Clone, Default)]
pub struct GainAutomation {
    points: Vec<(f64, f32)>,
}

impl GainAutomation {
    pub fn new(points: &[(f64, f32)]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }

    /// Gain at time `t`: held before the first and after the last breakpoint
    pub fn value_at(&self, t: f64) -> f32 {
        let Some(&(first_t, first_v)) = self.points.first() else {
            return 0.0;
        };
        if t <= first_t {
            return first_v;
        }
        for pair in self.points.windows(2) {
            let (t0, v0) = pair[0];
            let (t1, v1) = pair[1];
            if t <= t1 {
                if t1 <= t0 {
                    return v1;
                }
                let frac = ((t - t0) / (t1 - t0)) as f32;
                return v0 + (v1 - v0) * frac;
            }
        }
        self.points.last().map_or(0.0, |&(_, v)| v)
    }

    /// Freeze the current value at `t`, dropping every later breakpoint.
    pub fn cancel_and_hold(&mut self, t: f64) {
        let held = self.value_at(t);
        self.points.retain(|&(time, _)| time < t);
        self.points.push((t, held));
    }

    /// Append a linear ramp ending at `(t, value)`.
    pub fn ramp_to(&mut self, t: f64, value: f32) {
        self.points.push((t, value));
    }
}

/// Square wave, phase in [0, 1)
pub fn square(phase: f32) -> f32 {
    if phase < 0.5 {
        1.0
    } else {
        -1.0
    }
}

struct ContinuousVoice {
    frequency: f32,
    phase: f32,
    gain: f32,
}

struct TransientVoice {
    frequency: f32,
    phase: f32,
    gain: GainAutomation,
    start_at: f64,
    stop_at: f64,
}

/// Renders square-wave voices from timestamped commands
pub struct Synthesizer {
    sample_rate: f32,
    continuous: Vec<ContinuousVoice>,
    transients: BTreeMap<VoiceHandle, TransientVoice>,
    pending: Vec<AudioCommand>,
    position: u64,
}

impl Synthesizer {
    /// Silent renderer with one continuous voice per frequency
    pub fn new(sample_rate: f32, frequencies: &[f32]) -> Self {
        let continuous = frequencies
            .iter()
            .map(|&frequency| ContinuousVoice {
                frequency,
                phase: 0.0,
                gain: 0.0,
            })
            .collect();

        Self {
            sample_rate: sample_rate.max(1.0),
            continuous,
            transients: BTreeMap::new(),
            pending: Vec::new(),
            position: 0,
        }
    }

    /// Time of the next sample to be rendered (seconds)
    pub fn now(&self) -> f64 {
        self.position as f64 / self.sample_rate as f64
    }

    /// Transient voices not yet stopped
    pub fn active_transients(&self) -> usize {
        self.transients.len()
    }

    pub fn continuous_gain(&self, index: usize) -> Option<f32> {
        self.continuous.get(index).map(|voice| voice.gain)
    }

    /// Queue commands for execution at their timestamps.
    pub fn schedule(&mut self, commands: impl IntoIterator<Item = AudioCommand>) {
        self.pending.extend(commands);
        // stable: same-time commands keep issue order
        self.pending.sort_by(|a, b| a.at().total_cmp(&b.at()));
    }

    /// Render the next `out.len()` samples, overwriting `out`.
    pub fn render(&mut self, out: &mut [f32]) {
        let sample_rate = self.sample_rate;
        for slot in out.iter_mut() {
            let t = self.now();
            self.apply_due(t);

            let mut mix = 0.0;
            for voice in &mut self.continuous {
                if voice.gain != 0.0 {
                    mix += square(voice.phase) * voice.gain;
                }
                voice.phase = (voice.phase + voice.frequency / sample_rate).fract();
            }
            for voice in self.transients.values_mut() {
                if t >= voice.start_at && t < voice.stop_at {
                    mix += square(voice.phase) * voice.gain.value_at(t);
                    voice.phase = (voice.phase + voice.frequency / sample_rate).fract();
                }
            }
            *slot = mix;

            self.position += 1;
        }

        let end = self.now();
        self.transients.retain(|_, voice| voice.stop_at > end);
    }

    fn apply_due(&mut self, t: f64) {
        let due = self.pending.partition_point(|command| command.at() <= t);
        if due == 0 {
            return;
        }
        let commands: Vec<AudioCommand> = self.pending.drain(..due).collect();
        for command in commands {
            self.apply(command);
        }
    }

    fn apply(&mut self, command: AudioCommand) {
        match command {
            AudioCommand::SetContinuousGain { index, gain, .. } => {
                if let Some(voice) = self.continuous.get_mut(index) {
                    voice.gain = gain;
                }
            }
            AudioCommand::StartTransient {
                voice,
                frequency,
                plan,
                at,
                ..
            } => {
                self.transients.insert(
                    voice,
                    TransientVoice {
                        frequency,
                        phase: 0.0,
                        gain: GainAutomation::new(&plan.breakpoints(at)),
                        start_at: at,
                        stop_at: at + plan.duration_s(),
                    },
                );
            }
            AudioCommand::StopTransient { voice, at, ramp_s } => {
                // Already-finished voices have been dropped; nothing to do
                if let Some(transient) = self.transients.get_mut(&voice) {
                    let end = at + ramp_s;
                    transient.gain.cancel_and_hold(at);
                    transient.gain.ramp_to(end, 0.0);
                    transient.stop_at = transient.stop_at.min(end);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandQueue, RampPlan};

    const RATE: f32 = 1_000.0;

    fn start(queue: &mut CommandQueue, at: f64) -> (VoiceHandle, AudioCommand) {
        let voice = queue.allocate_voice();
        (
            voice,
            AudioCommand::StartTransient {
                voice,
                index: 0,
                frequency: 100.0,
                plan: RampPlan::default(),
                at,
            },
        )
    }

    #[test]
    fn test_automation_interpolates_and_holds() {
        let mut gain = GainAutomation::new(&RampPlan::default().breakpoints(0.0));
        assert_eq!(gain.value_at(-1.0), 0.0);
        assert!((gain.value_at(0.005) - 0.025).abs() < 1e-6);
        assert!((gain.value_at(0.01) - 0.05).abs() < 1e-6);
        assert!((gain.value_at(0.26) - 0.025).abs() < 1e-6);
        assert_eq!(gain.value_at(5.0), 0.0);

        gain.cancel_and_hold(0.26);
        gain.ramp_to(0.76, 0.0);
        assert!((gain.value_at(0.26) - 0.025).abs() < 1e-6);
        assert!((gain.value_at(0.51) - 0.0125).abs() < 1e-6);
    }

    #[test]
    fn test_continuous_gain_applies_at_timestamp() {
        let mut synth = Synthesizer::new(RATE, &[250.0]);
        synth.schedule([AudioCommand::SetContinuousGain {
            index: 0,
            gain: 0.1,
            at: 0.004,
        }]);

        let mut out = vec![0.0; 8];
        synth.render(&mut out);
        assert_eq!(&out[..4], &[0.0; 4]);
        assert!(out[4..].iter().all(|s| s.abs() == 0.1));
        assert_eq!(synth.continuous_gain(0), Some(0.1));
    }

    #[test]
    fn test_transient_stops_after_natural_release() {
        let mut queue = CommandQueue::new();
        let mut synth = Synthesizer::new(RATE, &[]);
        let (_, command) = start(&mut queue, 0.0);
        synth.schedule([command]);

        let mut out = vec![0.0; 500];
        synth.render(&mut out);
        assert_eq!(synth.active_transients(), 1);
        assert!(out[10].abs() > 0.04);

        let mut out = vec![0.0; 20];
        synth.render(&mut out);
        assert_eq!(synth.active_transients(), 0);
        assert!(out[15..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_early_release_ramps_from_current_gain() {
        let mut queue = CommandQueue::new();
        let mut synth = Synthesizer::new(RATE, &[]);
        let (voice, command) = start(&mut queue, 0.0);
        synth.schedule([
            command,
            AudioCommand::StopTransient {
                voice,
                at: 0.1,
                ramp_s: 0.5,
            },
        ]);

        let mut out = vec![0.0; 1000];
        synth.render(&mut out);

        // the earlier natural stop at 0.51 s still wins over 0.6 s
        assert!(out[505].abs() > 0.0);
        assert!(out[515..].iter().all(|&s| s == 0.0));
        assert_eq!(synth.active_transients(), 0);
    }

    #[test]
    fn test_release_of_finished_voice_is_ignored() {
        let mut queue = CommandQueue::new();
        let mut synth = Synthesizer::new(RATE, &[]);
        let (voice, command) = start(&mut queue, 0.0);
        synth.schedule([command]);
        synth.render(&mut vec![0.0f32; 600]);

        synth.schedule([AudioCommand::StopTransient {
            voice,
            at: 0.7,
            ramp_s: 0.5,
        }]);
        let mut out = vec![0.0; 200];
        synth.render(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }
}
