//! Live playback of a rendered mix through the default output device.

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info, warn};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Mono buffer plus read cursor shared with the audio callback
struct PlaybackState {
    samples: Vec<f32>,
    cursor: usize,
}

impl PlaybackState {
    /// Copy the next frame sample to every channel; silence once exhausted.
    fn fill(&mut self, data: &mut [f32], channels: usize) {
        for frame in data.chunks_mut(channels) {
            let sample = self.samples.get(self.cursor).copied().unwrap_or(0.0);
            self.cursor = (self.cursor + 1).min(self.samples.len());
            for channel in frame {
                *channel = sample;
            }
        }
    }

    fn finished(&self) -> bool {
        self.cursor >= self.samples.len()
    }
}

/// Audio output stream playing one buffer to completion
pub struct PlaybackSystem {
    state: Arc<Mutex<PlaybackState>>,

    /// Audio output stream (kept alive)
    _stream: cpal::Stream,
}

impl PlaybackSystem {
    /// Start playing `samples` at `sample_rate` on the default output device.
    pub fn start(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("No audio output device found"))?;

        let default_config = device
            .default_output_config()
            .context("Failed to get audio config")?;
        if default_config.sample_rate().0 != sample_rate {
            warn!(
                "device prefers {} Hz, requesting {} Hz",
                default_config.sample_rate().0,
                sample_rate
            );
        }

        let config = cpal::StreamConfig {
            channels: default_config.channels(),
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };
        let channels = config.channels.max(1) as usize;

        info!(
            "Audio: {} @ {}Hz, {} channel(s)",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate,
            channels
        );

        let state = Arc::new(Mutex::new(PlaybackState { samples, cursor: 0 }));
        let callback_state = Arc::clone(&state);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if let Ok(mut state) = callback_state.lock() {
                        state.fill(data, channels);
                    } else {
                        data.fill(0.0);
                    }
                },
                |err| error!("Audio stream error: {}", err),
                None,
            )
            .context("Failed to build audio stream")?;

        stream.play().context("Failed to start audio stream")?;

        Ok(Self {
            state,
            _stream: stream,
        })
    }

    pub fn finished(&self) -> bool {
        self.state.lock().map_or(true, |state| state.finished())
    }

    /// Block until the whole buffer has been handed to the device.
    pub fn wait(&self) {
        while !self.finished() {
            thread::sleep(Duration::from_millis(50));
        }
    }
}
