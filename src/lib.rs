//! Unison library - live note detection driving a synthesized voice bank

pub mod audio;
pub mod bank;
pub mod cli;
pub mod commands;
pub mod detector;
pub mod envelope;
pub mod error;
pub mod notes;
pub mod params;
pub mod range;
pub mod system;

pub use commands::{AudioCommand, VoiceHandle};
pub use error::ConfigError;
pub use system::{TickResult, UnisonSystem};
