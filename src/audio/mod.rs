//! Audio analysis, voice rendering and playback.
//!
//! Supplies the collaborators around the control loop: the byte spectrum
//! it reads, the engine that executes its commands, and file/device I/O.

pub mod fft;
pub mod session;
pub mod synthesis;
mod system;
pub mod wav;

// Re-export public types
pub use fft::SpectrumAnalyzer;
pub use session::{Session, SessionReport};
pub use synthesis::Synthesizer;
pub use system::PlaybackSystem;
