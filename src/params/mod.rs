//! Parameter definitions with physical units and documented semantics.
//!
//! All tuning numbers live here with:
//! - Physical units (seconds, Hz, dB, etc.)
//! - Documented ranges and meanings
//! - Validation where a value is writable from outside

mod analysis;
mod detector;
mod playback;

// Re-export all types
pub use analysis::AnalysisConfig;
pub use detector::{detector_constants, DetectorSettings};
pub use playback::PlaybackConfig;
