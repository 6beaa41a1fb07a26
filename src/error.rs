//! Configuration errors.
//!
//! Every variant is an `InvalidConfiguration` condition: the write is refused
//! and the running detector keeps its previous values.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Sharpening exponent must be finite and >= 0
    FactorPower(f32),
    /// Attack threshold must lie in [0, 1]
    FactorAttack(f32),
    /// Confidence threshold must be finite and >= 0
    ConfidenceThreshold(f32),
    /// Filter bound outside [0, max]
    FilterBound { value: usize, max: usize },
    /// Sample rate must be finite and > 0
    SampleRate(f32),
    /// Bin width must be finite and > 0
    BinSize(f32),
    /// Spectrum must have at least one bin
    BinCount(usize),
    /// FFT size must be a power of two >= 32
    FftSize(usize),
    /// Tick rate must be finite and > 0
    TickRate(f32),
    /// Decibel window must satisfy min < max
    DecibelRange { min: f32, max: f32 },
}

impl ConfigError {
    /// All configuration errors share one condition class.
    pub fn is_invalid_configuration(&self) -> bool {
        true
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration: ")?;
        match self {
            ConfigError::FactorPower(v) => write!(f, "factor power must be >= 0, got {}", v),
            ConfigError::FactorAttack(v) => {
                write!(f, "factor attack must be in [0, 1], got {}", v)
            }
            ConfigError::ConfidenceThreshold(v) => {
                write!(f, "confidence threshold must be >= 0, got {}", v)
            }
            ConfigError::FilterBound { value, max } => {
                write!(f, "filter bound must be in [0, {}], got {}", max, value)
            }
            ConfigError::SampleRate(v) => write!(f, "sample rate must be > 0, got {}", v),
            ConfigError::BinSize(v) => write!(f, "bin size must be > 0 Hz, got {}", v),
            ConfigError::BinCount(v) => write!(f, "bin count must be > 0, got {}", v),
            ConfigError::FftSize(v) => {
                write!(f, "FFT size must be a power of 2 >= 32, got {}", v)
            }
            ConfigError::TickRate(v) => write!(f, "tick rate must be > 0, got {}", v),
            ConfigError::DecibelRange { min, max } => {
                write!(f, "decibel range must satisfy min < max, got {}..{}", min, max)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_condition() {
        let err = ConfigError::FilterBound { value: 200, max: 108 };
        let text = err.to_string();
        assert!(text.starts_with("invalid configuration"));
        assert!(text.contains("200"));
        assert!(err.is_invalid_configuration());
    }
}
