//! Detector tuning: writable settings and fixed constants.

use crate::error::ConfigError;

/// Detector settings writable by the UI (effective from the next tick)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorSettings {
    /// Sharpening exponent applied to the normalized ratio (dimensionless, >= 0)
    /// Values >= 1 are the intended operating range; 0 makes every ratio 1.
    pub factor_power: f32,

    /// Attack/release threshold on the adjusted ratio (in [0, 1])
    pub factor_attack: f32,

    /// Confidence above this marks a frequency as detected (>= 0)
    pub confidence_threshold: f32,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            factor_power: 16.0,
            factor_attack: 0.8,
            confidence_threshold: 5.0,
        }
    }
}

impl DetectorSettings {
    /// Reject values outside the documented ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.factor_power.is_finite() || self.factor_power < 0.0 {
            return Err(ConfigError::FactorPower(self.factor_power));
        }
        if !(0.0..=1.0).contains(&self.factor_attack) {
            return Err(ConfigError::FactorAttack(self.factor_attack));
        }
        if !self.confidence_threshold.is_finite() || self.confidence_threshold < 0.0 {
            return Err(ConfigError::ConfidenceThreshold(self.confidence_threshold));
        }
        Ok(())
    }
}

/// Fixed detector and voice constants
pub mod detector_constants {
    /// Per-tick confidence decay when a reading does not rise
    pub const DECAY: f32 = 0.99;

    /// Continuous voice gain per unit adjusted ratio
    pub const CONTINUOUS_VOLUME: f32 = 0.1;

    /// Peak gain of a transient voice
    pub const TRANSIENT_PEAK_GAIN: f32 = 0.05;

    /// Transient attack ramp (seconds)
    pub const ATTACK_RAMP_S: f64 = 0.01;

    /// Transient release ramp (seconds), used for natural and early release
    pub const RELEASE_RAMP_S: f64 = 0.5;

    /// Weight of the prominence term in the relative value blend
    pub const PROMINENCE_WEIGHT: f32 = 0.25;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(DetectorSettings::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_settings() {
        let negative_power = DetectorSettings {
            factor_power: -1.0,
            ..Default::default()
        };
        assert_eq!(
            negative_power.validate(),
            Err(ConfigError::FactorPower(-1.0))
        );

        let attack_above_one = DetectorSettings {
            factor_attack: 1.5,
            ..Default::default()
        };
        assert_eq!(
            attack_above_one.validate(),
            Err(ConfigError::FactorAttack(1.5))
        );

        let nan_threshold = DetectorSettings {
            confidence_threshold: f32::NAN,
            ..Default::default()
        };
        assert!(nan_threshold.validate().is_err());
    }
}
