//! Engine configuration
//!
//! Every tunable the calculators depend on travels in an explicit
//! [`EngineConfig`] value. Nothing in the engine reads ambient state; the
//! environment is consulted only by [`EngineConfig::from_env`], which callers
//! invoke at their own boundary.

use crate::error::ComputeError;
use crate::types::{BmrEquation, Section};
use serde::{Deserialize, Serialize};
use std::env;

/// Default TDEE multiplier applied to BMR
pub const DEFAULT_ACTIVITY_FACTOR: f64 = 1.5;

/// Default share of body mass attributed to bone
pub const DEFAULT_BONE_MASS_FRACTION: f64 = 0.14;

/// Allowed |v1 - v2| per section before a third trial is required
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceConfig {
    /// Skinfolds (mm)
    pub skinfolds: f64,
    /// Breadths (cm)
    pub breadths: f64,
    /// Girths (cm)
    pub girths: f64,
    /// Basic measures (unit-native)
    pub basic: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            skinfolds: 1.0,
            breadths: 0.2,
            girths: 0.5,
            basic: 0.5,
        }
    }
}

impl ToleranceConfig {
    pub fn threshold(&self, section: Section) -> f64 {
        match section {
            Section::Skinfolds => self.skinfolds,
            Section::Breadths => self.breadths,
            Section::Girths => self.girths,
            Section::Basic => self.basic,
        }
    }

    /// Every threshold must be a finite, non-negative number
    pub fn validate(&self) -> Result<(), ComputeError> {
        for section in Section::ALL {
            let threshold = self.threshold(section);
            if !(threshold.is_finite() && threshold >= 0.0) {
                return Err(ComputeError::InvalidConfig(format!(
                    "{section} tolerance must be non-negative, got {threshold}"
                )));
            }
        }
        Ok(())
    }
}

/// How calculators treat a metric absent from the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDataPolicy {
    /// Missing inputs make the dependent outputs unavailable
    #[default]
    Strict,
    /// Missing inputs are read as 0, matching legacy spreadsheets.
    /// Reports carry a `zero_filled_inputs` flag when this kicks in.
    ZeroFill,
}

/// Named activity multipliers for TDEE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn factor(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tolerances: ToleranceConfig,
    /// TDEE = BMR × activity_factor
    pub activity_factor: f64,
    /// bone mass = mass × bone_mass_fraction
    pub bone_mass_fraction: f64,
    pub bmr_equation: BmrEquation,
    pub missing_data_policy: MissingDataPolicy,
    /// Reject sittings that skipped a metric entirely
    pub require_complete_sitting: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerances: ToleranceConfig::default(),
            activity_factor: DEFAULT_ACTIVITY_FACTOR,
            bone_mass_fraction: DEFAULT_BONE_MASS_FRACTION,
            bmr_equation: BmrEquation::SexNeutral,
            missing_data_policy: MissingDataPolicy::Strict,
            require_complete_sitting: true,
        }
    }
}

impl EngineConfig {
    /// Use a named activity level instead of a raw factor
    #[must_use]
    pub fn with_activity_level(mut self, level: ActivityLevel) -> Self {
        self.activity_factor = level.factor();
        self
    }

    /// Check values that arrived from outside the engine (JSON, environment).
    ///
    /// Tolerances must be non-negative, the activity factor positive and the
    /// bone mass fraction within 0..=1.
    pub fn validate(&self) -> Result<(), ComputeError> {
        self.tolerances.validate()?;
        if !(self.activity_factor.is_finite() && self.activity_factor > 0.0) {
            return Err(ComputeError::InvalidConfig(format!(
                "activity factor must be positive, got {}",
                self.activity_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.bone_mass_fraction) {
            return Err(ComputeError::InvalidConfig(format!(
                "bone mass fraction must be within 0..=1, got {}",
                self.bone_mass_fraction
            )));
        }
        Ok(())
    }

    /// Load configuration from `KINANTHRO_*` environment variables, falling
    /// back to defaults for anything unset or unparsable
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let tolerances = ToleranceConfig {
            skinfolds: env_f64("KINANTHRO_TOLERANCE_SKINFOLDS")
                .unwrap_or(defaults.tolerances.skinfolds),
            breadths: env_f64("KINANTHRO_TOLERANCE_BREADTHS")
                .unwrap_or(defaults.tolerances.breadths),
            girths: env_f64("KINANTHRO_TOLERANCE_GIRTHS").unwrap_or(defaults.tolerances.girths),
            basic: env_f64("KINANTHRO_TOLERANCE_BASIC").unwrap_or(defaults.tolerances.basic),
        };

        Self {
            tolerances,
            activity_factor: env_f64("KINANTHRO_ACTIVITY_FACTOR")
                .unwrap_or(defaults.activity_factor),
            bone_mass_fraction: env_f64("KINANTHRO_BONE_MASS_FRACTION")
                .unwrap_or(defaults.bone_mass_fraction),
            bmr_equation: env::var("KINANTHRO_BMR_EQUATION")
                .ok()
                .and_then(|s| serde_json::from_value(serde_json::Value::String(s)).ok())
                .unwrap_or(defaults.bmr_equation),
            missing_data_policy: env::var("KINANTHRO_MISSING_DATA_POLICY")
                .ok()
                .and_then(|s| serde_json::from_value(serde_json::Value::String(s)).ok())
                .unwrap_or(defaults.missing_data_policy),
            require_complete_sitting: env::var("KINANTHRO_REQUIRE_COMPLETE_SITTING")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.require_complete_sitting),
        }
    }
}

fn env_f64(key: &str) -> Option<f64> {
    env::var(key)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tolerances() {
        let tolerances = ToleranceConfig::default();
        assert_eq!(tolerances.threshold(Section::Skinfolds), 1.0);
        assert_eq!(tolerances.threshold(Section::Breadths), 0.2);
        assert_eq!(tolerances.threshold(Section::Girths), 0.5);
        assert_eq!(tolerances.threshold(Section::Basic), 0.5);
    }

    #[test]
    fn test_activity_level() {
        let config = EngineConfig::default().with_activity_level(ActivityLevel::Sedentary);
        assert_eq!(config.activity_factor, 1.2);
        assert_eq!(EngineConfig::default().activity_factor, 1.5);
    }

    #[test]
    fn test_partial_config_json_uses_defaults() {
        let json = r#"{"activity_factor": 1.725, "missing_data_policy": "zero_fill"}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.activity_factor, 1.725);
        assert_eq!(config.missing_data_policy, MissingDataPolicy::ZeroFill);
        assert_eq!(config.tolerances, ToleranceConfig::default());
        assert!(config.require_complete_sitting);
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        assert!(EngineConfig::default().validate().is_ok());

        let config = EngineConfig {
            tolerances: ToleranceConfig {
                skinfolds: -1.0,
                ..ToleranceConfig::default()
            },
            ..EngineConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ComputeError::InvalidConfig(_)));

        let config: EngineConfig = serde_json::from_str(r#"{"activity_factor": -1.5}"#).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ComputeError::InvalidConfig(_)));

        let config = EngineConfig {
            activity_factor: 0.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            bone_mass_fraction: 1.5,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
