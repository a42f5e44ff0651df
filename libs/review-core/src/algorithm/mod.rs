//! Memory model configuration and the state transition it drives.

pub mod fsrs;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulerError};

pub use fsrs::MemoryModel;

/// Starting stability (days) for a never-reviewed item.
pub const INITIAL_STABILITY: f64 = 2.5;
/// Starting difficulty for a never-reviewed item.
pub const INITIAL_DIFFICULTY: f64 = 5.0;
/// Lower bound applied to every computed stability.
pub const MIN_STABILITY: f64 = 0.01;
pub const MIN_DIFFICULTY: f64 = 1.0;
pub const MAX_DIFFICULTY: f64 = 10.0;

/// How elapsed time between reviews is fed to the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElapsedDays {
    /// Sub-day precision.
    #[default]
    Fractional,
    /// Floored to whole days.
    WholeDays,
}

impl ElapsedDays {
    /// Normalize a raw elapsed time. Negative or non-finite input becomes 0.
    pub fn apply(self, elapsed_days: f64) -> f64 {
        let elapsed = if elapsed_days.is_finite() {
            elapsed_days.max(0.0)
        } else {
            0.0
        };
        match self {
            Self::Fractional => elapsed,
            Self::WholeDays => elapsed.floor(),
        }
    }
}

/// Model coefficients, one field per coefficient.
///
/// `from_vector` maps the legacy flat weight vector onto these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    /// w[4]: interval growth per rating step above Good.
    pub good_interval_gain: f64,
    /// w[5]: stability growth per rating step above Hard (Easy, Perfect).
    pub recall_stability_gain: f64,
    /// w[6]: exponent applied to retrievability in the recall growth term.
    pub retrievability_exponent: f64,
    /// w[7]: difficulty change per rating step away from Good; ratings above
    /// Good lower difficulty, Hard raises it.
    pub difficulty_step: f64,
    /// w[9..=11]: Hard stability update.
    pub hard_stability_scale: f64,
    pub hard_stability_prior_exponent: f64,
    pub hard_stability_posterior_exponent: f64,
    /// w[12..=14]: Good stability update.
    pub good_stability_scale: f64,
    pub good_stability_prior_exponent: f64,
    pub good_stability_posterior_exponent: f64,
    /// w[15]: difficulty added on a lapse.
    pub lapse_difficulty_step: f64,
    /// w[16..=18]: post-lapse stability.
    pub lapse_stability_scale: f64,
    pub lapse_stability_prior_exponent: f64,
    pub lapse_stability_posterior_exponent: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            good_interval_gain: 4.93,
            recall_stability_gain: 0.94,
            retrievability_exponent: 0.86,
            difficulty_step: 0.01,
            hard_stability_scale: 0.14,
            hard_stability_prior_exponent: 0.94,
            hard_stability_posterior_exponent: 2.18,
            good_stability_scale: 0.05,
            good_stability_prior_exponent: 0.34,
            good_stability_posterior_exponent: 1.26,
            lapse_difficulty_step: 0.29,
            lapse_stability_scale: 2.61,
            lapse_stability_prior_exponent: 0.5,
            lapse_stability_posterior_exponent: 1.0,
        }
    }
}

impl Weights {
    /// Build from a legacy flat weight vector.
    ///
    /// Accepts 17 values (indices 17 and 18 keep their defaults) or 19.
    /// Indices 0-3 and 8 belong to offline calibration and are ignored.
    pub fn from_vector(w: &[f64]) -> Result<Self> {
        if w.len() != 17 && w.len() != 19 {
            return Err(SchedulerError::InvalidWeights { actual: w.len() });
        }
        let defaults = Self::default();
        Ok(Self {
            good_interval_gain: w[4],
            recall_stability_gain: w[5],
            retrievability_exponent: w[6],
            difficulty_step: w[7],
            hard_stability_scale: w[9],
            hard_stability_prior_exponent: w[10],
            hard_stability_posterior_exponent: w[11],
            good_stability_scale: w[12],
            good_stability_prior_exponent: w[13],
            good_stability_posterior_exponent: w[14],
            lapse_difficulty_step: w[15],
            lapse_stability_scale: w[16],
            lapse_stability_prior_exponent: w
                .get(17)
                .copied()
                .unwrap_or(defaults.lapse_stability_prior_exponent),
            lapse_stability_posterior_exponent: w
                .get(18)
                .copied()
                .unwrap_or(defaults.lapse_stability_posterior_exponent),
        })
    }

    fn values(&self) -> [(&'static str, f64); 14] {
        [
            ("good_interval_gain", self.good_interval_gain),
            ("recall_stability_gain", self.recall_stability_gain),
            ("retrievability_exponent", self.retrievability_exponent),
            ("difficulty_step", self.difficulty_step),
            ("hard_stability_scale", self.hard_stability_scale),
            ("hard_stability_prior_exponent", self.hard_stability_prior_exponent),
            ("hard_stability_posterior_exponent", self.hard_stability_posterior_exponent),
            ("good_stability_scale", self.good_stability_scale),
            ("good_stability_prior_exponent", self.good_stability_prior_exponent),
            ("good_stability_posterior_exponent", self.good_stability_posterior_exponent),
            ("lapse_difficulty_step", self.lapse_difficulty_step),
            ("lapse_stability_scale", self.lapse_stability_scale),
            ("lapse_stability_prior_exponent", self.lapse_stability_prior_exponent),
            ("lapse_stability_posterior_exponent", self.lapse_stability_posterior_exponent),
        ]
    }
}

/// Memory model configuration. Unset keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Target probability of recall.
    pub request_retention: f64,
    /// Longest interval the model will schedule, in days.
    pub maximum_interval: f64,
    /// Interval multiplier for an Easy rating.
    pub easy_bonus: f64,
    /// Interval multiplier for a Hard rating.
    pub hard_factor: f64,
    pub elapsed_days: ElapsedDays,
    pub weights: Weights,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            request_retention: 0.9,
            maximum_interval: 36500.0,
            easy_bonus: 1.3,
            hard_factor: 1.2,
            elapsed_days: ElapsedDays::default(),
            weights: Weights::default(),
        }
    }
}

impl ModelConfig {
    /// Reject configurations the model cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.request_retention > 0.0 && self.request_retention < 1.0) {
            return Err(SchedulerError::InvalidConfig(format!(
                "request_retention must be between 0 and 1, got {}",
                self.request_retention
            )));
        }
        if !(self.maximum_interval >= 1.0) {
            return Err(SchedulerError::InvalidConfig(format!(
                "maximum_interval must be at least 1 day, got {}",
                self.maximum_interval
            )));
        }
        let factors = [("easy_bonus", self.easy_bonus), ("hard_factor", self.hard_factor)];
        for (name, value) in factors.into_iter().chain(self.weights.values()) {
            if !value.is_finite() {
                return Err(SchedulerError::InvalidConfig(format!("{name} must be finite")));
            }
        }
        Ok(())
    }
}

/// Result of one model transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub stability: f64,
    pub difficulty: f64,
    pub interval_days: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LEGACY: [f64; 17] = [
        0.4, 0.6, 2.4, 5.8, 4.93, 0.94, 0.86, 0.01, 1.49, 0.14, 0.94, 2.18, 0.05, 0.34, 1.26,
        0.29, 2.61,
    ];

    #[test]
    fn legacy_vector_matches_defaults() {
        assert_eq!(Weights::from_vector(&LEGACY).unwrap(), Weights::default());
    }

    #[test]
    fn full_vector_sets_lapse_exponents() {
        let mut w = LEGACY.to_vec();
        w.extend([0.7, 1.3]);
        let weights = Weights::from_vector(&w).unwrap();
        assert_eq!(weights.lapse_stability_prior_exponent, 0.7);
        assert_eq!(weights.lapse_stability_posterior_exponent, 1.3);
    }

    #[test]
    fn malformed_vector_rejected() {
        assert_eq!(
            Weights::from_vector(&LEGACY[..10]),
            Err(SchedulerError::InvalidWeights { actual: 10 })
        );
        assert_eq!(
            Weights::from_vector(&[0.0; 18]),
            Err(SchedulerError::InvalidWeights { actual: 18 })
        );
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let json = r#"{"maximum_interval": 365, "weights": {"difficulty_step": 0.5}}"#;
        let config: ModelConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.maximum_interval, 365.0);
        assert_eq!(config.weights.difficulty_step, 0.5);
        assert_eq!(config.weights.good_interval_gain, 4.93);
        assert_eq!(config.request_retention, 0.9);
        assert_eq!(config.elapsed_days, ElapsedDays::Fractional);
    }

    #[test]
    fn elapsed_mode_parses() {
        let config: ModelConfig = serde_json::from_str(r#"{"elapsed_days": "whole_days"}"#).unwrap();
        assert_eq!(config.elapsed_days, ElapsedDays::WholeDays);
    }

    #[test]
    fn elapsed_normalization() {
        assert_eq!(ElapsedDays::Fractional.apply(2.75), 2.75);
        assert_eq!(ElapsedDays::WholeDays.apply(2.75), 2.0);
        assert_eq!(ElapsedDays::Fractional.apply(-3.0), 0.0);
        assert_eq!(ElapsedDays::WholeDays.apply(f64::NAN), 0.0);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let config = ModelConfig {
            request_retention: 1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SchedulerError::InvalidConfig(_))));

        let config = ModelConfig {
            maximum_interval: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let mut config = ModelConfig::default();
        config.weights.difficulty_step = f64::INFINITY;
        assert!(config.validate().is_err());

        assert!(ModelConfig::default().validate().is_ok());
    }
}
