//! FSRS-style memory model.
//!
//! Tracks two values per item:
//! - Stability (S): time constant, in days, of the forgetting curve
//! - Difficulty (D): intrinsic hardness, 1-10
//!
//! Recall probability decays hyperbolically: R = (1 + t / (9 * S))^(-1).

use super::{
    ModelConfig, Transition, INITIAL_DIFFICULTY, INITIAL_STABILITY, MAX_DIFFICULTY,
    MIN_DIFFICULTY, MIN_STABILITY,
};
use crate::error::Result;
use crate::types::Rating;

/// Decay-shape constant of the forgetting curve.
const DECAY_FACTOR: f64 = 9.0;

/// Memory model with validated configuration.
#[derive(Debug, Clone, Default)]
pub struct MemoryModel {
    config: ModelConfig,
}

impl MemoryModel {
    /// Create a model, rejecting invalid configuration.
    pub fn new(config: ModelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Starting (stability, difficulty) for a never-reviewed item.
    pub fn initial_state(&self) -> (f64, f64) {
        (INITIAL_STABILITY, INITIAL_DIFFICULTY)
    }

    /// Compute the memory state after a review.
    ///
    /// `elapsed_days` is the time since the previous review; it is normalized
    /// by the configured `ElapsedDays` mode and never goes below 0.
    pub fn transition(
        &self,
        stability: f64,
        difficulty: f64,
        rating: Rating,
        elapsed_days: f64,
    ) -> Transition {
        let w = &self.config.weights;
        let elapsed = self.config.elapsed_days.apply(elapsed_days);

        if rating == Rating::Forgot {
            let new_difficulty = constrain_difficulty(difficulty + w.lapse_difficulty_step);
            let new_stability = w.lapse_stability_scale
                * difficulty.powf(w.lapse_stability_prior_exponent)
                * new_difficulty.powf(-w.lapse_stability_posterior_exponent);
            return Transition {
                stability: new_stability.max(MIN_STABILITY),
                difficulty: new_difficulty,
                interval_days: 1.0,
            };
        }

        let r = self.retrievability(stability, elapsed);
        let step = rating.to_value() as f64 - 3.0;
        let new_difficulty = constrain_difficulty(difficulty - w.difficulty_step * step);

        let new_stability = match rating {
            Rating::Hard => {
                w.hard_stability_scale
                    * difficulty.powf(w.hard_stability_prior_exponent)
                    * new_difficulty.powf(-w.hard_stability_posterior_exponent)
                    * stability
            }
            Rating::Good => {
                w.good_stability_scale
                    * difficulty.powf(w.good_stability_prior_exponent)
                    * new_difficulty.powf(-w.good_stability_posterior_exponent)
                    * stability
            }
            _ => {
                let above_hard = rating.to_value() as f64 - 2.0;
                stability
                    * (1.0 + w.recall_stability_gain * above_hard * r.powf(w.retrievability_exponent))
            }
        };

        let raw_interval = match rating {
            Rating::Hard => elapsed * self.config.hard_factor,
            Rating::Easy => elapsed * self.config.easy_bonus,
            _ => elapsed * (1.0 + w.good_interval_gain * step),
        };

        Transition {
            stability: new_stability.max(MIN_STABILITY),
            difficulty: new_difficulty,
            interval_days: self.clamp_interval(raw_interval),
        }
    }

    /// Recall probability after `elapsed_days` at the given stability.
    pub fn retrievability(&self, stability: f64, elapsed_days: f64) -> f64 {
        if stability <= 0.0 {
            return 0.0;
        }
        (1.0 + elapsed_days.max(0.0) / (DECAY_FACTOR * stability)).powf(-1.0)
    }

    /// Days until recall probability falls to the target retention.
    /// I = 9 * S * (1/R - 1)
    pub fn retention_interval(&self, stability: f64) -> f64 {
        let interval =
            DECAY_FACTOR * stability * (1.0 / self.config.request_retention - 1.0);
        self.clamp_interval(interval)
    }

    fn clamp_interval(&self, interval: f64) -> f64 {
        if interval.is_nan() {
            return 1.0;
        }
        interval.clamp(1.0, self.config.maximum_interval)
    }
}

fn constrain_difficulty(difficulty: f64) -> f64 {
    difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}
