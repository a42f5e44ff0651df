//! Planner settings and data directory resolution.

use std::path::PathBuf;

use review_core::{ModelConfig, PriorityWeights};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "REVIEW_PLANNER_HOME";

/// Settings stored in `config.json`. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    pub daily_limit: usize,
    pub minutes_per_item: f64,
    pub model: ModelConfig,
    pub priority: PriorityWeights,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            daily_limit: 20,
            minutes_per_item: 5.0,
            model: ModelConfig::default(),
            priority: PriorityWeights::default(),
        }
    }
}

/// Data directory: `$REVIEW_PLANNER_HOME`, else the platform config dir.
pub fn data_dir() -> PathBuf {
    std::env::var_os(HOME_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("review-planner")
        })
}
