//! Spaced-repetition scheduling engine for practice problems.
//!
//! Provides:
//! - Memory model mapping a review outcome to new stability, difficulty and interval
//! - Review state with its single state transition
//! - Priority-based daily session planner
//! - Trailing-window review analytics

pub mod algorithm;
pub mod analytics;
pub mod date_utils;
pub mod error;
pub mod planner;
pub mod review;
pub mod types;

pub use algorithm::{ElapsedDays, MemoryModel, ModelConfig, Transition, Weights};
pub use analytics::{at_risk, summarize, DifficultyDistribution, Summary};
pub use error::{Result, SchedulerError};
pub use planner::{
    backfill, progress, suggest_new_items, Catalog, PriorityWeights, Progress, Session,
    SessionPlanner,
};
pub use review::{HistoryEntry, ReviewState};
pub use types::{DifficultyTier, Item, Rating};
