//! Error types for review-core.

use thiserror::Error;

/// Result type alias using SchedulerError.
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors raised for caller contract violations.
///
/// Missing catalog entries and clock skew are not errors: the planner skips
/// orphaned states and the lifecycle clamps negative elapsed time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulerError {
    #[error("invalid rating {0}: expected a value from 1 to 5")]
    InvalidRating(u8),

    #[error("invalid weight vector: expected 17 or 19 values, got {actual}")]
    InvalidWeights { actual: usize },

    #[error("invalid model config: {0}")]
    InvalidConfig(String),

    #[error("invalid analytics window: {0} days")]
    InvalidWindow(u32),

    #[error("invalid review state for item {item_id}: {reason}")]
    InvalidState { item_id: i64, reason: String },
}
