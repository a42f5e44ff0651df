//! Per-item review state and its single state transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::algorithm::{MemoryModel, INITIAL_DIFFICULTY, INITIAL_STABILITY, MAX_DIFFICULTY, MIN_DIFFICULTY};
use crate::date_utils::{days_to_duration, duration_to_days};
use crate::error::{Result, SchedulerError};
use crate::types::Rating;

/// One past review, recording the memory state *before* it was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub rating: Rating,
    pub stability_before: f64,
    pub difficulty_before: f64,
    pub interval_days: f64,
}

/// Memory state of one catalog item in the review pool.
///
/// Whether the item is due is derived from `next_due` on demand and never
/// stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub item_id: i64,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    pub stability: f64,
    pub difficulty: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_due: Option<DateTime<Utc>>,
}

impl ReviewState {
    /// Fresh state for an item entering the review pool.
    pub fn new(item_id: i64) -> Self {
        Self {
            item_id,
            history: Vec::new(),
            stability: INITIAL_STABILITY,
            difficulty: INITIAL_DIFFICULTY,
            next_due: None,
        }
    }

    /// True once the item has been reviewed at least once.
    pub fn is_reviewed(&self) -> bool {
        !self.history.is_empty()
    }

    /// Due when the next review time is at or before `now`. Never-reviewed
    /// states are not due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_due.is_some_and(|due| due <= now)
    }

    /// Time of the most recent review.
    pub fn last_reviewed(&self) -> Option<DateTime<Utc>> {
        self.history.last().map(|entry| entry.timestamp)
    }

    /// Days past the due time; 0 when not yet due or never reviewed.
    pub fn days_overdue(&self, now: DateTime<Utc>) -> f64 {
        self.next_due
            .map(|due| duration_to_days(now - due).max(0.0))
            .unwrap_or(0.0)
    }

    /// State after reviewing at `timestamp` with `rating`. `self` is untouched.
    ///
    /// A timestamp earlier than the last review (clock skew) is recorded at
    /// the last review time, so elapsed time is 0 and history stays ordered.
    pub fn reviewed(&self, timestamp: DateTime<Utc>, rating: Rating, model: &MemoryModel) -> Self {
        let reviewed_at = match self.last_reviewed() {
            Some(last) if timestamp < last => last,
            _ => timestamp,
        };
        let last_review = self.last_reviewed().unwrap_or(reviewed_at);
        let elapsed_days = duration_to_days(reviewed_at - last_review).max(0.0);

        let next = model.transition(self.stability, self.difficulty, rating, elapsed_days);
        tracing::debug!(
            item_id = self.item_id,
            rating = rating.to_value(),
            elapsed_days,
            stability = next.stability,
            difficulty = next.difficulty,
            interval_days = next.interval_days,
            "review recorded"
        );

        let mut history = self.history.clone();
        history.push(HistoryEntry {
            timestamp: reviewed_at,
            rating,
            stability_before: self.stability,
            difficulty_before: self.difficulty,
            interval_days: next.interval_days,
        });

        Self {
            item_id: self.item_id,
            history,
            stability: next.stability,
            difficulty: next.difficulty,
            next_due: Some(reviewed_at + days_to_duration(next.interval_days)),
        }
    }

    /// Apply a review in place. The only mutator of stability, difficulty and
    /// next-due.
    pub fn record_outcome(&mut self, timestamp: DateTime<Utc>, rating: Rating, model: &MemoryModel) {
        *self = self.reviewed(timestamp, rating, model);
    }

    /// Verify a record loaded from storage.
    pub fn check_invariants(&self) -> Result<()> {
        let invalid = |reason: &str| SchedulerError::InvalidState {
            item_id: self.item_id,
            reason: reason.to_string(),
        };

        if !(self.stability > 0.0 && self.stability.is_finite()) {
            return Err(invalid("stability must be positive"));
        }
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&self.difficulty) {
            return Err(invalid("difficulty must be within 1-10"));
        }
        if self.history.windows(2).any(|pair| pair[1].timestamp < pair[0].timestamp) {
            return Err(invalid("history is out of order"));
        }
        match (self.history.last(), self.next_due) {
            (None, None) => Ok(()),
            (None, Some(_)) => Err(invalid("next due set without any review")),
            (Some(_), None) => Err(invalid("reviewed item has no next due")),
            (Some(last), Some(due)) => {
                if last.timestamp + days_to_duration(last.interval_days) == due {
                    Ok(())
                } else {
                    Err(invalid("next due does not follow the last review"))
                }
            }
        }
    }
}
