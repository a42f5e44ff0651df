//! Read-only aggregation over review history.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::algorithm::MemoryModel;
use crate::date_utils::duration_to_days;
use crate::error::{Result, SchedulerError};
use crate::review::ReviewState;

/// Items bucketed by memory-model difficulty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyDistribution {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

/// Aggregate over items reviewed within a trailing window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub avg_rating: f64,
    pub success_rate: f64,
    pub avg_stability: f64,
    pub difficulty_distribution: DifficultyDistribution,
}

/// Summarize states whose last review falls within `window_days` of `now`.
///
/// Ratings and success come from each state's most recent review. Returns an
/// all-zero summary when nothing is in the window.
pub fn summarize(states: &[ReviewState], window_days: u32, now: DateTime<Utc>) -> Result<Summary> {
    if window_days == 0 {
        return Err(SchedulerError::InvalidWindow(window_days));
    }
    // Windows reaching past the representable range cover all history.
    let cutoff = now
        .checked_sub_signed(Duration::days(i64::from(window_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let recent: Vec<(&ReviewState, u8)> = states
        .iter()
        .filter_map(|state| {
            let last = state.history.last()?;
            (last.timestamp >= cutoff).then_some((state, last.rating.to_value()))
        })
        .collect();

    if recent.is_empty() {
        return Ok(Summary::default());
    }

    let count = recent.len() as f64;
    let rating_total: f64 = recent.iter().map(|(_, rating)| f64::from(*rating)).sum();
    let successes = recent.iter().filter(|(_, rating)| *rating >= 3).count();
    let stability_total: f64 = recent.iter().map(|(state, _)| state.stability).sum();

    let mut distribution = DifficultyDistribution::default();
    for (state, _) in &recent {
        match state.difficulty {
            d if d <= 3.0 => distribution.easy += 1,
            d if d <= 6.0 => distribution.medium += 1,
            _ => distribution.hard += 1,
        }
    }

    Ok(Summary {
        count: recent.len(),
        avg_rating: rating_total / count,
        success_rate: successes as f64 / count,
        avg_stability: stability_total / count,
        difficulty_distribution: distribution,
    })
}

/// Ids of reviewed items whose recall probability at `now` has fallen below
/// the model's target retention, most at risk first.
pub fn at_risk(states: &[ReviewState], model: &MemoryModel, now: DateTime<Utc>) -> Vec<i64> {
    let target = model.config().request_retention;
    let mut risky: Vec<(i64, f64)> = states
        .iter()
        .filter_map(|state| {
            let last = state.last_reviewed()?;
            let elapsed = duration_to_days(now - last);
            let recall = model.retrievability(state.stability, elapsed);
            (recall < target).then_some((state.item_id, recall))
        })
        .collect();
    risky.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    risky.into_iter().map(|(id, _)| id).collect()
}
