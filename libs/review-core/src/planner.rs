//! Daily session planning: priority scoring, ordering and capacity bounds.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::review::ReviewState;
use crate::types::{DifficultyTier, Item};

/// Lookup from item id to catalog entry.
pub trait Catalog {
    fn item(&self, id: i64) -> Option<&Item>;
}

impl Catalog for HashMap<i64, Item> {
    fn item(&self, id: i64) -> Option<&Item> {
        self.get(&id)
    }
}

impl Catalog for BTreeMap<i64, Item> {
    fn item(&self, id: i64) -> Option<&Item> {
        self.get(&id)
    }
}

/// Weights of the four priority terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityWeights {
    pub overdue: f64,
    pub tier: f64,
    pub fragility: f64,
    pub freshness: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            overdue: 2.0,
            tier: 1.5,
            fragility: 1.0,
            freshness: 0.5,
        }
    }
}

/// An item paired with its review state and priority for one planning call.
#[derive(Debug, Clone, PartialEq)]
pub struct Session<'a> {
    pub item: &'a Item,
    pub state: &'a ReviewState,
    pub priority: f64,
}

/// Completion statistics for a planned session list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub completion_rate: f64,
    pub remaining: usize,
    pub estimated_minutes: f64,
}

/// Ranks due review states into a bounded, ordered daily plan.
#[derive(Debug, Clone, Default)]
pub struct SessionPlanner {
    weights: PriorityWeights,
}

impl SessionPlanner {
    pub fn new(weights: PriorityWeights) -> Self {
        Self { weights }
    }

    /// Score, order and truncate `due` to at most `capacity` sessions.
    ///
    /// Ordered by priority descending, then item id ascending. States whose
    /// item is missing from the catalog are skipped.
    pub fn plan<'a, C: Catalog + ?Sized>(
        &self,
        due: &'a [ReviewState],
        catalog: &'a C,
        capacity: usize,
        now: DateTime<Utc>,
    ) -> Vec<Session<'a>> {
        if capacity == 0 {
            return Vec::new();
        }

        let mut sessions: Vec<Session<'a>> = due
            .iter()
            .filter_map(|state| match catalog.item(state.item_id) {
                Some(item) => Some(Session {
                    item,
                    state,
                    priority: self.priority(state, item, now),
                }),
                None => {
                    tracing::warn!(
                        item_id = state.item_id,
                        "review state has no catalog entry, skipping"
                    );
                    None
                }
            })
            .collect();

        sessions.sort_by(|a, b| {
            b.priority
                .total_cmp(&a.priority)
                .then_with(|| a.item.id.cmp(&b.item.id))
        });
        sessions.truncate(capacity);
        sessions
    }

    /// Weighted priority of one state. Higher is reviewed sooner.
    pub fn priority(&self, state: &ReviewState, item: &Item, now: DateTime<Utc>) -> f64 {
        let w = &self.weights;
        let overdue = state.days_overdue(now);
        let fragility = (5.0 - state.stability).max(0.1);
        let freshness = (1.0 - 0.1 * state.history.len() as f64).max(0.5);

        w.overdue * overdue
            + w.tier * tier_weight(&item.tier)
            + w.fragility * fragility
            + w.freshness * freshness
    }
}

/// Priority weight for a catalog difficulty tier.
pub fn tier_weight(tier: &DifficultyTier) -> f64 {
    match tier {
        DifficultyTier::Easy => 1.0,
        DifficultyTier::Medium => 1.5,
        DifficultyTier::Hard => 2.0,
        DifficultyTier::Other(_) => 1.0,
    }
}

/// Fresh states for never-reviewed items, enough to fill `capacity`.
///
/// `candidates` are taken in the caller's order (for example most recently
/// added first). Items already in the review pool or already due are skipped.
pub fn backfill<'a, I>(
    due: &[ReviewState],
    candidates: I,
    reviewed: &HashSet<i64>,
    capacity: usize,
) -> Vec<ReviewState>
where
    I: IntoIterator<Item = &'a Item>,
{
    let needed = capacity.saturating_sub(due.len());
    if needed == 0 {
        return Vec::new();
    }

    let mut taken: HashSet<i64> = due.iter().map(|state| state.item_id).collect();
    candidates
        .into_iter()
        .filter(|item| !reviewed.contains(&item.id))
        .filter(|item| taken.insert(item.id))
        .take(needed)
        .map(|item| ReviewState::new(item.id))
        .collect()
}

/// Suggest unreviewed items to start on.
///
/// Easier tiers come first. Items that introduce a topic tag not yet covered
/// by the selection are preferred; the rest fill any remaining slots.
pub fn suggest_new_items<'a>(
    items: &'a [Item],
    reviewed: &HashSet<i64>,
    limit: usize,
) -> Vec<&'a Item> {
    let mut fresh: Vec<&Item> = items.iter().filter(|item| !reviewed.contains(&item.id)).collect();
    fresh.sort_by(|a, b| {
        suggestion_rank(&a.tier).total_cmp(&suggestion_rank(&b.tier))
    });

    let mut selected: Vec<&Item> = Vec::new();
    let mut covered: BTreeSet<&str> = BTreeSet::new();
    for &item in &fresh {
        if selected.len() >= limit {
            break;
        }
        let adds_topic = item.tags.iter().any(|tag| !covered.contains(tag.as_str()));
        if adds_topic || selected.is_empty() {
            selected.push(item);
            covered.extend(item.tags.iter().map(String::as_str));
        }
    }

    if selected.len() < limit {
        let chosen: HashSet<i64> = selected.iter().map(|item| item.id).collect();
        let missing = limit - selected.len();
        let remaining = fresh.into_iter().filter(|item| !chosen.contains(&item.id));
        selected.extend(remaining.take(missing));
    }
    selected
}

fn suggestion_rank(tier: &DifficultyTier) -> f64 {
    match tier {
        DifficultyTier::Easy => 1.0,
        DifficultyTier::Medium => 2.0,
        DifficultyTier::Hard => 3.0,
        DifficultyTier::Other(_) => 1.0,
    }
}

/// Progress through a planned list of `total` sessions.
pub fn progress(total: usize, completed: usize, minutes_per_item: f64) -> Progress {
    if total == 0 {
        return Progress {
            completion_rate: 0.0,
            remaining: 0,
            estimated_minutes: 0.0,
        };
    }
    let completed = completed.min(total);
    let remaining = total - completed;
    Progress {
        completion_rate: completed as f64 / total as f64,
        remaining,
        estimated_minutes: remaining as f64 * minutes_per_item,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn item(id: i64, tier: DifficultyTier) -> Item {
        Item::new(id, format!("Q{id}"), tier, format!("https://example.com/{id}"))
    }

    fn catalog(items: Vec<Item>) -> HashMap<i64, Item> {
        items.into_iter().map(|item| (item.id, item)).collect()
    }

    fn due_at(id: i64, due: DateTime<Utc>) -> ReviewState {
        ReviewState {
            next_due: Some(due),
            ..ReviewState::new(id)
        }
    }

    fn ids(sessions: &[Session<'_>]) -> Vec<i64> {
        sessions.iter().map(|session| session.item.id).collect()
    }

    #[test]
    fn empty_input_gives_empty_plan() {
        let planner = SessionPlanner::default();
        let catalog = catalog(vec![item(1, DifficultyTier::Easy)]);
        for capacity in [0, 1, 50] {
            assert!(planner.plan(&[], &catalog, capacity, now()).is_empty());
        }
    }

    #[test]
    fn zero_capacity_gives_empty_plan() {
        let planner = SessionPlanner::default();
        let catalog = catalog(vec![item(1, DifficultyTier::Easy)]);
        let due = vec![ReviewState::new(1)];
        assert!(planner.plan(&due, &catalog, 0, now()).is_empty());
    }

    #[test]
    fn overdue_item_ranks_first() {
        let planner = SessionPlanner::default();
        let catalog = catalog(vec![
            item(1, DifficultyTier::Easy),
            item(2, DifficultyTier::Medium),
            item(3, DifficultyTier::Hard),
        ]);
        // Item 2 is half a day overdue (6.25). Due exactly at `now` it would
        // score 5.25 and lose to the new hard item 3 (6.0).
        let midnight = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        let due = vec![
            due_at(1, now() - Duration::days(2)),
            due_at(2, midnight),
            ReviewState::new(3),
        ];

        let sessions = planner.plan(&due, &catalog, 2, now());
        assert_eq!(ids(&sessions), vec![1, 2]);
    }

    #[test]
    fn new_hard_item_outranks_item_due_now() {
        let planner = SessionPlanner::default();
        let catalog = catalog(vec![
            item(1, DifficultyTier::Easy),
            item(2, DifficultyTier::Medium),
            item(3, DifficultyTier::Hard),
        ]);
        let due = vec![
            due_at(1, now() - Duration::days(2)),
            due_at(2, now()),
            ReviewState::new(3),
        ];
        assert_eq!(ids(&planner.plan(&due, &catalog, 2, now())), vec![1, 3]);
    }

    #[test]
    fn priority_formula() {
        let planner = SessionPlanner::default();
        let hard = item(3, DifficultyTier::Hard);
        let state = due_at(3, now() - Duration::days(2));
        // 2.0 * 2 + 1.5 * 2.0 + 1.0 * 2.5 + 0.5 * 1.0
        assert!((planner.priority(&state, &hard, now()) - 10.0).abs() < 1e-9);

        let fresh = ReviewState::new(3);
        assert!((planner.priority(&fresh, &hard, now()) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn priority_floors_apply() {
        let planner = SessionPlanner::default();
        let easy = item(1, DifficultyTier::Easy);
        let mut state = due_at(1, now() + Duration::days(3));
        state.stability = 40.0;
        state.history = (0..20)
            .map(|_| crate::review::HistoryEntry {
                timestamp: now(),
                rating: crate::types::Rating::Good,
                stability_before: 40.0,
                difficulty_before: 5.0,
                interval_days: 1.0,
            })
            .collect();
        // 0 overdue + 1.5 * 1.0 + 1.0 * 0.1 + 0.5 * 0.5
        assert!((planner.priority(&state, &easy, now()) - 1.85).abs() < 1e-9);
    }

    #[test]
    fn unknown_tier_weighs_like_easy() {
        assert_eq!(tier_weight(&DifficultyTier::Other("Extreme".into())), 1.0);
        assert_eq!(tier_weight(&DifficultyTier::Medium), 1.5);
    }

    #[test]
    fn ties_break_by_ascending_id() {
        let planner = SessionPlanner::default();
        let catalog = catalog(vec![
            item(9, DifficultyTier::Medium),
            item(4, DifficultyTier::Medium),
            item(6, DifficultyTier::Medium),
        ]);
        let due = vec![ReviewState::new(9), ReviewState::new(4), ReviewState::new(6)];
        let sessions = planner.plan(&due, &catalog, 10, now());
        assert_eq!(ids(&sessions), vec![4, 6, 9]);
    }

    #[test]
    fn plan_is_deterministic() {
        let planner = SessionPlanner::default();
        let catalog = catalog((1..=8).map(|id| item(id, DifficultyTier::Easy)).collect());
        let due: Vec<ReviewState> = (1..=8)
            .map(|id| due_at(id, now() - Duration::hours(id % 3 * 12)))
            .collect();

        let first = planner.plan(&due, &catalog, 5, now());
        let second = planner.plan(&due, &catalog, 5, now());
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
    }

    #[test]
    fn orphaned_states_are_skipped() {
        let planner = SessionPlanner::default();
        let catalog = catalog(vec![item(1, DifficultyTier::Easy)]);
        let due = vec![ReviewState::new(404), ReviewState::new(1)];
        let sessions = planner.plan(&due, &catalog, 5, now());
        assert_eq!(ids(&sessions), vec![1]);
    }

    #[test]
    fn custom_weights_reorder_plan() {
        let planner = SessionPlanner::new(PriorityWeights {
            overdue: 0.0,
            ..Default::default()
        });
        let catalog = catalog(vec![item(1, DifficultyTier::Easy), item(2, DifficultyTier::Hard)]);
        let due = vec![due_at(1, now() - Duration::days(30)), ReviewState::new(2)];
        assert_eq!(ids(&planner.plan(&due, &catalog, 2, now())), vec![2, 1]);
    }

    #[test]
    fn backfill_fills_to_capacity() {
        let items: Vec<Item> = (1..=6).map(|id| item(id, DifficultyTier::Easy)).collect();
        let due = vec![due_at(2, now())];
        let reviewed: HashSet<i64> = [2, 5].into_iter().collect();

        let fresh = backfill(&due, items.iter().rev(), &reviewed, 4);
        let fresh_ids: Vec<i64> = fresh.iter().map(|state| state.item_id).collect();
        assert_eq!(fresh_ids, vec![6, 4, 3]);
        assert!(fresh.iter().all(|state| state.history.is_empty() && state.next_due.is_none()));
    }

    #[test]
    fn backfill_noop_when_full() {
        let items = vec![item(1, DifficultyTier::Easy)];
        let due = vec![due_at(7, now()), due_at(8, now())];
        assert!(backfill(&due, &items, &HashSet::new(), 2).is_empty());
    }

    #[test]
    fn suggestions_prefer_easy_and_new_topics() {
        let items = vec![
            item(1, DifficultyTier::Hard).with_tags(["graph"]),
            item(2, DifficultyTier::Easy).with_tags(["array"]),
            item(3, DifficultyTier::Easy).with_tags(["array"]),
            item(4, DifficultyTier::Medium).with_tags(["array", "hash"]),
            item(5, DifficultyTier::Easy).with_tags(["string"]),
        ];
        let reviewed: HashSet<i64> = [5].into_iter().collect();

        let picked: Vec<i64> = suggest_new_items(&items, &reviewed, 3)
            .iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(picked, vec![2, 4, 1]);

        let picked: Vec<i64> = suggest_new_items(&items, &reviewed, 4)
            .iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(picked, vec![2, 4, 1, 3]);
    }

    #[test]
    fn progress_tracks_completion() {
        let p = progress(10, 3, 5.0);
        assert!((p.completion_rate - 0.3).abs() < 1e-9);
        assert_eq!(p.remaining, 7);
        assert_eq!(p.estimated_minutes, 35.0);

        let empty = progress(0, 0, 5.0);
        assert_eq!(empty.completion_rate, 0.0);
        assert_eq!(empty.remaining, 0);
    }
}
