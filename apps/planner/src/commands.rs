//! Command implementations. Each returns the text to print.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use review_core::{
    at_risk, backfill, progress, suggest_new_items, summarize, DifficultyTier, Item, MemoryModel,
    Rating, ReviewState, SessionPlanner,
};

use crate::db::{CatalogRepository, ReviewRepository, SettingsRepository};

/// Build today's plan: due states, backfilled with never-reviewed items
/// (most recently added first), ranked and bounded.
pub fn plan<R>(repo: &R, limit: Option<usize>, now: DateTime<Utc>) -> anyhow::Result<String>
where
    R: CatalogRepository + ReviewRepository + SettingsRepository,
{
    let settings = repo.load_settings().context("failed to load settings")?;
    let capacity = limit.unwrap_or(settings.daily_limit);

    let items = repo.list_items().context("failed to load catalog")?;
    let in_pool: HashSet<i64> = repo
        .load_reviews()
        .context("failed to load reviews")?
        .into_keys()
        .collect();
    let catalog_ids: HashSet<i64> = items.iter().map(|item| item.id).collect();
    let mut due = repo.due_reviews(now).context("failed to load due reviews")?;
    due.retain(|state| catalog_ids.contains(&state.item_id));
    let fresh = backfill(&due, items.iter().rev(), &in_pool, capacity);
    tracing::info!(due = due.len(), backfilled = fresh.len(), capacity, "planning session");
    due.extend(fresh);

    let catalog: HashMap<i64, Item> = items.into_iter().map(|item| (item.id, item)).collect();
    let planner = SessionPlanner::new(settings.priority.clone());
    let sessions = planner.plan(&due, &catalog, capacity, now);

    let mut out = String::new();
    if sessions.is_empty() {
        out.push_str("Nothing to review today.\n");
        return Ok(out);
    }
    writeln!(out, "Today's plan ({} items):", sessions.len())?;
    for (index, session) in sessions.iter().enumerate() {
        let status = if session.state.is_reviewed() { "review" } else { "new" };
        writeln!(
            out,
            "{:>3}. [{}] {} ({}, {}) priority {:.2}",
            index + 1,
            session.item.id,
            session.item.title,
            session.item.tier,
            status,
            session.priority
        )?;
    }
    let estimate = progress(sessions.len(), 0, settings.minutes_per_item);
    writeln!(out, "Estimated time: {:.0} min", estimate.estimated_minutes)?;
    Ok(out)
}

/// Record a rating for one item and persist the updated state.
pub fn review<R>(repo: &R, item_id: i64, rating: u8, now: DateTime<Utc>) -> anyhow::Result<String>
where
    R: CatalogRepository + ReviewRepository + SettingsRepository,
{
    let rating = Rating::try_from(rating)?;
    let settings = repo.load_settings().context("failed to load settings")?;
    let model = MemoryModel::new(settings.model).context("invalid model settings")?;

    let items = repo.list_items().context("failed to load catalog")?;
    let Some(item) = items.iter().find(|item| item.id == item_id) else {
        bail!("item {item_id} is not in the catalog");
    };

    let mut state = repo
        .load_review(item_id)
        .context("refusing to overwrite the stored review")?
        .unwrap_or_else(|| ReviewState::new(item_id));
    state.record_outcome(now, rating, &model);
    repo.save_review(&state).context("failed to save review")?;

    let next_due = state
        .next_due
        .map(|due| due.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_default();
    Ok(format!(
        "[{}] {}: stability {:.2}, difficulty {:.2}, next review {}\n",
        item.id, item.title, state.stability, state.difficulty, next_due
    ))
}

/// Summarize the trailing `days` of review activity.
pub fn stats<R>(repo: &R, days: u32, now: DateTime<Utc>) -> anyhow::Result<String>
where
    R: ReviewRepository + SettingsRepository,
{
    let settings = repo.load_settings().context("failed to load settings")?;
    let model = MemoryModel::new(settings.model).context("invalid model settings")?;
    let states: Vec<ReviewState> = repo
        .load_reviews()
        .context("failed to load reviews")?
        .into_values()
        .collect();

    let summary = summarize(&states, days, now)?;
    let risky = at_risk(&states, &model, now);
    let due = states.iter().filter(|state| state.is_due(now)).count();

    let mut out = String::new();
    writeln!(out, "Last {days} days:")?;
    writeln!(out, "  reviewed items: {}", summary.count)?;
    writeln!(out, "  average rating: {:.2}", summary.avg_rating)?;
    writeln!(out, "  success rate:   {:.1}%", summary.success_rate * 100.0)?;
    writeln!(out, "  avg stability:  {:.2}", summary.avg_stability)?;
    let dist = &summary.difficulty_distribution;
    writeln!(
        out,
        "  difficulty:     easy {} / medium {} / hard {}",
        dist.easy, dist.medium, dist.hard
    )?;
    writeln!(out, "Due now: {due}, below target retention: {}", risky.len())?;
    Ok(out)
}

/// List unreviewed items worth starting on.
pub fn suggest<R>(repo: &R, limit: usize) -> anyhow::Result<String>
where
    R: CatalogRepository + ReviewRepository,
{
    let items = repo.list_items().context("failed to load catalog")?;
    let in_pool: HashSet<i64> = repo
        .load_reviews()
        .context("failed to load reviews")?
        .into_keys()
        .collect();

    let picks = suggest_new_items(&items, &in_pool, limit);
    let mut out = String::new();
    if picks.is_empty() {
        out.push_str("Every catalog item is already in review.\n");
    }
    for item in picks {
        let tags: Vec<&str> = item.tags.iter().map(String::as_str).collect();
        writeln!(out, "[{}] {} ({}) {}", item.id, item.title, item.tier, tags.join(", "))?;
    }
    Ok(out)
}

/// Add an item to the local catalog.
pub fn add<R: CatalogRepository>(
    repo: &R,
    id: i64,
    title: String,
    tier: &str,
    tags: Vec<String>,
    url: Option<String>,
) -> anyhow::Result<String> {
    let tier = DifficultyTier::parse(tier);
    if let DifficultyTier::Other(label) = &tier {
        tracing::warn!(tier = %label, "unrecognized difficulty tier, weighting as easy");
    }
    let item = Item::new(id, title, tier, url.unwrap_or_default()).with_tags(tags);
    let line = format!("Added [{}] {}\n", item.id, item.title);
    repo.add_item(item)?;
    Ok(line)
}
