//! Repository pattern over JSON files in the data directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use review_core::{Item, ReviewState};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::error::DbError;
use crate::settings::PlannerSettings;

type Result<T> = std::result::Result<T, DbError>;

const CATALOG_FILE: &str = "catalog.json";
const REVIEWS_FILE: &str = "reviews.json";
const CONFIG_FILE: &str = "config.json";

/// Repository for catalog items.
pub trait CatalogRepository {
    /// All items, oldest first.
    fn list_items(&self) -> Result<Vec<Item>>;
    fn add_item(&self, item: Item) -> Result<()>;
}

/// Repository for review states.
pub trait ReviewRepository {
    /// Every readable record. Unreadable ones are logged and left on disk.
    fn load_reviews(&self) -> Result<BTreeMap<i64, ReviewState>>;
    /// The record for one item, or an error if it exists but cannot be read.
    fn load_review(&self, item_id: i64) -> Result<Option<ReviewState>>;
    /// Replace the stored record for `state.item_id` as a whole. Other
    /// records, readable or not, are written back unchanged.
    fn save_review(&self, state: &ReviewState) -> Result<()>;
    /// States due at `now`, earliest due first.
    fn due_reviews(&self, now: DateTime<Utc>) -> Result<Vec<ReviewState>>;
}

/// Repository for planner settings.
pub trait SettingsRepository {
    fn load_settings(&self) -> Result<PlannerSettings>;
    fn save_settings(&self, settings: &PlannerSettings) -> Result<()>;
}

/// JSON-file repository rooted at a data directory.
pub struct JsonRepository {
    dir: PathBuf,
}

impl JsonRepository {
    /// Open the repository, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| DbError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.dir.join(name);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(DbError::Io { path, source }),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| DbError::Json { path, source })
    }

    /// Write via a temporary file and rename so readers never see a partial file.
    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);
        let tmp = self.dir.join(format!("{name}.tmp"));
        let contents = serde_json::to_string_pretty(value).map_err(|source| DbError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&tmp, contents).map_err(|source| DbError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| DbError::Io { path, source })
    }
}

impl CatalogRepository for JsonRepository {
    fn list_items(&self) -> Result<Vec<Item>> {
        Ok(self.read_json(CATALOG_FILE)?.unwrap_or_default())
    }

    fn add_item(&self, item: Item) -> Result<()> {
        let mut items = self.list_items()?;
        if items.iter().any(|existing| existing.id == item.id) {
            return Err(DbError::DuplicateItem(item.id));
        }
        items.push(item);
        self.write_json(CATALOG_FILE, &items)
    }
}

impl JsonRepository {
    /// Stored review records as raw JSON, keyed by item id.
    fn raw_reviews(&self) -> Result<BTreeMap<String, serde_json::Value>> {
        Ok(self.read_json(REVIEWS_FILE)?.unwrap_or_default())
    }
}

/// Decode one stored record and check it is self-consistent.
fn decode_review(value: serde_json::Value) -> std::result::Result<ReviewState, String> {
    let state: ReviewState = serde_json::from_value(value).map_err(|err| err.to_string())?;
    state.check_invariants().map_err(|err| err.to_string())?;
    Ok(state)
}

impl ReviewRepository for JsonRepository {
    fn load_reviews(&self) -> Result<BTreeMap<i64, ReviewState>> {
        let mut reviews = BTreeMap::new();
        for (key, value) in self.raw_reviews()? {
            match decode_review(value) {
                Ok(state) => {
                    reviews.insert(state.item_id, state);
                }
                Err(reason) => {
                    tracing::warn!(key = %key, %reason, "skipping unreadable review record");
                }
            }
        }
        Ok(reviews)
    }

    fn load_review(&self, item_id: i64) -> Result<Option<ReviewState>> {
        let Some(value) = self.raw_reviews()?.remove(&item_id.to_string()) else {
            return Ok(None);
        };
        match decode_review(value) {
            Ok(state) if state.item_id == item_id => Ok(Some(state)),
            Ok(state) => Err(DbError::UnreadableReview {
                item_id,
                reason: format!("record belongs to item {}", state.item_id),
            }),
            Err(reason) => Err(DbError::UnreadableReview { item_id, reason }),
        }
    }

    fn save_review(&self, state: &ReviewState) -> Result<()> {
        let path = self.dir.join(REVIEWS_FILE);
        let value = serde_json::to_value(state).map_err(|source| DbError::Json { path, source })?;
        let mut raw = self.raw_reviews()?;
        raw.insert(state.item_id.to_string(), value);
        self.write_json(REVIEWS_FILE, &raw)
    }

    fn due_reviews(&self, now: DateTime<Utc>) -> Result<Vec<ReviewState>> {
        let mut due: Vec<ReviewState> = self
            .load_reviews()?
            .into_values()
            .filter(|state| state.is_due(now))
            .collect();
        due.sort_by_key(|state| (state.next_due, state.item_id));
        Ok(due)
    }
}

impl SettingsRepository for JsonRepository {
    fn load_settings(&self) -> Result<PlannerSettings> {
        Ok(self.read_json(CONFIG_FILE)?.unwrap_or_default())
    }

    fn save_settings(&self, settings: &PlannerSettings) -> Result<()> {
        self.write_json(CONFIG_FILE, settings)
    }
}
