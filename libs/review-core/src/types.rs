//! Core types for the review scheduler.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

/// Coarse difficulty label assigned by the problem catalog.
///
/// Labels parse case-insensitively; anything unrecognized is kept verbatim as
/// `Other` so it survives a round trip through storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
    Other(String),
}

impl DifficultyTier {
    /// Parse a catalog label.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "easy" => Self::Easy,
            "medium" => Self::Medium,
            "hard" => Self::Hard,
            _ => Self::Other(label.to_string()),
        }
    }

    /// Label as written to storage.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for DifficultyTier {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

impl From<DifficultyTier> for String {
    fn from(tier: DifficultyTier) -> Self {
        match tier {
            DifficultyTier::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Rating {
    Forgot,
    Hard,
    Good,
    Easy,
    Perfect,
}

impl Rating {
    /// All ratings, lowest first.
    pub const ALL: [Rating; 5] = [
        Rating::Forgot,
        Rating::Hard,
        Rating::Good,
        Rating::Easy,
        Rating::Perfect,
    ];

    /// Convert to the 5-point numeric value (1-5).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Forgot => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
            Self::Perfect => 5,
        }
    }

    /// Ratings of Good and above count as a successful recall.
    pub fn is_success(self) -> bool {
        self >= Self::Good
    }
}

impl TryFrom<u8> for Rating {
    type Error = SchedulerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Forgot),
            2 => Ok(Self::Hard),
            3 => Ok(Self::Good),
            4 => Ok(Self::Easy),
            5 => Ok(Self::Perfect),
            other => Err(SchedulerError::InvalidRating(other)),
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.to_value()
    }
}

/// Catalog entry for a practice problem. Never mutated by the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub tier: DifficultyTier,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub url: String,
}

impl Item {
    /// Create an item with no tags or content.
    pub fn new(id: i64, title: impl Into<String>, tier: DifficultyTier, url: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            tier,
            tags: BTreeSet::new(),
            content: None,
            url: url.into(),
        }
    }

    /// Builder-style helper for attaching topic tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}
