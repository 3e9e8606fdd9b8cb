//! Immutable catalog entries: badges, zones and dungeons, plus the
//! user/badge ownership record.

use crate::types::WorkCategory;
use crate::unlock::criteria::UnlockCriteria;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Badge rarity, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeRarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Default for BadgeRarity {
    fn default() -> Self {
        Self::Common
    }
}

impl std::fmt::Display for BadgeRarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        };
        write!(f, "{}", s)
    }
}

/// What a badge rewards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeCategory {
    Milestone,
    Trust,
    Freelance,
    Community,
    Corporate,
    Special,
}

impl Default for BadgeCategory {
    fn default() -> Self {
        Self::Milestone
    }
}

impl From<WorkCategory> for BadgeCategory {
    fn from(category: WorkCategory) -> Self {
        match category {
            WorkCategory::Freelance => BadgeCategory::Freelance,
            WorkCategory::Community => BadgeCategory::Community,
            WorkCategory::Corporate => BadgeCategory::Corporate,
        }
    }
}

fn default_symbol() -> String {
    "[*]".to_string()
}

/// Catalog badge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: BadgeCategory,
    #[serde(default)]
    pub rarity: BadgeRarity,
    /// ASCII symbol for notifications (e.g. "[10]", "<*>")
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default)]
    pub unlock_criteria: UnlockCriteria,
}

/// A badge held by a user; unique per (user_id, badge_id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAchievement {
    pub id: Uuid,
    pub user_id: String,
    pub badge_id: String,
    pub earned_at: DateTime<Utc>,
}

impl UserAchievement {
    pub fn new(user_id: &str, badge_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            badge_id: badge_id.to_string(),
            earned_at: Utc::now(),
        }
    }
}

/// Zone terrain, drives celebration content only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerrainType {
    Forest,
    Mountain,
    Desert,
    Ocean,
    City,
    Tundra,
    Volcano,
}

impl Default for TerrainType {
    fn default() -> Self {
        Self::City
    }
}

impl std::fmt::Display for TerrainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Forest => "forest",
            Self::Mountain => "mountain",
            Self::Desert => "desert",
            Self::Ocean => "ocean",
            Self::City => "city",
            Self::Tundra => "tundra",
            Self::Volcano => "volcano",
        };
        write!(f, "{}", s)
    }
}

/// Difficulty tier of a zone or dungeon
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DifficultyTier {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
    Legendary,
}

impl Default for DifficultyTier {
    fn default() -> Self {
        Self::Beginner
    }
}

impl std::fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
            Self::Legendary => "legendary",
        };
        write!(f, "{}", s)
    }
}

/// Top-level unlockable area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub terrain: TerrainType,
    #[serde(default)]
    pub difficulty: DifficultyTier,
    #[serde(default)]
    pub unlock_requirements: UnlockCriteria,
}

/// Sub-area inside a zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dungeon {
    pub id: String,
    pub zone_id: String,
    pub name: String,
    pub category: WorkCategory,
    #[serde(default)]
    pub difficulty: DifficultyTier,
    #[serde(default)]
    pub entry_requirements: UnlockCriteria,
}
