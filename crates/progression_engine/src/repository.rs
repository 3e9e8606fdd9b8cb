//! Repository seams for the orchestrator.
//!
//! The engine never persists anything itself. The external store implements
//! these traits; the in-memory versions below back the tests and the CLI.
//!
//! Stats writes are compare-and-set on a per-user version: a writer that read
//! version N can only commit while the stored version is still N. This is what
//! serializes concurrent completions for the same user.

use crate::catalog::{Badge, Dungeon, UserAchievement, Zone};
use crate::error::{ProgressionError, Result};
use crate::types::UserStats;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

/// Stats snapshot plus the version it was read at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRecord {
    pub stats: UserStats,
    pub version: u64,
}

pub trait StatsRepository: Send + Sync {
    /// Latest committed snapshot, or None if the user has no stats
    fn load(&self, user_id: &str) -> Result<Option<StatsRecord>>;

    /// Commit `stats` iff the stored version equals `expected_version`.
    /// Returns the new version; fails with `VersionConflict` otherwise.
    fn update_if_version(
        &self,
        user_id: &str,
        expected_version: u64,
        stats: &UserStats,
    ) -> Result<u64>;
}

pub trait CatalogRepository: Send + Sync {
    fn zones(&self) -> Result<Vec<Zone>>;

    fn dungeons_for_zones(&self, zone_ids: &[String]) -> Result<Vec<Dungeon>>;

    /// Catalog badges the user does not hold yet
    fn badges_not_held(&self, user_id: &str) -> Result<Vec<Badge>>;

    /// Catalog entries of the badges the user holds
    fn held_badges(&self, user_id: &str) -> Result<Vec<Badge>>;

    /// Idempotent upsert on (user_id, badge_id): an existing award is returned
    /// unchanged
    fn award_badge(&self, user_id: &str, badge_id: &str) -> Result<UserAchievement>;
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| ProgressionError::Storage("repository lock poisoned".to_string()))
}

/// Process-local stats store
#[derive(Debug, Default)]
pub struct InMemoryStatsRepository {
    records: Mutex<HashMap<String, StatsRecord>>,
}

impl InMemoryStatsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user at version 1 (replaces any existing record)
    pub fn insert(&self, stats: UserStats) -> Result<()> {
        let mut records = lock(&self.records)?;
        records.insert(
            stats.user_id.clone(),
            StatsRecord { stats, version: 1 },
        );
        Ok(())
    }

    pub fn version(&self, user_id: &str) -> Result<Option<u64>> {
        Ok(lock(&self.records)?.get(user_id).map(|r| r.version))
    }
}

impl StatsRepository for InMemoryStatsRepository {
    fn load(&self, user_id: &str) -> Result<Option<StatsRecord>> {
        Ok(lock(&self.records)?.get(user_id).cloned())
    }

    fn update_if_version(
        &self,
        user_id: &str,
        expected_version: u64,
        stats: &UserStats,
    ) -> Result<u64> {
        let mut records = lock(&self.records)?;
        let record = records
            .get_mut(user_id)
            .ok_or_else(|| ProgressionError::not_found(user_id))?;

        if record.version != expected_version {
            return Err(ProgressionError::VersionConflict {
                user_id: user_id.to_string(),
                expected: expected_version,
                actual: record.version,
            });
        }

        record.stats = stats.clone();
        record.version += 1;
        Ok(record.version)
    }
}

/// Serializable catalog contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub dungeons: Vec<Dungeon>,
    #[serde(default)]
    pub badges: Vec<Badge>,
}

/// Process-local catalog with an achievement table keyed by (user, badge)
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    catalog: CatalogSnapshot,
    achievements: Mutex<BTreeMap<(String, String), UserAchievement>>,
}

impl InMemoryCatalog {
    pub fn new(catalog: CatalogSnapshot) -> Self {
        Self {
            catalog,
            achievements: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    /// All awards for a user, oldest first
    pub fn achievements_for(&self, user_id: &str) -> Result<Vec<UserAchievement>> {
        let achievements = lock(&self.achievements)?;
        let mut awards: Vec<UserAchievement> = achievements
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        awards.sort_by_key(|a| a.earned_at);
        Ok(awards)
    }

    fn held_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let achievements = lock(&self.achievements)?;
        Ok(achievements
            .keys()
            .filter(|(u, _)| u == user_id)
            .map(|(_, b)| b.clone())
            .collect())
    }
}

impl CatalogRepository for InMemoryCatalog {
    fn zones(&self) -> Result<Vec<Zone>> {
        Ok(self.catalog.zones.clone())
    }

    fn dungeons_for_zones(&self, zone_ids: &[String]) -> Result<Vec<Dungeon>> {
        Ok(self
            .catalog
            .dungeons
            .iter()
            .filter(|d| zone_ids.contains(&d.zone_id))
            .cloned()
            .collect())
    }

    fn badges_not_held(&self, user_id: &str) -> Result<Vec<Badge>> {
        let held = self.held_ids(user_id)?;
        Ok(self
            .catalog
            .badges
            .iter()
            .filter(|b| !held.contains(&b.id))
            .cloned()
            .collect())
    }

    fn held_badges(&self, user_id: &str) -> Result<Vec<Badge>> {
        let held = self.held_ids(user_id)?;
        Ok(self
            .catalog
            .badges
            .iter()
            .filter(|b| held.contains(&b.id))
            .cloned()
            .collect())
    }

    fn award_badge(&self, user_id: &str, badge_id: &str) -> Result<UserAchievement> {
        if !self.catalog.badges.iter().any(|b| b.id == badge_id) {
            return Err(ProgressionError::InvalidInput(format!(
                "unknown badge {}",
                badge_id
            )));
        }

        let mut achievements = lock(&self.achievements)?;
        let award = achievements
            .entry((user_id.to_string(), badge_id.to_string()))
            .or_insert_with(|| UserAchievement::new(user_id, badge_id));
        Ok(award.clone())
    }
}
