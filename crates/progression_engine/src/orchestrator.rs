//! Progression orchestrator
//!
//! Runs one "task completed" event end to end:
//!
//! 1. Load the latest stats (fail with `NotFound` if absent)
//! 2. Score the event (XP, trust, impact)
//! 3. Apply the deltas and advance the level
//! 4. Commit stats with a version check
//! 5. Award newly earned badges against the committed snapshot
//! 6. Unlock zones and commit them with a second version check
//!
//! Steps 5-6 are also exposed as [`ProgressionOrchestrator::reconcile`]: after
//! a crash between commits, re-running it grants exactly what is still pending.

use crate::badges::{self, HeldBadges};
use crate::catalog::Badge;
use crate::config::EngineConfig;
use crate::error::{ProgressionError, Result};
use crate::level::{LevelCurve, LevelUpResult};
use crate::repository::{CatalogRepository, StatsRecord, StatsRepository};
use crate::score::{
    apply_trust_delta, ImpactCalculation, ScoreCalculator, TrustCalculation, XpCalculation,
};
use crate::types::{TaskCompletionEvent, UserStats, WorkCategory};
use crate::unlock::content::CelebrationContent;
use crate::unlock::criteria::UnlockContext;
use crate::unlock::tiers::{self, TierUnlockResult};
use crate::unlock::zones::{self, DungeonAccess, ZoneUnlockResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything one event changed, for the caller to broadcast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionResult {
    pub user_id: String,
    pub xp: XpCalculation,
    pub trust: TrustCalculation,
    pub impact: ImpactCalculation,
    pub level: LevelUpResult,
    pub new_badges: Vec<Badge>,
    pub unlocked_zones: Vec<String>,
    pub celebrations: Vec<CelebrationContent>,
    pub unlocked_tiers: Vec<TierUnlockResult>,
    /// Snapshot as committed by the store
    pub stats: UserStats,
    pub version: u64,
}

/// Badge and zone grants applied to a committed snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantOutcome {
    pub new_badges: Vec<Badge>,
    pub zones: Vec<ZoneUnlockResult>,
    pub held_badges: Vec<String>,
    pub stats: UserStats,
    pub version: u64,
}

pub struct ProgressionOrchestrator {
    stats: Arc<dyn StatsRepository>,
    catalog: Arc<dyn CatalogRepository>,
    scores: ScoreCalculator,
    curve: LevelCurve,
}

impl ProgressionOrchestrator {
    pub fn new(
        stats: Arc<dyn StatsRepository>,
        catalog: Arc<dyn CatalogRepository>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            stats,
            catalog,
            scores: ScoreCalculator::new(config.scoring()),
            curve: LevelCurve::new(config.levels.clone()),
        }
    }

    pub fn with_defaults(
        stats: Arc<dyn StatsRepository>,
        catalog: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self::new(stats, catalog, &EngineConfig::default())
    }

    pub fn curve(&self) -> &LevelCurve {
        &self.curve
    }

    fn load(&self, user_id: &str) -> Result<StatsRecord> {
        self.stats
            .load(user_id)?
            .ok_or_else(|| ProgressionError::not_found(user_id))
    }

    fn commit(&self, user_id: &str, expected_version: u64, stats: &UserStats) -> Result<u64> {
        self.stats
            .update_if_version(user_id, expected_version, stats)
            .map_err(|e| {
                if e.is_conflict() {
                    warn!("Stats for {} changed during update: {}", user_id, e);
                }
                e
            })
    }

    /// Apply one completed task and everything it unlocks
    pub fn complete_task(
        &self,
        user_id: &str,
        event: &TaskCompletionEvent,
    ) -> Result<ProgressionResult> {
        let record = self.load(user_id)?;
        let before = record.stats;

        let scores = self.scores.score_event(event, before.current_level);
        let quality = event.quality();

        let mut updated = before.clone();
        updated.xp_points = updated.xp_points.saturating_add(scores.xp.total_xp);
        updated.trust_score = apply_trust_delta(updated.trust_score, scores.trust.total_change);
        updated.rwis_score = updated.rwis_score.saturating_add(scores.impact.total_impact);
        updated
            .category_mut(event.category)
            .record_task(scores.xp.total_xp, quality);

        let level = self.curve.advance(updated.xp_points, before.current_level);
        updated.current_level = level.new_level;

        let version = self.commit(user_id, record.version, &updated)?;
        info!(
            "Task completed for {}: +{} XP, {:+} trust, +{} impact, level {} -> {}",
            user_id,
            scores.xp.total_xp,
            scores.trust.total_change,
            scores.impact.total_impact,
            level.previous_level,
            level.new_level
        );

        let held_before = HeldBadges::from_badges(&self.catalog.held_badges(user_id)?);
        let grants = self.grant_pending(
            user_id,
            StatsRecord {
                stats: updated,
                version,
            },
            held_before.clone(),
        )?;

        let held_after: BTreeSet<String> = grants.held_badges.iter().cloned().collect();
        let unlocked_tiers = tiers::newly_unlocked_tiers(
            event.category,
            (&before.category(event.category), &held_before.names),
            (&grants.stats.category(event.category), &held_after),
        );

        Ok(ProgressionResult {
            user_id: user_id.to_string(),
            xp: scores.xp,
            trust: scores.trust,
            impact: scores.impact,
            level,
            new_badges: grants.new_badges,
            unlocked_zones: grants.zones.iter().map(|z| z.zone_id.clone()).collect(),
            celebrations: grants
                .zones
                .into_iter()
                .filter_map(|z| z.celebration)
                .collect(),
            unlocked_tiers,
            stats: grants.stats,
            version: grants.version,
        })
    }

    /// Grant badges and zones still pending for the committed snapshot
    pub fn reconcile(&self, user_id: &str) -> Result<GrantOutcome> {
        let record = self.load(user_id)?;
        let held = HeldBadges::from_badges(&self.catalog.held_badges(user_id)?);
        self.grant_pending(user_id, record, held)
    }

    fn grant_pending(
        &self,
        user_id: &str,
        record: StatsRecord,
        mut held: HeldBadges,
    ) -> Result<GrantOutcome> {
        let StatsRecord {
            stats: mut current,
            mut version,
        } = record;

        let candidates = self.catalog.badges_not_held(user_id)?;
        let earned = {
            let ctx = UnlockContext::new(&current, &held.names);
            badges::newly_earned(&candidates, &held, &ctx)
        };
        for badge in &earned {
            self.catalog.award_badge(user_id, &badge.id)?;
            held.insert(badge);
            info!("Badge earned by {}: {} ({})", user_id, badge.name, badge.rarity);
        }

        let catalog_zones = self.catalog.zones()?;
        let unlocked = {
            let ctx = UnlockContext::new(&current, &held.names);
            zones::newly_unlocked_zones(&catalog_zones, &current, &ctx)
        };

        if !unlocked.is_empty() {
            for zone in &unlocked {
                current.unlocked_zones.insert(zone.zone_id.clone());
            }
            version = self.commit(user_id, version, &current)?;
            info!(
                "Zones unlocked for {}: {}",
                user_id,
                unlocked
                    .iter()
                    .map(|z| z.zone_id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        } else {
            debug!("No zones unlocked for {}", user_id);
        }

        Ok(GrantOutcome {
            new_badges: earned,
            zones: unlocked,
            held_badges: held.names.into_iter().collect(),
            stats: current,
            version,
        })
    }

    /// Every locked zone with its blockers and progress
    pub fn zone_progress(&self, user_id: &str) -> Result<Vec<ZoneUnlockResult>> {
        let record = self.load(user_id)?;
        let held = HeldBadges::from_badges(&self.catalog.held_badges(user_id)?);
        let catalog_zones = self.catalog.zones()?;
        let ctx = UnlockContext::new(&record.stats, &held.names);
        Ok(zones::evaluate_locked_zones(&catalog_zones, &record.stats, &ctx))
    }

    /// Entry decision for every dungeon in a zone
    pub fn dungeon_access(&self, user_id: &str, zone_id: &str) -> Result<Vec<DungeonAccess>> {
        let record = self.load(user_id)?;
        let held = HeldBadges::from_badges(&self.catalog.held_badges(user_id)?);
        let dungeons = self.catalog.dungeons_for_zones(&[zone_id.to_string()])?;
        let ctx = UnlockContext::new(&record.stats, &held.names);
        Ok(dungeons
            .iter()
            .map(|d| zones::evaluate_dungeon(d, &record.stats, &ctx))
            .collect())
    }

    /// Tier table evaluation for one category
    pub fn category_tiers(
        &self,
        user_id: &str,
        category: WorkCategory,
    ) -> Result<Vec<TierUnlockResult>> {
        let record = self.load(user_id)?;
        let held = HeldBadges::from_badges(&self.catalog.held_badges(user_id)?);
        Ok(tiers::evaluate_category_tiers(
            category,
            &record.stats.category(category),
            &held.names,
        ))
    }
}
