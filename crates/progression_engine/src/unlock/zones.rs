//! Zone and dungeon gates.

use super::content::{celebration_for, difficulty_multiplier, CelebrationContent};
use super::criteria::UnlockContext;
use crate::catalog::{Dungeon, Zone};
use crate::types::UserStats;
use serde::{Deserialize, Serialize};

/// Unlock decision for one zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneUnlockResult {
    pub zone_id: String,
    pub zone_name: String,
    pub unlocked: bool,
    /// All failing predicates, "; "-joined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub celebration: Option<CelebrationContent>,
}

pub fn evaluate_zone(zone: &Zone, ctx: &UnlockContext<'_>) -> ZoneUnlockResult {
    let eval = zone.unlock_requirements.evaluate(ctx);
    tracing::debug!(
        "Zone {}: passed={} progress={} predicates={}",
        zone.id,
        eval.passed,
        eval.progress,
        eval.predicates
    );

    ZoneUnlockResult {
        zone_id: zone.id.clone(),
        zone_name: zone.name.clone(),
        unlocked: eval.passed,
        reason: eval.reason(),
        progress: eval.progress,
        celebration: if eval.passed {
            Some(celebration_for(zone))
        } else {
            None
        },
    }
}

/// Evaluate every zone not yet in `stats.unlocked_zones`, in catalog order
pub fn evaluate_locked_zones(
    zones: &[Zone],
    stats: &UserStats,
    ctx: &UnlockContext<'_>,
) -> Vec<ZoneUnlockResult> {
    zones
        .iter()
        .filter(|z| !stats.has_zone(&z.id))
        .map(|z| evaluate_zone(z, ctx))
        .collect()
}

/// Locked zones whose requirements are now met
pub fn newly_unlocked_zones(
    zones: &[Zone],
    stats: &UserStats,
    ctx: &UnlockContext<'_>,
) -> Vec<ZoneUnlockResult> {
    evaluate_locked_zones(zones, stats, ctx)
        .into_iter()
        .filter(|r| r.unlocked)
        .collect()
}

/// Entry decision for one dungeon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DungeonAccess {
    pub dungeon_id: String,
    pub dungeon_name: String,
    pub zone_id: String,
    pub can_enter: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub progress: u8,
    pub difficulty_multiplier: f64,
}

/// A dungeon needs its zone unlocked plus its own entry requirements
pub fn evaluate_dungeon(
    dungeon: &Dungeon,
    stats: &UserStats,
    ctx: &UnlockContext<'_>,
) -> DungeonAccess {
    let eval = dungeon.entry_requirements.evaluate(ctx);
    let zone_open = stats.has_zone(&dungeon.zone_id);

    let mut reasons = Vec::new();
    if !zone_open {
        reasons.push(format!("Zone {} is locked", dungeon.zone_id));
    }
    reasons.extend(eval.reasons);

    DungeonAccess {
        dungeon_id: dungeon.id.clone(),
        dungeon_name: dungeon.name.clone(),
        zone_id: dungeon.zone_id.clone(),
        can_enter: reasons.is_empty(),
        reason: if reasons.is_empty() {
            None
        } else {
            Some(reasons.join("; "))
        },
        progress: eval.progress,
        difficulty_multiplier: difficulty_multiplier(dungeon.difficulty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DifficultyTier, TerrainType};
    use crate::types::WorkCategory;
    use crate::unlock::criteria::UnlockCriteria;
    use std::collections::BTreeSet;

    fn zone(id: &str, criteria: UnlockCriteria) -> Zone {
        Zone {
            id: id.to_string(),
            name: format!("Zone {}", id),
            description: String::new(),
            terrain: TerrainType::Forest,
            difficulty: DifficultyTier::Beginner,
            unlock_requirements: criteria,
        }
    }

    #[test]
    fn test_zone_without_requirements_unlocks() {
        let stats = UserStats::new("u");
        let held = BTreeSet::new();
        let result = evaluate_zone(&zone("start", UnlockCriteria::default()), &UnlockContext::new(&stats, &held));
        assert!(result.unlocked);
        assert_eq!(result.progress, 100);
        assert!(result.reason.is_none());
        assert!(result.celebration.is_some());
    }

    #[test]
    fn test_trust_gate_reports_only_failing_predicate() {
        let mut stats = UserStats::new("u");
        stats.trust_score = 10;
        stats.current_level = 15;
        let held = BTreeSet::new();
        let criteria = UnlockCriteria {
            trust_score: Some(100),
            level: Some(10),
            ..Default::default()
        };
        let result = evaluate_zone(&zone("peak", criteria), &UnlockContext::new(&stats, &held));
        assert!(!result.unlocked);
        let reason = result.reason.unwrap();
        assert!(reason.contains("Trust Score"));
        assert!(!reason.contains("Level"));
        assert!(result.celebration.is_none());
    }

    #[test]
    fn test_already_unlocked_zones_skipped() {
        let mut stats = UserStats::new("u");
        stats.unlocked_zones.insert("a".to_string());
        let held = BTreeSet::new();
        let zones = vec![
            zone("a", UnlockCriteria::default()),
            zone("b", UnlockCriteria::default()),
            zone("c", UnlockCriteria { level: Some(50), ..Default::default() }),
        ];
        let ctx = UnlockContext::new(&stats, &held);
        let locked = evaluate_locked_zones(&zones, &stats, &ctx);
        assert_eq!(locked.len(), 2);
        let newly = newly_unlocked_zones(&zones, &stats, &ctx);
        assert_eq!(newly.len(), 1);
        assert_eq!(newly[0].zone_id, "b");
    }

    #[test]
    fn test_dungeon_needs_open_zone_and_all_badges() {
        let mut stats = UserStats::new("u");
        let held: BTreeSet<String> = ["Scout".to_string()].into_iter().collect();
        let dungeon = Dungeon {
            id: "d1".to_string(),
            zone_id: "forest".to_string(),
            name: "Root Cellar".to_string(),
            category: WorkCategory::Community,
            difficulty: DifficultyTier::Advanced,
            entry_requirements: UnlockCriteria {
                required_badges: Some(vec!["Scout".to_string(), "Healer".to_string()]),
                ..Default::default()
            },
        };

        let access = evaluate_dungeon(&dungeon, &stats, &UnlockContext::new(&stats, &held));
        assert!(!access.can_enter);
        let reason = access.reason.unwrap();
        assert!(reason.contains("Zone forest is locked"));
        assert!(reason.contains("Healer"));
        assert_eq!(access.difficulty_multiplier, 1.5);

        stats.unlocked_zones.insert("forest".to_string());
        let both: BTreeSet<String> = ["Scout".to_string(), "Healer".to_string()].into_iter().collect();
        let access = evaluate_dungeon(&dungeon, &stats, &UnlockContext::new(&stats, &both));
        assert!(access.can_enter);
        assert_eq!(access.progress, 100);
    }
}
