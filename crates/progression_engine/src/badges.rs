//! Badge unlock checks.
//!
//! Scans catalog badges the user does not hold and keeps the ones whose
//! criteria are met. A badge already held (by id or by name) is never
//! reported again, whatever the catalog query returned.

use crate::catalog::Badge;
use crate::unlock::criteria::UnlockContext;
use std::collections::BTreeSet;

/// Badges the user already owns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldBadges {
    pub ids: BTreeSet<String>,
    pub names: BTreeSet<String>,
}

impl HeldBadges {
    pub fn from_badges(badges: &[Badge]) -> Self {
        Self {
            ids: badges.iter().map(|b| b.id.clone()).collect(),
            names: badges.iter().map(|b| b.name.clone()).collect(),
        }
    }

    pub fn holds(&self, badge: &Badge) -> bool {
        self.ids.contains(&badge.id) || self.names.contains(&badge.name)
    }

    pub fn insert(&mut self, badge: &Badge) {
        self.ids.insert(badge.id.clone());
        self.names.insert(badge.name.clone());
    }
}

/// Check whether a single badge's criteria are met
pub fn is_earned(badge: &Badge, ctx: &UnlockContext<'_>) -> bool {
    badge.unlock_criteria.evaluate(ctx).passed
}

/// Badges from `candidates` that are not held and whose criteria are met,
/// in candidate order, without duplicates
pub fn newly_earned(
    candidates: &[Badge],
    held: &HeldBadges,
    ctx: &UnlockContext<'_>,
) -> Vec<Badge> {
    let mut seen = BTreeSet::new();
    candidates
        .iter()
        .filter(|b| !held.holds(b))
        .filter(|b| seen.insert(b.id.clone()))
        .filter(|b| {
            let earned = is_earned(b, ctx);
            tracing::debug!("Badge {} ({}): earned={}", b.id, b.name, earned);
            earned
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BadgeCategory, BadgeRarity};
    use crate::types::{UserStats, WorkCategory};
    use crate::unlock::criteria::UnlockCriteria;

    fn badge(id: &str, name: &str, criteria: UnlockCriteria) -> Badge {
        Badge {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            category: BadgeCategory::Milestone,
            rarity: BadgeRarity::Common,
            symbol: "[*]".to_string(),
            unlock_criteria: criteria,
        }
    }

    fn stats_with_tasks(community: u64, trust: u64) -> UserStats {
        let mut stats = UserStats::new("u");
        stats.trust_score = trust;
        for _ in 0..community {
            stats.category_mut(WorkCategory::Community).record_task(10, 4);
        }
        stats
    }

    #[test]
    fn test_first_task_badge() {
        let stats = stats_with_tasks(1, 0);
        let held = HeldBadges::default();
        let catalog = vec![
            badge("first", "First Steps", UnlockCriteria { tasks_completed: Some(1), ..Default::default() }),
            badge("ten", "Getting Started", UnlockCriteria { tasks_completed: Some(10), ..Default::default() }),
        ];
        let earned = newly_earned(&catalog, &held, &UnlockContext::new(&stats, &held.names));
        assert_eq!(earned.len(), 1);
        assert_eq!(earned[0].id, "first");
    }

    #[test]
    fn test_all_criteria_fields_required() {
        let stats = stats_with_tasks(3, 5);
        let held = HeldBadges::default();
        let criteria = UnlockCriteria {
            tasks_completed: Some(3),
            trust_score: Some(10),
            category_tasks: Some([(WorkCategory::Community, 3)].into_iter().collect()),
            ..Default::default()
        };
        let catalog = vec![badge("helper", "Helper", criteria)];
        let ctx = UnlockContext::new(&stats, &held.names);
        assert!(newly_earned(&catalog, &held, &ctx).is_empty());

        let trusted = stats_with_tasks(3, 10);
        let ctx = UnlockContext::new(&trusted, &held.names);
        assert_eq!(newly_earned(&catalog, &held, &ctx).len(), 1);
    }

    #[test]
    fn test_every_category_key_checked() {
        let stats = stats_with_tasks(5, 0);
        let held = HeldBadges::default();
        let criteria = UnlockCriteria {
            category_tasks: Some(
                [(WorkCategory::Community, 5), (WorkCategory::Freelance, 1)]
                    .into_iter()
                    .collect(),
            ),
            ..Default::default()
        };
        let catalog = vec![badge("multi", "Multi-talented", criteria)];
        let ctx = UnlockContext::new(&stats, &held.names);
        assert!(newly_earned(&catalog, &held, &ctx).is_empty());
    }

    #[test]
    fn test_held_badge_never_reported() {
        let stats = stats_with_tasks(50, 100);
        let first = badge("first", "First Steps", UnlockCriteria { tasks_completed: Some(1), ..Default::default() });
        let held = HeldBadges::from_badges(&[first.clone()]);
        let renamed_copy = badge("first-v2", "First Steps", UnlockCriteria::default());

        let catalog = vec![first, renamed_copy];
        let ctx = UnlockContext::new(&stats, &held.names);
        assert!(newly_earned(&catalog, &held, &ctx).is_empty());
    }

    #[test]
    fn test_duplicate_candidates_collapsed() {
        let stats = stats_with_tasks(1, 0);
        let held = HeldBadges::default();
        let b = badge("first", "First Steps", UnlockCriteria::default());
        let catalog = vec![b.clone(), b];
        let ctx = UnlockContext::new(&stats, &held.names);
        assert_eq!(newly_earned(&catalog, &held, &ctx).len(), 1);
    }
}
