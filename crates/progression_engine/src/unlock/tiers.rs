//! In-category tiers: BASIC -> ADVANCED -> EXPERT -> MASTER.
//!
//! Each work category has its own static table. A tier unlocks when the
//! category's task count, XP and average rating all meet the thresholds and
//! every special badge of the tier is held. Progress only reflects the three
//! numeric thresholds.

use super::criteria::completion_ratio;
use crate::types::{CategoryStats, WorkCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Basic,
    Advanced,
    Expert,
    Master,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Basic => "BASIC",
            Self::Advanced => "ADVANCED",
            Self::Expert => "EXPERT",
            Self::Master => "MASTER",
        };
        write!(f, "{}", s)
    }
}

/// Thresholds for one tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierRequirement {
    pub tier: Tier,
    pub category_tasks_completed: u64,
    #[serde(rename = "categoryXP")]
    pub category_xp: u64,
    pub category_rating: f64,
    pub special_badges: &'static [&'static str],
}

pub const FREELANCE_TIERS: [TierRequirement; 4] = [
    TierRequirement {
        tier: Tier::Basic,
        category_tasks_completed: 0,
        category_xp: 0,
        category_rating: 0.0,
        special_badges: &[],
    },
    TierRequirement {
        tier: Tier::Advanced,
        category_tasks_completed: 10,
        category_xp: 1_000,
        category_rating: 3.5,
        special_badges: &[],
    },
    TierRequirement {
        tier: Tier::Expert,
        category_tasks_completed: 50,
        category_xp: 7_500,
        category_rating: 4.0,
        special_badges: &["Freelance Pro"],
    },
    TierRequirement {
        tier: Tier::Master,
        category_tasks_completed: 150,
        category_xp: 25_000,
        category_rating: 4.5,
        special_badges: &["Freelance Pro", "Client Favorite"],
    },
];

pub const COMMUNITY_TIERS: [TierRequirement; 4] = [
    TierRequirement {
        tier: Tier::Basic,
        category_tasks_completed: 0,
        category_xp: 0,
        category_rating: 0.0,
        special_badges: &[],
    },
    TierRequirement {
        tier: Tier::Advanced,
        category_tasks_completed: 5,
        category_xp: 500,
        category_rating: 3.0,
        special_badges: &[],
    },
    TierRequirement {
        tier: Tier::Expert,
        category_tasks_completed: 25,
        category_xp: 5_000,
        category_rating: 3.8,
        special_badges: &["Community Hero"],
    },
    TierRequirement {
        tier: Tier::Master,
        category_tasks_completed: 100,
        category_xp: 20_000,
        category_rating: 4.3,
        special_badges: &["Community Hero", "Changemaker"],
    },
];

pub const CORPORATE_TIERS: [TierRequirement; 4] = [
    TierRequirement {
        tier: Tier::Basic,
        category_tasks_completed: 0,
        category_xp: 0,
        category_rating: 0.0,
        special_badges: &[],
    },
    TierRequirement {
        tier: Tier::Advanced,
        category_tasks_completed: 15,
        category_xp: 1_500,
        category_rating: 3.5,
        special_badges: &[],
    },
    TierRequirement {
        tier: Tier::Expert,
        category_tasks_completed: 60,
        category_xp: 10_000,
        category_rating: 4.0,
        special_badges: &["Corporate Specialist"],
    },
    TierRequirement {
        tier: Tier::Master,
        category_tasks_completed: 200,
        category_xp: 35_000,
        category_rating: 4.6,
        special_badges: &["Corporate Specialist", "Enterprise Partner"],
    },
];

pub fn tier_table(category: WorkCategory) -> &'static [TierRequirement; 4] {
    match category {
        WorkCategory::Freelance => &FREELANCE_TIERS,
        WorkCategory::Community => &COMMUNITY_TIERS,
        WorkCategory::Corporate => &CORPORATE_TIERS,
    }
}

/// Decision for one tier of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierUnlockResult {
    pub category: WorkCategory,
    pub tier: Tier,
    pub unlocked: bool,
    pub progress: u8,
    pub reasons: Vec<String>,
}

pub fn evaluate_tier(
    category: WorkCategory,
    requirement: &TierRequirement,
    stats: &CategoryStats,
    held_badges: &BTreeSet<String>,
) -> TierUnlockResult {
    let mut reasons = Vec::new();

    if stats.tasks_completed < requirement.category_tasks_completed {
        reasons.push(format!(
            "Need {} {} tasks (current: {})",
            requirement.category_tasks_completed, category, stats.tasks_completed
        ));
    }
    if stats.total_xp < requirement.category_xp {
        reasons.push(format!(
            "Need {} {} XP (current: {})",
            requirement.category_xp, category, stats.total_xp
        ));
    }
    if stats.average_rating < requirement.category_rating {
        reasons.push(format!(
            "Need {:.1} {} rating (current: {:.1})",
            requirement.category_rating, category, stats.average_rating
        ));
    }

    let missing: Vec<&str> = requirement
        .special_badges
        .iter()
        .copied()
        .filter(|b| !held_badges.contains(*b))
        .collect();
    if !missing.is_empty() {
        reasons.push(format!("Missing badges: {}", missing.join(", ")));
    }

    let ratios = [
        completion_ratio(
            stats.tasks_completed as f64,
            requirement.category_tasks_completed as f64,
        ),
        completion_ratio(stats.total_xp as f64, requirement.category_xp as f64),
        completion_ratio(stats.average_rating, requirement.category_rating),
    ];
    let progress = (ratios.iter().sum::<f64>() / ratios.len() as f64)
        .round()
        .clamp(0.0, 100.0) as u8;

    TierUnlockResult {
        category,
        tier: requirement.tier,
        unlocked: reasons.is_empty(),
        progress,
        reasons,
    }
}

/// Evaluate all four tiers of a category, lowest first
pub fn evaluate_category_tiers(
    category: WorkCategory,
    stats: &CategoryStats,
    held_badges: &BTreeSet<String>,
) -> Vec<TierUnlockResult> {
    tier_table(category)
        .iter()
        .map(|req| evaluate_tier(category, req, stats, held_badges))
        .collect()
}

/// Highest tier such that it and every tier below it are unlocked
pub fn current_tier(
    category: WorkCategory,
    stats: &CategoryStats,
    held_badges: &BTreeSet<String>,
) -> Tier {
    evaluate_category_tiers(category, stats, held_badges)
        .iter()
        .take_while(|r| r.unlocked)
        .last()
        .map(|r| r.tier)
        .unwrap_or(Tier::Basic)
}

/// Tiers unlocked with the `after` state that were locked with `before`
pub fn newly_unlocked_tiers(
    category: WorkCategory,
    before: (&CategoryStats, &BTreeSet<String>),
    after: (&CategoryStats, &BTreeSet<String>),
) -> Vec<TierUnlockResult> {
    let old = evaluate_category_tiers(category, before.0, before.1);
    evaluate_category_tiers(category, after.0, after.1)
        .into_iter()
        .zip(old)
        .filter(|(new, old)| new.unlocked && !old.unlocked)
        .map(|(new, _)| new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(tasks: u64, xp: u64, rating: f64) -> CategoryStats {
        CategoryStats {
            tasks_completed: tasks,
            total_xp: xp,
            average_rating: rating,
            ..Default::default()
        }
    }

    #[test]
    fn test_basic_always_unlocked() {
        let held = BTreeSet::new();
        let results = evaluate_category_tiers(WorkCategory::Freelance, &cat(0, 0, 0.0), &held);
        assert_eq!(results.len(), 4);
        assert!(results[0].unlocked);
        assert_eq!(results[0].progress, 100);
        assert!(!results[1].unlocked);
    }

    #[test]
    fn test_advanced_tier_progress() {
        let held = BTreeSet::new();
        let result = evaluate_tier(
            WorkCategory::Community,
            &COMMUNITY_TIERS[1],
            &cat(5, 250, 3.0),
            &held,
        );
        assert!(!result.unlocked);
        // (100 + 50 + 100) / 3
        assert_eq!(result.progress, 83);
        assert_eq!(result.reasons, vec!["Need 500 community XP (current: 250)".to_string()]);
    }

    #[test]
    fn test_special_badges_enforced() {
        let stats = cat(30, 6_000, 4.0);
        let none = BTreeSet::new();
        let expert = evaluate_tier(WorkCategory::Community, &COMMUNITY_TIERS[2], &stats, &none);
        assert!(!expert.unlocked);
        assert_eq!(expert.progress, 100);
        assert!(expert.reasons[0].contains("Community Hero"));

        let held: BTreeSet<String> = ["Community Hero".to_string()].into_iter().collect();
        let expert = evaluate_tier(WorkCategory::Community, &COMMUNITY_TIERS[2], &stats, &held);
        assert!(expert.unlocked);
        assert_eq!(current_tier(WorkCategory::Community, &stats, &held), Tier::Expert);
        assert_eq!(current_tier(WorkCategory::Community, &stats, &none), Tier::Advanced);
    }

    #[test]
    fn test_newly_unlocked_tiers() {
        let held = BTreeSet::new();
        let before = cat(9, 990, 4.0);
        let after = cat(10, 1_100, 4.0);
        let newly = newly_unlocked_tiers(WorkCategory::Freelance, (&before, &held), (&after, &held));
        assert_eq!(newly.len(), 1);
        assert_eq!(newly[0].tier, Tier::Advanced);
    }
}
