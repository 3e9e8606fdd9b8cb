//! Sparse unlock criteria shared by zones, dungeons and badges.
//!
//! Every field is optional. Only present fields become predicates, and the
//! record passes iff every predicate passes. Unknown keys (including unknown
//! category names inside the per-category maps) are dropped on load.

use crate::types::{CategoryStats, UserStats, WorkCategory};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Gate for a zone, dungeon or badge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_score: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks_completed: Option<u64>,
    #[serde(default, alias = "badges", skip_serializing_if = "Option::is_none")]
    pub required_badges: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "lenient_category_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_tasks: Option<BTreeMap<WorkCategory, u64>>,
    #[serde(
        default,
        rename = "categoryXP",
        alias = "categoryXp",
        deserialize_with = "lenient_category_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_xp: Option<BTreeMap<WorkCategory, u64>>,
    #[serde(
        default,
        deserialize_with = "lenient_category_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_rating: Option<BTreeMap<WorkCategory, f64>>,
}

/// Sub-area entry gate
pub type EntryRequirements = UnlockCriteria;
/// Badge gate
pub type BadgeUnlockCriteria = UnlockCriteria;

fn lenient_category_map<'de, D, T>(
    deserializer: D,
) -> Result<Option<BTreeMap<WorkCategory, T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let raw: Option<BTreeMap<String, T>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|map| {
        map.into_iter()
            .filter_map(|(key, value)| match key.parse::<WorkCategory>() {
                Ok(category) => Some((category, value)),
                Err(_) => {
                    tracing::debug!("Ignoring unknown category '{}' in criteria", key);
                    None
                }
            })
            .collect()
    }))
}

/// The facts criteria are checked against
#[derive(Debug, Clone, Copy)]
pub struct UnlockContext<'a> {
    pub trust_score: u64,
    pub level: u32,
    pub tasks_completed: u64,
    pub held_badges: &'a BTreeSet<String>,
    pub category_stats: &'a BTreeMap<WorkCategory, CategoryStats>,
}

impl<'a> UnlockContext<'a> {
    pub fn new(stats: &'a UserStats, held_badges: &'a BTreeSet<String>) -> Self {
        Self {
            trust_score: stats.trust_score,
            level: stats.current_level,
            tasks_completed: stats.total_tasks_completed(),
            held_badges,
            category_stats: &stats.category_stats,
        }
    }

    fn category(&self, category: WorkCategory) -> CategoryStats {
        self.category_stats.get(&category).cloned().unwrap_or_default()
    }
}

/// Outcome of checking one criteria record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaEvaluation {
    pub passed: bool,
    /// One entry per failing predicate
    pub reasons: Vec<String>,
    /// Mean per-predicate completion, 0-100
    pub progress: u8,
    pub predicates: usize,
}

impl CriteriaEvaluation {
    /// All blockers in one line, or None when passed
    pub fn reason(&self) -> Option<String> {
        if self.reasons.is_empty() {
            None
        } else {
            Some(self.reasons.join("; "))
        }
    }
}

/// min(100, current / required * 100); a zero requirement is always complete
pub fn completion_ratio(current: f64, required: f64) -> f64 {
    if required <= 0.0 {
        return 100.0;
    }
    (current / required * 100.0).clamp(0.0, 100.0)
}

/// Accumulates predicate outcomes
struct Tally {
    reasons: Vec<String>,
    ratios: Vec<f64>,
}

impl Tally {
    fn check(&mut self, current: f64, required: f64, failure: impl FnOnce() -> String) {
        self.ratios.push(completion_ratio(current, required));
        if current < required {
            self.reasons.push(failure());
        }
    }
}

impl UnlockCriteria {
    /// No predicates at all
    pub fn is_empty(&self) -> bool {
        self.trust_score.is_none()
            && self.level.is_none()
            && self.tasks_completed.is_none()
            && self.required_badges.is_none()
            && self.category_tasks.is_none()
            && self.category_xp.is_none()
            && self.category_rating.is_none()
    }

    pub fn evaluate(&self, ctx: &UnlockContext<'_>) -> CriteriaEvaluation {
        let mut tally = Tally {
            reasons: Vec::new(),
            ratios: Vec::new(),
        };

        if let Some(required) = self.trust_score {
            tally.check(ctx.trust_score as f64, required as f64, || {
                format!("Need {} Trust Score (current: {})", required, ctx.trust_score)
            });
        }

        if let Some(required) = self.level {
            tally.check(ctx.level as f64, required as f64, || {
                format!("Need Level {} (current: {})", required, ctx.level)
            });
        }

        if let Some(required) = self.tasks_completed {
            tally.check(ctx.tasks_completed as f64, required as f64, || {
                format!(
                    "Need {} completed tasks (current: {})",
                    required, ctx.tasks_completed
                )
            });
        }

        if let Some(badges) = &self.required_badges {
            let missing: Vec<&str> = badges
                .iter()
                .filter(|b| !ctx.held_badges.contains(b.as_str()))
                .map(|b| b.as_str())
                .collect();
            let held = badges.len() - missing.len();
            tally.check(held as f64, badges.len() as f64, || {
                format!("Missing badges: {}", missing.join(", "))
            });
        }

        if let Some(map) = &self.category_tasks {
            for (category, required) in map {
                let current = ctx.category(*category).tasks_completed;
                tally.check(current as f64, *required as f64, || {
                    format!("Need {} {} tasks (current: {})", required, category, current)
                });
            }
        }

        if let Some(map) = &self.category_xp {
            for (category, required) in map {
                let current = ctx.category(*category).total_xp;
                tally.check(current as f64, *required as f64, || {
                    format!("Need {} {} XP (current: {})", required, category, current)
                });
            }
        }

        if let Some(map) = &self.category_rating {
            for (category, required) in map {
                let current = ctx.category(*category).average_rating;
                tally.check(current, *required, || {
                    format!(
                        "Need {:.1} {} rating (current: {:.1})",
                        required, category, current
                    )
                });
            }
        }

        let predicates = tally.ratios.len();
        let progress = if predicates == 0 {
            100
        } else {
            let mean = tally.ratios.iter().sum::<f64>() / predicates as f64;
            mean.round().clamp(0.0, 100.0) as u8
        };

        CriteriaEvaluation {
            passed: tally.reasons.is_empty(),
            reasons: tally.reasons,
            progress,
            predicates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(trust: u64, level: u32) -> UserStats {
        let mut s = UserStats::new("u");
        s.trust_score = trust;
        s.current_level = level;
        s
    }

    #[test]
    fn test_empty_criteria_passes() {
        let s = stats(0, 1);
        let held = BTreeSet::new();
        let eval = UnlockCriteria::default().evaluate(&UnlockContext::new(&s, &held));
        assert!(eval.passed);
        assert_eq!(eval.progress, 100);
        assert_eq!(eval.predicates, 0);
        assert!(eval.reason().is_none());
    }

    #[test]
    fn test_trust_blocks_but_level_passes() {
        let s = stats(10, 15);
        let held = BTreeSet::new();
        let criteria = UnlockCriteria {
            trust_score: Some(100),
            level: Some(10),
            ..Default::default()
        };
        let eval = criteria.evaluate(&UnlockContext::new(&s, &held));
        assert!(!eval.passed);
        let reason = eval.reason().unwrap();
        assert_eq!(reason, "Need 100 Trust Score (current: 10)");
        assert!(!reason.contains("Level"));
        // (10 + 100) / 2
        assert_eq!(eval.progress, 55);
    }

    #[test]
    fn test_all_reasons_joined() {
        let s = stats(0, 1);
        let held = BTreeSet::new();
        let criteria = UnlockCriteria {
            trust_score: Some(20),
            level: Some(3),
            tasks_completed: Some(5),
            ..Default::default()
        };
        let eval = criteria.evaluate(&UnlockContext::new(&s, &held));
        assert_eq!(eval.reasons.len(), 3);
        assert_eq!(eval.reason().unwrap().matches("; ").count(), 2);
        assert_eq!(eval.progress, 11);
    }

    #[test]
    fn test_every_required_badge_must_be_held() {
        let s = stats(0, 1);
        let held: BTreeSet<String> = ["Pathfinder".to_string()].into_iter().collect();
        let criteria = UnlockCriteria {
            required_badges: Some(vec!["Pathfinder".to_string(), "Mentor".to_string()]),
            ..Default::default()
        };
        let eval = criteria.evaluate(&UnlockContext::new(&s, &held));
        assert!(!eval.passed);
        assert_eq!(eval.reasons, vec!["Missing badges: Mentor".to_string()]);
        assert_eq!(eval.progress, 50);
    }

    #[test]
    fn test_category_predicates() {
        let mut s = stats(0, 1);
        s.category_mut(WorkCategory::Community).record_task(300, 5);
        let held = BTreeSet::new();
        let criteria = UnlockCriteria {
            category_tasks: Some([(WorkCategory::Community, 1)].into_iter().collect()),
            category_xp: Some([(WorkCategory::Community, 600)].into_iter().collect()),
            ..Default::default()
        };
        let eval = criteria.evaluate(&UnlockContext::new(&s, &held));
        assert!(!eval.passed);
        assert_eq!(eval.reasons, vec!["Need 600 community XP (current: 300)".to_string()]);
        assert_eq!(eval.progress, 75);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let json = r#"{
            "trustScore": 5,
            "favoriteColor": "blue",
            "categoryTasks": { "COMMUNITY": 2, "GUILD": 9 }
        }"#;
        let criteria: UnlockCriteria = serde_json::from_str(json).unwrap();
        assert_eq!(criteria.trust_score, Some(5));
        let tasks = criteria.category_tasks.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks.get(&WorkCategory::Community), Some(&2));
    }

    #[test]
    fn test_completion_ratio_caps() {
        assert_eq!(completion_ratio(500.0, 100.0), 100.0);
        assert_eq!(completion_ratio(0.0, 0.0), 100.0);
        assert_eq!(completion_ratio(25.0, 100.0), 25.0);
    }
}
