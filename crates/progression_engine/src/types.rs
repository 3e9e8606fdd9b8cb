//! Core value types: work categories, rewards, per-user stats and the
//! task completion event that drives a progression update.
//!
//! Ordering of `WorkCategory` is pinned (Freelance, Community, Corporate) so
//! maps keyed by category serialize deterministically.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Default quality score when the event carries none
pub const DEFAULT_QUALITY_SCORE: u8 = 3;
/// Quality scores are clamped into this range
pub const MIN_QUALITY_SCORE: u8 = 1;
pub const MAX_QUALITY_SCORE: u8 = 5;

/// Kind of work a task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkCategory {
    Freelance,
    Community,
    Corporate,
}

impl WorkCategory {
    pub const ALL: [WorkCategory; 3] = [
        WorkCategory::Freelance,
        WorkCategory::Community,
        WorkCategory::Corporate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            WorkCategory::Freelance => "freelance",
            WorkCategory::Community => "community",
            WorkCategory::Corporate => "corporate",
        }
    }
}

impl std::fmt::Display for WorkCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for WorkCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "freelance" => Ok(WorkCategory::Freelance),
            "community" => Ok(WorkCategory::Community),
            "corporate" => Ok(WorkCategory::Corporate),
            other => Err(format!(
                "Invalid category: '{}'. Valid values: freelance, community, corporate",
                other
            )),
        }
    }
}

/// Complexity of a task, used for the impact bonus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskComplexity {
    Low,
    Medium,
    High,
}

impl Default for TaskComplexity {
    fn default() -> Self {
        Self::Medium
    }
}

impl std::fmt::Display for TaskComplexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        };
        write!(f, "{}", s)
    }
}

/// Static reward hints attached to a task template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRewards {
    pub xp: u64,
    #[serde(default)]
    pub trust_score_bonus: i64,
    #[serde(default)]
    pub rwis_points: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<f64>,
}

/// Per-category rollup of completed work
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    #[serde(default)]
    pub tasks_completed: u64,
    #[serde(default, rename = "totalXP", alias = "totalXp")]
    pub total_xp: u64,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub specializations: BTreeSet<String>,
}

impl CategoryStats {
    /// Record one completed task and fold its quality into the running mean
    pub fn record_task(&mut self, xp: u64, quality_score: u8) {
        self.tasks_completed += 1;
        self.total_xp = self.total_xp.saturating_add(xp);
        let n = self.tasks_completed as f64;
        self.average_rating = (self.average_rating * (n - 1.0) + quality_score as f64) / n;
    }
}

/// Snapshot of a user's progression state, owned by the external store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub user_id: String,
    #[serde(default)]
    pub trust_score: u64,
    #[serde(default)]
    pub rwis_score: u64,
    #[serde(default)]
    pub xp_points: u64,
    #[serde(default = "first_level")]
    pub current_level: u32,
    #[serde(default)]
    pub unlocked_zones: BTreeSet<String>,
    #[serde(default)]
    pub category_stats: BTreeMap<WorkCategory, CategoryStats>,
}

fn first_level() -> u32 {
    1
}

impl UserStats {
    /// Account-creation state: zero scores, level 1, empty categories
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            trust_score: 0,
            rwis_score: 0,
            xp_points: 0,
            current_level: 1,
            unlocked_zones: BTreeSet::new(),
            category_stats: WorkCategory::ALL
                .iter()
                .map(|c| (*c, CategoryStats::default()))
                .collect(),
        }
    }

    pub fn total_tasks_completed(&self) -> u64 {
        self.category_stats.values().map(|c| c.tasks_completed).sum()
    }

    /// Stats for a category, empty if the store has none yet
    pub fn category(&self, category: WorkCategory) -> CategoryStats {
        self.category_stats.get(&category).cloned().unwrap_or_default()
    }

    pub fn category_mut(&mut self, category: WorkCategory) -> &mut CategoryStats {
        self.category_stats.entry(category).or_default()
    }

    pub fn has_zone(&self, zone_id: &str) -> bool {
        self.unlocked_zones.contains(zone_id)
    }
}

/// One completed, already-verified work item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCompletionEvent {
    pub rewards: TaskRewards,
    pub category: WorkCategory,
    /// Any JSON number is accepted; fractional scores round to the nearest whole score
    #[serde(
        default,
        deserialize_with = "deserialize_quality",
        skip_serializing_if = "Option::is_none"
    )]
    pub quality_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_time: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_complexity: Option<TaskComplexity>,
}

fn deserialize_quality<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<f64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(score) if !score.is_finite() => Err(serde::de::Error::custom(format!(
            "quality score must be a finite number, got {}",
            score
        ))),
        Some(score) => Ok(Some(score.round().clamp(0.0, u8::MAX as f64) as u8)),
    }
}

impl TaskCompletionEvent {
    pub fn new(rewards: TaskRewards, category: WorkCategory) -> Self {
        Self {
            rewards,
            category,
            quality_score: None,
            completion_time_ratio: None,
            on_time: None,
            client_feedback: None,
            task_complexity: None,
        }
    }

    pub fn with_quality(mut self, score: u8) -> Self {
        self.quality_score = Some(score);
        self
    }

    pub fn with_time_ratio(mut self, ratio: f64) -> Self {
        self.completion_time_ratio = Some(ratio);
        self
    }

    pub fn with_on_time(mut self, on_time: bool) -> Self {
        self.on_time = Some(on_time);
        self
    }

    pub fn with_feedback(mut self, feedback: &str) -> Self {
        self.client_feedback = Some(feedback.to_string());
        self
    }

    pub fn with_complexity(mut self, complexity: TaskComplexity) -> Self {
        self.task_complexity = Some(complexity);
        self
    }

    /// Quality score clamped to 1-5 (default 3)
    pub fn quality(&self) -> u8 {
        self.quality_score
            .unwrap_or(DEFAULT_QUALITY_SCORE)
            .clamp(MIN_QUALITY_SCORE, MAX_QUALITY_SCORE)
    }

    /// Actual/allotted time, never negative (default 1.0)
    pub fn time_ratio(&self) -> f64 {
        match self.completion_time_ratio {
            Some(r) if r.is_finite() => r.max(0.0),
            _ => 1.0,
        }
    }

    pub fn is_on_time(&self) -> bool {
        self.on_time.unwrap_or(true)
    }

    pub fn feedback(&self) -> &str {
        self.client_feedback.as_deref().unwrap_or("")
    }

    pub fn complexity(&self) -> TaskComplexity {
        self.task_complexity.unwrap_or_default()
    }
}
