//! Level curve
//!
//! Cost of leaving level n: floor(base_xp * growth^(n-1)), 100 * 1.5^(n-1)
//! by default. Reaching level L needs the sum of the costs of levels 1..L-1:
//!
//! - Level 2: 100 XP
//! - Level 3: 250 XP
//! - Level 5: 812 XP
//! - Level 10: 7,486 XP
//!
//! Levels never go down; one update may cross several levels.

use crate::config::{LevelConfig, LevelFeature};
use serde::{Deserialize, Serialize};

/// Upper bound on levels, far beyond any reachable XP total
pub const MAX_LEVEL: u32 = 1_000;

/// Result of advancing a user along the curve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelUpResult {
    pub leveled_up: bool,
    pub previous_level: u32,
    pub new_level: u32,
    /// XP still needed to reach the level after `new_level`
    pub xp_to_next_level: u64,
    /// Features for every level reached in this update, in level order
    pub unlocked_features: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LevelCurve {
    config: LevelConfig,
}

impl LevelCurve {
    pub fn new(config: LevelConfig) -> Self {
        Self { config }
    }

    /// XP needed to go from `level` to `level + 1`
    pub fn xp_for_level(&self, level: u32) -> u64 {
        let exponent = level.max(1) - 1;
        let cost = self.config.base_xp * self.config.growth_factor.powi(exponent as i32);
        // `as` saturates for huge or infinite values
        cost.floor().max(1.0) as u64
    }

    /// Total XP needed to reach `level` from zero
    pub fn cumulative_xp_for_level(&self, level: u32) -> u64 {
        (1..level.min(MAX_LEVEL))
            .map(|l| self.xp_for_level(l))
            .fold(0u64, |acc, x| acc.saturating_add(x))
    }

    /// Level uniquely determined by cumulative XP
    pub fn level_for_xp(&self, total_xp: u64) -> u32 {
        self.walk(1, total_xp).0
    }

    /// Advance from `current_level` given the new cumulative XP total
    pub fn advance(&self, total_xp: u64, current_level: u32) -> LevelUpResult {
        let previous_level = current_level.max(1);
        let (new_level, xp_to_next_level) = self.walk(previous_level, total_xp);

        let unlocked_features = if new_level > previous_level {
            ((previous_level + 1)..=new_level)
                .flat_map(|level| self.features_for_level(level))
                .collect()
        } else {
            Vec::new()
        };

        if new_level > previous_level {
            tracing::debug!(
                "Level up {} -> {} ({} features unlocked)",
                previous_level,
                new_level,
                unlocked_features.len()
            );
        }

        LevelUpResult {
            leveled_up: new_level > previous_level,
            previous_level,
            new_level,
            xp_to_next_level,
            unlocked_features,
        }
    }

    /// Progress through the current level (0-100)
    pub fn progress_in_level(&self, total_xp: u64, level: u32) -> u8 {
        let start = self.cumulative_xp_for_level(level);
        let cost = self.xp_for_level(level);
        let into = total_xp.saturating_sub(start).min(cost);
        ((into as u128 * 100) / cost as u128) as u8
    }

    /// Feature names unlocked on reaching exactly `level`
    pub fn features_for_level(&self, level: u32) -> Vec<String> {
        let mut features: Vec<String> = self
            .config
            .features
            .iter()
            .filter(|f| f.level == level)
            .map(|f| f.name.clone())
            .collect();

        let interval = self.config.badge_interval;
        if interval > 0 && level % interval == 0 {
            features.push(format!("Level {} Badge", level));
        }
        features
    }

    pub fn feature_table(&self) -> &[LevelFeature] {
        &self.config.features
    }

    /// Subtract level costs starting at `from_level`; returns the reached level
    /// and the XP still missing for the next one
    fn walk(&self, from_level: u32, total_xp: u64) -> (u32, u64) {
        let start = self.cumulative_xp_for_level(from_level);
        let Some(mut remaining) = total_xp.checked_sub(start) else {
            // Snapshot is behind its own level; never demote
            return (
                from_level,
                (start - total_xp).saturating_add(self.xp_for_level(from_level)),
            );
        };

        let mut level = from_level;
        while level < MAX_LEVEL {
            let cost = self.xp_for_level(level);
            if remaining < cost {
                return (level, cost - remaining);
            }
            remaining -= cost;
            level += 1;
        }
        (level, 0)
    }
}
