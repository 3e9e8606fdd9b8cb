//! Notification events for a progression update.
//!
//! The engine does not deliver anything; the caller takes [`ProgressionEvent`]s
//! from a [`ProgressionResult`] and hands them to its own dispatcher.
//! Messages are plain ASCII, no emojis.

use crate::catalog::Badge;
use crate::orchestrator::ProgressionResult;
use crate::types::WorkCategory;
use crate::unlock::content::CelebrationContent;
use crate::unlock::tiers::{Tier, TierUnlockResult};
use serde::{Deserialize, Serialize};

const PROGRESS_FULL: &str = "#";
const PROGRESS_EMPTY: &str = ".";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ProgressionEvent {
    LevelUp {
        user_id: String,
        previous_level: u32,
        new_level: u32,
        unlocked_features: Vec<String>,
    },
    BadgeEarned {
        user_id: String,
        badge: Badge,
    },
    ZoneUnlocked {
        user_id: String,
        celebration: CelebrationContent,
    },
    TierUnlocked {
        user_id: String,
        category: WorkCategory,
        tier: Tier,
    },
}

impl ProgressionEvent {
    pub fn user_id(&self) -> &str {
        match self {
            Self::LevelUp { user_id, .. }
            | Self::BadgeEarned { user_id, .. }
            | Self::ZoneUnlocked { user_id, .. }
            | Self::TierUnlocked { user_id, .. } => user_id,
        }
    }

    /// One-line ASCII notification text
    pub fn message(&self) -> String {
        match self {
            Self::LevelUp {
                previous_level,
                new_level,
                unlocked_features,
                ..
            } => {
                if unlocked_features.is_empty() {
                    format!("[^] Level up: {} -> {}", previous_level, new_level)
                } else {
                    format!(
                        "[^] Level up: {} -> {} (unlocked: {})",
                        previous_level,
                        new_level,
                        unlocked_features.join(", ")
                    )
                }
            }
            Self::BadgeEarned { badge, .. } => format_badge_unlock(badge),
            Self::ZoneUnlocked { celebration, .. } => {
                if celebration.unique_rewards.is_empty() {
                    format!("[>] {}", celebration.title)
                } else {
                    format!(
                        "[>] {} Rewards: {}",
                        celebration.title,
                        celebration.unique_rewards.join(", ")
                    )
                }
            }
            Self::TierUnlocked { category, tier, .. } => {
                format!("[+] {} tier reached: {}", category.label(), tier)
            }
        }
    }
}

impl ProgressionResult {
    /// Events in display order: level, badges, zones, tiers
    pub fn events(&self) -> Vec<ProgressionEvent> {
        let mut events = Vec::new();

        if self.level.leveled_up {
            events.push(ProgressionEvent::LevelUp {
                user_id: self.user_id.clone(),
                previous_level: self.level.previous_level,
                new_level: self.level.new_level,
                unlocked_features: self.level.unlocked_features.clone(),
            });
        }

        events.extend(self.new_badges.iter().map(|badge| ProgressionEvent::BadgeEarned {
            user_id: self.user_id.clone(),
            badge: badge.clone(),
        }));

        events.extend(
            self.celebrations
                .iter()
                .map(|celebration| ProgressionEvent::ZoneUnlocked {
                    user_id: self.user_id.clone(),
                    celebration: celebration.clone(),
                }),
        );

        events.extend(self.unlocked_tiers.iter().map(|t: &TierUnlockResult| {
            ProgressionEvent::TierUnlocked {
                user_id: self.user_id.clone(),
                category: t.category,
                tier: t.tier,
            }
        }));

        events
    }
}

/// Badge symbols in a row, "+N more" past `max_display`
pub fn format_badges(badges: &[Badge], max_display: usize) -> String {
    if badges.is_empty() {
        return String::new();
    }

    let symbols: String = badges
        .iter()
        .take(max_display)
        .map(|b| b.symbol.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    if badges.len() > max_display {
        format!("{} +{} more", symbols, badges.len() - max_display)
    } else {
        symbols
    }
}

pub fn format_badge_unlock(badge: &Badge) -> String {
    if badge.description.is_empty() {
        format!("{} Badge earned: {} ({})", badge.symbol, badge.name, badge.rarity)
    } else {
        format!(
            "{} Badge earned: {} ({}) - {}",
            badge.symbol, badge.name, badge.rarity, badge.description
        )
    }
}

/// ASCII bar for a 0-100 progress value
pub fn progress_bar(progress: u8, width: usize) -> String {
    let filled = (progress.min(100) as usize * width) / 100;
    let empty = width.saturating_sub(filled);
    format!(
        "[{}{}]",
        PROGRESS_FULL.repeat(filled),
        PROGRESS_EMPTY.repeat(empty)
    )
}
