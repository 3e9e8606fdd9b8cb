//! Unlock evaluation
//!
//! - [`criteria`]: the shared sparse criteria record and its evaluator
//! - [`zones`]: zone unlocks and dungeon entry
//! - [`tiers`]: per-category BASIC..MASTER tiers
//! - [`content`]: celebration content attached to an unlock
//!
//! Everything here is a pure function of a stats snapshot and the held badge
//! names; the same inputs always produce the same decision.

pub mod content;
pub mod criteria;
pub mod tiers;
pub mod zones;

pub use content::{celebration_for, CelebrationContent};
pub use criteria::{
    BadgeUnlockCriteria, CriteriaEvaluation, EntryRequirements, UnlockContext, UnlockCriteria,
};
pub use tiers::{Tier, TierRequirement, TierUnlockResult};
pub use zones::{DungeonAccess, ZoneUnlockResult};
