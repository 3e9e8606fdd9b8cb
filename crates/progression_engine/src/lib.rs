//! Progression & unlock engine for a work-marketplace RPG layer.
//!
//! Turns a completed task into XP, Trust Score and Impact (RWIS) deltas,
//! advances the user's level, and decides which badges, zones, dungeons and
//! category tiers the updated stats unlock. Persistence and delivery live
//! behind the traits in [`repository`]; everything else is pure.

pub mod badges;
pub mod catalog;
pub mod config;
pub mod error;
pub mod level;
pub mod notify;
pub mod orchestrator;
pub mod repository;
pub mod score;
pub mod types;
pub mod unlock;

pub use catalog::{Badge, BadgeRarity, DifficultyTier, Dungeon, TerrainType, UserAchievement, Zone};
pub use config::EngineConfig;
pub use error::{ProgressionError, Result};
pub use level::{LevelCurve, LevelUpResult};
pub use notify::ProgressionEvent;
pub use orchestrator::{GrantOutcome, ProgressionOrchestrator, ProgressionResult};
pub use repository::{
    CatalogRepository, CatalogSnapshot, InMemoryCatalog, InMemoryStatsRepository, StatsRecord,
    StatsRepository,
};
pub use score::{ScoreBreakdown, ScoreCalculator};
pub use types::{
    CategoryStats, TaskCompletionEvent, TaskComplexity, TaskRewards, UserStats, WorkCategory,
};
pub use unlock::{Tier, UnlockCriteria};

/// Crate version, reported by the CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
