//! Engine configuration
//!
//! Scoring multipliers, bonus rates and the level feature table.
//! Config file: `$PROGRESSION_CONFIG` or `./progression.toml`.
//! Every field falls back to the built-in defaults, so a partial file is valid.

use crate::types::{TaskComplexity, WorkCategory};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "PROGRESSION_CONFIG";
/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "progression.toml";

/// One multiplier per work category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryFactors {
    pub freelance: f64,
    pub community: f64,
    pub corporate: f64,
}

impl CategoryFactors {
    pub fn factor(&self, category: WorkCategory) -> f64 {
        match category {
            WorkCategory::Freelance => self.freelance,
            WorkCategory::Community => self.community,
            WorkCategory::Corporate => self.corporate,
        }
    }
}

/// One multiplier per task complexity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexityFactors {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl ComplexityFactors {
    pub fn factor(&self, complexity: TaskComplexity) -> f64 {
        match complexity {
            TaskComplexity::Low => self.low,
            TaskComplexity::Medium => self.medium,
            TaskComplexity::High => self.high,
        }
    }
}

/// XP formula settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XpConfig {
    pub category_multipliers: CategoryFactors,
    /// Bonus share of base XP for quality >= 4
    pub high_quality_bonus: f64,
    /// Bonus share of base XP for quality == 3
    pub standard_quality_bonus: f64,
    /// Share of base XP per unit of time saved
    pub early_completion_rate: f64,
    /// Damping lost per level above 1
    pub damping_per_level: f64,
    /// Damping never drops below this
    pub min_damping: f64,
}

impl Default for XpConfig {
    fn default() -> Self {
        Self {
            category_multipliers: CategoryFactors {
                freelance: 1.0,
                community: 1.2,
                corporate: 1.1,
            },
            high_quality_bonus: 0.25,
            standard_quality_bonus: 0.10,
            early_completion_rate: 0.2,
            damping_per_level: 0.02,
            min_damping: 0.5,
        }
    }
}

/// Trust delta settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    pub quality_excellent: i64,
    pub quality_good: i64,
    pub quality_standard: i64,
    pub quality_poor: i64,
    pub on_time_bonus: i64,
    pub late_penalty: i64,
    /// Feedback must be strictly longer than this to earn the bonus
    pub feedback_min_length: usize,
    pub feedback_bonus: i64,
    pub community_bonus: i64,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            quality_excellent: 3,
            quality_good: 2,
            quality_standard: 1,
            quality_poor: -2,
            on_time_bonus: 1,
            late_penalty: -3,
            feedback_min_length: 50,
            feedback_bonus: 1,
            community_bonus: 1,
        }
    }
}

/// Impact (RWIS) formula settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    pub category_multipliers: CategoryFactors,
    /// Bonus share of base impact for quality >= 4
    pub quality_bonus: f64,
    pub complexity_multipliers: ComplexityFactors,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            category_multipliers: CategoryFactors {
                freelance: 1.0,
                community: 1.5,
                corporate: 1.2,
            },
            quality_bonus: 0.30,
            complexity_multipliers: ComplexityFactors {
                low: 1.0,
                medium: 1.2,
                high: 1.5,
            },
        }
    }
}

/// Feature unlocked on reaching a specific level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelFeature {
    pub level: u32,
    pub name: String,
}

/// Level curve settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// XP needed to leave level 1
    pub base_xp: f64,
    /// Ratio between consecutive level costs
    pub growth_factor: f64,
    /// Every multiple of this level awards a "Level N Badge" marker (0 disables)
    pub badge_interval: u32,
    pub features: Vec<LevelFeature>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        let features = [
            (5, "Community Zone Access"),
            (10, "Advanced Task Board"),
            (15, "Mentorship Program"),
            (20, "Guild Creation"),
            (25, "Legendary Dungeons"),
        ]
        .iter()
        .map(|(level, name)| LevelFeature {
            level: *level,
            name: name.to_string(),
        })
        .collect();

        Self {
            base_xp: 100.0,
            growth_factor: 1.5,
            badge_interval: 10,
            features,
        }
    }
}

/// Main engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub xp: XpConfig,
    #[serde(default)]
    pub trust: TrustConfig,
    #[serde(default)]
    pub impact: ImpactConfig,
    #[serde(default)]
    pub levels: LevelConfig,
}

/// Scoring subset handed to the calculator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringConfig {
    pub xp: XpConfig,
    pub trust: TrustConfig,
    pub impact: ImpactConfig,
}

impl EngineConfig {
    pub fn scoring(&self) -> ScoringConfig {
        ScoringConfig {
            xp: self.xp.clone(),
            trust: self.trust.clone(),
            impact: self.impact.clone(),
        }
    }

    /// Load from an explicit TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: EngineConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration
    ///
    /// Priority:
    /// 1. `$PROGRESSION_CONFIG`
    /// 2. `./progression.toml`
    /// 3. Defaults
    pub fn load() -> Result<Self> {
        if let Ok(explicit) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(explicit);
            tracing::debug!("Loading engine config from {}", path.display());
            return Self::load_from(&path);
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            tracing::debug!("Loading engine config from {}", local.display());
            return Self::load_from(&local);
        }

        Ok(Self::default())
    }

    /// Write configuration as pretty TOML
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
        }

        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }
}
