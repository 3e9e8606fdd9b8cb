//! Celebration content for a freshly unlocked zone.
//!
//! Pure lookups by terrain and difficulty. Nothing here gates access.

use crate::catalog::{DifficultyTier, TerrainType, Zone};
use serde::{Deserialize, Serialize};

/// Visual and audio effects per terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainEffects {
    pub particles: &'static str,
    pub sound: &'static str,
    pub color: &'static str,
    /// Names of special areas, indexed by difficulty tier
    pub special_areas: [&'static str; 5],
    pub signature_reward: &'static str,
}

pub const FOREST_EFFECTS: TerrainEffects = TerrainEffects {
    particles: "falling_leaves",
    sound: "forest_chorus",
    color: "green",
    special_areas: [
        "Whispering Glade",
        "Ancient Grove",
        "Verdant Labyrinth",
        "Elder Canopy",
        "World Tree Sanctum",
    ],
    signature_reward: "Ranger's Cloak",
};

pub const MOUNTAIN_EFFECTS: TerrainEffects = TerrainEffects {
    particles: "drifting_snow",
    sound: "mountain_horn",
    color: "slate",
    special_areas: [
        "Foothill Camp",
        "Eagle's Perch",
        "Granite Pass",
        "Summit Forge",
        "Peak of Echoes",
    ],
    signature_reward: "Climber's Pick",
};

pub const DESERT_EFFECTS: TerrainEffects = TerrainEffects {
    particles: "sand_swirl",
    sound: "desert_wind",
    color: "amber",
    special_areas: [
        "Oasis Market",
        "Dune Sea",
        "Sunken Bazaar",
        "Mirage Citadel",
        "Tomb of Ages",
    ],
    signature_reward: "Nomad's Compass",
};

pub const OCEAN_EFFECTS: TerrainEffects = TerrainEffects {
    particles: "sea_spray",
    sound: "rolling_waves",
    color: "blue",
    special_areas: [
        "Harbor Docks",
        "Coral Shallows",
        "Kelp Cathedral",
        "Abyssal Trench",
        "Leviathan's Rest",
    ],
    signature_reward: "Tidecaller Shell",
};

pub const CITY_EFFECTS: TerrainEffects = TerrainEffects {
    particles: "confetti",
    sound: "city_fanfare",
    color: "gold",
    special_areas: [
        "Market Square",
        "Guild Quarter",
        "Clocktower District",
        "Council Spire",
        "Skyline Palace",
    ],
    signature_reward: "Citizen's Seal",
};

pub const TUNDRA_EFFECTS: TerrainEffects = TerrainEffects {
    particles: "aurora_shimmer",
    sound: "ice_chime",
    color: "cyan",
    special_areas: [
        "Frost Outpost",
        "Glacier Steps",
        "Crystal Caverns",
        "Aurora Field",
        "Heart of Winter",
    ],
    signature_reward: "Frostbound Mantle",
};

pub const VOLCANO_EFFECTS: TerrainEffects = TerrainEffects {
    particles: "ember_burst",
    sound: "rumbling_lava",
    color: "red",
    special_areas: [
        "Ash Fields",
        "Obsidian Path",
        "Magma Falls",
        "Caldera Keep",
        "Phoenix Crater",
    ],
    signature_reward: "Emberforged Gauntlet",
};

pub fn terrain_effects(terrain: TerrainType) -> &'static TerrainEffects {
    match terrain {
        TerrainType::Forest => &FOREST_EFFECTS,
        TerrainType::Mountain => &MOUNTAIN_EFFECTS,
        TerrainType::Desert => &DESERT_EFFECTS,
        TerrainType::Ocean => &OCEAN_EFFECTS,
        TerrainType::City => &CITY_EFFECTS,
        TerrainType::Tundra => &TUNDRA_EFFECTS,
        TerrainType::Volcano => &VOLCANO_EFFECTS,
    }
}

/// Reward scaling for content inside an area of this difficulty
pub fn difficulty_multiplier(difficulty: DifficultyTier) -> f64 {
    match difficulty {
        DifficultyTier::Beginner => 1.0,
        DifficultyTier::Intermediate => 1.25,
        DifficultyTier::Advanced => 1.5,
        DifficultyTier::Expert => 2.0,
        DifficultyTier::Legendary => 3.0,
    }
}

fn tier_index(difficulty: DifficultyTier) -> usize {
    match difficulty {
        DifficultyTier::Beginner => 0,
        DifficultyTier::Intermediate => 1,
        DifficultyTier::Advanced => 2,
        DifficultyTier::Expert => 3,
        DifficultyTier::Legendary => 4,
    }
}

pub fn special_area_name(terrain: TerrainType, difficulty: DifficultyTier) -> &'static str {
    terrain_effects(terrain).special_areas[tier_index(difficulty)]
}

/// Rewards granted with the unlock, richer at higher difficulty
pub fn unique_rewards(terrain: TerrainType, difficulty: DifficultyTier) -> Vec<String> {
    let effects = terrain_effects(terrain);
    let mut rewards = vec![effects.signature_reward.to_string()];

    if difficulty >= DifficultyTier::Advanced {
        rewards.push(format!("{} Material Cache", capitalize(&terrain.to_string())));
    }
    if difficulty >= DifficultyTier::Expert {
        rewards.push(format!("Map of {}", special_area_name(terrain, difficulty)));
    }
    if difficulty == DifficultyTier::Legendary {
        rewards.push(format!("Title: {} Sovereign", capitalize(&terrain.to_string())));
    }
    rewards
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Everything the client needs to celebrate an unlock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CelebrationContent {
    pub zone_id: String,
    pub title: String,
    pub particles: String,
    pub sound: String,
    pub color: String,
    pub difficulty_multiplier: f64,
    pub special_area: String,
    pub unique_rewards: Vec<String>,
}

pub fn celebration_for(zone: &Zone) -> CelebrationContent {
    let effects = terrain_effects(zone.terrain);
    CelebrationContent {
        zone_id: zone.id.clone(),
        title: format!("{} Unlocked!", zone.name),
        particles: effects.particles.to_string(),
        sound: effects.sound.to_string(),
        color: effects.color.to_string(),
        difficulty_multiplier: difficulty_multiplier(zone.difficulty),
        special_area: special_area_name(zone.terrain, zone.difficulty).to_string(),
        unique_rewards: unique_rewards(zone.terrain, zone.difficulty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unlock::criteria::UnlockCriteria;

    #[test]
    fn test_special_area_lookup() {
        assert_eq!(special_area_name(TerrainType::Forest, DifficultyTier::Beginner), "Whispering Glade");
        assert_eq!(special_area_name(TerrainType::Volcano, DifficultyTier::Legendary), "Phoenix Crater");
    }

    #[test]
    fn test_rewards_grow_with_difficulty() {
        let easy = unique_rewards(TerrainType::Ocean, DifficultyTier::Beginner);
        let hard = unique_rewards(TerrainType::Ocean, DifficultyTier::Legendary);
        assert_eq!(easy, vec!["Tidecaller Shell".to_string()]);
        assert_eq!(hard.len(), 4);
        assert!(hard.contains(&"Ocean Material Cache".to_string()));
        assert!(hard.contains(&"Title: Ocean Sovereign".to_string()));
    }

    #[test]
    fn test_celebration_is_deterministic() {
        let zone = Zone {
            id: "z1".to_string(),
            name: "Emberlands".to_string(),
            description: String::new(),
            terrain: TerrainType::Volcano,
            difficulty: DifficultyTier::Expert,
            unlock_requirements: UnlockCriteria::default(),
        };
        let a = celebration_for(&zone);
        assert_eq!(a, celebration_for(&zone));
        assert_eq!(a.title, "Emberlands Unlocked!");
        assert_eq!(a.particles, "ember_burst");
        assert_eq!(a.difficulty_multiplier, 2.0);
        assert_eq!(a.special_area, "Caldera Keep");
    }
}
