//! Command implementations

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use progression_engine::notify::{format_badges, progress_bar};
use progression_engine::repository::CatalogRepository;
use progression_engine::{
    CatalogSnapshot, EngineConfig, InMemoryCatalog, InMemoryStatsRepository, LevelCurve,
    ProgressionOrchestrator, TaskCompletionEvent, UserStats,
};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

const SEPARATOR: &str = "------------------------------------------------------------";

pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::load(),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn read_catalog(path: Option<&Path>) -> Result<CatalogSnapshot> {
    match path {
        Some(path) => read_json(path),
        None => Ok(CatalogSnapshot::default()),
    }
}

/// Seed a user, their catalog and the badges they already hold
fn engine_for(
    config: &EngineConfig,
    stats: UserStats,
    catalog: CatalogSnapshot,
    held: &[String],
) -> Result<(ProgressionOrchestrator, String)> {
    let user_id = stats.user_id.clone();
    let stats_repo = Arc::new(InMemoryStatsRepository::new());
    stats_repo.insert(stats)?;

    let catalog_repo = Arc::new(InMemoryCatalog::new(catalog));
    for badge_id in held {
        catalog_repo
            .award_badge(&user_id, badge_id)
            .with_context(|| format!("Cannot mark badge {} as held", badge_id))?;
    }

    Ok((
        ProgressionOrchestrator::new(stats_repo, catalog_repo, config),
        user_id,
    ))
}

pub fn complete(
    config: &EngineConfig,
    stats_path: &Path,
    event_path: &Path,
    catalog_path: Option<&Path>,
    held: &[String],
    write: bool,
    json: bool,
) -> Result<()> {
    let stats: UserStats = read_json(stats_path)?;
    let event: TaskCompletionEvent = read_json(event_path)?;
    let catalog = read_catalog(catalog_path)?;

    let (engine, user_id) = engine_for(config, stats, catalog, held)?;
    let result = engine.complete_task(&user_id, &event)?;

    if write {
        let updated = serde_json::to_string_pretty(&result.stats)?;
        fs::write(stats_path, updated)
            .with_context(|| format!("Failed to write {}", stats_path.display()))?;
        info!("Updated stats written to {}", stats_path.display());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}", format!("[{}] task completed", user_id).bold());
    println!("{}", SEPARATOR);
    for line in result
        .xp
        .reasoning
        .iter()
        .chain(&result.trust.reasoning)
        .chain(&result.impact.reasoning)
    {
        println!("  {}", line.dimmed());
    }
    println!("{}", SEPARATOR);
    println!(
        "  XP      {:>8}  (+{})",
        result.stats.xp_points,
        result.xp.total_xp.bright_green()
    );
    println!(
        "  Trust   {:>8}  ({:+})",
        result.stats.trust_score, result.trust.total_change
    );
    println!(
        "  Impact  {:>8}  (+{})",
        result.stats.rwis_score, result.impact.total_impact
    );

    let curve = engine.curve();
    let level = result.stats.current_level;
    println!(
        "  Level   {:>8}  {} {} XP to next",
        level,
        progress_bar(curve.progress_in_level(result.stats.xp_points, level), 20),
        result.level.xp_to_next_level
    );

    let events = result.events();
    if !events.is_empty() {
        println!();
        for event in &events {
            println!("{}", event.message().bright_cyan());
        }
    }
    if !result.new_badges.is_empty() {
        println!("  Badges: {}", format_badges(&result.new_badges, 8));
    }

    Ok(())
}

pub fn zones(
    config: &EngineConfig,
    stats_path: &Path,
    catalog_path: &Path,
    held: &[String],
) -> Result<()> {
    let stats: UserStats = read_json(stats_path)?;
    let catalog: CatalogSnapshot = read_json(catalog_path)?;

    let (engine, user_id) = engine_for(config, stats, catalog, held)?;
    let progress = engine.zone_progress(&user_id)?;

    if progress.is_empty() {
        println!("All zones unlocked for {}", user_id);
        return Ok(());
    }

    println!("{}", format!("Locked zones for {}", user_id).bold());
    println!("{}", SEPARATOR);
    for zone in &progress {
        let status = if zone.unlocked {
            "[READY]".bright_green().to_string()
        } else {
            "[LOCKED]".yellow().to_string()
        };
        println!(
            "  {:<9} {:<24} {} {:>3}%",
            status,
            zone.zone_name,
            progress_bar(zone.progress, 20),
            zone.progress
        );
        if let Some(reason) = &zone.reason {
            println!("            {}", reason.dimmed());
        }
    }

    Ok(())
}

pub fn curve(config: &EngineConfig, max_level: u32) -> Result<()> {
    let curve = LevelCurve::new(config.levels.clone());

    println!("{:>5}  {:>12}  {:>14}  FEATURES", "LEVEL", "XP TO NEXT", "TOTAL TO REACH");
    println!("{}", SEPARATOR);
    for level in 1..=max_level.max(1) {
        let features = curve.features_for_level(level);
        println!(
            "{:>5}  {:>12}  {:>14}  {}",
            level,
            curve.xp_for_level(level),
            curve.cumulative_xp_for_level(level),
            features.join(", ").bright_cyan()
        );
    }

    Ok(())
}

pub fn config(config: &EngineConfig, dump: bool) -> Result<()> {
    if dump {
        let rendered =
            toml::to_string_pretty(config).context("Failed to serialize configuration")?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("{}", "Engine configuration".bold());
    println!("{}", SEPARATOR);
    let xp = &config.xp.category_multipliers;
    println!(
        "  XP multipliers      freelance {:.2}  community {:.2}  corporate {:.2}",
        xp.freelance, xp.community, xp.corporate
    );
    let impact = &config.impact.category_multipliers;
    println!(
        "  Impact multipliers  freelance {:.2}  community {:.2}  corporate {:.2}",
        impact.freelance, impact.community, impact.corporate
    );
    println!(
        "  Level curve         base {} XP, growth x{:.2}, badge every {} levels",
        config.levels.base_xp, config.levels.growth_factor, config.levels.badge_interval
    );
    println!("  Features            {}", config.levels.features.len());
    println!();
    println!("Use --dump for the full TOML.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_uses_given_config() {
        let mut config = EngineConfig::default();
        config.levels.base_xp = 250.0;

        let (engine, user_id) = engine_for(
            &config,
            UserStats::new("cli-user"),
            CatalogSnapshot::default(),
            &[],
        )
        .unwrap();
        assert_eq!(user_id, "cli-user");
        assert_eq!(engine.curve().xp_for_level(1), 250);
    }

    #[test]
    fn test_zones_reads_fixtures_with_config() {
        let dir = tempfile::tempdir().unwrap();
        let stats_path = dir.path().join("stats.json");
        let catalog_path = dir.path().join("catalog.json");
        fs::write(&stats_path, serde_json::to_string(&UserStats::new("cli-user")).unwrap())
            .unwrap();
        fs::write(
            &catalog_path,
            serde_json::to_string(&CatalogSnapshot::default()).unwrap(),
        )
        .unwrap();

        let mut config = EngineConfig::default();
        config.levels.base_xp = 250.0;
        zones(&config, &stats_path, &catalog_path, &[]).unwrap();
    }
}
