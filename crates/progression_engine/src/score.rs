//! Score calculation for a completed task.
//!
//! Turns one task completion into three deltas:
//! - XP (category multiplier, quality and early-completion bonuses, level damping)
//! - Trust Score (signed; the floor at zero is applied by [`apply_trust_delta`])
//! - Impact (RWIS; additive, never damped)
//!
//! Factors from the config are converted to basis points once, and
//! percentage arithmetic on them is integer, so `100 * 1.1` is exactly 110.
//! The early-completion bonus floors the full-precision time ratio instead.
//! Every step appends a reasoning line for auditing.

use crate::config::ScoringConfig;
use crate::types::{TaskComplexity, TaskCompletionEvent, TaskRewards, WorkCategory};
use serde::{Deserialize, Serialize};

const BASIS: u64 = 10_000;

/// Convert a factor like 1.2 into basis points (12000)
fn basis_points(factor: f64) -> u64 {
    if !factor.is_finite() || factor <= 0.0 {
        return 0;
    }
    (factor * BASIS as f64).round() as u64
}

/// floor(value * bp / 10000) without overflow
fn scale(value: u64, bp: u64) -> u64 {
    let scaled = (value as u128 * bp as u128) / BASIS as u128;
    scaled.min(u64::MAX as u128) as u64
}

/// XP trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpCalculation {
    pub base_xp: u64,
    pub quality_bonus: u64,
    pub early_completion_bonus: u64,
    pub level_multiplier: f64,
    pub total_xp: u64,
    pub reasoning: Vec<String>,
}

/// Trust trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustCalculation {
    pub base_change: i64,
    pub quality_adjustment: i64,
    pub timing_adjustment: i64,
    pub feedback_bonus: i64,
    pub category_bonus: i64,
    pub total_change: i64,
    pub reasoning: Vec<String>,
}

/// Impact (RWIS) trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactCalculation {
    pub base_impact: u64,
    pub quality_bonus: u64,
    pub complexity_bonus: u64,
    pub total_impact: u64,
    pub reasoning: Vec<String>,
}

/// All three traces for one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub xp: XpCalculation,
    pub trust: TrustCalculation,
    pub impact: ImpactCalculation,
}

/// Apply a signed trust delta, never going below zero
pub fn apply_trust_delta(current: u64, delta: i64) -> u64 {
    if delta >= 0 {
        current.saturating_add(delta as u64)
    } else {
        current.saturating_sub(delta.unsigned_abs())
    }
}

/// Pure, deterministic score calculator
#[derive(Debug, Clone, Default)]
pub struct ScoreCalculator {
    config: ScoringConfig,
}

impl ScoreCalculator {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score every dimension of an event for a user at `user_level`
    pub fn score_event(&self, event: &TaskCompletionEvent, user_level: u32) -> ScoreBreakdown {
        let quality = event.quality();
        ScoreBreakdown {
            xp: self.calculate_xp(
                &event.rewards,
                event.category,
                quality,
                event.time_ratio(),
                user_level,
            ),
            trust: self.calculate_trust(
                &event.rewards,
                event.category,
                quality,
                event.is_on_time(),
                event.feedback(),
            ),
            impact: self.calculate_impact(&event.rewards, event.category, quality, event.complexity()),
        }
    }

    pub fn calculate_xp(
        &self,
        rewards: &TaskRewards,
        category: WorkCategory,
        quality_score: u8,
        completion_time_ratio: f64,
        user_level: u32,
    ) -> XpCalculation {
        let cfg = &self.config.xp;
        let mut reasoning = Vec::new();

        let multiplier = cfg.category_multipliers.factor(category);
        let base_xp = scale(rewards.xp, basis_points(multiplier));
        reasoning.push(format!(
            "Base XP: {} x {} ({} multiplier) = {}",
            rewards.xp, multiplier, category, base_xp
        ));

        let quality_bonus = if quality_score >= 4 {
            let bonus = scale(base_xp, basis_points(cfg.high_quality_bonus));
            reasoning.push(format!(
                "Quality bonus ({}/5): +{:.0}% = +{}",
                quality_score,
                cfg.high_quality_bonus * 100.0,
                bonus
            ));
            bonus
        } else if quality_score >= 3 {
            let bonus = scale(base_xp, basis_points(cfg.standard_quality_bonus));
            reasoning.push(format!(
                "Quality bonus ({}/5): +{:.0}% = +{}",
                quality_score,
                cfg.standard_quality_bonus * 100.0,
                bonus
            ));
            bonus
        } else {
            reasoning.push(format!("No quality bonus ({}/5)", quality_score));
            0
        };

        let ratio = if completion_time_ratio.is_finite() {
            completion_time_ratio.max(0.0)
        } else {
            1.0
        };
        let early_completion_bonus = if ratio < 1.0 {
            // The ratio is caller data, so it is not rounded to basis points
            let rate = cfg.early_completion_rate.max(0.0);
            let bonus = (base_xp as f64 * (1.0 - ratio) * rate).floor() as u64;
            reasoning.push(format!(
                "Early completion bonus ({:.0}% of allotted time): +{}",
                ratio * 100.0,
                bonus
            ));
            bonus
        } else {
            0
        };

        let subtotal = base_xp
            .saturating_add(quality_bonus)
            .saturating_add(early_completion_bonus);

        let levels_above_first = user_level.saturating_sub(1) as u64;
        let damping_bp = BASIS
            .saturating_sub(levels_above_first.saturating_mul(basis_points(cfg.damping_per_level)))
            .max(basis_points(cfg.min_damping));
        let total_xp = scale(subtotal, damping_bp);
        let level_multiplier = damping_bp as f64 / BASIS as f64;

        if damping_bp < BASIS {
            reasoning.push(format!(
                "Level {} scaling x{:.2}: {} -> {}",
                user_level, level_multiplier, subtotal, total_xp
            ));
        }
        reasoning.push(format!("Total XP: {}", total_xp));

        XpCalculation {
            base_xp,
            quality_bonus,
            early_completion_bonus,
            level_multiplier,
            total_xp,
            reasoning,
        }
    }

    pub fn calculate_trust(
        &self,
        rewards: &TaskRewards,
        category: WorkCategory,
        quality_score: u8,
        on_time: bool,
        client_feedback: &str,
    ) -> TrustCalculation {
        let cfg = &self.config.trust;
        let mut reasoning = Vec::new();

        let base_change = rewards.trust_score_bonus;
        reasoning.push(format!("Base trust change: {:+}", base_change));

        let quality_adjustment = match quality_score {
            5 => cfg.quality_excellent,
            4 => cfg.quality_good,
            3 => cfg.quality_standard,
            _ => cfg.quality_poor,
        };
        reasoning.push(format!(
            "Quality adjustment ({}/5): {:+}",
            quality_score, quality_adjustment
        ));

        let timing_adjustment = if on_time {
            reasoning.push(format!("Delivered on time: {:+}", cfg.on_time_bonus));
            cfg.on_time_bonus
        } else {
            reasoning.push(format!("Delivered late: {:+}", cfg.late_penalty));
            cfg.late_penalty
        };

        let feedback_bonus = if client_feedback.chars().count() > cfg.feedback_min_length {
            reasoning.push(format!("Detailed client feedback: {:+}", cfg.feedback_bonus));
            cfg.feedback_bonus
        } else {
            0
        };

        let category_bonus = if category == WorkCategory::Community {
            reasoning.push(format!("Community contribution: {:+}", cfg.community_bonus));
            cfg.community_bonus
        } else {
            0
        };

        let total_change = base_change
            .saturating_add(quality_adjustment)
            .saturating_add(timing_adjustment)
            .saturating_add(feedback_bonus)
            .saturating_add(category_bonus);
        reasoning.push(format!("Total trust change: {:+}", total_change));

        TrustCalculation {
            base_change,
            quality_adjustment,
            timing_adjustment,
            feedback_bonus,
            category_bonus,
            total_change,
            reasoning,
        }
    }

    pub fn calculate_impact(
        &self,
        rewards: &TaskRewards,
        category: WorkCategory,
        quality_score: u8,
        complexity: TaskComplexity,
    ) -> ImpactCalculation {
        let cfg = &self.config.impact;
        let mut reasoning = Vec::new();

        let multiplier = cfg.category_multipliers.factor(category);
        let base_impact = scale(rewards.rwis_points, basis_points(multiplier));
        reasoning.push(format!(
            "Base impact: {} x {} ({} multiplier) = {}",
            rewards.rwis_points, multiplier, category, base_impact
        ));

        let quality_bonus = if quality_score >= 4 {
            let bonus = scale(base_impact, basis_points(cfg.quality_bonus));
            reasoning.push(format!(
                "Quality bonus ({}/5): +{:.0}% = +{}",
                quality_score,
                cfg.quality_bonus * 100.0,
                bonus
            ));
            bonus
        } else {
            0
        };

        let complexity_factor = cfg.complexity_multipliers.factor(complexity);
        let complexity_bonus = scale(
            base_impact,
            basis_points(complexity_factor).saturating_sub(BASIS),
        );
        if complexity_bonus > 0 {
            reasoning.push(format!(
                "{} complexity x{}: +{}",
                complexity, complexity_factor, complexity_bonus
            ));
        }

        let total_impact = base_impact
            .saturating_add(quality_bonus)
            .saturating_add(complexity_bonus);
        reasoning.push(format!("Total impact: {}", total_impact));

        ImpactCalculation {
            base_impact,
            quality_bonus,
            complexity_bonus,
            total_impact,
            reasoning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewards(xp: u64, trust: i64, rwis: u64) -> TaskRewards {
        TaskRewards {
            xp,
            trust_score_bonus: trust,
            rwis_points: rwis,
            payment: None,
        }
    }

    #[test]
    fn test_community_excellent_xp() {
        let calc = ScoreCalculator::default();
        let xp = calc.calculate_xp(&rewards(100, 5, 25), WorkCategory::Community, 5, 1.0, 1);
        assert_eq!(xp.base_xp, 120);
        assert_eq!(xp.quality_bonus, 30);
        assert_eq!(xp.early_completion_bonus, 0);
        assert_eq!(xp.level_multiplier, 1.0);
        assert_eq!(xp.total_xp, 150);
        assert!(xp.reasoning.iter().any(|r| r.contains("Quality bonus")));
    }

    #[test]
    fn test_corporate_multiplier_is_exact() {
        let calc = ScoreCalculator::default();
        let xp = calc.calculate_xp(&rewards(100, 0, 0), WorkCategory::Corporate, 2, 1.0, 1);
        assert_eq!(xp.base_xp, 110);
        assert_eq!(xp.quality_bonus, 0);
        assert_eq!(xp.total_xp, 110);
    }

    #[test]
    fn test_standard_quality_and_early_bonus() {
        let calc = ScoreCalculator::default();
        let xp = calc.calculate_xp(&rewards(200, 0, 0), WorkCategory::Freelance, 3, 0.5, 1);
        assert_eq!(xp.base_xp, 200);
        assert_eq!(xp.quality_bonus, 20);
        // 200 * 0.5 * 0.2
        assert_eq!(xp.early_completion_bonus, 20);
        assert_eq!(xp.total_xp, 240);
    }

    #[test]
    fn test_early_bonus_uses_unrounded_ratio() {
        let calc = ScoreCalculator::default();
        // 10000 * 0.499996 * 0.2 = 999.992
        let xp = calc.calculate_xp(&rewards(10_000, 0, 0), WorkCategory::Freelance, 1, 0.500004, 1);
        assert_eq!(xp.base_xp, 10_000);
        assert_eq!(xp.early_completion_bonus, 999);
        assert_eq!(xp.total_xp, 10_999);
    }

    #[test]
    fn test_level_damping() {
        let calc = ScoreCalculator::default();
        // Level 6: 1 - 5 * 0.02 = 0.90
        let xp = calc.calculate_xp(&rewards(100, 0, 0), WorkCategory::Freelance, 2, 1.0, 6);
        assert_eq!(xp.total_xp, 90);
        assert!((xp.level_multiplier - 0.9).abs() < 1e-9);

        // Damping bottoms out at 0.5
        let xp = calc.calculate_xp(&rewards(100, 0, 0), WorkCategory::Freelance, 2, 1.0, 80);
        assert_eq!(xp.total_xp, 50);
        assert_eq!(xp.level_multiplier, 0.5);
    }

    #[test]
    fn test_trust_breakdown() {
        let calc = ScoreCalculator::default();
        let feedback = "x".repeat(51);
        let trust = calc.calculate_trust(&rewards(0, 5, 0), WorkCategory::Community, 5, true, &feedback);
        assert_eq!(trust.quality_adjustment, 3);
        assert_eq!(trust.timing_adjustment, 1);
        assert_eq!(trust.feedback_bonus, 1);
        assert_eq!(trust.category_bonus, 1);
        assert_eq!(trust.total_change, 11);
    }

    #[test]
    fn test_trust_penalties() {
        let calc = ScoreCalculator::default();
        let trust = calc.calculate_trust(&rewards(0, 0, 0), WorkCategory::Freelance, 1, false, "ok");
        assert_eq!(trust.quality_adjustment, -2);
        assert_eq!(trust.timing_adjustment, -3);
        assert_eq!(trust.feedback_bonus, 0);
        assert_eq!(trust.total_change, -5);
    }

    #[test]
    fn test_feedback_needs_more_than_fifty_chars() {
        let calc = ScoreCalculator::default();
        let exact = "y".repeat(50);
        let trust = calc.calculate_trust(&rewards(0, 0, 0), WorkCategory::Freelance, 3, true, &exact);
        assert_eq!(trust.feedback_bonus, 0);
    }

    #[test]
    fn test_apply_trust_delta_floors_at_zero() {
        assert_eq!(apply_trust_delta(2, -5), 0);
        assert_eq!(apply_trust_delta(10, -4), 6);
        assert_eq!(apply_trust_delta(10, 4), 14);
        assert_eq!(apply_trust_delta(0, i64::MIN), 0);
    }

    #[test]
    fn test_impact_calculation() {
        let calc = ScoreCalculator::default();
        let impact = calc.calculate_impact(&rewards(0, 0, 25), WorkCategory::Community, 5, TaskComplexity::Medium);
        // floor(25 * 1.5) = 37
        assert_eq!(impact.base_impact, 37);
        // floor(37 * 0.3) = 11
        assert_eq!(impact.quality_bonus, 11);
        // floor(37 * 0.2) = 7
        assert_eq!(impact.complexity_bonus, 7);
        assert_eq!(impact.total_impact, 55);
    }

    #[test]
    fn test_impact_low_complexity_no_bonus() {
        let calc = ScoreCalculator::default();
        let impact = calc.calculate_impact(&rewards(0, 0, 40), WorkCategory::Corporate, 3, TaskComplexity::Low);
        assert_eq!(impact.base_impact, 48);
        assert_eq!(impact.quality_bonus, 0);
        assert_eq!(impact.complexity_bonus, 0);
        assert_eq!(impact.total_impact, 48);
    }

    #[test]
    fn test_score_event_is_deterministic() {
        let calc = ScoreCalculator::default();
        let event = TaskCompletionEvent::new(rewards(80, 2, 10), WorkCategory::Corporate)
            .with_quality(4)
            .with_time_ratio(0.75)
            .with_complexity(TaskComplexity::High);
        let a = calc.score_event(&event, 3);
        let b = calc.score_event(&event, 3);
        assert_eq!(a, b);
    }
}
