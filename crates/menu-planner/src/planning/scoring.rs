use super::config::PlanConfig;
use super::domain::{Plan, UsageIndex};
use crate::catalog::{Recipe, REFERENCE_CALORIES};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const BUDGET_WEIGHT: f64 = 0.35;
pub const VARIETY_WEIGHT: f64 = 0.25;
pub const POPULARITY_WEIGHT: f64 = 0.15;
pub const SEASONALITY_WEIGHT: f64 = 0.15;
pub const NUTRITION_WEIGHT: f64 = 0.10;

/// Days looked back when comparing a candidate with recent selections.
pub const VARIETY_LOOKBACK_DAYS: i64 = 7;

/// Per-criterion scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub budget: f64,
    pub variety: f64,
    pub popularity: f64,
    pub seasonality: f64,
    pub nutrition: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.budget * BUDGET_WEIGHT
            + self.variety * VARIETY_WEIGHT
            + self.popularity * POPULARITY_WEIGHT
            + self.seasonality * SEASONALITY_WEIGHT
            + self.nutrition * NUTRITION_WEIGHT
    }
}

/// Read-only view of the plan under construction.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a, 'c> {
    pub config: &'a PlanConfig,
    pub plan: &'a Plan<'c>,
    pub usage: &'a UsageIndex,
    pub running_daily_cost: f64,
}

pub fn score_candidate(
    candidate: &Recipe,
    date: NaiveDate,
    context: &ScoringContext<'_, '_>,
) -> ScoreBreakdown {
    ScoreBreakdown {
        budget: budget_score(context.running_daily_cost + candidate.cost, context.config),
        variety: variety_score(candidate, date, context.plan, context.usage),
        popularity: f64::from(candidate.popularity.min(10)) / 10.0,
        seasonality: seasonality_score(candidate, date, context.config.consider_seasonality),
        nutrition: nutrition_score(candidate),
    }
}

/// Rewards days that land comfortably under the target; zero above the ceiling.
pub fn budget_score(projected_daily_cost: f64, config: &PlanConfig) -> f64 {
    if projected_daily_cost > config.bkt_max() {
        return 0.0;
    }

    let ratio = projected_daily_cost / config.bkt_target;
    if ratio < 0.5 {
        0.7
    } else if ratio <= 0.9 {
        1.0
    } else {
        (1.0 - (ratio - 0.9) / 0.1).max(0.0)
    }
}

pub fn variety_score(
    candidate: &Recipe,
    date: NaiveDate,
    plan: &Plan<'_>,
    usage: &UsageIndex,
) -> f64 {
    let frequency = 1.0 / (1.0 + usage.times_used(candidate.id) as f64);

    let window_start = date - Duration::days(VARIETY_LOOKBACK_DAYS);
    let (total, count) = plan
        .between(window_start, date)
        .map(|(_, slot)| candidate.similarity(slot.selected()))
        .fold((0.0, 0usize), |(total, count), similarity| {
            (total + similarity, count + 1)
        });
    let mean_similarity = if count == 0 {
        0.0
    } else {
        total / count as f64
    };

    frequency * (1.0 - mean_similarity)
}

pub fn seasonality_score(candidate: &Recipe, date: NaiveDate, consider_seasonality: bool) -> f64 {
    if !consider_seasonality {
        0.5
    } else if candidate.is_in_season(date.month()) {
        1.0
    } else {
        0.0
    }
}

pub fn nutrition_score(candidate: &Recipe) -> f64 {
    let deviation = (candidate.calories() - REFERENCE_CALORIES).abs() / REFERENCE_CALORIES;
    1.0 - deviation.min(1.0)
}
