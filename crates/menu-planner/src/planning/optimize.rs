use super::config::PlanConfig;
use super::domain::{CandidatePool, MealSlot, Plan, SlotKey};
use super::eligibility::CandidateLists;
use crate::catalog::Recipe;
use rand::seq::index::sample;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Penalty multiplier for every unit a day runs over the ceiling.
const OVER_BUDGET_PENALTY: f64 = 3.0;
/// Fraction of the target the optimizer steers daily costs towards.
const COST_ANCHOR: f64 = 0.8;
const REPETITION_WEIGHT: f64 = 0.1;
/// Alternatives sampled when a slot's option list is replaced.
const REPLACEMENT_OPTIONS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOutcome {
    pub initial_cost: f64,
    pub final_cost: f64,
    pub iterations: usize,
    pub improvements: usize,
}

/// Randomized hill climbing over selection toggles and option swaps.
///
/// Moves ignore category caps and repetition distances, so the optimizer is
/// only run when those limits are at their permissive defaults.
pub struct LocalSearchOptimizer<'a, 'c> {
    config: &'a PlanConfig,
    candidates: &'a CandidateLists<'c>,
    iterations: usize,
}

impl<'a, 'c> LocalSearchOptimizer<'a, 'c> {
    pub fn new(config: &'a PlanConfig, candidates: &'a CandidateLists<'c>) -> Self {
        Self {
            config,
            candidates,
            iterations: config.optimizer_iterations,
        }
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn is_applicable(config: &PlanConfig) -> bool {
        !config.variety.has_frequency_limits() && !config.variety.has_repetition_limit()
    }

    /// Lower is better: budget deviation per day plus a repetition penalty.
    pub fn evaluate(&self, plan: &Plan<'_>) -> f64 {
        plan_cost(plan, self.config)
    }

    pub fn optimize<R: Rng>(
        &self,
        plan: Plan<'c>,
        rng: &mut R,
    ) -> (Plan<'c>, OptimizationOutcome) {
        let initial_cost = self.evaluate(&plan);
        let keys: Vec<SlotKey> = plan.keys().copied().collect();

        let mut best = plan;
        let mut best_cost = initial_cost;
        let mut improvements = 0usize;

        if !keys.is_empty() {
            for iteration in 0..self.iterations {
                let key = keys[rng.random_range(0..keys.len())];
                let Some(neighbor) = self.neighbor(&best, key, rng) else {
                    continue;
                };

                let cost = self.evaluate(&neighbor);
                if cost < best_cost {
                    debug!(iteration, cost, previous = best_cost, "optimizer accepted move");
                    best = neighbor;
                    best_cost = cost;
                    improvements += 1;
                }
            }
        }

        let outcome = OptimizationOutcome {
            initial_cost,
            final_cost: best_cost,
            iterations: self.iterations,
            improvements,
        };
        info!(
            initial_cost = outcome.initial_cost,
            final_cost = outcome.final_cost,
            improvements = outcome.improvements,
            "local search finished"
        );
        (best, outcome)
    }

    /// Copy of `plan` with one slot changed, or `None` when the slot has no
    /// alternative to offer.
    fn neighbor<R: Rng>(
        &self,
        plan: &Plan<'c>,
        key: SlotKey,
        rng: &mut R,
    ) -> Option<Plan<'c>> {
        let slot = plan.get(&key)?;

        if slot.options().len() >= 2 && rng.random::<f64>() < 0.5 {
            let mut next = plan.clone();
            next.get_mut(&key)?.toggle_selection();
            return Some(next);
        }

        let current = slot.selected().id;
        let alternatives: Vec<&'c Recipe> = self
            .candidates
            .get(key.slot_type())
            .iter()
            .copied()
            .filter(|recipe| recipe.id != current)
            .collect();
        if alternatives.is_empty() {
            return None;
        }

        let amount = REPLACEMENT_OPTIONS.min(alternatives.len());
        let options: Vec<&'c Recipe> = sample(rng, alternatives.len(), amount)
            .into_iter()
            .map(|index| alternatives[index])
            .collect();
        let replacement = MealSlot::new(options, 0, CandidatePool::Optimizer)?;

        let mut next = plan.clone();
        next.insert(key, replacement);
        Some(next)
    }
}

pub fn plan_cost(plan: &Plan<'_>, config: &PlanConfig) -> f64 {
    let daily_costs = plan.daily_costs();
    if daily_costs.is_empty() {
        return 0.0;
    }

    let bkt_max = config.bkt_max();
    let anchor = COST_ANCHOR * config.bkt_target;
    let budget_penalty: f64 = daily_costs
        .values()
        .map(|&cost| {
            if cost > bkt_max {
                OVER_BUDGET_PENALTY * (cost - bkt_max)
            } else {
                (cost - anchor).abs()
            }
        })
        .sum::<f64>()
        / daily_costs.len() as f64;

    let repeats: usize = plan
        .selection_counts()
        .values()
        .map(|count| count * count)
        .sum();
    let repetition_penalty = REPETITION_WEIGHT * repeats as f64 / plan.len() as f64;

    budget_penalty + repetition_penalty
}
