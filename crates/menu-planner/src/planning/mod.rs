//! Plan generation pipeline.
//!
//! Stages run strictly in order: eligibility filtering, budget feasibility,
//! greedy construction, optional local search, validation and formatting.
//! The first two stages are the only ones that can abort a run.

pub mod config;
pub mod construct;
pub mod domain;
pub mod eligibility;
pub mod feasibility;
pub mod format;
pub mod optimize;
pub mod scoring;
pub mod selection;
pub mod validate;

#[cfg(test)]
mod tests;

pub use config::{
    ConfigurationError, CostForm, CostFormId, MenuLine, MenuLineId, PlanConfig,
    QualityExclusions, VarietyLimits,
};
pub use construct::{fill_slot, ConstructionState, GreedyConstructor};
pub use domain::{
    CandidatePool, CategoryCounters, CategoryVerdict, MealSlot, Plan, PlanError, PlanWarning,
    SlotKey, SlotType, UsageIndex,
};
pub use eligibility::{rejection_reason, CandidateLists, Rejection};
pub use feasibility::BudgetFeasibility;
pub use format::{
    format_plan, DayPlan, MealEntry, MenuLineDay, MenuPlanResult, PlanStatistics, RecipeOption,
};
pub use optimize::{LocalSearchOptimizer, OptimizationOutcome};
pub use scoring::ScoreBreakdown;
pub use selection::{RecipeUsage, SelectionError};

use crate::catalog::RecipeCatalog;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

/// Entry point for plan generation against a shared catalog.
pub struct MenuPlanner<'c> {
    catalog: &'c RecipeCatalog,
}

impl<'c> MenuPlanner<'c> {
    pub fn new(catalog: &'c RecipeCatalog) -> Self {
        Self { catalog }
    }

    /// Generates a plan seeded from `config.seed`, or a fresh random seed.
    pub fn generate(&self, config: &PlanConfig) -> Result<MenuPlanResult, PlanError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        debug!(seed, "local search seeded");
        let mut rng = StdRng::seed_from_u64(seed);
        let mut result = self.generate_with_rng(config, &mut rng)?;
        result.seed = Some(seed);
        Ok(result)
    }

    pub fn generate_with_rng<R: Rng>(
        &self,
        config: &PlanConfig,
        rng: &mut R,
    ) -> Result<MenuPlanResult, PlanError> {
        config.validate()?;
        info!(
            start = %config.start_date,
            end = %config.end_date,
            days = config.day_count(),
            slot_types = config.total_cost_forms(),
            bkt_target = config.bkt_target,
            "generating menu plan"
        );

        let candidates = CandidateLists::build(self.catalog, config)?;
        let feasibility = feasibility::ensure_feasible(&candidates, config)?;
        info!(
            min_daily_cost = feasibility.min_daily_cost,
            max_daily_cost = feasibility.max_daily_cost,
            bkt_max = config.bkt_max(),
            "budget is achievable"
        );

        let plan = GreedyConstructor::new(config, &candidates).construct();

        let (plan, optimization) = if LocalSearchOptimizer::is_applicable(config) {
            let (plan, outcome) = LocalSearchOptimizer::new(config, &candidates).optimize(plan, rng);
            (plan, Some(outcome))
        } else {
            warn!("variety limits active; local search skipped to keep them intact");
            (plan, None)
        };

        let warnings = validate::validate(&plan, config);

        let mut result = format_plan(&plan, config);
        result.warnings = warnings;
        result.feasibility = Some(feasibility);
        result.optimization = optimization;
        info!(
            meals = result.meal_count(),
            average_daily_cost = result.statistics.average_bkt,
            within_budget = result.statistics.within_budget,
            "menu plan ready"
        );
        Ok(result)
    }
}
