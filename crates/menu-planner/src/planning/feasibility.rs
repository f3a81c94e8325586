use super::config::PlanConfig;
use super::domain::PlanError;
use super::eligibility::CandidateLists;
use serde::{Deserialize, Serialize};

/// Cheapest and dearest day the candidate lists allow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetFeasibility {
    pub feasible: bool,
    pub min_daily_cost: f64,
    pub max_daily_cost: f64,
}

pub fn analyze(candidates: &CandidateLists<'_>, config: &PlanConfig) -> BudgetFeasibility {
    let mut min_daily_cost = 0.0;
    let mut max_daily_cost = 0.0;

    for (_, recipes) in candidates.iter() {
        let costs = recipes.iter().map(|recipe| recipe.cost);
        min_daily_cost += costs.clone().fold(f64::INFINITY, f64::min);
        max_daily_cost += costs.fold(f64::NEG_INFINITY, f64::max);
    }

    BudgetFeasibility {
        feasible: min_daily_cost <= config.bkt_max(),
        min_daily_cost,
        max_daily_cost,
    }
}

/// Fails with [`PlanError::BudgetInfeasible`] when even the cheapest day
/// exceeds the ceiling.
pub fn ensure_feasible(
    candidates: &CandidateLists<'_>,
    config: &PlanConfig,
) -> Result<BudgetFeasibility, PlanError> {
    let analysis = analyze(candidates, config);
    if !analysis.feasible {
        return Err(PlanError::BudgetInfeasible {
            min_achievable: analysis.min_daily_cost,
            max_achievable: analysis.max_daily_cost,
            target: config.bkt_target,
        });
    }
    Ok(analysis)
}
