use super::config::PlanConfig;
use super::domain::{Plan, PlanWarning};
use tracing::warn;

/// Reports incomplete plans and an out-of-range average daily cost. Never
/// modifies the plan.
pub fn validate(plan: &Plan<'_>, config: &PlanConfig) -> Vec<PlanWarning> {
    let mut warnings = Vec::new();

    let expected = config.expected_slots();
    if plan.len() != expected {
        warnings.push(PlanWarning::IncompletePlan {
            filled: plan.len(),
            expected,
        });
    }

    let daily_costs = plan.daily_costs();
    if !daily_costs.is_empty() {
        let average = daily_costs.values().sum::<f64>() / daily_costs.len() as f64;
        if average < config.bkt_min() || average > config.bkt_max() {
            warnings.push(PlanWarning::BudgetOutOfRange {
                average_daily_cost: average,
                bkt_min: config.bkt_min(),
                bkt_max: config.bkt_max(),
            });
        }
    }

    for warning in &warnings {
        warn!(warning = %warning.summary(), "plan constraint violated");
    }
    warnings
}
