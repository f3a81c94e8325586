use super::config::PlanConfig;
use super::domain::{
    CandidatePool, CategoryCounters, CategoryVerdict, MealSlot, Plan, SlotKey, SlotType,
    UsageIndex,
};
use super::eligibility::CandidateLists;
use super::scoring::{score_candidate, ScoringContext};
use crate::catalog::Recipe;
use chrono::NaiveDate;
use tracing::{debug, info};

/// Bookkeeping threaded through construction, one slot at a time.
#[derive(Debug, Clone, Default)]
pub struct ConstructionState {
    pub usage: UsageIndex,
    pub counters: CategoryCounters,
    pub current_date: Option<NaiveDate>,
    pub daily_cost: f64,
}

impl ConstructionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the running daily cost when construction moves to a new date.
    pub fn begin_day(&mut self, date: NaiveDate) {
        if self.current_date != Some(date) {
            self.current_date = Some(date);
            self.daily_cost = 0.0;
        }
    }

    fn commit(&mut self, recipe: &Recipe, date: NaiveDate) {
        self.usage.record(recipe.id, date);
        self.counters.record(recipe);
        self.daily_cost += recipe.cost;
    }
}

/// Chooses the options for one slot and applies the selection to `state`.
///
/// Candidates that break a category cap by more than the soft-overflow
/// allowance, or that were served within the minimum repetition distance,
/// are left out unless nothing else remains. Returns `None` only for an
/// empty candidate list.
pub fn fill_slot<'c>(
    state: &mut ConstructionState,
    plan: &Plan<'c>,
    key: SlotKey,
    candidates: &[&'c Recipe],
    config: &PlanConfig,
) -> Option<MealSlot<'c>> {
    state.begin_day(key.date);

    let distance = config
        .variety
        .repetition_distance(config.repetition_interval);
    let mut preferred = Vec::new();
    let mut soft = Vec::new();
    for &candidate in candidates {
        if !state.usage.respects_interval(candidate.id, key.date, distance) {
            continue;
        }
        match state.counters.assess(candidate, &config.variety) {
            CategoryVerdict::WithinLimits => preferred.push(candidate),
            CategoryVerdict::SoftOverflow => soft.push(candidate),
            CategoryVerdict::Exceeded => {}
        }
    }

    let (pool, source) = if !preferred.is_empty() {
        (preferred, CandidatePool::Preferred)
    } else if !soft.is_empty() {
        (soft, CandidatePool::SoftOverflow)
    } else {
        (candidates.to_vec(), CandidatePool::Fallback)
    };

    if source != CandidatePool::Preferred {
        debug!(
            date = %key.date,
            menu_line = %key.menu_line_id,
            cost_form = %key.cost_form_id,
            pool = ?source,
            "preferred candidates exhausted"
        );
    }

    let context = ScoringContext {
        config,
        plan,
        usage: &state.usage,
        running_daily_cost: state.daily_cost,
    };
    let mut scored: Vec<(&'c Recipe, f64)> = pool
        .into_iter()
        .map(|recipe| {
            let score = score_candidate(recipe, key.date, &context).total();
            (recipe, score)
        })
        .collect();
    scored.sort_by(|left, right| right.1.total_cmp(&left.1));

    let wanted = config.recipe_options_count;
    let mut options: Vec<&'c Recipe> = scored
        .iter()
        .map(|(recipe, _)| *recipe)
        .filter(|recipe| {
            state
                .usage
                .respects_interval(recipe.id, key.date, config.repetition_interval)
        })
        .take(wanted)
        .collect();
    if options.len() < wanted {
        let padding: Vec<&'c Recipe> = scored
            .iter()
            .map(|(recipe, _)| *recipe)
            .filter(|recipe| !options.iter().any(|taken| taken.id == recipe.id))
            .take(wanted - options.len())
            .collect();
        options.extend(padding);
    }

    let slot = MealSlot::cheapest_of(options, source)?;
    state.commit(slot.selected(), key.date);
    Some(slot)
}

/// Fills every slot chronologically, then in configured slot order.
pub struct GreedyConstructor<'a, 'c> {
    config: &'a PlanConfig,
    candidates: &'a CandidateLists<'c>,
}

impl<'a, 'c> GreedyConstructor<'a, 'c> {
    pub fn new(config: &'a PlanConfig, candidates: &'a CandidateLists<'c>) -> Self {
        Self { config, candidates }
    }

    pub fn construct(&self) -> Plan<'c> {
        let mut plan = Plan::new();
        let mut state = ConstructionState::new();
        let mut relaxed = 0usize;

        for date in self.config.dates() {
            state.begin_day(date);
            for (line, form) in self.config.slot_types() {
                let slot_type = SlotType::new(line.id, form.id);
                let key = SlotKey::new(date, slot_type);
                let candidates = self.candidates.get(slot_type);
                if let Some(slot) = fill_slot(&mut state, &plan, key, candidates, self.config) {
                    if slot.pool() != CandidatePool::Preferred {
                        relaxed += 1;
                    }
                    plan.insert(key, slot);
                }
            }
            debug!(date = %date, daily_cost = state.daily_cost, "day constructed");
        }

        info!(
            slots = plan.len(),
            relaxed_slots = relaxed,
            meat = state.counters.meat,
            sweet = state.counters.sweet,
            fried = state.counters.fried,
            "greedy construction finished"
        );
        plan
    }
}
