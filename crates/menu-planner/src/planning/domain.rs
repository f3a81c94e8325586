use super::config::{
    ConfigurationError, CostFormId, MenuLineId, VarietyLimits, SOFT_OVERFLOW_ALLOWANCE,
};
use crate::catalog::{Recipe, RecipeId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Range;

/// A (menu line, cost form) pair: one column of the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotType {
    pub menu_line_id: MenuLineId,
    pub cost_form_id: CostFormId,
}

impl SlotType {
    pub fn new(menu_line_id: MenuLineId, cost_form_id: CostFormId) -> Self {
        Self {
            menu_line_id,
            cost_form_id,
        }
    }
}

/// Identity of one meal position in the plan. Orders by date first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub menu_line_id: MenuLineId,
    pub cost_form_id: CostFormId,
}

impl SlotKey {
    pub fn new(date: NaiveDate, slot_type: SlotType) -> Self {
        Self {
            date,
            menu_line_id: slot_type.menu_line_id,
            cost_form_id: slot_type.cost_form_id,
        }
    }

    pub fn slot_type(&self) -> SlotType {
        SlotType::new(self.menu_line_id, self.cost_form_id)
    }

    /// Keys of every slot dated in `[from, until)`.
    fn date_range(from: NaiveDate, until: NaiveDate) -> Range<SlotKey> {
        let floor = |date| SlotKey {
            date,
            menu_line_id: MenuLineId(0),
            cost_form_id: CostFormId(0),
        };
        floor(from)..floor(until)
    }
}

/// Which candidate pool a slot's options were drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidatePool {
    /// No frequency or repetition rule was bent.
    Preferred,
    /// A category cap was exceeded within the soft-overflow allowance.
    SoftOverflow,
    /// Every filtered pool was empty; the unfiltered eligible list was used.
    Fallback,
    /// Options were replaced by the local search optimizer.
    Optimizer,
}

/// One meal position holding interchangeable options and a selection pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct MealSlot<'c> {
    options: Vec<&'c Recipe>,
    selected_index: usize,
    pool: CandidatePool,
}

impl<'c> MealSlot<'c> {
    /// Returns `None` when `options` is empty or the index is out of range.
    pub fn new(options: Vec<&'c Recipe>, selected_index: usize, pool: CandidatePool) -> Option<Self> {
        if selected_index >= options.len() {
            return None;
        }

        Some(Self {
            options,
            selected_index,
            pool,
        })
    }

    /// Builds a slot that defaults to its cheapest option (first one on ties).
    pub fn cheapest_of(options: Vec<&'c Recipe>, pool: CandidatePool) -> Option<Self> {
        let mut cheapest = 0;
        for (index, option) in options.iter().enumerate() {
            if option.cost < options[cheapest].cost {
                cheapest = index;
            }
        }
        Self::new(options, cheapest, pool)
    }

    pub fn options(&self) -> &[&'c Recipe] {
        &self.options
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn pool(&self) -> CandidatePool {
        self.pool
    }

    pub fn selected(&self) -> &'c Recipe {
        self.options[self.selected_index]
    }

    pub fn cost(&self) -> f64 {
        self.selected().cost
    }

    pub fn allergens(&self) -> &'c BTreeSet<String> {
        &self.selected().allergens
    }

    /// Flips between the first two options; no-op for single-option slots.
    pub(crate) fn toggle_selection(&mut self) {
        if self.options.len() > 1 {
            self.selected_index = if self.selected_index == 0 { 1 } else { 0 };
        }
    }
}

/// Mapping of every filled slot. Ordered so a fixed seed reproduces a plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan<'c> {
    slots: BTreeMap<SlotKey, MealSlot<'c>>,
}

impl<'c> Plan<'c> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: SlotKey, slot: MealSlot<'c>) -> Option<MealSlot<'c>> {
        self.slots.insert(key, slot)
    }

    pub fn get(&self, key: &SlotKey) -> Option<&MealSlot<'c>> {
        self.slots.get(key)
    }

    pub fn get_mut(&mut self, key: &SlotKey) -> Option<&mut MealSlot<'c>> {
        self.slots.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, &MealSlot<'c>)> {
        self.slots.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &SlotKey> {
        self.slots.keys()
    }

    /// Slots dated in `[from, until)`.
    pub fn between(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> impl Iterator<Item = (&SlotKey, &MealSlot<'c>)> {
        let range = if from < until {
            SlotKey::date_range(from, until)
        } else {
            SlotKey::date_range(until, until)
        };
        self.slots.range(range)
    }

    /// Realized cost of each planned day.
    pub fn daily_costs(&self) -> BTreeMap<NaiveDate, f64> {
        let mut costs = BTreeMap::new();
        for (key, slot) in &self.slots {
            *costs.entry(key.date).or_insert(0.0) += slot.cost();
        }
        costs
    }

    /// How often each recipe is the selected option.
    pub fn selection_counts(&self) -> HashMap<RecipeId, usize> {
        let mut counts = HashMap::new();
        for slot in self.slots.values() {
            *counts.entry(slot.selected().id).or_insert(0) += 1;
        }
        counts
    }
}

/// Dates on which each recipe was selected. Grows monotonically.
#[derive(Debug, Clone, Default)]
pub struct UsageIndex {
    dates: HashMap<RecipeId, Vec<NaiveDate>>,
}

impl UsageIndex {
    pub fn record(&mut self, recipe: RecipeId, date: NaiveDate) {
        self.dates.entry(recipe).or_default().push(date);
    }

    pub fn times_used(&self, recipe: RecipeId) -> usize {
        self.dates.get(&recipe).map_or(0, Vec::len)
    }

    /// True when every earlier use lies at least `interval` days before `date`.
    pub fn respects_interval(&self, recipe: RecipeId, date: NaiveDate, interval: u32) -> bool {
        self.dates.get(&recipe).map_or(true, |dates| {
            dates
                .iter()
                .all(|used| (date - *used).num_days() >= i64::from(interval))
        })
    }
}

/// Outcome of checking a candidate against the category caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CategoryVerdict {
    WithinLimits,
    SoftOverflow,
    Exceeded,
}

/// Running meat/sweet/fried totals for the plan under construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounters {
    pub meat: u32,
    pub sweet: u32,
    pub fried: u32,
}

impl CategoryCounters {
    pub fn assess(&self, recipe: &Recipe, limits: &VarietyLimits) -> CategoryVerdict {
        let checks = [
            (recipe.flags.contains_meat, self.meat, limits.max_meat),
            (recipe.flags.is_sweet, self.sweet, limits.max_sweet),
            (recipe.flags.is_fried, self.fried, limits.max_fried),
        ];

        checks
            .into_iter()
            .filter(|(flagged, _, _)| *flagged)
            .map(|(_, count, cap)| {
                if count >= cap.saturating_add(SOFT_OVERFLOW_ALLOWANCE) {
                    CategoryVerdict::Exceeded
                } else if count >= cap {
                    CategoryVerdict::SoftOverflow
                } else {
                    CategoryVerdict::WithinLimits
                }
            })
            .max()
            .unwrap_or(CategoryVerdict::WithinLimits)
    }

    pub fn record(&mut self, recipe: &Recipe) {
        if recipe.flags.contains_meat {
            self.meat += 1;
        }
        if recipe.flags.is_sweet {
            self.sweet += 1;
        }
        if recipe.flags.is_fried {
            self.fried += 1;
        }
    }
}

/// Abort conditions of plan generation. No partial plan accompanies them.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(
        "daily budget {target:.2} not achievable: achievable range [{min_achievable:.2}, {max_achievable:.2}]"
    )]
    BudgetInfeasible {
        min_achievable: f64,
        max_achievable: f64,
        target: f64,
    },
    #[error("no eligible recipes for {menu_line}/{cost_form}")]
    NoEligibleRecipes {
        menu_line_id: MenuLineId,
        menu_line: String,
        cost_form_id: CostFormId,
        cost_form: String,
    },
}

/// Non-fatal finding attached to a finished plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    IncompletePlan {
        filled: usize,
        expected: usize,
    },
    BudgetOutOfRange {
        average_daily_cost: f64,
        bkt_min: f64,
        bkt_max: f64,
    },
}

impl PlanWarning {
    pub fn summary(&self) -> String {
        match self {
            PlanWarning::IncompletePlan { filled, expected } => {
                format!("incomplete plan: {filled}/{expected} slots filled")
            }
            PlanWarning::BudgetOutOfRange {
                average_daily_cost,
                bkt_min,
                bkt_max,
            } => format!(
                "average daily cost {:.2} outside [{:.2}, {:.2}]",
                average_daily_cost, bkt_min, bkt_max
            ),
        }
    }
}
