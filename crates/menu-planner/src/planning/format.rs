use super::config::{CostFormId, MenuLineId, PlanConfig};
use super::domain::{MealSlot, Plan, PlanWarning, SlotKey, SlotType};
use super::feasibility::BudgetFeasibility;
use super::optimize::OptimizationOutcome;
use crate::catalog::{Ingredient, Recipe, RecipeId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Externally visible plan: one entry per day plus summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuPlanResult {
    pub days: Vec<DayPlan>,
    pub statistics: PlanStatistics,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<PlanWarning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feasibility: Option<BudgetFeasibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimization: Option<OptimizationOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub day_of_week: String,
    pub total_cost: f64,
    pub menu_lines: Vec<MenuLineDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuLineDay {
    pub menu_line_id: MenuLineId,
    pub name: String,
    pub recipes: Vec<MealEntry>,
}

/// A served meal: its interchangeable options and the one currently chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredMealEntry")]
pub struct MealEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_form_id: Option<CostFormId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_form: Option<String>,
    pub options: Vec<RecipeOption>,
    pub selected_index: usize,
    pub is_user_modified: bool,
}

impl MealEntry {
    pub fn selected(&self) -> Option<&RecipeOption> {
        self.options.get(self.selected_index)
    }

    pub fn cost(&self) -> f64 {
        self.selected().map_or(0.0, |option| option.cost_per_serving)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeOption {
    pub recipe_id: RecipeId,
    pub recipe_name: String,
    pub cost_per_serving: f64,
    #[serde(default)]
    pub allergens: BTreeSet<String>,
    #[serde(default)]
    pub dietary_forms: BTreeSet<String>,
    #[serde(default)]
    pub popularity: u8,
    #[serde(default)]
    pub additives: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub category: String,
}

impl From<&Recipe> for RecipeOption {
    fn from(recipe: &Recipe) -> Self {
        Self {
            recipe_id: recipe.id,
            recipe_name: recipe.name.clone(),
            cost_per_serving: recipe.cost,
            allergens: recipe.allergens.clone(),
            dietary_forms: recipe.dietary_forms.clone(),
            popularity: recipe.popularity,
            additives: recipe.additives.clone(),
            ingredients: recipe.ingredients.clone(),
            description: recipe.description.clone(),
            group: recipe.group.clone(),
            category: recipe.category.clone(),
        }
    }
}

/// Accepted on input: the options shape or a single flattened recipe.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredMealEntry {
    WithOptions {
        #[serde(default)]
        cost_form_id: Option<CostFormId>,
        #[serde(default)]
        cost_form: Option<String>,
        options: Vec<RecipeOption>,
        #[serde(default)]
        selected_index: usize,
        #[serde(default)]
        is_user_modified: bool,
    },
    Flattened {
        #[serde(default)]
        cost_form_id: Option<CostFormId>,
        #[serde(default)]
        cost_form: Option<String>,
        #[serde(default)]
        is_user_modified: bool,
        #[serde(flatten)]
        recipe: RecipeOption,
    },
}

impl From<StoredMealEntry> for MealEntry {
    fn from(stored: StoredMealEntry) -> Self {
        match stored {
            StoredMealEntry::WithOptions {
                cost_form_id,
                cost_form,
                options,
                selected_index,
                is_user_modified,
            } => Self {
                cost_form_id,
                cost_form,
                options,
                selected_index,
                is_user_modified,
            },
            StoredMealEntry::Flattened {
                cost_form_id,
                cost_form,
                is_user_modified,
                recipe,
            } => Self {
                cost_form_id,
                cost_form,
                options: vec![recipe],
                selected_index: 0,
                is_user_modified,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStatistics {
    pub total_days: usize,
    /// Mean realized daily cost.
    pub average_bkt: f64,
    pub total_cost: f64,
    pub bkt_target: f64,
    pub bkt_min: f64,
    /// Rounded for display; budget checks use `budget_ceiling`.
    pub bkt_max: f64,
    /// Unrounded `bkt_target * (1 + bkt_tolerance)`. Plans stored without it
    /// fall back to `bkt_max`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_ceiling: Option<f64>,
    /// Mean daily cost does not exceed the budget ceiling.
    pub within_budget: bool,
}

impl PlanStatistics {
    pub fn ceiling(&self) -> f64 {
        self.budget_ceiling.unwrap_or(self.bkt_max)
    }
}

pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn meal_entry(key: SlotKey, cost_form: &str, slot: &MealSlot<'_>) -> MealEntry {
    MealEntry {
        cost_form_id: Some(key.cost_form_id),
        cost_form: Some(cost_form.to_string()),
        options: slot
            .options()
            .iter()
            .map(|recipe| RecipeOption::from(*recipe))
            .collect(),
        selected_index: slot.selected_index(),
        is_user_modified: false,
    }
}

/// Lays the plan out day by day in configured menu line and cost form order.
pub fn format_plan(plan: &Plan<'_>, config: &PlanConfig) -> MenuPlanResult {
    let days = config
        .dates()
        .map(|date| DayPlan {
            date,
            day_of_week: date.format("%A").to_string(),
            total_cost: 0.0,
            menu_lines: config
                .menu_lines
                .iter()
                .map(|line| MenuLineDay {
                    menu_line_id: line.id,
                    name: line.name.clone(),
                    recipes: line
                        .cost_forms
                        .iter()
                        .filter_map(|form| {
                            let key = SlotKey::new(date, SlotType::new(line.id, form.id));
                            plan.get(&key)
                                .map(|slot| meal_entry(key, &form.name, slot))
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    let mut result = MenuPlanResult {
        days,
        statistics: PlanStatistics {
            total_days: 0,
            average_bkt: 0.0,
            total_cost: 0.0,
            bkt_target: config.bkt_target,
            bkt_min: round_currency(config.bkt_min()),
            bkt_max: round_currency(config.bkt_max()),
            budget_ceiling: Some(config.bkt_max()),
            within_budget: false,
        },
        warnings: Vec::new(),
        feasibility: None,
        optimization: None,
        seed: None,
    };
    result.refresh_totals();
    result
}

impl MenuPlanResult {
    /// Recomputes day totals and statistics from the selected options.
    pub fn refresh_totals(&mut self) {
        let mut total_cost = 0.0;
        for day in &mut self.days {
            let day_cost: f64 = day
                .menu_lines
                .iter()
                .flat_map(|line| line.recipes.iter())
                .map(MealEntry::cost)
                .sum();
            day.total_cost = round_currency(day_cost);
            total_cost += day_cost;
        }

        let total_days = self.days.len();
        let average = if total_days == 0 {
            0.0
        } else {
            total_cost / total_days as f64
        };

        let statistics = &mut self.statistics;
        statistics.total_days = total_days;
        statistics.average_bkt = round_currency(average);
        statistics.total_cost = round_currency(total_cost);
        statistics.within_budget = average <= statistics.ceiling();
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayPlan> {
        self.days.iter().find(|day| day.date == date)
    }

    pub fn meal_count(&self) -> usize {
        self.days
            .iter()
            .flat_map(|day| day.menu_lines.iter())
            .map(|line| line.recipes.len())
            .sum()
    }
}
