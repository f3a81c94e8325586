use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};

use crate::catalog::{Recipe, RecipeCatalog, RecipeFlags, RecipeId, RecipeStatus};
use crate::planning::config::{
    CostForm, CostFormId, MenuLine, MenuLineId, PlanConfig, QualityExclusions, VarietyLimits,
};

pub(super) const LUNCH: &str = "Mittagessen";
pub(super) const DINNER: &str = "Abendessen";

pub(super) fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 6).expect("valid date")
}

pub(super) fn recipe(id: u64, component: &str, cost: f64) -> Recipe {
    Recipe {
        id: RecipeId(id),
        name: format!("Rezept {id}"),
        cost,
        allergens: BTreeSet::new(),
        dietary_forms: BTreeSet::from(["Vollkost".to_string()]),
        aversions: BTreeSet::new(),
        additives: Vec::new(),
        category: format!("Kategorie {id}"),
        group: format!("Gruppe {id}"),
        component: component.to_string(),
        seasonality: BTreeSet::new(),
        popularity: 5,
        nutrition: BTreeMap::new(),
        status: RecipeStatus::Released,
        enabled: true,
        flags: RecipeFlags::default(),
        description: String::new(),
        ingredients: Vec::new(),
    }
}

pub(super) fn meat(mut recipe: Recipe) -> Recipe {
    recipe.flags.contains_meat = true;
    recipe
}

pub(super) fn catalog(recipes: Vec<Recipe>) -> RecipeCatalog {
    RecipeCatalog::new(recipes).expect("fixture ids are unique")
}

pub(super) fn cost_form(id: u32, component: &str) -> CostForm {
    CostForm {
        id: CostFormId(id),
        name: component.to_string(),
        component: component.to_string(),
    }
}

pub(super) fn menu_line(id: u32, cost_forms: Vec<CostForm>) -> MenuLine {
    MenuLine {
        id: MenuLineId(id),
        name: format!("Linie {id}"),
        cost_forms,
    }
}

/// Single lunch slot per day over `days` days.
pub(super) fn lunch_config(days: i64, bkt_target: f64) -> PlanConfig {
    plan_config(days, bkt_target, vec![menu_line(1, vec![cost_form(1, LUNCH)])])
}

pub(super) fn plan_config(days: i64, bkt_target: f64, menu_lines: Vec<MenuLine>) -> PlanConfig {
    PlanConfig {
        start_date: monday(),
        end_date: monday() + Duration::days(days - 1),
        menu_lines,
        bkt_target,
        bkt_tolerance: 0.15,
        required_dietary_forms: BTreeSet::from(["Vollkost".to_string()]),
        excluded_allergens: BTreeSet::new(),
        excluded_aversions: BTreeSet::new(),
        repetition_interval: 7,
        recipe_options_count: 2,
        consider_seasonality: true,
        variety: VarietyLimits::default(),
        quality: QualityExclusions::default(),
        selected_recipe_groups: BTreeSet::new(),
        selected_aversions: BTreeSet::new(),
        optimizer_iterations: 200,
        seed: Some(7),
    }
}
