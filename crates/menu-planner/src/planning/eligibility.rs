use super::config::PlanConfig;
use super::domain::{PlanError, SlotType};
use crate::catalog::{Recipe, RecipeCatalog};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// First hard constraint a recipe failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rejection {
    NotReleased,
    Disabled,
    ExcludedAllergen,
    ExcludedAversion,
    NoRequiredDietaryForm,
    RawIngredient,
    GroupNotSelected,
    SelectedAversion,
}

/// Returns the first hard constraint `recipe` violates under `config`.
pub fn rejection_reason(recipe: &Recipe, config: &PlanConfig) -> Option<Rejection> {
    if !recipe.status.is_released() {
        return Some(Rejection::NotReleased);
    }
    if !recipe.enabled {
        return Some(Rejection::Disabled);
    }
    if intersects(&recipe.allergens, &config.excluded_allergens) {
        return Some(Rejection::ExcludedAllergen);
    }
    if intersects(&recipe.aversions, &config.excluded_aversions) {
        return Some(Rejection::ExcludedAversion);
    }
    if !intersects(&recipe.dietary_forms, &config.required_dietary_forms) {
        return Some(Rejection::NoRequiredDietaryForm);
    }

    let quality = &config.quality;
    let flags = &recipe.flags;
    if (quality.exclude_raw_milk && flags.contains_raw_milk)
        || (quality.exclude_raw_eggs && flags.contains_raw_eggs)
        || (quality.exclude_raw_sausage && flags.contains_raw_sausage)
        || (quality.exclude_raw_meat && flags.contains_raw_meat)
    {
        return Some(Rejection::RawIngredient);
    }

    if !config.selected_recipe_groups.is_empty()
        && !config.selected_recipe_groups.contains(&recipe.group)
    {
        return Some(Rejection::GroupNotSelected);
    }
    if intersects(&recipe.aversions, &config.selected_aversions) {
        return Some(Rejection::SelectedAversion);
    }

    None
}

fn intersects(left: &BTreeSet<String>, right: &BTreeSet<String>) -> bool {
    !left.is_disjoint(right)
}

/// Eligible recipes per slot type, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct CandidateLists<'c> {
    lists: BTreeMap<SlotType, Vec<&'c Recipe>>,
}

impl<'c> CandidateLists<'c> {
    /// Applies the hard filters and registers survivors under every slot type
    /// whose cost form shares the recipe's component.
    pub fn build(catalog: &'c RecipeCatalog, config: &PlanConfig) -> Result<Self, PlanError> {
        let mut rejected: BTreeMap<Rejection, usize> = BTreeMap::new();
        let eligible: Vec<&'c Recipe> = catalog
            .recipes()
            .iter()
            .filter(|recipe| match rejection_reason(recipe, config) {
                Some(reason) => {
                    *rejected.entry(reason).or_default() += 1;
                    false
                }
                None => true,
            })
            .collect();

        debug!(
            catalog = catalog.len(),
            eligible = eligible.len(),
            rejected = ?rejected,
            "eligibility filter applied"
        );

        let mut lists = BTreeMap::new();
        for (line, form) in config.slot_types() {
            let candidates: Vec<&'c Recipe> = eligible
                .iter()
                .copied()
                .filter(|recipe| recipe.component == form.component)
                .collect();

            if candidates.is_empty() {
                return Err(PlanError::NoEligibleRecipes {
                    menu_line_id: line.id,
                    menu_line: line.name.clone(),
                    cost_form_id: form.id,
                    cost_form: form.name.clone(),
                });
            }

            debug!(
                menu_line = %line.name,
                cost_form = %form.name,
                candidates = candidates.len(),
                "slot type registered"
            );
            lists.insert(SlotType::new(line.id, form.id), candidates);
        }

        Ok(Self { lists })
    }

    pub fn get(&self, slot_type: SlotType) -> &[&'c Recipe] {
        self.lists
            .get(&slot_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SlotType, &Vec<&'c Recipe>)> {
        self.lists.iter()
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}
