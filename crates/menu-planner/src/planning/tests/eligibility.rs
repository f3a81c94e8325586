use super::common::*;
use crate::catalog::{RecipeId, RecipeStatus};
use crate::planning::config::{CostFormId, MenuLineId};
use crate::planning::domain::{PlanError, SlotType};
use crate::planning::eligibility::{rejection_reason, CandidateLists, Rejection};
use crate::planning::feasibility::{analyze, ensure_feasible};

#[test]
fn each_hard_constraint_rejects_on_its_own() {
    let mut config = lunch_config(7, 5.0);
    config.excluded_allergens.insert("Gluten".to_string());
    config.excluded_aversions.insert("Innereien".to_string());

    let mut draft = recipe(1, LUNCH, 2.0);
    draft.status = RecipeStatus::Draft;
    assert_eq!(rejection_reason(&draft, &config), Some(Rejection::NotReleased));

    let mut disabled = recipe(2, LUNCH, 2.0);
    disabled.enabled = false;
    assert_eq!(rejection_reason(&disabled, &config), Some(Rejection::Disabled));

    let mut gluten = recipe(3, LUNCH, 2.0);
    gluten.allergens.insert("Gluten".to_string());
    assert_eq!(
        rejection_reason(&gluten, &config),
        Some(Rejection::ExcludedAllergen)
    );

    let mut offal = recipe(4, LUNCH, 2.0);
    offal.aversions.insert("Innereien".to_string());
    assert_eq!(
        rejection_reason(&offal, &config),
        Some(Rejection::ExcludedAversion)
    );

    let mut vegan_only = recipe(5, LUNCH, 2.0);
    vegan_only.dietary_forms = ["Vegan".to_string()].into();
    assert_eq!(
        rejection_reason(&vegan_only, &config),
        Some(Rejection::NoRequiredDietaryForm)
    );

    let mut tiramisu = recipe(6, LUNCH, 2.0);
    tiramisu.flags.contains_raw_eggs = true;
    assert_eq!(
        rejection_reason(&tiramisu, &config),
        Some(Rejection::RawIngredient)
    );

    assert_eq!(rejection_reason(&recipe(7, LUNCH, 2.0), &config), None);
}

#[test]
fn disabled_quality_exclusion_admits_raw_ingredients() {
    let mut config = lunch_config(7, 5.0);
    config.quality.exclude_raw_eggs = false;

    let mut tiramisu = recipe(1, LUNCH, 2.0);
    tiramisu.flags.contains_raw_eggs = true;
    assert_eq!(rejection_reason(&tiramisu, &config), None);

    tiramisu.flags.contains_raw_milk = true;
    assert_eq!(
        rejection_reason(&tiramisu, &config),
        Some(Rejection::RawIngredient)
    );
}

#[test]
fn group_and_aversion_selections_narrow_the_catalog() {
    let mut config = lunch_config(7, 5.0);
    config.selected_recipe_groups.insert("Gruppe 1".to_string());
    config.selected_aversions.insert("Fisch".to_string());

    assert_eq!(rejection_reason(&recipe(1, LUNCH, 2.0), &config), None);
    assert_eq!(
        rejection_reason(&recipe(2, LUNCH, 2.0), &config),
        Some(Rejection::GroupNotSelected)
    );

    let mut fish = recipe(1, LUNCH, 2.0);
    fish.aversions.insert("Fisch".to_string());
    assert_eq!(
        rejection_reason(&fish, &config),
        Some(Rejection::SelectedAversion)
    );
}

#[test]
fn recipe_serves_every_slot_type_with_its_component() {
    let config = plan_config(
        7,
        10.0,
        vec![
            menu_line(1, vec![cost_form(1, LUNCH), cost_form(2, DINNER)]),
            menu_line(2, vec![cost_form(3, LUNCH)]),
        ],
    );
    let catalog = catalog(vec![recipe(1, LUNCH, 2.0), recipe(2, DINNER, 1.5)]);

    let lists = CandidateLists::build(&catalog, &config).expect("all slot types filled");

    assert_eq!(lists.len(), 3);
    for (line, form) in [(1, 1), (2, 3)] {
        let lunch = lists.get(SlotType::new(MenuLineId(line), CostFormId(form)));
        assert_eq!(lunch.len(), 1);
        assert_eq!(lunch[0].id, RecipeId(1));
    }
    let dinner = lists.get(SlotType::new(MenuLineId(1), CostFormId(2)));
    assert_eq!(dinner[0].id, RecipeId(2));
}

#[test]
fn empty_slot_type_is_reported_by_name() {
    let config = plan_config(
        7,
        10.0,
        vec![menu_line(1, vec![cost_form(1, LUNCH), cost_form(2, DINNER)])],
    );
    let catalog = catalog(vec![recipe(1, LUNCH, 2.0)]);

    let err = CandidateLists::build(&catalog, &config).expect_err("dinner has no recipes");

    match err {
        PlanError::NoEligibleRecipes {
            menu_line_id,
            cost_form_id,
            ref cost_form,
            ..
        } => {
            assert_eq!(menu_line_id, MenuLineId(1));
            assert_eq!(cost_form_id, CostFormId(2));
            assert_eq!(cost_form, DINNER);
        }
        other => panic!("expected NoEligibleRecipes, got {other:?}"),
    }
}

#[test]
fn empty_dietary_requirement_admits_nothing() {
    let mut config = lunch_config(3, 5.0);
    config.required_dietary_forms.clear();
    let catalog = catalog(vec![recipe(1, LUNCH, 2.0)]);

    let err = CandidateLists::build(&catalog, &config).expect_err("no recipe qualifies");
    assert!(matches!(err, PlanError::NoEligibleRecipes { .. }));
}

#[test]
fn feasibility_sums_cheapest_and_dearest_per_slot() {
    let config = plan_config(
        7,
        4.0,
        vec![menu_line(1, vec![cost_form(1, LUNCH), cost_form(2, DINNER)])],
    );
    let catalog = catalog(vec![
        recipe(1, LUNCH, 2.0),
        recipe(2, LUNCH, 3.5),
        recipe(3, DINNER, 1.0),
        recipe(4, DINNER, 1.25),
    ]);
    let lists = CandidateLists::build(&catalog, &config).expect("lists build");

    let analysis = analyze(&lists, &config);
    assert!(analysis.feasible);
    assert!((analysis.min_daily_cost - 3.0).abs() < 1e-9);
    assert!((analysis.max_daily_cost - 4.75).abs() < 1e-9);
}

#[test]
fn budget_below_cheapest_day_is_infeasible() {
    let config = lunch_config(5, 1.0);
    let catalog = catalog(vec![recipe(1, LUNCH, 2.0)]);
    let lists = CandidateLists::build(&catalog, &config).expect("lists build");

    let err = ensure_feasible(&lists, &config).expect_err("2.00 exceeds 1.15");
    match err {
        PlanError::BudgetInfeasible {
            min_achievable,
            max_achievable,
            target,
        } => {
            assert_eq!(min_achievable, 2.0);
            assert_eq!(max_achievable, 2.0);
            assert_eq!(target, 1.0);
        }
        other => panic!("expected BudgetInfeasible, got {other:?}"),
    }
}
