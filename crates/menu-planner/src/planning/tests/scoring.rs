use super::common::*;
use crate::catalog::RecipeId;
use crate::planning::construct::ConstructionState;
use crate::planning::domain::{CandidatePool, MealSlot, Plan, SlotKey, SlotType, UsageIndex};
use crate::planning::config::{CostFormId, MenuLineId};
use crate::planning::scoring::{
    budget_score, nutrition_score, score_candidate, seasonality_score, variety_score,
    ScoreBreakdown, ScoringContext,
};
use chrono::Duration;

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

#[test]
fn budget_score_follows_target_bands() {
    let config = lunch_config(7, 10.0);

    assert_eq!(budget_score(4.0, &config), 0.7);
    assert_eq!(budget_score(5.0, &config), 1.0);
    assert_eq!(budget_score(9.0, &config), 1.0);
    assert!(close(budget_score(9.5, &config), 0.5));
    assert!(close(budget_score(10.0, &config), 0.0));
    assert_eq!(budget_score(11.0, &config), 0.0, "between target and ceiling");
    assert_eq!(budget_score(11.6, &config), 0.0, "above ceiling");
}

#[test]
fn variety_penalizes_reuse_and_recent_lookalikes() {
    let first = recipe(1, LUNCH, 2.0);
    let twin = {
        let mut twin = recipe(2, LUNCH, 2.0);
        twin.group = first.group.clone();
        twin.category = first.category.clone();
        twin
    };
    let stranger = recipe(3, LUNCH, 2.0);

    let plan = Plan::new();
    let mut usage = UsageIndex::default();
    assert_eq!(variety_score(&first, monday(), &plan, &usage), 1.0);

    usage.record(first.id, monday());
    assert_eq!(variety_score(&first, monday(), &plan, &usage), 0.5);

    let mut plan = Plan::new();
    let key = SlotKey::new(monday(), SlotType::new(MenuLineId(1), CostFormId(1)));
    plan.insert(
        key,
        MealSlot::new(vec![&first], 0, CandidatePool::Preferred).expect("valid slot"),
    );
    let tomorrow = monday() + Duration::days(1);
    assert!(close(variety_score(&twin, tomorrow, &plan, &usage), 0.2));
    assert_eq!(variety_score(&stranger, tomorrow, &plan, &usage), 1.0);

    let next_week = monday() + Duration::days(8);
    assert_eq!(
        variety_score(&twin, next_week, &plan, &usage),
        1.0,
        "selections older than seven days are ignored"
    );
}

#[test]
fn seasonality_and_nutrition_scores() {
    let mut winter_soup = recipe(1, LUNCH, 2.0);
    winter_soup.seasonality = [12, 1, 2].into();
    winter_soup
        .nutrition
        .insert("calories".to_string(), 300.0);

    assert_eq!(seasonality_score(&winter_soup, monday(), true), 1.0);
    let july = monday() + Duration::days(180);
    assert_eq!(seasonality_score(&winter_soup, july, true), 0.0);
    assert_eq!(seasonality_score(&winter_soup, july, false), 0.5);

    assert_eq!(nutrition_score(&winter_soup), 0.5);
    assert_eq!(nutrition_score(&recipe(2, LUNCH, 2.0)), 1.0);
    winter_soup
        .nutrition
        .insert("calories".to_string(), 1500.0);
    assert_eq!(nutrition_score(&winter_soup), 0.0);
}

#[test]
fn breakdown_total_applies_weights() {
    let perfect = ScoreBreakdown {
        budget: 1.0,
        variety: 1.0,
        popularity: 1.0,
        seasonality: 1.0,
        nutrition: 1.0,
    };
    assert!(close(perfect.total(), 1.0));

    let budget_only = ScoreBreakdown {
        budget: 1.0,
        variety: 0.0,
        popularity: 0.0,
        seasonality: 0.0,
        nutrition: 0.0,
    };
    assert!(close(budget_only.total(), 0.35));
}

#[test]
fn candidate_score_uses_running_daily_cost() {
    let config = lunch_config(7, 4.0);
    let mut dish = recipe(1, LUNCH, 2.0);
    dish.popularity = 8;
    let plan = Plan::new();
    let mut state = ConstructionState::new();
    state.begin_day(monday());

    let context = ScoringContext {
        config: &config,
        plan: &plan,
        usage: &state.usage,
        running_daily_cost: 0.0,
    };
    let fresh = score_candidate(&dish, monday(), &context);
    assert_eq!(fresh.budget, 1.0);
    assert!(close(fresh.popularity, 0.8));
    assert_eq!(fresh.seasonality, 0.0);

    let crowded = ScoringContext {
        running_daily_cost: 3.0,
        ..context
    };
    let late = score_candidate(&dish, monday(), &crowded);
    assert_eq!(late.budget, 0.0, "5.00 exceeds the 4.60 ceiling");
    assert!(late.total() < fresh.total());
    assert_eq!(dish.id, RecipeId(1));
}
