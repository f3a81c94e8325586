use super::config::{CostFormId, MenuLineId};
use super::format::{MealEntry, MenuPlanResult};
use crate::catalog::RecipeId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("plan has no day {0}")]
    UnknownDate(NaiveDate),
    #[error("menu line {menu_line_id} is not planned on {date}")]
    UnknownMenuLine {
        date: NaiveDate,
        menu_line_id: MenuLineId,
    },
    #[error("cost form {cost_form_id} is not planned for menu line {menu_line_id} on {date}")]
    UnknownMeal {
        date: NaiveDate,
        menu_line_id: MenuLineId,
        cost_form_id: CostFormId,
    },
    #[error(
        "menu line {menu_line_id} on {date} holds meals stored without a cost form id; \
         regenerate the plan to select them"
    )]
    UnaddressedMeals {
        date: NaiveDate,
        menu_line_id: MenuLineId,
    },
    #[error("option index {index} out of range ({available} options available)")]
    IndexOutOfRange { index: usize, available: usize },
}

/// How often a recipe is the selected option across a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeUsage {
    pub recipe_id: RecipeId,
    pub recipe_name: String,
    pub count: usize,
}

impl MenuPlanResult {
    /// Switches the chosen option of one meal, marks it user-modified and
    /// recomputes day totals and statistics.
    pub fn select_option(
        &mut self,
        date: NaiveDate,
        menu_line_id: MenuLineId,
        cost_form_id: CostFormId,
        index: usize,
    ) -> Result<&MealEntry, SelectionError> {
        let entry = self.meal_mut(date, menu_line_id, cost_form_id)?;
        if index >= entry.options.len() {
            return Err(SelectionError::IndexOutOfRange {
                index,
                available: entry.options.len(),
            });
        }

        let previous = entry.selected_index;
        entry.selected_index = index;
        entry.is_user_modified = true;
        info!(
            %date,
            menu_line = %menu_line_id,
            cost_form = %cost_form_id,
            previous,
            selected = index,
            "meal option switched"
        );

        self.refresh_totals();
        self.meal(date, menu_line_id, cost_form_id)
    }

    pub fn meal(
        &self,
        date: NaiveDate,
        menu_line_id: MenuLineId,
        cost_form_id: CostFormId,
    ) -> Result<&MealEntry, SelectionError> {
        let day = self.day(date).ok_or(SelectionError::UnknownDate(date))?;
        let line = day
            .menu_lines
            .iter()
            .find(|line| line.menu_line_id == menu_line_id)
            .ok_or(SelectionError::UnknownMenuLine { date, menu_line_id })?;
        let position = meal_position(&line.recipes, date, menu_line_id, cost_form_id)?;
        Ok(&line.recipes[position])
    }

    fn meal_mut(
        &mut self,
        date: NaiveDate,
        menu_line_id: MenuLineId,
        cost_form_id: CostFormId,
    ) -> Result<&mut MealEntry, SelectionError> {
        let day = self
            .days
            .iter_mut()
            .find(|day| day.date == date)
            .ok_or(SelectionError::UnknownDate(date))?;
        let line = day
            .menu_lines
            .iter_mut()
            .find(|line| line.menu_line_id == menu_line_id)
            .ok_or(SelectionError::UnknownMenuLine { date, menu_line_id })?;
        let position = meal_position(&line.recipes, date, menu_line_id, cost_form_id)?;
        Ok(&mut line.recipes[position])
    }

    /// Selected-recipe counts, most used first.
    pub fn recipe_usage(&self) -> Vec<RecipeUsage> {
        let mut usage: BTreeMap<RecipeId, RecipeUsage> = BTreeMap::new();
        for entry in self
            .days
            .iter()
            .flat_map(|day| day.menu_lines.iter())
            .flat_map(|line| line.recipes.iter())
        {
            let Some(option) = entry.selected() else {
                continue;
            };
            usage
                .entry(option.recipe_id)
                .or_insert_with(|| RecipeUsage {
                    recipe_id: option.recipe_id,
                    recipe_name: option.recipe_name.clone(),
                    count: 0,
                })
                .count += 1;
        }

        let mut usage: Vec<RecipeUsage> = usage.into_values().collect();
        usage.sort_by(|left, right| right.count.cmp(&left.count));
        usage
    }
}

fn meal_position(
    entries: &[MealEntry],
    date: NaiveDate,
    menu_line_id: MenuLineId,
    cost_form_id: CostFormId,
) -> Result<usize, SelectionError> {
    if let Some(position) = entries
        .iter()
        .position(|entry| entry.cost_form_id == Some(cost_form_id))
    {
        return Ok(position);
    }
    if entries.iter().any(|entry| entry.cost_form_id.is_none()) {
        return Err(SelectionError::UnaddressedMeals { date, menu_line_id });
    }
    Err(SelectionError::UnknownMeal {
        date,
        menu_line_id,
        cost_form_id,
    })
}
