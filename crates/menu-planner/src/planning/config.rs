use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Category caps at or above this value are treated as "no limit".
pub const PERMISSIVE_CATEGORY_LIMIT: u32 = 999;
/// Minimum repetition distances at or above this value are treated as "no limit".
pub const PERMISSIVE_REPETITION_DAYS: u32 = 21;
/// How far a category counter may run past its cap before candidates are rejected.
pub const SOFT_OVERFLOW_ALLOWANCE: u32 = 2;

pub const DEFAULT_BKT_TOLERANCE: f64 = 0.15;
pub const DEFAULT_REPETITION_INTERVAL: u32 = 7;
pub const DEFAULT_RECIPE_OPTIONS: usize = 2;
pub const DEFAULT_OPTIMIZER_ITERATIONS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuLineId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostFormId(pub u32);

impl fmt::Display for MenuLineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CostFormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A menu line's sub-component tied to one meal component (e.g. lunch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostForm {
    pub id: CostFormId,
    pub name: String,
    pub component: String,
}

/// A parallel dietary track (e.g. standard vs. vegetarian).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuLine {
    pub id: MenuLineId,
    pub name: String,
    pub cost_forms: Vec<CostForm>,
}

/// Frequency caps for meat/sweet/fried selections plus an optional minimum
/// distance between two selections of the same recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VarietyLimits {
    #[serde(alias = "maxMeat")]
    pub max_meat: u32,
    #[serde(alias = "maxSweet")]
    pub max_sweet: u32,
    #[serde(alias = "maxFried")]
    pub max_fried: u32,
    #[serde(alias = "minRepetition", skip_serializing_if = "Option::is_none")]
    pub min_repetition: Option<u32>,
}

impl Default for VarietyLimits {
    fn default() -> Self {
        Self {
            max_meat: PERMISSIVE_CATEGORY_LIMIT,
            max_sweet: PERMISSIVE_CATEGORY_LIMIT,
            max_fried: PERMISSIVE_CATEGORY_LIMIT,
            min_repetition: None,
        }
    }
}

impl VarietyLimits {
    pub fn has_frequency_limits(&self) -> bool {
        self.max_meat < PERMISSIVE_CATEGORY_LIMIT
            || self.max_sweet < PERMISSIVE_CATEGORY_LIMIT
            || self.max_fried < PERMISSIVE_CATEGORY_LIMIT
    }

    pub fn has_repetition_limit(&self) -> bool {
        self.min_repetition
            .is_some_and(|days| days < PERMISSIVE_REPETITION_DAYS)
    }

    /// Distance used when partitioning candidates during construction.
    pub fn repetition_distance(&self, repetition_interval: u32) -> u32 {
        self.min_repetition.unwrap_or(repetition_interval)
    }
}

/// Raw-ingredient exclusions. Every flag defaults to excluding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityExclusions {
    #[serde(alias = "excludeRawMilk")]
    pub exclude_raw_milk: bool,
    #[serde(alias = "excludeRawEggs")]
    pub exclude_raw_eggs: bool,
    #[serde(alias = "excludeRawSausage")]
    pub exclude_raw_sausage: bool,
    #[serde(alias = "excludeRawMeat")]
    pub exclude_raw_meat: bool,
}

impl Default for QualityExclusions {
    fn default() -> Self {
        Self {
            exclude_raw_milk: true,
            exclude_raw_eggs: true,
            exclude_raw_sausage: true,
            exclude_raw_meat: true,
        }
    }
}

/// Everything a single plan generation run needs besides the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub menu_lines: Vec<MenuLine>,
    pub bkt_target: f64,
    #[serde(default = "default_tolerance")]
    pub bkt_tolerance: f64,
    #[serde(default, rename = "dietary_forms", alias = "required_dietary_forms")]
    pub required_dietary_forms: BTreeSet<String>,
    #[serde(default)]
    pub excluded_allergens: BTreeSet<String>,
    #[serde(default)]
    pub excluded_aversions: BTreeSet<String>,
    #[serde(default = "default_repetition_interval")]
    pub repetition_interval: u32,
    #[serde(default = "default_options_count")]
    pub recipe_options_count: usize,
    #[serde(default = "default_true")]
    pub consider_seasonality: bool,
    #[serde(default)]
    pub variety: VarietyLimits,
    #[serde(default)]
    pub quality: QualityExclusions,
    #[serde(default)]
    pub selected_recipe_groups: BTreeSet<String>,
    #[serde(default)]
    pub selected_aversions: BTreeSet<String>,
    #[serde(default = "default_iterations")]
    pub optimizer_iterations: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_tolerance() -> f64 {
    DEFAULT_BKT_TOLERANCE
}

fn default_repetition_interval() -> u32 {
    DEFAULT_REPETITION_INTERVAL
}

fn default_options_count() -> usize {
    DEFAULT_RECIPE_OPTIONS
}

fn default_true() -> bool {
    true
}

fn default_iterations() -> usize {
    DEFAULT_OPTIMIZER_ITERATIONS
}

impl PlanConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigurationError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.end_date < self.start_date {
            return Err(ConfigurationError::EmptyDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }

        if self.menu_lines.is_empty() {
            return Err(ConfigurationError::NoMenuLines);
        }

        let mut seen = HashSet::new();
        for line in &self.menu_lines {
            if line.cost_forms.is_empty() {
                return Err(ConfigurationError::NoCostForms {
                    menu_line: line.name.clone(),
                });
            }
            for form in &line.cost_forms {
                if !seen.insert((line.id, form.id)) {
                    return Err(ConfigurationError::DuplicateSlotType {
                        menu_line_id: line.id,
                        cost_form_id: form.id,
                    });
                }
            }
        }

        if !(self.bkt_target.is_finite() && self.bkt_target > 0.0) {
            return Err(ConfigurationError::InvalidBudgetTarget(self.bkt_target));
        }

        if !(0.0..1.0).contains(&self.bkt_tolerance) {
            return Err(ConfigurationError::InvalidTolerance(self.bkt_tolerance));
        }

        if self.recipe_options_count == 0 {
            return Err(ConfigurationError::InvalidOptionsCount);
        }

        Ok(())
    }

    pub fn bkt_min(&self) -> f64 {
        self.bkt_target * (1.0 - self.bkt_tolerance)
    }

    pub fn bkt_max(&self) -> f64 {
        self.bkt_target * (1.0 + self.bkt_tolerance)
    }

    /// Every date of the plan, inclusive of both ends.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |date| *date <= self.end_date)
    }

    pub fn day_count(&self) -> usize {
        ((self.end_date - self.start_date).num_days() + 1).max(0) as usize
    }

    /// Menu line / cost form pairs in configuration order.
    pub fn slot_types(&self) -> impl Iterator<Item = (&MenuLine, &CostForm)> + '_ {
        self.menu_lines
            .iter()
            .flat_map(|line| line.cost_forms.iter().map(move |form| (line, form)))
    }

    pub fn total_cost_forms(&self) -> usize {
        self.menu_lines.iter().map(|line| line.cost_forms.len()).sum()
    }

    pub fn expected_slots(&self) -> usize {
        self.day_count() * self.total_cost_forms()
    }

    /// Two-week sample configuration with a full-fare and a vegetarian line.
    pub fn example(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date: start_date + Duration::days(13),
            menu_lines: vec![
                MenuLine {
                    id: MenuLineId(1),
                    name: "Vollkost".to_string(),
                    cost_forms: vec![
                        CostForm {
                            id: CostFormId(1),
                            name: "Mittagessen".to_string(),
                            component: "Mittagessen".to_string(),
                        },
                        CostForm {
                            id: CostFormId(2),
                            name: "Abendessen".to_string(),
                            component: "Abendessen".to_string(),
                        },
                    ],
                },
                MenuLine {
                    id: MenuLineId(2),
                    name: "Vegetarisch".to_string(),
                    cost_forms: vec![CostForm {
                        id: CostFormId(3),
                        name: "Mittagessen".to_string(),
                        component: "Mittagessen".to_string(),
                    }],
                },
            ],
            bkt_target: 8.0,
            bkt_tolerance: DEFAULT_BKT_TOLERANCE,
            required_dietary_forms: ["Vollkost", "Vegetarisch"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            excluded_allergens: BTreeSet::from(["Gluten".to_string()]),
            excluded_aversions: BTreeSet::new(),
            repetition_interval: DEFAULT_REPETITION_INTERVAL,
            recipe_options_count: DEFAULT_RECIPE_OPTIONS,
            consider_seasonality: true,
            variety: VarietyLimits::default(),
            quality: QualityExclusions::default(),
            selected_recipe_groups: BTreeSet::new(),
            selected_aversions: BTreeSet::new(),
            optimizer_iterations: DEFAULT_OPTIMIZER_ITERATIONS,
            seed: None,
        }
    }
}

/// Malformed or missing configuration, raised before any plan exists.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("malformed plan configuration: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("end date {end} precedes start date {start}")]
    EmptyDateRange { start: NaiveDate, end: NaiveDate },
    #[error("at least one menu line is required")]
    NoMenuLines,
    #[error("menu line '{menu_line}' has no cost forms")]
    NoCostForms { menu_line: String },
    #[error("cost form {cost_form_id} appears twice in menu line {menu_line_id}")]
    DuplicateSlotType {
        menu_line_id: MenuLineId,
        cost_form_id: CostFormId,
    },
    #[error("bkt_target must be a positive amount (got {0})")]
    InvalidBudgetTarget(f64),
    #[error("bkt_tolerance must lie in [0, 1) (got {0})")]
    InvalidTolerance(f64),
    #[error("recipe_options_count must be at least 1")]
    InvalidOptionsCount,
}
