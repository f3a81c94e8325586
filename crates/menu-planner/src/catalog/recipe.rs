use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Calorie value assumed when a recipe carries no nutrition data.
pub const REFERENCE_CALORIES: f64 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(pub u64);

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Release state of a recipe. Only released recipes are plannable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecipeStatus {
    Released,
    Draft,
    Other(String),
}

impl RecipeStatus {
    pub fn label(&self) -> &str {
        match self {
            Self::Released => "released",
            Self::Draft => "draft",
            Self::Other(label) => label,
        }
    }

    pub fn is_released(&self) -> bool {
        matches!(self, Self::Released)
    }
}

impl From<String> for RecipeStatus {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "released" | "freigegeben" => Self::Released,
            "draft" | "entwurf" => Self::Draft,
            _ => Self::Other(value),
        }
    }
}

impl From<RecipeStatus> for String {
    fn from(value: RecipeStatus) -> Self {
        value.label().to_string()
    }
}

/// Category and raw-ingredient markers used by variety and quality rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeFlags {
    #[serde(default)]
    pub contains_meat: bool,
    #[serde(default)]
    pub is_sweet: bool,
    #[serde(default)]
    pub is_fried: bool,
    #[serde(default)]
    pub is_whole_grain: bool,
    #[serde(default)]
    pub contains_raw_milk: bool,
    #[serde(default)]
    pub contains_raw_eggs: bool,
    #[serde(default)]
    pub contains_raw_sausage: bool,
    #[serde(default)]
    pub contains_raw_meat: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: u64,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// Canonical recipe record. Field names follow the catalog export format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    #[serde(alias = "cost_per_serving")]
    pub cost: f64,
    #[serde(default)]
    pub allergens: BTreeSet<String>,
    #[serde(default)]
    pub dietary_forms: BTreeSet<String>,
    #[serde(default)]
    pub aversions: BTreeSet<String>,
    #[serde(default)]
    pub additives: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub group: String,
    #[serde(rename = "menu_component", alias = "component")]
    pub component: String,
    #[serde(default)]
    pub seasonality: BTreeSet<u32>,
    #[serde(default)]
    pub popularity: u8,
    #[serde(default, rename = "nutritional_values", alias = "nutrition")]
    pub nutrition: BTreeMap<String, f64>,
    pub status: RecipeStatus,
    #[serde(default = "enabled_by_default", rename = "is_enabled", alias = "enabled")]
    pub enabled: bool,
    #[serde(flatten)]
    pub flags: RecipeFlags,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

fn enabled_by_default() -> bool {
    true
}

impl Recipe {
    pub fn calories(&self) -> f64 {
        self.nutrition
            .get("calories")
            .copied()
            .unwrap_or(REFERENCE_CALORIES)
    }

    pub fn is_in_season(&self, month: u32) -> bool {
        self.seasonality.contains(&month)
    }

    /// Similarity in `[0, 1]` used to discourage back-to-back lookalikes.
    pub fn similarity(&self, other: &Recipe) -> f64 {
        if self.id == other.id {
            return 1.0;
        }

        let mut similarity = 0.0;
        if self.group == other.group {
            similarity += 0.5;
        }
        if self.category == other.category {
            similarity += 0.3;
        }

        let union = self.allergens.union(&other.allergens).count();
        if union > 0 {
            let shared = self.allergens.intersection(&other.allergens).count();
            similarity += 0.2 * (shared as f64 / union as f64);
        }

        similarity.min(1.0)
    }
}
