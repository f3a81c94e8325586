//! Recipe catalog: the single place recipe records cross the serde boundary.

mod parser;
mod recipe;

pub use parser::CsvRowError;
pub use recipe::{
    Ingredient, Recipe, RecipeFlags, RecipeId, RecipeStatus, REFERENCE_CALORIES,
};

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read recipe catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid recipe JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] CsvRowError),
    #[error("duplicate recipe id {0}")]
    DuplicateId(RecipeId),
    #[error("unsupported catalog format '{0}' (expected .json or .csv)")]
    UnsupportedFormat(String),
}

/// Immutable, pre-loaded recipe collection shared read-only by planning runs.
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
}

impl RecipeCatalog {
    pub fn new(recipes: Vec<Recipe>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(recipes.len());
        for recipe in &recipes {
            if !seen.insert(recipe.id) {
                return Err(CatalogError::DuplicateId(recipe.id));
            }
        }

        Ok(Self { recipes })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let catalog = match extension.as_str() {
            "json" => Self::from_json_reader(std::fs::File::open(path)?)?,
            "csv" => Self::from_csv_reader(std::fs::File::open(path)?)?,
            other => return Err(CatalogError::UnsupportedFormat(other.to_string())),
        };
        debug!(path = %path.display(), recipes = catalog.len(), "recipe catalog loaded");
        Ok(catalog)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let recipes: Vec<Recipe> = serde_json::from_reader(reader)?;
        Self::new(recipes)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let recipes = parser::parse_recipes(reader)?;
        Self::new(recipes)
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn get(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.id == id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const CATALOG_JSON: &str = r#"[
        {
            "id": 1,
            "name": "Haferflocken-Porridge",
            "cost": 1.80,
            "allergens": ["Gluten", "Milch"],
            "dietary_forms": ["Vollkost", "Vegetarisch"],
            "category": "Frühstück",
            "group": "Müsli",
            "menu_component": "Frühstück",
            "seasonality": [1, 2, 3],
            "popularity": 8,
            "nutritional_values": {"calories": 320, "protein": 12},
            "is_enabled": true,
            "status": "Freigegeben",
            "calculation_basis": 10,
            "processing_time": 0.5,
            "ingredients": [],
            "contains_raw_milk": true
        },
        {
            "id": 2,
            "name": "Obstsalat",
            "cost": 1.90,
            "menu_component": "Frühstück",
            "status": "draft"
        }
    ]"#;

    #[test]
    fn loads_original_export_shape() {
        let catalog =
            RecipeCatalog::from_json_reader(Cursor::new(CATALOG_JSON)).expect("json loads");
        assert_eq!(catalog.len(), 2);

        let porridge = catalog.get(RecipeId(1)).expect("porridge present");
        assert_eq!(porridge.component, "Frühstück");
        assert_eq!(porridge.calories(), 320.0);
        assert!(porridge.flags.contains_raw_milk);
        assert!(!porridge.flags.contains_meat);

        let salad = catalog.get(RecipeId(2)).expect("salad present");
        assert!(salad.enabled, "is_enabled defaults to true");
        assert_eq!(salad.status, RecipeStatus::Draft);
        assert!(salad.allergens.is_empty());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let json = r#"[
            {"id": 4, "name": "a", "cost": 1.0, "menu_component": "x", "status": "released"},
            {"id": 4, "name": "b", "cost": 2.0, "menu_component": "x", "status": "released"}
        ]"#;
        let err = RecipeCatalog::from_json_reader(Cursor::new(json)).expect_err("duplicate");
        assert!(matches!(err, CatalogError::DuplicateId(RecipeId(4))));
    }

    #[test]
    fn rejects_unknown_extensions() {
        let err = RecipeCatalog::from_path("recipes.xlsx").expect_err("unsupported");
        assert!(matches!(err, CatalogError::UnsupportedFormat(ref ext) if ext == "xlsx"));
    }
}
