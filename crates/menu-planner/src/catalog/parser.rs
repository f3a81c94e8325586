use super::recipe::{Recipe, RecipeFlags, RecipeId, RecipeStatus};
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

/// Separator for multi-valued CSV columns (allergens, months, ...).
const LIST_SEPARATOR: char = ';';

#[derive(Debug, thiserror::Error)]
pub enum CsvRowError {
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row for recipe {id}: invalid month '{value}' in seasonality")]
    InvalidMonth { id: u64, value: String },
    #[error("row for recipe {id}: unrecognized value '{value}' in column {column}")]
    InvalidFlag {
        id: u64,
        column: &'static str,
        value: String,
    },
}

pub(crate) fn parse_recipes<R: Read>(reader: R) -> Result<Vec<Recipe>, CsvRowError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut recipes = Vec::new();

    for record in csv_reader.deserialize::<RecipeRow>() {
        let row = record?;
        recipes.push(row.into_recipe()?);
    }

    Ok(recipes)
}

#[derive(Debug, Deserialize)]
struct RecipeRow {
    id: u64,
    name: String,
    cost: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    allergens: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    dietary_forms: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    aversions: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    additives: Option<String>,
    #[serde(default)]
    category: String,
    #[serde(default)]
    group: String,
    #[serde(alias = "component")]
    menu_component: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    seasonality: Option<String>,
    #[serde(default)]
    popularity: u8,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    calories: Option<String>,
    status: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    is_enabled: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    contains_meat: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    is_sweet: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    is_fried: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    is_whole_grain: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    contains_raw_milk: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    contains_raw_eggs: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    contains_raw_sausage: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    contains_raw_meat: Option<String>,
    #[serde(default)]
    description: String,
}

impl RecipeRow {
    fn into_recipe(self) -> Result<Recipe, CsvRowError> {
        let mut seasonality = BTreeSet::new();
        for value in split_list(self.seasonality.as_deref()) {
            let month = value
                .parse::<u32>()
                .ok()
                .filter(|month| (1..=12).contains(month))
                .ok_or_else(|| CsvRowError::InvalidMonth {
                    id: self.id,
                    value: value.clone(),
                })?;
            seasonality.insert(month);
        }

        let mut nutrition = BTreeMap::new();
        if let Some(calories) = self
            .calories
            .as_deref()
            .and_then(|raw| raw.parse::<f64>().ok())
        {
            nutrition.insert("calories".to_string(), calories);
        }

        let id = self.id;
        let flag = |column: &'static str, raw: Option<&str>| parse_flag(id, column, raw, false);
        let flags = RecipeFlags {
            contains_meat: flag("contains_meat", self.contains_meat.as_deref())?,
            is_sweet: flag("is_sweet", self.is_sweet.as_deref())?,
            is_fried: flag("is_fried", self.is_fried.as_deref())?,
            is_whole_grain: flag("is_whole_grain", self.is_whole_grain.as_deref())?,
            contains_raw_milk: flag("contains_raw_milk", self.contains_raw_milk.as_deref())?,
            contains_raw_eggs: flag("contains_raw_eggs", self.contains_raw_eggs.as_deref())?,
            contains_raw_sausage: flag(
                "contains_raw_sausage",
                self.contains_raw_sausage.as_deref(),
            )?,
            contains_raw_meat: flag("contains_raw_meat", self.contains_raw_meat.as_deref())?,
        };
        let enabled = parse_flag(id, "is_enabled", self.is_enabled.as_deref(), true)?;

        Ok(Recipe {
            id: RecipeId(self.id),
            name: self.name,
            cost: self.cost,
            allergens: split_list(self.allergens.as_deref()).collect(),
            dietary_forms: split_list(self.dietary_forms.as_deref()).collect(),
            aversions: split_list(self.aversions.as_deref()).collect(),
            additives: split_list(self.additives.as_deref()).collect(),
            category: self.category,
            group: self.group,
            component: self.menu_component,
            seasonality,
            popularity: self.popularity.min(10),
            nutrition,
            status: RecipeStatus::from(self.status),
            enabled,
            flags,
            description: self.description,
            ingredients: Vec::new(),
        })
    }
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = String> + '_ {
    raw.unwrap_or_default()
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Blank cells take `default`; anything unrecognized fails the row.
fn parse_flag(
    id: u64,
    column: &'static str,
    raw: Option<&str>,
    default: bool,
) -> Result<bool, CsvRowError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "ja" | "x" => Ok(true),
        "false" | "0" | "no" | "n" | "nein" => Ok(false),
        _ => Err(CsvRowError::InvalidFlag {
            id,
            column,
            value: raw.to_string(),
        }),
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "id,name,cost,allergens,dietary_forms,menu_component,seasonality,status,contains_meat,is_enabled";

    #[test]
    fn parses_list_columns_and_flags() {
        let csv = format!(
            "{HEADER}\n7,Gulasch,3.20,Sellerie;Senf,Vollkost,Mittagessen,1;2;12,Freigegeben,ja,\n"
        );
        let recipes = parse_recipes(Cursor::new(csv)).expect("csv parses");
        assert_eq!(recipes.len(), 1);

        let recipe = &recipes[0];
        assert_eq!(recipe.id, RecipeId(7));
        assert!(recipe.allergens.contains("Sellerie"));
        assert!(recipe.allergens.contains("Senf"));
        assert_eq!(recipe.seasonality, BTreeSet::from([1, 2, 12]));
        assert!(recipe.flags.contains_meat);
        assert!(recipe.enabled, "blank is_enabled defaults to enabled");
        assert!(recipe.status.is_released());
    }

    #[test]
    fn rejects_out_of_range_months() {
        let csv = format!("{HEADER}\n8,Salat,1.10,,Vegan,Abendessen,13,released,,\n");
        let err = parse_recipes(Cursor::new(csv)).expect_err("month 13 is invalid");
        assert!(matches!(err, CsvRowError::InvalidMonth { id: 8, .. }));
    }

    #[test]
    fn rejects_unrecognized_flag_values() {
        let csv = "id,name,cost,dietary_forms,menu_component,status,contains_raw_eggs\n\
1,Tiramisu,2.0,Vollkost,Dessert,Freigegeben,wahr\n";
        let err = parse_recipes(Cursor::new(csv)).expect_err("'wahr' is not a known flag");
        assert!(matches!(
            err,
            CsvRowError::InvalidFlag {
                id: 1,
                column: "contains_raw_eggs",
                ref value,
            } if value == "wahr"
        ));
    }

    #[test]
    fn blank_raw_flags_default_to_absent() {
        let csv = "id,name,cost,dietary_forms,menu_component,status,contains_raw_eggs\n\
2,Pudding,1.0,Vollkost,Dessert,Freigegeben,\n";
        let recipes = parse_recipes(Cursor::new(csv)).expect("blank flag parses");
        assert!(!recipes[0].flags.contains_raw_eggs);
    }
}
