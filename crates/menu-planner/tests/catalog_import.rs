use chrono::NaiveDate;
use menu_planner::catalog::{CatalogError, RecipeCatalog, RecipeId, RecipeStatus};
use menu_planner::planning::{MenuPlanner, PlanConfig};

const CSV: &str = include_str!("fixtures/recipes.csv");

#[test]
fn csv_export_maps_lists_flags_and_status() {
    let catalog = RecipeCatalog::from_csv_reader(CSV.as_bytes()).expect("csv imports");
    assert_eq!(catalog.len(), 8);

    let roulade = catalog.get(RecipeId(21)).expect("roulade present");
    assert_eq!(roulade.allergens.len(), 2);
    assert!(roulade.flags.contains_meat);
    assert!(roulade.is_in_season(12));
    assert!(!roulade.is_in_season(6));
    assert_eq!(roulade.calories(), 690.0);

    let mousse = catalog.get(RecipeId(27)).expect("mousse present");
    assert!(mousse.flags.is_sweet);
    assert!(mousse.flags.contains_raw_eggs);

    let bratwurst = catalog.get(RecipeId(28)).expect("bratwurst present");
    assert_eq!(bratwurst.status, RecipeStatus::Draft);
    assert!(bratwurst.flags.is_fried);
}

#[test]
fn csv_catalog_drives_a_plan() {
    let catalog = RecipeCatalog::from_csv_reader(CSV.as_bytes()).expect("csv imports");
    let start = NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid date");
    let mut config = PlanConfig::example(start);
    config.end_date = NaiveDate::from_ymd_opt(2025, 9, 5).expect("valid date");
    config.seed = Some(5);

    let result = MenuPlanner::new(&catalog)
        .generate(&config)
        .expect("plan generated");

    assert_eq!(result.meal_count(), 5 * 3);
    let served: Vec<RecipeId> = result
        .recipe_usage()
        .into_iter()
        .map(|usage| usage.recipe_id)
        .collect();
    assert!(!served.contains(&RecipeId(22)), "gluten is excluded");
    assert!(!served.contains(&RecipeId(27)), "raw eggs are excluded");
    assert!(!served.contains(&RecipeId(28)), "drafts are excluded");
}

#[test]
fn duplicate_ids_across_rows_are_rejected() {
    let csv = format!("{CSV}21,Doppelt,1.00,,Vollkost,,,,Mittagessen,,5,,Freigegeben,,,,,\n");
    let err = RecipeCatalog::from_csv_reader(csv.as_bytes()).expect_err("duplicate id");
    assert!(matches!(err, CatalogError::DuplicateId(RecipeId(21))));
}

#[test]
fn missing_file_surfaces_io_error() {
    let err = RecipeCatalog::from_path("does/not/exist.json").expect_err("missing file");
    assert!(matches!(err, CatalogError::Io(_)));
}
