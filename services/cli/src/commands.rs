use crate::infra::{emit_json, parse_date, read_json};
use chrono::{Local, NaiveDate};
use clap::Args;
use menu_planner::catalog::RecipeCatalog;
use menu_planner::config::PlannerConfig;
use menu_planner::error::AppError;
use menu_planner::planning::{
    CostFormId, MenuLineId, MenuPlanResult, MenuPlanner, PlanConfig,
};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct GenerateArgs {
    /// Recipe catalog (.json or .csv)
    #[arg(long)]
    pub(crate) catalog: PathBuf,
    /// Plan configuration (JSON)
    #[arg(long)]
    pub(crate) config: PathBuf,
    /// Seed for the local search; overrides APP_PLANNER_SEED and the config file
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Local search iterations; overrides APP_PLANNER_ITERATIONS and the config file
    #[arg(long)]
    pub(crate) iterations: Option<usize>,
    /// Write the plan JSON here and print a summary instead
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct SelectArgs {
    /// Previously generated plan (JSON)
    #[arg(long)]
    pub(crate) plan: PathBuf,
    /// Day of the meal (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: NaiveDate,
    #[arg(long)]
    pub(crate) menu_line: u32,
    #[arg(long)]
    pub(crate) cost_form: u32,
    /// Zero-based option index to select
    #[arg(long)]
    pub(crate) index: usize,
    /// Write the updated plan here instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct UsageArgs {
    /// Previously generated plan (JSON)
    #[arg(long)]
    pub(crate) plan: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ExampleConfigArgs {
    /// First day of the example plan (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) start: Option<NaiveDate>,
}

/// Layers overrides onto the plan configuration: flag, then environment,
/// then whatever the file already holds.
pub(crate) fn apply_overrides(
    config: &mut PlanConfig,
    seed: Option<u64>,
    iterations: Option<usize>,
    planner: &PlannerConfig,
) {
    if let Some(seed) = seed.or(planner.seed) {
        config.seed = Some(seed);
    }
    if let Some(iterations) = iterations.or(planner.optimizer_iterations) {
        config.optimizer_iterations = iterations;
    }
}

pub(crate) fn run_generate(args: GenerateArgs, planner: &PlannerConfig) -> Result<(), AppError> {
    let GenerateArgs {
        catalog,
        config,
        seed,
        iterations,
        output,
    } = args;

    let recipes = RecipeCatalog::from_path(&catalog)?;
    let mut plan_config = PlanConfig::from_json_str(&fs::read_to_string(&config)?)?;
    apply_overrides(&mut plan_config, seed, iterations, planner);
    info!(
        catalog = %catalog.display(),
        recipes = recipes.len(),
        "planning from catalog"
    );

    let result = MenuPlanner::new(&recipes).generate(&plan_config)?;

    match output {
        Some(path) => {
            emit_json(&result, Some(&path))?;
            render_summary(&result);
            println!("\nPlan written to {}", path.display());
        }
        None => emit_json(&result, None)?,
    }
    Ok(())
}

pub(crate) fn run_select(args: SelectArgs) -> Result<(), AppError> {
    let SelectArgs {
        plan,
        date,
        menu_line,
        cost_form,
        index,
        output,
    } = args;

    let mut result: MenuPlanResult = read_json(&plan)?;
    let entry = result.select_option(date, MenuLineId(menu_line), CostFormId(cost_form), index)?;
    let chosen = entry
        .selected()
        .map(|option| option.recipe_name.clone())
        .unwrap_or_default();

    match output {
        Some(path) => {
            emit_json(&result, Some(&path))?;
            println!("{date}: menu line {menu_line} / cost form {cost_form} now serves {chosen}");
            render_statistics(&result);
        }
        None => emit_json(&result, None)?,
    }
    Ok(())
}

pub(crate) fn run_usage(args: UsageArgs) -> Result<(), AppError> {
    let result: MenuPlanResult = read_json(&args.plan)?;
    let usage = result.recipe_usage();

    println!("Recipe usage across {} meals", result.meal_count());
    for entry in &usage {
        println!(
            "  {:>3}x  #{:<5} {}",
            entry.count, entry.recipe_id, entry.recipe_name
        );
    }
    Ok(())
}

pub(crate) fn run_example_config(args: ExampleConfigArgs) -> Result<(), AppError> {
    let start = args.start.unwrap_or_else(|| Local::now().date_naive());
    emit_json(&PlanConfig::example(start), None)
}

fn render_summary(result: &MenuPlanResult) {
    let (Some(first), Some(last)) = (result.days.first(), result.days.last()) else {
        println!("Empty plan");
        return;
    };

    println!("Menu plan {} to {}", first.date, last.date);
    for day in &result.days {
        println!("\n{} ({}) | {:.2} EUR", day.date, day.day_of_week, day.total_cost);
        for line in &day.menu_lines {
            for entry in &line.recipes {
                let Some(selected) = entry.selected() else {
                    continue;
                };
                let alternatives = entry.options.len().saturating_sub(1);
                println!(
                    "  - {} / {}: {} ({:.2} EUR, {} alternative{})",
                    line.name,
                    entry.cost_form.as_deref().unwrap_or("-"),
                    selected.recipe_name,
                    selected.cost_per_serving,
                    alternatives,
                    if alternatives == 1 { "" } else { "s" }
                );
            }
        }
    }

    println!();
    render_statistics(result);
    if let Some(outcome) = &result.optimization {
        println!(
            "Local search: cost {:.3} -> {:.3} ({} improvements in {} iterations)",
            outcome.initial_cost, outcome.final_cost, outcome.improvements, outcome.iterations
        );
    }
    if let Some(seed) = result.seed {
        println!("Seed: {seed}");
    }
    for warning in &result.warnings {
        println!("Warning: {}", warning.summary());
    }
}

fn render_statistics(result: &MenuPlanResult) {
    let stats = &result.statistics;
    println!(
        "Average daily cost {:.2} EUR (target {:.2}, range {:.2} to {:.2}) | total {:.2} EUR over {} days | {}",
        stats.average_bkt,
        stats.bkt_target,
        stats.bkt_min,
        stats.bkt_max,
        stats.total_cost,
        stats.total_days,
        if stats.within_budget {
            "within budget"
        } else {
            "over budget"
        }
    );
}
