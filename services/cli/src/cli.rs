use crate::commands::{
    run_example_config, run_generate, run_select, run_usage, ExampleConfigArgs, GenerateArgs,
    SelectArgs, UsageArgs,
};
use clap::{Parser, Subcommand};
use menu_planner::config::AppConfig;
use menu_planner::error::AppError;
use menu_planner::telemetry;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "menu-planner",
    about = "Generate and adjust multi-day menu plans for institutional catering",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a menu plan from a recipe catalog and a plan configuration
    Generate(GenerateArgs),
    /// Switch the selected option of one meal in a generated plan
    Select(SelectArgs),
    /// List how often each recipe is selected in a generated plan
    Usage(UsageArgs),
    /// Print an example plan configuration
    ExampleConfig(ExampleConfigArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(environment = ?config.environment, "configuration loaded");

    match cli.command {
        Command::Generate(args) => run_generate(args, &config.planner),
        Command::Select(args) => run_select(args),
        Command::Usage(args) => run_usage(args),
        Command::ExampleConfig(args) => run_example_config(args),
    }
}
