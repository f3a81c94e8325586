mod cli;
mod commands;
mod infra;

use menu_planner::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
