use chrono::NaiveDate;
use menu_planner::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Writes pretty JSON to `path`, or to stdout when no path is given.
pub(crate) fn emit_json<T: Serialize>(value: &T, path: Option<&Path>) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => fs::write(path, rendered + "\n")?,
        None => println!("{rendered}"),
    }
    Ok(())
}
