//! Output rendering: tables for humans, JSON for scripts.

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::Tabled;
use tabled::settings::Style;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Render a list either as a rounded table or as pretty JSON.
pub fn print_list<T: Tabled + Serialize>(
    items: &[T],
    format: OutputFormat,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("{}", "(nothing to show)".dimmed());
                return Ok(());
            }
            let mut table = tabled::Table::new(items);
            table.with(Style::rounded());
            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items)?);
        }
    }
    Ok(())
}

/// Render a single value as JSON regardless of format (used for one-off
/// results like stream URLs in `--output json` mode).
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Helper for empty optional cells.
pub fn cell<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map_or_else(|| "-".into(), T::to_string)
}

/// Render a boolean as a colored yes/no cell.
pub fn yes_no(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".red().to_string()
    }
}
