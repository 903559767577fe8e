//! Clear all stored data

use colored::Colorize;
use std::io::{self, BufRead, Write};

use crate::interfaces::cli::CliError;
use crate::services::IngestService;

pub async fn clear_data(service: &IngestService, yes: bool) -> Result<(), CliError> {
    if !yes {
        print!(
            "{} ",
            "This deletes every view and action. Continue? [y/N]".yellow()
        );
        io::stdout()
            .flush()
            .map_err(|e| CliError::CommandError(e.to_string()))?;

        let mut input = String::new();
        io::stdin()
            .lock()
            .read_line(&mut input)
            .map_err(|e| CliError::CommandError(e.to_string()))?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("{}", "Aborted.".red());
            return Ok(());
        }
    }

    let deleted = service.clear_all().await?;
    println!(
        "{} Deleted {} views and {} actions",
        "✓".bold().green(),
        deleted.views.to_string().green(),
        deleted.actions.to_string().green()
    );
    Ok(())
}
