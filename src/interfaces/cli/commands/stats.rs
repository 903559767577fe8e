//! Show row counts

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::AnalyticsService;

pub async fn show_stats(service: &AnalyticsService, backend: &str) -> Result<(), CliError> {
    let totals = service.totals().await?;
    println!("{} {}", "Backend:".bold(), backend.cyan());
    println!("{} {}", "Views:".bold(), totals.views.to_string().green());
    println!("{} {}", "Actions:".bold(), totals.actions.to_string().green());
    Ok(())
}
