//! API key commands

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::WorkspaceService;

pub async fn create_token(
    service: &WorkspaceService,
    workspace: String,
    name: String,
) -> Result<(), CliError> {
    let workspace_id = if workspace.starts_with("ws_") {
        workspace
    } else {
        format!("ws_{}", workspace)
    };
    let issued = service.issue_token(&workspace_id, &name, None).await?;

    println!(
        "{} Issued API key {} ({}) for {}",
        "✓".bold().green(),
        issued.token.name.cyan(),
        issued.token.partial_key.dimmed(),
        workspace_id.magenta()
    );
    println!("  {} {}", "API key:".bold(), issued.plain_key.green().bold());
    println!(
        "  {}",
        "Store this key now; it cannot be shown again.".yellow()
    );
    Ok(())
}
