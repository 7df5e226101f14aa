//! Workspace commands

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::{CreateWorkspaceRequest, WorkspaceService};
use crate::storage::Plan;

pub async fn create_workspace(
    service: &WorkspaceService,
    name: String,
    slug: String,
    plan: Plan,
    usage_limit: Option<i64>,
    email: Option<String>,
) -> Result<(), CliError> {
    let owner_email = email.unwrap_or_else(|| format!("owner@{}.local", slug));
    let provisioned = service
        .provision(CreateWorkspaceRequest {
            name,
            slug,
            plan,
            usage_limit,
            owner_email,
            owner_name: None,
        })
        .await?;

    let ws = &provisioned.workspace;
    println!(
        "{} Created workspace {} ({}) on the {} plan",
        "✓".bold().green(),
        ws.name.cyan(),
        ws.id.magenta(),
        ws.plan.as_ref().yellow()
    );
    println!(
        "  {} {} <{}>",
        "Owner:".dimmed(),
        provisioned.owner.id,
        provisioned.owner.email
    );
    println!(
        "  {} {}",
        "API key:".bold(),
        provisioned.issued.plain_key.green().bold()
    );
    println!(
        "  {}",
        "Store this key now; it cannot be shown again.".yellow()
    );
    Ok(())
}
