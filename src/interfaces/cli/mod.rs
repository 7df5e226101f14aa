//! CLI interface module

pub mod commands;

use std::fmt;
use std::sync::Arc;

use crate::cli::{Commands, ConfigCommands, TokenCommands, WorkspaceCommands};
use crate::config::get_config;
use crate::services::WorkspaceService;
use crate::storage::StorageFactory;
use commands::{config_generate, create_token, create_workspace};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    CommandError(String),
}

impl CliError {
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::LinkhubError> for CliError {
    fn from(err: crate::errors::LinkhubError) -> Self {
        match err {
            crate::errors::LinkhubError::DatabaseConfig(_)
            | crate::errors::LinkhubError::DatabaseConnection(_)
            | crate::errors::LinkhubError::DatabaseOperation(_) => {
                CliError::StorageError(err.message().to_string())
            }
            other => CliError::CommandError(other.message().to_string()),
        }
    }
}

/// Run a non-server command
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    // Generating config needs no database
    if let Commands::Config {
        action: ConfigCommands::Generate { output_path, force },
    } = cmd
    {
        return config_generate(output_path, force).await;
    }

    let storage = StorageFactory::create(&get_config().database).await?;
    let service = WorkspaceService::new(Arc::clone(&storage));

    match cmd {
        Commands::Workspace {
            action:
                WorkspaceCommands::Create {
                    name,
                    slug,
                    plan,
                    usage_limit,
                    email,
                },
        } => create_workspace(&service, name, slug, plan, usage_limit, email).await,

        Commands::Token {
            action: TokenCommands::Create { workspace, name },
        } => create_token(&service, workspace, name).await,

        Commands::Serve | Commands::Config { .. } => Err(CliError::CommandError(
            "command is not handled by the CLI runner".to_string(),
        )),
    }
}
