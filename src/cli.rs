//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

use crate::storage::Plan;

/// linkhub - workspace-scoped link shortener with analytics
#[derive(Parser)]
#[command(name = "linkhub")]
#[command(version)]
#[command(about = "Workspace-scoped link shortener with custom domains and analytics", long_about = None)]
pub struct Cli {
    /// Configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default when no command is given)
    Serve,

    /// Manage workspaces
    Workspace {
        #[command(subcommand)]
        action: WorkspaceCommands,
    },

    /// Manage API keys
    Token {
        #[command(subcommand)]
        action: TokenCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum WorkspaceCommands {
    /// Create an owner, a workspace and its first API key
    Create {
        #[arg(long)]
        name: String,

        /// URL-safe identifier, unique across workspaces
        #[arg(long)]
        slug: String,

        /// free, pro, business or enterprise
        #[arg(long, default_value = "free", value_parser = parse_plan)]
        plan: Plan,

        /// Clicks allowed per period
        #[arg(long)]
        usage_limit: Option<i64>,

        /// Owner email (default: owner@<slug>.local)
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TokenCommands {
    /// Issue another API key for a workspace
    Create {
        /// Workspace id (with or without the `ws_` prefix)
        #[arg(long)]
        workspace: String,

        #[arg(long, default_value = "Default")]
        name: String,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print a sample configuration, or write it to a file
    Generate {
        /// Output path (default: stdout)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_plan(value: &str) -> Result<Plan, String> {
    value
        .to_ascii_lowercase()
        .parse()
        .map_err(|_| format!("unknown plan '{}'", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_create_args() {
        let cli = Cli::try_parse_from([
            "linkhub",
            "workspace",
            "create",
            "--name",
            "Acme",
            "--slug",
            "acme",
            "--plan",
            "Pro",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Workspace {
                action: WorkspaceCommands::Create { plan, slug, .. },
            }) => {
                assert_eq!(plan, Plan::Pro);
                assert_eq!(slug, "acme");
            }
            _ => panic!("expected workspace create"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["linkhub", "serve", "-c", "prod.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("prod.toml"));
        assert!(matches!(cli.command, Some(Commands::Serve)));
    }

    #[test]
    fn test_rejects_unknown_plan() {
        assert!(
            Cli::try_parse_from([
                "linkhub", "workspace", "create", "--name", "A", "--slug", "abc", "--plan",
                "gold",
            ])
            .is_err()
        );
    }
}
