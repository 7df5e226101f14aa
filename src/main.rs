use anyhow::Result;
use clap::Parser;

use linkhub::cli::{Cli, Commands};
use linkhub::config::{get_config, init_config_from};
use linkhub::runtime::modes;
use linkhub::system::logging::init_logging;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config_from(cli.config.as_deref().unwrap_or("config.toml"));
    let config = get_config();

    match cli.command {
        None | Some(Commands::Serve) => {
            let _guard = init_logging(&config.logging)?;
            modes::run_server().await
        }
        #[cfg(feature = "cli")]
        Some(cmd) => {
            if let Err(e) = modes::run_cli(cmd).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
            Ok(())
        }
        #[cfg(not(feature = "cli"))]
        Some(_) => anyhow::bail!("this build only supports `serve`; rebuild with the `cli` feature"),
    }
}
