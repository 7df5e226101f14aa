//! Generate config command

use std::path::Path;

use colored::Colorize;

use crate::config::StaticConfig;
use crate::interfaces::cli::CliError;

/// Print the sample config, or write it to `output_path`
pub async fn config_generate(output_path: Option<String>, force: bool) -> Result<(), CliError> {
    let sample = StaticConfig::generate_sample_config();

    let Some(path) = output_path else {
        print!("{}", sample);
        return Ok(());
    };

    if !force && Path::new(&path).exists() {
        return Err(CliError::CommandError(format!(
            "{} already exists; pass --force to overwrite",
            path
        )));
    }

    tokio::fs::write(&path, sample)
        .await
        .map_err(|e| CliError::CommandError(format!("Failed to write {}: {}", path, e)))?;
    println!(
        "{} Configuration written to {}",
        "✓".bold().green(),
        path.blue()
    );
    Ok(())
}
