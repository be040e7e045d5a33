//! Default configuration file generation.

use crate::cli::InitConfigArgs;
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use std::path::PathBuf;

/// Execute the init-config command, returning the path written.
pub fn execute_init_config(args: &InitConfigArgs) -> Result<PathBuf> {
    if args.path.exists() && !args.force {
        return Err(CliError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            args.path.display()
        )));
    }

    AppConfig::default().save(&args.path)?;
    Ok(args.path.clone())
}
