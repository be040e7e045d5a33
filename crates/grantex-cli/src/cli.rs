//! CLI command definitions and argument parsing.

use crate::config::AppConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Grantex CLI - Extract structured records from grant announcements.
#[derive(Debug, Parser)]
#[command(name = "grantex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Input directory containing markdown announcements
    #[arg(short, long, global = true)]
    pub input_dir: Option<PathBuf>,

    /// Output directory for JSON artifacts
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Number of parallel workers
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    /// Model to use
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// API key for the model provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process every document and store the results (default)
    Run(RunArgs),

    /// Process a single document and print its record as JSON
    Extract(ExtractArgs),

    /// Write a default configuration file
    InitConfig(InitConfigArgs),
}

/// Arguments for the run command.
#[derive(Debug, Default, Parser)]
pub struct RunArgs {
    /// Write JSON artifacts only, skip the database
    #[arg(long)]
    pub no_persist: bool,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Markdown file to process
    pub file: PathBuf,
}

/// Arguments for the init-config command.
#[derive(Debug, Parser)]
pub struct InitConfigArgs {
    /// Where to write the file
    #[arg(default_value = crate::config::LOCAL_CONFIG_FILE)]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.input_dir {
            config.directories.input_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.directories.output_dir = dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.log_level = level.clone();
        }
        if let Some(workers) = self.workers {
            config.parallel.max_workers = workers;
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            config.llm.api_key = key.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_run() {
        let cli = Cli::parse_from(["grantex"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_command() {
        let cli = Cli::parse_from(["grantex", "run", "--no-persist"]);
        match cli.command {
            Some(Command::Run(args)) => assert!(args.no_persist),
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_extract_command() {
        let cli = Cli::parse_from(["grantex", "extract", "notices/a.md"]);
        match cli.command {
            Some(Command::Extract(args)) => assert_eq!(args.file, PathBuf::from("notices/a.md")),
            _ => panic!("Expected Extract command"),
        }
    }

    #[test]
    fn test_init_config_default_path() {
        let cli = Cli::parse_from(["grantex", "init-config"]);
        match cli.command {
            Some(Command::InitConfig(args)) => {
                assert_eq!(args.path, PathBuf::from("grantex.toml"));
                assert!(!args.force);
            }
            _ => panic!("Expected InitConfig command"),
        }
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "grantex",
            "--input-dir",
            "in",
            "-o",
            "out",
            "--workers",
            "2",
            "--model",
            "gpt-4o",
            "--log-level",
            "debug",
            "--api-key",
            "sk-test",
            "run",
        ]);
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.directories.input_dir, PathBuf::from("in"));
        assert_eq!(config.directories.output_dir, PathBuf::from("out"));
        assert_eq!(config.parallel.max_workers, 2);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.logging.log_level, "debug");
        assert_eq!(config.llm.api_key, "sk-test");
    }

    #[test]
    fn test_no_flags_keep_file_values() {
        let cli = Cli::parse_from(["grantex", "--api-key", "", "run"]);
        let mut config = AppConfig::default();
        config.llm.api_key = "from-file".into();
        cli.apply_overrides(&mut config);

        assert_eq!(config.llm.api_key, "from-file");
        assert_eq!(config.parallel.max_workers, 4);
    }
}
