//! Grantex CLI - Batch extraction of grant announcements.

use clap::Parser;
use grantex_cli::cli::RunArgs;
use grantex_cli::config::ProviderKind;
use grantex_cli::{commands, logging, AppConfig, Cli, Command};
use grantex_domain::LlmProvider;
use grantex_llm::MockProvider;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> grantex_cli::Result<()> {
    let cli = Cli::parse();

    if let Some(Command::InitConfig(args)) = &cli.command {
        let path = commands::execute_init_config(args)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    // Defaults, then file, then flags
    let (mut config, source) = AppConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    logging::init(&config.logging)?;
    match &source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }
    config.validate()?;

    match config.llm.provider {
        ProviderKind::OpenAi => {
            let provider = commands::openai_provider(&config.llm)?;
            info!("Using model '{}'", provider.model_name());
            dispatch(cli.command, provider, &config).await
        }
        ProviderKind::Mock => {
            warn!("Using the mock provider; every extraction will be empty");
            dispatch(cli.command, MockProvider::default(), &config).await
        }
    }
}

async fn dispatch<L>(
    command: Option<Command>,
    provider: L,
    config: &AppConfig,
) -> grantex_cli::Result<()>
where
    L: LlmProvider + 'static,
{
    match command {
        None => {
            commands::execute_run(&RunArgs::default(), provider, config).await?;
        }
        Some(Command::Run(args)) => {
            commands::execute_run(&args, provider, config).await?;
        }
        Some(Command::Extract(args)) => {
            let json = commands::execute_extract(&args, provider, config).await?;
            println!("{}", json);
        }
        // Handled before configuration is loaded
        Some(Command::InitConfig(_)) => {}
    }
    Ok(())
}
