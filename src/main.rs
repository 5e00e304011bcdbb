use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use apiparamedic::HarnessConfig;

#[derive(Parser)]
#[command(
    name = "apiparamedic",
    about = "Result-aggregating endpoint probe harness for AI backend APIs",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full probe battery against the backend
    Run {
        /// Base URL of the backend (overrides config file and NEXT_PUBLIC_BASE_URL)
        #[arg(long)]
        base_url: Option<String>,

        /// Env file inspected for credential presence
        #[arg(long)]
        env_file: Option<PathBuf>,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Probe the LLM provider directly to localize API-key failures
    DebugLlm {
        /// Env file holding GROQ_API_KEY
        #[arg(long)]
        env_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            base_url,
            env_file,
            json,
        } => {
            let mut config = HarnessConfig::discover()?;
            if let Some(url) = base_url {
                config.base_url = url;
            }
            if let Some(path) = env_file {
                config.env_file = path;
            }

            tracing::info!(base_url = %config.base_url, "starting probe run");
            println!("ApiParamedic probe run");
            println!("Base URL: {}", config.base_url);
            println!("{}", "=".repeat(60));

            let report = apiparamedic::run_all(&config).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                report.print_summary();
            }

            // Exit 0 only when no category ended failed.
            std::process::exit(if report.overall_success() { 0 } else { 1 });
        }
        Commands::DebugLlm { env_file } => {
            let mut config = HarnessConfig::discover()?;
            if let Some(path) = env_file {
                config.env_file = path;
            }
            apiparamedic::groq::run(&config).await?;
        }
    }

    Ok(())
}
