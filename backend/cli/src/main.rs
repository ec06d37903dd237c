mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use billscope_config::{load_and_prepare, redact, BillscopeConfig};
use billscope_gateway::{start_server, GatewayState};

#[derive(Parser)]
#[command(name = "billscope")]
#[command(about = "Billscope: structured analysis of legislative bill PDFs")]
#[command(version)]
struct Cli {
    /// Path to the YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Address to bind the HTTP server to
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Analyse a local PDF and print the JSON result
    Analyze {
        /// The bill PDF
        pdf: PathBuf,
    },
    /// Print the effective config with secrets masked
    Config,
    /// Check whether a server is running
    Status {
        /// Port the server listens on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = load_and_prepare(cli.config.as_deref()).await?;

    billscope_logging::init_logger(
        loaded.config.logging.log_dir.as_deref(),
        &loaded.config.logging.level,
        loaded.config.logging.json,
    );
    config::log_loaded_config(&loaded);
    let mut config = loaded.config;

    match cli.command {
        Commands::Serve { port, bind } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(bind) = bind {
                config.server.bind_address = bind;
            }
            run_server(config).await?;
        }
        Commands::Analyze { pdf } => {
            let pipeline = config::build_pipeline(&config)?;
            let outcome = pipeline.analyze_file(&pdf).await?;
            info!(
                report = %outcome.report_path.display(),
                pages = outcome.page_count,
                "Analysis saved"
            );
            println!("{}", serde_json::to_string_pretty(&outcome.analysis)?);
        }
        Commands::Config => {
            let value = serde_json::to_value(&config).context("Failed to serialize config")?;
            println!("{}", serde_json::to_string_pretty(&redact(&value))?);
        }
        Commands::Status { port } => {
            let port = port.unwrap_or(config.server.port);
            let client = reqwest::Client::new();
            match client
                .get(format!("http://localhost:{port}/api/health"))
                .send()
                .await
            {
                Ok(resp) => {
                    let body: serde_json::Value = resp.json().await?;
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                Err(_) => {
                    println!("Billscope is not running on port {port}");
                }
            }
        }
    }

    Ok(())
}

async fn run_server(config: BillscopeConfig) -> Result<()> {
    let addr = config::listen_addr(&config)?;
    info!(
        addr = %addr,
        rate_limit = config.rate_limit.enabled,
        cache = config.cache.enabled,
        "Starting Billscope"
    );

    let pipeline = Arc::new(config::build_pipeline(&config)?);
    let state = GatewayState::new(pipeline, &config);
    start_server(addr, state).await
}
