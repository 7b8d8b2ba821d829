use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use architect::blueprint::{build_blueprint, serialize_blueprint};
use architect::constants;
use architect::github::RepoClient;
use architect::web_server;

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the Architect web UI.
    Serve {
        #[arg(long, default_value_t = 9900, help = "Port for the web server.")]
        port: u16,
        #[arg(long, help = "Directory packaged into the blueprint.")]
        folder: Option<PathBuf>,
    },
    /// Build a blueprint and write the JSON document.
    Build {
        #[arg(help = "Directory packaged into the blueprint.")]
        folder: Option<PathBuf>,
        #[arg(long, help = "Write the JSON here instead of stdout.")]
        output: Option<PathBuf>,
    },
    /// Build a blueprint and publish it to a repository.
    Deploy {
        #[arg(long, help = "Target repository (owner/repo).")]
        repo: String,
        #[arg(help = "Directory packaged into the blueprint.")]
        folder: Option<PathBuf>,
        #[arg(long, help = "Target branch.")]
        branch: Option<String>,
        #[arg(long, help = "Commit message for the publish.")]
        message: Option<String>,
    },
}

fn resolve_folder(folder: Option<PathBuf>) -> PathBuf {
    folder.unwrap_or_else(|| PathBuf::from(constants::BLUEPRINT_FOLDER.as_str()))
}

// The main entry point of the application, using tokio's async runtime
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for environment variables like API keys)
    dotenvy::dotenv().ok();

    // Initialize tracing (logging) subscriber
    // Reads log level from RUST_LOG environment variable (e.g., RUST_LOG=info,architect=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, folder } => {
            info!("Starting Architect web UI on port {}...", port);
            web_server::start_web_server(port, resolve_folder(folder)).await?;
        }
        Commands::Build { folder, output } => {
            let folder = resolve_folder(folder);
            let blueprint = build_blueprint(&folder);
            if blueprint.is_empty() {
                warn!(
                    "No files found under {}. The blueprint will be empty",
                    folder.display()
                );
            }
            let payload = serialize_blueprint(&blueprint);
            match output {
                Some(path) => {
                    std::fs::write(&path, payload)
                        .context(format!("Failed to write blueprint to {}", path.display()))?;
                    info!(
                        "Wrote blueprint with {} file(s) to {}",
                        blueprint.len(),
                        path.display()
                    );
                }
                None => println!("{}", payload),
            }
        }
        Commands::Deploy {
            repo,
            folder,
            branch,
            message,
        } => {
            let folder = resolve_folder(folder);
            let blueprint = build_blueprint(&folder);
            if blueprint.is_empty() {
                warn!(
                    "No files found under {}. The blueprint will be empty",
                    folder.display()
                );
            }
            let branch = branch.unwrap_or_else(|| constants::DEFAULT_BRANCH.clone());
            let message = message.unwrap_or_else(|| constants::DEFAULT_COMMIT_MESSAGE.to_string());
            let client = RepoClient::new(constants::GITHUB_TOKEN.as_str());
            client
                .publish_blueprint(&repo, &blueprint, &message, &branch)
                .await?;
            info!(
                "Deployed blueprint with {} file(s) to {} on {}",
                blueprint.len(),
                repo,
                branch
            );
        }
    }

    Ok(())
}
