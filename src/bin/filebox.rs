//! Command-line front end for the file list.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use filebox_rs::client::{
    Confirmation, DeleteOutcome, Downloader, FileApi, FilesController, FilestackUploader, GraphqlClient,
    TracingNotifier,
};
use filebox_rs::config::{AppConfig, ReconcileMode};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "filebox", about = "Upload, list, download and delete file records")]
struct Cli {
    /// API base URL; overrides FILEBOX_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// How uploads are reconciled into records; overrides FILEBOX_RECONCILE_MODE
    #[arg(long, global = true, value_parser = parse_mode)]
    mode: Option<ReconcileMode>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a bearer token for FILEBOX_TOKEN
    Login { username: String, password: String },
    /// Show every file record
    List,
    /// Upload files and create or update their records
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Save a record's binary locally
    Download {
        id: String,
        /// Target directory; overrides FILEBOX_DOWNLOAD_DIR
        dir: Option<PathBuf>,
    },
    /// Delete a record after confirmation
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn parse_mode(value: &str) -> Result<ReconcileMode, String> {
    match value {
        "search" => Ok(ReconcileMode::Search),
        "atomic" => Ok(ReconcileMode::Atomic),
        other => Err(format!("unknown mode {:?}, expected search or atomic", other)),
    }
}

struct PromptConfirmation {
    assume_yes: bool,
}

#[async_trait]
impl Confirmation for PromptConfirmation {
    async fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || {
            dialoguer::Confirm::new().with_prompt(prompt).default(false).interact().unwrap_or(false)
        })
        .await
        .unwrap_or(false)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("filebox_rs=info")))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::new()?;
    let api_url = cli.api_url.unwrap_or(config.client.api_url.clone());
    let client = GraphqlClient::new(&api_url, config.client.token.clone());

    if let Command::Login { username, password } = &cli.command {
        println!("{}", client.login(username, password).await?);
        return Ok(());
    }
    if config.client.token.is_none() {
        bail!("FILEBOX_TOKEN is not set; run `filebox login` first");
    }

    let (download_dir, assume_yes) = match &cli.command {
        Command::Download { dir: Some(dir), .. } => (dir.clone(), false),
        Command::Delete { yes, .. } => (PathBuf::from(&config.client.download_dir), *yes),
        _ => (PathBuf::from(&config.client.download_dir), false),
    };

    let api: Arc<dyn FileApi> = Arc::new(client);
    let controller = FilesController::new(
        api.clone(),
        Arc::new(TracingNotifier),
        Arc::new(PromptConfirmation { assume_yes }),
        Downloader::new(download_dir),
        cli.mode.unwrap_or(config.client.reconcile_mode),
    );

    match cli.command {
        // Answered before the token check.
        Command::Login { .. } => {}
        Command::List => {
            controller.load().await?;
            println!("{}", controller.render().await);
        }
        Command::Upload { paths } => {
            let uploader = FilestackUploader::new(&config.upload);
            let results = controller.upload_paths(&uploader, &paths).await;
            let recorded = results.iter().filter(|result| result.is_ok()).count();
            println!("{}", controller.render().await);
            if recorded < paths.len() {
                bail!("{} of {} files were not recorded", paths.len() - recorded, paths.len());
            }
        }
        Command::Download { id, .. } => {
            let file = api.file(&id).await?.ok_or_else(|| anyhow!("File {} not found", id))?;
            let path = controller.download(&file).await?;
            println!("{}", path.display());
        }
        Command::Delete { id, .. } => {
            let file = api.file(&id).await?.ok_or_else(|| anyhow!("File {} not found", id))?;
            match controller.request_delete(&file.id, &file.name).await? {
                DeleteOutcome::Deleted(file) => println!("Deleted {}", file.name),
                DeleteOutcome::Cancelled => println!("Cancelled"),
            }
        }
    }

    Ok(())
}
