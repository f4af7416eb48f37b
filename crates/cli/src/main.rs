//! Command-line entry point: the TUI by default, plus one-shot model
//! configuration utilities.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use haixin_api::HaixinClient;
use haixin_types::{ItemList, NewModel};
use haixin_tui::RunOptions;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "haixin",
    version,
    about = "Terminal client for the Haixin AI toolkit"
)]
struct Cli {
    /// Backend base URL (overrides HAIXIN_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Location path to start on, e.g. /ai-model-compare/history-ui
    #[arg(long)]
    path: Option<String>,

    /// Offer model registration, toggling, and deletion in the UI
    #[arg(long)]
    manager: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Model configuration utilities
    Models {
        #[command(subcommand)]
        command: ModelsCommand,
    },
}

#[derive(Subcommand)]
enum ModelsCommand {
    /// Print the registered models as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Register models from a JSON export
    Import {
        /// File with an `{"items": [...]}` export, as written by `models export`
        file: PathBuf,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_client(api_base: Option<&str>) -> Result<HaixinClient> {
    match api_base {
        Some(base) => HaixinClient::with_base_url(base),
        None => HaixinClient::new_from_env(),
    }
}

async fn export_models(client: &HaixinClient, out: Option<&Path>) -> Result<()> {
    let items = client.list_models().await?;
    let json = serde_json::to_string_pretty(&ItemList { items })
        .context("encode model export")?;
    match out {
        Some(path) => {
            tokio::fs::write(path, &json)
                .await
                .with_context(|| format!("write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

async fn import_models(client: &HaixinClient, file: &Path) -> Result<()> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("read {}", file.display()))?;
    let list: ItemList<NewModel> =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", file.display()))?;

    let mut imported = 0usize;
    let mut failed = 0usize;
    for model in &list.items {
        match client.create_model(model).await {
            Ok(id) => {
                imported += 1;
                println!("Imported '{}' as #{id}", model.model);
            }
            Err(error) => {
                failed += 1;
                eprintln!("Skipped '{}': {error:#}", model.model);
            }
        }
    }
    println!("Imported {imported} model(s), {failed} failed");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Models { command }) => {
            let client = build_client(cli.api_base.as_deref())?;
            match command {
                ModelsCommand::Export { out } => export_models(&client, out.as_deref()).await,
                ModelsCommand::Import { file } => import_models(&client, &file).await,
            }
        }
        None => {
            haixin_tui::run(RunOptions {
                api_base: cli.api_base,
                manager: cli.manager,
                initial_path: cli.path,
            })
            .await
        }
    }
}
