use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use uuid::Uuid;

use sitesmith::config::Config;
use sitesmith::export;
use sitesmith::generator::Generator;
use sitesmith::provider::{check_endpoint, HttpProvider};
use sitesmith::store::ProjectStore;

#[derive(Parser)]
#[command(name = "sitesmith", version, about = "Generate websites from prose descriptions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a website from a prompt, persist it, and optionally export.
    Generate {
        /// Description of the website (10-2000 characters).
        prompt: String,
        /// Write the result as a zip archive to this path.
        #[arg(long)]
        export: Option<PathBuf>,
        /// Skip persisting the project.
        #[arg(long)]
        no_save: bool,
    },
    /// List saved projects, newest first.
    List {
        /// Maximum number of projects to show (1-50).
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show a saved project.
    Show { id: Uuid },
    /// Delete a saved project.
    Delete { id: Uuid },
    /// Export a saved project as a zip archive.
    Export {
        id: Uuid,
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Show configuration and endpoint reachability.
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            prompt,
            export: export_path,
            no_save,
        } => generate(&config, &prompt, export_path, no_save).await,
        Command::List { limit } => list(&config, limit),
        Command::Show { id } => show(&config, id),
        Command::Delete { id } => delete(&config, id),
        Command::Export { id, output } => export_saved(&config, id, &output),
        Command::Status => status(&config).await,
    }
}

async fn generate(
    config: &Config,
    prompt: &str,
    export_path: Option<PathBuf>,
    no_save: bool,
) -> Result<()> {
    let provider = HttpProvider::new(config)?;
    let generator = Generator::new(provider);

    let generation = generator.generate(prompt).await?;
    println!(
        "Generated bundle ({}): html {} bytes, css {} bytes, js {} bytes",
        generation.outcome,
        generation.bundle.html.len(),
        generation.bundle.css.len(),
        generation.bundle.js.len(),
    );

    if !no_save {
        let store = ProjectStore::open(&config.data_dir)?;
        let project = store.save(&generation.prompt, generation.bundle.clone())?;
        info!(id = %project.id, "project saved");
        println!("Saved as project {}", project.id);
    }

    if let Some(path) = export_path {
        export::export_to_path(&generation.bundle, &generation.prompt, &path)?;
        println!("Exported archive to {}", path.display());
    }

    Ok(())
}

fn list(config: &Config, limit: usize) -> Result<()> {
    // Same clamp the original listing endpoint applied.
    let limit = if (1..=50).contains(&limit) { limit } else { 10 };

    let store = ProjectStore::open(&config.data_dir)?;
    let projects = store.list()?;
    if projects.is_empty() {
        println!("No saved projects.");
        return Ok(());
    }
    for project in projects.iter().take(limit) {
        let mut prompt = project.prompt.clone();
        if prompt.chars().count() > 60 {
            prompt = prompt.chars().take(60).collect::<String>() + "…";
        }
        println!(
            "{}  {}  {}",
            project.id,
            project.created_at.format("%Y-%m-%d %H:%M:%S"),
            prompt
        );
    }
    Ok(())
}

fn show(config: &Config, id: Uuid) -> Result<()> {
    let store = ProjectStore::open(&config.data_dir)?;
    match store.get(id)? {
        Some(project) => {
            let json = serde_json::to_string_pretty(&project)?;
            println!("{json}");
            Ok(())
        }
        None => bail!("project {id} not found"),
    }
}

fn delete(config: &Config, id: Uuid) -> Result<()> {
    let store = ProjectStore::open(&config.data_dir)?;
    if store.delete(id)? {
        println!("Deleted project {id}");
        Ok(())
    } else {
        bail!("project {id} not found")
    }
}

fn export_saved(config: &Config, id: Uuid, output: &PathBuf) -> Result<()> {
    let store = ProjectStore::open(&config.data_dir)?;
    let project = store
        .get(id)?
        .with_context(|| format!("project {id} not found"))?;
    export::export_to_path(&project.code, &project.prompt, output)?;
    println!("Exported archive to {}", output.display());
    Ok(())
}

async fn status(config: &Config) -> Result<()> {
    println!("endpoint:  {}", config.base_url);
    println!("model:     {}", config.model);
    println!("data dir:  {}", config.data_dir.display());
    println!("timeout:   {}s", config.timeout_secs);

    let reachable = check_endpoint(&config.base_url).await;
    println!(
        "status:    {}",
        if reachable { "reachable" } else { "unreachable" }
    );
    Ok(())
}
