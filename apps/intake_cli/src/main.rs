use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use intake_core::{load_catalog, HttpDiagnosisClient, IntakeController};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod terminal;

use commands::{print_catalog, run_diagnose};
use config::{load_settings, Settings};
use terminal::IntakeRepl;

#[derive(Parser, Debug)]
#[command(name = "intake", about = "Symptom intake client for the diagnosis service")]
struct Cli {
    /// Settings file (defaults to ./intake.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Base address of the diagnosis service
    #[arg(long)]
    service_url: Option<String>,
    /// Per-request timeout in seconds; 0 disables it
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// tracing filter used when RUST_LOG is unset
    #[arg(long)]
    log_filter: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk through the intake prompts (default)
    Interactive {
        /// Symptoms per row in the selection list
        #[arg(long)]
        columns: Option<usize>,
    },
    /// Print the symptom catalog
    Catalog,
    /// Submit one diagnosis request without prompting
    Diagnose {
        #[arg(long)]
        name: String,
        /// Symptom to report; repeat for several
        #[arg(long = "symptom")]
        symptoms: Vec<String>,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(v) = &self.service_url {
            settings.service_url = v.clone();
        }
        if let Some(v) = self.timeout_secs {
            settings.request_timeout_secs = Some(v);
        }
        if let Some(v) = &self.log_filter {
            settings.log_filter = v.clone();
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    cli.apply_overrides(&mut settings);
    init_tracing(&settings.log_filter);

    let client = HttpDiagnosisClient::with_timeout(&settings.service_url, settings.request_timeout())
        .context("failed to configure diagnosis service client")?;
    info!(service_url = %client.base_url(), "diagnosis service configured");
    let service = Arc::new(client);

    match cli.command.unwrap_or(Command::Interactive { columns: None }) {
        Command::Interactive { columns } => {
            let columns = columns.unwrap_or(settings.symptom_columns);
            let catalog = tokio::spawn({
                let service = Arc::clone(&service);
                async move { load_catalog(service.as_ref()).await }
            });
            let controller = IntakeController::new(service);
            let stdin = BufReader::new(tokio::io::stdin());
            let mut repl = IntakeRepl::new(controller, stdin, std::io::stdout(), columns);
            repl.run(catalog).await?;
        }
        Command::Catalog => print_catalog(service.as_ref(), &mut std::io::stdout()).await?,
        Command::Diagnose {
            name,
            symptoms,
            json,
        } => run_diagnose(service, &name, &symptoms, json, &mut std::io::stdout()).await?,
    }

    Ok(())
}
