//! NeuroTrix - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use neurotrix::cli::{Args, Commands};
use neurotrix::config::Config;
use neurotrix::models::{ClassifierLoader, LoadReport, LoaderState, ModelService, ModelStatus};
use neurotrix::{DiagnosticPipeline, PatientContext};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.verbosity().log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    info!("NeuroTrix v{} starting", env!("CARGO_PKG_VERSION"));

    match args.command {
        Commands::Analyze {
            image,
            name,
            age,
            gender,
            medical_history,
            symptoms,
            pretty,
        } => {
            let bytes = tokio::fs::read(&image)
                .await
                .with_context(|| format!("Failed to read image {}", image.display()))?;

            let patient = PatientContext {
                name,
                age,
                gender,
                medical_history,
                symptoms,
            };

            let pipeline = DiagnosticPipeline::from_config(&config).await;
            let report = pipeline
                .analyze(bytes, patient)
                .await
                .context("Analysis failed")?;

            if report.classification.is_placeholder() {
                eprintln!(
                    "{} no classifier loaded; classification is a placeholder",
                    "warning:".yellow().bold()
                );
            }

            let json = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{}", json);
        }

        Commands::Status => {
            let service = ModelService::from_config(&config).await;
            print_status(&service.status().await);
        }

        Commands::Install { weights } => {
            let bytes = tokio::fs::read(&weights)
                .await
                .with_context(|| format!("Failed to read weights {}", weights.display()))?;

            let service = ModelService::new(ClassifierLoader::from_config(&config));
            let report = service.install_weights(&bytes).await?;
            print_report(&report);
            print_status(&service.status().await);
        }

        Commands::Config => {
            let rendered = toml::to_string_pretty(&config).context("Failed to render config")?;
            println!("{}", rendered);
        }
    }

    Ok(())
}

fn state_label(state: LoaderState) -> colored::ColoredString {
    let label = format!("{:?}", state).to_lowercase();
    match state {
        LoaderState::Ready => label.green().bold(),
        LoaderState::Degraded => label.yellow().bold(),
        LoaderState::Failed => label.red().bold(),
        LoaderState::Unloaded | LoaderState::Loading => label.dimmed(),
    }
}

fn print_status(status: &ModelStatus) {
    println!("{} {}", "Model state:".bold(), state_label(status.state));
    println!("{} {}", "Model loaded:".bold(), status.model_loaded);
    if let Some(path) = &status.weights_path {
        println!("{} {}", "Weights:".bold(), path.display());
    }
    if let Some(detail) = &status.detail {
        println!("{} {}", "Detail:".bold(), detail.dimmed());
    }
}

fn print_report(report: &LoadReport) {
    for attempt in &report.attempts {
        let outcome = serde_json::to_string(&attempt.outcome).unwrap_or_default();
        println!("  {:?}: {}", attempt.rung, outcome.dimmed());
    }
}
