use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use w9_extract::analysis::AzureAnalyzer;
use w9_extract::config::{Config, DEFAULT_CONFIG_PATH};
use w9_extract::normalize::{address, date};
use w9_extract::pipeline::{self, AddressStrategy};
use w9_extract::{Error, FormatOutcome};

#[derive(Parser)]
#[command(name = "w9x", about = "Extract and normalize W-9 form fields")]
struct Cli {
    /// TOML config file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a PDF with the document service and print the canonical record.
    Extract { file: PathBuf },
    /// Normalize a saved analysis result (JSON) without calling the service.
    Format { file: PathBuf },
    /// Split one "City, State ZIP" fragment.
    Address { text: String },
    /// Normalize one date to YYYY-MM-DD.
    Date { text: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logs go to stderr; stdout carries the JSON result
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Extract { file } => {
            let cfg = Config::load(&cli.config)?;
            let name = file.display().to_string();
            let pdf = read(&file)?;
            info!(file = %name, bytes = pdf.len(), "PDF loaded, extracting");

            let analyzer = AzureAnalyzer::from_config(&cfg.analysis)?;
            let address = AddressStrategy::from_config(&cfg.address)?;
            let outcome = pipeline::extract_pdf(&name, &pdf, &analyzer, &address).await;
            print_outcome(&outcome)?;
        }
        Command::Format { file } => {
            let cfg = Config::load(&cli.config)?;
            let saved: serde_json::Value = serde_json::from_slice(&read(&file)?)?;
            let address = AddressStrategy::from_config(&cfg.address)?;
            let outcome = pipeline::format_saved(&saved, &address).await;
            print_outcome(&outcome)?;
        }
        Command::Address { text } => {
            let parsed = address::decompose(&text);
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Command::Date { text } => {
            println!("{}", date::normalize_date(&text));
        }
    }

    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })
}

fn print_outcome(outcome: &FormatOutcome) -> Result<(), serde_json::Error> {
    if let Some(record) = outcome.record() {
        let (filled, total) = record.coverage();
        info!(filled, total, "Extraction complete");
    }
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(())
}
