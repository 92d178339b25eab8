//! aplus - check a product image against the main-image rules offline.
//!
//! Content rules run when VISION_CREDENTIAL (or GOOGLE_VISION_API_KEY) is set.

use anyhow::Context;
use aplus_cli::{exit_code, init_tracing, load_upload, EXIT_REJECTED};
use aplus_core::{ComplianceReport, Config};
use aplus_plugins::GoogleVisionClient;
use aplus_processing::{ComplianceAnalyzer, IngressValidator};
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "aplus", about = "Main product image compliance checker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a local image and print the report as JSON
    Check {
        /// Path to the image
        file: std::path::PathBuf,
        /// MIME type to declare (inferred from the extension when omitted)
        #[arg(long)]
        mime: Option<String>,
        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
        /// Skip content rules even when a vision credential is set
        #[arg(long)]
        no_vision: bool,
    },
}

fn print_report(report: &ComplianceReport, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
    .context("Serialize report")?;
    println!("{}", out);
    Ok(())
}

fn build_analyzer(config: &Config, use_vision: bool) -> anyhow::Result<ComplianceAnalyzer> {
    let analyzer = ComplianceAnalyzer::new(config.analyzer().clone()).with_error_details(true);
    match config.vision() {
        Some(vision) if use_vision => {
            let client = GoogleVisionClient::new(vision)?;
            Ok(analyzer.with_annotator(Arc::new(client)))
        }
        _ => Ok(analyzer),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Check {
            file,
            mime,
            pretty,
            no_vision,
        } => {
            let upload = load_upload(&file, mime.as_deref())?;

            let validator = IngressValidator::new(config.max_upload_size_bytes());
            if let Err(err) = validator.validate_all(&upload.content_type, upload.size()) {
                eprintln!("Rejected: {}", err);
                return Ok(ExitCode::from(EXIT_REJECTED));
            }

            let analyzer = build_analyzer(&config, !no_vision)?;
            let report = analyzer.analyze_or_error_report(&upload).await;
            print_report(&report, pretty)?;

            Ok(ExitCode::from(exit_code(&report)))
        }
    }
}
