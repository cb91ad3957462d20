//! Diabetes Survey Predictor CLI
//!
//! A command-line tool for listing the survey questions, encoding answers
//! locally and requesting predictions from the survey server.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{model, survey};
use std::path::PathBuf;

const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Diabetes Survey Predictor CLI
#[derive(Parser)]
#[command(name = "dsq")]
#[command(author, version, about = "CLI for the Diabetes Survey Predictor", long_about = None)]
pub struct Cli {
    /// Survey server URL (can also be set via DSQ_API_URL env var)
    #[arg(long, env = "DSQ_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the survey questions and their accepted answers
    Questions,

    /// Validate and encode answers locally into the model feature vector
    Encode {
        /// JSON file with survey answers, or - for stdin
        #[arg(long, short)]
        input: PathBuf,
    },

    /// Submit answers to the server and show class probabilities
    Predict {
        /// JSON file with survey answers, or - for stdin
        #[arg(long, short)]
        input: PathBuf,
    },

    /// Show the model loaded by the server
    Model,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
            .with_writer(std::io::stderr)
            .init();
    }

    let settings = config::Config::load()?;
    let format = cli
        .format
        .or_else(|| settings.default_format())
        .unwrap_or_default();
    let api_url = cli
        .api_url
        .or(settings.api_url)
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    match cli.command {
        Commands::Questions => survey::show_questions(format)?,
        Commands::Encode { input } => survey::encode_answers(&input, format)?,
        Commands::Predict { input } => {
            let client = client::ApiClient::new(&api_url)?;
            survey::predict(&client, &input, format).await?;
        }
        Commands::Model => {
            let client = client::ApiClient::new(&api_url)?;
            model::show_model(&client, format).await?;
        }
    }

    Ok(())
}
