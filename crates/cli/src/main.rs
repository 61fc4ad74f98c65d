//! Credit Scoring CLI
//!
//! A command-line tool for checking the credit scoring service and
//! requesting predictions from it.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{predict, status};

/// Credit Scoring CLI
#[derive(Parser)]
#[command(name = "credit")]
#[command(author, version, about = "CLI for the Credit Scoring API", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via CREDIT_API_URL env var)
    #[arg(long, env = "CREDIT_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show service health
    Health,

    /// List loaded models
    Models,

    /// Show the startup artifact load report
    Artifacts,

    /// Score an application
    Predict {
        /// The six applicant features, in training order
        #[arg(num_args = 6, required = true, allow_negative_numbers = true)]
        features: Vec<f64>,

        /// Model key (logistic_regression, random_forest, gradient_boosting)
        #[arg(long, short)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let client = client::ApiClient::new(&cli.api_url)?;

    match cli.command {
        Commands::Health => status::show_health(&client, cli.format).await?,
        Commands::Models => status::list_models(&client, cli.format).await?,
        Commands::Artifacts => status::show_artifacts(&client, cli.format).await?,
        Commands::Predict { features, model } => {
            predict::predict(&client, features, model, cli.format).await?
        }
    }

    Ok(())
}
