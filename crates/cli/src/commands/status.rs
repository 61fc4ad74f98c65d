//! Service status commands: health, models and artifact load report

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use crate::client::{ApiClient, ArtifactEntry};
use crate::output::{color_status, print_info, print_json, print_table, print_warning, OutputFormat};

/// Row for models table
#[derive(Tabled, Serialize)]
struct ModelRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Name")]
    name: String,
}

/// Row for artifacts table
#[derive(Tabled)]
struct ArtifactRow {
    #[tabled(rename = "Artifact")]
    artifact: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&ArtifactEntry> for ArtifactRow {
    fn from(entry: &ArtifactEntry) -> Self {
        let detail = match (&entry.checksum, &entry.error) {
            (_, Some(error)) => error.clone(),
            (Some(checksum), None) => checksum.chars().take(12).collect(),
            (None, None) => "-".to_string(),
        };
        Self {
            artifact: entry.artifact.clone(),
            status: color_status(&entry.status),
            path: entry.path.clone().unwrap_or_else(|| "-".to_string()),
            detail,
        }
    }
}

/// Show service health
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health = client.health().await?;

    match format {
        OutputFormat::Json => print_json(&health),
        OutputFormat::Table => {
            println!("{}", "Service Health".bold());
            println!("{}", "=".repeat(40));
            println!("Message:  {}", health.message.cyan());
            if let Some(status) = &health.status {
                println!("Status:   {}", color_status(status));
            }
            println!("Models:   {}", health.models_loaded);

            if health.available_models.is_empty() {
                println!();
                print_warning("No models loaded; predictions will be refused");
            } else {
                println!("Available: {}", health.available_models.join(", "));
            }
        }
    }

    Ok(())
}

/// List the models the service can score with
pub async fn list_models(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let list = client.models().await?;

    let rows: Vec<ModelRow> = list
        .models
        .into_iter()
        .map(|m| ModelRow {
            key: m.key,
            name: m.name,
        })
        .collect();

    print_table(&rows, format);
    Ok(())
}

/// Show what happened to each artifact at startup
pub async fn show_artifacts(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let report = client.artifacts().await?;

    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Table => {
            println!("{}", "Artifact Load Report".bold());
            println!("{}", "=".repeat(60));

            if report.artifacts.is_empty() {
                print_warning("Service reported no artifacts");
                return Ok(());
            }

            let rows: Vec<ArtifactRow> = report.artifacts.iter().map(ArtifactRow::from).collect();
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);

            let failed = report
                .artifacts
                .iter()
                .filter(|a| a.status == "failed")
                .count();
            if failed > 0 {
                print_warning(&format!("{} artifact(s) failed to load", failed));
            } else {
                print_info("No artifact failures");
            }
        }
    }

    Ok(())
}
