//! Prediction command

use anyhow::Result;
use colored::Colorize;

use crate::client::{ApiClient, PredictRequest};
use crate::output::{
    color_confidence, color_recommendation, format_probability, print_json, print_success,
    OutputFormat,
};

/// Score one application with the requested model
pub async fn predict(
    client: &ApiClient,
    features: Vec<f64>,
    model: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let request = PredictRequest {
        features,
        model_name: model,
    };
    let result = client.predict(&request).await?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Table => {
            print_success(&format!("Scored with {}", result.model_used.cyan()));
            println!();
            println!("Prediction:     {}", result.prediction);
            println!("Probability:    {}", format_probability(result.probability));
            println!("Confidence:     {}", color_confidence(&result.confidence));
            println!(
                "Recommendation: {}",
                color_recommendation(&result.recommendation)
            );
        }
    }

    Ok(())
}
