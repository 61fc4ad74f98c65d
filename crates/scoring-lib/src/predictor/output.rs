//! Prediction output labeling
//!
//! Turns raw model outputs into the confidence label and the business
//! recommendation attached to every prediction.

use crate::models::{Confidence, Recommendation};

/// Score at or above which confidence is high
pub const HIGH_CONFIDENCE: f64 = 0.8;

/// Score at or above which confidence is medium
pub const MEDIUM_CONFIDENCE: f64 = 0.6;

/// Prediction at or above which approval is recommended
pub const APPROVE_THRESHOLD: f64 = 0.7;

/// Prediction at or above which the application needs a careful review
pub const REVIEW_THRESHOLD: f64 = 0.4;

/// Score used for confidence: the probability when the model has one,
/// the raw prediction otherwise
pub fn score(prediction: f64, probability: Option<f64>) -> f64 {
    probability.unwrap_or(prediction)
}

pub fn confidence(score: f64) -> Confidence {
    if score >= HIGH_CONFIDENCE {
        Confidence::High
    } else if score >= MEDIUM_CONFIDENCE {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Recommendation is derived from the prediction, never the probability
pub fn recommendation(prediction: f64) -> Recommendation {
    if prediction >= APPROVE_THRESHOLD {
        Recommendation::Approve
    } else if prediction >= REVIEW_THRESHOLD {
        Recommendation::Review
    } else {
        Recommendation::Decline
    }
}
