//! Prediction engine

mod dispatcher;
pub mod output;

pub use dispatcher::InferenceDispatcher;
pub use output::{APPROVE_THRESHOLD, HIGH_CONFIDENCE, MEDIUM_CONFIDENCE, REVIEW_THRESHOLD};
