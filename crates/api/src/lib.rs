//! Credit scoring HTTP service
//!
//! Wires the scoring library into an axum router. The binary in `main.rs`
//! loads configuration and artifacts, then serves this router.

pub mod api;
pub mod config;
