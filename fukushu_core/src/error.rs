//! Error types for the fukushu_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fukushu_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Review store error
    #[error("Store error: {0}")]
    Store(String),

    /// Lesson recommendation error
    #[error("Recommendation error: {0}")]
    Recommend(String),

    /// Upstream review API error
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Lesson generation error
    #[error("Generation error: {0}")]
    Generate(String),

    /// User seeding error
    #[error("Seed error: {0}")]
    Seed(String),
}
