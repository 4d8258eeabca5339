//! Error types for the glucolog_core library.

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for glucolog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Projection grid parameter error
    #[error("Grid error: {0}")]
    Grid(String),

    /// Glucose projection error
    #[error("Projection error: {0}")]
    Projection(String),
}
