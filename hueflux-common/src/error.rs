use thiserror::Error;

/// Common error type for HueFlux components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hub error: {0}")]
    Hub(String),

    #[error("Sink rejected write: {0}")]
    Sink(String),
}

/// Result type alias using HueFlux's Error.
pub type Result<T> = std::result::Result<T, Error>;
