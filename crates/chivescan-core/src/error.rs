use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Achievement catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Unsupported environment: {0}")]
    UnsupportedEnvironment(String),

    #[error("Invalid scan configuration: {0}")]
    InvalidConfig(String),

    #[error("Capture failed for {context}: {message}")]
    Capture { context: String, message: String },

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Input emulation failed: {0}")]
    Input(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
