use std::path::PathBuf;
use thiserror::Error;

/// Failures that are caller-contract violations rather than document-quality
/// findings. Everything a document gets wrong is reported as an `Issue`.
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Invalid document type: {requested}. Valid types: {}", valid.join(", "))]
    InvalidDocumentType {
        requested: String,
        valid: Vec<String>,
    },

    #[error("Invalid review configuration: {0}")]
    Config(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
