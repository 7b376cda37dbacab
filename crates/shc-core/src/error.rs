//! Error types for the shc-core library.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the shc library.
///
/// Only boundary-level failures live here. A field or row that fails to match
/// during extraction is never an error; it is simply absent from the record.
#[derive(Error, Debug)]
pub enum ShcError {
    /// The caller sent an unusable upload.
    #[error(transparent)]
    Input(#[from] InputError),

    /// The OCR collaborator failed or found nothing.
    #[error(transparent)]
    Ocr(#[from] OcrError),

    /// Configuration could not be loaded or saved.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else that escaped to the request boundary.
    #[error("server error: {0}")]
    Internal(String),
}

impl ShcError {
    /// HTTP-style status code for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            ShcError::Input(_) => 400,
            ShcError::Ocr(OcrError::NoText) => 400,
            ShcError::Ocr(_) => 500,
            ShcError::Config(_) | ShcError::Io(_) | ShcError::Internal(_) => 500,
        }
    }

    /// Whether the failure was caused by the caller rather than the service.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Render as the `{"error": ...}` response body.
    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }
}

/// JSON body returned for failed requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Errors related to the uploaded file.
#[derive(Error, Debug)]
pub enum InputError {
    /// No file was attached to the request.
    #[error("No file part")]
    MissingFile,

    /// A file was attached with an empty filename.
    #[error("No selected file")]
    EmptyFilename,

    /// The file contained no bytes.
    #[error("Uploaded file is empty")]
    EmptyFile,

    /// The bytes could not be decoded as an image.
    #[error("Invalid image file: {0}")]
    InvalidImage(String),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The engine ran but produced no usable text.
    #[error("No text detected in the image")]
    NoText,

    /// Failed to load OCR models.
    #[error("failed to load OCR model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Image preprocessing failed.
    #[error("preprocessing failed: {0}")]
    Preprocessing(String),
}

/// Errors related to configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid configuration JSON.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for the shc library.
pub type Result<T> = std::result::Result<T, ShcError>;
