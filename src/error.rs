//! Error types for the onedrive_client crate.

use thiserror::Error;

/// Errors that can occur when interacting with OneDrive.
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to decode response JSON: {0}")]
    DecodeError(#[from] serde_json::Error),

    #[error("Item has no download URL: {0}")]
    MissingDownloadUrl(String),
}

/// Result type alias for DriveError.
pub type Result<T> = std::result::Result<T, DriveError>;
