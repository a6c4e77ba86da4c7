//! Application errors.

use thiserror::Error;
use versedeck_core::{BackendError, SessionError, StorageError};
use versedeck_render::MeasureError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Measure(#[from] MeasureError),
    #[error("No backend URL: pass --api or set VERSEDECK_API")]
    MissingApi,
    #[error("Invalid backend URL {url}: {reason}")]
    InvalidApiUrl { url: String, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Input(String),
}
