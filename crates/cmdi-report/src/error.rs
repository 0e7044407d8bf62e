use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid resource name '{name}': {reason}")]
    InvalidResourceName { name: String, reason: &'static str },
    #[error("failed to write document {path}: {message}")]
    DocumentWrite { path: PathBuf, message: String },
    #[error("failed to create archive {path}: {message}")]
    ArchiveCreation { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, ReportError>;
