//! File I/O error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("no participants loaded")]
    NoParticipants,

    #[error("no draw results to export")]
    EmptyHistory,
}

pub type FileResult<T> = Result<T, FileError>;
