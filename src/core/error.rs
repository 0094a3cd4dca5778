use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WardenError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("State file corrupt: {0}")]
    StateFormatError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}
