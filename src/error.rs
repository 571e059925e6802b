//! Error types for the sheetsync application

use thiserror::Error;

/// Errors from loading application settings.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
