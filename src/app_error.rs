use thiserror::Error;

use crate::config::errors::ConfigError;
use crate::domain::errors::DomainError;
use crate::services::errors::{FetcherError, PersistenceError, ValidationError};

/// Failures that end a run. Per-token resolution failures never get here.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Fetcher(#[from] FetcherError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
