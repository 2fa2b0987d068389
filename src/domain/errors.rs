use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Chain id should be a positive integer, got: {0}")]
    InvalidChainId(String),

    #[error("Invalid decimals value: {0}")]
    InvalidDecimals(String),

    #[error("Version should be <major>.<minor>.<patch>, got: {0}")]
    InvalidVersion(String),
}
