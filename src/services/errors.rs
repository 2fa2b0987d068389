use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum FetcherError {
    #[error("Source list {0} is unavailable: {1}")]
    SourceUnavailable(String, String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolverError {
    #[error("Provider is not configured for network {0}")]
    ProviderNotConfigured(u64),

    #[error("Unable to resolve metadata of {1} on network {0}: {2}")]
    MetadataResolutionFailed(u64, String, String),
}

#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Token list {0} does not conform to the token list schema: {errors}", errors = .1.join("; "))]
    SchemaValidationFailed(String, Vec<String>),
}

#[derive(Debug, Clone, Error)]
pub enum PersistenceError {
    #[error("Unable to read {0}: {1}")]
    Read(String, String),

    #[error("Unable to write {0}: {1}")]
    Write(String, String),

    #[error("Unable to parse {0}: {1}")]
    Parse(String, String),
}
