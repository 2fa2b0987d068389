use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Unable to read config file {0}: {1}")]
    Read(String, String),

    #[error("Unable to parse config file {0}: {1}")]
    Parse(String, String),

    #[error("Invalid multicall address: {0}")]
    InvalidMulticallAddress(String),

    #[error("Source list entry with empty url or filename: {0}")]
    InvalidSource(String),
}
