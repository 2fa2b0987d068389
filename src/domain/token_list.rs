use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::token::Token;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Version of this tool, stamped into every list it publishes.
    pub fn current() -> Result<Self, DomainError> {
        env!("CARGO_PKG_VERSION").parse()
    }
}

impl FromStr for Version {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidVersion(s.to_string());
        let parts: Vec<u64> = s
            .trim()
            .split('.')
            .map(|part| part.parse::<u64>().map_err(|_| invalid()))
            .collect::<Result<_, _>>()?;

        match parts.as_slice() {
            [major, minor, patch] => Ok(Self {
                major: *major,
                minor: *minor,
                patch: *patch,
            }),
            _ => Err(invalid()),
        }
    }
}

/// Published token list document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenList {
    pub name: String,
    pub timestamp: String,
    pub version: Version,
    pub tags: serde_json::Map<String, serde_json::Value>,
    #[serde(rename = "logoURI")]
    pub logo_uri: String,
    pub keywords: Vec<String>,
    pub tokens: Vec<Token>,
}

/// ISO-8601 UTC timestamp with millisecond precision.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        assert_eq!(
            "2.10.3".parse::<Version>(),
            Ok(Version {
                major: 2,
                minor: 10,
                patch: 3
            })
        );
        assert!("2.10".parse::<Version>().is_err());
        assert!("2.x.3".parse::<Version>().is_err());
        assert!("1.2.3.4".parse::<Version>().is_err());
    }

    #[test]
    fn test_current_version_matches_package() {
        assert!(Version::current().is_ok());
    }

    #[test]
    fn test_timestamp_format() {
        let ts = timestamp_now();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
