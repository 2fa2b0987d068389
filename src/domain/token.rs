use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::domain::address::{self, normalize_address};
use crate::domain::errors::DomainError;

/// A single token as it appears in every list this tool reads or writes.
///
/// Deserialization always goes through [`RawTokenRecord`], so an entry in
/// memory has a canonical address and a positive chain id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", try_from = "RawTokenRecord")]
pub struct Token {
    pub chain_id: u64,
    #[serde(with = "address::checksum")]
    pub address: Address,
    pub symbol: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    #[serde(rename = "logoURI", skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
}

/// Identity of a token across lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenKey {
    pub chain_id: u64,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

impl Token {
    /// Entry for a requested token whose metadata is not known yet.
    pub fn unresolved(chain_id: u64, address: Address) -> Self {
        Self {
            chain_id,
            address,
            symbol: String::new(),
            name: String::new(),
            decimals: None,
            logo_uri: None,
        }
    }

    pub fn key(&self) -> TokenKey {
        TokenKey {
            chain_id: self.chain_id,
            address: self.address,
        }
    }

    pub fn is_missing_metadata(&self) -> bool {
        self.symbol.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        !self.symbol.is_empty() && !self.name.is_empty() && self.decimals.is_some()
    }

    pub fn with_metadata(mut self, metadata: &TokenMetadata) -> Self {
        self.symbol = metadata.symbol.clone();
        self.name = metadata.name.clone();
        self.decimals = Some(metadata.decimals);
        self
    }

    pub fn metadata(&self) -> Option<TokenMetadata> {
        if !self.is_complete() {
            return None;
        }
        Some(TokenMetadata {
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            decimals: self.decimals?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(u64),
    Text(String),
}

/// Loosely-typed token record as found in third-party lists. Unknown fields
/// are dropped; numeric fields may arrive as strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTokenRecord {
    pub chain_id: Option<NumberOrString>,
    pub address: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub decimals: Option<NumberOrString>,
    #[serde(rename = "logoURI", default)]
    pub logo_uri: Option<String>,
}

impl TryFrom<RawTokenRecord> for Token {
    type Error = DomainError;

    fn try_from(raw: RawTokenRecord) -> Result<Self, Self::Error> {
        let chain_id = parse_chain_id(raw.chain_id)?;
        let address = normalize_address(raw.address.as_deref().unwrap_or_default())?;
        let decimals = parse_decimals(raw.decimals)?;

        Ok(Self {
            chain_id,
            address,
            symbol: raw.symbol.unwrap_or_default(),
            name: raw.name.unwrap_or_default(),
            decimals,
            logo_uri: raw.logo_uri.filter(|uri| !uri.is_empty()),
        })
    }
}

pub fn parse_chain_id(raw: Option<NumberOrString>) -> Result<u64, DomainError> {
    let chain_id = match raw {
        Some(NumberOrString::Number(id)) => id,
        Some(NumberOrString::Text(text)) => text
            .trim()
            .parse::<u64>()
            .map_err(|_| DomainError::InvalidChainId(text.clone()))?,
        None => return Err(DomainError::InvalidChainId("missing".to_string())),
    };

    if chain_id == 0 {
        return Err(DomainError::InvalidChainId(chain_id.to_string()));
    }

    Ok(chain_id)
}

fn parse_decimals(raw: Option<NumberOrString>) -> Result<Option<u8>, DomainError> {
    match raw {
        None => Ok(None),
        Some(NumberOrString::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(NumberOrString::Text(text)) => text
            .trim()
            .parse::<u8>()
            .map(Some)
            .map_err(|_| DomainError::InvalidDecimals(text)),
        Some(NumberOrString::Number(value)) => u8::try_from(value)
            .map(Some)
            .map_err(|_| DomainError::InvalidDecimals(value.to_string())),
    }
}
