use alloy::primitives::Address;
use serde::{Deserialize, Deserializer, Serializer};

use crate::domain::errors::DomainError;

/// Parses a raw EVM address into its canonical form.
///
/// Single-case input is accepted as-is; mixed-case input must carry a valid
/// EIP-55 checksum. Normalizing an already checksummed string is a no-op.
pub fn normalize_address(raw: &str) -> Result<Address, DomainError> {
    let trimmed = raw.trim();
    let invalid = || DomainError::InvalidAddress(raw.to_string());

    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(invalid)?;

    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());

    if has_lower && has_upper {
        let prefixed = format!("0x{hex}");
        Address::parse_checksummed(&prefixed, None).map_err(|_| invalid())
    } else {
        hex.parse::<Address>().map_err(|_| invalid())
    }
}

/// EIP-55 string form of an address.
pub fn checksummed(address: &Address) -> String {
    address.to_checksum(None)
}

/// Serde adapter: addresses go out checksummed and come in through
/// [`normalize_address`].
pub mod checksum {
    use super::*;

    pub fn serialize<S>(address: &Address, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&checksummed(address))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Address, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        normalize_address(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDT: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";

    #[test]
    fn test_normalize_lowercase() {
        let address = normalize_address(&USDT.to_lowercase()).unwrap();
        assert_eq!(checksummed(&address), USDT);
    }

    #[test]
    fn test_normalize_uppercase_body() {
        let raw = format!("0x{}", USDT[2..].to_uppercase());
        let address = normalize_address(&raw).unwrap();
        assert_eq!(checksummed(&address), USDT);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = checksummed(&normalize_address(USDT).unwrap());
        let twice = checksummed(&normalize_address(&once).unwrap());
        assert_eq!(once, twice);
        assert_eq!(once, USDT);
    }

    #[test]
    fn test_bad_checksum_rejected() {
        // flip case of one letter
        let bad = "0xDAC17F958D2ee523a2206206994597C13D831ec7";
        assert_eq!(
            normalize_address(bad),
            Err(DomainError::InvalidAddress(bad.to_string()))
        );
    }

    #[test]
    fn test_malformed_rejected() {
        for raw in ["", "0x", "dAC17F958D2ee523a2206206994597C13D831ec7", "0x1234", "0xzz17f958d2ee523a2206206994597c13d831ec7"] {
            assert!(normalize_address(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        let address = normalize_address(&format!("  {}\n", USDT.to_lowercase())).unwrap();
        assert_eq!(checksummed(&address), USDT);
    }
}
