use crate::domain::errors::DomainError;
use alloy::primitives::{address, Address};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Pseudo-address token lists use for a chain's native currency.
pub const NATIVE_ADDRESS: Address = address!("0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Multicall3 is deployed at the same address on every supported network.
pub const MULTICALL3_ADDRESS: Address = address!("0xcA11bde05977b3631167028862bE2a173976CA11");

pub const NATIVE_DECIMALS: u8 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u64)]
pub enum EvmNetwork {
    Eth = 1,
    Optimism = 10,
    Bsc = 56,
    Polygon = 137,
    Fantom = 250,
    Base = 8453,
    Arbitrum = 42161,
    Avalanche = 43114,
}

impl EvmNetwork {
    pub const ALL: [EvmNetwork; 8] = [
        EvmNetwork::Eth,
        EvmNetwork::Optimism,
        EvmNetwork::Bsc,
        EvmNetwork::Polygon,
        EvmNetwork::Fantom,
        EvmNetwork::Base,
        EvmNetwork::Arbitrum,
        EvmNetwork::Avalanche,
    ];

    pub fn chain_id(self) -> u64 {
        self as u64
    }

    pub fn native_symbol(self) -> &'static str {
        match self {
            EvmNetwork::Eth | EvmNetwork::Optimism | EvmNetwork::Base | EvmNetwork::Arbitrum => {
                "ETH"
            }
            EvmNetwork::Bsc => "BNB",
            EvmNetwork::Polygon => "MATIC",
            EvmNetwork::Fantom => "FTM",
            EvmNetwork::Avalanche => "AVAX",
        }
    }
}

impl TryFrom<u64> for EvmNetwork {
    type Error = DomainError;

    fn try_from(id: u64) -> Result<Self, DomainError> {
        EvmNetwork::ALL
            .into_iter()
            .find(|network| network.chain_id() == id)
            .ok_or_else(|| DomainError::InvalidChainId(id.to_string()))
    }
}

impl Display for EvmNetwork {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.chain_id())
    }
}

/// Chains a run publishes, keyed by chain id, valued by the file stem used for
/// the per-chain output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainRegistry {
    chains: BTreeMap<u64, String>,
}

impl ChainRegistry {
    pub fn contains(&self, chain_id: u64) -> bool {
        self.chains.contains_key(&chain_id)
    }

    pub fn name(&self, chain_id: u64) -> Option<&str> {
        self.chains.get(&chain_id).map(String::as_str)
    }

    pub fn chain_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.chains.keys().copied()
    }
}

impl<'de> Deserialize<'de> for ChainRegistry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        let mut chains = BTreeMap::new();
        for (id, name) in raw {
            let chain_id = match id.parse::<u64>() {
                Ok(chain_id) if chain_id > 0 => chain_id,
                _ => return Err(serde::de::Error::custom(DomainError::InvalidChainId(id))),
            };
            chains.insert(chain_id, name);
        }
        Ok(Self { chains })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_from_chain_id() {
        assert_eq!(EvmNetwork::try_from(137), Ok(EvmNetwork::Polygon));
        assert_eq!(
            EvmNetwork::try_from(999),
            Err(DomainError::InvalidChainId("999".to_string()))
        );
    }

    #[test]
    fn test_registry_parses_string_keys() {
        let registry: ChainRegistry =
            serde_json::from_str(r#"{"1": "ethereum", "56": "bsc"}"#).unwrap();
        assert!(registry.contains(1));
        assert_eq!(registry.name(56), Some("bsc"));
        assert_eq!(registry.chain_ids().collect::<Vec<_>>(), vec![1, 56]);
    }

    #[test]
    fn test_registry_rejects_bad_chain_id() {
        assert!(serde_json::from_str::<ChainRegistry>(r#"{"eth": "ethereum"}"#).is_err());
        assert!(serde_json::from_str::<ChainRegistry>(r#"{"0": "zero"}"#).is_err());
    }
}
