use std::collections::HashSet;

use crate::domain::{ChainRegistry, Token, TokenKey, TokenList, Version};
use crate::services::list_builder::build_list;
use crate::services::merge::partition_by_chain;

/// Fiat codes that mark a symbol as a stablecoin when contained in it.
const FIAT_CODES: [&str; 12] = [
    "USD", "EUR", "GBP", "CHF", "JPY", "CNY", "SGD", "AUD", "CAD", "TRY", "BRL", "KRW",
];

/// Stablecoins whose symbols carry no fiat code.
const KNOWN_STABLECOINS: [&str; 14] = [
    "DAI", "FRAX", "MIM", "FEI", "RAI", "MAI", "DOLA", "LUSD", "SAI", "XSGD", "AGEUR", "EURS", "UST", "GHO",
];

pub fn is_stablecoin(symbol: &str) -> bool {
    let symbol = symbol.to_uppercase();
    FIAT_CODES.iter().any(|code| symbol.contains(code)) || KNOWN_STABLECOINS.contains(&symbol.as_str())
}

/// Builds the stablecoin list from the merged set plus an optional reference
/// list. Merged entries win collisions.
pub fn build_stable_list(
    merged: &[Token],
    reference: &[Token],
    chains: &ChainRegistry,
    name: &str,
    version: Version,
) -> TokenList {
    let mut seen: HashSet<TokenKey> = HashSet::new();
    let stables: Vec<Token> = merged
        .iter()
        .chain(reference.iter())
        .filter(|token| !token.is_missing_metadata() && is_stablecoin(&token.symbol))
        .filter(|token| seen.insert(token.key()))
        .cloned()
        .collect();

    tracing::info!(tokens = stables.len(), "stablecoins selected");

    build_list(&partition_by_chain(stables, chains), name, version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::address::normalize_address;

    fn token(chain_id: u64, byte: u8, symbol: &str) -> Token {
        Token {
            chain_id,
            address: normalize_address(&format!("0x{}", format!("{byte:02x}").repeat(20))).unwrap(),
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            decimals: Some(18),
            logo_uri: None,
        }
    }

    #[test]
    fn test_is_stablecoin() {
        for symbol in ["USDC", "usdt", "crvUSD", "EURe", "jGBP", "DAI", "frax", "agEUR"] {
            assert!(is_stablecoin(symbol), "{symbol}");
        }
        for symbol in ["WETH", "WBTC", "LINK", "DAIX"] {
            assert!(!is_stablecoin(symbol), "{symbol}");
        }
    }

    #[test]
    fn test_build_stable_list_filters_dedups_and_groups() {
        let chains: ChainRegistry = serde_json::from_str(r#"{"1": "ethereum", "56": "bsc"}"#).unwrap();
        let merged = vec![token(1, 1, "WETH"), token(1, 2, "USDC"), token(56, 3, "BUSD")];
        let reference = vec![token(1, 2, "USDC.e"), token(1, 4, "DAI"), token(250, 5, "fUSDT")];

        let list = build_stable_list(
            &merged,
            &reference,
            &chains,
            "Stable",
            Version {
                major: 1,
                minor: 0,
                patch: 0,
            },
        );

        let symbols: Vec<&str> = list.tokens.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["DAI", "USDC", "BUSD"]);
    }
}
