use std::cmp::Ordering;

use crate::config::constants::{LIST_KEYWORDS, LIST_LOGO_URI};
use crate::domain::{timestamp_now, Token, TokenList, Version};
use crate::services::merge::PerChainTokens;

/// Assembles a token list from per-chain token sets.
///
/// Tokens are ordered by chain id, then by case-insensitive symbol. The sort
/// is stable so equal keys keep their merge order.
pub fn build_list(tokens_by_chain: &PerChainTokens, name: &str, version: Version) -> TokenList {
    let mut tokens: Vec<Token> = tokens_by_chain.values().flatten().cloned().collect();
    tokens.sort_by(compare_tokens);

    TokenList {
        name: name.to_string(),
        timestamp: timestamp_now(),
        version,
        tags: serde_json::Map::new(),
        logo_uri: LIST_LOGO_URI.to_string(),
        keywords: LIST_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        tokens,
    }
}

pub fn compare_tokens(a: &Token, b: &Token) -> Ordering {
    a.chain_id
        .cmp(&b.chain_id)
        .then_with(|| a.symbol.to_lowercase().cmp(&b.symbol.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::address::normalize_address;
    use std::collections::{BTreeMap, HashSet};

    fn token(chain_id: u64, byte: u8, symbol: &str) -> Token {
        Token {
            chain_id,
            address: normalize_address(&format!("0x{}", format!("{byte:02x}").repeat(20))).unwrap(),
            symbol: symbol.to_string(),
            name: format!("{symbol} Token"),
            decimals: Some(18),
            logo_uri: None,
        }
    }

    fn version() -> Version {
        Version {
            major: 1,
            minor: 2,
            patch: 3,
        }
    }

    #[test]
    fn test_sorted_by_chain_then_symbol() {
        let mut partition = BTreeMap::new();
        partition.insert(56, vec![token(56, 1, "cake"), token(56, 2, "BUSD")]);
        partition.insert(1, vec![token(1, 3, "weth"), token(1, 4, "DAI"), token(1, 5, "aave")]);

        let list = build_list(&partition, "Test List", version());

        let order: Vec<(u64, &str)> = list.tokens.iter().map(|t| (t.chain_id, t.symbol.as_str())).collect();
        assert_eq!(
            order,
            vec![(1, "aave"), (1, "DAI"), (1, "weth"), (56, "BUSD"), (56, "cake")]
        );

        for pair in list.tokens.windows(2) {
            assert_ne!(compare_tokens(&pair[0], &pair[1]), Ordering::Greater);
        }
    }

    #[test]
    fn test_equal_symbols_keep_merge_order() {
        let mut partition = BTreeMap::new();
        partition.insert(1, vec![token(1, 1, "usdc"), token(1, 2, "USDC"), token(1, 3, "Usdc")]);

        let list = build_list(&partition, "Test List", version());

        let bytes: Vec<u8> = list.tokens.iter().map(|t| t.address.0[0]).collect();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_metadata_stamped() {
        let mut partition = BTreeMap::new();
        partition.insert(1, vec![token(1, 1, "DAI")]);

        let list = build_list(&partition, "Test List", version());

        assert_eq!(list.name, "Test List");
        assert_eq!(list.version, version());
        assert_eq!(list.logo_uri, LIST_LOGO_URI);
        assert!(list.tags.is_empty());

        let keywords: HashSet<&String> = list.keywords.iter().collect();
        assert_eq!(keywords.len(), list.keywords.len());
    }
}
