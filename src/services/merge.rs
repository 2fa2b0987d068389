use std::collections::{BTreeMap, HashSet};

use alloy::primitives::Address;

use crate::config::pipeline_config::{DedupKey, MergePolicy, SourcePriority};
use crate::domain::{ChainRegistry, Token};
use crate::services::token_list_fetcher::SourceList;

pub type PerChainTokens = BTreeMap<u64, Vec<Token>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum MergeKey {
    ChainAndAddress(u64, Address),
    Address(Address),
}

impl MergeKey {
    fn of(token: &Token, dedup_key: DedupKey) -> Self {
        match dedup_key {
            DedupKey::ChainAndAddress => MergeKey::ChainAndAddress(token.chain_id, token.address),
            DedupKey::Address => MergeKey::Address(token.address),
        }
    }
}

/// Combines source lists and community requests into per-chain token sets.
///
/// Entries are concatenated in priority order and the first entry seen for a
/// key wins. Oversized symbols (and names, when bounded) are rejected, and
/// chains absent from the registry are left out.
pub fn merge(
    sources: &[SourceList],
    community: &[Token],
    policy: &MergePolicy,
    chains: &ChainRegistry,
) -> PerChainTokens {
    let source_tokens = sources.iter().flat_map(|list| list.tokens.iter());

    let ordered: Vec<&Token> = match policy.source_priority {
        SourcePriority::SourcesFirst => source_tokens.chain(community.iter()).collect(),
        SourcePriority::CommunityFirst => community.iter().chain(source_tokens).collect(),
    };

    let total = ordered.len();
    let unique = dedup(ordered, policy.dedup_key);
    let unique_len = unique.len();

    let accepted: Vec<Token> = unique
        .into_iter()
        .filter(|token| passes_length_filter(token, policy))
        .cloned()
        .collect();

    let partition = partition_by_chain(accepted, chains);

    tracing::info!(
        total,
        unique = unique_len,
        published = partition.values().map(Vec::len).sum::<usize>(),
        chains = partition.len(),
        "token lists merged"
    );

    partition
}

fn dedup(tokens: Vec<&Token>, dedup_key: DedupKey) -> Vec<&Token> {
    let mut seen: HashSet<MergeKey> = HashSet::with_capacity(tokens.len());
    tokens
        .into_iter()
        .filter(|token| seen.insert(MergeKey::of(token, dedup_key)))
        .collect()
}

/// Spam tokens tend to use long confusable symbols.
fn passes_length_filter(token: &Token, policy: &MergePolicy) -> bool {
    if token.symbol.chars().count() > policy.max_symbol_length {
        tracing::debug!(chain_id = token.chain_id, symbol = %token.symbol, "symbol too long");
        return false;
    }

    match policy.max_name_length {
        Some(max) if token.name.chars().count() > max => {
            tracing::debug!(chain_id = token.chain_id, name = %token.name, "name too long");
            false
        }
        _ => true,
    }
}

/// Groups tokens by chain, keeping their relative order. Registered chains
/// with no tokens still get an (empty) entry.
pub fn partition_by_chain(tokens: Vec<Token>, chains: &ChainRegistry) -> PerChainTokens {
    let mut partition: PerChainTokens = chains.chain_ids().map(|id| (id, Vec::new())).collect();

    let mut unregistered = 0;
    for token in tokens {
        if !chains.contains(token.chain_id) {
            unregistered += 1;
            continue;
        }
        partition.entry(token.chain_id).or_default().push(token);
    }

    if unregistered > 0 {
        tracing::debug!(tokens = unregistered, "tokens on unregistered chains skipped");
    }

    partition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::pipeline_config::SourceDescriptor;
    use crate::domain::address::normalize_address;

    const AA: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const BB: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn token(chain_id: u64, address: &str, symbol: &str) -> Token {
        Token {
            chain_id,
            address: normalize_address(address).unwrap(),
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            decimals: Some(18),
            logo_uri: None,
        }
    }

    fn source(name: &str, tokens: Vec<Token>) -> SourceList {
        SourceList {
            descriptor: SourceDescriptor {
                url: format!("https://lists.example/{name}.json"),
                filename: name.to_string(),
                priority: None,
            },
            tokens,
        }
    }

    fn chains() -> ChainRegistry {
        serde_json::from_str(r#"{"1": "ethereum", "56": "bsc"}"#).unwrap()
    }

    fn policy(max_symbol_length: usize) -> MergePolicy {
        MergePolicy {
            max_symbol_length,
            max_name_length: None,
            ..MergePolicy::default()
        }
    }

    #[test]
    fn test_case_insensitive_address_first_source_wins() {
        let a = source("a", vec![token(1, &AA.to_uppercase().replacen("0X", "0x", 1), "FOO")]);
        let b = source("b", vec![token(1, AA, "FOOX")]);

        let merged = merge(&[a, b], &[], &policy(8), &chains());

        assert_eq!(merged[&1].len(), 1);
        assert_eq!(merged[&1][0].symbol, "FOO");
    }

    #[test]
    fn test_same_address_on_different_chains_kept() {
        let a = source("a", vec![token(1, AA, "FOO"), token(56, AA, "FOO")]);

        let merged = merge(&[a], &[], &policy(8), &chains());

        assert_eq!(merged[&1].len(), 1);
        assert_eq!(merged[&56].len(), 1);
    }

    #[test]
    fn test_address_only_dedup_collapses_chains() {
        let a = source("a", vec![token(1, AA, "FOO"), token(56, AA, "FOO")]);
        let policy = MergePolicy {
            dedup_key: DedupKey::Address,
            ..policy(8)
        };

        let merged = merge(&[a], &[], &policy, &chains());

        assert_eq!(merged[&1].len(), 1);
        assert!(merged[&56].is_empty());
    }

    #[test]
    fn test_symbol_length_filter() {
        let a = source("a", vec![token(1, AA, "ABCDEFGHI"), token(1, BB, "ABCDEFGH")]);

        let merged = merge(&[a], &[], &policy(8), &chains());

        assert_eq!(merged[&1].len(), 1);
        assert_eq!(merged[&1][0].symbol, "ABCDEFGH");
    }

    #[test]
    fn test_name_length_filter() {
        let mut long_name = token(1, AA, "FOO");
        long_name.name = "A very long token name".to_string();
        let policy = MergePolicy {
            max_name_length: Some(14),
            ..policy(8)
        };

        let merged = merge(&[source("a", vec![long_name, token(1, BB, "BAR")])], &[], &policy, &chains());

        assert_eq!(merged[&1].len(), 1);
        assert_eq!(merged[&1][0].symbol, "BAR");
    }

    #[test]
    fn test_community_priority() {
        let a = source("a", vec![token(1, AA, "SRC")]);
        let community = vec![token(1, AA, "COMM"), token(1, BB, "NEW")];

        let sources_first = merge(&[a.clone()], &community, &policy(8), &chains());
        assert_eq!(sources_first[&1][0].symbol, "SRC");
        assert_eq!(sources_first[&1][1].symbol, "NEW");

        let community_first = MergePolicy {
            source_priority: SourcePriority::CommunityFirst,
            ..policy(8)
        };
        let merged = merge(&[a], &community, &community_first, &chains());
        assert_eq!(merged[&1][0].symbol, "COMM");
        assert_eq!(merged[&1].len(), 2);
    }

    #[test]
    fn test_unregistered_chain_excluded() {
        let a = source("a", vec![token(1, AA, "FOO"), token(250, BB, "FTMX")]);

        let merged = merge(&[a], &[], &policy(8), &chains());

        assert!(!merged.contains_key(&250));
        assert_eq!(merged.values().map(Vec::len).sum::<usize>(), 1);
    }

    #[test]
    fn test_merge_with_itself_is_idempotent() {
        let a = source("a", vec![token(1, AA, "FOO"), token(56, BB, "BAR"), token(1, BB, "BAZ")]);

        let once = merge(&[a.clone()], &[], &policy(8), &chains());
        let twice = merge(&[a.clone(), a], &[], &policy(8), &chains());

        assert_eq!(once, twice);
    }
}
