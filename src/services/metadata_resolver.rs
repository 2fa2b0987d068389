use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
    time::{Duration, Instant},
};

use alloy::primitives::Address;
use async_trait::async_trait;
use futures::{stream, StreamExt};

use crate::{
    config::{constants::RETRY_BASE_DELAY_MS, pipeline_config::UnresolvedPolicy},
    domain::{EvmNetwork, Token, TokenKey, TokenMetadata, NATIVE_ADDRESS, NATIVE_DECIMALS},
    services::{errors::ResolverError, retry::with_backoff},
};

/// Reads token metadata from chain.
#[async_trait]
pub trait MetadataReader: Send + Sync {
    /// Whether a read endpoint is configured for the chain.
    fn supports_chain(&self, chain_id: u64) -> bool;

    async fn read_metadata(&self, chain_id: u64, address: Address) -> Result<TokenMetadata, ResolverError>;
}

#[derive(Debug)]
pub struct Resolution {
    pub tokens: Vec<Token>,
    pub resolved: usize,
    pub failed: Vec<(TokenKey, ResolverError)>,
}

pub struct MetadataResolver<R> {
    reader: Arc<R>,
    concurrency: usize,
    retries: u32,
    retry_delay: Duration,
    policy: UnresolvedPolicy,
}

/// Metadata of a chain's native currency under the sentinel address.
pub fn native_metadata(chain_id: u64, address: Address) -> Option<TokenMetadata> {
    if address != NATIVE_ADDRESS {
        return None;
    }
    let network = EvmNetwork::try_from(chain_id).ok()?;

    Some(TokenMetadata {
        symbol: network.native_symbol().to_string(),
        name: network.native_symbol().to_string(),
        decimals: NATIVE_DECIMALS,
    })
}

/// Copies metadata from `known` onto entries that lack it, matching on
/// `(chain id, address)`. Entries that already have metadata are untouched.
pub fn fill_from_known(tokens: Vec<Token>, known: &[Token]) -> Vec<Token> {
    let lookup: HashMap<TokenKey, (TokenMetadata, Option<&String>)> = known
        .iter()
        .filter_map(|token| {
            token
                .metadata()
                .map(|metadata| (token.key(), (metadata, token.logo_uri.as_ref())))
        })
        .collect();

    tokens
        .into_iter()
        .map(|token| {
            if !token.is_missing_metadata() {
                return token;
            }
            match lookup.get(&token.key()) {
                Some((metadata, logo_uri)) => {
                    let mut filled = token.with_metadata(metadata);
                    filled.logo_uri = filled.logo_uri.or_else(|| logo_uri.cloned());
                    filled
                }
                None => token,
            }
        })
        .collect()
}

/// Rejects on-chain metadata a published list cannot carry: symbols must be
/// 1-20 characters without whitespace, names 1-60 characters on one line.
pub fn check_publishable(key: TokenKey, metadata: TokenMetadata) -> Result<TokenMetadata, ResolverError> {
    let rejected =
        |reason: &str| ResolverError::MetadataResolutionFailed(key.chain_id, key.address.to_string(), reason.to_string());

    let symbol_len = metadata.symbol.chars().count();
    if !(1..=20).contains(&symbol_len) || metadata.symbol.chars().any(char::is_whitespace) {
        return Err(rejected("unpublishable symbol"));
    }

    let name_len = metadata.name.chars().count();
    if !(1..=60).contains(&name_len)
        || metadata.name.trim().is_empty()
        || metadata.name.chars().any(|c| c != ' ' && c.is_whitespace())
    {
        return Err(rejected("unpublishable name"));
    }

    Ok(metadata)
}

impl<R: MetadataReader> MetadataResolver<R> {
    pub fn new(reader: Arc<R>, concurrency: usize, retries: u32, policy: UnresolvedPolicy) -> Self {
        Self {
            reader,
            concurrency: concurrency.max(1),
            retries,
            retry_delay: Duration::from_millis(RETRY_BASE_DELAY_MS),
            policy,
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Fills symbol, name and decimals of every entry with an empty symbol.
    ///
    /// A failed read never aborts the batch; the entry is kept with empty
    /// fields or dropped according to the configured [`UnresolvedPolicy`].
    pub async fn resolve_missing(&self, tokens: Vec<Token>) -> Resolution {
        let t0 = Instant::now();

        let mut pending: Vec<TokenKey> = Vec::new();
        let mut seen: HashSet<TokenKey> = HashSet::new();
        for token in tokens.iter().filter(|token| token.is_missing_metadata()) {
            if seen.insert(token.key()) {
                pending.push(token.key());
            }
        }

        let mut resolved: HashMap<TokenKey, TokenMetadata> = HashMap::new();
        let mut failed: Vec<(TokenKey, ResolverError)> = Vec::new();
        let mut to_read: Vec<TokenKey> = Vec::new();
        let mut unsupported: BTreeMap<u64, usize> = BTreeMap::new();

        for key in pending {
            if let Some(metadata) = native_metadata(key.chain_id, key.address) {
                resolved.insert(key, metadata);
            } else if self.reader.supports_chain(key.chain_id) {
                to_read.push(key);
            } else {
                *unsupported.entry(key.chain_id).or_default() += 1;
                failed.push((key, ResolverError::ProviderNotConfigured(key.chain_id)));
            }
        }

        for (chain_id, count) in &unsupported {
            tracing::warn!(chain_id, tokens = count, "no provider configured, skipping chain");
        }

        let reads: Vec<(TokenKey, Result<TokenMetadata, ResolverError>)> = stream::iter(to_read)
            .map(|key| async move {
                let result = with_backoff(self.retries, self.retry_delay, || {
                    self.reader.read_metadata(key.chain_id, key.address)
                })
                .await
                .and_then(|metadata| check_publishable(key, metadata));
                (key, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for (key, result) in reads {
            match result {
                Ok(metadata) => {
                    tracing::debug!(chain_id = key.chain_id, address = %key.address, symbol = %metadata.symbol, "metadata resolved");
                    resolved.insert(key, metadata);
                }
                Err(err) => {
                    tracing::warn!(chain_id = key.chain_id, address = %key.address, error = %err, "metadata resolution failed");
                    failed.push((key, err));
                }
            }
        }

        let resolved_count = resolved.len();
        let tokens: Vec<Token> = tokens
            .into_iter()
            .filter_map(|token| {
                if !token.is_missing_metadata() {
                    return Some(token);
                }
                match resolved.get(&token.key()) {
                    Some(metadata) => Some(token.with_metadata(metadata)),
                    None => match self.policy {
                        UnresolvedPolicy::Retain => Some(token),
                        UnresolvedPolicy::Drop => None,
                    },
                }
            })
            .collect();

        tracing::info!(
            resolved = resolved_count,
            failed = failed.len(),
            time = t0.elapsed().as_millis(),
            "missing metadata resolution finished"
        );

        Resolution {
            tokens,
            resolved: resolved_count,
            failed,
        }
    }
}
