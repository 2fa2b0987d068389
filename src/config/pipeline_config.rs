use std::collections::HashMap;
use std::fs;
use std::str::FromStr;

use alloy::primitives::Address;
use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::args::Args;
use crate::config::errors::ConfigError;
use crate::domain::{ChainRegistry, EvmNetwork, MULTICALL3_ADDRESS};

/// Where a source token list lives and the file stem its cache is stored under.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SourceDescriptor {
    pub url: String,
    pub filename: String,
    /// Lower wins on dedup collisions; unset sources rank after set ones.
    #[serde(default)]
    pub priority: Option<u8>,
}

/// What makes two entries the same token during merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DedupKey {
    #[default]
    ChainAndAddress,
    /// Legacy single-key mode: an address is kept once across all chains.
    Address,
}

/// Which side wins when a source list and a community request collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SourcePriority {
    #[default]
    SourcesFirst,
    CommunityFirst,
}

/// Fate of requested tokens whose metadata could not be read from chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum UnresolvedPolicy {
    #[default]
    Retain,
    Drop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePolicy {
    pub dedup_key: DedupKey,
    pub source_priority: SourcePriority,
    pub max_symbol_length: usize,
    pub max_name_length: Option<usize>,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            dedup_key: DedupKey::ChainAndAddress,
            source_priority: SourcePriority::SourcesFirst,
            max_symbol_length: 5,
            max_name_length: Some(14),
        }
    }
}

#[derive(Debug)]
pub struct PipelineConfig {
    pub sources: Vec<SourceDescriptor>,
    pub stable_source: Option<SourceDescriptor>,
    pub chains: ChainRegistry,
    pub rpcs: HashMap<EvmNetwork, String>,
    pub multicall_address: Address,
    pub merge_policy: MergePolicy,
    pub unresolved_policy: UnresolvedPolicy,
    pub resolve_concurrency: usize,
    pub network_retries: u32,
    pub paths: PipelinePaths,
}

#[derive(Debug, Clone)]
pub struct PipelinePaths {
    pub community_list: String,
    pub token_requests: String,
    pub cache_dir: String,
    pub keep_cache: bool,
    pub tokens_dir: String,
    pub output: String,
    pub stable_output: String,
    pub recovery_cache: String,
    pub known_lists: Vec<String>,
}

impl PipelineConfig {
    pub fn init(args: &Args) -> Result<Self, ConfigError> {
        let rpc_args = [
            (EvmNetwork::Eth, &args.eth_rpc),
            (EvmNetwork::Optimism, &args.optimism_rpc),
            (EvmNetwork::Bsc, &args.bsc_rpc),
            (EvmNetwork::Polygon, &args.polygon_rpc),
            (EvmNetwork::Fantom, &args.fantom_rpc),
            (EvmNetwork::Base, &args.base_rpc),
            (EvmNetwork::Arbitrum, &args.arbitrum_rpc),
            (EvmNetwork::Avalanche, &args.avalanche_rpc),
        ];

        let mut rpcs: HashMap<EvmNetwork, String> = HashMap::new();
        for (network, rpc) in rpc_args {
            if !rpc.is_empty() {
                rpcs.insert(network, rpc.clone());
            }
        }

        let sources: Vec<SourceDescriptor> = read_config(&args.sources_path)?;
        for source in &sources {
            if source.url.trim().is_empty() || source.filename.trim().is_empty() {
                return Err(ConfigError::InvalidSource(format!("{source:?}")));
            }
        }

        let chains: ChainRegistry = read_config(&args.chains_path)?;

        let multicall_address = if args.multicall_address.is_empty() {
            MULTICALL3_ADDRESS
        } else {
            Address::from_str(&args.multicall_address)
                .map_err(|_| ConfigError::InvalidMulticallAddress(args.multicall_address.clone()))?
        };

        let stable_source = args.stable_list_url.as_ref().map(|url| SourceDescriptor {
            url: url.clone(),
            filename: crate::config::constants::STABLE_SOURCE_FILENAME.to_string(),
            priority: None,
        });

        Ok(Self {
            sources,
            stable_source,
            chains,
            rpcs,
            multicall_address,
            merge_policy: MergePolicy {
                dedup_key: args.dedup_key,
                source_priority: args.source_priority,
                max_symbol_length: args.max_symbol_length,
                max_name_length: (args.max_name_length > 0).then_some(args.max_name_length),
            },
            unresolved_policy: args.unresolved_policy,
            resolve_concurrency: args.resolve_concurrency.max(1),
            network_retries: args.network_retries,
            paths: PipelinePaths {
                community_list: args.community_list_path.clone(),
                token_requests: args.token_requests_path.clone(),
                cache_dir: args.cache_dir.clone(),
                keep_cache: args.keep_cache,
                tokens_dir: args.tokens_dir.clone(),
                output: args.output_path.clone(),
                stable_output: args.stable_output_path.clone(),
                recovery_cache: args.recovery_cache_path.clone(),
                known_lists: args.known_list_paths(),
            },
        })
    }

    /// Sources in the order they win dedup collisions.
    pub fn sources_by_priority(&self) -> Vec<SourceDescriptor> {
        let mut sources = self.sources.clone();
        sources.sort_by_key(|source| source.priority.unwrap_or(u8::MAX));
        sources
    }
}

fn read_config<T: DeserializeOwned>(path: &str) -> Result<T, ConfigError> {
    let content =
        fs::read_to_string(path).map_err(|err| ConfigError::Read(path.to_string(), err.to_string()))?;
    serde_json::from_str(&content).map_err(|err| ConfigError::Parse(path.to_string(), err.to_string()))
}
