use clap::{Parser, ValueEnum};

use crate::config::pipeline_config::{DedupKey, SourcePriority, UnresolvedPolicy};

const DEFAULT_SOURCES_PATH: &str = "configs/sources.json";
const DEFAULT_CHAINS_PATH: &str = "configs/chains.json";
const DEFAULT_COMMUNITY_LIST_PATH: &str = "configs/community-token-requests.json";
const DEFAULT_TOKEN_REQUESTS_PATH: &str = "configs/tokens.tsv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PipelineMode {
    /// Merge source lists with community requests and publish.
    Build,
    /// Fill missing metadata for requested tokens from chain and publish.
    Resolve,
}

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Builds the community token lists")]
pub struct Args {
    #[arg(value_enum, env = "PIPELINE", default_value = "build")]
    pub pipeline: PipelineMode,

    #[arg(long, env = "SOURCES_PATH", default_value = DEFAULT_SOURCES_PATH)]
    pub sources_path: String,

    #[arg(long, env = "CHAINS_PATH", default_value = DEFAULT_CHAINS_PATH)]
    pub chains_path: String,

    #[arg(long, env = "COMMUNITY_LIST_PATH", default_value = DEFAULT_COMMUNITY_LIST_PATH)]
    pub community_list_path: String,

    #[arg(long, env = "TOKEN_REQUESTS_PATH", default_value = DEFAULT_TOKEN_REQUESTS_PATH)]
    pub token_requests_path: String,

    #[arg(long, env = "CACHE_DIR", default_value = "sources/tmp")]
    pub cache_dir: String,

    /// Keep downloaded source lists after the run so the next run skips the network.
    #[arg(long, env = "KEEP_CACHE", default_value_t = false)]
    pub keep_cache: bool,

    #[arg(long, env = "TOKENS_DIR", default_value = "sources/tokens")]
    pub tokens_dir: String,

    #[arg(long, env = "OUTPUT_PATH", default_value = "sources/community.tokenlist.json")]
    pub output_path: String,

    #[arg(long, env = "STABLE_OUTPUT_PATH", default_value = "sources/community.stablelist.json")]
    pub stable_output_path: String,

    #[arg(long, env = "STABLE_LIST_URL")]
    pub stable_list_url: Option<String>,

    #[arg(long, env = "RECOVERY_CACHE_PATH", default_value = "sources/resolved.json")]
    pub recovery_cache_path: String,

    #[arg(long, env = "KNOWN_LIST_PATHS", default_value = "")]
    known_list_paths_from_env: String,

    #[arg(long, env = "MAX_SYMBOL_LENGTH", default_value_t = 5)]
    pub max_symbol_length: usize,

    /// 0 disables the name length bound.
    #[arg(long, env = "MAX_NAME_LENGTH", default_value_t = 14)]
    pub max_name_length: usize,

    #[arg(long, env = "DEDUP_KEY", value_enum, default_value = "chain-and-address")]
    pub dedup_key: DedupKey,

    #[arg(long, env = "SOURCE_PRIORITY", value_enum, default_value = "sources-first")]
    pub source_priority: SourcePriority,

    #[arg(long, env = "UNRESOLVED_POLICY", value_enum, default_value = "retain")]
    pub unresolved_policy: UnresolvedPolicy,

    #[arg(long, env = "HTTP_PROVIDER_1", default_value = "")]
    pub eth_rpc: String,

    #[arg(long, env = "HTTP_PROVIDER_10", default_value = "")]
    pub optimism_rpc: String,

    #[arg(long, env = "HTTP_PROVIDER_56", default_value = "")]
    pub bsc_rpc: String,

    #[arg(long, env = "HTTP_PROVIDER_137", default_value = "")]
    pub polygon_rpc: String,

    #[arg(long, env = "HTTP_PROVIDER_250", default_value = "")]
    pub fantom_rpc: String,

    #[arg(long, env = "HTTP_PROVIDER_8453", default_value = "")]
    pub base_rpc: String,

    #[arg(long, env = "HTTP_PROVIDER_42161", default_value = "")]
    pub arbitrum_rpc: String,

    #[arg(long, env = "HTTP_PROVIDER_43114", default_value = "")]
    pub avalanche_rpc: String,

    #[arg(long, env = "MULTICALL_ADDRESS", default_value = "")]
    pub multicall_address: String,

    #[arg(long, env = "RESOLVE_CONCURRENCY", default_value_t = 16)]
    pub resolve_concurrency: usize,

    #[arg(long, env = "NETWORK_RETRIES", default_value_t = 3)]
    pub network_retries: u32,
}

impl Args {
    pub fn from_env() -> Self {
        Self::parse()
    }

    pub fn known_list_paths(&self) -> Vec<String> {
        self.known_list_paths_from_env
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
