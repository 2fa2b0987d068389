use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_error::AppError;
use crate::args::PipelineMode;
use crate::config::constants::{LIST_NAME, STABLE_LIST_NAME};
use crate::config::pipeline_config::PipelineConfig;
use crate::domain::{Token, TokenKey, TokenList, Version};
use crate::services::list_builder::build_list;
use crate::services::merge::{merge, partition_by_chain, PerChainTokens};
use crate::services::metadata_resolver::{fill_from_known, MetadataReader, MetadataResolver};
use crate::services::persistence::{self, ScratchDir};
use crate::services::schema_validator::{validate_list, TokenListSchema};
use crate::services::stablecoins::build_stable_list;
use crate::services::token_list_fetcher::{TokenListClient, TokenListFetcher};
use crate::services::token_requests::load_token_requests;

pub struct Pipeline<C, R> {
    config: Arc<PipelineConfig>,
    client: Arc<C>,
    reader: Arc<R>,
    retry_delay: Option<Duration>,
}

impl<C: TokenListClient, R: MetadataReader> Pipeline<C, R> {
    pub fn new(config: Arc<PipelineConfig>, client: Arc<C>, reader: Arc<R>) -> Self {
        Self {
            config,
            client,
            reader,
            retry_delay: None,
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    pub async fn run(&self, mode: PipelineMode) -> Result<TokenList, AppError> {
        match mode {
            PipelineMode::Build => self.build().await,
            PipelineMode::Resolve => self.resolve().await,
        }
    }

    /// Merge-and-build: fetch sources, merge with community requests, publish
    /// per-chain files, the main list and the stablecoin list.
    pub async fn build(&self) -> Result<TokenList, AppError> {
        let t0 = Instant::now();
        let paths = &self.config.paths;
        let version = Version::current()?;

        let scratch = ScratchDir::acquire(&paths.cache_dir, paths.keep_cache)?;
        let mut fetcher = TokenListFetcher::new(Arc::clone(&self.client), scratch.path(), self.config.network_retries);
        if let Some(delay) = self.retry_delay {
            fetcher = fetcher.with_retry_delay(delay);
        }

        // the stablecoin reference rides along so every download settles before anything is written
        let mut descriptors = self.config.sources_by_priority();
        descriptors.extend(self.config.stable_source.iter().cloned());
        let mut sources = fetcher.fetch_all(&descriptors).await?;
        let reference = match self.config.stable_source {
            Some(_) => sources.pop().map(|list| list.tokens).unwrap_or_default(),
            None => Vec::new(),
        };

        let community: Vec<Token> = persistence::read_json(&paths.community_list)?;
        tracing::info!(tokens = community.len(), "community requests loaded");

        let partition = merge(&sources, &community, &self.config.merge_policy, &self.config.chains);

        let list = build_list(&partition, LIST_NAME, version);
        validate_list(&TokenListSchema, &list)?;

        let stable = build_stable_list(&list.tokens, &reference, &self.config.chains, STABLE_LIST_NAME, version);
        if !stable.tokens.is_empty() {
            validate_list(&TokenListSchema, &stable)?;
        }

        persistence::save_per_chain(&paths.tokens_dir, &partition, &self.config.chains)?;
        persistence::save_json(&paths.output, &list)?;
        tracing::info!(path = %paths.output, tokens = list.tokens.len(), "token list written");

        if stable.tokens.is_empty() {
            tracing::warn!("no stablecoins found, stable list not written");
        } else {
            persistence::save_json(&paths.stable_output, &stable)?;
            tracing::info!(path = %paths.stable_output, tokens = stable.tokens.len(), "stable list written");
        }

        tracing::info!(time = t0.elapsed().as_millis(), "build finished");

        Ok(list)
    }

    /// Resolve-missing-metadata-and-build: fill requested tokens from known
    /// lists, the recovery cache and finally from chain, then publish.
    pub async fn resolve(&self) -> Result<TokenList, AppError> {
        let t0 = Instant::now();
        let paths = &self.config.paths;
        let version = Version::current()?;

        let requests = dedup_by_key(load_token_requests(&paths.token_requests)?);
        tracing::info!(tokens = requests.len(), "token requests loaded");

        let mut known: Vec<Token> = Vec::new();
        for path in &paths.known_lists {
            let list: TokenList = persistence::read_json(path)?;
            known.extend(list.tokens);
        }
        let recovered: Vec<Token> = persistence::read_json_if_exists(&paths.recovery_cache)?.unwrap_or_default();

        let tokens = fill_from_known(fill_from_known(requests, &known), &recovered);
        let missing = tokens.iter().filter(|t| t.is_missing_metadata()).count();
        tracing::info!(missing, "tokens without metadata");

        let mut resolver = MetadataResolver::new(
            Arc::clone(&self.reader),
            self.config.resolve_concurrency,
            self.config.network_retries,
            self.config.unresolved_policy,
        );
        if let Some(delay) = self.retry_delay {
            resolver = resolver.with_retry_delay(delay);
        }
        let resolution = resolver.resolve_missing(tokens).await;

        persistence::save_json(&paths.recovery_cache, &resolution.tokens)?;

        let partition = partition_by_chain(resolution.tokens, &self.config.chains);
        let publishable = complete_only(&partition);

        let list = build_list(&publishable, LIST_NAME, version);
        validate_list(&TokenListSchema, &list)?;

        persistence::save_per_chain(&paths.tokens_dir, &partition, &self.config.chains)?;
        persistence::save_json(&paths.output, &list)?;

        tracing::info!(
            resolved = resolution.resolved,
            failed = resolution.failed.len(),
            tokens = list.tokens.len(),
            time = t0.elapsed().as_millis(),
            "resolve finished"
        );

        Ok(list)
    }
}

fn dedup_by_key(tokens: Vec<Token>) -> Vec<Token> {
    let mut seen: HashSet<TokenKey> = HashSet::new();
    tokens.into_iter().filter(|token| seen.insert(token.key())).collect()
}

/// Entries still missing metadata stay in per-chain files but never reach a
/// published list.
fn complete_only(partition: &PerChainTokens) -> PerChainTokens {
    let mut skipped = 0;
    let complete = partition
        .iter()
        .map(|(chain_id, tokens)| {
            let kept: Vec<Token> = tokens.iter().filter(|t| t.is_complete()).cloned().collect();
            skipped += tokens.len() - kept.len();
            (*chain_id, kept)
        })
        .collect();

    if skipped > 0 {
        tracing::warn!(skipped, "incomplete tokens left out of the published list");
    }

    complete
}
