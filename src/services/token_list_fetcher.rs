use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use futures::{stream, StreamExt};
use serde::Deserialize;

use crate::{
    config::{
        constants::{RETRY_BASE_DELAY_MS, TOKEN_FETCH_CONCURRENCY},
        pipeline_config::SourceDescriptor,
    },
    domain::{RawTokenRecord, Token},
    services::{errors::FetcherError, persistence, retry::with_backoff},
};

#[derive(Debug, Deserialize)]
struct ApiResponse {
    tokens: Vec<RawTokenRecord>,
}

/// Retrieves the raw `tokens` array of a token list by URL.
#[async_trait]
pub trait TokenListClient: Send + Sync {
    async fn fetch_list(&self, url: &str) -> Result<Vec<RawTokenRecord>, FetcherError>;
}

pub struct HttpTokenListClient {
    client: reqwest::Client,
}

impl HttpTokenListClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTokenListClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenListClient for HttpTokenListClient {
    async fn fetch_list(&self, url: &str) -> Result<Vec<RawTokenRecord>, FetcherError> {
        let response: ApiResponse = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| FetcherError::SourceUnavailable(url.to_string(), err.to_string()))?
            .json()
            .await
            .map_err(|err| FetcherError::SourceUnavailable(url.to_string(), err.to_string()))?;

        Ok(response.tokens)
    }
}

/// A fetched source list, in the shape every later stage consumes.
#[derive(Debug, Clone)]
pub struct SourceList {
    pub descriptor: SourceDescriptor,
    pub tokens: Vec<Token>,
}

pub struct TokenListFetcher<C> {
    client: Arc<C>,
    cache_dir: PathBuf,
    retries: u32,
    retry_delay: Duration,
}

impl<C: TokenListClient> TokenListFetcher<C> {
    pub fn new(client: Arc<C>, cache_dir: impl Into<PathBuf>, retries: u32) -> Self {
        Self {
            client,
            cache_dir: cache_dir.into(),
            retries,
            retry_delay: Duration::from_millis(RETRY_BASE_DELAY_MS),
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Fetches every source concurrently. The result keeps the order of
    /// `sources`; any failing source fails the whole call.
    pub async fn fetch_all(&self, sources: &[SourceDescriptor]) -> Result<Vec<SourceList>, FetcherError> {
        let t0 = Instant::now();

        let mut results: Vec<(usize, Result<SourceList, FetcherError>)> = stream::iter(sources.iter().cloned().enumerate())
            .map(|(index, descriptor)| async move { (index, self.fetch_source(&descriptor).await) })
            .buffer_unordered(TOKEN_FETCH_CONCURRENCY)
            .collect()
            .await;

        results.sort_by_key(|(index, _)| *index);

        let mut lists = Vec::with_capacity(results.len());
        for (_, result) in results {
            match result {
                Ok(list) => lists.push(list),
                Err(err) => {
                    tracing::error!(error = %err, "source list fetch failed, aborting");
                    return Err(err);
                }
            }
        }

        let loaded: Vec<&String> = lists.iter().map(|list| &list.descriptor.filename).collect();
        tracing::info!(lists = ?loaded, time = t0.elapsed().as_millis(), "token lists loaded");

        Ok(lists)
    }

    /// Cache-first: a cached copy is returned without touching the network.
    pub async fn fetch_source(&self, descriptor: &SourceDescriptor) -> Result<SourceList, FetcherError> {
        let cache_path = self.cache_path(descriptor);

        match persistence::read_json_if_exists::<Vec<Token>>(&cache_path) {
            Ok(Some(tokens)) => {
                tracing::debug!(source = %descriptor.filename, tokens = tokens.len(), "token list served from cache");
                return Ok(SourceList {
                    descriptor: descriptor.clone(),
                    tokens,
                });
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(source = %descriptor.filename, error = %err, "ignoring unreadable cache");
            }
        }

        let records = with_backoff(self.retries, self.retry_delay, || self.client.fetch_list(&descriptor.url)).await?;
        let tokens = project_records(&descriptor.filename, records);

        persistence::save_json(&cache_path, &tokens)
            .map_err(|err| FetcherError::SourceUnavailable(descriptor.url.clone(), err.to_string()))?;

        tracing::info!(source = %descriptor.filename, tokens = tokens.len(), "token list fetched");

        Ok(SourceList {
            descriptor: descriptor.clone(),
            tokens,
        })
    }

    fn cache_path(&self, descriptor: &SourceDescriptor) -> PathBuf {
        self.cache_dir.join(format!("{}.json", descriptor.filename))
    }
}

/// Typed projection of third-party records. Records that fail it are left
/// out of the list and logged.
fn project_records(source: &str, records: Vec<RawTokenRecord>) -> Vec<Token> {
    let total = records.len();
    let tokens: Vec<Token> = records
        .into_iter()
        .filter_map(|record| match Token::try_from(record) {
            Ok(token) => Some(token),
            Err(err) => {
                tracing::warn!(source, error = %err, "skipping malformed token record");
                None
            }
        })
        .collect();

    if tokens.len() < total {
        tracing::warn!(source, skipped = total - tokens.len(), "malformed records skipped");
    }

    tokens
}
