use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::app_error::AppError;
use crate::app_state::AppState;
use crate::args::Args;
use crate::config::pipeline_config::PipelineConfig;
use crate::domain::TokenList;
use crate::pipeline::Pipeline;
use crate::services::multicall_reader::RpcMetadataReader;
use crate::services::token_list_fetcher::HttpTokenListClient;

mod app_error;
mod app_state;
mod args;
mod config;
mod domain;
mod evm;
mod infra;
mod pipeline;
mod services;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::from_env();

    match run(&args).await {
        Ok(list) => {
            tracing::info!(pipeline = ?args.pipeline, tokens = list.tokens.len(), "token list published");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(pipeline = ?args.pipeline, error = %err, "run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<TokenList, AppError> {
    let config = PipelineConfig::init(args)?;
    let state = AppState::build(config).await;

    let pipeline = Pipeline::new(
        Arc::clone(&state.config),
        Arc::new(HttpTokenListClient::new()),
        Arc::new(RpcMetadataReader::new(Arc::clone(&state.providers))),
    );

    pipeline.run(args.pipeline).await
}
