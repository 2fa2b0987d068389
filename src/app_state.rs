use std::sync::Arc;

use crate::config::pipeline_config::PipelineConfig;
use crate::infra::ProviderRegistry;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PipelineConfig>,
    pub providers: Arc<ProviderRegistry>,
}

impl AppState {
    pub async fn build(config: PipelineConfig) -> Self {
        let providers = ProviderRegistry::build(&config).await;

        Self {
            config: Arc::new(config),
            providers: Arc::new(providers),
        }
    }
}
