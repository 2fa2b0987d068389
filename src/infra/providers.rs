use std::collections::HashMap;

use alloy::network::Ethereum;
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};

use crate::config::pipeline_config::PipelineConfig;

/// One read provider per chain, built once at startup and shared by reference.
pub struct ProviderRegistry {
    providers: HashMap<u64, DynProvider<Ethereum>>,
    multicall_address: Address,
}

impl ProviderRegistry {
    pub async fn build(config: &PipelineConfig) -> Self {
        let mut providers: HashMap<u64, DynProvider<Ethereum>> = HashMap::new();

        for (network, rpc) in &config.rpcs {
            if rpc.is_empty() {
                continue;
            }

            match ProviderBuilder::new().connect(rpc).await {
                Ok(provider) => {
                    providers.insert(network.chain_id(), provider.erased());
                }
                Err(e) => {
                    tracing::error!(chain_id = network.chain_id(), error = %e, "provider error");
                }
            };
        }

        tracing::info!(chains = ?providers.keys().collect::<Vec<_>>(), "providers ready");

        Self {
            providers,
            multicall_address: config.multicall_address,
        }
    }

    pub fn get(&self, chain_id: u64) -> Option<&DynProvider<Ethereum>> {
        self.providers.get(&chain_id)
    }

    pub fn multicall_address(&self) -> Address {
        self.multicall_address
    }
}
