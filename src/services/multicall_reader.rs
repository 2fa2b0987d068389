use std::sync::Arc;
use std::time::Instant;

use alloy::primitives::{Address, FixedBytes};
use alloy::sol_types::SolCall;
use async_trait::async_trait;

use crate::domain::TokenMetadata;
use crate::evm::erc20::{ERC20Bytes32, ERC20};
use crate::evm::multicall3::Multicall3;
use crate::infra::ProviderRegistry;
use crate::services::errors::ResolverError;
use crate::services::metadata_resolver::MetadataReader;

type Decoder<T> = fn(&[u8]) -> alloy::sol_types::Result<T>;

/// Reads `symbol()`, `name()` and `decimals()` of a token in one Multicall3
/// round trip.
pub struct RpcMetadataReader {
    providers: Arc<ProviderRegistry>,
}

impl RpcMetadataReader {
    pub fn new(providers: Arc<ProviderRegistry>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl MetadataReader for RpcMetadataReader {
    fn supports_chain(&self, chain_id: u64) -> bool {
        self.providers.get(chain_id).is_some()
    }

    async fn read_metadata(&self, chain_id: u64, address: Address) -> Result<TokenMetadata, ResolverError> {
        let provider = self
            .providers
            .get(chain_id)
            .cloned()
            .ok_or(ResolverError::ProviderNotConfigured(chain_id))?;
        let failed = |reason: String| ResolverError::MetadataResolutionFailed(chain_id, address.to_string(), reason);

        let multicall = Multicall3::new(self.providers.multicall_address(), provider);

        let t0 = Instant::now();
        let results = multicall
            .aggregate3(metadata_calls(address))
            .call()
            .await
            .map_err(|e| failed(e.to_string()))?;

        tracing::debug!(chain_id, %address, time = t0.elapsed().as_millis(), "aggregate metadata complete");

        decode_metadata(&results).map_err(failed)
    }
}

fn metadata_calls(token: Address) -> Vec<Multicall3::Call3> {
    [
        ERC20::symbolCall {}.abi_encode(),
        ERC20::nameCall {}.abi_encode(),
        ERC20::decimalsCall {}.abi_encode(),
    ]
    .into_iter()
    .map(|call_data| Multicall3::Call3 {
        target: token,
        allowFailure: true,
        callData: call_data.into(),
    })
    .collect()
}

fn decode_metadata(results: &[Multicall3::Result]) -> Result<TokenMetadata, String> {
    let [symbol, name, decimals] = results else {
        return Err(format!("expected 3 call results, got {}", results.len()));
    };

    let symbol = decode_text(
        "symbol",
        symbol,
        ERC20::symbolCall::abi_decode_returns,
        ERC20Bytes32::symbolCall::abi_decode_returns,
    )?;
    let name = decode_text(
        "name",
        name,
        ERC20::nameCall::abi_decode_returns,
        ERC20Bytes32::nameCall::abi_decode_returns,
    )?;

    if !decimals.success {
        return Err("decimals() reverted".to_string());
    }
    let decimals = ERC20::decimalsCall::abi_decode_returns(&decimals.returnData)
        .map_err(|e| format!("decimals() decode: {e}"))?;

    if symbol.is_empty() {
        return Err("empty symbol".to_string());
    }

    Ok(TokenMetadata { symbol, name, decimals })
}

fn decode_text(
    field: &str,
    result: &Multicall3::Result,
    as_string: Decoder<String>,
    as_bytes32: Decoder<FixedBytes<32>>,
) -> Result<String, String> {
    if !result.success {
        return Err(format!("{field}() reverted"));
    }

    if let Ok(text) = as_string(&result.returnData) {
        return Ok(text.trim().to_string());
    }

    let raw = as_bytes32(&result.returnData).map_err(|e| format!("{field}() decode: {e}"))?;
    let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());

    String::from_utf8(raw[..end].to_vec())
        .map(|text| text.trim().to_string())
        .map_err(|e| format!("{field}() decode: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Bytes, U256};
    use alloy::sol_types::SolValue;

    fn ok(data: Vec<u8>) -> Multicall3::Result {
        Multicall3::Result {
            success: true,
            returnData: Bytes::from(data),
        }
    }

    fn reverted() -> Multicall3::Result {
        Multicall3::Result {
            success: false,
            returnData: Bytes::new(),
        }
    }

    #[test]
    fn test_calls_target_token() {
        let token = Address::repeat_byte(0x11);
        let calls = metadata_calls(token);

        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|call| call.target == token && call.allowFailure));
        assert_eq!(calls[0].callData.as_ref(), ERC20::symbolCall::SELECTOR.as_slice());
        assert_eq!(calls[2].callData.as_ref(), ERC20::decimalsCall::SELECTOR.as_slice());
    }

    #[test]
    fn test_decode_string_metadata() {
        let results = vec![
            ok("USDC".to_string().abi_encode()),
            ok("USD Coin".to_string().abi_encode()),
            ok(U256::from(6u8).abi_encode()),
        ];

        let metadata = decode_metadata(&results).unwrap();

        assert_eq!(
            metadata,
            TokenMetadata {
                symbol: "USDC".to_string(),
                name: "USD Coin".to_string(),
                decimals: 6,
            }
        );
    }

    #[test]
    fn test_decode_bytes32_metadata() {
        let results = vec![
            ok(FixedBytes::<32>::right_padding_from(b"MKR").abi_encode()),
            ok(FixedBytes::<32>::right_padding_from(b"Maker").abi_encode()),
            ok(U256::from(18u8).abi_encode()),
        ];

        let metadata = decode_metadata(&results).unwrap();

        assert_eq!(metadata.symbol, "MKR");
        assert_eq!(metadata.name, "Maker");
        assert_eq!(metadata.decimals, 18);
    }

    #[test]
    fn test_reverted_field_fails_entry() {
        let results = vec![reverted(), ok("Name".to_string().abi_encode()), ok(U256::from(18u8).abi_encode())];
        assert_eq!(decode_metadata(&results), Err("symbol() reverted".to_string()));
    }

    #[test]
    fn test_empty_return_data_fails_entry() {
        let results = vec![ok(vec![]), ok(vec![]), ok(vec![])];
        assert!(decode_metadata(&results).is_err());
    }
}
