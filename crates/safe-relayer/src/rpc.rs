//! On-chain reads over Polygon JSON-RPC.

use std::time::Duration;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use clob_core::config::ContractConfig;
use clob_core::encoding::{decode_hex, encode_hex};
use clob_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calls::{allowanceCall, collateral_spenders, isApprovedForAllCall, nonceCall, outcome_token_operators};

/// Read-only view of chain state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// `eth_call` against the latest block.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;

    /// Deployed bytecode at `address` (empty for EOAs and undeployed Safes).
    async fn code_at(&self, address: Address) -> Result<Bytes>;
}

/// A single 32-byte return word.
fn decode_word(method: &str, output: &[u8]) -> Result<U256> {
    let word = output.get(..32).ok_or_else(|| {
        Error::remote(format!(
            "{} returned {} bytes, expected a 32-byte word",
            method,
            output.len()
        ))
    })?;
    Ok(U256::from_be_slice(word))
}

/// Current nonce of a Safe. Read fresh for every transaction.
pub async fn safe_nonce<R: ChainReader + ?Sized>(reader: &R, safe: Address) -> Result<U256> {
    let output = reader.call(safe, nonceCall {}.abi_encode().into()).await?;
    decode_word("nonce()", &output)
}

/// USDC.e allowance granted by `owner` to `spender`.
pub async fn collateral_allowance<R: ChainReader + ?Sized>(
    reader: &R,
    token: Address,
    owner: Address,
    spender: Address,
) -> Result<U256> {
    let data = allowanceCall { owner, spender }.abi_encode();
    let output = reader.call(token, data.into()).await?;
    decode_word("allowance(address,address)", &output)
}

/// Whether `operator` may move all of `account`'s outcome tokens.
pub async fn is_approved_for_all<R: ChainReader + ?Sized>(
    reader: &R,
    token: Address,
    account: Address,
    operator: Address,
) -> Result<bool> {
    let data = isApprovedForAllCall { account, operator }.abi_encode();
    let output = reader.call(token, data.into()).await?;
    Ok(!decode_word("isApprovedForAll(address,address)", &output)?.is_zero())
}

/// Which approval groups a Safe already has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalStatus {
    pub collateral: bool,
    pub outcome_tokens: bool,
}

impl ApprovalStatus {
    pub fn all_approved(&self) -> bool {
        self.collateral && self.outcome_tokens
    }
}

/// Check every trading approval for `safe`.
pub async fn approval_status<R: ChainReader + ?Sized>(
    reader: &R,
    config: &ContractConfig,
    safe: Address,
) -> Result<ApprovalStatus> {
    let mut collateral = true;
    for spender in collateral_spenders(config) {
        if collateral_allowance(reader, config.collateral, safe, spender)
            .await?
            .is_zero()
        {
            collateral = false;
            break;
        }
    }

    let mut outcome_tokens = true;
    for operator in outcome_token_operators(config) {
        if !is_approved_for_all(reader, config.conditional_tokens, safe, operator).await? {
            outcome_tokens = false;
            break;
        }
    }

    Ok(ApprovalStatus {
        collateral,
        outcome_tokens,
    })
}

/// [`ChainReader`] over a JSON-RPC endpoint.
pub struct RpcChainReader {
    rpc_url: String,
    http_client: reqwest::Client,
}

impl RpcChainReader {
    pub fn new(rpc_url: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            rpc_url: rpc_url.into(),
            http_client,
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn rpc_call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::remote(format!(
                "RPC request {} failed: {}",
                method,
                response.status()
            )));
        }

        let body: JsonRpcResponse<T> = response.json().await?;
        if let Some(error) = body.error {
            return Err(Error::remote(format!(
                "RPC {} error {}: {}",
                method, error.code, error.message
            )));
        }
        body.result
            .ok_or_else(|| Error::remote(format!("RPC {} returned no result", method)))
    }

    fn decode_result(hex: &str) -> Result<Bytes> {
        decode_hex(hex)
            .map(Bytes::from)
            .map_err(|e| Error::remote(format!("malformed RPC result: {}", e)))
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        debug!(to = %to, "eth_call");
        let params = serde_json::json!([
            { "to": to.to_checksum(None), "data": encode_hex(&data) },
            "latest"
        ]);
        let result: String = self.rpc_call("eth_call", params).await?;
        Self::decode_result(&result)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes> {
        let params = serde_json::json!([address.to_checksum(None), "latest"]);
        let result: String = self.rpc_call("eth_getCode", params).await?;
        Self::decode_result(&result)
    }
}

impl std::fmt::Debug for RpcChainReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChainReader")
            .field("rpc_url", &self.rpc_url)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'a str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}
