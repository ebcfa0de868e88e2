//! Polymarket relayer client.
//!
//! Submits signed Safe transactions for gasless execution. Submissions carry
//! builder attribution headers over the exact request body. The Safe nonce
//! is read on chain immediately before each transaction is built and never
//! cached, so a failed submission can be rebuilt safely.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use clob_core::auth::{current_timestamp, AuthHeaders, BuilderConfig, RequestArgs};
use clob_core::config::{ContractConfig, Settings};
use clob_core::signing::WalletSigner;
use clob_core::{Error, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::builder::{build_safe_create_request, build_safe_transaction_request};
use crate::calls::{collateral_approvals, outcome_token_approvals};
use crate::derive::derive_safe_address;
use crate::model::{
    RelayerTransaction, RelayerTransactionState, SafeCreateArgs, SafeTransaction,
    SafeTransactionArgs, SubmitResponse, TransactionRequest,
};
use crate::rpc::{approval_status, safe_nonce, ChainReader, RpcChainReader};

pub const SIGNER_UNAVAILABLE: &str = "a signer is needed to submit relayer transactions!";
pub const BUILDER_UNAVAILABLE: &str = "builder credentials are needed to submit relayer transactions!";

const GET_NONCE: &str = "/nonce";
const GET_DEPLOYED: &str = "/deployed";
const GET_TRANSACTION: &str = "/transaction";
const GET_TRANSACTIONS: &str = "/transactions";
const SUBMIT_TRANSACTION: &str = "/submit";

/// Result of waiting for a relayed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// One of the awaited states was reached.
    Reached(RelayerTransaction),
    /// The transaction entered the failure state.
    Failed(RelayerTransaction),
    /// Polls were exhausted first.
    TimedOut,
}

#[derive(Debug, Deserialize)]
struct NonceResponse {
    nonce: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct DeployedResponse {
    deployed: bool,
}

/// Polymarket relayer client for one chain.
pub struct RelayClient {
    base_url: String,
    contracts: &'static ContractConfig,
    http_client: reqwest::Client,
    chain: Arc<dyn ChainReader>,
    signer: Option<WalletSigner>,
    builder: Option<BuilderConfig>,
}

impl RelayClient {
    pub fn new(base_url: &str, chain_id: u64, chain: Arc<dyn ChainReader>) -> Result<Self> {
        url::Url::parse(base_url).map_err(|e| Error::Config {
            message: format!("invalid relayer url {:?}: {}", base_url, e),
        })?;
        let contracts = ContractConfig::for_chain(chain_id)?;
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            contracts,
            http_client,
            chain,
            signer: None,
            builder: None,
        })
    }

    /// Client reading chain state from `settings.rpc_url`.
    pub fn from_settings(settings: &Settings, signer: Option<WalletSigner>) -> Result<Self> {
        let chain = Arc::new(RpcChainReader::new(settings.rpc_url.clone())?);
        let mut client = Self::new(&settings.relayer_url, settings.chain_id, chain)?;
        client.signer = signer;
        client.builder = settings.builder.clone().filter(BuilderConfig::is_valid);
        Ok(client)
    }

    pub fn with_signer(mut self, signer: WalletSigner) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_builder(mut self, builder: BuilderConfig) -> Self {
        self.builder = Some(builder);
        self
    }

    pub fn contracts(&self) -> &'static ContractConfig {
        self.contracts
    }

    /// Safe owned by `owner` on this chain.
    pub fn safe_address(&self, owner: Address) -> Address {
        derive_safe_address(owner, self.contracts.safe_factory)
    }

    fn require_signer(&self) -> Result<&WalletSigner> {
        self.signer
            .as_ref()
            .ok_or_else(|| Error::precondition(SIGNER_UNAVAILABLE))
    }

    fn require_builder(&self) -> Result<&BuilderConfig> {
        self.builder
            .as_ref()
            .filter(|b| b.is_valid())
            .ok_or_else(|| Error::precondition(BUILDER_UNAVAILABLE))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send once and return the raw response body.
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        headers: Option<&AuthHeaders>,
        body: Option<String>,
    ) -> Result<String> {
        let mut request = self.http_client.request(method.clone(), self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(headers) = headers {
            request = request.headers(headers.to_header_map()?);
        }
        if let Some(body) = body {
            request = request
                .header("Content-Type", "application/json")
                .body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            warn!(
                method = %method,
                path,
                status = status.as_u16(),
                response = %text,
                "Relayer request failed"
            );
            return Err(Error::Api {
                message: format!("relayer error {}: {}", status.as_u16(), text),
                status: Some(status.as_u16()),
            });
        }
        Ok(text)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let text = self.send(Method::GET, path, query, None, None).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Relayer-side nonce for `owner`'s Safe.
    pub async fn get_nonce(&self, owner: Address) -> Result<U256> {
        let address = owner.to_checksum(None);
        let response: NonceResponse = self
            .get_json(GET_NONCE, &[("address", &address), ("type", "SAFE")])
            .await?;
        let raw = match &response.nonce {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                return Err(Error::remote(format!("unexpected nonce format: {}", other)));
            }
        };
        U256::from_str_radix(raw.trim(), 10)
            .map_err(|e| Error::remote(format!("invalid nonce {:?}: {}", raw, e)))
    }

    /// Whether the relayer reports `safe` as deployed.
    pub async fn is_deployed(&self, safe: Address) -> Result<bool> {
        let address = safe.to_checksum(None);
        let response: DeployedResponse = self
            .get_json(GET_DEPLOYED, &[("address", &address)])
            .await?;
        Ok(response.deployed)
    }

    /// Whether `safe` has code on chain.
    pub async fn is_deployed_on_chain(&self, safe: Address) -> Result<bool> {
        Ok(!self.chain.code_at(safe).await?.is_empty())
    }

    pub async fn get_transaction(&self, transaction_id: &str) -> Result<Vec<RelayerTransaction>> {
        self.get_json(GET_TRANSACTION, &[("id", transaction_id)]).await
    }

    /// Recent transactions, as returned by the relayer.
    pub async fn get_transactions(&self) -> Result<Vec<serde_json::Value>> {
        self.get_json(GET_TRANSACTIONS, &[]).await
    }

    /// Post a signed request with builder headers over its exact body.
    pub async fn submit(&self, request: &TransactionRequest) -> Result<SubmitResponse> {
        let builder = self.require_builder()?;
        let body = request.to_body()?;
        let timestamp = current_timestamp().to_string();
        let headers = builder.builder_headers(
            &RequestArgs::new("POST", SUBMIT_TRANSACTION).with_body(body.clone()),
            &timestamp,
        )?;

        let text = self
            .send(
                Method::POST,
                SUBMIT_TRANSACTION,
                &[],
                Some(&headers),
                Some(body),
            )
            .await?;

        let response = if text.trim().is_empty() {
            SubmitResponse::default()
        } else {
            serde_json::from_str(&text)?
        };
        info!(
            transaction_id = %response.transaction_id,
            transaction_hash = %response.transaction_hash,
            proxy_wallet = %request.proxy_wallet,
            "Relayer transaction submitted"
        );
        Ok(response)
    }

    /// Execute calls through the signer's deployed Safe.
    ///
    /// Fails before any network call when the signer is not custodial or no
    /// builder credentials are configured.
    pub async fn execute(
        &self,
        transactions: Vec<SafeTransaction>,
        metadata: Option<&str>,
    ) -> Result<SubmitResponse> {
        let signer = self.require_signer()?;
        let owner = signer.require_remote("signing Safe transactions")?.account();
        self.require_builder()?;
        if transactions.is_empty() {
            return Err(Error::validation("no transactions to execute"));
        }

        let safe = self.safe_address(owner);
        if !self.is_deployed_on_chain(safe).await? {
            return Err(Error::precondition(format!("safe {} is not deployed", safe)));
        }
        let nonce = safe_nonce(self.chain.as_ref(), safe).await?;
        debug!(safe = %safe, nonce = %nonce, calls = transactions.len(), "Building Safe transaction");

        let args = SafeTransactionArgs {
            from_address: owner,
            nonce,
            chain_id: self.contracts.chain_id,
            transactions,
        };
        let request = build_safe_transaction_request(signer, &args, self.contracts, metadata).await?;
        self.submit(&request).await
    }

    /// Deploy the signer's Safe through the factory. Returns the Safe address.
    pub async fn deploy(&self) -> Result<(Address, SubmitResponse)> {
        let signer = self.require_signer()?;
        self.require_builder()?;

        let owner = signer.address();
        let safe = self.safe_address(owner);
        if self.is_deployed_on_chain(safe).await? {
            return Err(Error::validation(format!("safe {} is already deployed", safe)));
        }

        let args = SafeCreateArgs::sponsored(owner, self.contracts.chain_id);
        let request = build_safe_create_request(signer, &args, self.contracts).await?;
        let response = self.submit(&request).await?;
        info!(owner = %owner, safe = %safe, "Safe deployment submitted");
        Ok((safe, response))
    }

    /// Grant every missing trading approval from the signer's Safe.
    ///
    /// Returns `None` when the Safe is already fully approved.
    pub async fn approve_for_trading(&self) -> Result<Option<SubmitResponse>> {
        let owner = self
            .require_signer()?
            .require_remote("signing Safe transactions")?
            .account();
        let safe = self.safe_address(owner);
        let status = approval_status(self.chain.as_ref(), self.contracts, safe).await?;
        if status.all_approved() {
            debug!(safe = %safe, "Safe already approved for trading");
            return Ok(None);
        }

        let mut transactions = Vec::new();
        if !status.collateral {
            transactions.extend(collateral_approvals(self.contracts)?);
        }
        if !status.outcome_tokens {
            transactions.extend(outcome_token_approvals(self.contracts)?);
        }
        let metadata = match (status.collateral, status.outcome_tokens) {
            (false, false) => "Set all token approvals for trading",
            (false, true) => "Approve USDC.e for trading",
            _ => "Approve outcome tokens for trading",
        };
        self.execute(transactions, Some(metadata)).await.map(Some)
    }

    /// Poll a transaction until it reaches one of `states` or `fail_state`.
    pub async fn poll_until_state(
        &self,
        transaction_id: &str,
        states: &[RelayerTransactionState],
        fail_state: RelayerTransactionState,
        max_polls: usize,
        interval: Duration,
    ) -> Result<PollOutcome> {
        for attempt in 0..max_polls {
            let transactions = self.get_transaction(transaction_id).await?;
            if let Some(transaction) = transactions.into_iter().next() {
                match transaction.state() {
                    Some(state) if states.contains(&state) => {
                        return Ok(PollOutcome::Reached(transaction));
                    }
                    Some(state) if state == fail_state => {
                        warn!(
                            transaction_id,
                            transaction_hash = %transaction.transaction_hash,
                            "Relayer transaction failed"
                        );
                        return Ok(PollOutcome::Failed(transaction));
                    }
                    _ => debug!(
                        transaction_id,
                        state = %transaction.raw_state,
                        attempt = attempt + 1,
                        "Waiting for relayer transaction"
                    ),
                }
            }
            if attempt + 1 < max_polls {
                tokio::time::sleep(interval).await;
            }
        }
        Ok(PollOutcome::TimedOut)
    }
}

impl std::fmt::Debug for RelayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayClient")
            .field("base_url", &self.base_url)
            .field("chain_id", &self.contracts.chain_id)
            .field("signer", &self.signer)
            .field("builder", &self.builder)
            .finish()
    }
}
