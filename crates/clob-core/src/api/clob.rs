//! Polymarket CLOB API client.
//!
//! Read-only market metadata needs no credentials. Creating API keys needs a
//! signer (L1). Posting and cancelling orders additionally needs API
//! credentials (L2). Requests are sent once: a caller retrying a failed
//! submission must rebuild the order so it carries a fresh salt.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration as StdDuration;

use alloy_primitives::Address;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::auth::{
    create_level1_headers, create_level2_headers, current_timestamp, ApiCredentials,
    ApiKeyResponse, AuthHeaders, BuilderConfig, RequestArgs,
};
use crate::config::Settings;
use crate::order::{
    resolve_fee_rate, CreateOrderOptions, MarketOrderArgs, OrderArgs, OrderBuilder, OrderType,
    PostOrderRequest, SignatureType, SignedOrder, TickSize,
};
use crate::signing::{SignerKind, WalletSigner};
use crate::{Error, Result};

pub const L1_AUTH_UNAVAILABLE: &str = "a private key is needed to interact with this endpoint!";
pub const L2_AUTH_UNAVAILABLE: &str = "API Credentials are needed to interact with this endpoint!";
pub const SAFE_FUNDER_REQUIRED: &str = "safe account is required for custodial signers";

const TIME: &str = "/time";
const CREATE_API_KEY: &str = "/auth/api-key";
const DERIVE_API_KEY: &str = "/auth/derive-api-key";
const TICK_SIZE: &str = "/tick-size";
const NEG_RISK: &str = "/neg-risk";
const FEE_RATE: &str = "/fee-rate";
const POST_ORDER: &str = "/order";
const CANCEL_ORDER: &str = "/order";
const CANCEL_ALL: &str = "/cancel-all";

/// What the client is able to authenticate as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AccessLevel {
    /// Public endpoints only.
    L0,
    /// Signer present.
    L1,
    /// Signer and API credentials present.
    L2,
}

/// Response from posting an order.
#[derive(Debug, Clone, Deserialize)]
pub struct PostOrderResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(rename = "errorMsg", default)]
    pub error_msg: String,
    /// Order ID assigned by the CLOB.
    #[serde(rename = "orderID", default)]
    pub order_id: String,
    /// e.g. "matched", "live", "delayed", "unmatched".
    #[serde(default)]
    pub status: String,
    #[serde(rename = "transactionsHashes", default)]
    pub transaction_hashes: Vec<String>,
}

impl PostOrderResponse {
    /// FOK orders that fail return status "unmatched".
    pub fn is_filled(&self) -> bool {
        let s = self.status.to_lowercase();
        s == "matched" || s == "live" || s == "delayed"
    }
}

/// Response from a cancel request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelOrdersResponse {
    #[serde(default)]
    pub canceled: Vec<String>,
    #[serde(default)]
    pub not_canceled: HashMap<String, String>,
}

/// Polymarket CLOB API client.
pub struct ClobClient {
    base_url: String,
    chain_id: u64,
    http_client: reqwest::Client,
    signer: Option<WalletSigner>,
    credentials: Option<ApiCredentials>,
    builder: Option<BuilderConfig>,
    /// Safe that funds orders for a custodial signer.
    funder: Option<Address>,
    use_server_time: bool,
    tick_size_cache: Mutex<HashMap<String, TickSize>>,
    neg_risk_cache: Mutex<HashMap<String, bool>>,
    fee_rate_cache: Mutex<HashMap<String, u64>>,
}

impl ClobClient {
    pub fn new(base_url: &str, chain_id: u64) -> Result<Self> {
        url::Url::parse(base_url).map_err(|e| Error::Config {
            message: format!("invalid CLOB url {:?}: {}", base_url, e),
        })?;
        let http_client = reqwest::Client::builder()
            .timeout(StdDuration::from_secs(30))
            .connect_timeout(StdDuration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            chain_id,
            http_client,
            signer: None,
            credentials: None,
            builder: None,
            funder: None,
            use_server_time: false,
            tick_size_cache: Mutex::new(HashMap::new()),
            neg_risk_cache: Mutex::new(HashMap::new()),
            fee_rate_cache: Mutex::new(HashMap::new()),
        })
    }

    /// Client configured from settings, with an optional signer.
    pub fn from_settings(settings: &Settings, signer: Option<WalletSigner>) -> Result<Self> {
        let mut client = Self::new(&settings.clob_url, settings.chain_id)?;
        client.signer = signer;
        client.credentials = settings.api_credentials.clone();
        client.builder = settings.builder.clone().filter(BuilderConfig::is_valid);
        client.use_server_time = settings.use_server_time;
        Ok(client)
    }

    pub fn with_signer(mut self, signer: WalletSigner) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_credentials(mut self, credentials: ApiCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_builder(mut self, builder: BuilderConfig) -> Self {
        self.builder = Some(builder);
        self
    }

    /// Orders are funded by `safe` and signed as `POLY_GNOSIS_SAFE`.
    pub fn with_funder(mut self, safe: Address) -> Self {
        self.funder = Some(safe);
        self
    }

    pub fn with_server_time(mut self, use_server_time: bool) -> Self {
        self.use_server_time = use_server_time;
        self
    }

    pub fn set_credentials(&mut self, credentials: ApiCredentials) {
        self.credentials = Some(credentials);
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn access_level(&self) -> AccessLevel {
        match (&self.signer, &self.credentials) {
            (Some(_), Some(_)) => AccessLevel::L2,
            (Some(_), None) => AccessLevel::L1,
            _ => AccessLevel::L0,
        }
    }

    fn assert_level1(&self) -> Result<&WalletSigner> {
        self.signer
            .as_ref()
            .ok_or_else(|| Error::precondition(L1_AUTH_UNAVAILABLE))
    }

    fn assert_level2(&self) -> Result<(&WalletSigner, &ApiCredentials)> {
        let signer = self.assert_level1()?;
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| Error::precondition(L2_AUTH_UNAVAILABLE))?;
        Ok((signer, credentials))
    }

    /// Builder for the configured signer. With a funder the order is made by
    /// that Safe; custodial signers only ever trade through one.
    pub fn order_builder(&self) -> Result<OrderBuilder> {
        let signer = self.assert_level1()?.clone();
        match (self.funder, signer.kind()) {
            (Some(safe), _) => Ok(OrderBuilder::for_safe(signer, self.chain_id, safe)),
            (None, SignerKind::Remote) => Err(Error::precondition(SAFE_FUNDER_REQUIRED)),
            (None, SignerKind::Local) => Ok(OrderBuilder::new(
                signer,
                self.chain_id,
                SignatureType::Eoa,
                None,
            )),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request once and decode the JSON response.
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        headers: Option<&AuthHeaders>,
        body: Option<String>,
    ) -> Result<T> {
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
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(
                method = %method,
                path,
                status = status.as_u16(),
                response = %text,
                "CLOB request failed"
            );
            return Err(Error::Api {
                message: format!("{} {} failed: {} - {}", method, path, status.as_u16(), text),
                status: Some(status.as_u16()),
            });
        }

        Ok(response.json().await?)
    }

    /// Current server time in Unix seconds.
    pub async fn get_server_time(&self) -> Result<u64> {
        self.send(Method::GET, TIME, &[], None, None).await
    }

    async fn timestamp(&self) -> Result<u64> {
        if self.use_server_time {
            self.get_server_time().await
        } else {
            Ok(current_timestamp())
        }
    }

    async fn level1_headers(&self, nonce: Option<u64>) -> Result<AuthHeaders> {
        let signer = self.assert_level1()?;
        let timestamp = self.timestamp().await?;
        create_level1_headers(signer, self.chain_id, timestamp, nonce.unwrap_or(0)).await
    }

    /// Create new API credentials (L1).
    pub async fn create_api_key(&mut self, nonce: Option<u64>) -> Result<ApiCredentials> {
        let headers = self.level1_headers(nonce).await?;
        let raw: ApiKeyResponse = self
            .send(Method::POST, CREATE_API_KEY, &[], Some(&headers), None)
            .await?;
        let credentials = ApiCredentials::from(raw);
        self.credentials = Some(credentials.clone());
        info!("Created API credentials");
        Ok(credentials)
    }

    /// Recover existing API credentials (L1).
    pub async fn derive_api_key(&mut self, nonce: Option<u64>) -> Result<ApiCredentials> {
        let headers = self.level1_headers(nonce).await?;
        let raw: ApiKeyResponse = self
            .send(Method::GET, DERIVE_API_KEY, &[], Some(&headers), None)
            .await?;
        let credentials = ApiCredentials::from(raw);
        self.credentials = Some(credentials.clone());
        info!("Derived API credentials");
        Ok(credentials)
    }

    /// Create credentials, falling back to deriving the existing ones.
    pub async fn create_or_derive_api_key(&mut self, nonce: Option<u64>) -> Result<ApiCredentials> {
        match self.create_api_key(nonce).await {
            Ok(credentials) => Ok(credentials),
            Err(e @ Error::Precondition { .. }) => Err(e),
            Err(create_err) => {
                warn!("create_api_key failed, trying derive: {}", create_err);
                self.derive_api_key(nonce).await
            }
        }
    }

    pub async fn get_tick_size(&self, token_id: &str) -> Result<TickSize> {
        if let Some(&cached) = lock(&self.tick_size_cache).get(token_id) {
            return Ok(cached);
        }

        #[derive(Deserialize)]
        struct TickSizeResponse {
            minimum_tick_size: rust_decimal::Decimal,
        }

        let response: TickSizeResponse = self
            .send(Method::GET, TICK_SIZE, &[("token_id", token_id)], None, None)
            .await?;
        let tick_size = TickSize::from_decimal(response.minimum_tick_size)?;

        lock(&self.tick_size_cache).insert(token_id.to_string(), tick_size);
        debug!(token_id, tick_size = %tick_size, "Fetched tick size");
        Ok(tick_size)
    }

    pub async fn get_neg_risk(&self, token_id: &str) -> Result<bool> {
        if let Some(&cached) = lock(&self.neg_risk_cache).get(token_id) {
            return Ok(cached);
        }

        #[derive(Deserialize)]
        struct NegRiskResponse {
            neg_risk: bool,
        }

        let response: NegRiskResponse = self
            .send(Method::GET, NEG_RISK, &[("token_id", token_id)], None, None)
            .await?;

        lock(&self.neg_risk_cache).insert(token_id.to_string(), response.neg_risk);
        debug!(token_id, neg_risk = response.neg_risk, "Fetched neg-risk flag");
        Ok(response.neg_risk)
    }

    /// The market's base fee in basis points.
    pub async fn get_fee_rate_bps(&self, token_id: &str) -> Result<u64> {
        if let Some(&cached) = lock(&self.fee_rate_cache).get(token_id) {
            return Ok(cached);
        }

        #[derive(Deserialize)]
        struct FeeRateResponse {
            #[serde(alias = "base_fee", alias = "baseFee", alias = "fee_rate_bps")]
            fee: u64,
        }

        let response: FeeRateResponse = self
            .send(Method::GET, FEE_RATE, &[("token_id", token_id)], None, None)
            .await?;

        lock(&self.fee_rate_cache).insert(token_id.to_string(), response.fee);
        debug!(token_id, fee_rate_bps = response.fee, "Fetched fee rate");
        Ok(response.fee)
    }

    /// Fill missing tick size and neg-risk flag from the API.
    pub async fn resolve_order_options(
        &self,
        token_id: &str,
        options: CreateOrderOptions,
    ) -> Result<CreateOrderOptions> {
        let tick_size = match options.tick_size {
            Some(tick_size) => tick_size,
            None => self.get_tick_size(token_id).await?,
        };
        let neg_risk = match options.neg_risk {
            Some(neg_risk) => neg_risk,
            None => self.get_neg_risk(token_id).await?,
        };
        Ok(CreateOrderOptions::new(tick_size, neg_risk))
    }

    /// Build and sign a limit order against live market metadata.
    pub async fn create_order(
        &self,
        args: &OrderArgs,
        options: CreateOrderOptions,
    ) -> Result<SignedOrder> {
        let builder = self.order_builder()?;
        let options = self.resolve_order_options(&args.token_id, options).await?;
        let market_fee = self.get_fee_rate_bps(&args.token_id).await?;

        let mut args = args.clone();
        args.fee_rate_bps = resolve_fee_rate(market_fee, args.fee_rate_bps)?;
        builder.create_order(&args, &options).await
    }

    /// Build and sign a market order against live market metadata.
    pub async fn create_market_order(
        &self,
        args: &MarketOrderArgs,
        options: CreateOrderOptions,
    ) -> Result<SignedOrder> {
        let builder = self.order_builder()?;
        let options = self.resolve_order_options(&args.token_id, options).await?;
        let market_fee = self.get_fee_rate_bps(&args.token_id).await?;

        let mut args = args.clone();
        args.fee_rate_bps = resolve_fee_rate(market_fee, args.fee_rate_bps)?;
        builder.create_market_order(&args, &options).await
    }

    /// L2 headers for a request, with builder headers when configured.
    async fn level2_headers(&self, request: &RequestArgs) -> Result<AuthHeaders> {
        let (signer, credentials) = self.assert_level2()?;
        let timestamp = self.timestamp().await?.to_string();
        let headers = create_level2_headers(signer.address(), credentials, request, &timestamp)?;

        match &self.builder {
            Some(builder) if builder.is_valid() => {
                let builder_timestamp = current_timestamp().to_string();
                Ok(headers.merge(builder.builder_headers(request, &builder_timestamp)?))
            }
            _ => Ok(headers),
        }
    }

    /// Post a signed order.
    pub async fn post_order(
        &self,
        order: SignedOrder,
        order_type: OrderType,
    ) -> Result<PostOrderResponse> {
        let (_, credentials) = self.assert_level2()?;
        let body = PostOrderRequest::new(order, credentials.api_key.clone(), order_type).to_body()?;
        debug!(payload = %body, "POST /order request body");

        let request = RequestArgs::new("POST", POST_ORDER).with_body(body.clone());
        let headers = self.level2_headers(&request).await?;

        let response: PostOrderResponse = self
            .send(Method::POST, POST_ORDER, &[], Some(&headers), Some(body))
            .await?;
        info!(
            order_id = %response.order_id,
            status = %response.status,
            "Order posted"
        );
        Ok(response)
    }

    /// Build, sign and post a limit order.
    pub async fn create_and_post_order(
        &self,
        args: &OrderArgs,
        options: CreateOrderOptions,
        order_type: OrderType,
    ) -> Result<PostOrderResponse> {
        self.assert_level2()?;
        let order = self.create_order(args, options).await?;
        self.post_order(order, order_type).await
    }

    /// Build, sign and post a market order with its own order type.
    pub async fn create_and_post_market_order(
        &self,
        args: &MarketOrderArgs,
        options: CreateOrderOptions,
    ) -> Result<PostOrderResponse> {
        self.assert_level2()?;
        let order = self.create_market_order(args, options).await?;
        self.post_order(order, args.order_type).await
    }

    pub async fn cancel_order(&self, order_id: &str) -> Result<CancelOrdersResponse> {
        let body = serde_json::json!({ "orderID": order_id }).to_string();
        let request = RequestArgs::new("DELETE", CANCEL_ORDER).with_body(body.clone());
        let headers = self.level2_headers(&request).await?;

        let response: CancelOrdersResponse = self
            .send(Method::DELETE, CANCEL_ORDER, &[], Some(&headers), Some(body))
            .await?;
        info!(order_id, canceled = response.canceled.len(), "Order cancel sent");
        Ok(response)
    }

    pub async fn cancel_all(&self) -> Result<CancelOrdersResponse> {
        let request = RequestArgs::new("DELETE", CANCEL_ALL);
        let headers = self.level2_headers(&request).await?;

        let response: CancelOrdersResponse = self
            .send(Method::DELETE, CANCEL_ALL, &[], Some(&headers), None)
            .await?;
        info!(canceled = response.canceled.len(), "All orders cancelled");
        Ok(response)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl std::fmt::Debug for ClobClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClobClient")
            .field("base_url", &self.base_url)
            .field("chain_id", &self.chain_id)
            .field("access_level", &self.access_level())
            .field("has_builder", &self.builder.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_hmac_signature;
    use crate::config::POLYGON_CHAIN_ID;
    use crate::order::Side;
    use crate::signing::{LocalSigner, RemoteSigner};
    use crate::testing::{LocalKeyService, StubServer};
    use std::sync::Arc;
    use rust_decimal_macros::dec;

    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const SECRET: &str = "c2VjcmV0LXNlY3JldC1zZWNyZXQ=";

    fn signer() -> WalletSigner {
        LocalSigner::from_private_key(TEST_PRIVATE_KEY).unwrap().into()
    }

    fn credentials() -> ApiCredentials {
        ApiCredentials::new("api-key", SECRET, "passphrase")
    }

    #[test]
    fn test_access_levels() {
        let client = ClobClient::new("http://localhost:1", POLYGON_CHAIN_ID).unwrap();
        assert_eq!(client.access_level(), AccessLevel::L0);

        let client = client.with_signer(signer());
        assert_eq!(client.access_level(), AccessLevel::L1);

        let client = client.with_credentials(credentials());
        assert_eq!(client.access_level(), AccessLevel::L2);
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(matches!(
            ClobClient::new("not a url", POLYGON_CHAIN_ID),
            Err(Error::Config { .. })
        ));
    }

    #[tokio::test]
    async fn test_l1_required_for_api_keys() {
        let mut client = ClobClient::new("http://localhost:1", POLYGON_CHAIN_ID).unwrap();
        let err = client.create_api_key(None).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Precondition failed: {}", L1_AUTH_UNAVAILABLE)
        );
        let err = client.create_or_derive_api_key(None).await.unwrap_err();
        assert!(matches!(err, Error::Precondition { .. }));
    }

    #[tokio::test]
    async fn test_l2_required_for_trading() {
        let client = ClobClient::new("http://localhost:1", POLYGON_CHAIN_ID)
            .unwrap()
            .with_signer(signer());
        let err = client.cancel_all().await.unwrap_err();
        assert!(err.to_string().contains(L2_AUTH_UNAVAILABLE));

        let args = OrderArgs::new("123", dec!(0.5), dec!(10), Side::Buy);
        let err = client
            .create_and_post_order(&args, CreateOrderOptions::default(), OrderType::Gtc)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Precondition { .. }));
    }

    #[tokio::test]
    async fn test_derive_api_key_sends_l1_headers() {
        let server = StubServer::start(vec![(
            200,
            r#"{"apiKey":"k","secret":"s","passphrase":"p"}"#.to_string(),
        )])
        .await
        .unwrap();

        let mut client = ClobClient::new(server.url(), POLYGON_CHAIN_ID)
            .unwrap()
            .with_signer(signer());
        let creds = client.derive_api_key(Some(7)).await.unwrap();
        assert_eq!(creds.api_key, "k");
        assert_eq!(client.access_level(), AccessLevel::L2);

        let requests = server.requests();
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].path, "/auth/derive-api-key");
        assert_eq!(
            requests[0].header("POLY_ADDRESS"),
            Some("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
        assert_eq!(requests[0].header("POLY_NONCE"), Some("7"));
        assert!(requests[0].header("POLY_SIGNATURE").is_some());
    }

    #[tokio::test]
    async fn test_create_and_post_order_signs_exact_body() {
        let server = StubServer::start(vec![
            (200, r#"{"minimum_tick_size":0.01}"#.to_string()),
            (200, r#"{"neg_risk":false}"#.to_string()),
            (200, r#"{"base_fee":0}"#.to_string()),
            (
                200,
                r#"{"success":true,"errorMsg":"","orderID":"0xabc","status":"live"}"#.to_string(),
            ),
        ])
        .await
        .unwrap();

        let client = ClobClient::new(server.url(), POLYGON_CHAIN_ID)
            .unwrap()
            .with_signer(signer())
            .with_credentials(credentials())
            .with_builder(BuilderConfig::new("bkey", "YnVpbGRlcg==", "bpass"));

        let args = OrderArgs::new("123", dec!(0.15), dec!(8), Side::Buy);
        let response = client
            .create_and_post_order(&args, CreateOrderOptions::default(), OrderType::Gtc)
            .await
            .unwrap();
        assert_eq!(response.order_id, "0xabc");
        assert!(response.is_filled());

        let requests = server.requests();
        assert_eq!(requests.len(), 4);
        assert_eq!(requests[0].path, "/tick-size?token_id=123");
        assert_eq!(requests[1].path, "/neg-risk?token_id=123");
        assert_eq!(requests[2].path, "/fee-rate?token_id=123");

        let post = &requests[3];
        assert_eq!(post.method, "POST");
        assert_eq!(post.path, "/order");
        assert_eq!(post.header("POLY_API_KEY"), Some("api-key"));
        assert_eq!(post.header("POLY_BUILDER_API_KEY"), Some("bkey"));

        let timestamp = post.header("POLY_TIMESTAMP").unwrap();
        assert!(verify_hmac_signature(
            SECRET,
            timestamp,
            "POST",
            "/order",
            Some(&post.body),
            post.header("POLY_SIGNATURE").unwrap(),
        ));
        assert!(verify_hmac_signature(
            "YnVpbGRlcg==",
            post.header("POLY_BUILDER_TIMESTAMP").unwrap(),
            "POST",
            "/order",
            Some(&post.body),
            post.header("POLY_BUILDER_SIGNATURE").unwrap(),
        ));

        let body: serde_json::Value = serde_json::from_str(&post.body).unwrap();
        assert_eq!(body["owner"], "api-key");
        assert_eq!(body["orderType"], "GTC");
        assert_eq!(body["order"]["makerAmount"], "1200000");
        assert_eq!(body["order"]["takerAmount"], "8000000");
        assert!(body["order"]["salt"].is_u64());
    }

    #[tokio::test]
    async fn test_fee_rate_mismatch_rejected() {
        let server = StubServer::start(vec![(200, r#"{"base_fee":100}"#.to_string())])
            .await
            .unwrap();
        let client = ClobClient::new(server.url(), POLYGON_CHAIN_ID)
            .unwrap()
            .with_signer(signer());

        let args = OrderArgs::new("123", dec!(0.5), dec!(10), Side::Buy).with_fee_rate_bps(50);
        let err = client
            .create_order(&args, CreateOrderOptions::new(TickSize::Hundredth, false))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn test_api_error_carries_status() {
        let server = StubServer::start(vec![(400, r#"{"error":"bad token"}"#.to_string())])
            .await
            .unwrap();
        let client = ClobClient::new(server.url(), POLYGON_CHAIN_ID).unwrap();

        let err = client.get_neg_risk("123").await.unwrap_err();
        assert!(matches!(err, Error::Api { status: Some(400), .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_metadata_is_cached() {
        let server = StubServer::start(vec![(200, r#"{"minimum_tick_size":"0.001"}"#.to_string())])
            .await
            .unwrap();
        let client = ClobClient::new(server.url(), POLYGON_CHAIN_ID).unwrap();

        assert_eq!(client.get_tick_size("9").await.unwrap(), TickSize::Thousandth);
        assert_eq!(client.get_tick_size("9").await.unwrap(), TickSize::Thousandth);
        assert_eq!(server.requests().len(), 1);
    }

    #[test]
    fn test_safe_funder_order_builder() {
        let safe = Address::repeat_byte(0x5a);
        let client = ClobClient::new("http://localhost:1", POLYGON_CHAIN_ID)
            .unwrap()
            .with_signer(signer())
            .with_funder(safe);
        let builder = client.order_builder().unwrap();
        assert_eq!(builder.funder(), safe);
        assert_eq!(builder.signature_type(), SignatureType::PolyGnosisSafe);
    }

    #[test]
    fn test_custodial_signer_needs_safe_funder() {
        let key = LocalSigner::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let account = key.address();
        let custodial: WalletSigner =
            RemoteSigner::new(Arc::new(LocalKeyService::new(key)), account).into();
        let client = ClobClient::new("http://localhost:1", POLYGON_CHAIN_ID)
            .unwrap()
            .with_signer(custodial);

        let err = client.order_builder().unwrap_err();
        assert!(matches!(err, Error::Precondition { .. }));
        assert_eq!(err.to_string(), format!("Precondition failed: {}", SAFE_FUNDER_REQUIRED));

        let safe = Address::repeat_byte(0x5a);
        let builder = client.with_funder(safe).order_builder().unwrap();
        assert_eq!(builder.funder(), safe);
        assert_eq!(builder.signature_type(), SignatureType::PolyGnosisSafe);
    }

    #[test]
    fn test_local_key_without_funder_trades_as_eoa() {
        let client = ClobClient::new("http://localhost:1", POLYGON_CHAIN_ID)
            .unwrap()
            .with_signer(signer());
        let builder = client.order_builder().unwrap();
        assert_eq!(builder.signature_type(), SignatureType::Eoa);
        assert_eq!(builder.funder(), signer().address());
    }
}
