//! Request authentication headers.
//!
//! Level 1 proves control of a wallet with an EIP-712 `ClobAuth` signature
//! and is only used to create or derive API credentials. Level 2 signs each
//! trading request with the API secret. Builder headers are a second,
//! independent HMAC layered on top of Level 2.

use alloy_primitives::{Address, B256, U256};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use super::credentials::{ApiCredentials, BuilderConfig};
use super::hmac::build_hmac_signature;
use crate::encoding::{Eip712Domain, StructEncoder, Token};
use crate::signing::WalletSigner;
use crate::{Error, Result};

pub const POLY_ADDRESS: &str = "POLY_ADDRESS";
pub const POLY_SIGNATURE: &str = "POLY_SIGNATURE";
pub const POLY_TIMESTAMP: &str = "POLY_TIMESTAMP";
pub const POLY_NONCE: &str = "POLY_NONCE";
pub const POLY_API_KEY: &str = "POLY_API_KEY";
pub const POLY_PASSPHRASE: &str = "POLY_PASSPHRASE";
pub const POLY_BUILDER_API_KEY: &str = "POLY_BUILDER_API_KEY";
pub const POLY_BUILDER_TIMESTAMP: &str = "POLY_BUILDER_TIMESTAMP";
pub const POLY_BUILDER_PASSPHRASE: &str = "POLY_BUILDER_PASSPHRASE";
pub const POLY_BUILDER_SIGNATURE: &str = "POLY_BUILDER_SIGNATURE";

pub const CLOB_AUTH_TYPE: &str =
    "ClobAuth(address address,string timestamp,uint256 nonce,string message)";
pub const CLOB_AUTH_DOMAIN_NAME: &str = "ClobAuthDomain";
pub const CLOB_AUTH_DOMAIN_VERSION: &str = "1";
pub const CLOB_AUTH_MESSAGE: &str = "This message attests that I control the given wallet";

/// Current Unix time in seconds.
pub fn current_timestamp() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// `ClobAuthDomain` has no verifying contract.
pub fn clob_auth_domain(chain_id: u64) -> Eip712Domain {
    Eip712Domain::default()
        .with_name(CLOB_AUTH_DOMAIN_NAME)
        .with_version(CLOB_AUTH_DOMAIN_VERSION)
        .with_chain_id(chain_id)
}

/// Signable digest of the `ClobAuth` attestation.
pub fn clob_auth_digest(address: Address, timestamp: u64, nonce: u64, chain_id: u64) -> B256 {
    let struct_hash = StructEncoder::new(CLOB_AUTH_TYPE)
        .fields([
            Token::Address(address),
            Token::String(timestamp.to_string()),
            Token::Uint(U256::from(nonce)),
            Token::String(CLOB_AUTH_MESSAGE.to_string()),
        ])
        .hash();
    clob_auth_domain(chain_id).digest(struct_hash)
}

/// The HTTP request an L2 or builder signature covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestArgs {
    pub method: String,
    /// Path only, without host or query string.
    pub request_path: String,
    /// Serialized body, exactly as sent.
    pub body: Option<String>,
}

impl RequestArgs {
    pub fn new(method: impl Into<String>, request_path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            request_path: request_path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// An ordered set of authentication headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthHeaders {
    entries: Vec<(&'static str, String)>,
}

impl AuthHeaders {
    fn insert(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(n, v)| (*n, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add every header of `other`, replacing duplicates.
    pub fn merge(mut self, other: AuthHeaders) -> Self {
        for (name, value) in other.entries {
            self.insert(name, value);
        }
        self
    }

    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::encoding(format!("invalid header name {}: {}", name, e)))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| Error::encoding(format!("invalid value for {}: {}", name, e)))?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }
}

/// Level 1 headers: wallet signature over `ClobAuth`.
pub async fn create_level1_headers(
    signer: &WalletSigner,
    chain_id: u64,
    timestamp: u64,
    nonce: u64,
) -> Result<AuthHeaders> {
    let address = signer.address();
    let digest = clob_auth_digest(address, timestamp, nonce, chain_id);
    let signature = signer.sign_digest(digest).await?;
    debug!(address = %address, timestamp, nonce, "Created L1 headers");

    let mut headers = AuthHeaders::default();
    headers.insert(POLY_ADDRESS, address.to_checksum(None));
    headers.insert(POLY_SIGNATURE, signature.to_hex());
    headers.insert(POLY_TIMESTAMP, timestamp.to_string());
    headers.insert(POLY_NONCE, nonce.to_string());
    Ok(headers)
}

/// Level 2 headers: HMAC over the request with the API secret.
pub fn create_level2_headers(
    address: Address,
    credentials: &ApiCredentials,
    request: &RequestArgs,
    timestamp: &str,
) -> Result<AuthHeaders> {
    let signature = build_hmac_signature(
        &credentials.api_secret,
        timestamp,
        &request.method,
        &request.request_path,
        request.body.as_deref(),
    )?;

    let mut headers = AuthHeaders::default();
    headers.insert(POLY_ADDRESS, address.to_checksum(None));
    headers.insert(POLY_SIGNATURE, signature);
    headers.insert(POLY_TIMESTAMP, timestamp);
    headers.insert(POLY_API_KEY, credentials.api_key.clone());
    headers.insert(POLY_PASSPHRASE, credentials.api_passphrase.clone());
    Ok(headers)
}

impl BuilderConfig {
    /// Builder attribution headers for a request.
    pub fn builder_headers(&self, request: &RequestArgs, timestamp: &str) -> Result<AuthHeaders> {
        if !self.is_valid() {
            return Err(Error::precondition("invalid builder config"));
        }

        let signature = build_hmac_signature(
            &self.secret,
            timestamp,
            &request.method,
            &request.request_path,
            request.body.as_deref(),
        )?;

        let mut headers = AuthHeaders::default();
        headers.insert(POLY_BUILDER_API_KEY, self.key.clone());
        headers.insert(POLY_BUILDER_TIMESTAMP, timestamp);
        headers.insert(POLY_BUILDER_PASSPHRASE, self.passphrase.clone());
        headers.insert(POLY_BUILDER_SIGNATURE, signature);
        Ok(headers)
    }
}
