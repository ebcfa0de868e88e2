//! Custodial signing through an external key-management service.
//!
//! The service holds the key for a logical account and signs a base64
//! payload on request. Everything about how it does so is behind
//! [`CustodialSigningService`].

use std::sync::Arc;

use alloy_primitives::{eip191_hash_message, Address, B256};
use async_trait::async_trait;
use base64::Engine;
use tracing::{debug, warn};

use super::signature::RawSignature;
use crate::{Error, Result};

/// External signing capability: "sign this payload for this account".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustodialSigningService: Send + Sync {
    /// Sign a base64-encoded 32-byte payload with the key held for `account`.
    ///
    /// Returns the signature as hex `r ++ s ++ v`, with or without `0x`.
    async fn sign_payload(&self, account: Address, payload_b64: &str) -> Result<String>;
}

/// Signer that delegates to a custodial service for one account.
#[derive(Clone)]
pub struct RemoteSigner {
    service: Arc<dyn CustodialSigningService>,
    account: Address,
}

impl RemoteSigner {
    pub fn new(service: Arc<dyn CustodialSigningService>, account: Address) -> Self {
        Self { service, account }
    }

    /// The custodial account this signer acts for.
    pub fn account(&self) -> Address {
        self.account
    }

    /// Sign a 32-byte digest as-is.
    pub async fn sign_digest(&self, digest: B256) -> Result<RawSignature> {
        if self.account == Address::ZERO {
            return Err(Error::precondition("custodial account is empty"));
        }

        let payload = base64::engine::general_purpose::STANDARD.encode(digest.as_slice());
        debug!(account = %self.account, "Requesting custodial signature");

        let response = self
            .service
            .sign_payload(self.account, &payload)
            .await
            .map_err(|e| match e {
                Error::Remote { .. } | Error::Http(_) => e,
                other => Error::remote(format!("custodial signing failed: {}", other)),
            })?;

        let signature = RawSignature::from_hex(&response).map_err(|e| {
            warn!(account = %self.account, "Custodial service returned a malformed signature");
            e
        })?;

        Ok(signature.normalized())
    }

    /// Sign the EIP-191 personal-message hash of a 32-byte digest.
    pub async fn sign_personal_digest(&self, digest: B256) -> Result<RawSignature> {
        self.sign_digest(eip191_hash_message(digest.as_slice())).await
    }
}

impl std::fmt::Debug for RemoteSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSigner")
            .field("account", &format!("{:?}", self.account))
            .finish()
    }
}
