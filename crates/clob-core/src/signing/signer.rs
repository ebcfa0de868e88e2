//! Wallet signers for Polymarket orders, auth proofs and Safe transactions.
//!
//! [`WalletSigner`] is the single dispatch point between an in-process
//! private key and a custodial signing service. Callers never branch on the
//! variant themselves.

use alloy_primitives::{Address, B256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use std::str::FromStr;

use super::remote::RemoteSigner;
use super::signature::RawSignature;
use crate::{Error, Result};

/// Which kind of key backs a [`WalletSigner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerKind {
    Local,
    Remote,
}

/// In-process secp256k1 key.
#[derive(Clone)]
pub struct LocalSigner {
    signer: PrivateKeySigner,
}

impl LocalSigner {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    /// Load from the `WALLET_PRIVATE_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let private_key = std::env::var("WALLET_PRIVATE_KEY").map_err(|_| Error::Config {
            message: "WALLET_PRIVATE_KEY environment variable not set".to_string(),
        })?;
        Self::from_private_key(&private_key)
    }

    /// Create from a hex private key, optionally prefixed with "0x".
    pub fn from_private_key(key: &str) -> Result<Self> {
        let key_clean = key.trim().trim_start_matches("0x");
        let signer = PrivateKeySigner::from_str(key_clean).map_err(|_| Error::Config {
            message: "Invalid private key format - expected 64 hex characters".to_string(),
        })?;
        Ok(Self { signer })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub async fn sign_digest(&self, digest: B256) -> Result<RawSignature> {
        let signature = self
            .signer
            .sign_hash(&digest)
            .await
            .map_err(|e| Error::signing(format!("Failed to sign digest: {}", e)))?;
        Ok(RawSignature::from(signature))
    }

    /// EIP-191 personal sign over the 32 digest bytes.
    pub async fn sign_personal_digest(&self, digest: B256) -> Result<RawSignature> {
        let signature = self
            .signer
            .sign_message(digest.as_slice())
            .await
            .map_err(|e| Error::signing(format!("Failed to sign message: {}", e)))?;
        Ok(RawSignature::from(signature))
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose the private key in debug output
        f.debug_struct("LocalSigner")
            .field("address", &format!("{:?}", self.address()))
            .finish()
    }
}

/// A signer identity: local key or custodial account.
#[derive(Debug, Clone)]
pub enum WalletSigner {
    Local(LocalSigner),
    Remote(RemoteSigner),
}

impl WalletSigner {
    /// Address whose key produces the signatures.
    pub fn address(&self) -> Address {
        match self {
            WalletSigner::Local(signer) => signer.address(),
            WalletSigner::Remote(signer) => signer.account(),
        }
    }

    pub fn kind(&self) -> SignerKind {
        match self {
            WalletSigner::Local(_) => SignerKind::Local,
            WalletSigner::Remote(_) => SignerKind::Remote,
        }
    }

    /// Sign a raw 32-byte digest. `v` is 27 or 28.
    pub async fn sign_digest(&self, digest: B256) -> Result<RawSignature> {
        match self {
            WalletSigner::Local(signer) => signer.sign_digest(digest).await,
            WalletSigner::Remote(signer) => signer.sign_digest(digest).await,
        }
    }

    /// Sign `keccak256("\x19Ethereum Signed Message:\n32" ++ digest)`.
    pub async fn sign_personal_digest(&self, digest: B256) -> Result<RawSignature> {
        match self {
            WalletSigner::Local(signer) => signer.sign_personal_digest(digest).await,
            WalletSigner::Remote(signer) => signer.sign_personal_digest(digest).await,
        }
    }

    /// The custodial signer, or a precondition error naming the operation.
    pub fn require_remote(&self, operation: &str) -> Result<&RemoteSigner> {
        match self {
            WalletSigner::Remote(signer) => Ok(signer),
            WalletSigner::Local(_) => Err(Error::precondition(format!(
                "{} with a local private key is not yet supported",
                operation
            ))),
        }
    }
}

impl From<LocalSigner> for WalletSigner {
    fn from(signer: LocalSigner) -> Self {
        WalletSigner::Local(signer)
    }
}

impl From<RemoteSigner> for WalletSigner {
    fn from(signer: RemoteSigner) -> Self {
        WalletSigner::Remote(signer)
    }
}
