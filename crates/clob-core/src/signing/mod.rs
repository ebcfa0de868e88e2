//! Signing module for Polymarket CLOB orders, auth proofs and Safe transactions.
//!
//! # Architecture
//!
//! ```text
//! LocalSigner (private key) ──┐
//!                             ├──► WalletSigner ── sign_digest ──────────► orders, ClobAuth, CreateProxy
//! RemoteSigner (custodial) ───┘         └──────── sign_personal_digest ──► SafeTx
//!        │
//!        ▼
//! CustodialSigningService (external)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use clob_core::signing::{LocalSigner, WalletSigner};
//!
//! let signer: WalletSigner = LocalSigner::from_private_key("0x...")?.into();
//! let signature = signer.sign_digest(digest).await?;
//! println!("{}", signature.to_hex());
//! ```

pub mod remote;
pub mod signature;
pub mod signer;

pub use remote::{CustodialSigningService, RemoteSigner};
pub use signature::RawSignature;
pub use signer::{LocalSigner, SignerKind, WalletSigner};
