//! Polymarket CLOB signing core.
//!
//! EIP-712 encoding, order construction and signing, request authentication
//! headers and a thin CLOB API client. Signing works with an in-process key
//! or a custodial signing service through [`signing::WalletSigner`].

pub mod api;
pub mod auth;
pub mod config;
pub mod encoding;
pub mod error;
pub mod order;
pub mod signing;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use error::{Error, ErrorStage, Result};
