//! Polysign: Polymarket CLOB order signing and Safe relayer toolkit
//!
//! This is the root crate that provides benchmark and integration test access
//! to the workspace. For actual functionality, use the individual crates:
//!
//! - `clob-core`: EIP-712 encoding, order building, signing, auth headers, CLOB client
//! - `safe-relayer`: Safe address derivation, MultiSend, SafeTx signing, relayer client

pub use clob_core as core;
pub use safe_relayer as relayer;
