//! Gasless Safe meta-transactions for Polymarket.
//!
//! Derives a user's Safe address from its owner, batches calls through
//! MultiSend, signs the Safe's EIP-712 `SafeTx` hash and submits the result
//! to the Polymarket relayer, which pays gas and executes it on chain.
//!
//! ```ignore
//! let client = RelayClient::from_settings(&settings, Some(signer))?;
//! let response = client.approve_for_trading().await?;
//! ```

pub mod builder;
pub mod calls;
pub mod client;
pub mod derive;
pub mod model;
pub mod multisend;
pub mod rpc;
pub mod safe_tx;
pub mod signature;

pub use builder::{build_safe_create_request, build_safe_transaction_request};
pub use client::{PollOutcome, RelayClient};
pub use derive::derive_safe_address;
pub use model::{
    OperationType, RelayerTransaction, RelayerTransactionState, SafeCreateArgs, SafeTransaction,
    SafeTransactionArgs, SubmitResponse, TransactionRequest, TransactionType,
};
pub use multisend::aggregate_transactions;
pub use rpc::{ChainReader, RpcChainReader};
pub use safe_tx::SafeTx;
pub use signature::pack_safe_signature;
