//! Signed relayer requests for Safe execution and Safe deployment.

use alloy_primitives::{Address, B256};
use clob_core::config::ContractConfig;
use clob_core::encoding::{encode_hex, Eip712Domain, StructEncoder, Token};
use clob_core::signing::WalletSigner;
use clob_core::{Error, Result};
use tracing::debug;

use crate::derive::derive_safe_address;
use crate::model::{
    SafeCreateArgs, SafeTransactionArgs, SignatureParams, TransactionRequest, TransactionType,
};
use crate::multisend::aggregate_transactions;
use crate::safe_tx::SafeTx;
use crate::signature::pack_safe_signature;

pub const CREATE_PROXY_TYPE: &str =
    "CreateProxy(address paymentToken,uint256 payment,address paymentReceiver)";

pub const SAFE_FACTORY_NAME: &str = "Polymarket Contract Proxy Factory";

/// Domain of the Safe factory's `CreateProxy` signatures.
pub fn safe_factory_domain(chain_id: u64, factory: Address) -> Eip712Domain {
    Eip712Domain::default()
        .with_name(SAFE_FACTORY_NAME)
        .with_chain_id(chain_id)
        .with_verifying_contract(factory)
}

/// Digest signed to authorize deploying a Safe.
pub fn create_proxy_digest(args: &SafeCreateArgs, factory: Address) -> B256 {
    let struct_hash = StructEncoder::new(CREATE_PROXY_TYPE)
        .field(Token::Address(args.payment_token))
        .field(Token::Uint(args.payment))
        .field(Token::Address(args.payment_receiver))
        .hash();
    safe_factory_domain(args.chain_id, factory).digest(struct_hash)
}

/// Aggregate, hash and sign calls for execution by the owner's Safe.
///
/// Only custodial signers are supported. `args.nonce` must be the Safe's
/// current on-chain nonce.
pub async fn build_safe_transaction_request(
    signer: &WalletSigner,
    args: &SafeTransactionArgs,
    config: &ContractConfig,
    metadata: Option<&str>,
) -> Result<TransactionRequest> {
    let remote = signer.require_remote("signing Safe transactions")?;
    if remote.account() != args.from_address {
        return Err(Error::precondition(format!(
            "signer account {} does not own the Safe of {}",
            remote.account(),
            args.from_address
        )));
    }

    let safe = derive_safe_address(args.from_address, config.safe_factory);
    let transaction = aggregate_transactions(&args.transactions, config.safe_multisend)?;
    let digest = SafeTx::new(&transaction, args.nonce).digest(args.chain_id, safe);

    debug!(
        safe = %safe,
        nonce = %args.nonce,
        calls = args.transactions.len(),
        "Signing Safe transaction"
    );
    let signature = remote.sign_personal_digest(digest).await?;
    let packed = pack_safe_signature(&signature)?;

    Ok(TransactionRequest {
        transaction_type: TransactionType::Safe,
        from: args.from_address.to_checksum(None),
        to: transaction.to.to_checksum(None),
        proxy_wallet: safe.to_checksum(None),
        data: encode_hex(&transaction.data),
        signature: packed.to_hex(),
        signature_params: Some(SignatureParams::safe(transaction.operation)),
        value: Some(transaction.value.to_string()),
        nonce: Some(args.nonce.to_string()),
        metadata: metadata.filter(|m| !m.is_empty()).map(str::to_string),
    })
}

/// Sign a factory `CreateProxy` request deploying the owner's Safe.
///
/// Signed over the raw digest, so both signer kinds work.
pub async fn build_safe_create_request(
    signer: &WalletSigner,
    args: &SafeCreateArgs,
    config: &ContractConfig,
) -> Result<TransactionRequest> {
    if signer.address() != args.from_address {
        return Err(Error::precondition(format!(
            "signer {} cannot deploy a Safe for {}",
            signer.address(),
            args.from_address
        )));
    }

    let safe = derive_safe_address(args.from_address, config.safe_factory);
    let digest = create_proxy_digest(args, config.safe_factory);
    debug!(safe = %safe, "Signing Safe deployment");
    let signature = signer.sign_digest(digest).await?;

    Ok(TransactionRequest {
        transaction_type: TransactionType::SafeCreate,
        from: args.from_address.to_checksum(None),
        to: config.safe_factory.to_checksum(None),
        proxy_wallet: safe.to_checksum(None),
        data: "0x".to_string(),
        signature: signature.to_hex(),
        signature_params: Some(SignatureParams::safe_create(
            args.payment_token,
            args.payment,
            args.payment_receiver,
        )),
        value: None,
        nonce: None,
        metadata: None,
    })
}
