//! Counterfactual Safe addresses.
//!
//! The Polymarket Safe factory deploys proxies with CREATE2, so a Safe's
//! address is known before it exists on chain.

use alloy_primitives::{b256, keccak256, Address, B256};
use clob_core::encoding::{encode_packed, encode_words, Token};

/// `keccak256` of the Safe proxy creation code used by the factory.
pub const SAFE_INIT_CODE_HASH: B256 =
    b256!("2bce2127ff07fb632d16c8347c4ebf501f4841168bed00d9e6ef715ddb6fcecf");

/// CREATE2 salt for an owner: `keccak256(abi.encode(owner))`.
pub fn safe_salt(owner: Address) -> B256 {
    keccak256(encode_words(&[Token::Address(owner)]))
}

/// Address of the Safe the factory deploys (or will deploy) for `owner`.
///
/// A zero owner has no Safe and maps to the zero address.
pub fn derive_safe_address(owner: Address, factory: Address) -> Address {
    if owner == Address::ZERO {
        return Address::ZERO;
    }
    create2_address(factory, safe_salt(owner), SAFE_INIT_CODE_HASH)
}

/// `keccak256(0xff ++ deployer ++ salt ++ init_code_hash)[12..]`
pub fn create2_address(deployer: Address, salt: B256, init_code_hash: B256) -> Address {
    let preimage = encode_packed(&[
        Token::Uint8(0xff),
        Token::Address(deployer),
        Token::Bytes32(salt),
        Token::Bytes32(init_code_hash),
    ]);
    Address::from_slice(&keccak256(preimage)[12..])
}
