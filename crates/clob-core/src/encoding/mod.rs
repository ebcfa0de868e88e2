//! Packed and structured encoding shared by orders, auth proofs and Safe
//! transactions.

pub mod abi;
pub mod eip712;

pub use abi::{
    decode_hex, encode_call, encode_hex, encode_packed, encode_words, function_selector,
    parse_token, Token,
};
pub use eip712::{type_hash, typed_data_digest, Eip712Domain, StructEncoder};
