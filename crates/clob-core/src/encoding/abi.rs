//! Typed value encoding in the two layouts the exchange and Safe contracts use.
//!
//! * Packed: Solidity `abi.encodePacked` (addresses 20 bytes, `uint8` one byte,
//!   dynamic values raw). Used for the MultiSend payload and CREATE2 input.
//! * Words: one 32-byte word per field, dynamic values replaced by their
//!   keccak hash. Used for EIP-712 `encodeData` and static call data.

use alloy_primitives::{keccak256, Address, B256, U256};

use crate::{Error, Result};

/// A typed value ready to be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Uint(U256),
    Uint8(u8),
    Bool(bool),
    Bytes32(B256),
    /// Dynamic `bytes`.
    Bytes(Vec<u8>),
    /// Dynamic `string`.
    String(String),
}

impl Token {
    /// Whether the value is of a dynamic ABI type.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Token::Bytes(_) | Token::String(_))
    }

    /// Solidity type name of this token.
    pub fn type_name(&self) -> &'static str {
        match self {
            Token::Address(_) => "address",
            Token::Uint(_) => "uint256",
            Token::Uint8(_) => "uint8",
            Token::Bool(_) => "bool",
            Token::Bytes32(_) => "bytes32",
            Token::Bytes(_) => "bytes",
            Token::String(_) => "string",
        }
    }

    /// The 32-byte word for struct hashing. Dynamic values are hashed.
    pub fn word(&self) -> B256 {
        match self {
            Token::Address(addr) => B256::left_padding_from(addr.as_slice()),
            Token::Uint(value) => B256::from(value.to_be_bytes::<32>()),
            Token::Uint8(value) => B256::left_padding_from(&[*value]),
            Token::Bool(value) => B256::left_padding_from(&[u8::from(*value)]),
            Token::Bytes32(value) => *value,
            Token::Bytes(data) => keccak256(data),
            Token::String(s) => keccak256(s.as_bytes()),
        }
    }

    fn write_packed(&self, out: &mut Vec<u8>) {
        match self {
            Token::Address(addr) => out.extend_from_slice(addr.as_slice()),
            Token::Uint(value) => out.extend_from_slice(&value.to_be_bytes::<32>()),
            Token::Uint8(value) => out.push(*value),
            Token::Bool(value) => out.push(u8::from(*value)),
            Token::Bytes32(value) => out.extend_from_slice(value.as_slice()),
            Token::Bytes(data) => out.extend_from_slice(data),
            Token::String(s) => out.extend_from_slice(s.as_bytes()),
        }
    }
}

impl From<Address> for Token {
    fn from(value: Address) -> Self {
        Token::Address(value)
    }
}

impl From<U256> for Token {
    fn from(value: U256) -> Self {
        Token::Uint(value)
    }
}

impl From<B256> for Token {
    fn from(value: B256) -> Self {
        Token::Bytes32(value)
    }
}

impl From<bool> for Token {
    fn from(value: bool) -> Self {
        Token::Bool(value)
    }
}

/// Tight packed concatenation with no padding.
pub fn encode_packed(tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::new();
    for token in tokens {
        token.write_packed(&mut out);
    }
    out
}

/// One 32-byte word per token, dynamic values hashed.
pub fn encode_words(tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::with_capacity(tokens.len() * 32);
    for token in tokens {
        out.extend_from_slice(token.word().as_slice());
    }
    out
}

/// First four bytes of `keccak256(signature)`.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Call data for a function taking only static arguments.
///
/// Dynamic arguments need head/tail encoding and are rejected here.
pub fn encode_call(signature: &str, args: &[Token]) -> Result<Vec<u8>> {
    if let Some(dynamic) = args.iter().find(|t| t.is_dynamic()) {
        return Err(Error::encoding(format!(
            "{} argument cannot be encoded as a static call word in {}",
            dynamic.type_name(),
            signature
        )));
    }
    let mut data = Vec::with_capacity(4 + args.len() * 32);
    data.extend_from_slice(&function_selector(signature));
    data.extend_from_slice(&encode_words(args));
    Ok(data)
}

/// Parse a value of the given Solidity type from its textual form.
///
/// Lengths must match the declared type exactly.
pub fn parse_token(type_tag: &str, value: &str) -> Result<Token> {
    match type_tag {
        "address" => {
            let bytes = decode_hex(value)?;
            if bytes.len() != 20 {
                return Err(Error::encoding(format!(
                    "address must be 20 bytes, got {}",
                    bytes.len()
                )));
            }
            Ok(Token::Address(Address::from_slice(&bytes)))
        }
        "uint256" | "uint" => Ok(Token::Uint(parse_uint(value)?)),
        "uint8" => {
            let parsed = parse_uint(value)?;
            if parsed > U256::from(u8::MAX) {
                return Err(Error::encoding(format!(
                    "value {} does not fit in uint8",
                    parsed
                )));
            }
            Ok(Token::Uint8(parsed.to::<u8>()))
        }
        "bool" => match value {
            "true" => Ok(Token::Bool(true)),
            "false" => Ok(Token::Bool(false)),
            other => Err(Error::encoding(format!("invalid bool: {}", other))),
        },
        "bytes32" => {
            let bytes = decode_hex(value)?;
            if bytes.len() != 32 {
                return Err(Error::encoding(format!(
                    "bytes32 must be 32 bytes, got {}",
                    bytes.len()
                )));
            }
            Ok(Token::Bytes32(B256::from_slice(&bytes)))
        }
        "bytes" => Ok(Token::Bytes(decode_hex(value)?)),
        "string" => Ok(Token::String(value.to_string())),
        other => Err(Error::encoding(format!("unsupported type tag: {}", other))),
    }
}

fn parse_uint(value: &str) -> Result<U256> {
    let trimmed = value.trim();
    let parsed = match trimmed.strip_prefix("0x") {
        Some(hex_digits) => U256::from_str_radix(hex_digits, 16),
        None => U256::from_str_radix(trimmed, 10),
    };
    parsed.map_err(|e| Error::encoding(format!("invalid uint256 {:?}: {}", value, e)))
}

/// Decode a hex string with an optional `0x` prefix.
pub fn decode_hex(value: &str) -> Result<Vec<u8>> {
    let digits = value.trim().trim_start_matches("0x");
    hex::decode(digits).map_err(|e| Error::encoding(format!("malformed hex {:?}: {}", value, e)))
}

/// Hex-encode with a `0x` prefix.
pub fn encode_hex(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}
