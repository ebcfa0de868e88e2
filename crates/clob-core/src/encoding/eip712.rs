//! EIP-712 domain separators, struct hashes and signable digests.
//!
//! Polymarket signs three kinds of typed data: exchange orders, `ClobAuth`
//! attestations and Safe transactions. Their domains differ in which of the
//! optional domain fields are present, so the domain type string is derived
//! from the fields that are set.

use alloy_primitives::{keccak256, Address, B256, U256};

use super::abi::{encode_words, Token};

/// EIP-712 domain. Only present fields participate in the separator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Eip712Domain {
    pub name: Option<String>,
    pub version: Option<String>,
    pub chain_id: Option<U256>,
    pub verifying_contract: Option<Address>,
}

impl Eip712Domain {
    /// Domain with name, version, chain ID and verifying contract.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        Self {
            name: Some(name.into()),
            version: Some(version.into()),
            chain_id: Some(U256::from(chain_id)),
            verifying_contract: Some(verifying_contract),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(U256::from(chain_id));
        self
    }

    pub fn with_verifying_contract(mut self, contract: Address) -> Self {
        self.verifying_contract = Some(contract);
        self
    }

    /// `EIP712Domain(...)` type string listing the present fields in
    /// canonical order.
    pub fn type_string(&self) -> String {
        let mut fields = Vec::with_capacity(4);
        if self.name.is_some() {
            fields.push("string name");
        }
        if self.version.is_some() {
            fields.push("string version");
        }
        if self.chain_id.is_some() {
            fields.push("uint256 chainId");
        }
        if self.verifying_contract.is_some() {
            fields.push("address verifyingContract");
        }
        format!("EIP712Domain({})", fields.join(","))
    }

    /// Compute the EIP-712 domain separator hash.
    pub fn separator(&self) -> B256 {
        let mut encoder = StructEncoder::new(&self.type_string());
        if let Some(name) = &self.name {
            encoder = encoder.field(Token::String(name.clone()));
        }
        if let Some(version) = &self.version {
            encoder = encoder.field(Token::String(version.clone()));
        }
        if let Some(chain_id) = self.chain_id {
            encoder = encoder.field(Token::Uint(chain_id));
        }
        if let Some(contract) = self.verifying_contract {
            encoder = encoder.field(Token::Address(contract));
        }
        encoder.hash()
    }

    /// Final signable digest for a struct hash under this domain.
    pub fn digest(&self, struct_hash: B256) -> B256 {
        typed_data_digest(self.separator(), struct_hash)
    }
}

/// Accumulates `encodeData` words for a struct and hashes them with the
/// struct's type hash.
#[derive(Debug, Clone)]
pub struct StructEncoder {
    type_hash: B256,
    words: Vec<u8>,
}

impl StructEncoder {
    pub fn new(type_string: &str) -> Self {
        Self {
            type_hash: type_hash(type_string),
            words: Vec::new(),
        }
    }

    /// Append one field. Fields must be added in the type string's order.
    pub fn field(mut self, token: Token) -> Self {
        self.words
            .extend_from_slice(&encode_words(std::slice::from_ref(&token)));
        self
    }

    pub fn fields(mut self, tokens: impl IntoIterator<Item = Token>) -> Self {
        for token in tokens {
            self = self.field(token);
        }
        self
    }

    /// `keccak256(typeHash ++ encodeData)`.
    pub fn hash(&self) -> B256 {
        let mut data = Vec::with_capacity(32 + self.words.len());
        data.extend_from_slice(self.type_hash.as_slice());
        data.extend_from_slice(&self.words);
        keccak256(&data)
    }
}

/// `keccak256` of an EIP-712 type string.
pub fn type_hash(type_string: &str) -> B256 {
    keccak256(type_string.as_bytes())
}

/// Compute the EIP-712 typed data hash: `keccak256(0x1901 ++ domainSeparator ++ structHash)`.
pub fn typed_data_digest(domain_separator: B256, struct_hash: B256) -> B256 {
    let mut data = [0u8; 66];
    data[0] = 0x19;
    data[1] = 0x01;
    data[2..34].copy_from_slice(domain_separator.as_slice());
    data[34..].copy_from_slice(struct_hash.as_slice());
    keccak256(data)
}
