//! The Safe's own EIP-712 `SafeTx` message.

use alloy_primitives::{Address, B256, U256};
use clob_core::encoding::{Eip712Domain, StructEncoder, Token};

use crate::model::{OperationType, SafeTransaction};

pub const SAFE_TX_TYPE: &str = "SafeTx(address to,uint256 value,bytes data,uint8 operation,uint256 safeTxGas,uint256 baseGas,uint256 gasPrice,address gasToken,address refundReceiver,uint256 nonce)";

pub const SAFE_DOMAIN_NAME: &str = "Gnosis Safe";

/// Domain a Safe verifies signatures against. There is no version field.
pub fn safe_domain(chain_id: u64, safe: Address) -> Eip712Domain {
    Eip712Domain::default()
        .with_name(SAFE_DOMAIN_NAME)
        .with_chain_id(chain_id)
        .with_verifying_contract(safe)
}

/// A relayer-paid Safe transaction: all gas and refund fields are zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeTx {
    pub to: Address,
    pub value: U256,
    pub data: Vec<u8>,
    pub operation: OperationType,
    pub nonce: U256,
}

impl SafeTx {
    pub fn new(transaction: &SafeTransaction, nonce: U256) -> Self {
        Self {
            to: transaction.to,
            value: transaction.value,
            data: transaction.data.to_vec(),
            operation: transaction.operation,
            nonce,
        }
    }

    pub fn struct_hash(&self) -> B256 {
        StructEncoder::new(SAFE_TX_TYPE)
            .field(Token::Address(self.to))
            .field(Token::Uint(self.value))
            .field(Token::Bytes(self.data.clone()))
            .field(Token::Uint8(self.operation.as_u8()))
            // safeTxGas, baseGas, gasPrice
            .field(Token::Uint(U256::ZERO))
            .field(Token::Uint(U256::ZERO))
            .field(Token::Uint(U256::ZERO))
            // gasToken, refundReceiver
            .field(Token::Address(Address::ZERO))
            .field(Token::Address(Address::ZERO))
            .field(Token::Uint(self.nonce))
            .hash()
    }

    /// The `safeTxHash` the owner signs.
    pub fn digest(&self, chain_id: u64, safe: Address) -> B256 {
        safe_domain(chain_id, safe).digest(self.struct_hash())
    }
}
